//! SnapshotCollectorActor - samples local state and pushes it to the hub
//!
//! ## Message Flow
//!
//! ```text
//! Timer tick → run_cycle → [provider, provider, ...] → assemble → HTTP push
//!     ↑
//!     └─── Commands (PushNow, UpdateInterval, Shutdown)
//! ```
//!
//! The push is fire-and-forget: the outcome is logged, never retried. A
//! failed push costs at most one interval of staleness because the next
//! scheduled cycle re-sends the full (fresh) snapshot anyway.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::Map;
use tokio::sync::{mpsc, oneshot};
use tokio::time::interval;
use tracing::{debug, error, instrument, trace, warn};

use crate::{SnapshotDocument, config::AgentConfig, providers::SampleProvider};

use super::messages::CollectorCommand;

/// Actor that owns the sampling cadence for one machine
///
/// Runs in a single task: providers are awaited to completion before the
/// push is issued, so cycles never overlap.
pub struct SnapshotCollectorActor {
    /// Agent configuration (hub address, credential, identity)
    config: AgentConfig,

    /// Data sources, invoked in order every cycle
    providers: Vec<Box<dyn SampleProvider>>,

    /// HTTP client (reused across pushes)
    client: reqwest::Client,

    /// Command receiver for control messages
    command_rx: mpsc::Receiver<CollectorCommand>,

    /// Current sampling interval
    interval_duration: Duration,
}

impl SnapshotCollectorActor {
    pub fn new(
        config: AgentConfig,
        providers: Vec<Box<dyn SampleProvider>>,
        command_rx: mpsc::Receiver<CollectorCommand>,
    ) -> Self {
        let interval_duration = Duration::from_secs(config.interval_secs);

        Self {
            config,
            providers,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            command_rx,
            interval_duration,
        }
    }

    /// Run the actor's main loop
    ///
    /// The first tick fires immediately, so a snapshot ships at startup.
    /// Runs until a Shutdown command arrives or the command channel closes.
    #[instrument(skip(self), fields(server = %self.config.server_name))]
    pub async fn run(mut self) {
        debug!("starting collector actor");

        let mut ticker = interval(self.interval_duration);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_cycle().await {
                        error!("push failed: {:#}", e);
                    }
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        CollectorCommand::PushNow { respond_to } => {
                            debug!("received PushNow command");
                            let result = self.run_cycle().await;
                            let _ = respond_to.send(result);
                        }

                        CollectorCommand::UpdateInterval { interval_secs } => {
                            debug!("updating interval to {interval_secs}s");
                            self.interval_duration = Duration::from_secs(interval_secs);
                            ticker = interval(self.interval_duration);
                        }

                        CollectorCommand::Shutdown => {
                            debug!("received shutdown command");
                            break;
                        }
                    }
                }

                else => {
                    warn!("command channel closed, shutting down");
                    break;
                }
            }
        }

        debug!("collector actor stopped");
    }

    /// Assemble a full snapshot and push it
    ///
    /// Providers run in sequence; a failing provider is substituted with
    /// its fallback marker and the rest of the snapshot still ships. Only
    /// the push itself can fail the cycle.
    #[instrument(skip(self), fields(server = %self.config.server_name))]
    async fn run_cycle(&self) -> Result<()> {
        let mut facts = Map::new();

        for provider in &self.providers {
            let value = match provider.sample().await {
                Ok(value) => value,
                Err(e) => {
                    warn!("provider {} failed: {:#}, using fallback", provider.key(), e);
                    provider.fallback()
                }
            };
            facts.insert(provider.key().to_string(), value);
        }

        let document = SnapshotDocument::new(Utc::now(), facts);
        self.push(&document).await
    }

    /// Send one snapshot to the hub. No retry: the next cycle re-sends.
    async fn push(&self, document: &SnapshotDocument) -> Result<()> {
        let url = format!(
            "{}/api/servers/{}/data",
            self.config.server_url, self.config.server_name
        );

        trace!("pushing snapshot to {url}");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .json(document)
            .send()
            .await
            .context("failed to send snapshot")?;

        if !response.status().is_success() {
            anyhow::bail!("hub rejected snapshot: HTTP {}", response.status());
        }

        debug!("snapshot accepted by hub");
        Ok(())
    }
}

/// Handle for controlling a SnapshotCollectorActor
///
/// Provides a typed API for sending commands to the actor. Cloneable and
/// shareable across tasks.
#[derive(Clone)]
pub struct CollectorHandle {
    sender: mpsc::Sender<CollectorCommand>,

    /// Machine identity this collector reports as
    pub server_name: String,
}

impl CollectorHandle {
    /// Spawn a new collector actor and return its handle
    pub fn spawn(config: AgentConfig, providers: Vec<Box<dyn SampleProvider>>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);

        let server_name = config.server_name.clone();
        let actor = SnapshotCollectorActor::new(config, providers, cmd_rx);

        tokio::spawn(actor.run());

        Self {
            sender: cmd_tx,
            server_name,
        }
    }

    /// Run a sample-and-push cycle immediately
    pub async fn push_now(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(CollectorCommand::PushNow { respond_to: tx })
            .await
            .context("failed to send PushNow command")?;

        rx.await.context("failed to receive response")??;
        Ok(())
    }

    /// Update the sampling interval
    pub async fn update_interval(&self, interval_secs: u64) -> Result<()> {
        self.sender
            .send(CollectorCommand::UpdateInterval { interval_secs })
            .await
            .context("failed to send UpdateInterval command")?;
        Ok(())
    }

    /// Gracefully shut down the collector
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(CollectorCommand::Shutdown)
            .await
            .context("failed to send Shutdown command")?;
        Ok(())
    }
}
