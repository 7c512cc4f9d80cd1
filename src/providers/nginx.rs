//! nginx status, served domains, and recent logs

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use regex::Regex;
use serde_json::{Value, json};
use tokio::process::Command;
use tracing::{debug, warn};

use super::SampleProvider;

const SITES_ENABLED_DIR: &str = "/etc/nginx/sites-enabled";
const ERROR_LOG: &str = "/var/log/nginx/error.log";
const ACCESS_LOG: &str = "/var/log/nginx/access.log";

/// Log lines captured per file
const LOG_LINES: usize = 200;

/// Samples the local nginx: running state, configured domains, recent logs
pub struct NginxProvider {
    server_name_re: Regex,
    sites_dir: PathBuf,
    error_log: PathBuf,
    access_log: PathBuf,
}

impl NginxProvider {
    pub fn new() -> Self {
        Self::with_paths(
            PathBuf::from(SITES_ENABLED_DIR),
            PathBuf::from(ERROR_LOG),
            PathBuf::from(ACCESS_LOG),
        )
    }

    /// Paths are injectable so tests can point at a scratch directory
    pub fn with_paths(sites_dir: PathBuf, error_log: PathBuf, access_log: PathBuf) -> Self {
        Self {
            // The pattern is a literal; it cannot fail to compile
            server_name_re: Regex::new(r"server_name\s+([^;]+)").unwrap(),
            sites_dir,
            error_log,
            access_log,
        }
    }

    /// Extract every domain named by a `server_name` directive.
    ///
    /// The catch-all `_` is skipped and duplicates collapse, keeping the
    /// first occurrence's position.
    pub(crate) fn parse_server_names(&self, config: &str) -> Vec<String> {
        let mut domains: Vec<String> = Vec::new();
        for capture in self.server_name_re.captures_iter(config) {
            for domain in capture[1].split_whitespace() {
                if domain != "_" && !domains.iter().any(|d| d == domain) {
                    domains.push(domain.to_string());
                }
            }
        }
        domains
    }

    async fn collect_domains(&self) -> Vec<String> {
        let mut domains = Vec::new();

        let mut entries = match tokio::fs::read_dir(&self.sites_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("failed to list {}: {e}", self.sites_dir.display());
                return domains;
            }
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            match tokio::fs::read_to_string(entry.path()).await {
                Ok(config) => {
                    for domain in self.parse_server_names(&config) {
                        if !domains.contains(&domain) {
                            domains.push(domain);
                        }
                    }
                }
                Err(e) => warn!("failed to read site config {:?}: {e}", entry.path()),
            }
        }

        domains
    }
}

impl Default for NginxProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Last `limit` non-empty lines of a text blob
pub(crate) fn tail_lines(content: &str, limit: usize) -> Vec<String> {
    let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
    let skip = lines.len().saturating_sub(limit);
    lines[skip..].iter().map(|l| l.to_string()).collect()
}

async fn tail_log(path: &Path) -> Vec<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => tail_lines(&content, LOG_LINES),
        Err(e) => {
            warn!("failed to read {}: {e}", path.display());
            vec![]
        }
    }
}

async fn nginx_is_active() -> bool {
    let result = Command::new("systemctl")
        .args(["is-active", "nginx"])
        .output()
        .await;

    match result {
        Ok(output) => String::from_utf8_lossy(&output.stdout).trim() == "active",
        Err(e) => {
            warn!("failed to query nginx status: {e}");
            false
        }
    }
}

#[async_trait]
impl SampleProvider for NginxProvider {
    fn key(&self) -> &'static str {
        "nginx"
    }

    async fn sample(&self) -> anyhow::Result<Value> {
        let is_running = nginx_is_active().await;
        debug!("nginx active: {is_running}");

        // Domains and logs are only meaningful on a live nginx
        let (domains, error_logs, access_logs) = if is_running {
            (
                self.collect_domains().await,
                tail_log(&self.error_log).await,
                tail_log(&self.access_log).await,
            )
        } else {
            (vec![], vec![], vec![])
        };

        Ok(json!({
            "isRunning": is_running,
            "domains": domains,
            "errorLogs": error_logs,
            "accessLogs": access_logs,
        }))
    }

    fn fallback(&self) -> Value {
        json!({
            "isRunning": false,
            "domains": [],
            "errorLogs": [],
            "accessLogs": [],
        })
    }
}
