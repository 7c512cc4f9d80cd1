//! systemd service status and journal logs

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::process::Command;
use tracing::{debug, warn};

use super::SampleProvider;

/// Journal lines captured per service
const LOG_LINES: usize = 200;

/// Samples `systemctl list-units` plus the recent journal of every unit
pub struct SystemdServiceProvider;

impl SystemdServiceProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemdServiceProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// The subset of `systemctl --output=json` fields the dashboard shows
#[derive(Debug, Deserialize)]
struct SystemdUnit {
    unit: String,
    active: String,
    description: String,
}

/// Parse the JSON emitted by `systemctl list-units --output=json`
pub(crate) fn parse_unit_list(output: &str) -> anyhow::Result<Vec<(String, String, String)>> {
    let units: Vec<SystemdUnit> = serde_json::from_str(output)?;
    Ok(units
        .into_iter()
        .map(|u| (u.unit, u.active, u.description))
        .collect())
}

async fn list_service_units() -> anyhow::Result<Vec<(String, String, String)>> {
    let output = Command::new("systemctl")
        .args([
            "list-units",
            "--type=service",
            "--all",
            "--no-pager",
            "--output=json",
        ])
        .output()
        .await?;

    if !output.status.success() {
        anyhow::bail!("systemctl exited with {}", output.status);
    }

    parse_unit_list(&String::from_utf8_lossy(&output.stdout))
}

/// Recent journal lines for one unit; a failing journalctl degrades to empty
async fn service_logs(unit: &str) -> Vec<String> {
    let result = Command::new("journalctl")
        .args(["-u", unit, "-n", &LOG_LINES.to_string(), "--no-pager"])
        .output()
        .await;

    match result {
        Ok(output) if output.status.success() => String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect(),
        Ok(output) => {
            warn!("journalctl for {unit} exited with {}", output.status);
            vec![]
        }
        Err(e) => {
            warn!("failed to run journalctl for {unit}: {e}");
            vec![]
        }
    }
}

#[async_trait]
impl SampleProvider for SystemdServiceProvider {
    fn key(&self) -> &'static str {
        "services"
    }

    async fn sample(&self) -> anyhow::Result<Value> {
        let units = list_service_units().await?;
        debug!("sampled {} service units", units.len());

        let mut services = Vec::with_capacity(units.len());
        for (name, status, description) in units {
            let logs = service_logs(&name).await;
            services.push(json!({
                "name": name,
                "status": status,
                "description": description,
                "logs": logs,
            }));
        }

        Ok(Value::Array(services))
    }

    fn fallback(&self) -> Value {
        json!([])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unit_list() {
        let output = r#"[
            {"unit": "nginx.service", "load": "loaded", "active": "active", "sub": "running", "description": "A high performance web server"},
            {"unit": "cron.service", "load": "loaded", "active": "inactive", "sub": "dead", "description": "Regular background program processing daemon"}
        ]"#;

        let units = parse_unit_list(output).unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(
            units[0],
            (
                "nginx.service".to_string(),
                "active".to_string(),
                "A high performance web server".to_string()
            )
        );
        assert_eq!(units[1].1, "inactive");
    }

    #[test]
    fn test_parse_unit_list_rejects_garbage() {
        assert!(parse_unit_list("UNIT LOAD ACTIVE").is_err());
    }

    #[test]
    fn test_fallback_is_empty_array() {
        assert_eq!(SystemdServiceProvider::new().fallback(), json!([]));
    }
}
