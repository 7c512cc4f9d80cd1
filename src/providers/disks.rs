//! Filesystem and disk usage facts

use async_trait::async_trait;
use serde_json::{Value, json};
use sysinfo::Disks;
use tracing::debug;

use super::SampleProvider;

/// Samples mounted filesystems and the disks behind them
pub struct DiskUsageProvider;

impl DiskUsageProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DiskUsageProvider {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn use_percent(total: u64, available: u64) -> String {
    if total == 0 {
        return String::from("0%");
    }
    let used = total - available;
    format!("{}%", (used * 100).div_ceil(total))
}

#[async_trait]
impl SampleProvider for DiskUsageProvider {
    fn key(&self) -> &'static str {
        "storage"
    }

    async fn sample(&self) -> anyhow::Result<Value> {
        // Disk refresh is cheap and synchronous; no need to spawn_blocking
        let disks = Disks::new_with_refreshed_list();
        debug!("sampled {} mounted filesystems", disks.list().len());

        let filesystems: Vec<Value> = disks
            .list()
            .iter()
            .map(|disk| {
                let total = disk.total_space();
                let available = disk.available_space();
                json!({
                    "filesystem": disk.name().to_string_lossy(),
                    "type": disk.file_system().to_string_lossy(),
                    "size": total,
                    "used": total - available,
                    "available": available,
                    "usePercent": use_percent(total, available),
                    "mountPoint": disk.mount_point().to_string_lossy(),
                })
            })
            .collect();

        let devices: Vec<Value> = disks
            .list()
            .iter()
            .map(|disk| {
                json!({
                    "name": disk.name().to_string_lossy(),
                    "kind": format!("{:?}", disk.kind()),
                    "removable": disk.is_removable(),
                    "size": disk.total_space(),
                })
            })
            .collect();

        Ok(json!({
            "filesystems": filesystems,
            "disks": devices,
        }))
    }

    fn fallback(&self) -> Value {
        json!({ "filesystems": [], "disks": [] })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_use_percent() {
        assert_eq!(use_percent(100, 50), "50%");
        assert_eq!(use_percent(1000, 1), "100%");
        assert_eq!(use_percent(1000, 1000), "0%");
    }

    #[test]
    fn test_use_percent_empty_filesystem() {
        // Pseudo-filesystems report zero size
        assert_eq!(use_percent(0, 0), "0%");
    }

    #[tokio::test]
    async fn test_sample_shape() {
        let provider = DiskUsageProvider::new();
        let value = provider.sample().await.unwrap();

        assert!(value["filesystems"].is_array());
        assert!(value["disks"].is_array());
    }
}
