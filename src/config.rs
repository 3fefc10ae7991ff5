use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    #[serde(default)]
    pub transfer: TransferConfig,
}

/// Transfer lifecycle configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TransferConfig {
    /// How long a pending transfer waits for confirmation, in seconds
    pub ttl_secs: u64,
    /// How often the expiry sweeper scans, in seconds
    pub sweep_interval_secs: u64,
    /// Maximum transfers expired per sweep cycle
    pub sweep_batch_size: usize,
    /// Remaining lifetime under which a pending transfer counts as
    /// near expiry, in seconds
    pub near_expiry_secs: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 86_400, // 24 hours
            sweep_interval_secs: 60,
            sweep_batch_size: 100,
            near_expiry_secs: 3_600,
        }
    }
}

impl TransferConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn near_expiry_ms(&self) -> i64 {
        (self.near_expiry_secs as i64) * 1000
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_defaults() {
        let config = TransferConfig::default();
        assert_eq!(config.ttl(), Duration::from_secs(86_400));
        assert_eq!(config.sweep_interval(), Duration::from_secs(60));
        assert_eq!(config.sweep_batch_size, 100);
        assert_eq!(config.near_expiry_ms(), 3_600_000);
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
log_level: debug
log_dir: logs
log_file: ledger.log
use_json: true
rotation: hourly
transfer:
  ttl_secs: 600
  sweep_interval_secs: 5
  sweep_batch_size: 10
  near_expiry_secs: 60
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.log_level, "debug");
        assert!(config.use_json);
        assert_eq!(config.transfer.ttl_secs, 600);
        assert_eq!(config.transfer.sweep_batch_size, 10);
    }

    #[test]
    fn test_transfer_section_is_optional() {
        let yaml = r#"
log_level: info
log_dir: logs
log_file: ledger.log
use_json: false
rotation: daily
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.transfer.ttl_secs, 86_400);
    }
}
