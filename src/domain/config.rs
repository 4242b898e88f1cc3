use crate::domain::endpoint::Endpoint;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// LensCtl configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LensConfig {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
    /// Device configurations
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Device used when none is named on the command line
    #[serde(default)]
    pub default_device: Option<String>,
}

/// Lens-control adapter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Device name
    pub name: String,
    /// Device description
    #[serde(default)]
    pub description: String,
    /// Adapter host name or IP address
    pub host: String,
    /// Adapter TCP port
    pub port: u16,
    /// Connect timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    /// Response read timeout in milliseconds
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u64,
    /// Liveness probe read timeout in milliseconds
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,
    /// Pause between closing a dead connection and reopening it
    #[serde(default = "default_reconnect_backoff")]
    pub reconnect_backoff_ms: u64,
    /// Run the motor-init and focus-learn transactions on connect
    #[serde(default = "default_initialize")]
    pub initialize: bool,
    /// TCP keep-alive tuning
    #[serde(default)]
    pub keepalive: KeepaliveConfig,
}

/// TCP keep-alive socket options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeepaliveConfig {
    /// Idle seconds before the first probe
    #[serde(default = "default_keepalive_idle")]
    pub idle_secs: u32,
    /// Seconds between probes
    #[serde(default = "default_keepalive_interval")]
    pub interval_secs: u32,
    /// Unanswered probes before the kernel drops the connection
    #[serde(default = "default_keepalive_retries")]
    pub retries: u32,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_connect_timeout() -> u64 {
    3000
}

fn default_read_timeout() -> u64 {
    2000
}

fn default_probe_timeout() -> u64 {
    2000
}

fn default_reconnect_backoff() -> u64 {
    1000
}

fn default_initialize() -> bool {
    true
}

fn default_keepalive_idle() -> u32 {
    1
}

fn default_keepalive_interval() -> u32 {
    1
}

fn default_keepalive_retries() -> u32 {
    60
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            default_device: None,
        }
    }
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self {
            idle_secs: default_keepalive_idle(),
            interval_secs: default_keepalive_interval(),
            retries: default_keepalive_retries(),
        }
    }
}

impl DeviceConfig {
    /// Device with every protocol setting at its default
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            host: host.into(),
            port,
            connect_timeout_ms: default_connect_timeout(),
            read_timeout_ms: default_read_timeout(),
            probe_timeout_ms: default_probe_timeout(),
            reconnect_backoff_ms: default_reconnect_backoff(),
            initialize: default_initialize(),
            keepalive: KeepaliveConfig::default(),
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect_backoff_ms)
    }
}

impl LensConfig {
    /// Find a device by name
    pub fn device(&self, name: &str) -> Option<&DeviceConfig> {
        self.devices.iter().find(|device| device.name == name)
    }

    /// The configured default device, or the only device when there is one
    pub fn default_device(&self) -> Option<&DeviceConfig> {
        match &self.global.default_device {
            Some(name) => self.device(name),
            None if self.devices.len() == 1 => self.devices.first(),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = LensConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let _deserialized: LensConfig = toml::from_str(&toml_str).unwrap();
    }

    #[test]
    fn test_device_defaults_from_minimal_toml() {
        let config: LensConfig = toml::from_str(
            r#"
            [[devices]]
            name = "bench"
            host = "192.168.1.50"
            port = 10001
            "#,
        )
        .unwrap();

        let device = &config.devices[0];
        assert_eq!(device.read_timeout(), Duration::from_secs(2));
        assert_eq!(device.probe_timeout(), Duration::from_secs(2));
        assert_eq!(device.reconnect_backoff(), Duration::from_secs(1));
        assert_eq!(device.connect_timeout(), Duration::from_secs(3));
        assert!(device.initialize);
        assert_eq!(
            device.keepalive,
            KeepaliveConfig {
                idle_secs: 1,
                interval_secs: 1,
                retries: 60,
            }
        );
        assert_eq!(config.global.log_level, "info");
    }

    #[test]
    fn test_default_device_selection() {
        let mut config = LensConfig::default();
        assert!(config.default_device().is_none());

        config.devices.push(DeviceConfig::new("bench", "10.0.0.2", 10001));
        assert_eq!(config.default_device().map(|d| d.name.as_str()), Some("bench"));

        config.devices.push(DeviceConfig::new("rig", "10.0.0.3", 10001));
        assert!(config.default_device().is_none());

        config.global.default_device = Some("rig".to_string());
        assert_eq!(config.default_device().map(|d| d.port), Some(10001));
        assert_eq!(
            config.default_device().map(|d| d.endpoint().to_string()),
            Some("10.0.0.3:10001".to_string())
        );
    }
}
