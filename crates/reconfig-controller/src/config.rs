//! Configuration loading and validation for the reconfiguration controller

use reconfig::Timings;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use validator::{Validate, ValidationError};

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timing: TimingSettings,

    #[serde(default)]
    pub network: NetworkSettings,

    #[serde(default)]
    pub switch: SwitchSettings,

    #[serde(default)]
    pub topology: TopologySettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Validate for Config {
    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        self.timing.validate()?;
        self.switch.validate()?;
        Ok(())
    }
}

/// Guard intervals around the switch change
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TimingSettings {
    #[serde(with = "humantime_serde")]
    #[validate(custom = "validate_pre_guard")]
    pub pre_guard: Duration,

    #[serde(with = "humantime_serde")]
    #[validate(custom = "validate_post_guard")]
    pub post_guard: Duration,
}

/// Controller addressing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// Explicit controller address; probed from the routing table when unset
    pub source_ip: Option<Ipv4Addr>,

    /// Destination used to pick the outbound route when probing
    pub probe_addr: SocketAddr,
}

/// Voltage controller settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SwitchSettings {
    #[validate(custom = "validate_serial_port")]
    pub serial_port: String,

    #[validate(range(min = 9600, max = 921600))]
    pub baud_rate: u32,

    #[serde(with = "humantime_serde")]
    #[validate(custom = "validate_response_timeout")]
    pub response_timeout: Duration,

    /// Wait for an OK line after every command
    pub expect_ack: bool,

    /// Log switch operations instead of driving hardware
    pub dry_run: bool,

    /// Zero every channel once before the first cycle
    pub zero_on_start: bool,
}

/// Topology file location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologySettings {
    pub path: PathBuf,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// Logging settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub format: Option<LogFormat>,
}

// Default implementations

impl Default for TimingSettings {
    fn default() -> Self {
        let timings = Timings::default();
        Self {
            pre_guard: timings.pre_guard,
            post_guard: timings.post_guard,
        }
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            source_ip: None,
            probe_addr: SocketAddr::from(([8, 8, 8, 8], 80)),
        }
    }
}

impl Default for SwitchSettings {
    fn default() -> Self {
        Self {
            serial_port: "/dev/ttyUSB1".to_string(),
            baud_rate: 115200,
            response_timeout: Duration::from_millis(500),
            expect_ack: true,
            dry_run: false,
            zero_on_start: true,
        }
    }
}

impl Default for TopologySettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./topology.yaml"),
        }
    }
}

// Custom validators

fn validate_pre_guard(guard: &Duration) -> Result<(), ValidationError> {
    let millis = guard.as_millis();
    if !(1..=60_000).contains(&millis) {
        return Err(ValidationError::new("pre_guard_out_of_range"));
    }
    Ok(())
}

fn validate_post_guard(guard: &Duration) -> Result<(), ValidationError> {
    if guard.as_millis() > 600_000 {
        return Err(ValidationError::new("post_guard_out_of_range"));
    }
    Ok(())
}

fn validate_response_timeout(timeout: &Duration) -> Result<(), ValidationError> {
    let millis = timeout.as_millis();
    if !(1..=25_500).contains(&millis) {
        return Err(ValidationError::new("response_timeout_out_of_range"));
    }
    Ok(())
}

fn validate_serial_port(path: &str) -> Result<(), ValidationError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("serial_port_empty"));
    }
    if !trimmed.starts_with('/') {
        return Err(ValidationError::new("serial_port_not_absolute"));
    }
    Ok(())
}

// Configuration loading implementation

impl Config {
    /// Load configuration from `path`, or from the default search paths
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            return Self::load_from_file(path);
        }

        match Self::find_config_file() {
            Some(path) => {
                tracing::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(&path)
            }
            None => {
                tracing::info!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut paths = vec![PathBuf::from("/etc/reconfig/controller.yaml")];

        if let Some(home_path) = Self::home_config_path() {
            paths.push(home_path);
        }

        paths.push(PathBuf::from("./controller.yaml"));

        paths.into_iter().find(|p: &PathBuf| p.exists() && p.is_file())
    }

    /// Get home directory config path
    fn home_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config/reconfig/controller.yaml"))
    }

    /// Guard intervals for the orchestrator
    pub fn timings(&self) -> Timings {
        Timings {
            pre_guard: self.timing.pre_guard,
            post_guard: self.timing.post_guard,
        }
    }
}
