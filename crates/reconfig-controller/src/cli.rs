//! Command line arguments.

use crate::config::{Config, LogFormat};
use clap::Parser;
use std::net::Ipv4Addr;
use std::path::PathBuf;

/// Photonic switch reconfiguration controller
#[derive(Debug, Parser)]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: search standard locations)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Topology file, overriding the configured path
    #[arg(short, long)]
    pub topology: Option<PathBuf>,

    /// Controller address, overriding route probing
    #[arg(long)]
    pub source_ip: Option<Ipv4Addr>,

    /// Log switch operations instead of driving hardware
    #[arg(long)]
    pub dry_run: bool,

    /// Load everything, print the notification plan, and exit
    #[arg(long)]
    pub check: bool,

    #[arg(long)]
    pub log_level: Option<String>,

    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Apply command line overrides on top of the file configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.topology {
            config.topology.path = path.clone();
        }
        if let Some(ip) = self.source_ip {
            config.network.source_ip = Some(ip);
        }
        if self.dry_run {
            config.switch.dry_run = true;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = Some(level.clone());
        }
        if let Some(format) = self.log_format {
            config.logging.format = Some(format);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "reconfig-controller",
            "--topology",
            "/tmp/topo.yaml",
            "--source-ip",
            "10.0.0.254",
            "--dry-run",
            "--log-format",
            "json",
        ]);

        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config.topology.path, PathBuf::from("/tmp/topo.yaml"));
        assert_eq!(config.network.source_ip, Some(Ipv4Addr::new(10, 0, 0, 254)));
        assert!(config.switch.dry_run);
        assert_eq!(config.logging.format, Some(LogFormat::Json));
        assert!(config.logging.level.is_none());
    }

    #[test]
    fn test_no_overrides_keep_file_values() {
        let cli = Cli::parse_from(["reconfig-controller"]);
        let mut config = Config::default();
        config.switch.dry_run = true;
        cli.apply(&mut config);
        assert!(config.switch.dry_run);
        assert!(!cli.check);
    }

    #[test]
    fn test_rejects_malformed_source_ip() {
        let result = Cli::try_parse_from(["reconfig-controller", "--source-ip", "Host1"]);
        assert!(result.is_err());
    }
}
