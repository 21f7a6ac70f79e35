//! Topology file loading.

use common::{Error, Result};
use reconfig::{ConfigurationRegistry, Topology};
use std::path::Path;

/// Read, parse, and validate the topology file at `path`
pub fn load(path: &Path) -> Result<ConfigurationRegistry> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::topology(format!("failed to read {}: {}", path.display(), e)))?;
    parse(&contents)
}

/// Parse and validate a topology YAML document
pub fn parse(contents: &str) -> Result<ConfigurationRegistry> {
    let topology: Topology = serde_yaml::from_str(contents)?;
    ConfigurationRegistry::new(topology)
}
