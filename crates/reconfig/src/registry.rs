//! Read-only registry of hosts and switch configurations.

use crate::types::{Configuration, HostId, HostInformation};
use common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Topology document as supplied by the operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub hosts: Vec<HostInformation>,
    pub configurations: Vec<Configuration>,
}

/// Immutable view over the configuration sequence and host directory.
///
/// All invariants are checked once in [`ConfigurationRegistry::new`]; the
/// registry cannot be modified afterwards.
#[derive(Debug, Clone)]
pub struct ConfigurationRegistry {
    hosts: HashMap<HostId, HostInformation>,
    configurations: Vec<Configuration>,
}

impl ConfigurationRegistry {
    /// Validate and wrap a topology
    ///
    /// # Errors
    ///
    /// Returns a topology error if:
    /// - There are no configurations
    /// - Two hosts share a host id
    /// - A connection references an unknown host
    /// - A configuration sets the same ring twice or uses a non-finite or negative voltage
    pub fn new(topology: Topology) -> Result<Self> {
        let Topology {
            hosts: host_list,
            configurations,
        } = topology;

        if configurations.is_empty() {
            return Err(Error::topology("at least one configuration is required"));
        }

        let mut hosts = HashMap::with_capacity(host_list.len());
        for host in host_list {
            let id = host.host_id;
            if hosts.insert(id, host).is_some() {
                return Err(Error::topology(format!("duplicate host id {}", id)));
            }
        }

        for (index, config) in configurations.iter().enumerate() {
            for conn in &config.connections {
                for id in [conn.src_host_id, conn.dst_host_id] {
                    if !hosts.contains_key(&id) {
                        return Err(Error::topology(format!(
                            "configuration {} references unknown host {}",
                            index, id
                        )));
                    }
                }
            }

            let mut rings = HashSet::with_capacity(config.ring_voltages.len());
            for setting in &config.ring_voltages {
                if !rings.insert(setting.ring) {
                    return Err(Error::topology(format!(
                        "configuration {} sets ring {} more than once",
                        index, setting.ring
                    )));
                }
                if !setting.voltage.is_finite() || setting.voltage < 0.0 {
                    return Err(Error::topology(format!(
                        "configuration {} has invalid voltage {} for ring {}",
                        index, setting.voltage, setting.ring
                    )));
                }
            }
        }

        Ok(Self {
            hosts,
            configurations,
        })
    }

    /// Number of configurations in the cycle
    pub fn configuration_count(&self) -> usize {
        self.configurations.len()
    }

    /// Configuration at position `index`
    pub fn configuration_at(&self, index: usize) -> Option<&Configuration> {
        self.configurations.get(index)
    }

    /// Look up a host by id
    pub fn host(&self, id: HostId) -> Option<&HostInformation> {
        self.hosts.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Connection, RingVoltage};

    fn hosts() -> Vec<HostInformation> {
        (1..=4)
            .map(|id| HostInformation {
                host_id: id,
                host_name: format!("host{}", id),
                ip_addr: format!("10.0.0.{}", id).parse().unwrap(),
                nic_id: 17,
            })
            .collect()
    }

    fn config(connections: &[(u16, u16)]) -> Configuration {
        Configuration {
            name: None,
            connections: connections
                .iter()
                .map(|&(src, dst)| Connection::new(src, dst, 1))
                .collect(),
            duration_ms: 10_000,
            ring_voltages: vec![RingVoltage { ring: 88, voltage: 1.61 }],
        }
    }

    #[test]
    fn test_accessors() {
        let registry = ConfigurationRegistry::new(Topology {
            hosts: hosts(),
            configurations: vec![config(&[(1, 2), (2, 1)]), config(&[(1, 4)])],
        })
        .unwrap();

        assert_eq!(registry.configuration_count(), 2);
        assert_eq!(registry.configuration_at(1).unwrap().connections.len(), 1);
        assert!(registry.configuration_at(2).is_none());
        assert_eq!(registry.host(3).unwrap().host_name, "host3");
        assert!(registry.host(9).is_none());
    }

    #[test]
    fn test_rejects_empty_sequence() {
        let result = ConfigurationRegistry::new(Topology {
            hosts: hosts(),
            configurations: vec![],
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_unknown_host() {
        let result = ConfigurationRegistry::new(Topology {
            hosts: hosts(),
            configurations: vec![config(&[(1, 5)])],
        });
        assert!(matches!(result, Err(Error::Topology(_))));
    }

    #[test]
    fn test_rejects_duplicate_host_id() {
        let mut list = hosts();
        list.push(list[0].clone());
        let result = ConfigurationRegistry::new(Topology {
            hosts: list,
            configurations: vec![config(&[(1, 2)])],
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_duplicate_ring() {
        let mut cfg = config(&[(1, 2)]);
        cfg.ring_voltages.push(RingVoltage { ring: 88, voltage: 1.50 });
        let result = ConfigurationRegistry::new(Topology {
            hosts: hosts(),
            configurations: vec![cfg],
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_negative_voltage() {
        let mut cfg = config(&[(1, 2)]);
        cfg.ring_voltages[0].voltage = -0.5;
        let result = ConfigurationRegistry::new(Topology {
            hosts: hosts(),
            configurations: vec![cfg],
        });
        assert!(result.is_err());
    }
}
