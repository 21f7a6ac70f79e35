//! Precomputed notification tables.

use crate::packet::PacketBuilder;
use crate::registry::ConfigurationRegistry;
use crate::types::NotificationEvent;
use bytes::Bytes;
use common::{Error, Result};
use std::net::Ipv4Addr;
use tracing::debug;

/// Every notification datagram for every configuration, built once.
///
/// All three tables are indexed `[configuration][connection]` and share the
/// connection order of the configuration they were built from.
#[derive(Debug, Clone)]
pub struct MessageTable {
    start: Vec<Vec<Bytes>>,
    finish: Vec<Vec<Bytes>>,
    destinations: Vec<Vec<Ipv4Addr>>,
}

impl MessageTable {
    /// Build the start and finish datagrams for every connection
    pub fn precompute(registry: &ConfigurationRegistry, builder: &PacketBuilder) -> Result<Self> {
        let count = registry.configuration_count();
        let mut start = Vec::with_capacity(count);
        let mut finish = Vec::with_capacity(count);
        let mut destinations = Vec::with_capacity(count);

        for index in 0..count {
            let config = registry
                .configuration_at(index)
                .ok_or_else(|| Error::topology(format!("missing configuration {}", index)))?;

            let mut start_row = Vec::with_capacity(config.connections.len());
            let mut finish_row = Vec::with_capacity(config.connections.len());
            let mut dest_row = Vec::with_capacity(config.connections.len());

            for conn in &config.connections {
                let lookup = |id| {
                    registry
                        .host(id)
                        .ok_or_else(|| Error::topology(format!("unknown host {}", id)))
                };
                let sender = lookup(conn.src_host_id)?;
                let receiver = lookup(conn.dst_host_id)?;

                start_row.push(builder.build(sender, receiver, NotificationEvent::Start));
                finish_row.push(builder.build(sender, receiver, NotificationEvent::Finish));
                dest_row.push(sender.ip_addr);
            }

            debug!(
                config = index,
                connections = dest_row.len(),
                "Precomputed notifications"
            );

            start.push(start_row);
            finish.push(finish_row);
            destinations.push(dest_row);
        }

        Ok(Self {
            start,
            finish,
            destinations,
        })
    }

    /// Number of configurations covered
    pub fn configuration_count(&self) -> usize {
        self.destinations.len()
    }

    /// Datagrams for `event` in configuration `index`, in connection order
    pub fn messages(&self, index: usize, event: NotificationEvent) -> &[Bytes] {
        let table = match event {
            NotificationEvent::Start => &self.start,
            NotificationEvent::Finish => &self.finish,
        };
        table.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Destination addresses for configuration `index`, parallel to [`MessageTable::messages`]
    pub fn destinations(&self, index: usize) -> &[Ipv4Addr] {
        self.destinations
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
