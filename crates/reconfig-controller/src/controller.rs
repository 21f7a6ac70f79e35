//! Startup wiring: address resolution, precompute, and the run loop.

use crate::config::{Config, NetworkSettings};
use crate::topology;
use common::Result;
use qontrol::{DryRunDriver, QontrolDriver};
use reconfig::{
    CancelToken, ConfigurationRegistry, MessageTable, NotificationEvent, Orchestrator,
    PacketBuilder, RawSocket, SignalPacket, SwitchDriver, SystemClock, discover_local_addr,
};
use std::net::Ipv4Addr;
use std::path::Path;
use tracing::{info, warn};

/// Fully prepared controller, ready to open its resources and run
pub struct Controller {
    config: Config,
    source: Ipv4Addr,
    registry: ConfigurationRegistry,
    table: MessageTable,
}

/// Controller address from configuration, or from a route probe
pub fn resolve_source(network: &NetworkSettings) -> Result<Ipv4Addr> {
    match network.source_ip {
        Some(ip) => Ok(ip),
        None => {
            let ip = discover_local_addr(network.probe_addr)?;
            info!(source = %ip, probe = %network.probe_addr, "Discovered controller address");
            Ok(ip)
        }
    }
}

impl Controller {
    /// Resolve the source address, load the topology, and precompute
    /// every notification.
    pub fn prepare(config: Config) -> Result<Self> {
        let source = resolve_source(&config.network)?;

        let registry = topology::load(&config.topology.path)?;
        info!(
            path = %config.topology.path.display(),
            configurations = registry.configuration_count(),
            "Loaded topology"
        );

        let table = MessageTable::precompute(&registry, &PacketBuilder::new(source))?;

        Ok(Self {
            config,
            source,
            registry,
            table,
        })
    }

    pub fn source(&self) -> Ipv4Addr {
        self.source
    }

    pub fn registry(&self) -> &ConfigurationRegistry {
        &self.registry
    }

    pub fn table(&self) -> &MessageTable {
        &self.table
    }

    /// Log every configuration and its decoded notifications
    pub fn log_plan(&self) {
        for index in 0..self.registry.configuration_count() {
            let Some(config) = self.registry.configuration_at(index) else {
                continue;
            };
            info!(
                config = index,
                name = config.name.as_deref().unwrap_or("-"),
                connections = config.connections.len(),
                rings = config.ring_voltages.len(),
                duration_ms = config.duration_ms,
                "Configuration"
            );

            for event in [NotificationEvent::Start, NotificationEvent::Finish] {
                let messages = self.table.messages(index, event);
                for (packet, dest) in messages.iter().zip(self.table.destinations(index)) {
                    match SignalPacket::parse(packet) {
                        Ok(p) => info!(
                            config = index,
                            event = %p.event,
                            dest = %dest,
                            dest_host_id = p.dest_host_id,
                            src_port = p.src_port,
                            dst_port = p.dst_port,
                            "Planned notification"
                        ),
                        Err(e) => warn!(config = index, dest = %dest, error = %e, "Invalid planned notification"),
                    }
                }
            }
        }
    }

    fn open_driver(&self) -> Result<Box<dyn SwitchDriver>> {
        let switch = &self.config.switch;
        if switch.dry_run {
            info!("Dry run: switch driver disabled");
            return Ok(Box::new(DryRunDriver::new()));
        }

        let driver = QontrolDriver::open(
            Path::new(&switch.serial_port),
            switch.baud_rate,
            switch.response_timeout,
            switch.expect_ack,
        )?;
        Ok(Box::new(driver))
    }

    /// Open the raw socket and switch driver, then run until `cancel` fires.
    ///
    /// Blocks the calling thread.
    pub fn run(self, cancel: CancelToken) -> Result<()> {
        let socket = RawSocket::new(self.source)?;
        let driver = self.open_driver()?;
        let zero_on_start = self.config.switch.zero_on_start;

        let mut orchestrator = Orchestrator::new(
            self.registry,
            self.table,
            socket,
            driver,
            SystemClock,
            self.config.timings(),
        )?
        .with_cancel_token(cancel);

        if zero_on_start {
            orchestrator.zero_switch()?;
        }

        orchestrator.run()
    }
}
