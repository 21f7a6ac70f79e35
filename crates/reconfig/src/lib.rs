//! Host notification for photonic circuit-switch reconfiguration.
//!
//! Switching the fabric briefly disrupts every affected link. Before each
//! change the controller tells the hosts whose links are torn down, waits a
//! guard interval, applies the change through a [`SwitchDriver`], waits for
//! the fabric to settle, then tells the hosts the new configuration is live.
//!
//! # Features
//!
//! - Raw IPv4 signaling datagrams (type 9 over the ICMP protocol number)
//! - All datagrams precomputed once at startup
//! - Configurable guard intervals and an injectable [`Clock`]
//! - Best-effort delivery: a failed send never aborts a cycle
//!
//! # Example
//!
//! ```no_run
//! use reconfig::{
//!     ConfigurationRegistry, MessageTable, Orchestrator, PacketBuilder, RawSocket,
//!     SwitchDriver, SystemClock, Timings, Topology,
//! };
//!
//! # fn example(topology: Topology, driver: impl SwitchDriver) -> common::Result<()> {
//! let source = "10.0.0.254".parse().unwrap();
//! let registry = ConfigurationRegistry::new(topology)?;
//! let table = MessageTable::precompute(&registry, &PacketBuilder::new(source))?;
//!
//! // Requires CAP_NET_RAW
//! let socket = RawSocket::new(source)?;
//! let mut orchestrator =
//!     Orchestrator::new(registry, table, socket, driver, SystemClock, Timings::default())?;
//! orchestrator.run()?;
//! # Ok(())
//! # }
//! ```

pub mod checksum;
mod clock;
mod driver;
mod orchestrator;
mod packet;
mod registry;
mod socket;
mod table;
mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::SwitchDriver;
pub use orchestrator::{CancelToken, Orchestrator};
pub use packet::{PacketBuilder, SignalPacket};
pub use registry::{ConfigurationRegistry, Topology};
pub use socket::{RawSocket, Transport, discover_local_addr};
pub use table::MessageTable;
pub use types::{
    Configuration, Connection, CycleReport, DEFAULT_POST_GUARD, DEFAULT_PRE_GUARD, HostId,
    HostInformation, NotificationEvent, OrchestratorStats, PACKET_LEN, ReconfigPhase,
    RingVoltage, SIGNAL_PROTOCOL, SIGNAL_TYPE, Timings,
};
