//! Reconfiguration data types and structures.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Signal type carried in the first byte of the signaling header
pub const SIGNAL_TYPE: u8 = 9;

/// IP protocol number the signaling header is layered over (ICMP)
pub const SIGNAL_PROTOCOL: u8 = 1;

/// IPv4 header length without options
pub const IPV4_HEADER_LEN: usize = 20;

/// Signaling header length
pub const SIGNAL_HEADER_LEN: usize = 8;

/// Total length of a notification datagram (no payload)
pub const PACKET_LEN: usize = IPV4_HEADER_LEN + SIGNAL_HEADER_LEN;

/// TTL written into every notification
pub const DEFAULT_TTL: u8 = 64;

/// Default wait between start notifications and the fabric change
pub const DEFAULT_PRE_GUARD: Duration = Duration::from_millis(50);

/// Default wait between the fabric change and finish notifications
pub const DEFAULT_POST_GUARD: Duration = Duration::from_millis(7000);

/// Host identifier (carried as a 16-bit field on the wire)
pub type HostId = u16;

/// A host attached to the switch fabric
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInformation {
    /// Unique host id
    pub host_id: HostId,

    /// Human-readable host name
    pub host_name: String,

    /// Address the host is reachable on for notifications
    pub ip_addr: Ipv4Addr,

    /// Interface id of the reconfigurable NIC
    pub nic_id: u8,
}

/// A directed link between two hosts in a configuration.
///
/// Serialized as a `[src, dst, wavelength]` triplet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(HostId, HostId, u16)", into = "(HostId, HostId, u16)")]
pub struct Connection {
    pub src_host_id: HostId,
    pub dst_host_id: HostId,
    /// Reserved, not used by the notification logic
    pub wavelength_id: u16,
}

impl Connection {
    pub fn new(src_host_id: HostId, dst_host_id: HostId, wavelength_id: u16) -> Self {
        Self {
            src_host_id,
            dst_host_id,
            wavelength_id,
        }
    }
}

impl From<(HostId, HostId, u16)> for Connection {
    fn from((src, dst, wavelength): (HostId, HostId, u16)) -> Self {
        Self::new(src, dst, wavelength)
    }
}

impl From<Connection> for (HostId, HostId, u16) {
    fn from(conn: Connection) -> Self {
        (conn.src_host_id, conn.dst_host_id, conn.wavelength_id)
    }
}

/// Voltage setting for one ring resonator channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingVoltage {
    pub ring: u16,
    pub voltage: f64,
}

/// One switch configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Optional label used in logs
    #[serde(default)]
    pub name: Option<String>,

    /// Links affected by this configuration, in notification order
    pub connections: Vec<Connection>,

    /// How long the configuration stays active, in milliseconds
    pub duration_ms: u64,

    /// Fabric settings, passed through to the switch driver untouched
    #[serde(default)]
    pub ring_voltages: Vec<RingVoltage>,
}

impl Configuration {
    /// Hold duration after activation
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Notification event, encoded as the signal code byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationEvent {
    /// Reconfiguration is about to start
    Start,
    /// New configuration is live
    Finish,
}

impl NotificationEvent {
    pub fn code(self) -> u8 {
        match self {
            NotificationEvent::Start => 0,
            NotificationEvent::Finish => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(NotificationEvent::Start),
            1 => Some(NotificationEvent::Finish),
            _ => None,
        }
    }
}

impl std::fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationEvent::Start => write!(f, "START"),
            NotificationEvent::Finish => write!(f, "FINISH"),
        }
    }
}

/// Orchestrator phase enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconfigPhase {
    /// Not yet started, or stopped after cancellation
    Idle,
    /// Sending start notifications
    NotifyStart,
    /// Waiting for hosts to quiesce
    PreGuard,
    /// Switch driver is applying the configuration
    Switching,
    /// Waiting for the fabric to settle
    PostGuard,
    /// Sending finish notifications
    NotifyFinish,
    /// Configuration is active
    Hold,
}

impl std::fmt::Display for ReconfigPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconfigPhase::Idle => write!(f, "IDLE"),
            ReconfigPhase::NotifyStart => write!(f, "NOTIFY_START"),
            ReconfigPhase::PreGuard => write!(f, "PRE_GUARD"),
            ReconfigPhase::Switching => write!(f, "SWITCHING"),
            ReconfigPhase::PostGuard => write!(f, "POST_GUARD"),
            ReconfigPhase::NotifyFinish => write!(f, "NOTIFY_FINISH"),
            ReconfigPhase::Hold => write!(f, "HOLD"),
        }
    }
}

/// Guard intervals around the physical switch change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub pre_guard: Duration,
    pub post_guard: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            pre_guard: DEFAULT_PRE_GUARD,
            post_guard: DEFAULT_POST_GUARD,
        }
    }
}

/// Outcome of one full reconfiguration cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Configuration that was applied
    pub index: usize,

    /// Configuration the next cycle will apply
    pub next_index: usize,

    /// Hold duration read from the applied configuration
    pub hold: Duration,

    /// Notifications handed to the transport
    pub notifications_sent: usize,

    /// Notifications the transport rejected
    pub send_failures: usize,

    /// Whether the hold was cut short by cancellation
    pub hold_interrupted: bool,
}

/// Orchestrator statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrchestratorStats {
    /// Completed cycles
    pub cycles_completed: u64,

    /// Notifications sent successfully
    pub notifications_sent: u64,

    /// Failed sends
    pub send_failures: u64,
}
