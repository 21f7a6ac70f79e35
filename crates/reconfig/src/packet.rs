//! Reconfiguration signaling packet format.
//!
//! Each notification is a bare IPv4 datagram carrying the ICMP protocol
//! number and an 8-byte signaling header. It is not an ICMP message; the
//! protocol number only gets it through the raw socket.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  Type (= 9)   | Code (0 / 1)  |           Checksum            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |      Destination Host ID      |  Source Port  |   Dest Port   |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use crate::checksum::checksum;
use crate::types::{
    DEFAULT_TTL, HostId, HostInformation, IPV4_HEADER_LEN, NotificationEvent, PACKET_LEN,
    SIGNAL_HEADER_LEN, SIGNAL_PROTOCOL, SIGNAL_TYPE,
};
use bytes::{BufMut, Bytes, BytesMut};
use common::{Error, Result};
use std::net::Ipv4Addr;

/// Version 4, header length 5 words
const IPV4_VERSION_IHL: u8 = 0x45;

/// Offset of the checksum inside the IPv4 header
const IPV4_CHECKSUM_OFFSET: usize = 10;

/// Offset of the checksum inside the signaling header
const SIGNAL_CHECKSUM_OFFSET: usize = 2;

/// Logical fields of one notification datagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalPacket {
    /// Controller address
    pub source: Ipv4Addr,

    /// Address of the notified host
    pub destination: Ipv4Addr,

    /// Start or finish
    pub event: NotificationEvent,

    /// Peer host the change concerns
    pub dest_host_id: HostId,

    /// NIC id of the notified host
    pub src_port: u8,

    /// NIC id of the peer host
    pub dst_port: u8,
}

impl SignalPacket {
    /// Serialize to a complete 28-byte datagram with both checksums set
    pub fn to_bytes(&self) -> Bytes {
        let mut signal = BytesMut::with_capacity(SIGNAL_HEADER_LEN);
        signal.put_u8(SIGNAL_TYPE);
        signal.put_u8(self.event.code());
        signal.put_u16(0);
        signal.put_u16(self.dest_host_id);
        signal.put_u8(self.src_port);
        signal.put_u8(self.dst_port);
        let sum = checksum(&signal);
        signal[SIGNAL_CHECKSUM_OFFSET..SIGNAL_CHECKSUM_OFFSET + 2].copy_from_slice(&sum.to_be_bytes());

        let mut buf = BytesMut::with_capacity(PACKET_LEN);
        buf.put_u8(IPV4_VERSION_IHL);
        buf.put_u8(0); // Type of service
        buf.put_u16(PACKET_LEN as u16);
        buf.put_u16(0); // Identification
        buf.put_u16(0); // Flags & fragment offset
        buf.put_u8(DEFAULT_TTL);
        buf.put_u8(SIGNAL_PROTOCOL);
        buf.put_u16(0);
        buf.put_slice(&self.source.octets());
        buf.put_slice(&self.destination.octets());
        let sum = checksum(&buf[..IPV4_HEADER_LEN]);
        buf[IPV4_CHECKSUM_OFFSET..IPV4_CHECKSUM_OFFSET + 2].copy_from_slice(&sum.to_be_bytes());

        buf.put_slice(&signal);
        buf.freeze()
    }

    /// Parse a datagram produced by [`SignalPacket::to_bytes`].
    ///
    /// Both checksums must verify.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() != PACKET_LEN {
            return Err(Error::packet(format!(
                "expected {} bytes, got {}",
                PACKET_LEN,
                data.len()
            )));
        }

        let (ip, signal) = data.split_at(IPV4_HEADER_LEN);

        if ip[0] != IPV4_VERSION_IHL {
            return Err(Error::packet(format!("unexpected version/IHL 0x{:02x}", ip[0])));
        }
        if u16::from_be_bytes([ip[2], ip[3]]) as usize != PACKET_LEN {
            return Err(Error::packet("total length mismatch"));
        }
        if ip[9] != SIGNAL_PROTOCOL {
            return Err(Error::packet(format!("unexpected protocol {}", ip[9])));
        }
        if checksum(ip) != 0 {
            return Err(Error::packet("IPv4 header checksum mismatch"));
        }

        if signal[0] != SIGNAL_TYPE {
            return Err(Error::packet(format!("unexpected signal type {}", signal[0])));
        }
        let event = NotificationEvent::from_code(signal[1])
            .ok_or_else(|| Error::packet(format!("unknown signal code {}", signal[1])))?;
        if checksum(signal) != 0 {
            return Err(Error::packet("signal header checksum mismatch"));
        }

        Ok(Self {
            source: Ipv4Addr::new(ip[12], ip[13], ip[14], ip[15]),
            destination: Ipv4Addr::new(ip[16], ip[17], ip[18], ip[19]),
            event,
            dest_host_id: u16::from_be_bytes([signal[4], signal[5]]),
            src_port: signal[6],
            dst_port: signal[7],
        })
    }
}

/// Builds notification datagrams sourced from the controller address
#[derive(Debug, Clone, Copy)]
pub struct PacketBuilder {
    source: Ipv4Addr,
}

impl PacketBuilder {
    pub fn new(source: Ipv4Addr) -> Self {
        Self { source }
    }

    /// Build the datagram for one connection.
    ///
    /// `sender` is the connection's source host. The datagram is addressed
    /// to it, since its egress link is the one changing; `receiver` is the
    /// peer written into the destination host id field.
    pub fn build(
        &self,
        sender: &HostInformation,
        receiver: &HostInformation,
        event: NotificationEvent,
    ) -> Bytes {
        SignalPacket {
            source: self.source,
            destination: sender.ip_addr,
            event,
            dest_host_id: receiver.host_id,
            src_port: sender.nic_id,
            dst_port: receiver.nic_id,
        }
        .to_bytes()
    }
}
