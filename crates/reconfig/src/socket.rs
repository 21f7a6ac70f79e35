//! Raw IPv4 transport for notification datagrams.
//!
//! The socket is opened with `IP_HDRINCL`, so the kernel sends the
//! precomputed IPv4 header as-is instead of generating its own.

use crate::types::SIGNAL_PROTOCOL;
use common::{Error, Result};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::os::fd::AsRawFd;
use tracing::info;

/// Sends fully formed IP datagrams
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send {
    /// Transmit `packet` verbatim to `destination`
    fn send(&self, packet: &[u8], destination: Ipv4Addr) -> Result<usize>;
}

/// Raw socket bound to the controller address
pub struct RawSocket {
    socket: Socket,
    source: Ipv4Addr,
}

impl RawSocket {
    /// Open and bind the raw socket (requires CAP_NET_RAW)
    pub fn new(source: Ipv4Addr) -> Result<Self> {
        let socket = Socket::new(
            Domain::IPV4,
            Type::RAW,
            Some(Protocol::from(SIGNAL_PROTOCOL as i32)),
        )
        .map_err(|e| Error::transport(format!("failed to open raw socket: {}", e)))?;

        socket
            .bind(&SocketAddr::new(IpAddr::V4(source), 0).into())
            .map_err(|e| Error::transport(format!("failed to bind raw socket to {}: {}", source, e)))?;

        // We provide the IP header ourselves
        let on: libc::c_int = 1;
        let rc = unsafe {
            libc::setsockopt(
                socket.as_raw_fd(),
                libc::IPPROTO_IP,
                libc::IP_HDRINCL,
                &on as *const _ as *const libc::c_void,
                std::mem::size_of::<libc::c_int>() as libc::socklen_t,
            )
        };
        if rc < 0 {
            return Err(Error::transport(format!(
                "setsockopt(IP_HDRINCL) failed: {}",
                io::Error::last_os_error()
            )));
        }

        info!(source = %source, "Opened raw notification socket");

        Ok(Self { socket, source })
    }

    /// Address the socket is bound to
    pub fn source(&self) -> Ipv4Addr {
        self.source
    }
}

impl Transport for RawSocket {
    fn send(&self, packet: &[u8], destination: Ipv4Addr) -> Result<usize> {
        let addr = SocketAddr::new(IpAddr::V4(destination), 0);
        self.socket
            .send_to(packet, &addr.into())
            .map_err(|e| Error::transport(format!("send to {} failed: {}", destination, e)))
    }
}

/// Determine the local address the kernel would route `probe` through.
///
/// Connecting a UDP socket sends nothing; it only selects a route.
pub fn discover_local_addr(probe: SocketAddr) -> Result<Ipv4Addr> {
    let unspecified = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0);
    let socket = UdpSocket::bind(unspecified)?;
    socket.connect(probe)?;

    match socket.local_addr()?.ip() {
        IpAddr::V4(addr) if !addr.is_unspecified() => Ok(addr),
        other => Err(Error::transport(format!(
            "route probe towards {} yielded unusable local address {}",
            probe, other
        ))),
    }
}
