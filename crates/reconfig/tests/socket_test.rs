//! Raw socket integration tests
//!
//! These tests require CAP_NET_RAW to run.
//! Run with: sudo -E RECONFIG_TEST_ENABLED=1 cargo test --test socket_test

use reconfig::{
    HostInformation, NotificationEvent, PacketBuilder, RawSocket, SIGNAL_PROTOCOL, SignalPacket,
    Transport,
};
use socket2::{Domain, Protocol, Socket, Type};
use std::env;
use std::mem::MaybeUninit;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Check if integration tests are enabled
fn integration_tests_enabled() -> bool {
    env::var("RECONFIG_TEST_ENABLED").is_ok()
}

fn loopback_host(host_id: u16, nic_id: u8) -> HostInformation {
    HostInformation {
        host_id,
        host_name: format!("host{}", host_id),
        ip_addr: Ipv4Addr::LOCALHOST,
        nic_id,
    }
}

#[test]
fn test_notification_delivered_over_loopback() {
    if !integration_tests_enabled() {
        println!("Skipping integration test (set RECONFIG_TEST_ENABLED=1 to run)");
        return;
    }

    let receiver = Socket::new(
        Domain::IPV4,
        Type::RAW,
        Some(Protocol::from(SIGNAL_PROTOCOL as i32)),
    )
    .expect("receiver socket (needs CAP_NET_RAW)");
    receiver
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();

    let sender = RawSocket::new(Ipv4Addr::LOCALHOST).expect("raw socket (needs CAP_NET_RAW)");
    let packet = PacketBuilder::new(Ipv4Addr::LOCALHOST).build(
        &loopback_host(1, 17),
        &loopback_host(2, 19),
        NotificationEvent::Start,
    );

    let sent = sender.send(&packet, Ipv4Addr::LOCALHOST).unwrap();
    assert_eq!(sent, packet.len());

    // Other ICMP traffic on loopback may arrive first
    let mut buf = [MaybeUninit::<u8>::uninit(); 1500];
    for _ in 0..16 {
        let Ok(len) = receiver.recv(&mut buf) else {
            break;
        };
        let data: Vec<u8> = buf[..len]
            .iter()
            .map(|b| unsafe { b.assume_init() })
            .collect();

        if let Ok(parsed) = SignalPacket::parse(&data) {
            assert_eq!(parsed.event, NotificationEvent::Start);
            assert_eq!(parsed.dest_host_id, 2);
            assert_eq!(parsed.src_port, 17);
            assert_eq!(parsed.dst_port, 19);
            println!("✓ Loopback delivery test passed");
            return;
        }
    }

    panic!("notification not received on loopback");
}
