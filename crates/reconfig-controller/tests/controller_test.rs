//! Integration tests for controller startup

use reconfig::NotificationEvent;
use reconfig_controller::{Config, Controller, resolve_source};
use std::io::Write;
use std::net::Ipv4Addr;
use tempfile::NamedTempFile;

const SAMPLE_TOPOLOGY: &str = include_str!("../config/topology.yaml");
const SAMPLE_CONFIG: &str = include_str!("../config/controller.yaml");

fn topology_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn config_for(topology: &NamedTempFile) -> Config {
    let mut config = Config::default();
    config.network.source_ip = Some(Ipv4Addr::new(10, 0, 0, 254));
    config.switch.dry_run = true;
    config.topology.path = topology.path().to_path_buf();
    config
}

#[test]
fn test_sample_config_is_valid() {
    let config = Config::from_yaml(SAMPLE_CONFIG).unwrap();
    assert_eq!(config.timings(), reconfig::Timings::default());
    assert!(config.network.source_ip.is_none());
}

#[test]
fn test_prepare_precomputes_every_notification() {
    let topology = topology_file(SAMPLE_TOPOLOGY);
    let controller = Controller::prepare(config_for(&topology)).unwrap();

    assert_eq!(controller.source(), Ipv4Addr::new(10, 0, 0, 254));
    assert_eq!(controller.registry().configuration_count(), 2);

    let table = controller.table();
    for index in 0..2 {
        for event in [NotificationEvent::Start, NotificationEvent::Finish] {
            let messages = table.messages(index, event);
            assert_eq!(messages.len(), 4);
            for packet in messages {
                assert_eq!(&packet[12..16], &[10, 0, 0, 254]);
                assert_eq!(packet[21], event.code());
            }
        }
    }

    // Plan logging must not need the raw socket
    controller.log_plan();
}

#[test]
fn test_prepare_fails_on_missing_topology() {
    let topology = topology_file(SAMPLE_TOPOLOGY);
    let mut config = config_for(&topology);
    config.topology.path = "/nonexistent/topology.yaml".into();

    assert!(Controller::prepare(config).is_err());
}

#[test]
fn test_prepare_fails_on_invalid_topology() {
    let topology = topology_file(
        r#"
hosts: []
configurations: []
"#,
    );
    assert!(Controller::prepare(config_for(&topology)).is_err());
}

#[test]
fn test_explicit_source_skips_probe() {
    let mut config = Config::default();
    config.network.source_ip = Some(Ipv4Addr::new(192, 168, 7, 1));
    // Not consulted when source_ip is set
    config.network.probe_addr = "0.0.0.0:0".parse().unwrap();

    assert_eq!(
        resolve_source(&config.network).unwrap(),
        Ipv4Addr::new(192, 168, 7, 1)
    );
}

#[test]
fn test_probe_through_loopback() {
    let mut config = Config::default();
    config.network.probe_addr = "127.0.0.1:9".parse().unwrap();

    let source = resolve_source(&config.network).unwrap();
    assert!(source.is_loopback());
}
