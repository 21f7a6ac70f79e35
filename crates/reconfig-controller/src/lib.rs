//! Reconfiguration controller daemon
//!
//! Loads the controller configuration and the switch topology, precomputes
//! every host notification, and drives the photonic switch through its
//! configurations round-robin.
//!
//! # Components
//!
//! - **Config**: YAML settings with validation and search paths
//! - **Topology**: host directory and configuration sequence
//! - **Controller**: address resolution and wiring of socket, driver, and orchestrator

pub mod cli;
pub mod config;
pub mod controller;
pub mod topology;

pub use cli::Cli;
pub use config::{Config, ConfigError, LogFormat};
pub use controller::{Controller, resolve_source};
