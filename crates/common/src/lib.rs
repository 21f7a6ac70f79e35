//! Common utilities and types shared across the reconfiguration components.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
