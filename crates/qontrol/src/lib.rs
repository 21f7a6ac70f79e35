//! Switch driver for serial-attached multichannel voltage controllers.
//!
//! Each ring resonator of the photonic switch is tuned by one controller
//! channel. Applying a configuration writes one voltage command per ring;
//! resetting drives every channel to zero.
//!
//! # Example
//!
//! ```no_run
//! use qontrol::QontrolDriver;
//! use reconfig::SwitchDriver;
//! use std::path::Path;
//! use std::time::Duration;
//!
//! # fn main() -> common::Result<()> {
//! let mut driver =
//!     QontrolDriver::open(Path::new("/dev/ttyUSB1"), 115200, Duration::from_millis(500), true)?;
//! driver.reset_all()?;
//! # Ok(())
//! # }
//! ```

mod command;
mod driver;
mod serial;

pub use command::{Command, QontrolError};
pub use driver::{DryRunDriver, QontrolDriver};
