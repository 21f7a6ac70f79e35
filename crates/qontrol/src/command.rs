//! ASCII command protocol of the voltage controller.
//!
//! Commands are single lines of the form `<header><channel>=<value>\n`.
//! The controller answers each command with one line: `OK` on success or
//! an error code starting with `E`.

use std::fmt;

/// Error reported while talking to the controller
#[derive(Debug, thiserror::Error)]
pub enum QontrolError {
    #[error("no response within {0:?}")]
    Timeout(std::time::Duration),

    #[error("device reported {0}")]
    Device(String),

    #[error("unexpected response {0:?}")]
    Unexpected(String),
}

/// One controller command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Set a single channel voltage
    SetVoltage { channel: u16, volts: f64 },
    /// Set every channel to 0 V
    ZeroAll,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SetVoltage { channel, volts } => writeln!(f, "v{}={:.4}", channel, volts),
            Command::ZeroAll => writeln!(f, "vall=0"),
        }
    }
}

/// Interpret one response line (without the trailing newline)
pub fn parse_response(line: &str) -> Result<(), QontrolError> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("ok") {
        Ok(())
    } else if line.starts_with('E') || line.starts_with('e') {
        Err(QontrolError::Device(line.to_string()))
    } else {
        Err(QontrolError::Unexpected(line.to_string()))
    }
}
