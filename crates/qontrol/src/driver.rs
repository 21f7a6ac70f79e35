//! Switch driver implementations.

use crate::command::{Command, QontrolError, parse_response};
use crate::serial;
use common::{Error, Result};
use reconfig::{Configuration, SwitchDriver};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Longest response line accepted from the controller
const MAX_RESPONSE_LEN: usize = 256;

/// Drives ring resonator voltages over the controller's command port
pub struct QontrolDriver<P> {
    port: P,
    response_timeout: Duration,
    expect_ack: bool,
}

impl QontrolDriver<File> {
    /// Open the serial port at `path`
    pub fn open(path: &Path, baud: u32, response_timeout: Duration, expect_ack: bool) -> Result<Self> {
        let port = serial::open(path, baud, response_timeout)?;
        info!(port = %path.display(), baud, "Voltage controller connected");
        Ok(Self::new(port, response_timeout, expect_ack))
    }
}

impl<P: Read + Write> QontrolDriver<P> {
    /// Wrap an already configured port.
    ///
    /// Reads on `port` must return 0 bytes once `response_timeout` elapses.
    pub fn new(port: P, response_timeout: Duration, expect_ack: bool) -> Self {
        Self {
            port,
            response_timeout,
            expect_ack,
        }
    }

    /// Consume the driver, returning the port
    pub fn into_inner(self) -> P {
        self.port
    }

    fn issue(&mut self, command: Command) -> Result<()> {
        let line = command.to_string();
        debug!(command = line.trim_end(), "Issuing controller command");
        self.port.write_all(line.as_bytes())?;
        self.port.flush()?;

        if self.expect_ack {
            let response = self.read_line()?;
            parse_response(&response)
                .map_err(|e| Error::switch(format!("{}: {}", line.trim_end(), e)))?;
        }
        Ok(())
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];

        loop {
            match self.port.read(&mut byte)? {
                0 => return Err(Error::switch(QontrolError::Timeout(self.response_timeout))),
                _ if byte[0] == b'\n' => break,
                _ => line.push(byte[0]),
            }
            if line.len() > MAX_RESPONSE_LEN {
                return Err(Error::switch("response line too long"));
            }
        }

        Ok(String::from_utf8_lossy(&line).into_owned())
    }
}

impl<P: Read + Write + Send> SwitchDriver for QontrolDriver<P> {
    fn reset_all(&mut self) -> Result<()> {
        self.issue(Command::ZeroAll)?;
        info!("Zeroing complete");
        Ok(())
    }

    fn apply(&mut self, configuration: &Configuration) -> Result<()> {
        info!(
            name = configuration.name.as_deref().unwrap_or("-"),
            rings = configuration.ring_voltages.len(),
            "Setting configuration"
        );
        for setting in &configuration.ring_voltages {
            self.issue(Command::SetVoltage {
                channel: setting.ring,
                volts: setting.voltage,
            })?;
            info!(ring = setting.ring, voltage = setting.voltage, "Set ring voltage");
        }
        Ok(())
    }
}

/// Logs every operation instead of touching hardware
#[derive(Debug, Default)]
pub struct DryRunDriver {
    resets: u64,
    applies: u64,
}

impl DryRunDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resets(&self) -> u64 {
        self.resets
    }

    pub fn applies(&self) -> u64 {
        self.applies
    }
}

impl SwitchDriver for DryRunDriver {
    fn reset_all(&mut self) -> Result<()> {
        self.resets += 1;
        info!("Dry run: zeroing all channels");
        Ok(())
    }

    fn apply(&mut self, configuration: &Configuration) -> Result<()> {
        self.applies += 1;
        for setting in &configuration.ring_voltages {
            info!(ring = setting.ring, voltage = setting.voltage, "Dry run: set ring voltage");
        }
        Ok(())
    }
}
