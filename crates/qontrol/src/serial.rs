//! Serial line setup for the controller.

use common::{Error, Result};
use nix::sys::termios::{self, BaudRate, FlushArg, SetArg, SpecialCharacterIndices};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Longest read timeout termios can express (VTIME is a u8 in deciseconds)
const MAX_READ_TIMEOUT: Duration = Duration::from_millis(25_500);

fn baud_rate(baud: u32) -> Result<BaudRate> {
    Ok(match baud {
        9600 => BaudRate::B9600,
        19200 => BaudRate::B19200,
        38400 => BaudRate::B38400,
        57600 => BaudRate::B57600,
        115200 => BaudRate::B115200,
        230400 => BaudRate::B230400,
        460800 => BaudRate::B460800,
        921600 => BaudRate::B921600,
        other => return Err(Error::switch(format!("unsupported baud rate {}", other))),
    })
}

/// Convert a read timeout to VTIME deciseconds, rounding up
fn vtime(timeout: Duration) -> u8 {
    let timeout = timeout.min(MAX_READ_TIMEOUT);
    timeout.as_millis().div_ceil(100).max(1) as u8
}

/// Open `path` as a raw 8N1 serial line.
///
/// Reads return after `read_timeout` with zero bytes if nothing arrived.
pub fn open(path: &Path, baud: u32, read_timeout: Duration) -> Result<File> {
    let speed = baud_rate(baud)?;

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(libc::O_NOCTTY)
        .open(path)
        .map_err(|e| Error::switch(format!("failed to open {}: {}", path.display(), e)))?;

    let termios_err = |e: nix::Error| Error::switch(format!("termios on {}: {}", path.display(), e));

    let mut tio = termios::tcgetattr(&file).map_err(termios_err)?;
    termios::cfmakeraw(&mut tio);
    termios::cfsetspeed(&mut tio, speed).map_err(termios_err)?;
    tio.control_chars[SpecialCharacterIndices::VMIN as usize] = 0;
    tio.control_chars[SpecialCharacterIndices::VTIME as usize] = vtime(read_timeout);
    termios::tcsetattr(&file, SetArg::TCSANOW, &tio).map_err(termios_err)?;
    termios::tcflush(&file, FlushArg::TCIOFLUSH).map_err(termios_err)?;

    debug!(port = %path.display(), baud, "Opened serial line");
    Ok(file)
}
