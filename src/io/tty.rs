// src/io/tty.rs

//! Raw-mode access to the controlling terminal.
//!
//! [`RawMode::enter`] opens `/dev/tty`, saves its attributes, and switches it
//! to raw (non-canonical, non-echoing, no signals). The returned
//! [`RawModeGuard`] restores the saved attributes when dropped, which covers
//! early returns and unwinding panics alike.

use crate::config::CONFIG;
use crate::io::traits::{Dimensions, TerminalIo};

use anyhow::{Context, Result};
use libc::{winsize, TIOCGWINSZ};
use log::{debug, error, trace};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::mem;
use std::os::unix::io::{AsRawFd, RawFd};
use std::time::Duration;
use termios::{cfmakeraw, tcsetattr, Termios, TCSADRAIN, TCSAFLUSH};

const TTY_PATH: &str = "/dev/tty";

/// Entry point for raw terminal sessions.
pub struct RawMode;

impl RawMode {
    /// Opens the controlling terminal and puts it in raw mode.
    pub fn enter() -> Result<RawModeGuard> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(TTY_PATH)
            .with_context(|| format!("RawMode: Failed to open {}", TTY_PATH))?;
        let fd = file.as_raw_fd();

        let saved = Termios::from_fd(fd).context("RawMode: Failed to get terminal attributes")?;
        let mut raw = saved;
        cfmakeraw(&mut raw);
        tcsetattr(fd, TCSAFLUSH, &raw).context("RawMode: Failed to set raw terminal attributes")?;
        debug!("RawMode: {} (fd {}) set to raw mode.", TTY_PATH, fd);

        Ok(RawModeGuard {
            file,
            saved,
            chunk_size: CONFIG.input.read_chunk_size.max(1),
        })
    }
}

/// An open terminal in raw mode. Restores the saved attributes on drop.
pub struct RawModeGuard {
    file: File,
    saved: Termios,
    chunk_size: usize,
}

impl RawModeGuard {
    pub fn fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }

    fn restore(&self) -> Result<()> {
        tcsetattr(self.fd(), TCSADRAIN, &self.saved)
            .context("RawMode: Failed to restore terminal attributes")
    }
}

impl TerminalIo for RawModeGuard {
    fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.chunk_size];
        loop {
            match self.file.read(&mut buf) {
                Ok(0) => {
                    return Err(anyhow::anyhow!("RawMode: End of input on {}", TTY_PATH));
                }
                Ok(n) => {
                    buf.truncate(n);
                    trace!("RawMode: Read {} bytes: {:02X?}", n, buf);
                    return Ok(buf);
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(anyhow::Error::from(e).context("RawMode: Failed to read"));
                }
            }
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        trace!("RawMode: Writing {} bytes: {:02X?}", bytes.len(), bytes);
        self.file
            .write_all(bytes)
            .context("RawMode: Failed to write")?;
        self.file.flush().context("RawMode: Failed to flush")
    }

    fn poll(&mut self, timeout: Option<Duration>) -> Result<bool> {
        let timeout_ms: libc::c_int = match timeout {
            None => -1,
            Some(d) => libc::c_int::try_from(d.as_millis()).unwrap_or(libc::c_int::MAX),
        };
        let mut pollfd = libc::pollfd {
            fd: self.fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        loop {
            // SAFETY: `pollfd` is a single valid, initialized entry.
            let ready = unsafe { libc::poll(&mut pollfd, 1, timeout_ms) };
            if ready < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(anyhow::Error::from(err).context("RawMode: poll failed"));
            }
            return Ok(ready > 0 && (pollfd.revents & libc::POLLIN) != 0);
        }
    }

    fn terminal_size(&self) -> Result<Dimensions> {
        get_terminal_size_cells(self.fd())
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            error!("RawMode: Error during cleanup in drop: {:#}", e);
        } else {
            debug!("RawMode: Terminal attributes restored.");
        }
    }
}

/// Rows and columns from `TIOCGWINSZ`, with configured defaults for zeros.
fn get_terminal_size_cells(fd: RawFd) -> Result<Dimensions> {
    // SAFETY: `winsz` is a plain C struct that the ioctl fills in.
    unsafe {
        let mut winsz: winsize = mem::zeroed();
        if libc::ioctl(fd, TIOCGWINSZ, &mut winsz) == -1 {
            return Err(anyhow::Error::from(io::Error::last_os_error())
                .context("RawMode: ioctl(TIOCGWINSZ) failed"));
        }
        let rows = if winsz.ws_row == 0 {
            CONFIG.output.default_rows
        } else {
            u32::from(winsz.ws_row)
        };
        let columns = if winsz.ws_col == 0 {
            CONFIG.output.default_columns
        } else {
            u32::from(winsz.ws_col)
        };
        Ok(Dimensions { rows, columns })
    }
}
