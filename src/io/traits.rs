// src/io/traits.rs

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Size of the terminal in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub rows: u32,
    pub columns: u32,
}

impl Dimensions {
    pub fn new(rows: u32, columns: u32) -> Self {
        Dimensions { rows, columns }
    }
}

/// Byte-level access to one terminal.
///
/// Implementations are blocking and single-threaded. The caller owns the
/// handle for the whole session.
pub trait TerminalIo {
    /// Blocks until at least one byte is available and returns what was read.
    ///
    /// # Returns
    /// * `Result<Vec<u8>>`: between one byte and the configured chunk size.
    ///   End of input is an error, never an empty vector.
    fn read_bytes(&mut self) -> Result<Vec<u8>>;

    /// Writes every byte of `bytes` and flushes.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    /// Waits up to `timeout` for input to become readable.
    ///
    /// `None` waits indefinitely; `Some(Duration::ZERO)` only checks.
    ///
    /// # Returns
    /// * `Result<bool>`: true if a `read_bytes` call would not block.
    fn poll(&mut self, timeout: Option<Duration>) -> Result<bool>;

    /// Current size as reported by the OS. Never cached.
    fn terminal_size(&self) -> Result<Dimensions>;
}
