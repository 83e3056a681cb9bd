// src/io/mock.rs

//! In-memory terminal for tests and headless drivers.
//!
//! Input is scripted as a queue of chunks, each returned by exactly one
//! `read_bytes` call, so tests control how a sequence is split across reads.
//! Every write is recorded.

use crate::io::traits::{Dimensions, TerminalIo};

use anyhow::{bail, Result};
use log::trace;
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct MockTerminal {
    input: VecDeque<Vec<u8>>,
    writes: Vec<Vec<u8>>,
    dimensions: Dimensions,
    read_count: usize,
}

impl MockTerminal {
    pub fn new(rows: u32, columns: u32) -> Self {
        MockTerminal {
            input: VecDeque::new(),
            writes: Vec::new(),
            dimensions: Dimensions::new(rows, columns),
            read_count: 0,
        }
    }

    /// Builder form of [`MockTerminal::push_input`] for several chunks.
    pub fn with_input<I, B>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        for chunk in chunks {
            self.push_input(chunk.as_ref());
        }
        self
    }

    /// Queues one chunk to be returned by one read. Empty chunks are skipped.
    pub fn push_input(&mut self, chunk: &[u8]) {
        if !chunk.is_empty() {
            self.input.push_back(chunk.to_vec());
        }
    }

    /// Simulates a resize; takes effect on the next size query.
    pub fn set_dimensions(&mut self, rows: u32, columns: u32) {
        self.dimensions = Dimensions::new(rows, columns);
    }

    /// Every byte written so far, in order.
    pub fn output(&self) -> Vec<u8> {
        self.writes.concat()
    }

    /// Each `write_bytes` call separately.
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    pub fn clear_output(&mut self) {
        self.writes.clear();
    }

    /// Number of successful `read_bytes` calls.
    pub fn read_count(&self) -> usize {
        self.read_count
    }

    pub fn pending_input(&self) -> usize {
        self.input.len()
    }
}

impl TerminalIo for MockTerminal {
    fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let Some(chunk) = self.input.pop_front() else {
            bail!("MockTerminal: End of scripted input");
        };
        self.read_count += 1;
        trace!("MockTerminal: Read {:02X?}", chunk);
        Ok(chunk)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.writes.push(bytes.to_vec());
        Ok(())
    }

    fn poll(&mut self, _timeout: Option<Duration>) -> Result<bool> {
        Ok(!self.input.is_empty())
    }

    fn terminal_size(&self) -> Result<Dimensions> {
        Ok(self.dimensions)
    }
}
