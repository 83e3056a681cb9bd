// src/terminal.rs

//! One terminal session: chords in, cursor-tracked writes out.
//!
//! [`ChordsTerminal`] owns the terminal handle together with the reader and
//! the shadow cursor for it, so every byte in either direction passes the
//! component that has to see it.

use crate::ansi::commands::DSR_FOR_CPR;
use crate::config::CONFIG;
use crate::io::traits::{Dimensions, TerminalIo};
use crate::reader::{ChordEvent, ChordReader};
use crate::term::CursorMock;

use anyhow::{Context, Result};
use log::{debug, error};
use std::time::Duration;

pub struct ChordsTerminal<T: TerminalIo> {
    io: T,
    reader: ChordReader,
    cursor: CursorMock,
    /// Written in reverse order on close.
    exit_writes: Vec<Vec<u8>>,
    crlf_print: bool,
}

impl<T: TerminalIo> ChordsTerminal<T> {
    /// A session over `io`, configured from `CONFIG`.
    pub fn new(io: T) -> Self {
        Self::with_reader(io, ChordReader::new())
    }

    pub fn with_reader(io: T, reader: ChordReader) -> Self {
        ChordsTerminal {
            io,
            reader,
            cursor: CursorMock::new(),
            exit_writes: Vec::new(),
            crlf_print: CONFIG.output.crlf_print,
        }
    }

    /// Writes `enter` now and remembers `exit` for [`ChordsTerminal::close`].
    pub fn enter(&mut self, enter: &[u8], exit: &[u8]) -> Result<()> {
        self.write(enter)?;
        self.exit_writes.push(exit.to_vec());
        Ok(())
    }

    /// Writes the pending exit sequences, most recent first.
    ///
    /// Also runs on drop; calling it first lets the caller see errors.
    pub fn close(&mut self) -> Result<()> {
        while let Some(exit) = self.exit_writes.pop() {
            self.write(&exit).context("ChordsTerminal: Failed to write exit sequence")?;
        }
        Ok(())
    }

    /// The next chord, raw run, or partial read.
    ///
    /// Position reports are also given to the shadow cursor.
    pub fn read_chord(&mut self) -> Result<ChordEvent> {
        let event = self.reader.read_chord(&mut self.io)?;
        if let ChordEvent::Raw(run) = &event {
            if self.cursor.observe_position_report(run.as_bytes()) {
                debug!("ChordsTerminal: Cursor resynced to {:?}", self.cursor.state());
            }
        }
        Ok(event)
    }

    /// True if `read_chord` would return without blocking.
    pub fn poll(&mut self, timeout: Option<Duration>) -> Result<bool> {
        self.reader.poll(&mut self.io, timeout)
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.cursor.write(&mut self.io, bytes)
    }

    pub fn write_str(&mut self, text: &str) -> Result<()> {
        self.write(text.as_bytes())
    }

    /// Writes `text` and ends the line.
    pub fn print_line(&mut self, text: &str) -> Result<()> {
        let mut bytes = Vec::with_capacity(text.len() + 2);
        bytes.extend_from_slice(text.as_bytes());
        if self.crlf_print {
            bytes.push(b'\r');
        }
        bytes.push(b'\n');
        self.write(&bytes)
    }

    /// Forgets the cursor position and asks the terminal for it again.
    ///
    /// The reply arrives through [`ChordsTerminal::read_chord`].
    pub fn redraw(&mut self) -> Result<()> {
        self.cursor.invalidate();
        self.write(DSR_FOR_CPR)
    }

    pub fn cursor(&self) -> &CursorMock {
        &self.cursor
    }

    pub fn reader(&self) -> &ChordReader {
        &self.reader
    }

    pub fn reader_mut(&mut self) -> &mut ChordReader {
        &mut self.reader
    }

    pub fn size(&self) -> Result<Dimensions> {
        self.io.terminal_size()
    }

    pub fn io(&self) -> &T {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut T {
        &mut self.io
    }
}

impl<T: TerminalIo> Drop for ChordsTerminal<T> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!("ChordsTerminal: Error during cleanup in drop: {:#}", e);
        }
    }
}
