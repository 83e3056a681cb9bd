// src/term/cursor.rs

//! Shadow cursor kept in step with the program's own output.
//!
//! Every write goes through [`CursorMock::write`], which replays the bytes
//! against a model of the terminal cursor before passing them on. The model
//! never asks the terminal anything: it learns an absolute position only
//! from an absolute move or from a Cursor Position Report the caller hands
//! to [`CursorMock::observe_position_report`].
//!
//! Rows and columns are 1-based and clamped to the terminal size, which is
//! read from the OS once per write.

use crate::ansi::commands::{parse_position_report, OutputCommand, SGR_RESET};
use crate::ansi::lexer::Tokens;
use crate::io::traits::{Dimensions, TerminalIo};

use anyhow::Result;
use log::{debug, trace};

/// Deepest the saved-position and saved-style stacks grow. A save past this
/// depth drops the oldest entry, so a program that saves without restoring
/// runs in bounded memory.
pub const MAX_SAVED_DEPTH: usize = 64;

/// Row and column, each `None` while unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CursorState {
    pub row: Option<u32>,
    pub column: Option<u32>,
}

impl CursorState {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn at(row: u32, column: u32) -> Self {
        CursorState {
            row: Some(row),
            column: Some(column),
        }
    }

    pub fn is_known(&self) -> bool {
        self.row.is_some() && self.column.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CursorMock {
    state: CursorState,
    /// Saved by DECSC, restored by DECRC.
    positions: Vec<CursorState>,
    /// SGR sequences in effect since the last reset, in order.
    style: Vec<Vec<u8>>,
    /// Saved by XTPUSHSGR, restored by XTPOPSGR.
    styles: Vec<Vec<Vec<u8>>>,
}

impl CursorMock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(&self) -> Option<u32> {
        self.state.row
    }

    pub fn column(&self) -> Option<u32> {
        self.state.column
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn style(&self) -> &[Vec<u8>] {
        &self.style
    }

    pub fn saved_positions(&self) -> usize {
        self.positions.len()
    }

    pub fn saved_styles(&self) -> usize {
        self.styles.len()
    }

    /// Forgets the position, as after a redraw or anything else that may
    /// have moved the cursor behind the model's back.
    pub fn invalidate(&mut self) {
        debug!("CursorMock: Position invalidated (was {:?})", self.state);
        self.state = CursorState::unknown();
    }

    /// Takes row and column from `ESC [ row ; column R`. Returns false,
    /// changing nothing, for any other bytes.
    pub fn observe_position_report(&mut self, bytes: &[u8]) -> bool {
        match parse_position_report(bytes) {
            Some((row, column)) => {
                debug!("CursorMock: Position reported as ({}, {})", row, column);
                self.state = CursorState::at(row, column);
                true
            }
            None => false,
        }
    }

    /// Replays `bytes` against the model and writes the result to `io`.
    pub fn write<T: TerminalIo + ?Sized>(&mut self, io: &mut T, bytes: &[u8]) -> Result<()> {
        let dims = io.terminal_size()?;
        let out = self.replay(bytes, dims);
        if !out.is_empty() {
            io.write_bytes(&out)?;
        }
        Ok(())
    }

    /// Updates the model for `bytes` and returns what should reach the
    /// terminal. That is `bytes` itself, except where style push and pop
    /// are emulated.
    pub fn replay(&mut self, bytes: &[u8], dims: Dimensions) -> Vec<u8> {
        let mut out = Vec::with_capacity(bytes.len());
        let mut tokens = Tokens::output(bytes);
        for token in tokens.by_ref() {
            let command = OutputCommand::from_token(&token);
            match command {
                OutputCommand::PushGraphicRendition => self.push_style(),
                OutputCommand::PopGraphicRendition => self.pop_style(&mut out),
                _ => {
                    self.apply(&command, token.bytes, dims);
                    out.extend_from_slice(token.bytes);
                }
            }
        }
        // An unfinished sequence at the end of a write is passed on untouched.
        out.extend_from_slice(tokens.remainder());
        trace!("CursorMock: Now {:?}", self.state);
        out
    }

    fn apply(&mut self, command: &OutputCommand, bytes: &[u8], dims: Dimensions) {
        match *command {
            OutputCommand::Text(cells) => self.move_right(cells, dims),
            OutputCommand::Backspace => self.move_left(1, dims),
            OutputCommand::CarriageReturn => self.state.column = Some(1),
            OutputCommand::LineFeed => self.move_down(1, dims),
            OutputCommand::CursorUp(n) => self.move_up(n, dims),
            OutputCommand::CursorDown(n) => self.move_down(n, dims),
            OutputCommand::CursorForward(n) => self.move_right(n, dims),
            OutputCommand::CursorBackward(n) => self.move_left(n, dims),
            OutputCommand::CursorColumnAbsolute(column) => {
                self.state.column = Some(clamp(i64::from(column), dims.columns));
            }
            OutputCommand::CursorRowAbsolute(row) => {
                self.state.row = Some(clamp(i64::from(row), dims.rows));
            }
            OutputCommand::CursorPosition { row, column } => {
                self.state.row = Some(clamp(i64::from(row), dims.rows));
                self.state.column = Some(clamp(i64::from(column), dims.columns));
            }
            OutputCommand::SaveCursor => push_bounded(&mut self.positions, self.state, "position"),
            OutputCommand::RestoreCursor => {
                if let Some(saved) = self.positions.pop() {
                    self.state = saved;
                }
            }
            OutputCommand::SelectGraphicRendition { reset: true } => self.style.clear(),
            OutputCommand::SelectGraphicRendition { reset: false } => {
                self.style.push(bytes.to_vec());
            }
            OutputCommand::PushGraphicRendition
            | OutputCommand::PopGraphicRendition
            | OutputCommand::CursorPositionReport { .. }
            | OutputCommand::Other => {}
        }
    }

    fn push_style(&mut self) {
        push_bounded(&mut self.styles, self.style.clone(), "style");
    }

    /// Writes a plain reset, then reapplies the popped style.
    fn pop_style(&mut self, out: &mut Vec<u8>) {
        out.extend_from_slice(SGR_RESET);
        self.style = self.styles.pop().unwrap_or_default();
        for sgr in &self.style {
            out.extend_from_slice(sgr);
        }
    }

    fn move_up(&mut self, n: u32, dims: Dimensions) {
        if let Some(row) = self.state.row {
            self.state.row = Some(clamp(i64::from(row) - i64::from(n), dims.rows));
        }
    }

    fn move_down(&mut self, n: u32, dims: Dimensions) {
        if let Some(row) = self.state.row {
            self.state.row = Some(clamp(i64::from(row) + i64::from(n), dims.rows));
        }
    }

    fn move_left(&mut self, n: u32, dims: Dimensions) {
        if let Some(column) = self.state.column {
            self.state.column = Some(clamp(i64::from(column) - i64::from(n), dims.columns));
        }
    }

    fn move_right(&mut self, n: u32, dims: Dimensions) {
        if let Some(column) = self.state.column {
            self.state.column = Some(clamp(i64::from(column) + i64::from(n), dims.columns));
        }
    }
}

fn push_bounded<V>(stack: &mut Vec<V>, value: V, what: &str) {
    if stack.len() >= MAX_SAVED_DEPTH {
        debug!(
            "CursorMock: More than {} saved {}s, dropping the oldest",
            MAX_SAVED_DEPTH, what
        );
        stack.remove(0);
    }
    stack.push(value);
}

/// Clamps a 1-based coordinate to `[1, max]`.
fn clamp(value: i64, max: u32) -> u32 {
    let max = max.max(1);
    let value = value.clamp(1, i64::from(max));
    // In range [1, max] after the clamp above.
    value as u32
}
