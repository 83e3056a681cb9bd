// src/lib.rs

//! Raw terminal keyboard input as symbolic chords, and terminal output
//! through a shadow cursor that never has to ask where it is.
//!
//! Input: [`reader::ChordReader`] cuts bytes with [`ansi::lexer`] and names
//! them with [`keys::table`]. Output: [`term::CursorMock`] replays each write
//! to keep row, column and style in step with the terminal.
//! [`terminal::ChordsTerminal`] ties both to one [`io::TerminalIo`].

pub mod ansi;
pub mod config;
pub mod io;
pub mod keys;
pub mod reader;
pub mod term;
pub mod terminal;

pub use io::{Dimensions, MockTerminal, RawMode, RawModeGuard, TerminalIo};
pub use keys::{bytes_to_chord, chord_to_bytes, control, Chord, Modifiers};
pub use reader::{ChordEvent, ChordReader};
pub use term::{CursorMock, CursorState};
pub use terminal::ChordsTerminal;
