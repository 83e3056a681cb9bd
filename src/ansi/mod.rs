// src/ansi/mod.rs

//! Byte-level handling of ANSI/VT traffic in both directions.
//!
//! `lexer` cuts raw bytes into whole tokens; `commands` gives the tokens
//! that matter to a cursor a typed meaning.

pub mod commands;
pub mod lexer;

pub use commands::{parse_position_report, CsiSequence, OutputCommand};
pub use lexer::{is_c0, take_one, take_one_output, ByteRun, RunKind, Token, TokenResult, Tokens};

#[cfg(test)]
mod tests;
