// src/ansi/commands.rs

//! Typed view of single whole tokens, as written by the program itself or
//! as reported back by the terminal.
//!
//! Only the sequences that move the cursor or change the rendition are
//! given variants. Everything else is `Other`, which callers treat as
//! "write through, change nothing".

use super::lexer::{RunKind, Token, ESC_BYTE};
use log::trace;

// --- C0 bytes with cursor effects ---
const BS: u8 = 0x08;
const LF: u8 = 0x0A;
const CR: u8 = 0x0D;

// --- Two-byte escapes ---
const DECSC_FINAL: u8 = b'7';
const DECRC_FINAL: u8 = b'8';

// --- CSI finals ---
const CUU: u8 = b'A';
const CUD: u8 = b'B';
const CUF: u8 = b'C';
const CUB: u8 = b'D';
const CHA: u8 = b'G';
const CUP: u8 = b'H';
const VPA: u8 = b'd';
const SGR: u8 = b'm';
const CPR: u8 = b'R';
const XTPUSHSGR: u8 = b'{';
const XTPOPSGR: u8 = b'}';
const XTSGR_INTERMEDIATE: u8 = b'#';
const PARAM_SEPARATOR: u8 = b';';

/// Device Status Report asking for the Cursor Position Report.
pub const DSR_FOR_CPR: &[u8] = b"\x1b[6n";
/// Select Graphic Rendition with no parameters: plain text.
pub const SGR_RESET: &[u8] = b"\x1b[m";
pub const DECSC: &[u8] = b"\x1b7";
pub const DECRC: &[u8] = b"\x1b8";
pub const XT_PUSH_SGR: &[u8] = b"\x1b[#{";
pub const XT_POP_SGR: &[u8] = b"\x1b[#}";

/// One whole token classified by its effect on a terminal cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputCommand {
    /// Printable text occupying this many cells, one per character.
    ///
    /// Wide characters (CJK, most emoji) are still counted as one cell, so
    /// the column under-advances after them. A redraw and position report
    /// resynchronise.
    Text(u32),
    Backspace,
    CarriageReturn,
    LineFeed,
    CursorUp(u32),
    CursorDown(u32),
    CursorForward(u32),
    CursorBackward(u32),
    /// CHA, 1-based.
    CursorColumnAbsolute(u32),
    /// VPA, 1-based.
    CursorRowAbsolute(u32),
    /// CUP, 1-based.
    CursorPosition { row: u32, column: u32 },
    SaveCursor,
    RestoreCursor,
    /// SGR; `reset` when it carries no parameters other than zero.
    SelectGraphicRendition { reset: bool },
    PushGraphicRendition,
    PopGraphicRendition,
    /// CPR as the terminal replies to `DSR_FOR_CPR`.
    CursorPositionReport { row: u32, column: u32 },
    Other,
}

impl OutputCommand {
    pub fn from_token(token: &Token<'_>) -> OutputCommand {
        let command = match token.kind {
            RunKind::Text => {
                let cells = String::from_utf8_lossy(token.bytes).chars().count();
                OutputCommand::Text(u32::try_from(cells).unwrap_or(u32::MAX))
            }
            RunKind::Control => match token.bytes {
                [BS] => OutputCommand::Backspace,
                [CR] => OutputCommand::CarriageReturn,
                [LF] => OutputCommand::LineFeed,
                _ => OutputCommand::Other,
            },
            RunKind::Escape => Self::from_escape(token.bytes),
            RunKind::MouseReport | RunKind::Invalid => OutputCommand::Other,
        };
        trace!("classified {:02X?} as {:?}", token.bytes, command);
        command
    }

    fn from_escape(bytes: &[u8]) -> OutputCommand {
        match bytes {
            [ESC_BYTE, DECSC_FINAL] => OutputCommand::SaveCursor,
            [ESC_BYTE, DECRC_FINAL] => OutputCommand::RestoreCursor,
            _ => match CsiSequence::parse(bytes) {
                Some(csi) => csi.to_command(),
                None => OutputCommand::Other,
            },
        }
    }
}

/// A parsed `ESC [ params intermediates final` sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsiSequence {
    /// Numeric parameters; `None` where a field was left empty.
    pub params: Vec<Option<u32>>,
    /// A leading private marker such as `?` or `>`, if any.
    pub private_marker: Option<u8>,
    pub intermediates: Vec<u8>,
    pub final_byte: u8,
}

impl CsiSequence {
    /// Parses one whole CSI sequence. Returns `None` for anything else,
    /// including a CSI cut short before its final byte.
    pub fn parse(bytes: &[u8]) -> Option<CsiSequence> {
        let body = bytes.strip_prefix(b"\x1b[")?;
        let (&final_byte, head) = body.split_last()?;
        if !(0x40..=0x7E).contains(&final_byte) {
            return None;
        }

        let split = head
            .iter()
            .position(|b| (0x20..=0x2F).contains(b))
            .unwrap_or(head.len());
        let (param_bytes, intermediates) = head.split_at(split);
        if param_bytes.iter().any(|b| !(0x30..=0x3F).contains(b))
            || intermediates.iter().any(|b| !(0x20..=0x2F).contains(b))
        {
            return None;
        }

        let (private_marker, param_bytes) = match param_bytes.first() {
            Some(&m) if (b'<'..=b'?').contains(&m) => (Some(m), &param_bytes[1..]),
            _ => (None, param_bytes),
        };

        let mut params = Vec::new();
        if !param_bytes.is_empty() {
            for field in param_bytes.split(|&b| b == PARAM_SEPARATOR) {
                params.push(parse_decimal(field)?);
            }
        }

        Some(CsiSequence {
            params,
            private_marker,
            intermediates: intermediates.to_vec(),
            final_byte,
        })
    }

    /// The parameter at `index`, or `default` when absent, empty, or zero.
    pub fn param_or(&self, index: usize, default: u32) -> u32 {
        match self.params.get(index) {
            Some(Some(n)) if *n != 0 => *n,
            _ => default,
        }
    }

    fn to_command(&self) -> OutputCommand {
        if self.private_marker.is_some() {
            return OutputCommand::Other;
        }
        match (self.intermediates.as_slice(), self.final_byte) {
            ([], CUU) if self.params.len() <= 1 => OutputCommand::CursorUp(self.param_or(0, 1)),
            ([], CUD) if self.params.len() <= 1 => OutputCommand::CursorDown(self.param_or(0, 1)),
            ([], CUF) if self.params.len() <= 1 => {
                OutputCommand::CursorForward(self.param_or(0, 1))
            }
            ([], CUB) if self.params.len() <= 1 => {
                OutputCommand::CursorBackward(self.param_or(0, 1))
            }
            ([], CHA) if self.params.len() <= 1 => {
                OutputCommand::CursorColumnAbsolute(self.param_or(0, 1))
            }
            ([], VPA) if self.params.len() <= 1 => {
                OutputCommand::CursorRowAbsolute(self.param_or(0, 1))
            }
            ([], CUP) if self.params.len() <= 2 => OutputCommand::CursorPosition {
                row: self.param_or(0, 1),
                column: self.param_or(1, 1),
            },
            ([], SGR) => OutputCommand::SelectGraphicRendition {
                reset: self.params.iter().all(|p| p.unwrap_or(0) == 0),
            },
            ([], CPR) if self.params.len() == 2 && self.params.iter().all(Option::is_some) => {
                OutputCommand::CursorPositionReport {
                    row: self.param_or(0, 1),
                    column: self.param_or(1, 1),
                }
            }
            ([XTSGR_INTERMEDIATE], XTPUSHSGR) => OutputCommand::PushGraphicRendition,
            ([XTSGR_INTERMEDIATE], XTPOPSGR) => OutputCommand::PopGraphicRendition,
            _ => OutputCommand::Other,
        }
    }
}

/// Parses `ESC [ row ; column R`. Both fields must be present.
pub fn parse_position_report(bytes: &[u8]) -> Option<(u32, u32)> {
    match CsiSequence::parse(bytes)?.to_command() {
        OutputCommand::CursorPositionReport { row, column } => Some((row, column)),
        _ => None,
    }
}

/// Digits to a saturating `u32`; an empty field is `Some(None)`, any
/// non-digit makes the whole sequence unparseable.
fn parse_decimal(field: &[u8]) -> Option<Option<u32>> {
    if field.is_empty() {
        return Some(None);
    }
    let mut value: u32 = 0;
    for &b in field {
        if !b.is_ascii_digit() {
            return None;
        }
        value = value.saturating_mul(10).saturating_add(u32::from(b - b'0'));
    }
    Some(Some(value))
}
