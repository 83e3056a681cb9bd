// src/ansi/lexer.rs

//! Terminal byte-stream tokenizer.
//!
//! Splits an accumulating byte buffer into whole tokens, one at a time:
//! legacy mouse reports, C0 control bytes, escape sequences (CSI, SS3 and
//! two-byte Meta forms), runs of UTF-8 text, and single undecodable bytes.
//! The tokenizer is a pure function of the buffer: it never blocks and never
//! consumes more than one token per call, and a token is only reported once
//! all of its bytes are present.

use log::trace;
use std::str;

// --- Constants for Control Code Ranges ---
const C0_CONTROL_RANGE: core::ops::RangeInclusive<u8> = 0x00..=0x1F;
const DEL_BYTE: u8 = 0x7F;
pub(crate) const ESC_BYTE: u8 = 0x1B;

// --- Constants for escape sequence introducers ---
const CSI_INTRODUCER: u8 = b'[';
const SS3_INTRODUCER: u8 = b'O';
const MOUSE_REPORT_FINAL: u8 = b'M';
const MOUSE_REPORT_LEN: usize = 6; // ESC [ M Cb Cx Cy

// --- Constants for CSI byte classes (ECMA-48 5.4) ---
const CSI_PARAMETER_RANGE: core::ops::RangeInclusive<u8> = 0x30..=0x3F;
const CSI_INTERMEDIATE_RANGE: core::ops::RangeInclusive<u8> = 0x20..=0x2F;
const CSI_FINAL_RANGE: core::ops::RangeInclusive<u8> = 0x40..=0x7E;

const FIRST_NON_ASCII: u8 = 0x80;

/// Returns true for the 33 C0 control bytes, 0x00-0x1F and DEL.
#[inline]
pub fn is_c0(byte: u8) -> bool {
    C0_CONTROL_RANGE.contains(&byte) || byte == DEL_BYTE
}

/// The classification of one whole token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunKind {
    /// One or more UTF-8 encoded characters, none of them C0.
    Text,
    /// A single C0 byte, including a lone ESC.
    Control,
    /// An ESC-prefixed sequence: CSI, SS3, or ESC plus one text byte.
    Escape,
    /// A legacy six-byte mouse report, `ESC [ M Cb Cx Cy`.
    MouseReport,
    /// A single byte that starts no valid UTF-8 encoding.
    Invalid,
}

/// Outcome of asking the tokenizer for one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenResult {
    /// The first `len` bytes form one whole token of the given kind.
    Complete { len: usize, kind: RunKind },
    /// More bytes are needed before a token can be taken.
    Incomplete,
    /// The first byte is undecodable and stands alone.
    InvalidByte,
}

impl TokenResult {
    /// Number of bytes the caller should consume, zero while incomplete.
    pub fn len(&self) -> usize {
        match self {
            TokenResult::Complete { len, .. } => *len,
            TokenResult::Incomplete => 0,
            TokenResult::InvalidByte => 1,
        }
    }

    pub fn is_incomplete(&self) -> bool {
        matches!(self, TokenResult::Incomplete)
    }
}

/// An owned, whole, classified token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ByteRun {
    pub kind: RunKind,
    pub bytes: Vec<u8>,
}

impl ByteRun {
    pub fn new(kind: RunKind, bytes: Vec<u8>) -> Self {
        ByteRun { kind, bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A borrowed, whole, classified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: RunKind,
    pub bytes: &'a [u8],
}

impl Token<'_> {
    pub fn to_run(&self) -> ByteRun {
        ByteRun::new(self.kind, self.bytes.to_vec())
    }
}

/// Takes exactly one whole token from the front of `buffer`.
///
/// Steps run in strict priority order: mouse report, control or escape
/// sequence, UTF-8 text run, then a single invalid byte. An empty buffer is
/// `Incomplete`.
pub fn take_one(buffer: &[u8]) -> TokenResult {
    let result = match take_mouse_report(buffer) {
        Some(mouse) => mouse,
        None => take_control_or_text(buffer),
    };
    trace!("take_one({:02X?}) -> {:?}", buffer, result);
    result
}

/// Like [`take_one`], for bytes the program writes rather than reads.
///
/// Mouse reports only arrive as input. On output `ESC [ M` is Delete Line
/// with its count left out, so it is taken as an ordinary CSI.
pub fn take_one_output(buffer: &[u8]) -> TokenResult {
    let result = take_control_or_text(buffer);
    trace!("take_one_output({:02X?}) -> {:?}", buffer, result);
    result
}

fn take_control_or_text(buffer: &[u8]) -> TokenResult {
    match buffer.first() {
        None => TokenResult::Incomplete,
        Some(&first) if is_c0(first) => take_control(buffer),
        Some(_) => take_text(buffer),
    }
}

/// Iterates the whole tokens at the front of a byte slice.
///
/// Iteration stops at the first incomplete token; [`Tokens::remainder`]
/// then holds the unconsumed tail.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rest: &'a [u8],
    output: bool,
}

impl<'a> Tokens<'a> {
    /// Tokens of keyboard input, see [`take_one`].
    pub fn new(bytes: &'a [u8]) -> Self {
        Tokens {
            rest: bytes,
            output: false,
        }
    }

    /// Tokens of program output, see [`take_one_output`].
    pub fn output(bytes: &'a [u8]) -> Self {
        Tokens {
            rest: bytes,
            output: true,
        }
    }

    /// Bytes not yet returned as tokens.
    pub fn remainder(&self) -> &'a [u8] {
        self.rest
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let result = if self.output {
            take_one_output(self.rest)
        } else {
            take_one(self.rest)
        };
        let (len, kind) = match result {
            TokenResult::Complete { len, kind } => (len, kind),
            TokenResult::InvalidByte => (1, RunKind::Invalid),
            TokenResult::Incomplete => return None,
        };
        let (bytes, rest) = self.rest.split_at(len);
        self.rest = rest;
        Some(Token { kind, bytes })
    }
}

/// `ESC [ M` plus three raw bytes of button, column and row.
fn take_mouse_report(buffer: &[u8]) -> Option<TokenResult> {
    if !buffer.starts_with(&[ESC_BYTE, CSI_INTRODUCER, MOUSE_REPORT_FINAL]) {
        return None;
    }
    if buffer.len() < MOUSE_REPORT_LEN {
        return Some(TokenResult::Incomplete);
    }
    Some(TokenResult::Complete {
        len: MOUSE_REPORT_LEN,
        kind: RunKind::MouseReport,
    })
}

fn take_control(buffer: &[u8]) -> TokenResult {
    if buffer[0] != ESC_BYTE {
        return TokenResult::Complete {
            len: 1,
            kind: RunKind::Control,
        };
    }

    let Some(&second) = buffer.get(1) else {
        return TokenResult::Incomplete;
    };

    match second {
        SS3_INTRODUCER => {
            if buffer.len() < 3 {
                TokenResult::Incomplete
            } else {
                TokenResult::Complete {
                    len: 3,
                    kind: RunKind::Escape,
                }
            }
        }
        CSI_INTRODUCER => take_csi(buffer),
        // ESC before another control or a non-ASCII byte is the Esc key alone.
        b if is_c0(b) || b >= FIRST_NON_ASCII => TokenResult::Complete {
            len: 1,
            kind: RunKind::Control,
        },
        _ => TokenResult::Complete {
            len: 2,
            kind: RunKind::Escape,
        },
    }
}

fn take_csi(buffer: &[u8]) -> TokenResult {
    let mut index = 2;
    while index < buffer.len() && CSI_PARAMETER_RANGE.contains(&buffer[index]) {
        index += 1;
    }
    while index < buffer.len() && CSI_INTERMEDIATE_RANGE.contains(&buffer[index]) {
        index += 1;
    }

    let Some(&next) = buffer.get(index) else {
        return TokenResult::Incomplete;
    };

    // A byte outside the final range cuts the CSI short; it starts the next token.
    let len = if CSI_FINAL_RANGE.contains(&next) {
        index + 1
    } else {
        index
    };
    TokenResult::Complete {
        len,
        kind: RunKind::Escape,
    }
}

fn take_text(buffer: &[u8]) -> TokenResult {
    let limit = buffer
        .iter()
        .position(|&b| is_c0(b))
        .unwrap_or(buffer.len());
    let candidate = &buffer[..limit];

    match str::from_utf8(candidate) {
        Ok(_) => TokenResult::Complete {
            len: limit,
            kind: RunKind::Text,
        },
        Err(err) if err.valid_up_to() > 0 => TokenResult::Complete {
            len: err.valid_up_to(),
            kind: RunKind::Text,
        },
        // Truncated at the very end of what has been read so far.
        Err(err) if err.error_len().is_none() && limit == buffer.len() => {
            TokenResult::Incomplete
        }
        Err(_) => TokenResult::InvalidByte,
    }
}
