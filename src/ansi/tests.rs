// src/ansi/tests.rs

use crate::ansi::{take_one, take_one_output, RunKind, TokenResult, Tokens};

fn complete(len: usize, kind: RunKind) -> TokenResult {
    TokenResult::Complete { len, kind }
}

// --- Empty and incomplete input ---

#[test]
fn test_empty_buffer_is_incomplete() {
    assert_eq!(take_one(b""), TokenResult::Incomplete);
}

#[test]
fn test_escape_prefixes_are_incomplete() {
    assert_eq!(take_one(b"\x1b"), TokenResult::Incomplete);
    assert_eq!(take_one(b"\x1b["), TokenResult::Incomplete);
    assert_eq!(take_one(b"\x1b[1;5"), TokenResult::Incomplete);
    assert_eq!(take_one(b"\x1bO"), TokenResult::Incomplete);
    assert_eq!(take_one(b"\x1b[M"), TokenResult::Incomplete);
    assert_eq!(take_one(b"\x1b[M a"), TokenResult::Incomplete);
}

#[test]
fn test_split_arrow_key_completes_only_when_whole() {
    let whole = b"\x1b[A";
    for cut in 1..whole.len() {
        assert_eq!(take_one(&whole[..cut]), TokenResult::Incomplete, "cut {}", cut);
    }
    assert_eq!(take_one(whole), complete(3, RunKind::Escape));
}

// --- Control and escape sequences ---

#[test]
fn test_single_control_bytes() {
    assert_eq!(take_one(b"\x03rest"), complete(1, RunKind::Control));
    assert_eq!(take_one(b"\x7f"), complete(1, RunKind::Control));
    assert_eq!(take_one(b"\x00"), complete(1, RunKind::Control));
    assert_eq!(take_one(b"\r\n"), complete(1, RunKind::Control));
}

#[test]
fn test_csi_and_ss3() {
    assert_eq!(take_one(b"\x1b[A"), complete(3, RunKind::Escape));
    assert_eq!(take_one(b"\x1b[1;2Cxyz"), complete(6, RunKind::Escape));
    assert_eq!(take_one(b"\x1b[15~"), complete(5, RunKind::Escape));
    assert_eq!(take_one(b"\x1b[#{"), complete(4, RunKind::Escape));
    assert_eq!(take_one(b"\x1bOP"), complete(3, RunKind::Escape));
}

#[test]
fn test_csi_cut_short_returns_prefix() {
    assert_eq!(take_one(b"\x1b[1\x1b[A"), complete(3, RunKind::Escape));
    assert_eq!(take_one(b"\x1b[\r"), complete(2, RunKind::Escape));
    assert_eq!(take_one(b"\x1b[2\xc3\xa9"), complete(3, RunKind::Escape));
}

#[test]
fn test_meta_key_and_lone_escape() {
    assert_eq!(take_one(b"\x1bx"), complete(2, RunKind::Escape));
    assert_eq!(take_one(b"\x1b\x1b"), complete(1, RunKind::Control));
    assert_eq!(take_one(b"\x1b\r"), complete(1, RunKind::Control));
    assert_eq!(take_one(b"\x1b\xc3\xa9"), complete(1, RunKind::Control));
}

#[test]
fn test_mouse_report_is_six_bytes() {
    assert_eq!(take_one(b"\x1b[M !!more"), complete(6, RunKind::MouseReport));
    // Raw coordinate bytes may be anything, including bytes that look like text.
    assert_eq!(take_one(b"\x1b[M\x20\xff\x1b"), complete(6, RunKind::MouseReport));
}

#[test]
fn test_output_has_no_mouse_reports() {
    assert_eq!(take_one_output(b"\x1b[Mhello"), complete(3, RunKind::Escape));
    assert_eq!(take_one_output(b"\x1b[M"), complete(3, RunKind::Escape));
    assert_eq!(take_one_output(b"\x1b["), TokenResult::Incomplete);
    let kinds: Vec<RunKind> = Tokens::output(b"\x1b[M\x1b[3B").map(|t| t.kind).collect();
    assert_eq!(kinds, vec![RunKind::Escape, RunKind::Escape]);
}

// --- Text and invalid bytes ---

#[test]
fn test_text_run_stops_at_control() {
    assert_eq!(take_one(b"hello\rworld"), complete(5, RunKind::Text));
    assert_eq!(take_one(b"abc"), complete(3, RunKind::Text));
}

#[test]
fn test_multibyte_utf8() {
    assert_eq!(take_one("é".as_bytes()), complete(2, RunKind::Text));
    assert_eq!(take_one(b"\xc3"), TokenResult::Incomplete);
    assert_eq!(take_one(b"\xe2\x80"), TokenResult::Incomplete);
    assert_eq!(take_one(b"ab\xc3"), complete(2, RunKind::Text));
    assert_eq!(take_one(b"\xc3\xa9x"), complete(3, RunKind::Text));
}

#[test]
fn test_invalid_bytes_stand_alone() {
    assert_eq!(take_one(b"\xff"), TokenResult::InvalidByte);
    assert_eq!(take_one(b"\x80abc"), TokenResult::InvalidByte);
    assert_eq!(take_one(b"ab\xff"), complete(2, RunKind::Text));
    // Truncated by a non-continuation byte.
    assert_eq!(take_one(b"\xc3A"), TokenResult::InvalidByte);
    assert_eq!(take_one(b"\xc3\r"), TokenResult::InvalidByte);
    assert_eq!(TokenResult::InvalidByte.len(), 1);
}

// --- Token iteration ---

#[test]
fn test_tokens_iterates_and_keeps_remainder() {
    let input = b"ab\x1b[A\r\xff\x1b[";
    let mut tokens = Tokens::new(input);
    let kinds: Vec<(RunKind, Vec<u8>)> = tokens
        .by_ref()
        .map(|t| (t.kind, t.bytes.to_vec()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (RunKind::Text, b"ab".to_vec()),
            (RunKind::Escape, b"\x1b[A".to_vec()),
            (RunKind::Control, b"\r".to_vec()),
            (RunKind::Invalid, b"\xff".to_vec()),
        ]
    );
    assert_eq!(tokens.remainder(), b"\x1b[");
}

#[test]
fn test_token_to_run_copies_bytes() {
    let token = Tokens::new(b"\x1bOA").next().unwrap();
    let run = token.to_run();
    assert_eq!(run.kind, RunKind::Escape);
    assert_eq!(run.as_bytes(), b"\x1bOA");
    assert_eq!(run.len(), 3);
    assert!(!run.is_empty());
}
