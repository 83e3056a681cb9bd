// src/reader.rs

//! Turns a terminal's input bytes into one chord at a time.
//!
//! The reader holds every byte that has been read but not yet returned. It
//! reads again only when what it holds contains no whole token, so a caller
//! that handles one chord per call never makes the terminal wait.

use crate::ansi::lexer::{take_one, ByteRun, RunKind, TokenResult};
use crate::config::CONFIG;
use crate::io::traits::TerminalIo;
use crate::keys::{Chord, CHORD_TABLE};

use anyhow::Result;
use log::{debug, trace, warn};
use std::time::Duration;

/// Bytes read but not yet returned as a whole token.
///
/// `reported` counts the leading bytes already handed out as partial reads,
/// and never exceeds the buffer length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingBuffer {
    bytes: Vec<u8>,
    reported: usize,
}

impl PendingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
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

    pub fn reported_len(&self) -> usize {
        self.reported
    }

    /// Removes and returns the first `len` bytes.
    fn consume(&mut self, len: usize) -> Vec<u8> {
        let len = len.min(self.bytes.len());
        let taken: Vec<u8> = self.bytes.drain(..len).collect();
        self.reported = self.reported.saturating_sub(len);
        taken
    }

    /// Marks bytes up to `end` as reported, returning the newly marked ones.
    fn report_through(&mut self, end: usize) -> Vec<u8> {
        let end = end.min(self.bytes.len());
        if end <= self.reported {
            return Vec::new();
        }
        let fresh = self.bytes[self.reported..end].to_vec();
        self.reported = end;
        fresh
    }
}

/// One result of [`ChordReader::read_chord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChordEvent {
    /// A keystroke with a name, and the bytes that encoded it.
    Chord { chord: Chord, run: ByteRun },
    /// A whole token with no chord name: mouse reports, unlisted escape
    /// sequences such as position reports, undecodable bytes.
    Raw(ByteRun),
    /// Bytes of a token still being read, each byte reported once.
    Partial(Vec<u8>),
}

impl ChordEvent {
    pub fn chord(&self) -> Option<&Chord> {
        match self {
            ChordEvent::Chord { chord, .. } => Some(chord),
            _ => None,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            ChordEvent::Chord { run, .. } | ChordEvent::Raw(run) => run.as_bytes(),
            ChordEvent::Partial(bytes) => bytes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChordReader {
    pending: PendingBuffer,
    report_partial_reads: bool,
}

impl Default for ChordReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ChordReader {
    /// A reader configured from `CONFIG.input`.
    pub fn new() -> Self {
        Self::with_partial_reads(CONFIG.input.report_partial_reads)
    }

    pub fn with_partial_reads(report_partial_reads: bool) -> Self {
        ChordReader {
            pending: PendingBuffer::new(),
            report_partial_reads,
        }
    }

    pub fn set_partial_reads(&mut self, enabled: bool) {
        self.report_partial_reads = enabled;
    }

    pub fn pending(&self) -> &PendingBuffer {
        &self.pending
    }

    /// Appends bytes as if they had just been read.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.pending.push(bytes);
    }

    /// Blocks until one event is available and returns it.
    ///
    /// Reads from `io` only while the buffered bytes hold nothing to return,
    /// and then one read at a time.
    pub fn read_chord<T: TerminalIo + ?Sized>(&mut self, io: &mut T) -> Result<ChordEvent> {
        loop {
            if let Some(event) = self.try_take_event() {
                return Ok(event);
            }
            let chunk = io.read_bytes()?;
            trace!("ChordReader: Read {} bytes", chunk.len());
            self.pending.push(&chunk);
        }
    }

    /// The next event from buffered bytes alone, without reading.
    pub fn try_take_event(&mut self) -> Option<ChordEvent> {
        let result = take_one(self.pending.as_bytes());
        let span = match result {
            TokenResult::Incomplete => self.pending.len(),
            _ => result.len(),
        };

        if self.report_partial_reads {
            let fresh = self.pending.report_through(span);
            if !fresh.is_empty() {
                return Some(ChordEvent::Partial(fresh));
            }
        }

        let kind = match result {
            TokenResult::Complete { kind, .. } => kind,
            TokenResult::InvalidByte => RunKind::Invalid,
            TokenResult::Incomplete => return None,
        };
        let run = ByteRun::new(kind, self.pending.consume(span));
        Some(Self::classify(run))
    }

    /// True if `read_chord` would return without blocking.
    pub fn poll<T: TerminalIo + ?Sized>(
        &mut self,
        io: &mut T,
        timeout: Option<Duration>,
    ) -> Result<bool> {
        if self.has_event() {
            return Ok(true);
        }
        io.poll(timeout)
    }

    fn has_event(&self) -> bool {
        let result = take_one(self.pending.as_bytes());
        if !result.is_incomplete() {
            return true;
        }
        self.report_partial_reads && self.pending.reported_len() < self.pending.len()
    }

    fn classify(run: ByteRun) -> ChordEvent {
        let event = match run.kind {
            RunKind::Text | RunKind::Control => ChordEvent::Chord {
                chord: CHORD_TABLE.bytes_to_chord(run.as_bytes()),
                run,
            },
            RunKind::Escape => match CHORD_TABLE.lookup(run.as_bytes()) {
                Some(chord) => ChordEvent::Chord {
                    chord: chord.clone(),
                    run,
                },
                None => {
                    debug!("ChordReader: Unlisted escape sequence {:02X?}", run.bytes);
                    ChordEvent::Raw(run)
                }
            },
            RunKind::MouseReport => ChordEvent::Raw(run),
            RunKind::Invalid => {
                warn!("ChordReader: Undecodable input byte {:02X?}", run.bytes);
                ChordEvent::Raw(run)
            }
        };
        trace!("ChordReader: {:?}", event);
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::mock::MockTerminal;

    fn chord_names(reader: &mut ChordReader, io: &mut MockTerminal) -> Vec<String> {
        let mut names = Vec::new();
        while let Ok(event) = reader.read_chord(io) {
            match event {
                ChordEvent::Chord { chord, .. } => names.push(chord.to_string()),
                ChordEvent::Raw(run) => names.push(format!("raw:{:02X?}", run.bytes)),
                ChordEvent::Partial(bytes) => names.push(format!("partial:{:02X?}", bytes)),
            }
        }
        names
    }

    #[test_log::test]
    fn test_arrow_split_across_reads_is_one_chord() {
        let mut io = MockTerminal::new(24, 80).with_input([b"\x1b".to_vec(), b"[A".to_vec()]);
        let mut reader = ChordReader::with_partial_reads(false);
        let event = reader.read_chord(&mut io).unwrap();
        assert_eq!(event.chord().map(Chord::as_str), Some("↑"));
        assert_eq!(event.bytes(), b"\x1b[A");
        assert_eq!(io.read_count(), 2);
    }

    #[test]
    fn test_no_read_ahead_while_a_token_is_buffered() {
        let mut io =
            MockTerminal::new(24, 80).with_input([b"ab\x1b[B".to_vec(), b"z".to_vec()]);
        let mut reader = ChordReader::with_partial_reads(false);

        let first = reader.read_chord(&mut io).unwrap();
        assert_eq!(first.chord().unwrap(), "ab");
        let second = reader.read_chord(&mut io).unwrap();
        assert_eq!(second.chord().unwrap(), "↓");
        assert_eq!(io.read_count(), 1);
        assert_eq!(io.pending_input(), 1);
    }

    #[test]
    fn test_single_letters() {
        let mut io = MockTerminal::new(24, 80).with_input([b"A".to_vec(), b"a".to_vec()]);
        let mut reader = ChordReader::with_partial_reads(false);
        assert_eq!(chord_names(&mut reader, &mut io), vec!["⇧A", "A"]);
    }

    #[test]
    fn test_raw_events() {
        let mut io = MockTerminal::new(24, 80).with_input([
            b"\x1b[M !!".to_vec(),
            b"\x1b[12;40R".to_vec(),
            b"\xff".to_vec(),
        ]);
        let mut reader = ChordReader::with_partial_reads(false);
        let events: Vec<ChordEvent> = std::iter::from_fn(|| reader.read_chord(&mut io).ok()).collect();
        assert_eq!(
            events,
            vec![
                ChordEvent::Raw(ByteRun::new(RunKind::MouseReport, b"\x1b[M !!".to_vec())),
                ChordEvent::Raw(ByteRun::new(RunKind::Escape, b"\x1b[12;40R".to_vec())),
                ChordEvent::Raw(ByteRun::new(RunKind::Invalid, b"\xff".to_vec())),
            ]
        );
    }

    #[test_log::test]
    fn test_partial_reads_echo_each_byte_once() {
        let mut io = MockTerminal::new(24, 80).with_input([
            b"\x1b".to_vec(),
            b"[".to_vec(),
            b"A".to_vec(),
        ]);
        let mut reader = ChordReader::with_partial_reads(true);
        let events: Vec<ChordEvent> = std::iter::from_fn(|| reader.read_chord(&mut io).ok()).collect();
        assert_eq!(
            events,
            vec![
                ChordEvent::Partial(b"\x1b".to_vec()),
                ChordEvent::Partial(b"[".to_vec()),
                ChordEvent::Partial(b"A".to_vec()),
                ChordEvent::Chord {
                    chord: Chord::from("↑"),
                    run: ByteRun::new(RunKind::Escape, b"\x1b[A".to_vec()),
                },
            ]
        );
        assert_eq!(reader.pending().reported_len(), 0);
        assert!(reader.pending().is_empty());
    }

    #[test]
    fn test_partial_reads_for_a_whole_token() {
        let mut reader = ChordReader::with_partial_reads(true);
        reader.feed(b"q\x1b[");
        assert_eq!(reader.try_take_event(), Some(ChordEvent::Partial(b"q".to_vec())));
        assert_eq!(reader.try_take_event().unwrap().chord().unwrap(), "Q");
        assert_eq!(reader.try_take_event(), Some(ChordEvent::Partial(b"\x1b[".to_vec())));
        assert_eq!(reader.try_take_event(), None);
        assert_eq!(reader.pending().reported_len(), 2);
    }

    #[test]
    fn test_poll_sees_buffered_tokens_before_the_terminal() {
        let mut io = MockTerminal::new(24, 80);
        let mut reader = ChordReader::with_partial_reads(false);
        assert!(!reader.poll(&mut io, Some(Duration::ZERO)).unwrap());

        reader.feed(b"\x1b[");
        assert!(!reader.poll(&mut io, Some(Duration::ZERO)).unwrap());
        reader.set_partial_reads(true);
        assert!(reader.poll(&mut io, Some(Duration::ZERO)).unwrap());

        let mut reader = ChordReader::with_partial_reads(false);
        reader.feed(b"x");
        assert!(reader.poll(&mut io, None).unwrap());

        io.push_input(b"y");
        let mut reader = ChordReader::with_partial_reads(false);
        assert!(reader.poll(&mut io, Some(Duration::ZERO)).unwrap());
    }

    #[test]
    fn test_read_error_propagates() {
        let mut io = MockTerminal::new(24, 80);
        let mut reader = ChordReader::with_partial_reads(false);
        reader.feed(b"\x1b[1");
        assert!(reader.read_chord(&mut io).is_err());
        assert_eq!(reader.pending().as_bytes(), b"\x1b[1");
    }

    #[test]
    fn test_pending_buffer_consume_keeps_marker_in_bounds() {
        let mut buffer = PendingBuffer::new();
        buffer.push(b"abc");
        assert_eq!(buffer.report_through(2), b"ab");
        assert_eq!(buffer.report_through(2), b"");
        assert_eq!(buffer.consume(1), b"a");
        assert_eq!(buffer.reported_len(), 1);
        assert_eq!(buffer.consume(5), b"bc");
        assert_eq!(buffer.reported_len(), 0);
        assert!(buffer.is_empty());
    }
}
