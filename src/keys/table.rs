// src/keys/table.rs

//! The two-way map between keyboard byte encodings and chord names.
//!
//! Encodings were collected from keyboard transcripts of macOS Terminal with
//! a US layout. Every listed encoding maps to one chord and every chord to
//! one canonical encoding; the few alternates (SS3 arrows sent in
//! application cursor-key mode) decode to the same chord as their canonical
//! form but are never produced by [`ChordTable::chord_to_bytes`].

use crate::ansi::lexer::is_c0;
use crate::keys::{Chord, CONTROL_GLYPH, SHIFT_GLYPH};

use log::trace;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Built once, on first use.
pub static CHORD_TABLE: Lazy<ChordTable> = Lazy::new(ChordTable::build);

/// Canonical encodings that are not derived from the ASCII rules below.
const KEYBOARD_ENCODINGS: &[(&[u8], &str)] = &[
    // --- Named keys and their Shift and Option forms ---
    (b"\x00", "⌃Space"),
    (b"\x09", "Tab"),
    (b"\x0D", "Return"),
    (b"\x1B", "⎋"),
    (b" ", "Space"),
    (b"\x7F", "Delete"),
    (b"\x1B[Z", "⇧Tab"),
    (b"\xC2\xA0", "⌥Space"),
    // --- Arrows, in the normal (not application) cursor-key mode ---
    (b"\x1B[A", "↑"),
    (b"\x1B[B", "↓"),
    (b"\x1B[C", "→"),
    (b"\x1Bf", "⌥→"),
    (b"\x1B[1;2C", "⇧→"),
    (b"\x1B[D", "←"),
    (b"\x1Bb", "⌥←"),
    (b"\x1B[1;2D", "⇧←"),
    // --- Function keys as a macOS keyboard sends them ---
    (b"\x1BOP", "F1"),
    (b"\x1BOQ", "F2"),
    (b"\x1BOR", "F3"),
    (b"\x1BOS", "F4"),
    (b"\x1B[15~", "F5"),
    (b"\x1B[17~", "F6"),
    (b"\x1B[18~", "F7"),
    (b"\x1B[19~", "F8"),
    (b"\x1B[20~", "F9"),
    (b"\x1B[21~", "F10"),
    (b"\x1B[23~", "⌥F6"),
    (b"\x1B[24~", "F12"),
    (b"\x1B[25~", "⇧F5"),
    (b"\x1B[26~", "⇧F6"),
    (b"\x1B[28~", "⇧F7"),
    (b"\x1B[29~", "⇧F8"),
    (b"\x1B[31~", "⇧F9"),
    (b"\x1B[32~", "⇧F10"),
    (b"\x1B[33~", "⇧F11"),
    (b"\x1B[34~", "⇧F12"),
    // --- Fn Delete and Fn arrows ---
    (b"\x1B[3~", "FnDelete"),
    (b"\x1B[3;2~", "Fn⇧Delete"),
    (b"\x1B[5~", "Fn⇧↑"),
    (b"\x1B[6~", "Fn⇧↓"),
    (b"\x1B[H", "Fn⇧←"),
    (b"\x1BOH", "Fn←"),
    (b"\x1BOF", "Fn→"),
    (b"\x1B[F", "Fn⇧→"),
    // --- Option digits ---
    (b"\xC2\xBA", "⌥0"),
    (b"\xC2\xA1", "⌥1"),
    (b"\xE2\x84\xA2", "⌥2"),
    (b"\xC2\xA3", "⌥3"),
    (b"\xC2\xA2", "⌥4"),
    (b"\xE2\x88\x9E", "⌥5"),
    (b"\xC2\xA7", "⌥6"),
    (b"\xC2\xB6", "⌥7"),
    (b"\xE2\x80\xA2", "⌥8"),
    (b"\xC2\xAA", "⌥9"),
    (b"\xE2\x80\x9A", "⌥⇧0"),
    (b"\xE2\x81\x84", "⌥⇧1"),
    (b"\xE2\x82\xAC", "⌥⇧2"),
    (b"\xE2\x80\xB9", "⌥⇧3"),
    (b"\xE2\x80\xBA", "⌥⇧4"),
    (b"\xEF\xAC\x81", "⌥⇧5"),
    (b"\xEF\xAC\x82", "⌥⇧6"),
    (b"\xE2\x80\xA1", "⌥⇧7"),
    (b"\xC2\xB0", "⌥⇧8"),
    (b"\xC2\xB7", "⌥⇧9"),
    // --- Option letters, including the dead-key compositions ---
    (b"\xC3\xA5", "⌥A"),
    (b"\xE2\x88\xAB", "⌥B"),
    (b"\xC3\xA7", "⌥C"),
    (b"\xE2\x88\x82", "⌥D"),
    (b"\xC3\xA1", "⌥E A"),
    (b"\xC3\xA9", "⌥E E"),
    (b"\xC3\xAD", "⌥E I"),
    (b"j\xCC\x81", "⌥E J"),
    (b"\xC3\xB3", "⌥E O"),
    (b"\xC3\xBA", "⌥E U"),
    (b"\xC6\x92", "⌥F"),
    (b"\xC2\xA9", "⌥G"),
    (b"\xCB\x99", "⌥H"),
    (b"\xC3\xA2", "⌥I A"),
    (b"\xC3\xAA", "⌥I E"),
    (b"\xC3\xAE", "⌥I I"),
    (b"\xC3\xB4", "⌥I O"),
    (b"\xC3\xBB", "⌥I U"),
    (b"\xE2\x88\x86", "⌥J"),
    (b"\xCB\x9A", "⌥K"),
    (b"\xC2\xAC", "⌥L"),
    (b"\xC2\xB5", "⌥M"),
    (b"\xC3\xA3", "⌥N A"),
    (b"\xC3\xB1", "⌥N N"),
    (b"\xC3\xB5", "⌥N O"),
    (b"\xC3\xB8", "⌥O"),
    (b"\xCF\x80", "⌥P"),
    (b"\xC5\x93", "⌥Q"),
    (b"\xC2\xAE", "⌥R"),
    (b"\xC3\x9F", "⌥S"),
    (b"\xE2\x80\xA0", "⌥T"),
    (b"\xC3\xA4", "⌥U A"),
    (b"\xC3\xAB", "⌥U E"),
    (b"\xC3\xAF", "⌥U I"),
    (b"\xC3\xB6", "⌥U O"),
    (b"\xC3\xBC", "⌥U U"),
    (b"\xC3\xBF", "⌥U Y"),
    (b"\xE2\x88\x9A", "⌥V"),
    (b"\xE2\x88\x91", "⌥W"),
    (b"\xE2\x89\x88", "⌥X"),
    (b"\xCE\xA9", "⌥Z"),
    (b"\xC3\x85", "⌥⇧A"),
    (b"\xC4\xB1", "⌥⇧B"),
    (b"\xC3\x87", "⌥⇧C"),
    (b"\xC3\x8E", "⌥⇧D"),
    (b"\xC2\xB4", "⌥⇧E"),
    (b"\xC3\x8F", "⌥⇧F"),
    (b"\xCB\x9D", "⌥⇧G"),
    (b"\xC3\x93", "⌥⇧H"),
    (b"\xCB\x86", "⌥⇧I"),
    (b"\xC3\x94", "⌥⇧J"),
    (b"\xEF\xA3\xBF", "⌥⇧K"),
    (b"\xC3\x92", "⌥⇧L"),
    (b"\xC3\x82", "⌥⇧M"),
    (b"\xCB\x9C", "⌥⇧N"),
    (b"\xC3\x98", "⌥⇧O"),
    (b"\xE2\x88\x8F", "⌥⇧P"),
    (b"\xC5\x92", "⌥⇧Q"),
    (b"\xE2\x80\xB0", "⌥⇧R"),
    (b"\xC3\x8D", "⌥⇧S"),
    (b"\xCB\x87", "⌥⇧T"),
    (b"\xC2\xA8", "⌥⇧U"),
    (b"\xE2\x97\x8A", "⌥⇧V"),
    (b"\xE2\x80\x9E", "⌥⇧W"),
    (b"\xCB\x9B", "⌥⇧X"),
    (b"\xC3\x81", "⌥⇧Y"),
    (b"\xC2\xB8", "⌥⇧Z"),
    (b"\xC3\xA0", "⌥` A"),
    (b"\xC3\xA8", "⌥` E"),
    (b"\xC3\xAC", "⌥` I"),
    (b"\xC3\xB2", "⌥` O"),
    (b"\xC3\xB9", "⌥` U"),
    // --- Option punctuation ---
    (b"\xE2\x80\x93", "⌥-"),
    (b"\xE2\x89\xA0", "⌥="),
    (b"\xE2\x80\x9C", "⌥["),
    (b"\xE2\x80\x98", "⌥]"),
    (b"\xC2\xAB", "⌥\\"),
    (b"\xE2\x80\xA6", "⌥;"),
    (b"\xC3\xA6", "⌥'"),
    (b"\xE2\x89\xA4", "⌥,"),
    (b"\xE2\x89\xA5", "⌥."),
    (b"\xC3\xB7", "⌥/"),
    (b"\xE2\x80\x94", "⌥⇧-"),
    (b"\xC2\xB1", "⌥⇧="),
    (b"\xE2\x80\x9D", "⌥⇧["),
    (b"\xE2\x80\x99", "⌥⇧]"),
    (b"\xC2\xBB", "⌥⇧\\"),
    (b"\xC3\x9A", "⌥⇧;"),
    (b"\xC3\x86", "⌥⇧'"),
    (b"\xC2\xAF", "⌥⇧,"),
    (b"\xCB\x98", "⌥⇧."),
    (b"\xC2\xBF", "⌥⇧/"),
];

/// Encodings that decode to a chord whose canonical encoding is elsewhere.
const ALTERNATE_ENCODINGS: &[(&[u8], &str)] = &[
    // Application cursor-key mode swaps `ESC [` for `ESC O`.
    (b"\x1BOA", "↑"),
    (b"\x1BOB", "↓"),
    (b"\x1BOC", "→"),
    (b"\x1BOD", "←"),
];

#[derive(Debug, Clone)]
pub struct ChordTable {
    by_bytes: HashMap<Vec<u8>, Chord>,
    by_chord: HashMap<Chord, Vec<u8>>,
}

impl ChordTable {
    /// Builds the full table and checks it is one-to-one.
    ///
    /// # Panics
    /// If two encodings claim the same canonical chord, or one encoding is
    /// listed twice. Both are mistakes in the tables above.
    pub fn build() -> Self {
        let mut table = ChordTable {
            by_bytes: HashMap::new(),
            by_chord: HashMap::new(),
        };

        for (bytes, name) in KEYBOARD_ENCODINGS {
            table.insert_canonical(bytes, name);
        }

        // Remaining C0 bytes are Control plus the byte with bit 6 flipped.
        for byte in (0x00..=0x1F).chain(std::iter::once(0x7F)) {
            if !table.by_bytes.contains_key(&[byte][..]) {
                let name = format!("{}{}", CONTROL_GLYPH, char::from(byte ^ 0x40));
                table.insert_canonical(&[byte], &name);
            }
        }

        for letter in b'A'..=b'Z' {
            let name = format!("{}{}", SHIFT_GLYPH, char::from(letter));
            table.insert_canonical(&[letter], &name);
            let name = char::from(letter).to_string();
            table.insert_canonical(&[letter.to_ascii_lowercase()], &name);
        }

        // Digits and punctuation are their own names.
        for byte in 0x20..0x7F {
            if !table.by_bytes.contains_key(&[byte][..]) {
                table.insert_canonical(&[byte], &char::from(byte).to_string());
            }
        }

        for (bytes, name) in ALTERNATE_ENCODINGS {
            table.insert_alternate(bytes, name);
        }

        trace!("ChordTable: built with {} encodings", table.by_bytes.len());
        table
    }

    fn insert_canonical(&mut self, bytes: &[u8], name: &str) {
        let chord = Chord::new(name);
        let previous = self.by_bytes.insert(bytes.to_vec(), chord.clone());
        assert!(previous.is_none(), "encoding {:02X?} listed twice", bytes);
        let previous = self.by_chord.insert(chord, bytes.to_vec());
        assert!(previous.is_none(), "chord {:?} has two encodings", name);
    }

    fn insert_alternate(&mut self, bytes: &[u8], name: &str) {
        let chord = Chord::new(name);
        assert!(
            self.by_chord.contains_key(&chord),
            "alternate {:02X?} names unknown chord {:?}",
            bytes,
            name
        );
        let previous = self.by_bytes.insert(bytes.to_vec(), chord);
        assert!(previous.is_none(), "encoding {:02X?} listed twice", bytes);
    }

    /// The chord for an exact encoding, if listed.
    pub fn lookup(&self, bytes: &[u8]) -> Option<&Chord> {
        self.by_bytes.get(bytes)
    }

    /// The canonical encoding of a listed chord.
    pub fn encoding(&self, chord: &Chord) -> Option<&[u8]> {
        self.by_chord.get(chord).map(Vec::as_slice)
    }

    /// True for encodings that decode to a chord but are not its canonical form.
    pub fn is_alternate(&self, bytes: &[u8]) -> bool {
        self.lookup(bytes)
            .and_then(|chord| self.encoding(chord))
            .is_some_and(|canonical| canonical != bytes)
    }

    pub fn bytes_to_chord(&self, bytes: &[u8]) -> Chord {
        match self.lookup(bytes) {
            Some(chord) => chord.clone(),
            None => fallback_chord(bytes),
        }
    }

    pub fn chord_to_bytes(&self, chord: &Chord) -> Vec<u8> {
        match self.encoding(chord) {
            Some(bytes) => bytes.to_vec(),
            None => chord.as_str().as_bytes().to_vec(),
        }
    }

    /// Every listed encoding with its chord, alternates included. Unordered.
    pub fn entries(&self) -> impl Iterator<Item = (&[u8], &Chord)> {
        self.by_bytes.iter().map(|(b, c)| (b.as_slice(), c))
    }

    pub fn len(&self) -> usize {
        self.by_bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_bytes.is_empty()
    }
}

/// Names the bytes of a whole keystroke run. Total: unlisted runs fall back
/// to their decoded text.
pub fn bytes_to_chord(bytes: &[u8]) -> Chord {
    CHORD_TABLE.bytes_to_chord(bytes)
}

/// The canonical bytes for a chord; unlisted chords encode as their text.
pub fn chord_to_bytes(chord: &Chord) -> Vec<u8> {
    CHORD_TABLE.chord_to_bytes(chord)
}

fn fallback_chord(bytes: &[u8]) -> Chord {
    let text = String::from_utf8_lossy(bytes);
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_uppercase() => Chord::new(format!("{}{}", SHIFT_GLYPH, c)),
        (Some(c), None) if c.is_ascii() && is_c0(c as u8) => {
            Chord::new(format!("{}{}", CONTROL_GLYPH, char::from(c as u8 ^ 0x40)))
        }
        _ => Chord::new(text.into_owned()),
    }
}
