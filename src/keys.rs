// src/keys.rs

//! Symbolic names for keyboard chords.
//!
//! A [`Chord`] is the string a dispatch table is keyed by: `"⇧A"`, `"⌃C"`,
//! `"↑"`, `"F5"`, `"⌥E E"`. The byte encodings live in [`table`].

pub mod table;

pub use table::{bytes_to_chord, chord_to_bytes, ChordTable, CHORD_TABLE};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

// --- Modifier glyphs, in the order they are written ---
pub const CONTROL_GLYPH: char = '⌃';
pub const OPTION_GLYPH: char = '⌥';
pub const SHIFT_GLYPH: char = '⇧';
pub const COMMAND_GLYPH: char = '⌘';

/// Separator between the units of a multi-keystroke chord.
pub const UNIT_SEPARATOR: char = ' ';

bitflags! {
    /// Modifier glyphs found at the front of a chord name.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Modifiers: u8 {
        const CONTROL = 1 << 0;
        const OPTION = 1 << 1; // Alt
        const SHIFT = 1 << 2;
        const COMMAND = 1 << 3; // Super
    }
}

impl Modifiers {
    fn from_glyph(glyph: char) -> Option<Modifiers> {
        match glyph {
            CONTROL_GLYPH => Some(Modifiers::CONTROL),
            OPTION_GLYPH => Some(Modifiers::OPTION),
            SHIFT_GLYPH => Some(Modifiers::SHIFT),
            COMMAND_GLYPH => Some(Modifiers::COMMAND),
            _ => None,
        }
    }
}

/// Symbolic name of one keystroke, or of a few keystrokes joined by a space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chord(String);

impl Chord {
    pub fn new(name: impl Into<String>) -> Self {
        Chord(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The keystrokes of a dead-key composition, e.g. `["⌥E", "E"]`.
    pub fn units(&self) -> Vec<&str> {
        self.0.split(UNIT_SEPARATOR).collect()
    }

    /// Modifiers written before the first key of the chord.
    pub fn modifiers(&self) -> Modifiers {
        self.split_modifiers().0
    }

    /// The chord with its leading modifier glyphs removed.
    pub fn key(&self) -> &str {
        self.split_modifiers().1
    }

    fn split_modifiers(&self) -> (Modifiers, &str) {
        let mut modifiers = Modifiers::empty();
        for (index, glyph) in self.0.char_indices() {
            match Modifiers::from_glyph(glyph) {
                Some(m) => modifiers |= m,
                None => return (modifiers, &self.0[index..]),
            }
        }
        (modifiers, "")
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Chord {
    fn from(name: &str) -> Self {
        Chord::new(name)
    }
}

impl From<String> for Chord {
    fn from(name: String) -> Self {
        Chord(name)
    }
}

impl PartialEq<str> for Chord {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Chord {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// The C0 byte typed as Control plus `byte`: `control(b'C') == Some(0x03)`.
///
/// Defined for `?` and `@` through `_`; `control(b'?')` is DEL.
pub fn control(byte: u8) -> Option<u8> {
    if (0x3F..=0x5F).contains(&byte) {
        Some(byte ^ 0x40)
    } else {
        None
    }
}
