// src/main.rs

//! `byotty`: echo each keyboard chord with the time since the last one.
//!
//! Quits on ⌃C ⌃D ⌃Z ⌃\ or on ⇧Z ⇧Q.

use byotty::config::CONFIG;
use byotty::io::RawMode;
use byotty::{Chord, ChordEvent, ChordsTerminal};

use anyhow::Context;
use log::info;
use std::time::{Duration, Instant};

const BANNER: &str = r"Press ⇧Z ⇧Q to quit, or any one of ⌃C ⌃D ⌃Z ⌃\";

// --- Quit chords ---
const QUIT_CHORDS: [&str; 4] = ["⌃C", "⌃D", "⌃Z", "⌃\\"];
const QUIT_SEQUENCE: [&str; 2] = ["⇧Z", "⇧Q"];

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(CONFIG.logging.default_filter.as_str()),
    )
    .format_timestamp_micros()
    .init();

    info!("Starting byotty...");
    let tty = RawMode::enter().context("Failed to enter raw mode")?;
    let mut terminal = ChordsTerminal::new(tty);

    terminal.print_line(BANNER)?;
    terminal.print_line("")?;

    let mut previous: Option<Chord> = None;
    let mut t0 = Instant::now();
    loop {
        let event = terminal.read_chord().context("Failed to read keyboard")?;
        let line = describe(t0.elapsed(), &event);
        terminal.print_line(&line)?;
        t0 = Instant::now();

        if let Some(chord) = event.chord() {
            if is_quit(previous.as_ref(), chord) {
                break;
            }
            previous = Some(chord.clone());
        }
    }

    terminal.close()?;
    info!("byotty exiting.");
    Ok(())
}

fn describe(elapsed: Duration, event: &ChordEvent) -> String {
    match event {
        ChordEvent::Chord { chord, run } => {
            format!("{:.3?} {} {:?}", elapsed, chord, String::from_utf8_lossy(run.as_bytes()))
        }
        ChordEvent::Raw(run) => format!("{:.3?} {:?} {:02X?}", elapsed, run.kind, run.bytes),
        ChordEvent::Partial(bytes) => format!("{:.3?} partial {:02X?}", elapsed, bytes),
    }
}

fn is_quit(previous: Option<&Chord>, chord: &Chord) -> bool {
    if QUIT_CHORDS.contains(&chord.as_str()) {
        return true;
    }
    previous.is_some_and(|p| p.as_str() == QUIT_SEQUENCE[0]) && chord.as_str() == QUIT_SEQUENCE[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_chords() {
        assert!(is_quit(None, &Chord::from("⌃C")));
        assert!(is_quit(None, &Chord::from("⌃\\")));
        assert!(!is_quit(None, &Chord::from("⇧Q")));
        assert!(is_quit(Some(&Chord::from("⇧Z")), &Chord::from("⇧Q")));
        assert!(!is_quit(Some(&Chord::from("Z")), &Chord::from("⇧Q")));
    }
}
