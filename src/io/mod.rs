// src/io/mod.rs

//! Terminal device access.
//!
//! The rest of the crate talks to a terminal only through [`TerminalIo`],
//! implemented by the real raw-mode tty and by an in-memory mock.

pub mod mock;
pub mod traits;
pub mod tty;

pub use mock::MockTerminal;
pub use traits::{Dimensions, TerminalIo};
pub use tty::{RawMode, RawModeGuard};
