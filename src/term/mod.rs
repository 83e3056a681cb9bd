// src/term/mod.rs

//! Output-side terminal model.

pub mod cursor;

pub use cursor::{CursorMock, CursorState};
