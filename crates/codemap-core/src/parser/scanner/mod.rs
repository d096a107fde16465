//! Block boundary scanners.
//!
//! - [`BraceScanner`] - depth-tracking scan for brace-delimited languages
//! - [`indent`] - forward line scan for indentation-delimited languages
//!
//! Each exposes its state enum and a pure per-character (or per-line)
//! transition function so the boundary logic can be tested on its own.

pub mod brace;
pub mod indent;

pub use brace::{BraceScanner, ScanState};
pub use indent::{IndentState, LineVerdict};
