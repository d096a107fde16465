//! Data models produced by the parsers.

mod element;

pub use element::{CodeElement, ElementKind, Parameter};
