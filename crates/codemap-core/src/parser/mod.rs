//! Language-specific parsing infrastructure for code extraction.
//!
//! Provides a `Parser` trait for extracting code elements from source text,
//! with implementations in three tiers:
//!
//! ## Components
//!
//! - `Parser` trait - Common interface for all language parsers
//! - `ParserRegistry` - Maps file extensions to languages and parsers
//! - `scanner` - Brace and indentation block boundary scanners
//!
//! ## Supported Languages
//!
//! - Java, Python, Go (hand-rolled patterns plus block scanners)
//! - TypeScript/JavaScript (tree-sitter)
//! - Rust, C#, Ruby, PHP, Kotlin, Swift, C++, C (flat pattern table)

pub mod base;
pub mod generic;
pub mod scanner;

mod go;
mod java;
mod python;
mod registry;
mod traits;
mod treesitter;
mod typescript;

pub use generic::GenericParser;
pub use go::GoParser;
pub use java::JavaParser;
pub use python::PythonParser;
pub use registry::{ParserRegistration, ParserRegistry};
pub use traits::{Parser, ParserCapability};
pub use treesitter::TreeSitterParser;
pub use typescript::{grammar_parsers, TypeScriptParser};
