//! Core parser trait for language-agnostic element extraction.

use crate::models::CodeElement;

/// Language-agnostic parser trait.
///
/// Implement this trait for each language family. A parser receives the
/// whole text of one file and returns its elements:
///
/// 1. **File element** first: spans line 1 to the last physical line and
///    aggregates the file's imports and exports
/// 2. **Constructs**: functions, classes, methods, interfaces, enums, ...
///
/// Parsing never fails. Malformed or truncated input yields fewer elements,
/// never an error.
///
/// # Example Implementation
///
/// ```ignore
/// impl Parser for GoParser {
///     fn parse_file(&self, path: &str, content: &str) -> Vec<CodeElement> {
///         let mut file = file_element(path, content, "go");
///         // Locate headers, resolve block ends...
///     }
///
///     fn language_name(&self) -> &'static str { "go" }
///     fn supported_extensions(&self) -> &[&'static str] { &["go"] }
/// }
/// ```
pub trait Parser: Send + Sync {
    /// Parse a source file and extract its elements.
    ///
    /// # Arguments
    /// * `path` - Path of the file (copied into every element)
    /// * `content` - Full source text
    fn parse_file(&self, path: &str, content: &str) -> Vec<CodeElement>;

    /// Language tag written into every element.
    fn language_name(&self) -> &'static str;

    /// File extensions this parser handles (without the dot).
    fn supported_extensions(&self) -> &[&'static str];

    /// Check if this parser can handle the given file extension.
    fn can_parse(&self, extension: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }

    /// Parse capability level.
    ///
    /// Returns how deeply this parser can analyze code:
    /// - `Basic`: Flat pattern matches (names, positions)
    /// - `Structural`: Block boundaries, owners, signatures, documentation
    /// - `Syntactic`: Full syntax tree
    fn capability(&self) -> ParserCapability {
        ParserCapability::Structural
    }
}

/// Level of parsing capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParserCapability {
    /// Flat regex extraction - names and line numbers only.
    Basic,
    /// Hand-rolled scanning - block ends, owners, signatures.
    Structural,
    /// Grammar-based - complete syntax tree.
    Syntactic,
}

impl std::fmt::Display for ParserCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic => write!(f, "Basic"),
            Self::Structural => write!(f, "Structural"),
            Self::Syntactic => write!(f, "Syntactic"),
        }
    }
}
