//! Parser registry for managing language-specific parsers.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;

use super::generic::builtin_parsers;
use super::go::GoParser;
use super::java::JavaParser;
use super::python::PythonParser;
use super::traits::Parser;

static BUILTIN: Lazy<Arc<ParserRegistry>> = Lazy::new(|| Arc::new(ParserRegistry::new()));

/// One language binding: its tag, the extensions mapped to it and the
/// parser instance.
#[derive(Clone)]
pub struct ParserRegistration {
    pub language: String,
    pub extensions: Vec<String>,
    pub parser: Arc<dyn Parser>,
}

impl std::fmt::Debug for ParserRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserRegistration")
            .field("language", &self.language)
            .field("extensions", &self.extensions)
            .field("capability", &self.parser.capability())
            .finish()
    }
}

/// Registry of language parsers.
///
/// Maps file extensions to a language tag and language tags to their
/// parser. Lookups are case-insensitive and never mutate the registry.
pub struct ParserRegistry {
    /// Extension to language mapping.
    extensions: HashMap<String, String>,
    /// Language to parser mapping.
    parsers: HashMap<String, Arc<dyn Parser>>,
}

impl ParserRegistry {
    /// Create a new registry with all built-in parsers.
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register(Arc::new(JavaParser::new()));
        registry.register(Arc::new(PythonParser::new()));
        registry.register(Arc::new(GoParser::new()));
        for parser in builtin_parsers() {
            registry.register(Arc::new(parser));
        }

        tracing::debug!(
            "Parser registry built: {} languages, {} extensions",
            registry.parsers.len(),
            registry.extensions.len()
        );
        registry
    }

    /// Create a registry with no parsers.
    pub fn empty() -> Self {
        Self {
            extensions: HashMap::new(),
            parsers: HashMap::new(),
        }
    }

    /// Shared registry with the built-in parsers, built on first use.
    pub fn builtin() -> Arc<ParserRegistry> {
        Arc::clone(&BUILTIN)
    }

    /// Register a parser for its language and supported extensions.
    ///
    /// Replaces any previous binding for the same language or extension.
    pub fn register(&mut self, parser: Arc<dyn Parser>) {
        let language = parser.language_name().to_string();
        for ext in parser.supported_extensions() {
            self.extensions.insert(normalize(ext), language.clone());
        }
        self.parsers.insert(language, parser);
    }

    /// Bind an extra extension to an already registered language.
    ///
    /// Returns `false` when the language is unknown.
    pub fn alias_extension(&mut self, extension: &str, language: &str) -> bool {
        let language = language.to_lowercase();
        if !self.parsers.contains_key(&language) {
            return false;
        }
        self.extensions.insert(normalize(extension), language);
        true
    }

    /// Language tag bound to the given extension.
    pub fn language_for_extension(&self, extension: &str) -> Option<&str> {
        self.extensions.get(&normalize(extension)).map(String::as_str)
    }

    /// Get a parser for the given file extension.
    pub fn parser_for_extension(&self, extension: &str) -> Option<Arc<dyn Parser>> {
        self.language_for_extension(extension)
            .and_then(|language| self.parser_for_language(language))
    }

    /// Get a parser for the given language tag.
    pub fn parser_for_language(&self, language: &str) -> Option<Arc<dyn Parser>> {
        self.parsers.get(&language.to_lowercase()).cloned()
    }

    /// Get a parser for the given file path.
    pub fn parser_for_path(&self, path: &str) -> Option<Arc<dyn Parser>> {
        Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.parser_for_extension(ext))
    }

    /// Check if any parser can handle the given extension.
    pub fn can_parse(&self, extension: &str) -> bool {
        self.extensions.contains_key(&normalize(extension))
    }

    /// List all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.extensions.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }

    /// List all languages that own at least one extension, sorted.
    pub fn languages(&self) -> Vec<&str> {
        self.registrations_by_language().into_keys().collect()
    }

    /// List all registered parsers with their languages and extensions.
    pub fn list_parsers(&self) -> Vec<(&str, Vec<&str>)> {
        self.registrations_by_language().into_iter().collect()
    }

    /// Enumerate every language binding, sorted by language.
    pub fn registrations(&self) -> Vec<ParserRegistration> {
        self.registrations_by_language()
            .into_iter()
            .filter_map(|(language, extensions)| {
                let parser = self.parsers.get(language)?;
                Some(ParserRegistration {
                    language: language.to_string(),
                    extensions: extensions.into_iter().map(String::from).collect(),
                    parser: Arc::clone(parser),
                })
            })
            .collect()
    }

    fn registrations_by_language(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (ext, language) in &self.extensions {
            grouped.entry(language.as_str()).or_default().push(ext.as_str());
        }
        for extensions in grouped.values_mut() {
            extensions.sort_unstable();
        }
        grouped
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(extension: &str) -> String {
    extension.trim_start_matches('.').to_lowercase()
}
