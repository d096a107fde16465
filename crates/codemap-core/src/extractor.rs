//! Element extraction facade.
//!
//! Picks a strategy per file and delegates:
//!
//! 1. **Registry** - a parser bound to the file's extension
//! 2. **Grammar** - the tree-sitter tier (TypeScript/JavaScript)
//! 3. **Fallback** - a single whole-file element tagged with the language
//!    from the static extension table
//!
//! Reading the file is the only step that can fail; parsers never do.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::config::{language_for_extension, Config, ParserConfig, MARKDOWN_EXTENSIONS};
use crate::error::{ExtractError, Result};
use crate::markdown::extract_fenced_blocks;
use crate::models::CodeElement;
use crate::parser::base::file_element;
use crate::parser::{grammar_parsers, Parser, ParserRegistration, ParserRegistry};

/// How a file is going to be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// A registered parser for this language.
    Registry(String),
    /// The tree-sitter tier for this language.
    Grammar(String),
    /// Whole-file element only.
    Fallback(String),
}

impl Strategy {
    /// Language tag the resulting elements carry.
    pub fn language(&self) -> &str {
        match self {
            Strategy::Registry(lang) | Strategy::Grammar(lang) | Strategy::Fallback(lang) => lang,
        }
    }
}

/// Turns a path (and its text) into an ordered list of code elements.
///
/// Cheap to share: the registry is reference counted and every parse call
/// only reads it.
pub struct CodeExtractor {
    registry: Arc<ParserRegistry>,
    grammar: Vec<Arc<dyn Parser>>,
    /// Extensions bound to a grammar-tier language through configuration.
    grammar_aliases: HashMap<String, String>,
    config: ParserConfig,
}

impl CodeExtractor {
    /// Create an extractor over the shared built-in registry.
    pub fn new() -> Self {
        Self::with_registry(ParserRegistry::builtin())
    }

    /// Create an extractor over an explicit registry.
    pub fn with_registry(registry: Arc<ParserRegistry>) -> Self {
        Self {
            registry,
            grammar: grammar_parsers()
                .into_iter()
                .map(|p| Arc::new(p) as Arc<dyn Parser>)
                .collect(),
            grammar_aliases: HashMap::new(),
            config: ParserConfig::default(),
        }
    }

    /// Create an extractor from configuration.
    ///
    /// Extension aliases get a private registry; without aliases the shared
    /// built-in registry is used.
    pub fn from_config(config: &Config) -> Self {
        let parser_config = config.parser.clone();
        if parser_config.extension_aliases.is_empty() {
            return Self::new().with_config(parser_config);
        }

        let mut registry = ParserRegistry::new();
        let mut grammar_aliases = HashMap::new();
        let grammar = grammar_parsers();

        for (ext, language) in &parser_config.extension_aliases {
            if registry.alias_extension(ext, language) {
                continue;
            }
            let language = language.to_lowercase();
            if grammar.iter().any(|p| p.language_name() == language) {
                grammar_aliases.insert(ext.trim_start_matches('.').to_lowercase(), language);
            } else {
                tracing::warn!("Ignoring alias '{}': unknown language '{}'", ext, language);
            }
        }

        let mut extractor = Self::with_registry(Arc::new(registry)).with_config(parser_config);
        extractor.grammar_aliases = grammar_aliases;
        extractor
    }

    /// Create an extractor from a config file.
    ///
    /// # Errors
    /// Returns [`ExtractError::Config`] when the file cannot be read, parsed
    /// or validated.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = Config::from_file(path)?;
        Ok(Self::from_config(&config))
    }

    /// Create an extractor from the discovered configuration, see [`Config::load`].
    pub fn load() -> Result<Self> {
        let config = Config::load()?;
        Ok(Self::from_config(&config))
    }

    /// Replace the parser configuration.
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Every language this extractor routes to a parser, with its extensions.
    ///
    /// Registry languages come first, followed by grammar-tier languages
    /// when that tier is enabled. Configured aliases are included.
    pub fn registrations(&self) -> Vec<ParserRegistration> {
        let mut all = self.registry.registrations();
        if !self.config.grammar_tier {
            return all;
        }

        let mut grammar: Vec<ParserRegistration> = Vec::new();
        for parser in &self.grammar {
            let extensions = parser.supported_extensions().iter().map(|e| e.to_string());
            match grammar.iter_mut().find(|r| r.language == parser.language_name()) {
                Some(existing) => existing.extensions.extend(extensions),
                None => grammar.push(ParserRegistration {
                    language: parser.language_name().to_string(),
                    extensions: extensions.collect(),
                    parser: Arc::clone(parser),
                }),
            }
        }
        for (ext, language) in &self.grammar_aliases {
            if let Some(existing) = grammar.iter_mut().find(|r| &r.language == language) {
                existing.extensions.push(ext.clone());
            }
        }
        for registration in &mut grammar {
            registration.extensions.sort();
            registration.extensions.dedup();
        }

        all.extend(grammar);
        all
    }

    /// Read and parse a file.
    ///
    /// # Errors
    /// Returns [`ExtractError::FileAccess`] when the file cannot be read.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Vec<CodeElement>> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ExtractError::file_access(path, e))?;
        Ok(self.parse_source(&path.to_string_lossy(), &content))
    }

    /// Read and parse a file; the read is the only suspension point.
    pub async fn parse_file_async(&self, path: impl AsRef<Path>) -> Result<Vec<CodeElement>> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ExtractError::file_access(path, e))?;
        Ok(self.parse_source(&path.to_string_lossy(), &content))
    }

    /// Parse text already in memory.
    pub fn parse_source(&self, path: &str, content: &str) -> Vec<CodeElement> {
        let strategy = self.strategy_for(path);

        if content.len() as u64 > self.config.max_file_size {
            tracing::warn!(
                "{} is {} bytes (limit {}), emitting whole-file element only",
                path,
                content.len(),
                self.config.max_file_size
            );
            return vec![file_element(path, content, strategy.language())];
        }

        tracing::debug!("Parsing {} with {:?}", path, strategy);
        let parser = match &strategy {
            Strategy::Registry(language) => self.registry.parser_for_language(language),
            Strategy::Grammar(_) => self.grammar_parser(path).cloned(),
            Strategy::Fallback(_) => None,
        };
        match parser {
            Some(parser) => parser.parse_file(path, content),
            None => vec![file_element(path, content, strategy.language())],
        }
    }

    /// Read a documentation file and extract its fenced code blocks.
    ///
    /// # Errors
    /// Returns [`ExtractError::FileAccess`] when the file cannot be read.
    pub fn parse_markdown(&self, path: impl AsRef<Path>) -> Result<Vec<CodeElement>> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ExtractError::file_access(path, e))?;
        Ok(extract_fenced_blocks(&path.to_string_lossy(), &content))
    }

    /// Whether the path looks like a documentation file with fenced blocks.
    pub fn is_markdown(path: &str) -> bool {
        extension(path).is_some_and(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|m| m.eq_ignore_ascii_case(ext))
        })
    }

    /// Choose the strategy for a path.
    pub fn strategy_for(&self, path: &str) -> Strategy {
        let Some(ext) = extension(path) else {
            return Strategy::Fallback(crate::config::UNKNOWN_LANGUAGE.to_string());
        };

        if let Some(language) = self.registry.language_for_extension(ext) {
            return Strategy::Registry(language.to_string());
        }
        if self.config.grammar_tier {
            if let Some(parser) = self.grammar_parser(path) {
                return Strategy::Grammar(parser.language_name().to_string());
            }
        }
        Strategy::Fallback(language_for_extension(ext).to_string())
    }

    /// Language tag elements of this path would carry.
    pub fn language_for_path(&self, path: &str) -> String {
        self.strategy_for(path).language().to_string()
    }

    fn grammar_parser(&self, path: &str) -> Option<&Arc<dyn Parser>> {
        let ext = extension(path)?;
        if let Some(parser) = self.grammar.iter().find(|p| p.can_parse(ext)) {
            return Some(parser);
        }
        let language = self.grammar_aliases.get(&ext.to_lowercase())?;
        self.grammar.iter().find(|p| p.language_name() == language.as_str())
    }
}

impl Default for CodeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn extension(path: &str) -> Option<&str> {
    Path::new(path).extension().and_then(|e| e.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ElementKind;

    #[test]
    fn test_strategy_selection() {
        let extractor = CodeExtractor::new();
        assert_eq!(extractor.strategy_for("a/Main.java"), Strategy::Registry("java".into()));
        assert_eq!(extractor.strategy_for("lib.rs"), Strategy::Registry("rust".into()));
        assert_eq!(extractor.strategy_for("app.tsx"), Strategy::Grammar("typescript".into()));
        assert_eq!(extractor.strategy_for("app.mjs"), Strategy::Grammar("javascript".into()));
        assert_eq!(extractor.strategy_for("data.json"), Strategy::Fallback("json".into()));
        assert_eq!(extractor.strategy_for("blob.xyz"), Strategy::Fallback("unknown".into()));
        assert_eq!(extractor.strategy_for("Makefile"), Strategy::Fallback("unknown".into()));
    }

    #[test]
    fn test_grammar_tier_disabled() {
        let config = ParserConfig {
            grammar_tier: false,
            ..ParserConfig::default()
        };
        let extractor = CodeExtractor::new().with_config(config);
        assert_eq!(extractor.strategy_for("app.ts"), Strategy::Fallback("typescript".into()));

        let elements = extractor.parse_source("app.ts", "function f() {}\n");
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].language, "typescript");
    }

    #[test]
    fn test_fallback_element() {
        let extractor = CodeExtractor::new();
        let elements = extractor.parse_source("notes.txt", "a\nb\nc\n");
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].kind, ElementKind::File);
        assert_eq!(elements[0].language, "plaintext");
        assert_eq!((elements[0].start_line, elements[0].end_line), (1, 3));
    }

    #[test]
    fn test_oversize_degrades() {
        let config = ParserConfig {
            max_file_size: 8,
            ..ParserConfig::default()
        };
        let extractor = CodeExtractor::new().with_config(config);
        let elements = extractor.parse_source("big.py", "def f():\n    pass\n");
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].language, "python");
    }

    #[test]
    fn test_registry_result_unmodified() {
        let extractor = CodeExtractor::new();
        let src = "def f():\n    return 1\n";
        let direct = extractor
            .registry()
            .parser_for_extension("py")
            .unwrap()
            .parse_file("m.py", src);
        assert_eq!(extractor.parse_source("m.py", src), direct);
    }

    #[test]
    fn test_from_config_aliases() {
        let config = Config::from_toml(
            "[parser.extension_aliases]\njav = \"java\"\nes = \"javascript\"\nzz = \"nothing\"\n",
        )
        .unwrap();
        let extractor = CodeExtractor::from_config(&config);
        assert_eq!(extractor.strategy_for("Old.jav"), Strategy::Registry("java".into()));
        assert_eq!(extractor.strategy_for("x.es"), Strategy::Grammar("javascript".into()));
        assert_eq!(extractor.strategy_for("x.zz"), Strategy::Fallback("unknown".into()));

        // The shared registry is untouched.
        assert!(!ParserRegistry::builtin().can_parse("jav"));
    }

    #[test]
    fn test_registrations_follow_config() {
        let config = Config::from_toml(
            "[parser.extension_aliases]\njav = \"java\"\nes = \"javascript\"\n",
        )
        .unwrap();
        let registrations = CodeExtractor::from_config(&config).registrations();
        let extensions_of = |language: &str| {
            registrations
                .iter()
                .find(|r| r.language == language)
                .map(|r| r.extensions.clone())
                .unwrap_or_default()
        };

        assert!(extensions_of("java").contains(&"jav".to_string()));
        assert!(extensions_of("javascript").contains(&"es".to_string()));
        assert!(extensions_of("javascript").contains(&"js".to_string()));
        let typescript = extensions_of("typescript");
        assert!(typescript.contains(&"ts".to_string()));
        assert!(typescript.contains(&"tsx".to_string()));
        assert_eq!(registrations.iter().filter(|r| r.language == "typescript").count(), 1);

        let builtin = CodeExtractor::new().registrations();
        assert!(!builtin.iter().any(|r| r.extensions.contains(&"jav".to_string())));

        let config = ParserConfig {
            grammar_tier: false,
            ..ParserConfig::default()
        };
        let registrations = CodeExtractor::new().with_config(config).registrations();
        assert!(registrations.iter().all(|r| r.language != "typescript"));
        assert!(registrations.iter().any(|r| r.language == "python"));
    }

    #[test]
    fn test_is_markdown() {
        assert!(CodeExtractor::is_markdown("README.md"));
        assert!(CodeExtractor::is_markdown("docs/guide.MDX"));
        assert!(!CodeExtractor::is_markdown("main.go"));
    }
}
