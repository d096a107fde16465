//! Flat pattern-driven parsers for languages without a dedicated parser.
//!
//! Each match of a language's function, class or import pattern becomes one
//! element whose content is the matched span. Matches are independent: a
//! function matched inside a class span is not linked to it.

pub mod patterns;

use regex::Regex;

pub use patterns::{LanguagePatterns, GENERIC_LANGUAGES, NON_FUNCTION_KEYWORDS};

use super::base::{assemble, compile, file_element, LineIndex};
use super::traits::{Parser, ParserCapability};
use crate::models::{CodeElement, ElementKind};

/// Parser built from a [`LanguagePatterns`] table entry.
pub struct GenericParser {
    language: &'static str,
    extensions: &'static [&'static str],
    function: Option<Regex>,
    class: Option<Regex>,
    import: Option<Regex>,
}

impl GenericParser {
    pub fn new(patterns: &LanguagePatterns) -> Self {
        Self {
            language: patterns.language,
            extensions: patterns.extensions,
            function: compile(patterns.function),
            class: compile(patterns.class),
            import: compile(patterns.import),
        }
    }

    fn extract(
        &self,
        re: Option<&Regex>,
        kind: ElementKind,
        path: &str,
        content: &str,
        index: &LineIndex,
        elements: &mut Vec<CodeElement>,
    ) {
        let Some(re) = re else {
            return;
        };

        for cap in re.captures_iter(content) {
            let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
                continue;
            };
            let name = name.as_str().trim();
            if kind != ElementKind::Import && NON_FUNCTION_KEYWORDS.contains(&name) {
                continue;
            }

            let (start_line, end_line) = index.span(whole.start(), whole.end());
            elements.push(CodeElement::new(
                kind,
                name,
                whole.as_str(),
                start_line,
                end_line,
                path,
                self.language,
            ));
        }
    }
}

impl Parser for GenericParser {
    fn parse_file(&self, path: &str, content: &str) -> Vec<CodeElement> {
        let index = LineIndex::new(content);
        let mut elements = Vec::new();

        self.extract(self.import.as_ref(), ElementKind::Import, path, content, &index, &mut elements);
        self.extract(self.class.as_ref(), ElementKind::Class, path, content, &index, &mut elements);
        self.extract(self.function.as_ref(), ElementKind::Function, path, content, &index, &mut elements);

        let mut file = file_element(path, content, self.language);
        file.imports = elements
            .iter()
            .filter(|e| e.kind == ElementKind::Import)
            .map(|e| e.name.clone())
            .collect();

        assemble(file, elements)
    }

    fn language_name(&self) -> &'static str {
        self.language
    }

    fn supported_extensions(&self) -> &[&'static str] {
        self.extensions
    }

    fn capability(&self) -> ParserCapability {
        ParserCapability::Basic
    }
}

/// One parser per entry of [`GENERIC_LANGUAGES`].
pub fn builtin_parsers() -> Vec<GenericParser> {
    GENERIC_LANGUAGES.iter().map(GenericParser::new).collect()
}
