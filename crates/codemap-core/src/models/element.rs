//! Code element: the single output unit of every parser.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Kind of structural unit an element describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    File,
    Function,
    Class,
    Method,
    Variable,
    Import,
    Export,
    Interface,
    Enum,
}

impl ElementKind {
    /// Lowercase tag used in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Function => "function",
            Self::Class => "class",
            Self::Method => "method",
            Self::Variable => "variable",
            Self::Import => "import",
            Self::Export => "export",
            Self::Interface => "interface",
            Self::Enum => "enum",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A function or method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub default_value: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: None,
            default_value: None,
        }
    }

    pub fn typed(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: Some(type_name.into()),
            default_value: None,
        }
    }
}

/// One structural unit extracted from a source file.
///
/// Elements carry no identity across calls; use [`CodeElement::key`] when a
/// stable key is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeElement {
    /// Construct kind.
    pub kind: ElementKind,

    /// Identifier. Methods are qualified as `Owner.method`.
    pub name: String,

    /// Exact source span covered by the element.
    pub content: String,

    /// First line (1-based, inclusive).
    pub start_line: u32,

    /// Last line (1-based, inclusive).
    pub end_line: u32,

    /// File the element was extracted from.
    pub file_path: String,

    /// Language tag (e.g. "java", "python").
    pub language: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parameters: Option<Vec<Parameter>>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub return_type: Option<String>,

    /// Visibility, static, async, abstract, ...
    #[serde(skip_serializing_if = "BTreeSet::is_empty", default)]
    pub modifiers: BTreeSet<String>,

    /// Preceding doc comment or docstring, markers stripped.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub documentation: Option<String>,

    /// Heuristic cyclomatic complexity (>= 1).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub complexity: Option<u32>,

    /// Import names (file element only).
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub imports: Vec<String>,

    /// Export names (file element only).
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub exports: Vec<String>,
}

impl CodeElement {
    /// Create an element with the mandatory fields set.
    pub fn new(
        kind: ElementKind,
        name: impl Into<String>,
        content: impl Into<String>,
        start_line: u32,
        end_line: u32,
        file_path: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            content: content.into(),
            start_line,
            end_line,
            file_path: file_path.into(),
            language: language.into(),
            parameters: None,
            return_type: None,
            modifiers: BTreeSet::new(),
            documentation: None,
            complexity: None,
            imports: Vec::new(),
            exports: Vec::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn with_return_type(mut self, return_type: Option<String>) -> Self {
        self.return_type = return_type.filter(|t| !t.is_empty());
        self
    }

    pub fn with_modifiers<I, S>(mut self, modifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modifiers.extend(modifiers.into_iter().map(Into::into));
        self
    }

    pub fn with_documentation(mut self, documentation: Option<String>) -> Self {
        self.documentation = documentation.filter(|d| !d.trim().is_empty());
        self
    }

    pub fn with_complexity(mut self, complexity: u32) -> Self {
        self.complexity = Some(complexity.max(1));
        self
    }

    /// Caller-side stable key: `path:name:start_line`.
    pub fn key(&self) -> String {
        format!("{}:{}:{}", self.file_path, self.name, self.start_line)
    }

    pub fn is_file(&self) -> bool {
        self.kind == ElementKind::File
    }

    /// Number of lines covered.
    pub fn line_count(&self) -> u32 {
        self.end_line.saturating_sub(self.start_line) + 1
    }

    /// Whether `other` lies entirely within this element's line range.
    pub fn contains(&self, other: &CodeElement) -> bool {
        self.start_line <= other.start_line && other.end_line <= self.end_line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_path_name_line() {
        let element = CodeElement::new(ElementKind::Function, "run", "def run(): pass", 4, 4, "app.py", "python");
        assert_eq!(element.key(), "app.py:run:4");
    }

    #[test]
    fn test_complexity_never_below_one() {
        let element = CodeElement::new(ElementKind::Function, "f", "", 1, 1, "a.go", "go").with_complexity(0);
        assert_eq!(element.complexity, Some(1));
    }

    #[test]
    fn test_empty_documentation_dropped() {
        let element = CodeElement::new(ElementKind::Class, "A", "", 1, 2, "A.java", "java")
            .with_documentation(Some("   ".to_string()));
        assert!(element.documentation.is_none());
    }

    #[test]
    fn test_contains() {
        let class = CodeElement::new(ElementKind::Class, "A", "", 1, 10, "A.java", "java");
        let method = CodeElement::new(ElementKind::Method, "A.run", "", 3, 5, "A.java", "java");
        assert!(class.contains(&method));
        assert!(!method.contains(&class));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ElementKind::Interface.to_string(), "interface");
        assert_eq!(ElementKind::Method.as_str(), "method");
    }
}
