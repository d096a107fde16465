//! Go parser using anchored patterns and the brace scanner.
//!
//! Extracts:
//! - Single, grouped and aliased imports (file element only)
//! - Functions and receiver methods (`Type.Method`)
//! - Struct (class) and interface types
//! - Single-line top-level `var`/`const` declarations
//!
//! Visibility follows the first-letter case of the identifier.

use once_cell::sync::Lazy;
use regex::Regex;

use super::base::{
    assemble, compile, complexity, doc_comment_before, file_element, matching_paren,
    split_parameters, visibility_from_case, CommentStyle, LineIndex, GO_COMPLEXITY,
};
use super::scanner::BraceScanner;
use super::traits::Parser;
use crate::models::{CodeElement, ElementKind, Parameter};

static IMPORT_RE: Lazy<Option<Regex>> =
    Lazy::new(|| compile(r#"(?m)^import[ \t]+(?:[\w.]+[ \t]+)?"([^"\n]+)""#));

static IMPORT_GROUP_RE: Lazy<Option<Regex>> = Lazy::new(|| compile(r"(?m)^import[ \t]*\("));

static IMPORT_SPEC_RE: Lazy<Option<Regex>> =
    Lazy::new(|| compile(r#"(?m)^[ \t]*(?:[\w.]+[ \t]+)?"([^"\n]+)""#));

static FUNC_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    compile(r"(?m)^func[ \t]*(?:\(([^)]*)\)[ \t]*)?(\w+)[ \t]*(?:\[[^\]\n]*\][ \t]*)?\(")
});

static TYPE_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    compile(r"(?m)^type[ \t]+(\w+)(?:\[[^\]\n]*\])?[ \t]+(struct|interface)[ \t]*\{")
});

static VAR_RE: Lazy<Option<Regex>> =
    Lazy::new(|| compile(r"(?m)^(var|const)[ \t]+(\w+)[^\n]*$"));

/// Go parser.
pub struct GoParser {
    scanner: BraceScanner,
}

impl GoParser {
    pub fn new() -> Self {
        Self {
            scanner: BraceScanner::with_raw_strings(),
        }
    }

    fn extract_imports(&self, content: &str, masked: &str) -> Vec<String> {
        let mut found: Vec<(usize, String)> = Vec::new();

        if let Some(re) = IMPORT_RE.as_ref() {
            for cap in re.captures_iter(content) {
                let (Some(whole), Some(path)) = (cap.get(0), cap.get(1)) else {
                    continue;
                };
                if masked.get(whole.start()..).is_some_and(|m| m.starts_with("import")) {
                    found.push((whole.start(), path.as_str().to_string()));
                }
            }
        }

        if let (Some(group_re), Some(spec_re)) = (IMPORT_GROUP_RE.as_ref(), IMPORT_SPEC_RE.as_ref()) {
            for m in group_re.find_iter(masked) {
                let open = m.end() - 1;
                let Some(close) = matching_paren(masked, open) else {
                    continue;
                };
                let block = &content[open + 1..close];
                for cap in spec_re.captures_iter(block) {
                    if let Some(path) = cap.get(1) {
                        found.push((open + 1 + path.start(), path.as_str().to_string()));
                    }
                }
            }
        }

        found.sort_by_key(|(offset, _)| *offset);
        found.into_iter().map(|(_, path)| path).collect()
    }

    /// End offset (exclusive) of the block opened at `open`, clamped to EOF.
    fn block_end(&self, content: &str, open: usize) -> usize {
        self.scanner
            .find_block_end(content, open + 1)
            .map(|close| close + 1)
            .unwrap_or(content.len())
    }

    /// Opening brace of a function body, skipping `interface{}` and
    /// `struct{}` literals in the result list. `None` for body-less
    /// declarations.
    fn find_body_open(&self, masked: &str, from: usize) -> Option<usize> {
        let bytes = masked.as_bytes();
        let mut depth = 0i32;
        let mut i = from;

        while i < bytes.len() {
            match bytes[i] {
                b'(' | b'[' => depth += 1,
                b')' | b']' => depth -= 1,
                b'\n' if depth <= 0 => return None,
                b'{' => {
                    let before = masked[..i].trim_end();
                    if before.ends_with("interface") || before.ends_with("struct") {
                        i = self.scanner.find_block_end(masked, i + 1)? + 1;
                        continue;
                    }
                    if depth <= 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
            i += 1;
        }

        None
    }

    fn extract_functions(
        &self,
        path: &str,
        content: &str,
        masked: &str,
        index: &LineIndex,
        lines: &[&str],
        elements: &mut Vec<CodeElement>,
    ) {
        let Some(re) = FUNC_RE.as_ref() else {
            return;
        };

        for cap in re.captures_iter(masked) {
            let (Some(whole), Some(name)) = (cap.get(0), cap.get(2)) else {
                continue;
            };
            let name = name.as_str();
            let start = whole.start();
            let open = whole.end() - 1;
            let Some(close) = matching_paren(masked, open) else {
                continue;
            };

            let (end, result_end) = match self.find_body_open(masked, close + 1) {
                Some(body) => (self.block_end(content, body), body),
                None => {
                    let eol = content[close..].find('\n').map(|p| close + p).unwrap_or(content.len());
                    (eol, eol)
                }
            };

            let (start_line, end_line) = index.span(start, end);
            let result = content[close + 1..result_end].trim().to_string();

            let (kind, qualified) = match cap.get(1).and_then(|r| receiver_type(r.as_str())) {
                Some(owner) => (ElementKind::Method, format!("{}.{}", owner, name)),
                None => (ElementKind::Function, name.to_string()),
            };

            elements.push(
                CodeElement::new(
                    kind,
                    qualified,
                    &content[start..end],
                    start_line,
                    end_line,
                    path,
                    self.language_name(),
                )
                .with_parameters(parse_parameters(&content[open + 1..close]))
                .with_return_type(Some(result))
                .with_modifiers([visibility_from_case(name)])
                .with_documentation(doc_comment_before(
                    lines,
                    (start_line - 1) as usize,
                    CommentStyle::Slash,
                ))
                .with_complexity(complexity(&masked[start..end], &GO_COMPLEXITY)),
            );
        }
    }

    fn extract_types(
        &self,
        path: &str,
        content: &str,
        masked: &str,
        index: &LineIndex,
        lines: &[&str],
        elements: &mut Vec<CodeElement>,
    ) {
        let Some(re) = TYPE_RE.as_ref() else {
            return;
        };

        for cap in re.captures_iter(masked) {
            let (Some(whole), Some(name), Some(keyword)) = (cap.get(0), cap.get(1), cap.get(2)) else {
                continue;
            };
            let start = whole.start();
            let end = self.block_end(content, whole.end() - 1);
            let (start_line, end_line) = index.span(start, end);
            let kind = match keyword.as_str() {
                "interface" => ElementKind::Interface,
                _ => ElementKind::Class,
            };

            elements.push(
                CodeElement::new(
                    kind,
                    name.as_str(),
                    &content[start..end],
                    start_line,
                    end_line,
                    path,
                    self.language_name(),
                )
                .with_modifiers([visibility_from_case(name.as_str())])
                .with_documentation(doc_comment_before(
                    lines,
                    (start_line - 1) as usize,
                    CommentStyle::Slash,
                )),
            );
        }
    }

    fn extract_variables(
        &self,
        path: &str,
        content: &str,
        masked: &str,
        index: &LineIndex,
        lines: &[&str],
        elements: &mut Vec<CodeElement>,
    ) {
        let Some(re) = VAR_RE.as_ref() else {
            return;
        };

        for cap in re.captures_iter(masked) {
            let (Some(whole), Some(keyword), Some(name)) = (cap.get(0), cap.get(1), cap.get(2)) else {
                continue;
            };
            // Declarations continuing past their first line are not single-line.
            if bracket_balance(whole.as_str()) != 0 {
                continue;
            }

            let line = index.line_of(whole.start());
            let mut modifiers = vec![visibility_from_case(name.as_str())];
            if keyword.as_str() == "const" {
                modifiers.push("const");
            }

            elements.push(
                CodeElement::new(
                    ElementKind::Variable,
                    name.as_str(),
                    content[whole.range()].trim_end(),
                    line,
                    line,
                    path,
                    self.language_name(),
                )
                .with_modifiers(modifiers)
                .with_documentation(doc_comment_before(lines, (line - 1) as usize, CommentStyle::Slash)),
            );
        }
    }
}

impl Default for GoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for GoParser {
    fn parse_file(&self, path: &str, content: &str) -> Vec<CodeElement> {
        let masked = self.scanner.mask(content);
        let index = LineIndex::new(content);
        let lines: Vec<&str> = content.lines().collect();

        let mut file = file_element(path, content, self.language_name());
        file.imports = self.extract_imports(content, &masked);

        let mut elements = Vec::new();
        self.extract_types(path, content, &masked, &index, &lines, &mut elements);
        self.extract_functions(path, content, &masked, &index, &lines, &mut elements);
        self.extract_variables(path, content, &masked, &index, &lines, &mut elements);

        assemble(file, elements)
    }

    fn language_name(&self) -> &'static str {
        "go"
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &["go"]
    }
}

// --- Helper functions ---

/// `s *Server[T]` -> `Server`.
fn receiver_type(receiver: &str) -> Option<String> {
    let ty = receiver.split_whitespace().last()?;
    let ty = ty.trim_start_matches('*');
    let ty = ty.split('[').next().unwrap_or(ty);
    (!ty.is_empty()).then(|| ty.to_string())
}

fn is_identifier(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Parameters with shared types back-filled (`a, b int`); unnamed parameter
/// lists (`int, string`) get `_` names.
fn parse_parameters(raw: &str) -> Vec<Parameter> {
    let parts: Vec<(String, Option<String>)> = split_parameters(raw, false)
        .into_iter()
        .map(|part| {
            let named = part
                .split_once(char::is_whitespace)
                .filter(|(name, _)| is_identifier(name))
                .map(|(name, ty)| (name.to_string(), ty.trim().to_string()));
            match named {
                Some((name, ty)) => (name, Some(ty)),
                None => (part, None),
            }
        })
        .collect();

    if parts.iter().all(|(_, ty)| ty.is_none()) {
        return parts
            .into_iter()
            .map(|(ty, _)| Parameter::typed("_", ty))
            .collect();
    }

    let mut params = Vec::with_capacity(parts.len());
    let mut shared: Option<String> = None;
    for (name, ty) in parts.into_iter().rev() {
        if ty.is_some() {
            shared = ty.clone();
        }
        params.push(Parameter {
            name,
            type_name: ty.or_else(|| shared.clone()),
            default_value: None,
        });
    }
    params.reverse();
    params
}

fn bracket_balance(text: &str) -> i32 {
    text.bytes().fold(0, |depth, b| match b {
        b'(' | b'[' | b'{' => depth + 1,
        b')' | b']' | b'}' => depth - 1,
        _ => depth,
    })
}
