//! Java parser using anchored patterns and the brace scanner.
//!
//! Extracts:
//! - Imports (file element only)
//! - Classes, records, interfaces and enums (with modifiers and Javadoc)
//! - Methods, qualified as `Owner.method`, with parameters, return type,
//!   modifiers, Javadoc and complexity
//!
//! Constructors and methods of local/anonymous classes are not emitted.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::base::{
    assemble, compile, complexity, doc_comment_before, file_element, matching_paren,
    split_parameters, CommentStyle, LineIndex, JAVA_COMPLEXITY,
};
use super::scanner::BraceScanner;
use super::traits::Parser;
use crate::models::{CodeElement, ElementKind, Parameter};

static IMPORT_RE: Lazy<Option<Regex>> =
    Lazy::new(|| compile(r"(?m)^[ \t]*import[ \t]+(?:static[ \t]+)?([\w.]+(?:\.\*)?)[ \t]*;"));

static TYPE_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    compile(
        r"(?m)^[ \t]*(?:@\w+(?:\([^)\n]*\))?\s+)*((?:(?:public|protected|private|abstract|static|final|sealed|non-sealed|strictfp)\s+)*)(class|record|interface|enum)\s+(\w+)",
    )
});

static METHOD_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    compile(
        r"(?m)^[ \t]*(?:@\w+(?:\([^)\n]*\))?\s+)*((?:(?:public|protected|private|static|final|abstract|synchronized|native|default|strictfp)\s+)*)(?:<(?:[^<>{};()]|<(?:[^<>{};()]|<[^<>{};()]*>)*>)*>\s+)?(?:([\w.$]+(?:\s*<(?:[^<>{};()]|<(?:[^<>{};()]|<[^<>{};()]*>)*>)*>)?(?:\s*\[\s*\])*)\s+)?(\w+)\s*\(",
    )
});

/// Words that look like a method name or return type but start a statement.
const STATEMENT_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "try", "do", "else", "return", "new", "throw",
    "synchronized", "case", "yield", "assert", "super", "this",
];

/// Declaration keywords the method pattern can mistake for a return type.
const DECLARATION_KEYWORDS: &[&str] = &["class", "interface", "enum", "record"];

/// A type declaration and its body span (byte offsets).
#[derive(Debug, Clone)]
struct TypeSpan {
    name: String,
    start: usize,
    body_start: usize,
    end: usize,
}

/// Java parser.
pub struct JavaParser {
    scanner: BraceScanner,
}

impl JavaParser {
    pub fn new() -> Self {
        Self {
            scanner: BraceScanner::new(),
        }
    }

    fn extract_imports(&self, masked: &str) -> Vec<String> {
        let Some(re) = IMPORT_RE.as_ref() else {
            return Vec::new();
        };
        re.captures_iter(masked)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
            .collect()
    }

    /// End offset (exclusive) of the block opened at `open`, clamped to EOF.
    fn block_end(&self, content: &str, open: usize) -> usize {
        self.scanner
            .find_block_end(content, open + 1)
            .map(|close| close + 1)
            .unwrap_or(content.len())
    }

    fn extract_types(
        &self,
        path: &str,
        content: &str,
        masked: &str,
        index: &LineIndex,
        lines: &[&str],
        elements: &mut Vec<CodeElement>,
    ) -> Vec<TypeSpan> {
        let Some(re) = TYPE_RE.as_ref() else {
            return Vec::new();
        };
        let mut spans = Vec::new();

        for cap in re.captures_iter(masked) {
            let (Some(whole), Some(keyword), Some(name)) = (cap.get(0), cap.get(2), cap.get(3)) else {
                continue;
            };
            let Some(open) = find_body_open(masked, whole.end()) else {
                continue;
            };
            let end = self.block_end(content, open);
            let start = header_start(&cap);
            let (start_line, end_line) = index.span(start, end);

            let kind = match keyword.as_str() {
                "interface" => ElementKind::Interface,
                "enum" => ElementKind::Enum,
                _ => ElementKind::Class,
            };
            let mut modifiers = split_modifiers(&cap);
            if keyword.as_str() == "record" {
                modifiers.push("record".to_string());
            }

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
                .with_modifiers(modifiers)
                .with_documentation(doc_comment_before(
                    lines,
                    (start_line - 1) as usize,
                    CommentStyle::Slash,
                )),
            );

            spans.push(TypeSpan {
                name: name.as_str().to_string(),
                start,
                body_start: open + 1,
                end,
            });
        }

        spans
    }

    #[allow(clippy::too_many_arguments)]
    fn extract_methods(
        &self,
        path: &str,
        content: &str,
        masked: &str,
        index: &LineIndex,
        lines: &[&str],
        types: &[TypeSpan],
        elements: &mut Vec<CodeElement>,
    ) {
        let Some(re) = METHOD_RE.as_ref() else {
            return;
        };
        let mut method_bodies: Vec<(usize, usize)> = Vec::new();

        for cap in re.captures_iter(masked) {
            let (Some(whole), Some(name)) = (cap.get(0), cap.get(3)) else {
                continue;
            };
            let name = name.as_str();
            let return_type = cap.get(2).map(|m| m.as_str().trim().to_string());

            if STATEMENT_KEYWORDS.contains(&name) {
                continue;
            }
            // Constructors (no return type) are not emitted; neither are
            // statements that happen to look like a call at line start.
            let Some(return_type) = return_type else {
                continue;
            };
            if STATEMENT_KEYWORDS.contains(&return_type.as_str())
                || DECLARATION_KEYWORDS.contains(&return_type.as_str())
            {
                continue;
            }

            let start = header_start(&cap);
            if method_bodies.iter().any(|&(s, e)| start > s && start < e) {
                continue;
            }
            let Some(owner) = innermost_owner(types, start) else {
                continue;
            };

            let open_paren = whole.end() - 1;
            let Some(close_paren) = matching_paren(masked, open_paren) else {
                continue;
            };
            let Some((terminator, at)) = find_terminator(masked, close_paren + 1) else {
                continue;
            };

            let end = match terminator {
                b'{' => self.block_end(content, at),
                _ => at + 1,
            };
            if terminator == b'{' {
                method_bodies.push((at, end));
            }

            let (start_line, end_line) = index.span(start, end);
            let raw_params = &content[open_paren + 1..close_paren];

            elements.push(
                CodeElement::new(
                    ElementKind::Method,
                    format!("{}.{}", owner.name, name),
                    &content[start..end],
                    start_line,
                    end_line,
                    path,
                    self.language_name(),
                )
                .with_parameters(parse_parameters(raw_params))
                .with_return_type(Some(return_type))
                .with_modifiers(split_modifiers(&cap))
                .with_documentation(doc_comment_before(
                    lines,
                    (start_line - 1) as usize,
                    CommentStyle::Slash,
                ))
                .with_complexity(complexity(&masked[start..end], &JAVA_COMPLEXITY)),
            );
        }
    }
}

impl Default for JavaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for JavaParser {
    fn parse_file(&self, path: &str, content: &str) -> Vec<CodeElement> {
        let masked = self.scanner.mask(content);
        let index = LineIndex::new(content);
        let lines: Vec<&str> = content.lines().collect();

        let mut file = file_element(path, content, self.language_name());
        file.imports = self.extract_imports(&masked);

        let mut elements = Vec::new();
        let types = self.extract_types(path, content, &masked, &index, &lines, &mut elements);
        self.extract_methods(path, content, &masked, &index, &lines, &types, &mut elements);

        assemble(file, elements)
    }

    fn language_name(&self) -> &'static str {
        "java"
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &["java"]
    }
}

// --- Helper functions ---

/// Offset of the first non-blank character of a header match, so leading
/// annotations stay inside the element.
fn header_start(cap: &Captures) -> usize {
    match cap.get(0) {
        Some(whole) => {
            let text = whole.as_str();
            whole.start() + (text.len() - text.trim_start().len())
        }
        None => 0,
    }
}

fn split_modifiers(cap: &Captures) -> Vec<String> {
    cap.get(1)
        .map(|m| m.as_str().split_whitespace().map(String::from).collect())
        .unwrap_or_default()
}

/// Opening brace of a type body, unless a `;` ends the declaration first.
fn find_body_open(masked: &str, from: usize) -> Option<usize> {
    for (i, b) in masked.bytes().enumerate().skip(from) {
        match b {
            b'{' => return Some(i),
            b';' => return None,
            _ => {}
        }
    }
    None
}

/// After a method's parameter list: the `{` opening its body or the `;`
/// ending an abstract declaration. Anything else means it was not a
/// declaration.
fn find_terminator(masked: &str, from: usize) -> Option<(u8, usize)> {
    let rest = &masked[from..];
    let offset = rest.find(|c: char| c == '{' || c == ';' || c == '=' || c == '}')?;
    let between = rest[..offset].trim();
    if !(between.is_empty() || between.starts_with("throws") || between.starts_with("default")) {
        return None;
    }
    match rest.as_bytes()[offset] {
        b @ (b'{' | b';') => Some((b, from + offset)),
        _ => None,
    }
}

/// Innermost type whose body contains `offset`.
fn innermost_owner(types: &[TypeSpan], offset: usize) -> Option<&TypeSpan> {
    types
        .iter()
        .filter(|t| t.body_start <= offset && offset < t.end)
        .min_by_key(|t| t.end - t.start)
}

/// `final @NotNull Map<K, V> name` -> name + type.
fn parse_parameters(raw: &str) -> Vec<Parameter> {
    split_parameters(raw, true)
        .into_iter()
        .filter_map(|param| {
            let cleaned = strip_annotations(&param);
            let words: Vec<&str> = cleaned
                .split_whitespace()
                .filter(|w| *w != "final")
                .collect();
            match words.as_slice() {
                [] => None,
                [only] => Some(Parameter::new(*only)),
                [types @ .., name] => Some(Parameter::typed(*name, types.join(" "))),
            }
        })
        .collect()
}

fn strip_annotations(param: &str) -> String {
    let mut out = String::with_capacity(param.len());
    let mut chars = param.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '@' {
            out.push(ch);
            continue;
        }
        while chars.peek().is_some_and(|c| c.is_alphanumeric() || *c == '_' || *c == '.') {
            chars.next();
        }
        if chars.peek() == Some(&'(') {
            let mut depth = 0;
            for c in chars.by_ref() {
                match c {
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    out
}
