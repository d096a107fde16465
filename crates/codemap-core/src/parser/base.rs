//! Helpers shared by every parser.
//!
//! - File element synthesis and final assembly (file element first)
//! - Offset to line resolution
//! - Heuristic complexity scoring
//! - Delimiter-aware parameter splitting
//! - Doc comment recovery above a construct

use std::path::Path;

use regex::Regex;

use crate::models::{CodeElement, ElementKind};

// =============================================================================
// FILE ELEMENT
// =============================================================================

/// Number of physical lines in `content` (at least 1).
pub fn total_lines(content: &str) -> u32 {
    content.lines().count().max(1) as u32
}

/// Synthesize the file-level element spanning the whole file.
pub fn file_element(path: &str, content: &str, language: &str) -> CodeElement {
    let name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_string();

    CodeElement::new(
        ElementKind::File,
        name,
        content,
        1,
        total_lines(content),
        path,
        language,
    )
}

/// Put the file element first and the rest in source order.
///
/// Line ranges are clamped into the file's range so malformed input can
/// never produce an element outside it.
pub fn assemble(file: CodeElement, mut elements: Vec<CodeElement>) -> Vec<CodeElement> {
    let last = file.end_line;
    for element in &mut elements {
        element.start_line = element.start_line.clamp(1, last);
        element.end_line = element.end_line.clamp(element.start_line, last);
    }
    elements.sort_by_key(|e| e.start_line);

    let mut result = Vec::with_capacity(elements.len() + 1);
    result.push(file);
    result.extend(elements);
    result
}

// =============================================================================
// LINE INDEX
// =============================================================================

/// Byte offset to 1-based line resolution.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
    len: usize,
    total: u32,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            content
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            starts,
            len: content.len(),
            total: total_lines(content),
        }
    }

    pub fn total_lines(&self) -> u32 {
        self.total
    }

    /// Line containing `offset` (clamped to the last physical line).
    pub fn line_of(&self, offset: usize) -> u32 {
        let line = self.starts.partition_point(|&s| s <= offset) as u32;
        line.clamp(1, self.total)
    }

    /// Line range of the byte span `start..end`.
    pub fn span(&self, start: usize, end: usize) -> (u32, u32) {
        let first = self.line_of(start);
        let last = self.line_of(end.saturating_sub(1).max(start));
        (first, last.max(first))
    }

    /// Byte offset where `line` (1-based) starts.
    pub fn line_start(&self, line: u32) -> usize {
        let idx = (line.max(1) - 1) as usize;
        self.starts.get(idx).copied().unwrap_or(self.len)
    }

    /// Byte offset just past the last character of `line` (before its newline).
    pub fn line_end(&self, line: u32) -> usize {
        self.starts
            .get(line.max(1) as usize)
            .map(|next| next - 1)
            .unwrap_or(self.len)
    }
}

// =============================================================================
// COMPLEXITY
// =============================================================================

/// Which tokens count as a branch for a language.
#[derive(Debug, Clone, Copy)]
pub struct ComplexityProfile {
    /// Keywords adding one each (conditionals, loops, case labels, word operators).
    pub keywords: &'static [&'static str],
    /// Symbolic short-circuit operators.
    pub operators: &'static [&'static str],
    /// Whether `?` is a ternary operator.
    pub ternary: bool,
}

pub const JAVA_COMPLEXITY: ComplexityProfile = ComplexityProfile {
    keywords: &["if", "for", "while", "case"],
    operators: &["&&", "||"],
    ternary: true,
};

pub const GO_COMPLEXITY: ComplexityProfile = ComplexityProfile {
    keywords: &["if", "for", "case"],
    operators: &["&&", "||"],
    ternary: false,
};

// `x if c else y` is counted through its `if`.
pub const PYTHON_COMPLEXITY: ComplexityProfile = ComplexityProfile {
    keywords: &["if", "elif", "for", "while", "case", "and", "or"],
    operators: &[],
    ternary: false,
};

/// Heuristic cyclomatic complexity of `code`.
///
/// Starts at 1 and adds 1 per branch keyword, short-circuit operator and
/// ternary. `code` should already have strings and comments masked out.
pub fn complexity(code: &str, profile: &ComplexityProfile) -> u32 {
    let keywords = code
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| profile.keywords.contains(word))
        .count();

    let operators: usize = profile
        .operators
        .iter()
        .map(|op| code.matches(op).count())
        .sum();

    let ternaries = if profile.ternary { count_ternaries(code) } else { 0 };

    1 + (keywords + operators + ternaries) as u32
}

/// Count `?` used as a conditional operator, skipping generic wildcards
/// (`<?>`, `<? extends T>`, `Map<K, ?>`).
fn count_ternaries(code: &str) -> usize {
    let bytes = code.as_bytes();
    let mut count = 0;

    for (i, &b) in bytes.iter().enumerate() {
        if b != b'?' {
            continue;
        }
        let prev = bytes[..i].iter().rev().find(|c| !c.is_ascii_whitespace());
        let next = bytes[i + 1..].iter().find(|c| !c.is_ascii_whitespace());
        if matches!(prev, Some(b'<') | Some(b',') | Some(b'(')) {
            continue;
        }
        if matches!(next, Some(b'>') | Some(b',') | Some(b'.') | Some(b'?')) {
            continue;
        }
        count += 1;
    }

    count
}

// =============================================================================
// PARAMETERS
// =============================================================================

/// Split a raw parameter list on top-level commas.
///
/// Commas nested in `()[]{}` (and `<>` when `angle_brackets` is set) or in
/// quoted text do not split, so generic types and default-value calls stay
/// whole.
pub fn split_parameters(raw: &str, angle_brackets: bool) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0u32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut prev = '\0';

    for ch in raw.chars() {
        if let Some(q) = quote {
            current.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            prev = ch;
            continue;
        }

        match ch {
            '"' | '\'' | '`' => quote = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            '<' if angle_brackets => depth += 1,
            // `=>` and `->` are arrows, not closing angle brackets.
            '>' if angle_brackets && prev != '=' && prev != '-' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                let part = current.trim();
                if !part.is_empty() {
                    parts.push(part.to_string());
                }
                current.clear();
                prev = ch;
                continue;
            }
            _ => {}
        }
        current.push(ch);
        prev = ch;
    }

    let part = current.trim();
    if !part.is_empty() {
        parts.push(part.to_string());
    }

    parts
}

/// Offset of the `)` matching the `(` at `open`.
///
/// `text` should be masked so parentheses in strings do not count.
pub fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (i, b) in text.bytes().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

// =============================================================================
// DOCUMENTATION
// =============================================================================

/// Comment syntax used for doc recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// `//`, `/* */`, `/** */`
    Slash,
    /// `#`
    Hash,
}

impl CommentStyle {
    fn is_comment(&self, trimmed: &str) -> bool {
        match self {
            Self::Slash => {
                trimmed.starts_with("//")
                    || trimmed.starts_with("/*")
                    || trimmed.starts_with('*')
                    || trimmed.ends_with("*/")
            }
            Self::Hash => trimmed.starts_with('#') && !trimmed.starts_with("#!"),
        }
    }

    fn strip<'a>(&self, trimmed: &'a str) -> &'a str {
        match self {
            Self::Slash => {
                let s = trimmed
                    .strip_prefix("/**")
                    .or_else(|| trimmed.strip_prefix("/*"))
                    .or_else(|| trimmed.strip_prefix("///"))
                    .or_else(|| trimmed.strip_prefix("//"))
                    .unwrap_or(trimmed);
                let s = s.strip_suffix("*/").unwrap_or(s).trim();
                s.strip_prefix('*').unwrap_or(s).trim()
            }
            Self::Hash => trimmed.trim_start_matches('#').trim(),
        }
    }
}

/// Recover the comment block directly above `line_idx` (0-based).
///
/// Walks backward through contiguous comment lines, stepping over
/// annotation/decorator lines (`@...`), and stops at the first blank or code
/// line. Markers are stripped and the lines joined in source order.
pub fn doc_comment_before(lines: &[&str], line_idx: usize, style: CommentStyle) -> Option<String> {
    let mut collected = Vec::new();

    for line in lines[..line_idx.min(lines.len())].iter().rev() {
        let trimmed = line.trim();
        if trimmed.starts_with('@') && collected.is_empty() {
            continue;
        }
        if !style.is_comment(trimmed) {
            break;
        }
        collected.push(style.strip(trimmed));
    }

    let text = collected
        .into_iter()
        .rev()
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    (!text.is_empty()).then_some(text)
}

// =============================================================================
// MISC
// =============================================================================

/// Compile a built-in pattern, logging instead of panicking on failure.
///
/// A pattern that does not compile yields zero matches for its construct.
pub fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!("Failed to compile pattern {:?}: {}", pattern, e);
            None
        }
    }
}

/// `public`/`private` from the identifier's first letter (exported-by-case
/// languages).
pub fn visibility_from_case(name: &str) -> &'static str {
    match name.chars().next() {
        Some(c) if c.is_uppercase() => "public",
        _ => "private",
    }
}
