//! Python parser using anchored patterns and the indentation scanner.
//!
//! Extracts:
//! - Imports (`import a as b, c` / `from x import y`) and `__all__` exports
//! - Top-level functions and classes
//! - Methods, qualified as `Class.method`, with decorators as modifiers
//!
//! Functions nested inside functions are not emitted.

use once_cell::sync::Lazy;
use regex::Regex;

use super::base::{
    assemble, compile, complexity, doc_comment_before, file_element, matching_paren,
    split_parameters, CommentStyle, LineIndex, PYTHON_COMPLEXITY,
};
use super::scanner::indent::{find_block_end, indent_width};
use super::traits::Parser;
use crate::models::{CodeElement, ElementKind, Parameter};

static DEF_RE: Lazy<Option<Regex>> =
    Lazy::new(|| compile(r"(?m)^([ \t]*)(async[ \t]+)?def[ \t]+(\w+)[ \t]*\("));

static CLASS_RE: Lazy<Option<Regex>> = Lazy::new(|| compile(r"(?m)^([ \t]*)class[ \t]+(\w+)"));

static IMPORT_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    compile(
        r"(?m)^[ \t]*import[ \t]+([\w.]+(?:[ \t]+as[ \t]+\w+)?(?:[ \t]*,[ \t]*[\w.]+(?:[ \t]+as[ \t]+\w+)?)*)",
    )
});

static FROM_RE: Lazy<Option<Regex>> =
    Lazy::new(|| compile(r"(?m)^[ \t]*from[ \t]+([\w.]+)[ \t]+import\b"));

static ALL_RE: Lazy<Option<Regex>> =
    Lazy::new(|| compile(r"(?m)^__all__[ \t]*\+?=[ \t]*[\[(]([^\])]*)[\])]"));

static QUOTED_RE: Lazy<Option<Regex>> = Lazy::new(|| compile(r#"["']([\w.]+)["']"#));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderKind {
    Def,
    Class,
}

/// A `def` or `class` header found in the masked text.
#[derive(Debug, Clone)]
struct Header {
    kind: HeaderKind,
    indent: usize,
    name: String,
    is_async: bool,
    /// Offset of the statement keyword (`async`, `def` or `class`).
    start: usize,
    name_end: usize,
    paren_open: Option<usize>,
}

/// Resolved line layout of a header and its body (0-based line indexes).
#[derive(Debug, Clone, Copy)]
struct Block {
    /// First decorator line, or the header line.
    start_idx: usize,
    header_idx: usize,
    /// Line holding the header's closing colon.
    colon_idx: usize,
    colon: usize,
    end_idx: usize,
    params: Option<(usize, usize)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Class,
    Function,
}

#[derive(Debug, Clone)]
struct OpenBlock {
    scope: Scope,
    name: String,
    end_idx: usize,
}

/// Python parser.
pub struct PythonParser;

impl PythonParser {
    pub fn new() -> Self {
        Self
    }

    fn resolve_block(&self, header: &Header, masked: &str, index: &LineIndex, lines: &[&str]) -> Option<Block> {
        let header_idx = (index.line_of(header.start) - 1) as usize;

        let (params, search_from) = match header.paren_open {
            Some(open) => {
                let close = matching_paren(masked, open)?;
                (Some((open, close)), close + 1)
            }
            None => (None, header.name_end),
        };

        let colon = header_colon(masked, search_from)?;
        let colon_idx = (index.line_of(colon) - 1) as usize;

        Some(Block {
            start_idx: decorator_start(lines, header_idx),
            header_idx,
            colon_idx,
            colon,
            end_idx: find_block_end(lines, colon_idx, header.indent),
            params,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn build_element(
        &self,
        path: &str,
        content: &str,
        masked: &str,
        index: &LineIndex,
        lines: &[&str],
        header: &Header,
        block: &Block,
        owner: Option<&str>,
    ) -> CodeElement {
        let start_line = block.start_idx as u32 + 1;
        let end_line = block.end_idx as u32 + 1;
        let begin = index.line_start(start_line);
        let end = index.line_end(end_line).max(begin);

        let mut modifiers: Vec<String> = lines[block.start_idx..block.header_idx]
            .iter()
            .filter_map(|line| decorator_modifier(line))
            .collect();
        if header.is_async {
            modifiers.push("async".to_string());
        }
        modifiers.push(visibility(&header.name).to_string());

        let documentation = docstring(lines, block.colon_idx + 1, block.end_idx)
            .or_else(|| doc_comment_before(lines, block.start_idx, CommentStyle::Hash));

        let (kind, name) = match (header.kind, owner) {
            (HeaderKind::Class, _) => (ElementKind::Class, header.name.clone()),
            (HeaderKind::Def, Some(owner)) => (ElementKind::Method, format!("{}.{}", owner, header.name)),
            (HeaderKind::Def, None) => (ElementKind::Function, header.name.clone()),
        };

        let element = CodeElement::new(
            kind,
            name,
            &content[begin..end],
            start_line,
            end_line,
            path,
            self.language_name(),
        )
        .with_modifiers(modifiers)
        .with_documentation(documentation);

        let Some((open, close)) = block.params else {
            return element;
        };

        let mut parameters = parse_parameters(&content[open + 1..close]);
        if owner.is_some() {
            parameters.retain(|p| p.name != "self" && p.name != "cls");
        }
        let return_type = content[close + 1..block.colon]
            .split_once("->")
            .map(|(_, annotation)| annotation.trim().to_string());

        element
            .with_parameters(parameters)
            .with_return_type(return_type)
            .with_complexity(complexity(&masked[begin..end], &PYTHON_COMPLEXITY))
    }
}

impl Default for PythonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for PythonParser {
    fn parse_file(&self, path: &str, content: &str) -> Vec<CodeElement> {
        let masked = mask_python(content);
        let index = LineIndex::new(content);
        let lines: Vec<&str> = content.lines().collect();

        let mut file = file_element(path, content, self.language_name());
        file.imports = extract_imports(&masked);
        file.exports = extract_all(content, &masked);

        let mut elements = Vec::new();
        let mut stack: Vec<OpenBlock> = Vec::new();

        for header in find_headers(&masked) {
            let Some(block) = self.resolve_block(&header, &masked, &index, &lines) else {
                continue;
            };

            while stack.last().is_some_and(|open| open.end_idx < block.header_idx) {
                stack.pop();
            }
            let owner = stack.last().map(|open| (open.scope, open.name.clone()));
            stack.push(OpenBlock {
                scope: match header.kind {
                    HeaderKind::Def => Scope::Function,
                    HeaderKind::Class => Scope::Class,
                },
                name: header.name.clone(),
                end_idx: block.end_idx,
            });

            let owner_name = match &owner {
                Some((Scope::Function, _)) => continue,
                Some((Scope::Class, name)) => Some(name.as_str()),
                None => None,
            };

            elements.push(self.build_element(
                path, content, &masked, &index, &lines, &header, &block, owner_name,
            ));
        }

        assemble(file, elements)
    }

    fn language_name(&self) -> &'static str {
        "python"
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &["py", "pyw", "pyi"]
    }
}

// --- Helper functions ---

fn find_headers(masked: &str) -> Vec<Header> {
    let mut headers = Vec::new();

    if let Some(re) = DEF_RE.as_ref() {
        for cap in re.captures_iter(masked) {
            let (Some(whole), Some(indent), Some(name)) = (cap.get(0), cap.get(1), cap.get(3)) else {
                continue;
            };
            headers.push(Header {
                kind: HeaderKind::Def,
                indent: indent_width(indent.as_str()),
                name: name.as_str().to_string(),
                is_async: cap.get(2).is_some(),
                start: indent.end(),
                name_end: name.end(),
                paren_open: Some(whole.end() - 1),
            });
        }
    }

    if let Some(re) = CLASS_RE.as_ref() {
        for cap in re.captures_iter(masked) {
            let (Some(indent), Some(name)) = (cap.get(1), cap.get(2)) else {
                continue;
            };
            headers.push(Header {
                kind: HeaderKind::Class,
                indent: indent_width(indent.as_str()),
                name: name.as_str().to_string(),
                is_async: false,
                start: indent.end(),
                name_end: name.end(),
                paren_open: None,
            });
        }
    }

    headers.sort_by_key(|h| h.start);
    headers
}

/// Offset of the colon ending a header, skipping bracketed text.
fn header_colon(masked: &str, from: usize) -> Option<usize> {
    let mut depth = 0i32;
    let mut last = b' ';

    for (i, b) in masked.bytes().enumerate().skip(from) {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b':' if depth <= 0 => return Some(i),
            b'\n' if depth <= 0 && last != b'\\' => return None,
            _ => {}
        }
        if !b.is_ascii_whitespace() {
            last = b;
        }
    }

    None
}

fn decorator_start(lines: &[&str], header_idx: usize) -> usize {
    let mut start = header_idx;
    while start > 0 && lines.get(start - 1).is_some_and(|l| l.trim_start().starts_with('@')) {
        start -= 1;
    }
    start
}

/// `@staticmethod` -> `static`, `@abc.abstractmethod` -> `abstract`,
/// `@app.route("/")` -> `route`.
fn decorator_modifier(line: &str) -> Option<String> {
    let body = line.trim().strip_prefix('@')?;
    let path = body.split(|c: char| c == '(' || c.is_whitespace()).next()?;
    let bare = path.rsplit('.').next().unwrap_or(path);
    let modifier = match bare {
        "staticmethod" => "static",
        "abstractmethod" => "abstract",
        other => other,
    };
    (!modifier.is_empty()).then(|| modifier.to_string())
}

fn visibility(name: &str) -> &'static str {
    if name.starts_with('_') {
        "private"
    } else {
        "public"
    }
}

/// Docstring opening the body, if the first body statement is one.
fn docstring(lines: &[&str], first_body: usize, end_idx: usize) -> Option<String> {
    let (idx, line) = lines
        .iter()
        .enumerate()
        .take(end_idx + 1)
        .skip(first_body)
        .find(|(_, l)| !l.trim().is_empty())?;

    let trimmed = line.trim_start().trim_start_matches(&['r', 'R', 'u', 'U'][..]);
    let quote = ["\"\"\"", "'''"].into_iter().find(|q| trimmed.starts_with(q))?;
    let rest = &trimmed[quote.len()..];

    if let Some(close) = rest.find(quote) {
        return Some(rest[..close].trim().to_string());
    }

    let mut parts = vec![rest.trim()];
    for line in lines.iter().skip(idx + 1) {
        if let Some(close) = line.find(quote) {
            parts.push(line[..close].trim());
            break;
        }
        parts.push(line.trim());
    }

    let text = parts.join("\n").trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// `a`, `b: int = 2`, `*args`, `**kwargs`; bare `*` and `/` markers are dropped.
fn parse_parameters(raw: &str) -> Vec<Parameter> {
    split_parameters(raw, false)
        .into_iter()
        .filter(|p| p != "*" && p != "/")
        .map(|param| {
            let (head, default_value) = match param.split_once('=') {
                Some((head, default)) => (head.trim(), Some(default.trim().to_string())),
                None => (param.trim(), None),
            };
            let (name, type_name) = match head.split_once(':') {
                Some((name, ty)) => (name.trim(), Some(ty.trim().to_string())),
                None => (head, None),
            };
            Parameter {
                name: name.to_string(),
                type_name,
                default_value,
            }
        })
        .collect()
}

fn extract_imports(masked: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = Vec::new();

    if let Some(re) = IMPORT_RE.as_ref() {
        for cap in re.captures_iter(masked) {
            let Some(list) = cap.get(1) else {
                continue;
            };
            for item in list.as_str().split(',') {
                if let Some(module) = item.split_whitespace().next() {
                    found.push((list.start(), module.to_string()));
                }
            }
        }
    }

    if let Some(re) = FROM_RE.as_ref() {
        for cap in re.captures_iter(masked) {
            if let Some(module) = cap.get(1) {
                found.push((module.start(), module.as_str().to_string()));
            }
        }
    }

    found.sort_by_key(|(offset, _)| *offset);
    found.into_iter().map(|(_, name)| name).collect()
}

/// Names listed in a module-level `__all__` assignment.
fn extract_all(content: &str, masked: &str) -> Vec<String> {
    let (Some(all_re), Some(quoted_re)) = (ALL_RE.as_ref(), QUOTED_RE.as_ref()) else {
        return Vec::new();
    };

    all_re
        .captures_iter(content)
        .filter(|cap| {
            cap.get(0)
                .and_then(|m| masked.get(m.start()..))
                .is_some_and(|rest| rest.starts_with("__all__"))
        })
        .filter_map(|cap| cap.get(1))
        .flat_map(|list| {
            quoted_re
                .captures_iter(list.as_str())
                .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Copy of `text` with string and comment content blanked out, preserving
/// byte offsets and newlines.
fn mask_python(text: &str) -> String {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut out = bytes.to_vec();
    let mut i = 0;

    while i < len {
        match bytes[i] {
            b'#' => {
                while i < len && bytes[i] != b'\n' {
                    out[i] = b' ';
                    i += 1;
                }
            }
            quote @ (b'"' | b'\'') => {
                let triple = bytes[i..].starts_with(&[quote, quote, quote]);
                let start = i;
                i += if triple { 3 } else { 1 };

                while i < len {
                    let b = bytes[i];
                    if b == b'\\' {
                        i += 2;
                        continue;
                    }
                    if triple {
                        if bytes[i..].starts_with(&[quote, quote, quote]) {
                            i += 3;
                            break;
                        }
                    } else if b == quote {
                        i += 1;
                        break;
                    } else if b == b'\n' {
                        break;
                    }
                    i += 1;
                }

                let end = i.min(len);
                for b in &mut out[start..end] {
                    if *b != b'\n' {
                        *b = b' ';
                    }
                }
                i = end;
            }
            _ => i += 1,
        }
    }

    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#""""Module docstring."""
import os
import sys as system, json
from typing import List, Optional
from . import sibling

__all__ = ["Greeter", "helper"]


# Helper that adds.
# Second line.
def helper(a: int, b: int = 2, *args, **kwargs) -> int:
    if a and b:
        return a + b

# shallow comment
    return 0


class Greeter(Base):
    """Greets people.

def not_a_function():
    """

    @staticmethod
    def create(name: str = "x, y") -> "Greeter":
        return Greeter(name)

    async def _fetch(self, url):
        def inner():
            pass
        return inner

    @property
    def name(self):
        return self._name


def tail(): return 1
"#;

    fn parse() -> Vec<CodeElement> {
        PythonParser::new().parse_file("greet.py", SAMPLE)
    }

    fn find<'a>(elements: &'a [CodeElement], name: &str) -> &'a CodeElement {
        elements.iter().find(|e| e.name == name).unwrap()
    }

    #[test]
    fn test_file_element() {
        let elements = parse();
        let file = &elements[0];
        assert_eq!(file.kind, ElementKind::File);
        assert_eq!(file.end_line, 40);
        assert_eq!(file.imports, vec!["os", "sys", "json", "typing", "."]);
        assert_eq!(file.exports, vec!["Greeter", "helper"]);
    }

    #[test]
    fn test_function_extraction() {
        let elements = parse();
        let helper = find(&elements, "helper");
        assert_eq!(helper.kind, ElementKind::Function);
        assert_eq!(helper.start_line, 12);
        assert_eq!(helper.end_line, 17);
        assert!(helper.content.starts_with("def helper("));
        assert_eq!(helper.return_type.as_deref(), Some("int"));
        assert_eq!(helper.documentation.as_deref(), Some("Helper that adds.\nSecond line."));
        assert_eq!(helper.complexity, Some(3));
        assert!(helper.modifiers.contains("public"));

        let params = helper.parameters.as_ref().unwrap();
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "*args", "**kwargs"]);
        assert_eq!(params[1].type_name.as_deref(), Some("int"));
        assert_eq!(params[1].default_value.as_deref(), Some("2"));
    }

    #[test]
    fn test_class_with_docstring_containing_def() {
        let elements = parse();
        let class = find(&elements, "Greeter");
        assert_eq!(class.kind, ElementKind::Class);
        assert_eq!(class.start_line, 20);
        assert_eq!(class.end_line, 37);
        assert!(class.documentation.as_deref().unwrap().starts_with("Greets people."));
        assert!(elements.iter().all(|e| e.name != "not_a_function"));
    }

    #[test]
    fn test_decorated_static_method() {
        let elements = parse();
        let create = find(&elements, "Greeter.create");
        assert_eq!(create.kind, ElementKind::Method);
        assert_eq!(create.start_line, 26);
        assert_eq!(create.end_line, 28);
        assert!(create.modifiers.contains("static"));
        assert_eq!(create.return_type.as_deref(), Some("\"Greeter\""));
        let params = create.parameters.as_ref().unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].default_value.as_deref(), Some("\"x, y\""));
    }

    #[test]
    fn test_async_private_method_drops_self() {
        let elements = parse();
        let fetch = find(&elements, "Greeter._fetch");
        assert!(fetch.modifiers.contains("async"));
        assert!(fetch.modifiers.contains("private"));
        let params = fetch.parameters.as_ref().unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "url");
    }

    #[test]
    fn test_nested_function_not_emitted() {
        let elements = parse();
        assert!(elements.iter().all(|e| !e.name.ends_with("inner")));
    }

    #[test]
    fn test_triple_quoted_argument_does_not_swallow_next_function() {
        let src = "def f():\n    run(\n        \"\"\"\ntext\n\"\"\")\n    return 1\n\n\ndef g():\n    pass\n";
        let elements = PythonParser::new().parse_file("m.py", src);
        let names: Vec<&str> = elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["m.py", "f", "g"]);

        let f = find(&elements, "f");
        assert_eq!((f.start_line, f.end_line), (1, 6));
        let g = find(&elements, "g");
        assert_eq!(g.kind, ElementKind::Function);
        assert_eq!((g.start_line, g.end_line), (9, 10));
    }

    #[test]
    fn test_property_and_one_liner() {
        let elements = parse();
        assert!(find(&elements, "Greeter.name").modifiers.contains("property"));
        let tail = find(&elements, "tail");
        assert_eq!(tail.start_line, 40);
        assert_eq!(tail.end_line, 40);
    }

    #[test]
    fn test_methods_contained_in_class() {
        let elements = parse();
        let class = find(&elements, "Greeter");
        for method in elements.iter().filter(|e| e.kind == ElementKind::Method) {
            assert!(class.contains(method), "{} escapes its class", method.name);
        }
    }

    #[test]
    fn test_docstring_only_body() {
        let src = "class Empty:\n    \"\"\"Only a docstring.\"\"\"\n";
        let elements = PythonParser::new().parse_file("e.py", src);
        let class = find(&elements, "Empty");
        assert_eq!(class.end_line, 2);
        assert_eq!(class.documentation.as_deref(), Some("Only a docstring."));
    }

    #[test]
    fn test_multiline_header() {
        let src = "def long(\n    a,\n    b=(1, 2),\n):\n    return a\nx = 1\n";
        let elements = PythonParser::new().parse_file("m.py", src);
        let f = find(&elements, "long");
        assert_eq!((f.start_line, f.end_line), (1, 5));
        assert_eq!(f.parameters.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_mask_python() {
        let src = "x = '#'  # note\ns = \"\"\"a\nb\"\"\"\n";
        let masked = mask_python(src);
        assert_eq!(masked.len(), src.len());
        assert!(masked.starts_with("x = "));
        assert!(!masked.contains('#'));
        assert_eq!(masked.matches('\n').count(), 3);
    }

    #[test]
    fn test_decorator_modifier() {
        assert_eq!(decorator_modifier("@staticmethod").as_deref(), Some("static"));
        assert_eq!(decorator_modifier("  @abc.abstractmethod").as_deref(), Some("abstract"));
        assert_eq!(decorator_modifier("@app.route(\"/\")").as_deref(), Some("route"));
        assert_eq!(decorator_modifier("x = 1"), None);
    }
}
