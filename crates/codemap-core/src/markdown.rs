//! Fenced code block extraction for documentation files.
//!
//! A two-state line scanner: outside a fence, or inside one opened by a
//! run of three or more backticks or tildes. Each closed fence becomes one
//! element whose content is exactly the lines between the fence lines.
//! A fence that never closes contributes nothing.

use std::path::Path;

use crate::config::UNKNOWN_LANGUAGE;
use crate::models::{CodeElement, ElementKind};

/// Scanner state between lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenceState {
    Outside,
    Inside(OpenFence),
}

/// An opened fence waiting for its closing line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenFence {
    pub marker: char,
    pub width: usize,
    /// 1-based line of the opening fence.
    pub line: u32,
    pub hint: String,
}

/// A closed fence: opening and closing lines plus the language hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fence {
    pub open_line: u32,
    pub close_line: u32,
    pub hint: String,
}

/// Advance the scanner over one line.
///
/// Returns the next state and, when `line` closes a fence, the closed
/// fence.
pub fn step(state: FenceState, line: &str, line_no: u32) -> (FenceState, Option<Fence>) {
    match state {
        FenceState::Outside => match fence_marker(line) {
            Some((marker, width, rest)) => {
                // A backtick fence's info string may not contain backticks.
                if marker == '`' && rest.contains('`') {
                    return (FenceState::Outside, None);
                }
                let hint = rest
                    .split_whitespace()
                    .next()
                    .map(|h| h.trim_start_matches('{').trim_start_matches('.').trim_end_matches('}'))
                    .filter(|h| !h.is_empty())
                    .unwrap_or(UNKNOWN_LANGUAGE)
                    .to_string();
                let open = OpenFence { marker, width, line: line_no, hint };
                (FenceState::Inside(open), None)
            }
            None => (FenceState::Outside, None),
        },
        FenceState::Inside(open) => match fence_marker(line) {
            Some((marker, width, rest))
                if marker == open.marker && width >= open.width && rest.is_empty() =>
            {
                let fence = Fence {
                    open_line: open.line,
                    close_line: line_no,
                    hint: open.hint,
                };
                (FenceState::Outside, Some(fence))
            }
            _ => (FenceState::Inside(open), None),
        },
    }
}

/// Marker character, run width and trimmed remainder of a fence line.
fn fence_marker(line: &str) -> Option<(char, usize, &str)> {
    let trimmed = line.trim_start();
    // Four or more spaces of indentation make an indented code block.
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let width = trimmed.chars().take_while(|c| *c == marker).count();
    if width < 3 {
        return None;
    }
    Some((marker, width, trimmed[width..].trim()))
}

/// Extract every closed fenced block of a document.
///
/// Each block is a `file` element named `<file-name>:<fence-line>` spanning
/// the fence lines, tagged with the fence's language hint.
pub fn extract_fenced_blocks(path: &str, content: &str) -> Vec<CodeElement> {
    let file_name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);
    let lines: Vec<&str> = content.lines().collect();

    let mut elements = Vec::new();
    let mut state = FenceState::Outside;
    for (idx, line) in lines.iter().enumerate() {
        let (next, closed) = step(state, line, idx as u32 + 1);
        state = next;

        if let Some(fence) = closed {
            let interior = lines[fence.open_line as usize..(fence.close_line - 1) as usize].join("\n");
            elements.push(CodeElement::new(
                ElementKind::File,
                format!("{}:{}", file_name, fence.open_line),
                interior,
                fence.open_line,
                fence.close_line,
                path,
                fence.hint,
            ));
        }
    }

    if let FenceState::Inside(open) = state {
        tracing::debug!("Unterminated fence at {}:{}", path, open.line);
    }

    elements
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "# Title\n\n```rust\nfn main() {}\nlet x = 1;\n```\n\nText.\n\n~~~\nplain\n~~~\n";

    #[test]
    fn test_two_fences() {
        let blocks = extract_fenced_blocks("docs/README.md", DOC);
        assert_eq!(blocks.len(), 2);

        assert_eq!(blocks[0].name, "README.md:3");
        assert_eq!(blocks[0].kind, ElementKind::File);
        assert_eq!(blocks[0].language, "rust");
        assert_eq!(blocks[0].content, "fn main() {}\nlet x = 1;");
        assert_eq!((blocks[0].start_line, blocks[0].end_line), (3, 6));
        assert_eq!(blocks[0].file_path, "docs/README.md");

        assert_eq!(blocks[1].language, "unknown");
        assert_eq!(blocks[1].content, "plain");
        assert_eq!((blocks[1].start_line, blocks[1].end_line), (10, 12));
    }

    #[test]
    fn test_unterminated_fence_yields_nothing() {
        let doc = "```python\nprint(1)\n```\n\n```js\nnever closed\n";
        let blocks = extract_fenced_blocks("a.md", doc);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, "python");
    }

    #[test]
    fn test_mismatched_marker_does_not_close() {
        let doc = "````md\n```\ninner\n```\n````\n";
        let blocks = extract_fenced_blocks("a.md", doc);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].content, "```\ninner\n```");

        let doc = "~~~\n```\n~~~\n";
        assert_eq!(extract_fenced_blocks("a.md", doc)[0].content, "```");
    }

    #[test]
    fn test_empty_block() {
        let blocks = extract_fenced_blocks("a.md", "```sh\n```\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].content, "");
        assert_eq!(blocks[0].language, "sh");
    }

    #[test]
    fn test_step_transitions() {
        let (state, closed) = step(FenceState::Outside, "```go", 1);
        assert!(closed.is_none());
        assert!(matches!(state, FenceState::Inside(ref open) if open.hint == "go"));

        let (state, closed) = step(state, "``` not a close", 2);
        assert!(closed.is_none());

        let (state, closed) = step(state, "```", 3);
        assert_eq!(state, FenceState::Outside);
        assert_eq!(
            closed,
            Some(Fence { open_line: 1, close_line: 3, hint: "go".to_string() })
        );
    }

    #[test]
    fn test_attribute_style_hint() {
        let (state, _) = step(FenceState::Outside, "``` {.python}", 1);
        assert!(matches!(state, FenceState::Inside(ref open) if open.hint == "python"));
    }

    #[test]
    fn test_indented_code_is_not_a_fence() {
        assert!(extract_fenced_blocks("a.md", "    ```\n    x\n    ```\n").is_empty());
    }
}
