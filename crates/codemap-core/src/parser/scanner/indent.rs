//! Indentation-delimited block boundary scanner.
//!
//! Walks forward line by line from a block header. The block ends at the
//! first code line indented no deeper than the header. Blank lines, comment
//! lines, docstring interiors and bracket continuation lines never end it.

/// Triple-quote docstring delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripleQuote {
    Double,
    Single,
}

impl TripleQuote {
    pub fn delimiter(&self) -> &'static str {
        match self {
            Self::Double => "\"\"\"",
            Self::Single => "'''",
        }
    }

    fn from_byte(b: u8) -> Self {
        if b == b'\'' {
            Self::Single
        } else {
            Self::Double
        }
    }
}

/// Line-level state of the indentation scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentState {
    /// Ordinary code lines.
    Code,
    /// Inside a triple-quoted string opened on an earlier line.
    Docstring(TripleQuote),
    /// Inside brackets left open on an earlier line. `quote` is set while a
    /// triple-quoted string inside those brackets is still open.
    Continuation { depth: u32, quote: Option<TripleQuote> },
}

/// What a single line means for the block being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineVerdict {
    /// Blank or comment-only: neither extends nor ends the block.
    Skip,
    /// Part of the block body.
    Body,
    /// First line after the block.
    End,
}

/// Single pure transition of the indentation scanner.
pub fn step(state: IndentState, line: &str, base_indent: usize) -> (IndentState, LineVerdict) {
    match state {
        IndentState::Docstring(quote) => (carry(0, line, Some(quote)), LineVerdict::Body),
        IndentState::Continuation { depth, quote } => {
            (carry(depth as i32, line, quote), LineVerdict::Body)
        }
        IndentState::Code => {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return (state, LineVerdict::Skip);
            }
            if indent_width(line) <= base_indent {
                return (state, LineVerdict::End);
            }
            (carry(0, line, None), LineVerdict::Body)
        }
    }
}

/// State left behind once `line` has been scanned from `depth` open brackets
/// and an optional open triple quote.
fn carry(depth: i32, line: &str, quote: Option<TripleQuote>) -> IndentState {
    let (delta, open) = scan_line(line, quote);
    let depth = depth + delta;
    match open {
        _ if depth > 0 => IndentState::Continuation {
            depth: depth as u32,
            quote: open,
        },
        Some(quote) => IndentState::Docstring(quote),
        None => IndentState::Code,
    }
}

/// Index of the last body line of the block whose header ends on
/// `header_line` (0-based). Returns `header_line` for one-line blocks.
pub fn find_block_end(lines: &[&str], header_line: usize, base_indent: usize) -> usize {
    let mut state = IndentState::Code;
    let mut last = header_line;

    for (idx, line) in lines.iter().enumerate().skip(header_line + 1) {
        let (next, verdict) = step(state, line, base_indent);
        match verdict {
            LineVerdict::End => break,
            LineVerdict::Body => last = idx,
            LineVerdict::Skip => {}
        }
        state = next;
    }

    last
}

/// Visual indentation width (tabs advance to the next multiple of 8).
pub fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for ch in line.chars() {
        match ch {
            ' ' => width += 1,
            '\t' => width = (width / 8 + 1) * 8,
            _ => break,
        }
    }
    width
}

/// Net bracket depth change over one line and the triple quote still open
/// at its end. Quoted text and comments are ignored; `open` is a triple
/// quote carried in from the previous line.
fn scan_line(line: &str, open: Option<TripleQuote>) -> (i32, Option<TripleQuote>) {
    let bytes = line.as_bytes();
    let mut delta = 0;
    let mut triple = open;
    let mut single: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if triple.is_some() || single.is_some() {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if let Some(quote) = triple {
                if bytes[i..].starts_with(quote.delimiter().as_bytes()) {
                    triple = None;
                    i += 3;
                    continue;
                }
            } else if single == Some(b) {
                single = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'#' => break,
            b'"' | b'\'' => {
                let quote = TripleQuote::from_byte(b);
                if bytes[i..].starts_with(quote.delimiter().as_bytes()) {
                    triple = Some(quote);
                    i += 3;
                    continue;
                }
                single = Some(b);
            }
            b'(' | b'[' | b'{' => delta += 1,
            b')' | b']' | b'}' => delta -= 1,
            _ => {}
        }
        i += 1;
    }

    (delta, triple)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn end_of(src: &str) -> usize {
        let lines: Vec<&str> = src.lines().collect();
        find_block_end(&lines, 0, indent_width(lines[0]))
    }

    #[test]
    fn test_simple_block() {
        let src = "def f():\n    a = 1\n    return a\nx = 2\n";
        assert_eq!(end_of(src), 2);
    }

    #[test]
    fn test_nested_block_does_not_end_early() {
        let src = "def f():\n    if a:\n        b()\n    return c\n\ndef g():\n    pass\n";
        assert_eq!(end_of(src), 3);
    }

    #[test]
    fn test_shallow_blank_and_comment_lines() {
        let src = "def f():\n    a = 1\n\n# comment at column zero\n    return a\nnext_thing()\n";
        assert_eq!(end_of(src), 4);
    }

    #[test]
    fn test_docstring_interior_ignored() {
        let src = "def f():\n    \"\"\"Doc.\n\nnot code at column zero\n    \"\"\"\n    return 1\nz = 0\n";
        assert_eq!(end_of(src), 5);
    }

    #[test]
    fn test_single_line_docstring_stays_in_code() {
        let (state, verdict) = step(IndentState::Code, "    \"\"\"One line.\"\"\"", 0);
        assert_eq!(state, IndentState::Code);
        assert_eq!(verdict, LineVerdict::Body);
    }

    #[test]
    fn test_bracket_continuation() {
        let src = "def f():\n    call(a,\nb)\n    return 2\ny = 1\n";
        assert_eq!(end_of(src), 3);
    }

    #[test]
    fn test_one_line_block() {
        let src = "def f(): return 1\ndef g(): return 2\n";
        assert_eq!(end_of(src), 0);
    }

    #[test]
    fn test_block_to_end_of_file() {
        let src = "class A:\n    def m(self):\n        pass";
        assert_eq!(end_of(src), 2);
    }

    #[test]
    fn test_indent_width_tabs() {
        assert_eq!(indent_width("\tx"), 8);
        assert_eq!(indent_width("  \tx"), 8);
        assert_eq!(indent_width("    x"), 4);
    }

    #[test]
    fn test_comment_brackets_ignored() {
        assert_eq!(scan_line("x = f(a)  # (unbalanced", None), (0, None));
        assert_eq!(scan_line("s = '(' + \"[\"", None), (0, None));
    }

    #[test]
    fn test_triple_quoted_call_argument() {
        let src = "def f():\n    run(\n        \"\"\"\ntext\n\"\"\")\n    return 1\n\n\ndef g():\n    pass\n";
        assert_eq!(end_of(src), 5);
    }

    #[test]
    fn test_triple_quote_opened_with_bracket() {
        let src = "def f():\n    cursor.execute(\"\"\"\n        SELECT (a\n)\"\"\", args)\n    return 2\nh = 1\n";
        assert_eq!(end_of(src), 4);

        let (state, _) = step(IndentState::Code, "    run('''(", 0);
        assert_eq!(
            state,
            IndentState::Continuation {
                depth: 1,
                quote: Some(TripleQuote::Single)
            }
        );
        let (state, _) = step(state, "''')", 0);
        assert_eq!(state, IndentState::Code);
    }

    #[test]
    fn test_continuation_string_brackets_ignored() {
        let src = "def f():\n    call(\"(\",\n'[', \"# not a comment)\",\nb)\n    return 3\nw = 0\n";
        assert_eq!(end_of(src), 4);
    }

    #[test]
    fn test_escaped_quotes() {
        assert_eq!(scan_line(r#"s = "\")" + f("#, None), (1, None));
        assert_eq!(
            scan_line(r#"text \""" still)"#, Some(TripleQuote::Double)),
            (0, Some(TripleQuote::Double))
        );
    }
}
