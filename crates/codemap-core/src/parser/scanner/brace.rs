//! Brace-delimited block boundary scanner.
//!
//! A byte-at-a-time state machine that matches a block's closing brace while
//! skipping string, character and comment content. Every significant token is
//! ASCII, so scanning bytes never splits a meaningful character; multi-byte
//! UTF-8 sequences simply pass through whatever state is current.

/// Lexical state of the brace scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Normal,
    InString,
    InChar,
    InLineComment,
    InBlockComment,
}

/// Result of feeding one byte (plus one byte of lookahead) to the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State after the consumed bytes.
    pub state: ScanState,
    /// Bytes consumed: 1, or 2 for escapes and two-byte comment markers.
    pub advance: usize,
    /// Brace depth change (only ever non-zero in `Normal`).
    pub depth: i32,
}

impl Transition {
    fn to(state: ScanState) -> Self {
        Self { state, advance: 1, depth: 0 }
    }

    fn skip2(state: ScanState) -> Self {
        Self { state, advance: 2, depth: 0 }
    }
}

/// Single pure transition of the brace scanner.
pub fn transition(state: ScanState, byte: u8, next: Option<u8>) -> Transition {
    match state {
        ScanState::Normal => match (byte, next) {
            (b'{', _) => Transition { state, advance: 1, depth: 1 },
            (b'}', _) => Transition { state, advance: 1, depth: -1 },
            (b'"', _) => Transition::to(ScanState::InString),
            (b'\'', _) => Transition::to(ScanState::InChar),
            (b'/', Some(b'/')) => Transition::skip2(ScanState::InLineComment),
            (b'/', Some(b'*')) => Transition::skip2(ScanState::InBlockComment),
            _ => Transition::to(state),
        },
        ScanState::InString => match byte {
            b'\\' => Transition::skip2(state),
            b'"' => Transition::to(ScanState::Normal),
            _ => Transition::to(state),
        },
        // Char literals never span lines; a stray apostrophe must not
        // swallow the rest of the file.
        ScanState::InChar => match byte {
            b'\\' => Transition::skip2(state),
            b'\'' | b'\n' => Transition::to(ScanState::Normal),
            _ => Transition::to(state),
        },
        ScanState::InLineComment => match byte {
            b'\n' => Transition::to(ScanState::Normal),
            _ => Transition::to(state),
        },
        ScanState::InBlockComment => match (byte, next) {
            (b'*', Some(b'/')) => Transition::skip2(ScanState::Normal),
            _ => Transition::to(state),
        },
    }
}

/// Brace block scanner for C-family languages.
#[derive(Debug, Clone, Copy, Default)]
pub struct BraceScanner {
    /// Treat back-tick delimited text as raw strings (Go).
    raw_backtick: bool,
}

impl BraceScanner {
    pub fn new() -> Self {
        Self { raw_backtick: false }
    }

    /// Scanner that also skips back-tick raw strings wholesale.
    pub fn with_raw_strings() -> Self {
        Self { raw_backtick: true }
    }

    /// Find the byte offset of the brace closing a block.
    ///
    /// `start` is the offset just after the opening brace (depth 1). Returns
    /// `None` when the block is never closed; callers clamp to end of file.
    pub fn find_block_end(&self, text: &str, start: usize) -> Option<usize> {
        let bytes = text.as_bytes();
        let mut state = ScanState::Normal;
        let mut depth = 1i32;
        let mut i = start;

        while i < bytes.len() {
            if state == ScanState::Normal && self.raw_backtick && bytes[i] == b'`' {
                i = self.skip_raw(bytes, i)?;
                continue;
            }

            let t = transition(state, bytes[i], bytes.get(i + 1).copied());
            depth += t.depth;
            if depth == 0 {
                return Some(i);
            }
            state = t.state;
            i += t.advance;
        }

        None
    }

    /// Copy of `text` with comment, string and char content blanked out.
    ///
    /// Byte offsets and newlines are preserved, so positions found in the
    /// masked text index the original directly.
    pub fn mask(&self, text: &str) -> String {
        let bytes = text.as_bytes();
        let mut out = Vec::with_capacity(bytes.len());
        let mut state = ScanState::Normal;
        let mut i = 0;

        while i < bytes.len() {
            if state == ScanState::Normal && self.raw_backtick && bytes[i] == b'`' {
                let end = self.skip_raw(bytes, i).unwrap_or(bytes.len());
                out.extend(bytes[i..end].iter().map(|&b| blank(b)));
                i = end;
                continue;
            }

            let t = transition(state, bytes[i], bytes.get(i + 1).copied());
            let end = (i + t.advance).min(bytes.len());
            let keep = state == ScanState::Normal && t.state == ScanState::Normal;
            for &b in &bytes[i..end] {
                out.push(if keep { b } else { blank(b) });
            }
            state = t.state;
            i = end;
        }

        String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
    }

    /// Offset just past the back-tick closing the raw string opened at `open`.
    fn skip_raw(&self, bytes: &[u8], open: usize) -> Option<usize> {
        bytes[open + 1..]
            .iter()
            .position(|&b| b == b'`')
            .map(|p| open + 1 + p + 1)
    }
}

fn blank(b: u8) -> u8 {
    if b == b'\n' {
        b'\n'
    } else {
        b' '
    }
}
