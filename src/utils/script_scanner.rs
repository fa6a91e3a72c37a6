// Splits script source into code and literal (string/comment) spans

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    Code,
    /// String literal, template text or comment
    Literal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub kind: SpanKind,
    pub range: Range<usize>,
}

/// Spans covering `code` in order. `${...}` parts of template literals are
/// code; the template text around them is literal.
pub fn scan(code: &str) -> Vec<Span> {
    let mut scanner = Scanner {
        bytes: code.as_bytes(),
        pos: 0,
        code_start: 0,
        spans: Vec::new(),
    };
    scanner.code(false);
    let end = scanner.bytes.len();
    scanner.push(SpanKind::Code, scanner.code_start..end);
    scanner.spans
}

/// Whether the byte at `offset` belongs to a code span
pub fn in_code(spans: &[Span], offset: usize) -> bool {
    let index = spans.partition_point(|span| span.range.end <= offset);
    spans
        .get(index)
        .is_some_and(|span| span.kind == SpanKind::Code && span.range.contains(&offset))
}

/// Same byte length as `code`, with comments blanked and the contents of
/// quoted strings blanked between their quotes. Offsets stay valid for the
/// original source.
pub fn mask_literals(code: &str, spans: &[Span]) -> String {
    let mut masked = String::with_capacity(code.len());

    for span in spans {
        let text = &code[span.range.clone()];
        match span.kind {
            SpanKind::Code => masked.push_str(text),
            SpanKind::Literal => {
                let quoted = text.len() >= 2
                    && (text.starts_with('"') || text.starts_with('\''))
                    && text.ends_with(&text[..1]);
                if quoted {
                    masked.push_str(&text[..1]);
                    masked.push_str(&" ".repeat(text.len() - 2));
                    masked.push_str(&text[..1]);
                } else {
                    masked.push_str(&" ".repeat(text.len()));
                }
            }
        }
    }

    masked
}

struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
    code_start: usize,
    spans: Vec<Span>,
}

impl Scanner<'_> {
    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn push(&mut self, kind: SpanKind, range: Range<usize>) {
        if !range.is_empty() {
            self.spans.push(Span { kind, range });
        }
    }

    /// Scan code. Inside a template interpolation, stop on the `}` that
    /// closes it.
    fn code(&mut self, interpolation: bool) {
        let mut depth = 0usize;

        while let Some(byte) = self.peek(0) {
            match byte {
                b'"' | b'\'' => {
                    let end = self.quoted_end(byte);
                    self.literal(end);
                }
                b'`' => self.template(),
                b'/' if self.peek(1) == Some(b'/') => {
                    let end = self.bytes[self.pos..]
                        .iter()
                        .position(|&b| b == b'\n')
                        .map_or(self.bytes.len(), |n| self.pos + n);
                    self.literal(end);
                }
                b'/' if self.peek(1) == Some(b'*') => {
                    let end = self.bytes[self.pos + 2..]
                        .windows(2)
                        .position(|w| w == b"*/")
                        .map_or(self.bytes.len(), |n| self.pos + 2 + n + 2);
                    self.literal(end);
                }
                b'{' => {
                    depth += 1;
                    self.pos += 1;
                }
                b'}' => {
                    if interpolation && depth == 0 {
                        return;
                    }
                    depth = depth.saturating_sub(1);
                    self.pos += 1;
                }
                _ => self.pos += 1,
            }
        }
    }

    /// Index just past the closing quote, or the end of input
    fn quoted_end(&self, quote: u8) -> usize {
        let mut i = self.pos + 1;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'\\' => i += 2,
                b if b == quote => return i + 1,
                _ => i += 1,
            }
        }
        self.bytes.len()
    }

    fn literal(&mut self, end: usize) {
        self.push(SpanKind::Code, self.code_start..self.pos);
        self.push(SpanKind::Literal, self.pos..end);
        self.pos = end;
        self.code_start = end;
    }

    fn template(&mut self) {
        self.push(SpanKind::Code, self.code_start..self.pos);
        let mut text_start = self.pos;
        self.pos += 1;

        while let Some(byte) = self.peek(0) {
            match byte {
                b'\\' => self.pos += 2,
                b'`' => {
                    self.pos += 1;
                    break;
                }
                b'$' if self.peek(1) == Some(b'{') => {
                    self.pos += 2;
                    self.push(SpanKind::Literal, text_start..self.pos);

                    self.code_start = self.pos;
                    self.code(true);
                    self.push(SpanKind::Code, self.code_start..self.pos);

                    // The closing brace belongs to the template text
                    text_start = self.pos;
                    if self.pos < self.bytes.len() {
                        self.pos += 1;
                    }
                }
                _ => self.pos += 1,
            }
        }

        self.pos = self.pos.min(self.bytes.len());
        self.push(SpanKind::Literal, text_start..self.pos);
        self.code_start = self.pos;
    }
}
