//! Splits text into literal runs and embedded `{=expression}` placeholders.

/// One piece of a scanned text, borrowing from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Verbatim text, including plain `{name}` wildcard references.
    Literal(&'a str),
    /// The raw body of a `{=...}` placeholder, not yet parsed or evaluated.
    Expression(&'a str),
    /// A `{=` whose body ran to the end of the input without a closing `}`.
    /// Carries the raw tail starting at the `{`.
    Unterminated(&'a str),
}

/// Scan `text` for formula placeholders. The returned iterator is lazy and
/// restartable: scanning the same text twice yields the same segments.
///
/// A placeholder starts at `{=` and ends at the next `}`; its body may not
/// contain whitespace, `{`, or `}`. A `{=` whose body breaks that rule is
/// plain literal text and scanning resumes just past it, so in
/// `"{= 1}{=2}"` only `2` is an expression.
pub fn scan(text: &str) -> Scanner<'_> {
    Scanner {
        text,
        pos: 0,
        pending: None,
    }
}

pub struct Scanner<'a> {
    text: &'a str,
    pos: usize,
    pending: Option<Segment<'a>>,
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Segment<'a>> {
        if let Some(seg) = self.pending.take() {
            return Some(seg);
        }
        if self.pos >= self.text.len() {
            return None;
        }
        let lit_start = self.pos;
        let mut cursor = self.pos;
        while let Some(off) = self.text[cursor..].find("{=") {
            let open = cursor + off;
            match self.body_end(open + 2) {
                BodyEnd::Closed(close) => {
                    let expr = Segment::Expression(&self.text[open + 2..close]);
                    self.pos = close + 1;
                    if lit_start == open {
                        return Some(expr);
                    }
                    self.pending = Some(expr);
                    return Some(Segment::Literal(&self.text[lit_start..open]));
                }
                BodyEnd::EndOfInput => {
                    let tail = Segment::Unterminated(&self.text[open..]);
                    self.pos = self.text.len();
                    if lit_start == open {
                        return Some(tail);
                    }
                    self.pending = Some(tail);
                    return Some(Segment::Literal(&self.text[lit_start..open]));
                }
                // Not a placeholder; the "{=" stays literal and the search
                // continues after it.
                BodyEnd::NotAPlaceholder => cursor = open + 2,
            }
        }
        self.pos = self.text.len();
        Some(Segment::Literal(&self.text[lit_start..]))
    }
}

enum BodyEnd {
    Closed(usize),
    EndOfInput,
    NotAPlaceholder,
}

impl Scanner<'_> {
    /// Walk a candidate body starting at byte `from` (just past `{=`).
    fn body_end(&self, from: usize) -> BodyEnd {
        for (off, c) in self.text[from..].char_indices() {
            match c {
                '}' => return BodyEnd::Closed(from + off),
                '{' => return BodyEnd::NotAPlaceholder,
                c if c.is_whitespace() => return BodyEnd::NotAPlaceholder,
                _ => {}
            }
        }
        BodyEnd::EndOfInput
    }
}
