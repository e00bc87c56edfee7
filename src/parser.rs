// src/parser.rs
#[derive(Debug)]
pub enum ParseError {
    InvalidSyntax(String),
}

impl From<String> for ParseError {
    fn from(msg: String) -> Self {
        ParseError::InvalidSyntax(msg)
    }
}

/// Character cursor over one expression body. The grammar has no whitespace
/// (the scanner rejects bodies containing any), so there is no skipping.
pub struct Parser<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Parser<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    pub fn parse_identifier(&mut self) -> Result<String, ParseError> {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c == '_' || c.is_ascii_alphanumeric() {
                self.i += 1;
            } else {
                break;
            }
        }
        if self.i == start {
            return Err(ParseError::InvalidSyntax("identifier expected".into()));
        }
        Ok(self.s[start..self.i].to_string())
    }

    /// Unsigned numeric literal: digits, optional fraction, optional exponent.
    /// Signs are handled by the expression grammar as unary operators.
    pub fn parse_number(&mut self) -> Result<f64, ParseError> {
        let start = self.i;
        self.consume_digits();
        if self.peek_char() == Some('.') {
            self.i += 1;
            self.consume_digits();
        }
        if self.i == start || &self.s[start..self.i] == "." {
            return Err(ParseError::InvalidSyntax("number expected".into()));
        }
        if matches!(self.peek_char(), Some('e') | Some('E')) {
            let mark = self.i;
            self.i += 1;
            if matches!(self.peek_char(), Some('+') | Some('-')) {
                self.i += 1;
            }
            let exp_start = self.i;
            self.consume_digits();
            if self.i == exp_start {
                // "2e" is a number followed by an identifier char; back out
                // and let the caller reject the stray character.
                self.i = mark;
            }
        }
        self.s[start..self.i]
            .parse::<f64>()
            .map_err(|_| ParseError::InvalidSyntax("bad number".into()))
    }

    fn consume_digits(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.i += 1;
            } else {
                break;
            }
        }
    }

    pub fn expect(&mut self, c: char) -> Result<(), ParseError> {
        if self.consume_char(c) {
            Ok(())
        } else {
            Err(ParseError::InvalidSyntax(format!("expected '{}'", c)))
        }
    }

    pub fn consume_char(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.i += 1;
            true
        } else {
            false
        }
    }

    pub fn peek_char(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }
}
