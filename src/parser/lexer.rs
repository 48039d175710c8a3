//! Tokenizer for brace-delimited templates
//!
//! The tokenizer is a two-state machine (outside / inside a parameter)
//! driven one character at a time. It is exposed as an [`Iterator`] so
//! callers pull tokens on demand and structural errors surface at the
//! offending character rather than after the whole template is scanned.

use crate::error::MalformedTemplate;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Open and close characters that delimit parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    pub open: char,
    pub close: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            open: '{',
            close: '}',
        }
    }
}

impl Delimiters {
    pub fn new(open: char, close: char) -> Self {
        Self { open, close }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Literal text, emitted verbatim
    Text,
    /// A `{key}` or `{key:format}` placeholder, braces included
    Parameter,
}

/// A classified slice of a template. Borrows the template, never copies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    source: &'a str,
    start: usize,
    len: usize,
}

impl<'a> Token<'a> {
    fn new(kind: TokenKind, source: &'a str, start: usize, len: usize) -> Self {
        debug_assert!(start + len <= source.len());
        Self {
            kind,
            source,
            start,
            len,
        }
    }

    /// The template this token was cut from
    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn span(&self) -> Span {
        self.start..self.start + self.len
    }

    /// The raw slice. For parameters this includes both delimiters.
    pub fn value(&self) -> &'a str {
        &self.source[self.span()]
    }

    /// The parameter body without its delimiters; text tokens return their value.
    pub fn inner(&self) -> &'a str {
        let value = self.value();
        match self.kind {
            TokenKind::Text => value,
            TokenKind::Parameter => {
                let mut chars = value.chars();
                chars.next();
                chars.next_back();
                chars.as_str()
            }
        }
    }

    /// Split a parameter body once on the first `:` into key and format-spec.
    pub fn key_and_format(&self) -> (&'a str, Option<&'a str>) {
        split_key_format(self.inner())
    }
}

/// Split `key:format` on the first colon. The format is `None` without a colon.
pub fn split_key_format(inner: &str) -> (&str, Option<&str>) {
    match inner.split_once(':') {
        Some((key, format)) => (key, Some(format)),
        None => (inner, None),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Outside,
    InsideParameter,
    Done,
}

/// Pull-based tokenizer over one template
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    source: &'a str,
    delimiters: Delimiters,
    state: State,
    index: usize,
    token_start: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str, delimiters: Delimiters) -> Self {
        Self {
            source,
            delimiters,
            state: State::Outside,
            index: 0,
            token_start: 0,
        }
    }

    fn text(&self, end: usize) -> Token<'a> {
        Token::new(
            TokenKind::Text,
            self.source,
            self.token_start,
            end - self.token_start,
        )
    }

    fn fail(&mut self, err: MalformedTemplate) -> Option<Result<Token<'a>, MalformedTemplate>> {
        self.state = State::Done;
        Some(Err(err))
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>, MalformedTemplate>;

    fn next(&mut self) -> Option<Self::Item> {
        let Delimiters { open, close } = self.delimiters;

        loop {
            if self.state == State::Done {
                return None;
            }

            let mut rest = self.source[self.index..].chars();
            let Some(current) = rest.next() else {
                return self.finish();
            };
            let lookahead = rest.next();
            let width = current.len_utf8();

            match self.state {
                State::Outside if current == open || current == close => {
                    if lookahead == Some(current) {
                        // Escaped delimiter: pending text plus one literal brace
                        let token = self.text(self.index + width);
                        self.index += width * 2;
                        self.token_start = self.index;
                        return Some(Ok(token));
                    }
                    if current != open {
                        return self.fail(MalformedTemplate::UnexpectedCloseBrace {
                            position: self.index,
                        });
                    }

                    let pending = (self.token_start < self.index).then(|| self.text(self.index));
                    self.token_start = self.index;
                    self.state = State::InsideParameter;
                    self.index += width;
                    if let Some(token) = pending {
                        return Some(Ok(token));
                    }
                }
                State::InsideParameter if current == open => {
                    return self.fail(MalformedTemplate::NestedOpenBrace {
                        position: self.index,
                        escaped: lookahead == Some(open),
                    });
                }
                State::InsideParameter if current == close => {
                    // No escaping inside a parameter: the first close ends it
                    let token = Token::new(
                        TokenKind::Parameter,
                        self.source,
                        self.token_start,
                        self.index + width - self.token_start,
                    );
                    self.state = State::Outside;
                    self.index += width;
                    self.token_start = self.index;
                    return Some(Ok(token));
                }
                _ => self.index += width,
            }
        }
    }
}

impl<'a> Tokenizer<'a> {
    fn finish(&mut self) -> Option<Result<Token<'a>, MalformedTemplate>> {
        match self.state {
            State::InsideParameter => self.fail(MalformedTemplate::UnterminatedParameter {
                position: self.index,
            }),
            _ => {
                self.state = State::Done;
                (self.token_start < self.index).then(|| Ok(self.text(self.index)))
            }
        }
    }
}

impl std::iter::FusedIterator for Tokenizer<'_> {}

/// Tokenize a template into a lazy stream of text and parameter tokens
pub fn tokenize(source: &str, delimiters: Delimiters) -> Tokenizer<'_> {
    Tokenizer::new(source, delimiters)
}
