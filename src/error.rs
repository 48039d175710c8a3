//! Error types for tokenizing and rendering templates

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in template text
pub type Span = std::ops::Range<usize>;

/// Structural problems detected while tokenizing a template.
///
/// Every variant carries the byte offset of the offending character.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedTemplate {
    /// A close delimiter outside a parameter that is not doubled
    #[error("unexpected closing brace at position {position}")]
    UnexpectedCloseBrace { position: usize },

    /// An open delimiter inside a parameter body
    #[error("{}", nested_message(.position, .escaped))]
    NestedOpenBrace { position: usize, escaped: bool },

    /// The template ended while a parameter was still open
    #[error("template ended before the parameter was closed at position {position}")]
    UnterminatedParameter { position: usize },
}

fn nested_message(position: &usize, escaped: &bool) -> String {
    if *escaped {
        format!("illegal escaped opening braces within a parameter at position {}", position)
    } else {
        format!("unexpected opening brace inside a parameter at position {}", position)
    }
}

impl MalformedTemplate {
    /// Byte offset of the offending character
    pub fn position(&self) -> usize {
        match self {
            MalformedTemplate::UnexpectedCloseBrace { position }
            | MalformedTemplate::NestedOpenBrace { position, .. }
            | MalformedTemplate::UnterminatedParameter { position } => *position,
        }
    }
}

/// Errors that can occur while rendering a template
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The template could not be tokenized
    #[error(transparent)]
    Malformed(#[from] MalformedTemplate),

    /// A parameter key did not resolve under the throw-error policy
    #[error("the parameter \"{token}\" at position {position} has no value for key '{key}'")]
    UnknownKey {
        key: String,
        token: String,
        position: usize,
    },

    /// A format-spec holding `{` or `}` cannot be written into a composite template
    #[error("the format-spec of parameter \"{token}\" at position {position} contains a brace and cannot be deferred")]
    BraceInFormatSpec { token: String, position: usize },
}

impl RenderError {
    /// Byte range in the template the error points at
    pub fn span(&self, source: &str) -> Span {
        match self {
            RenderError::Malformed(err) => {
                let start = err.position().min(source.len());
                let width = source[start..].chars().next().map_or(0, char::len_utf8);
                start..start + width
            }
            RenderError::UnknownKey {
                token, position, ..
            }
            | RenderError::BraceInFormatSpec { token, position } => {
                *position..position + token.len()
            }
        }
    }

    /// Format the error with template context using ariadne
    pub fn report(&self, source: &str, filename: &str) -> String {
        let span = char_span(source, self.span(source));
        let label = match self {
            RenderError::Malformed(_) => "malformed template here".to_string(),
            RenderError::UnknownKey { key, .. } => format!("no value for '{}'", key),
            RenderError::BraceInFormatSpec { .. } => "brace in format-spec".to_string(),
        };

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(self.to_string())
            .with_label(
                Label::new((filename, span))
                    .with_message(label)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

/// ariadne counts characters, not bytes
fn char_span(source: &str, span: Span) -> Span {
    let start = source[..span.start.min(source.len())].chars().count();
    let end = source[..span.end.min(source.len())].chars().count();
    start..end.max(start)
}
