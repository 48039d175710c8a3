//! Token rendering: immediate strings and deferred composite templates

use tracing::trace;

use super::config::{MissingKeyPolicy, RenderConfig};
use crate::error::{MalformedTemplate, RenderError};
use crate::parser::{ReplacementArgument, Token, TokenKind};
use crate::resolver::{Resolution, Resolver};
use crate::value::Value;

/// A composite-format template and the values for its numbered placeholders.
///
/// `format` contains only escaped literal text (`{{`, `}}`) and placeholders
/// `{0}`, `{1:spec}`, ... numbered in order from zero; `values[n]` belongs to
/// placeholder `n`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeTemplate {
    pub format: String,
    pub values: Vec<Value>,
}

impl CompositeTemplate {
    pub fn placeholder_count(&self) -> usize {
        self.values.len()
    }

    /// Run the second formatting pass with the standard formatter
    pub fn render(&self) -> Result<String, RenderError> {
        self.render_with_config(&RenderConfig::default())
    }

    /// Run the second formatting pass with the formatter from `config`.
    ///
    /// The composite always uses `{` / `}` and every index must resolve, so
    /// the delimiters and missing-key policy of `config` are ignored.
    pub fn render_with_config(&self, config: &RenderConfig) -> Result<String, RenderError> {
        let config = RenderConfig {
            policy: MissingKeyPolicy::ThrowError,
            delimiters: Default::default(),
            ..config.clone()
        };
        crate::render_with_config(
            &self.format,
            crate::resolver::IndexResolver::new(&self.values),
            &config,
        )
    }
}

/// What one parameter token turns into
enum Substitution<'a> {
    Resolved {
        value: Value,
        format: Option<&'a str>,
    },
    Fallback {
        format: Option<&'a str>,
    },
    Verbatim,
}

/// Resolve one parameter token and apply the missing-key policy
fn substitute<'a, R>(
    token: &Token<'a>,
    resolver: &mut R,
    config: &RenderConfig,
) -> Result<Substitution<'a>, RenderError>
where
    R: Resolver + ?Sized,
{
    let (key, format) = token.key_and_format();
    let argument = ReplacementArgument::new(format);
    let format = argument.format_spec();

    match resolver.resolve(key, &argument) {
        Resolution::Found(value) => {
            trace!(key, "resolved parameter");
            Ok(Substitution::Resolved { value, format })
        }
        Resolution::Missing(_) => {
            trace!(key, policy = ?config.policy, "unresolved parameter");
            match config.policy {
                MissingKeyPolicy::ThrowError => Err(RenderError::UnknownKey {
                    key: key.to_string(),
                    token: token.value().to_string(),
                    position: token.start(),
                }),
                MissingKeyPolicy::ReplaceWithFallback => Ok(Substitution::Fallback { format }),
                MissingKeyPolicy::Ignore => Ok(Substitution::Verbatim),
            }
        }
    }
}

/// Render a token stream straight into a string
pub fn render_tokens<'a, I, R>(
    tokens: I,
    resolver: &mut R,
    config: &RenderConfig,
    capacity: usize,
) -> Result<String, RenderError>
where
    I: IntoIterator<Item = Result<Token<'a>, MalformedTemplate>>,
    R: Resolver + ?Sized,
{
    let mut out = String::with_capacity(capacity);

    for token in tokens {
        let token = token?;
        if token.kind == TokenKind::Text {
            out.push_str(token.value());
            continue;
        }

        match substitute(&token, resolver, config)? {
            Substitution::Resolved {
                value,
                format: Some(spec),
            } => out.push_str(&config.formatter.format(&value, spec)),
            Substitution::Resolved {
                value,
                format: None,
            } => push_display(&mut out, &value),
            // The fallback is substituted as-is, without the format-spec
            Substitution::Fallback { .. } => push_display(&mut out, &config.fallback),
            Substitution::Verbatim => out.push_str(token.value()),
        }
    }

    Ok(out)
}

/// Render a token stream into a composite template plus ordered values
pub fn render_tokens_deferred<'a, I, R>(
    tokens: I,
    resolver: &mut R,
    config: &RenderConfig,
    capacity: usize,
) -> Result<CompositeTemplate, RenderError>
where
    I: IntoIterator<Item = Result<Token<'a>, MalformedTemplate>>,
    R: Resolver + ?Sized,
{
    let mut out = String::with_capacity(capacity);
    let mut values = Vec::new();

    for token in tokens {
        let token = token?;
        if token.kind == TokenKind::Text {
            push_escaped(&mut out, token.value());
            continue;
        }

        let (value, spec) = match substitute(&token, resolver, config)? {
            Substitution::Resolved { value, format } => (value, format),
            Substitution::Fallback { format } => (config.fallback.clone(), format),
            Substitution::Verbatim => {
                push_escaped(&mut out, token.value());
                continue;
            }
        };

        // Placeholder bodies cannot escape braces
        if spec.is_some_and(|spec| spec.contains(['{', '}'])) {
            return Err(RenderError::BraceInFormatSpec {
                token: token.value().to_string(),
                position: token.start(),
            });
        }

        push_placeholder(&mut out, values.len(), spec);
        values.push(value);
    }

    Ok(CompositeTemplate {
        format: out,
        values,
    })
}

fn push_display(out: &mut String, value: &Value) {
    use std::fmt::Write;
    // Writing into a String cannot fail
    let _ = write!(out, "{}", value);
}

fn push_placeholder(out: &mut String, index: usize, spec: Option<&str>) {
    use std::fmt::Write;
    let _ = match spec {
        Some(spec) => write!(out, "{{{}:{}}}", index, spec),
        None => write!(out, "{{{}}}", index),
    };
}

/// Append text with `{` and `}` doubled
pub fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '{' => out.push_str("{{"),
            '}' => out.push_str("}}"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::parser::{tokenize, Delimiters};

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn immediate(
        template: &str,
        map: &HashMap<String, String>,
        config: &RenderConfig,
    ) -> Result<String, RenderError> {
        let mut resolver = map;
        render_tokens(
            tokenize(template, config.delimiters),
            &mut resolver,
            config,
            0,
        )
    }

    fn deferred(
        template: &str,
        map: &HashMap<String, String>,
        config: &RenderConfig,
    ) -> Result<CompositeTemplate, RenderError> {
        let mut resolver = map;
        render_tokens_deferred(
            tokenize(template, config.delimiters),
            &mut resolver,
            config,
            0,
        )
    }

    #[test]
    fn test_push_escaped() {
        let mut out = String::new();
        push_escaped(&mut out, "a{b}c");
        assert_eq!(out, "a{{b}}c");
    }

    #[test]
    fn test_immediate_substitution() {
        let map = vars(&[("name", "World")]);
        let out = immediate("Hello {name}!", &map, &RenderConfig::default()).unwrap();
        assert_eq!(out, "Hello World!");
    }

    #[test]
    fn test_blank_format_spec_is_ignored() {
        let map = vars(&[("a", "x")]);
        let out = immediate("{a: }", &map, &RenderConfig::default()).unwrap();
        assert_eq!(out, "x");
    }

    #[test]
    fn test_immediate_fallback_is_not_formatted() {
        let map = vars(&[]);
        let config = RenderConfig::new().with_fallback(5);
        let out = immediate("[{n:000}]", &map, &config).unwrap();
        assert_eq!(out, "[5]");
    }

    #[test]
    fn test_unknown_key_carries_token() {
        let map = vars(&[]);
        let err = immediate("ab {k:F2}", &map, &RenderConfig::default()).unwrap_err();
        assert_eq!(
            err,
            RenderError::UnknownKey {
                key: "k".to_string(),
                token: "{k:F2}".to_string(),
                position: 3,
            }
        );
    }

    #[test]
    fn test_deferred_numbering() {
        let map = vars(&[("a", "1"), ("b", "2")]);
        let composite = deferred("{a}-{b:U}-{a}", &map, &RenderConfig::default()).unwrap();
        assert_eq!(composite.format, "{0}-{1:U}-{2}");
        assert_eq!(
            composite.values,
            vec![Value::from("1"), Value::from("2"), Value::from("1")]
        );
    }

    #[test]
    fn test_deferred_throw_error() {
        let map = vars(&[("a", "1")]);
        let err = deferred("{a} x{missing:F2}y", &map, &RenderConfig::default()).unwrap_err();
        assert_eq!(
            err,
            RenderError::UnknownKey {
                key: "missing".to_string(),
                token: "{missing:F2}".to_string(),
                position: 5,
            }
        );
    }

    #[test]
    fn test_deferred_ignore_escapes_raw_token() {
        let map = vars(&[("x", "1")]);
        let config = RenderConfig::new().with_policy(MissingKeyPolicy::Ignore);
        let composite = deferred("{{{missing}}} {x}", &map, &config).unwrap();
        assert_eq!(composite.format, "{{{{missing}}}} {0}");
        assert_eq!(composite.values, vec![Value::from("1")]);
    }

    #[test]
    fn test_deferred_fallback_keeps_format() {
        let map = vars(&[]);
        let config = RenderConfig::new().with_fallback(3);
        let composite = deferred("{n:000}", &map, &config).unwrap();
        assert_eq!(composite.format, "{0:000}");
        assert_eq!(composite.values, vec![Value::Int(3)]);
        assert_eq!(composite.render().unwrap(), "003");
    }

    #[test]
    fn test_deferred_custom_delimiters_escape_default_braces() {
        let map = vars(&[("x", "1")]);
        let config = RenderConfig::new().with_delimiters('<', '>');
        let composite = deferred("{<x>}", &map, &config).unwrap();
        assert_eq!(composite.format, "{{{0}}}");
        assert_eq!(composite.render().unwrap(), "{1}");
    }

    #[test]
    fn test_deferred_rejects_brace_in_format_spec() {
        let map = vars(&[("x", "1")]);
        let config = RenderConfig::new().with_delimiters('<', '>');
        let err = deferred("a<x:{>", &map, &config).unwrap_err();
        assert_eq!(
            err,
            RenderError::BraceInFormatSpec {
                token: "<x:{>".to_string(),
                position: 1,
            }
        );

        // Immediate mode hands the spec to the formatter unchanged
        let out = immediate("a<x:{>", &map, &config).unwrap();
        assert_eq!(out, "a1");
    }

    #[test]
    fn test_deferred_ignore_keeps_brace_spec_as_text() {
        let map = vars(&[]);
        let config = RenderConfig::new()
            .with_delimiters('<', '>')
            .with_policy(MissingKeyPolicy::Ignore);
        let composite = deferred("<x:}>", &map, &config).unwrap();
        assert_eq!(composite.format, "<x:}}>");
        assert!(composite.values.is_empty());
    }

    #[test]
    fn test_stops_at_first_error() {
        let mut calls = 0;
        let mut resolver = crate::resolver::from_fn(|_, _| {
            calls += 1;
            Resolution::found("v")
        });
        let result = render_tokens(
            tokenize("{a}{b} } {c}", Delimiters::default()),
            &mut resolver,
            &RenderConfig::default(),
            0,
        );
        assert!(matches!(result, Err(RenderError::Malformed(_))));
        drop(resolver);
        assert_eq!(calls, 2);
    }
}
