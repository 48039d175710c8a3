//! Context files: template values and render options in TOML
//!
//! ```toml
//! [options]
//! missing_key = "replace-with-fallback"
//! fallback = "?"
//! open = "<"
//! close = ">"
//!
//! [values]
//! name = "World"
//! server = { host = "example.org", port = 8080 }
//! ```
//!
//! Nested tables are reachable through dotted keys such as `{server.port}`.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::parser::Delimiters;
use crate::renderer::{MissingKeyPolicy, RenderConfig};
use crate::resolver::PathResolver;
use crate::value::Value;

/// Errors that can occur when loading a context or applying bindings
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Failed to read context file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse context TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("delimiter must be a single character, got '{0}'")]
    InvalidDelimiter(String),
    #[error("binding must look like key=value, got '{0}'")]
    InvalidBinding(String),
}

/// Values and options for rendering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    /// Missing-key policy, if the file sets one
    pub policy: Option<MissingKeyPolicy>,
    /// Fallback value, if the file sets one
    pub fallback: Option<Value>,
    pub delimiters: Delimiters,
    /// Root table of template values
    pub values: BTreeMap<String, Value>,
}

/// TOML structure for deserializing context files
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlContext {
    options: Option<TomlOptions>,
    #[serde(default)]
    values: toml::Table,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlOptions {
    missing_key: Option<MissingKeyPolicy>,
    fallback: Option<toml::Value>,
    open: Option<String>,
    close: Option<String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a context from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ContextError> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    /// Bind `value` at a dotted key path, creating intermediate tables
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        let mut segments: Vec<&str> = path.split('.').collect();
        let last = segments.pop().unwrap_or_default();

        let mut table = &mut self.values;
        for segment in segments {
            let entry = table
                .entry(segment.to_string())
                .or_insert_with(|| Value::Table(BTreeMap::new()));
            if !matches!(entry, Value::Table(_)) {
                *entry = Value::Table(BTreeMap::new());
            }
            table = match entry {
                Value::Table(next) => next,
                _ => return,
            };
        }
        table.insert(last.to_string(), value.into());
    }

    /// Apply a `key=value` binding as given on the command line.
    ///
    /// Values that read back identically as integers or floats are bound as
    /// numbers so numeric format-specs apply to them; everything else is text.
    pub fn bind(&mut self, binding: &str) -> Result<(), ContextError> {
        let (key, raw) = binding
            .split_once('=')
            .filter(|(key, _)| !key.trim().is_empty())
            .ok_or_else(|| ContextError::InvalidBinding(binding.to_string()))?;
        self.set(key.trim(), parse_scalar(raw));
        Ok(())
    }

    /// Render configuration carrying this context's options
    pub fn render_config(&self) -> RenderConfig {
        let mut config = RenderConfig::new();
        config.delimiters = self.delimiters;
        if let Some(fallback) = &self.fallback {
            config = config.with_fallback(fallback.clone());
        }
        if let Some(policy) = self.policy {
            config = config.with_policy(policy);
        }
        config
    }

    /// Dotted-path resolver over the values table
    pub fn resolver(&self) -> PathResolver {
        PathResolver::new(Value::Table(self.values.clone()))
    }
}

impl FromStr for Context {
    type Err = ContextError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let parsed: TomlContext = toml::from_str(content)?;

        let mut context = Context {
            values: parsed
                .values
                .into_iter()
                .map(|(key, value)| (key, Value::from(value)))
                .collect(),
            ..Context::default()
        };

        if let Some(options) = parsed.options {
            context.policy = options.missing_key;
            context.fallback = options.fallback.map(Value::from);
            if let Some(open) = options.open {
                context.delimiters.open = single_char(&open)?;
            }
            if let Some(close) = options.close {
                context.delimiters.close = single_char(&close)?;
            }
        }

        Ok(context)
    }
}

/// A delimiter given as a one-character string
pub fn single_char(s: &str) -> Result<char, ContextError> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ContextError::InvalidDelimiter(s.to_string())),
    }
}

fn parse_scalar(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        if i.to_string() == raw {
            return Value::Int(i);
        }
    }
    if let Ok(x) = raw.parse::<f64>() {
        if x.is_finite() && x.to_string() == raw {
            return Value::Float(x);
        }
    }
    Value::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_and_values() {
        let toml_str = r#"
[options]
missing_key = "ignore"
fallback = "?"
open = "<"
close = ">"

[values]
name = "World"
server = { host = "example.org", port = 8080 }
"#;
        let context: Context = toml_str.parse().expect("Should parse");
        assert_eq!(context.policy, Some(MissingKeyPolicy::Ignore));
        assert_eq!(context.fallback, Some(Value::from("?")));
        assert_eq!(context.delimiters, Delimiters::new('<', '>'));
        assert_eq!(context.values["name"], Value::from("World"));

        let resolver = context.resolver();
        assert_eq!(resolver.lookup("server.port"), Some(Value::Int(8080)));
    }

    #[test]
    fn test_values_only() {
        let context: Context = "[values]\nx = 1".parse().expect("Should parse");
        assert_eq!(context.policy, None);
        assert_eq!(context.delimiters, Delimiters::default());
        assert_eq!(context.values["x"], Value::Int(1));
    }

    #[test]
    fn test_render_config_policy_overrides_fallback_switch() {
        let context: Context = r#"
[options]
missing_key = "throw-error"
fallback = 0
"#
        .parse()
        .expect("Should parse");
        let config = context.render_config();
        assert_eq!(config.policy, MissingKeyPolicy::ThrowError);
        assert_eq!(config.fallback, Value::Int(0));
    }

    #[test]
    fn test_fallback_alone_enables_fallback_policy() {
        let context: Context = "[options]\nfallback = \"-\"".parse().unwrap();
        assert_eq!(
            context.render_config().policy,
            MissingKeyPolicy::ReplaceWithFallback
        );
    }

    #[test]
    fn test_invalid_delimiter() {
        let result: Result<Context, _> = "[options]\nopen = \"<<\"".parse();
        assert!(matches!(result, Err(ContextError::InvalidDelimiter(_))));
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let result: Result<Context, _> = "[options]\ncolour = \"red\"".parse();
        assert!(matches!(result, Err(ContextError::ParseError(_))));
    }

    #[test]
    fn test_invalid_toml_error() {
        let result: Result<Context, _> = "this is not valid toml {{{{".parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_bind_nested_and_scalars() {
        let mut context = Context::new();
        context.bind("user.name=Ann").unwrap();
        context.bind("user.age=41").unwrap();
        context.bind("code=007").unwrap();
        context.bind("ratio=0.5").unwrap();

        let resolver = context.resolver();
        assert_eq!(resolver.lookup("user.name"), Some(Value::from("Ann")));
        assert_eq!(resolver.lookup("user.age"), Some(Value::Int(41)));
        assert_eq!(resolver.lookup("code"), Some(Value::from("007")));
        assert_eq!(resolver.lookup("ratio"), Some(Value::Float(0.5)));
    }

    #[test]
    fn test_bind_replaces_scalar_with_table() {
        let mut context = Context::new();
        context.set("a", 1);
        context.set("a.b", 2);
        assert_eq!(context.resolver().lookup("a.b"), Some(Value::Int(2)));
    }

    #[test]
    fn test_invalid_binding() {
        let mut context = Context::new();
        assert!(matches!(
            context.bind("novalue"),
            Err(ContextError::InvalidBinding(_))
        ));
        assert!(matches!(
            context.bind("=x"),
            Err(ContextError::InvalidBinding(_))
        ));
    }
}
