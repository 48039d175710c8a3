//! Configuration for rendering

use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use super::format::{StandardFormatter, ValueFormatter};
use crate::parser::Delimiters;
use crate::value::Value;

/// What to do with a parameter whose key does not resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingKeyPolicy {
    /// Fail the render with [`crate::RenderError::UnknownKey`]
    #[default]
    ThrowError,
    /// Substitute the configured fallback value
    ReplaceWithFallback,
    /// Leave the placeholder in the output untouched
    Ignore,
}

#[derive(Debug, Error)]
#[error("unknown missing-key policy '{0}' (expected throw-error, replace-with-fallback or ignore)")]
pub struct UnknownPolicy(String);

impl FromStr for MissingKeyPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "throw-error" | "throw" | "error" => Ok(MissingKeyPolicy::ThrowError),
            "replace-with-fallback" | "fallback" => Ok(MissingKeyPolicy::ReplaceWithFallback),
            "ignore" => Ok(MissingKeyPolicy::Ignore),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

/// Configuration for one render call
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Applied to every unresolved key
    pub policy: MissingKeyPolicy,

    /// Substituted under [`MissingKeyPolicy::ReplaceWithFallback`]
    pub fallback: Value,

    /// Parameter delimiters of the input template
    pub delimiters: Delimiters,

    /// Initial output capacity; `None` uses twice the template length
    pub size_hint: Option<usize>,

    /// Formats values whose parameter carries a format-spec
    pub formatter: Arc<dyn ValueFormatter>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            policy: MissingKeyPolicy::default(),
            fallback: Value::Null,
            delimiters: Delimiters::default(),
            size_hint: None,
            formatter: Arc::new(StandardFormatter),
        }
    }
}

impl RenderConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the missing-key policy
    pub fn with_policy(mut self, policy: MissingKeyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the fallback value and switch to [`MissingKeyPolicy::ReplaceWithFallback`]
    pub fn with_fallback(mut self, fallback: impl Into<Value>) -> Self {
        self.fallback = fallback.into();
        self.policy = MissingKeyPolicy::ReplaceWithFallback;
        self
    }

    /// Set the parameter delimiters
    pub fn with_delimiters(mut self, open: char, close: char) -> Self {
        self.delimiters = Delimiters::new(open, close);
        self
    }

    /// Set the initial output capacity
    pub fn with_size_hint(mut self, size_hint: usize) -> Self {
        self.size_hint = Some(size_hint);
        self
    }

    /// Set the value formatter
    pub fn with_formatter(mut self, formatter: impl ValueFormatter + 'static) -> Self {
        self.formatter = Arc::new(formatter);
        self
    }

    pub(crate) fn capacity_for(&self, template: &str) -> usize {
        self.size_hint.unwrap_or(template.len() * 2)
    }
}
