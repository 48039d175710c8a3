//! named-fmt - named-parameter interpolation for brace templates
//!
//! This library tokenizes templates containing `{key}` and `{key:format}`
//! placeholders, resolves every key through a pluggable [`Resolver`] and
//! either substitutes the results immediately or produces a
//! [`CompositeTemplate`] with numbered placeholders for a later pass.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use named_fmt::render;
//!
//! let vars = HashMap::from([("name".to_string(), "World".to_string())]);
//! let out = render("Hello {name}!", &vars).unwrap();
//! assert_eq!(out, "Hello World!");
//! ```

pub mod context;
pub mod error;
pub mod parser;
pub mod renderer;
pub mod resolver;
pub mod value;

pub use context::{Context, ContextError};
pub use error::{MalformedTemplate, RenderError};
pub use parser::{tokenize, Delimiters, ReplacementArgument, Token, TokenKind, Tokenizer};
pub use renderer::{
    CompositeTemplate, MissingKeyPolicy, RenderConfig, StandardFormatter, ValueFormatter,
};
pub use resolver::{from_fn, PathResolver, Resolution, Resolver};
pub use value::{Attributes, Value};

use tracing::debug;

/// Render a template with default configuration
///
/// Unresolved keys are an error; see [`render_with_config`] for the other
/// missing-key policies.
pub fn render<R: Resolver>(template: &str, resolver: R) -> Result<String, RenderError> {
    render_with_config(template, resolver, &RenderConfig::default())
}

/// Render a template with custom configuration
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use named_fmt::{render_with_config, MissingKeyPolicy, RenderConfig};
///
/// let vars: HashMap<String, i64> = HashMap::from([("n".to_string(), 7)]);
/// let config = RenderConfig::new().with_policy(MissingKeyPolicy::Ignore);
///
/// let out = render_with_config("{n:000} {other}", &vars, &config).unwrap();
/// assert_eq!(out, "007 {other}");
/// ```
pub fn render_with_config<R: Resolver>(
    template: &str,
    mut resolver: R,
    config: &RenderConfig,
) -> Result<String, RenderError> {
    if template.is_empty() {
        return Ok(String::new());
    }
    debug!(len = template.len(), policy = ?config.policy, "rendering template");

    renderer::render_tokens(
        tokenize(template, config.delimiters),
        &mut resolver,
        config,
        config.capacity_for(template),
    )
}

/// Render a template into a composite template and its ordered values
///
/// The composite always uses `{` / `}`. With custom delimiters a format-spec
/// may itself contain a brace; such a spec cannot be placed in a composite
/// placeholder and fails with [`RenderError::BraceInFormatSpec`].
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use named_fmt::{render_deferred, RenderConfig, Value};
///
/// let vars = HashMap::from([("who".to_string(), "you")]);
/// let composite = render_deferred("{{hi}} {who}", &vars, &RenderConfig::default()).unwrap();
///
/// assert_eq!(composite.format, "{{hi}} {0}");
/// assert_eq!(composite.values, vec![Value::from("you")]);
/// assert_eq!(composite.render().unwrap(), "{hi} you");
/// ```
pub fn render_deferred<R: Resolver>(
    template: &str,
    mut resolver: R,
    config: &RenderConfig,
) -> Result<CompositeTemplate, RenderError> {
    if template.is_empty() {
        return Ok(CompositeTemplate {
            format: String::new(),
            values: Vec::new(),
        });
    }
    debug!(len = template.len(), policy = ?config.policy, "rendering deferred template");

    renderer::render_tokens_deferred(
        tokenize(template, config.delimiters),
        &mut resolver,
        config,
        config.capacity_for(template),
    )
}

/// Every parameter body in order, format-spec included, duplicates kept
///
/// ```rust
/// use named_fmt::{list_parameter_keys, Delimiters};
///
/// let keys: Vec<_> = list_parameter_keys("{a}-{b:fmt}-{a}", Delimiters::default())
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(keys, vec!["a", "b:fmt", "a"]);
/// ```
pub fn list_parameter_keys(
    template: &str,
    delimiters: Delimiters,
) -> impl Iterator<Item = Result<&str, MalformedTemplate>> {
    tokenize(template, delimiters).filter_map(|token| match token {
        Ok(token) if token.kind == TokenKind::Parameter => Some(Ok(token.inner())),
        Ok(_) => None,
        Err(err) => Some(Err(err)),
    })
}

/// Like [`list_parameter_keys`] but with the format-spec stripped
pub fn list_bare_keys(
    template: &str,
    delimiters: Delimiters,
) -> impl Iterator<Item = Result<&str, MalformedTemplate>> {
    list_parameter_keys(template, delimiters)
        .map(|inner| inner.map(|inner| parser::split_key_format(inner).0))
}
