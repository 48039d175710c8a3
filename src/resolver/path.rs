//! Dotted-path resolution through tables and objects

use std::borrow::Cow;

use tracing::trace;

use super::{Resolution, Resolver};
use crate::parser::ReplacementArgument;
use crate::value::Value;

/// Resolves keys like `person.address.city` by walking from a root value.
///
/// Tables are indexed by segment name. Objects are asked for a property,
/// then a getter method (see [`getter_name`]), then a field. A missing
/// member, a null along the way, or an empty segment fails the whole lookup.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: Value,
}

impl PathResolver {
    pub fn new(root: impl Into<Value>) -> Self {
        Self { root: root.into() }
    }

    /// Walk `path` from the root, returning the value it ends at
    pub fn lookup(&self, path: &str) -> Option<Value> {
        let mut current = Cow::Borrowed(&self.root);
        for segment in path.split('.') {
            if segment.is_empty() {
                return None;
            }
            current = match current {
                Cow::Borrowed(value) => member(value, segment)?,
                Cow::Owned(value) => Cow::Owned(member(&value, segment)?.into_owned()),
            };
        }
        Some(current.into_owned())
    }
}

fn member<'v>(value: &'v Value, segment: &str) -> Option<Cow<'v, Value>> {
    match value {
        Value::Table(table) => table.get(segment).map(Cow::Borrowed),
        Value::Object(object) => object
            .property(segment)
            .or_else(|| object.method(&getter_name(segment)))
            .or_else(|| object.field(segment))
            .map(Cow::Owned),
        _ => {
            trace!(segment, "cannot walk into a scalar or null value");
            None
        }
    }
}

/// Name of the getter method tried for a path segment.
///
/// Segments starting with an upper-case letter are used unchanged;
/// otherwise `Get` is prefixed and the first letter upper-cased
/// (`name` -> `GetName`).
pub fn getter_name(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => segment.to_string(),
        Some(first) => format!("Get{}{}", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

impl Resolver for PathResolver {
    fn resolve(&mut self, key: &str, _argument: &ReplacementArgument<'_>) -> Resolution {
        match self.lookup(key) {
            Some(value) => Resolution::Found(value),
            None => Resolution::missing(key),
        }
    }
}

impl Resolver for &PathResolver {
    fn resolve(&mut self, key: &str, _argument: &ReplacementArgument<'_>) -> Resolution {
        match self.lookup(key) {
            Some(value) => Resolution::Found(value),
            None => Resolution::missing(key),
        }
    }
}
