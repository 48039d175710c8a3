//! Key resolution strategies
//!
//! The renderer asks a [`Resolver`] for the value of every parameter key it
//! meets. Three strategies ship with the crate:
//!
//! - maps (`&HashMap` / `&BTreeMap` keyed by strings) for direct lookup,
//! - [`PathResolver`] for dotted paths through tables and [`Attributes`] objects,
//! - [`from_fn`] for arbitrary callbacks.
//!
//! [`IndexResolver`] resolves positional indices and backs the second
//! pass over a [`crate::CompositeTemplate`].
//!
//! [`Attributes`]: crate::Attributes

mod path;

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use crate::parser::ReplacementArgument;
use crate::value::Value;

pub use path::{getter_name, PathResolver};

/// Outcome of one key lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The key resolved to this value
    Found(Value),
    /// The key did not resolve; the value is diagnostic only (usually the key)
    Missing(Value),
}

impl Resolution {
    pub fn found(value: impl Into<Value>) -> Self {
        Resolution::Found(value.into())
    }

    /// A miss that records the unresolved key
    pub fn missing(key: &str) -> Self {
        Resolution::Missing(Value::from(key))
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    pub fn into_value(self) -> Value {
        match self {
            Resolution::Found(value) | Resolution::Missing(value) => value,
        }
    }
}

/// Looks up the value for a parameter key.
///
/// Implementations report failure as [`Resolution::Missing`], never by
/// panicking, so the missing-key policy applies uniformly.
pub trait Resolver {
    fn resolve(&mut self, key: &str, argument: &ReplacementArgument<'_>) -> Resolution;
}

impl<R: Resolver + ?Sized> Resolver for &mut R {
    fn resolve(&mut self, key: &str, argument: &ReplacementArgument<'_>) -> Resolution {
        (**self).resolve(key, argument)
    }
}

impl<K, V, S> Resolver for &HashMap<K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: Clone + Into<Value>,
    S: BuildHasher,
{
    fn resolve(&mut self, key: &str, _argument: &ReplacementArgument<'_>) -> Resolution {
        match self.get(key) {
            Some(value) => Resolution::found(value.clone()),
            None => Resolution::missing(key),
        }
    }
}

impl<K, V> Resolver for &BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: Clone + Into<Value>,
{
    fn resolve(&mut self, key: &str, _argument: &ReplacementArgument<'_>) -> Resolution {
        match self.get(key) {
            Some(value) => Resolution::found(value.clone()),
            None => Resolution::missing(key),
        }
    }
}

/// Resolver backed by a caller-supplied closure
pub struct FnResolver<F>(F);

impl<F> Resolver for FnResolver<F>
where
    F: FnMut(&str, &ReplacementArgument<'_>) -> Resolution,
{
    fn resolve(&mut self, key: &str, argument: &ReplacementArgument<'_>) -> Resolution {
        (self.0)(key, argument)
    }
}

/// Build a resolver from a closure
///
/// ```rust
/// use named_fmt::{render, resolver::{from_fn, Resolution}};
///
/// let out = render("{a}+{b}", from_fn(|key, _| Resolution::found(key.len() as i64))).unwrap();
/// assert_eq!(out, "1+1");
/// ```
pub fn from_fn<F>(f: F) -> FnResolver<F>
where
    F: FnMut(&str, &ReplacementArgument<'_>) -> Resolution,
{
    FnResolver(f)
}

/// Resolves decimal indices (`{0}`, `{1}`) against a slice of values
#[derive(Debug, Clone, Copy)]
pub struct IndexResolver<'v> {
    values: &'v [Value],
}

impl<'v> IndexResolver<'v> {
    pub fn new(values: &'v [Value]) -> Self {
        Self { values }
    }
}

impl Resolver for IndexResolver<'_> {
    fn resolve(&mut self, key: &str, _argument: &ReplacementArgument<'_>) -> Resolution {
        key.trim()
            .parse::<usize>()
            .ok()
            .and_then(|index| self.values.get(index))
            .map_or_else(|| Resolution::missing(key), |value| Resolution::Found(value.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_arg() -> ReplacementArgument<'static> {
        ReplacementArgument::new(None)
    }

    #[test]
    fn test_hash_map_lookup() {
        let mut map = HashMap::new();
        map.insert("name".to_string(), "World".to_string());
        let mut resolver = &map;
        assert_eq!(
            resolver.resolve("name", &no_arg()),
            Resolution::found("World")
        );
        assert_eq!(
            resolver.resolve("other", &no_arg()),
            Resolution::Missing(Value::from("other"))
        );
    }

    #[test]
    fn test_btree_map_with_str_keys() {
        let map: BTreeMap<&str, i64> = [("n", 7)].into_iter().collect();
        let mut resolver = &map;
        assert_eq!(resolver.resolve("n", &no_arg()), Resolution::found(7));
        assert!(!resolver.resolve("N", &no_arg()).is_found());
    }

    #[test]
    fn test_callback_sees_argument() {
        let mut seen = Vec::new();
        {
            let mut resolver = from_fn(|key, arg: &ReplacementArgument<'_>| {
                seen.push((key.to_string(), arg.arguments().len()));
                Resolution::found("x")
            });
            resolver.resolve("a", &ReplacementArgument::new(Some("b:c")));
        }
        assert_eq!(seen, vec![("a".to_string(), 2)]);
    }

    #[test]
    fn test_index_resolver() {
        let values = vec![Value::from("zero"), Value::from(1)];
        let mut resolver = IndexResolver::new(&values);
        assert_eq!(resolver.resolve("1", &no_arg()), Resolution::found(1));
        assert!(!resolver.resolve("2", &no_arg()).is_found());
        assert!(!resolver.resolve("x", &no_arg()).is_found());
    }

    #[test]
    fn test_into_value() {
        assert_eq!(Resolution::missing("k").into_value(), Value::from("k"));
    }
}
