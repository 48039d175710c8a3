//! Values substituted into templates
//!
//! Resolvers hand back [`Value`]s; the renderer displays them directly or
//! passes them to a [`crate::ValueFormatter`] together with a format-spec.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// An object whose members can be walked by a dotted path such as `{person.name}`.
///
/// Each lookup returns `None` when the member does not exist. The path
/// resolver tries [`property`](Self::property) first, then a zero-argument
/// getter through [`method`](Self::method), then [`field`](Self::field).
pub trait Attributes: fmt::Debug + fmt::Display + Send + Sync {
    /// A computed accessor of exactly this name
    fn property(&self, _name: &str) -> Option<Value> {
        None
    }

    /// A zero-argument getter method, e.g. `GetName`
    fn method(&self, _name: &str) -> Option<Value> {
        None
    }

    /// A plain data member of exactly this name
    fn field(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Custom formatting for a format-spec. `None` falls back to `Display`.
    fn format_with(&self, _spec: &str) -> Option<String> {
        None
    }
}

/// A dynamically typed template value
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Displays as the empty string
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Nested values, addressable by dotted paths
    Table(BTreeMap<String, Value>),
    Object(Arc<dyn Attributes>),
}

impl Value {
    /// Wrap any [`Attributes`] implementor as an object value
    pub fn object(object: impl Attributes + 'static) -> Self {
        Value::Object(Arc::new(object))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => f.write_str(s),
            Value::Table(table) => {
                f.write_str("{")?;
                for (i, (key, value)) in table.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} = {}", key, value)?;
                }
                f.write_str("}")
            }
            Value::Object(object) => write!(f, "{}", object),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Str(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(i: $ty) -> Self {
                    Value::Int(i64::from(i))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(f64::from(x))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(table: BTreeMap<String, Value>) -> Self {
        Value::Table(table)
    }
}

impl From<toml::Value> for Value {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Value::Str(s),
            toml::Value::Integer(i) => Value::Int(i),
            toml::Value::Float(x) => Value::Float(x),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::Str(dt.to_string()),
            toml::Value::Array(items) => Value::Table(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| (i.to_string(), Value::from(item)))
                    .collect(),
            ),
            toml::Value::Table(table) => Value::Table(
                table
                    .into_iter()
                    .map(|(key, item)| (key, Value::from(item)))
                    .collect(),
            ),
        }
    }
}
