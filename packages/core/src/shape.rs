//! Explicit shape descriptors for operation inputs and outputs.
//!
//! A [`Shape`] is a small structural schema. Every operation declares the
//! shape of its argument and of its result, so that a payload which does not
//! fit can be rejected with a precise message before any handler runs, and so
//! that the documentation endpoint can describe the wire format.
//!
//! Rust types advertise their shape through the [`Describe`] trait.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Structural description of a JSON value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Shape {
    /// No value. Encoded as JSON `null` or an absent body.
    Unit,
    Bool,
    /// A JSON number with no fractional part.
    Integer,
    Number,
    String,
    List { item: Box<Shape> },
    /// The inner shape, or `null`.
    Optional { inner: Box<Shape> },
    /// A JSON object with arbitrary string keys and uniform values.
    Map { value: Box<Shape> },
    /// A JSON object with a fixed set of named fields.
    Record { name: String, fields: Vec<Field> },
    /// Anything at all; never fails a check.
    Any,
}

/// One named field of a [`Shape::Record`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub shape: Shape,
}

impl Field {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }
}

/// A payload that does not fit its declared [`Shape`].
///
/// `path` is a JSON path (`$`, `$.items[2].id`) to the first offending value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{path}: {reason}")]
pub struct ShapeMismatch {
    pub path: String,
    pub reason: String,
}

impl Shape {
    pub fn list(item: Shape) -> Self {
        Shape::List {
            item: Box::new(item),
        }
    }

    pub fn optional(inner: Shape) -> Self {
        Shape::Optional {
            inner: Box::new(inner),
        }
    }

    pub fn map(value: Shape) -> Self {
        Shape::Map {
            value: Box::new(value),
        }
    }

    pub fn record(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Shape::Record {
            name: name.into(),
            fields,
        }
    }

    /// `true` for the no-argument shape.
    pub fn is_unit(&self) -> bool {
        matches!(self, Shape::Unit)
    }

    /// Short human-readable rendering, e.g. `list<Item>` or `string?`.
    pub fn display_name(&self) -> String {
        match self {
            Shape::Unit => "unit".into(),
            Shape::Bool => "bool".into(),
            Shape::Integer => "integer".into(),
            Shape::Number => "number".into(),
            Shape::String => "string".into(),
            Shape::List { item } => format!("list<{}>", item.display_name()),
            Shape::Optional { inner } => format!("{}?", inner.display_name()),
            Shape::Map { value } => format!("map<string, {}>", value.display_name()),
            Shape::Record { name, .. } => name.clone(),
            Shape::Any => "any".into(),
        }
    }

    /// Verify that `value` fits this shape.
    pub fn check(&self, value: &Value) -> Result<(), ShapeMismatch> {
        self.check_at("$", value)
    }

    fn check_at(&self, path: &str, value: &Value) -> Result<(), ShapeMismatch> {
        match (self, value) {
            (Shape::Any, _) => Ok(()),
            (Shape::Unit, Value::Null) => Ok(()),
            (Shape::Bool, Value::Bool(_)) => Ok(()),
            (Shape::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(()),
            (Shape::Number, Value::Number(_)) => Ok(()),
            (Shape::String, Value::String(_)) => Ok(()),
            (Shape::Optional { .. }, Value::Null) => Ok(()),
            (Shape::Optional { inner }, v) => inner.check_at(path, v),
            (Shape::List { item }, Value::Array(items)) => {
                for (i, v) in items.iter().enumerate() {
                    item.check_at(&format!("{path}[{i}]"), v)?;
                }
                Ok(())
            }
            (Shape::Map { value: inner }, Value::Object(entries)) => {
                for (k, v) in entries {
                    inner.check_at(&format!("{path}.{k}"), v)?;
                }
                Ok(())
            }
            (Shape::Record { fields, .. }, Value::Object(entries)) => {
                for field in fields {
                    let field_path = format!("{path}.{}", field.name);
                    match entries.get(&field.name) {
                        Some(v) => field.shape.check_at(&field_path, v)?,
                        None if matches!(field.shape, Shape::Optional { .. }) => {}
                        None => {
                            return Err(ShapeMismatch {
                                path: field_path,
                                reason: "missing required field".into(),
                            })
                        }
                    }
                }
                if let Some(unknown) = entries
                    .keys()
                    .find(|k| !fields.iter().any(|f| &f.name == *k))
                {
                    return Err(ShapeMismatch {
                        path: format!("{path}.{unknown}"),
                        reason: "unknown field".into(),
                    });
                }
                Ok(())
            }
            (expected, found) => Err(ShapeMismatch {
                path: path.to_string(),
                reason: format!(
                    "expected {}, found {}",
                    expected.display_name(),
                    json_kind(found)
                ),
            }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Describe
// ---------------------------------------------------------------------------

/// Types that can report their wire [`Shape`].
///
/// Application records implement this by hand, listing the same fields that
/// their `serde` representation produces:
///
/// ```rust,ignore
/// impl Describe for Item {
///     fn shape() -> Shape {
///         Shape::record("Item", vec![
///             Field::new("id", Shape::String),
///             Field::new("description", Shape::String),
///         ])
///     }
/// }
/// ```
pub trait Describe {
    fn shape() -> Shape;
}

impl Describe for () {
    fn shape() -> Shape {
        Shape::Unit
    }
}

impl Describe for bool {
    fn shape() -> Shape {
        Shape::Bool
    }
}

macro_rules! describe_as {
    ($shape:expr => $($ty:ty),+) => {
        $(impl Describe for $ty {
            fn shape() -> Shape {
                $shape
            }
        })+
    };
}

describe_as!(Shape::Integer => i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);
describe_as!(Shape::Number => f32, f64);
describe_as!(Shape::String => String);
describe_as!(Shape::Any => Value);

impl<T: Describe> Describe for Vec<T> {
    fn shape() -> Shape {
        Shape::list(T::shape())
    }
}

impl<T: Describe> Describe for Option<T> {
    fn shape() -> Shape {
        Shape::optional(T::shape())
    }
}

impl<T: Describe> Describe for BTreeMap<String, T> {
    fn shape() -> Shape {
        Shape::map(T::shape())
    }
}

impl<T: Describe> Describe for HashMap<String, T> {
    fn shape() -> Shape {
        Shape::map(T::shape())
    }
}
