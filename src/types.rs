//! Core types shared by the engine, the binder and the component layer.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Props
// =============================================================================

/// Component props: a JSON object, shallow-merged by `update_props`.
pub type Props = serde_json::Map<String, Value>;

// =============================================================================
// DomValue
// =============================================================================

/// A value written into the document: a property value, an attribute value
/// or the content of a text node.
///
/// Numbers render the way a browser renders them (`3` rather than `3.0`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl DomValue {
    /// Truthiness used by boolean properties (`checked`, `disabled`, ...).
    pub fn truthy(&self) -> bool {
        match self {
            DomValue::Null => false,
            DomValue::Bool(b) => *b,
            DomValue::Number(n) => *n != 0.0 && !n.is_nan(),
            DomValue::Text(s) => !s.is_empty(),
        }
    }

    /// Borrow the text if this is a `Text` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DomValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DomValue::Null)
    }
}

impl fmt::Display for DomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomValue::Null => Ok(()),
            DomValue::Bool(b) => write!(f, "{b}"),
            DomValue::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else if n.is_nan() {
                    f.write_str("NaN")
                } else if n.is_infinite() {
                    f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
                } else {
                    write!(f, "{n}")
                }
            }
            DomValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for DomValue {
    fn from(value: &str) -> Self {
        DomValue::Text(value.to_string())
    }
}

impl From<String> for DomValue {
    fn from(value: String) -> Self {
        DomValue::Text(value)
    }
}

impl From<&String> for DomValue {
    fn from(value: &String) -> Self {
        DomValue::Text(value.clone())
    }
}

impl From<bool> for DomValue {
    fn from(value: bool) -> Self {
        DomValue::Bool(value)
    }
}

macro_rules! number_into_dom_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for DomValue {
                fn from(value: $ty) -> Self {
                    DomValue::Number(value as f64)
                }
            }
        )*
    };
}

number_into_dom_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T: Into<DomValue>> From<Option<T>> for DomValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(DomValue::Null, Into::into)
    }
}

impl From<Value> for DomValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => DomValue::Null,
            Value::Bool(b) => DomValue::Bool(b),
            Value::Number(n) => n.as_f64().map_or(DomValue::Null, DomValue::Number),
            Value::String(s) => DomValue::Text(s),
            other => DomValue::Text(other.to_string()),
        }
    }
}

impl From<&Value> for DomValue {
    fn from(value: &Value) -> Self {
        DomValue::from(value.clone())
    }
}
