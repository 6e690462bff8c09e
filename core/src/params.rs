//! JSON value tree used for request parameters.
//!
//! # Design
//! Parameters are an explicit tree rather than an arbitrary `Serialize` value so
//! that the only way serialization can fail is enumerable: a non-finite float
//! leaf. The tree owns its children, which also rules out cycles.

use std::collections::BTreeMap;

use serde::ser::{Error as _, Serialize, Serializer};

/// Top-level request parameters: a JSON object.
pub type Parameters = BTreeMap<String, ParameterValue>;

/// A JSON-shaped value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Null,
    Bool(bool),
    Int(i64),
    /// Must be finite to serialize.
    Float(f64),
    String(String),
    List(Vec<ParameterValue>),
    Map(BTreeMap<String, ParameterValue>),
}

impl ParameterValue {
    /// Build a `Map` from `(key, value)` pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<ParameterValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        ParameterValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Serialize for ParameterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParameterValue::Null => serializer.serialize_unit(),
            ParameterValue::Bool(b) => serializer.serialize_bool(*b),
            ParameterValue::Int(i) => serializer.serialize_i64(*i),
            ParameterValue::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            ParameterValue::Float(f) => Err(S::Error::custom(format!(
                "{f} cannot be represented in JSON"
            ))),
            ParameterValue::String(s) => serializer.serialize_str(s),
            ParameterValue::List(items) => serializer.collect_seq(items),
            ParameterValue::Map(entries) => serializer.collect_map(entries),
        }
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        ParameterValue::Bool(value)
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParameterValue {
                fn from(value: $ty) -> Self {
                    ParameterValue::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Float(value)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::String(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::String(value)
    }
}

impl<T: Into<ParameterValue>> From<Vec<T>> for ParameterValue {
    fn from(value: Vec<T>) -> Self {
        ParameterValue::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ParameterValue>> From<Option<T>> for ParameterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ParameterValue::Null, Into::into)
    }
}

impl From<serde_json::Value> for ParameterValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => ParameterValue::Null,
            Value::Bool(b) => ParameterValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ParameterValue::Int(i),
                // u64 above i64::MAX, or a fraction
                None => ParameterValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => ParameterValue::String(s),
            Value::Array(items) => {
                ParameterValue::List(items.into_iter().map(Into::into).collect())
            }
            Value::Object(entries) => ParameterValue::Map(
                entries.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}
