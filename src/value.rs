//! Dynamic input values for the encoder.
//!
//! Callers adapt native data into [`Value`] at the boundary. Record fields
//! carry their element names explicitly, so no reflection is involved.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A dynamically-typed value tree.
///
/// The tree must be finite; the encoder recurses without a depth limit.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value, encodes to nothing
    Null,
    Bool(bool),
    /// Signed integer of any width
    Int(i64),
    /// Unsigned integer of any width
    UInt(u64),
    /// 64-bit float
    Float(f64),
    /// 32-bit float, formatted with single precision
    Float32(f32),
    String(String),
    /// Ordered list, no wrapping element of its own
    Sequence(Vec<Value>),
    /// Keyed entries; iteration order is unspecified
    Mapping(HashMap<String, Value>),
    /// Named value: element name and content
    Pair(String, Box<Value>),
    /// Named fields in declaration order
    Record(Record),
    /// Anything else, kept as its display form
    Other(String),
}

impl Value {
    /// Wrap any displayable value as fallback text.
    pub fn display(value: impl fmt::Display) -> Self {
        Self::Other(value.to_string())
    }

    /// Build a named value.
    pub fn pair(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Pair(name.into(), Box::new(value.into()))
    }

    /// Build a mapping from key/value entries.
    pub fn mapping<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// A struct-like value: fields in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<Field>,
}

/// One record field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Declared field name
    pub name: String,
    /// Explicit element name, overrides the derived one
    pub xml_name: Option<String>,
    pub value: Value,
}

impl Field {
    /// Element name for this field.
    ///
    /// The explicit name wins; otherwise the declared name with its first
    /// character lower-cased (`UserId` -> `userId`).
    pub fn element_name(&self) -> String {
        if let Some(ref name) = self.xml_name {
            if !name.is_empty() {
                return name.clone();
            }
        }
        lower_first(&self.name)
    }
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field named after its declaration.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            xml_name: None,
            value: value.into(),
        });
        self
    }

    /// Append a field with an explicit element name.
    pub fn field_as(
        mut self,
        name: impl Into<String>,
        xml_name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.fields.push(Field {
            name: name.into(),
            xml_name: Some(xml_name.into()),
            value: value.into(),
        });
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Self::Int(v as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Self::UInt(v as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float32(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Self::display(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<Value>> From<HashMap<String, V>> for Value {
    fn from(v: HashMap<String, V>) -> Self {
        Self::mapping(v)
    }
}

impl<V: Into<Value>> From<BTreeMap<String, V>> for Value {
    fn from(v: BTreeMap<String, V>) -> Self {
        Self::mapping(v)
    }
}

impl<V: Into<Value>> From<(&str, V)> for Value {
    fn from((name, value): (&str, V)) -> Self {
        Self::pair(name, value)
    }
}

impl<V: Into<Value>> From<(String, V)> for Value {
    fn from((name, value): (String, V)) -> Self {
        Self::pair(name, value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Self::UInt(u)
                } else if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Self::Float(f)
                } else {
                    Self::display(n)
                }
            }
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Sequence(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(entries) => Self::mapping(entries),
        }
    }
}
