//! Introspectable object properties.

use std::fmt;

use super::class::ClassTag;
use super::handle::WeakObject;

/// Errors from setting a property.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    #[error("no property named {0}")]
    UnknownProperty(String),
    #[error("property {0} is read-only")]
    ReadOnly(String),
    #[error("type mismatch for {property}: expected {expected}, got {actual}")]
    TypeMismatch {
        property: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// A dynamically typed property value.
#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    /// Enum nick.
    Enum(&'static str),
    /// Set flag nicks.
    Flags(Vec<&'static str>),
    /// A reference to another object. Held weakly.
    Object(WeakObject),
}

impl Value {
    /// Name of the value type, as shown in the property list.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "gboolean",
            Value::Int(_) => "gint",
            Value::UInt(_) => "guint",
            Value::Float(_) => "gdouble",
            Value::Str(_) => "gchararray",
            Value::Enum(_) => "enum",
            Value::Flags(_) => "flags",
            Value::Object(_) => "GiltObject",
        }
    }

    /// Whether `other` can be stored where `self` lives.
    pub fn same_type(&self, other: &Value) -> bool {
        matches!(other, Value::None) || self.type_name() == other.type_name()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Flags(a), Value::Flags(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.id() == b.id(),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str(""),
            Value::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::Int(n) => write!(f, "{n}"),
            Value::UInt(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n:.2}"),
            Value::Str(s) => f.write_str(s),
            Value::Enum(nick) => f.write_str(nick),
            Value::Flags(nicks) => f.write_str(&nicks.join(" | ")),
            Value::Object(weak) => match weak.upgrade() {
                Some(obj) => write!(f, "{} {:p}", obj.class(), obj.as_ref()),
                None => f.write_str("NULL"),
            },
        }
    }
}

/// One property slot on an object.
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub value: Value,
    pub writable: bool,
    /// Class that defines the property.
    pub owner: ClassTag,
}

impl Property {
    pub fn new(name: impl Into<String>, value: Value, owner: ClassTag) -> Self {
        Self {
            name: name.into(),
            value,
            writable: true,
            owner,
        }
    }

    /// Mark the property read-only (builder).
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_values() {
        assert_eq!(Value::Bool(true).to_string(), "TRUE");
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Float(1.5).to_string(), "1.50");
        assert_eq!(Value::Flags(vec!["a", "b"]).to_string(), "a | b");
        assert_eq!(Value::Object(WeakObject::new()).to_string(), "NULL");
    }

    #[test]
    fn type_names() {
        assert_eq!(Value::Str("x".into()).type_name(), "gchararray");
        assert_eq!(Value::Enum("start").type_name(), "enum");
    }

    #[test]
    fn same_type_accepts_none() {
        let v = Value::Int(1);
        assert!(v.same_type(&Value::Int(4)));
        assert!(v.same_type(&Value::None));
        assert!(!v.same_type(&Value::Bool(true)));
    }

    #[test]
    fn read_only_builder() {
        let p = Property::new("visible", Value::Bool(true), ClassTag::Widget).read_only();
        assert!(!p.writable);
    }

    #[test]
    fn error_messages() {
        let e = PropertyError::ReadOnly("name".into());
        assert_eq!(e.to_string(), "property name is read-only");
    }
}
