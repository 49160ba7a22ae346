//! Runtime value types for Quill

use std::fmt;
use crate::heap::Handle;

/// Runtime values in Quill
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// 64-bit signed integer
    Int(i64),

    /// Boolean value
    Bool(bool),

    /// Immutable text, without quote delimiters
    Str(String),

    /// Reference to a live object instance
    Object(Handle),

    /// The null object reference
    Null,

    /// Result of a method that returned nothing
    Void,
}

/// The kind of a value, as seen by operator type checks. `null` shares the
/// object kind so it can be compared against object references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    Bool,
    Str,
    Object,
    Void,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Bool(_) => ValueKind::Bool,
            Value::Str(_) => ValueKind::Str,
            Value::Object(_) | Value::Null => ValueKind::Object,
            Value::Void => ValueKind::Void,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Object(_) => "object",
            Value::Null => "null",
            Value::Void => "void",
        }
    }

    /// Text produced by `print`, or `None` for values that have no printed
    /// form
    pub fn printed(&self) -> Option<String> {
        match self {
            Value::Int(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Str(s) => Some(s.clone()),
            Value::Object(_) | Value::Null | Value::Void => None,
        }
    }

    /// Heap handles reachable directly from this value
    pub fn handle(&self) -> Option<Handle> {
        match self {
            Value::Object(handle) => Some(*handle),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "{}", s),
            Value::Object(handle) => write!(f, "<object #{}>", handle.0),
            Value::Null => write!(f, "null"),
            Value::Void => write!(f, "<void>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_is_object_kind() {
        assert_eq!(Value::Null.kind(), ValueKind::Object);
        assert_eq!(Value::Object(Handle(3)).kind(), ValueKind::Object);
        assert_ne!(Value::Null, Value::Object(Handle(0)));
    }

    #[test]
    fn test_printed_forms() {
        assert_eq!(Value::Int(-42).printed().as_deref(), Some("-42"));
        assert_eq!(Value::Bool(false).printed().as_deref(), Some("false"));
        assert_eq!(Value::Str("a b".into()).printed().as_deref(), Some("a b"));
        assert_eq!(Value::Null.printed(), None);
        assert_eq!(Value::Void.printed(), None);
    }

    #[test]
    fn test_printed_int_reparses() {
        for n in [0, 7, -7, i64::MAX, i64::MIN] {
            let text = Value::Int(n).printed().unwrap();
            assert_eq!(text.parse::<i64>().unwrap(), n);
        }
    }
}
