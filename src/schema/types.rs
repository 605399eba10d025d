//! Value and schema type classification.
//!
//! Supported value types:
//! - null: explicit null
//! - bool: Boolean
//! - int: integral number (no fractional part)
//! - float: any number
//! - string: UTF-8 string
//! - array: sequence of values
//! - object: string-keyed mapping

use std::fmt;

use serde_json::Value;

/// The primitive shape of a value, as checked by type schemas.
///
/// `Int` and `Float` overlap on purpose: every integral number is a valid
/// float, so `Float` accepts any number while `Int` accepts only numbers
/// without a fractional part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Explicit null.
    Null,
    /// Boolean.
    Bool,
    /// Integral number.
    Int,
    /// Any number.
    Float,
    /// UTF-8 string.
    String,
    /// Sequence of values.
    Array,
    /// String-keyed mapping.
    Object,
}

impl ValueType {
    /// Returns the type name for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Null => "null",
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Array => "array",
            ValueType::Object => "object",
        }
    }

    /// Classifies a value. Integral numbers classify as `Int`, everything
    /// else with a fractional part as `Float`.
    pub fn of(value: &Value) -> ValueType {
        match value {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Bool,
            Value::Number(number) => {
                if number.is_i64() || number.is_u64() {
                    ValueType::Int
                } else {
                    ValueType::Float
                }
            }
            Value::String(_) => ValueType::String,
            Value::Array(_) => ValueType::Array,
            Value::Object(_) => ValueType::Object,
        }
    }

    /// True if the value is acceptable for this type.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ValueType::Null => value.is_null(),
            ValueType::Bool => value.is_boolean(),
            ValueType::Int => value.is_i64() || value.is_u64(),
            ValueType::Float => value.is_number(),
            ValueType::String => value.is_string(),
            ValueType::Array => value.is_array(),
            ValueType::Object => value.is_object(),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Field-less tag identifying a schema variant. Used to request a specific
/// capability from a composed schema without naming the concrete type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Any,
    Type,
    Equals,
    Range,
    Whitelist,
    List,
    Dict,
    Attribute,
    And,
    Or,
    Runtime,
}

impl SchemaKind {
    /// Returns the kind name for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            SchemaKind::Any => "any",
            SchemaKind::Type => "type",
            SchemaKind::Equals => "equals",
            SchemaKind::Range => "range",
            SchemaKind::Whitelist => "whitelist",
            SchemaKind::List => "list",
            SchemaKind::Dict => "dict",
            SchemaKind::Attribute => "attribute",
            SchemaKind::And => "and",
            SchemaKind::Or => "or",
            SchemaKind::Runtime => "runtime",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
