//! Scalar schemas: type checks, literal equality, numeric ranges, and
//! whitelisted option sets.

use serde_json::Value;

use super::errors::SchemaError;
use super::types::ValueType;

/// Accepts values of exactly one primitive type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSchema {
    expected: ValueType,
}

impl TypeSchema {
    pub fn new(expected: ValueType) -> Self {
        Self { expected }
    }

    /// Returns the accepted type.
    pub fn expected(&self) -> ValueType {
        self.expected
    }

    pub fn validate(&self, value: &Value) -> Vec<SchemaError> {
        if self.expected.matches(value) {
            Vec::new()
        } else {
            vec![SchemaError::wrong_type(self.expected, ValueType::of(value))]
        }
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        self.expected.matches(value)
    }
}

/// Accepts exactly one literal value, compared by deep equality.
#[derive(Debug, Clone, PartialEq)]
pub struct EqualsSchema {
    expected: Value,
}

impl EqualsSchema {
    pub fn new(expected: impl Into<Value>) -> Self {
        Self {
            expected: expected.into(),
        }
    }

    /// Returns the accepted literal.
    pub fn expected(&self) -> &Value {
        &self.expected
    }

    pub fn validate(&self, value: &Value) -> Vec<SchemaError> {
        if self.expected == *value {
            Vec::new()
        } else {
            vec![SchemaError::invalid(format!(
                "expected {}, got {}",
                self.expected, value
            ))]
        }
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        self.expected == *value
    }
}

/// Accepts numbers within an inclusive range. Either bound may be open.
///
/// Non-numbers fail the shape check before any bound is consulted, so a
/// string never produces a range violation, only a type error.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSchema {
    min: Option<f64>,
    max: Option<f64>,
}

impl RangeSchema {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Lower inclusive bound, if any.
    pub fn min(&self) -> Option<f64> {
        self.min
    }

    /// Upper inclusive bound, if any.
    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn validate(&self, value: &Value) -> Vec<SchemaError> {
        let number = match value.as_f64() {
            Some(number) => number,
            None => return vec![SchemaError::wrong_type("number", ValueType::of(value))],
        };

        let mut errors = Vec::new();
        if let Some(min) = self.min {
            if number < min {
                errors.push(SchemaError::invalid(format!(
                    "value {} is less than minimum {}",
                    number, min
                )));
            }
        }
        if let Some(max) = self.max {
            if number > max {
                errors.push(SchemaError::invalid(format!(
                    "value {} is greater than maximum {}",
                    number, max
                )));
            }
        }
        errors
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        match value.as_f64() {
            Some(number) => {
                self.min.map_or(true, |min| number >= min)
                    && self.max.map_or(true, |max| number <= max)
            }
            None => false,
        }
    }
}

/// One permitted value in a whitelist, with the label used in error reports.
#[derive(Debug, Clone, PartialEq)]
pub struct WhitelistOption {
    value: Value,
    label: String,
}

impl WhitelistOption {
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Accepts only values drawn from a fixed option set.
#[derive(Debug, Clone, PartialEq)]
pub struct WhitelistSchema {
    options: Vec<WhitelistOption>,
}

impl WhitelistSchema {
    pub fn new(options: Vec<WhitelistOption>) -> Self {
        Self { options }
    }

    /// The permitted options, in declaration order.
    pub fn options(&self) -> &[WhitelistOption] {
        &self.options
    }

    pub fn validate(&self, value: &Value) -> Vec<SchemaError> {
        if self.is_valid(value) {
            return Vec::new();
        }
        let labels: Vec<&str> = self.options.iter().map(|o| o.label()).collect();
        vec![SchemaError::invalid(format!(
            "value {} is not one of: {}",
            value,
            labels.join(", ")
        ))]
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        self.options.iter().any(|option| option.value == *value)
    }
}
