//! The schema sum type and the base validation contract.
//!
//! Every schema answers three questions about a value:
//! - `validate` returns the full error report, eager and deterministic
//! - `is_valid` answers pass/fail with short-circuiting, no error values
//! - `assert_valid` converts the report into a result with the first error
//!
//! The two judgments always agree: `is_valid` is true exactly when
//! `validate` is empty.

use std::sync::Arc;

use serde_json::Value;

use super::composite::{AndSchema, OrSchema, RuntimeSchema};
use super::container::{AttributeSchema, DictSchema, ListSchema};
use super::errors::{ensure_valid, SchemaError, SchemaResult};
use super::scalar::{EqualsSchema, RangeSchema, TypeSchema, WhitelistSchema};
use super::types::{SchemaKind, ValueType};

/// A composable validation rule over values.
///
/// Children are held behind [`Arc`] so sub-schemas can be shared across
/// compositions and threads.
#[derive(Debug, Clone)]
pub enum Schema {
    /// Accepts every value.
    Any,
    /// Accepts one primitive type.
    Type(TypeSchema),
    /// Accepts one literal value.
    Equals(EqualsSchema),
    /// Accepts numbers within inclusive bounds.
    Range(RangeSchema),
    /// Accepts values from a fixed option set.
    Whitelist(WhitelistSchema),
    /// Accepts sequences of one item schema.
    List(ListSchema),
    /// Accepts mappings with a declared key set.
    Dict(DictSchema),
    /// Accepts objects carrying a declared attribute set.
    Attribute(AttributeSchema),
    /// Accepts values satisfying every member.
    And(AndSchema),
    /// Accepts values satisfying at least one member.
    Or(OrSchema),
    /// Defers to a resolver consulted per value.
    Runtime(RuntimeSchema),
}

impl Schema {
    /// The field-less tag for this variant.
    pub fn kind(&self) -> SchemaKind {
        match self {
            Schema::Any => SchemaKind::Any,
            Schema::Type(_) => SchemaKind::Type,
            Schema::Equals(_) => SchemaKind::Equals,
            Schema::Range(_) => SchemaKind::Range,
            Schema::Whitelist(_) => SchemaKind::Whitelist,
            Schema::List(_) => SchemaKind::List,
            Schema::Dict(_) => SchemaKind::Dict,
            Schema::Attribute(_) => SchemaKind::Attribute,
            Schema::And(_) => SchemaKind::And,
            Schema::Or(_) => SchemaKind::Or,
            Schema::Runtime(_) => SchemaKind::Runtime,
        }
    }

    /// Collects every violation. Empty means valid. Two calls over the same
    /// value yield the same report in the same order.
    pub fn validate(&self, value: &Value) -> Vec<SchemaError> {
        match self {
            Schema::Any => Vec::new(),
            Schema::Type(schema) => schema.validate(value),
            Schema::Equals(schema) => schema.validate(value),
            Schema::Range(schema) => schema.validate(value),
            Schema::Whitelist(schema) => schema.validate(value),
            Schema::List(schema) => schema.validate(value),
            Schema::Dict(schema) => schema.validate(value),
            Schema::Attribute(schema) => schema.validate(value),
            Schema::And(schema) => schema.validate(value),
            Schema::Or(schema) => schema.validate(value),
            Schema::Runtime(schema) => schema.validate(value),
        }
    }

    /// Pass/fail judgment without error construction. Short-circuits on the
    /// first failure.
    pub fn is_valid(&self, value: &Value) -> bool {
        match self {
            Schema::Any => true,
            Schema::Type(schema) => schema.is_valid(value),
            Schema::Equals(schema) => schema.is_valid(value),
            Schema::Range(schema) => schema.is_valid(value),
            Schema::Whitelist(schema) => schema.is_valid(value),
            Schema::List(schema) => schema.is_valid(value),
            Schema::Dict(schema) => schema.is_valid(value),
            Schema::Attribute(schema) => schema.is_valid(value),
            Schema::And(schema) => schema.is_valid(value),
            Schema::Or(schema) => schema.is_valid(value),
            Schema::Runtime(schema) => schema.is_valid(value),
        }
    }

    /// Ok for valid values, otherwise the first error of the report. Valid
    /// values are judged through `is_valid` without building the report.
    pub fn assert_valid(&self, value: &Value) -> SchemaResult<()> {
        if self.is_valid(value) {
            return Ok(());
        }
        ensure_valid(self.validate(value))
    }

    /// Finds the first constituent schema of the requested kind, searching
    /// self first, then composite members depth-first in declaration order.
    /// Runtime schemas are searched through their resolution for this value.
    pub fn get_instance(&self, value: &Value, kind: SchemaKind) -> Option<Schema> {
        if self.kind() == kind {
            return Some(self.clone());
        }
        match self {
            Schema::And(and) => and
                .schemas()
                .iter()
                .find_map(|member| member.get_instance(value, kind)),
            Schema::Or(or) => or
                .schemas()
                .iter()
                .find_map(|member| member.get_instance(value, kind)),
            Schema::Runtime(runtime) => runtime
                .get_schema(value)
                .and_then(|resolved| resolved.get_instance(value, kind)),
            _ => None,
        }
    }

    /// Resolves value-dependent schemas one step. Or resolves to its first
    /// satisfying branch, Runtime to its resolver's answer. Everything else
    /// resolves to nothing.
    pub(crate) fn resolve_for(&self, value: &Value) -> Option<Arc<Schema>> {
        match self {
            Schema::Or(or) => or.get_schema(value),
            Schema::Runtime(runtime) => runtime.get_schema(value),
            _ => None,
        }
    }

    /// A schema accepting one primitive type.
    pub fn of_type(expected: ValueType) -> Self {
        Schema::Type(TypeSchema::new(expected))
    }

    /// A schema accepting one literal value.
    pub fn equals(expected: impl Into<Value>) -> Self {
        Schema::Equals(EqualsSchema::new(expected))
    }

    /// A schema accepting null or whatever the inner schema accepts.
    /// Built as a disjunction, so null resolves through the first branch.
    pub fn nullable(inner: impl Into<Arc<Schema>>) -> Self {
        Schema::Or(OrSchema::new(vec![
            Arc::new(Schema::equals(Value::Null)),
            inner.into(),
        ]))
    }
}
