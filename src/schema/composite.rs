//! Composite schemas: conjunction, disjunction, and runtime resolution.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::core::Schema;
use super::errors::SchemaError;
use super::types::ValueType;

/// Accepts values satisfying every member schema.
///
/// An empty conjunction is vacuously satisfied.
#[derive(Debug, Clone)]
pub struct AndSchema {
    schemas: Vec<Arc<Schema>>,
}

impl AndSchema {
    pub fn new(schemas: Vec<Arc<Schema>>) -> Self {
        Self { schemas }
    }

    /// Member schemas in declaration order.
    pub fn schemas(&self) -> &[Arc<Schema>] {
        &self.schemas
    }

    pub fn validate(&self, value: &Value) -> Vec<SchemaError> {
        self.schemas
            .iter()
            .flat_map(|schema| schema.validate(value))
            .collect()
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        self.schemas.iter().all(|schema| schema.is_valid(value))
    }
}

/// Accepts values satisfying at least one member schema.
///
/// An empty disjunction accepts nothing. On failure the report concatenates
/// every branch's errors in declaration order, so the caller sees why each
/// alternative was ruled out.
#[derive(Debug, Clone)]
pub struct OrSchema {
    schemas: Vec<Arc<Schema>>,
}

impl OrSchema {
    pub fn new(schemas: Vec<Arc<Schema>>) -> Self {
        Self { schemas }
    }

    /// Member schemas in declaration order.
    pub fn schemas(&self) -> &[Arc<Schema>] {
        &self.schemas
    }

    pub fn validate(&self, value: &Value) -> Vec<SchemaError> {
        if self.schemas.is_empty() {
            return vec![SchemaError::invalid("no alternatives declared")];
        }
        if self.schemas.iter().any(|schema| schema.is_valid(value)) {
            return Vec::new();
        }
        self.schemas
            .iter()
            .flat_map(|schema| schema.validate(value))
            .collect()
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        self.schemas.iter().any(|schema| schema.is_valid(value))
    }

    /// Resolves the branch for a value: the first member the value satisfies,
    /// in declaration order. None if no branch accepts it.
    pub fn get_schema(&self, value: &Value) -> Option<Arc<Schema>> {
        self.schemas
            .iter()
            .find(|schema| schema.is_valid(value))
            .cloned()
    }
}

/// Picks the governing schema per value at validation time.
pub trait SchemaResolver: Send + Sync {
    /// The schema governing this value, or None if no schema applies.
    fn resolve(&self, value: &Value) -> Option<Arc<Schema>>;
}

/// Defers schema selection to a [`SchemaResolver`] consulted per value.
///
/// Useful when the governing schema depends on the value itself, like a
/// record carrying its own type tag.
#[derive(Clone)]
pub struct RuntimeSchema {
    resolver: Arc<dyn SchemaResolver>,
}

impl RuntimeSchema {
    pub fn new<R: SchemaResolver + 'static>(resolver: R) -> Self {
        Self {
            resolver: Arc::new(resolver),
        }
    }

    /// Resolves the schema for a value. None means no schema applies.
    pub fn get_schema(&self, value: &Value) -> Option<Arc<Schema>> {
        self.resolver.resolve(value)
    }

    pub fn validate(&self, value: &Value) -> Vec<SchemaError> {
        match self.get_schema(value) {
            Some(schema) => schema.validate(value),
            None => vec![SchemaError::wrong_type(
                "a value with a resolvable schema",
                ValueType::of(value),
            )],
        }
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        match self.get_schema(value) {
            Some(schema) => schema.is_valid(value),
            None => false,
        }
    }
}

impl fmt::Debug for RuntimeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeSchema").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::schema::errors::SchemaErrorKind;
    use crate::schema::scalar::RangeSchema;
    use crate::schema::types::SchemaKind;

    use super::*;

    fn int_schema() -> Arc<Schema> {
        Arc::new(Schema::of_type(ValueType::Int))
    }

    fn string_schema() -> Arc<Schema> {
        Arc::new(Schema::of_type(ValueType::String))
    }

    #[test]
    fn test_and_requires_every_member() {
        let schema = AndSchema::new(vec![
            int_schema(),
            Arc::new(Schema::Range(RangeSchema::new(Some(0.0), Some(10.0)))),
        ]);
        assert!(schema.is_valid(&json!(5)));
        assert!(!schema.is_valid(&json!(11)));
        assert!(!schema.is_valid(&json!("5")));
    }

    #[test]
    fn test_and_concatenates_member_errors() {
        let schema = AndSchema::new(vec![
            string_schema(),
            Arc::new(Schema::Range(RangeSchema::new(Some(0.0), None))),
        ]);
        // Nothing satisfies both members; each reports independently.
        let errors = schema.validate(&json!(-1));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].kind(), SchemaErrorKind::Type);
        assert_eq!(errors[1].kind(), SchemaErrorKind::Value);
    }

    #[test]
    fn test_empty_and_is_vacuously_satisfied() {
        let schema = AndSchema::new(Vec::new());
        assert!(schema.is_valid(&json!("anything")));
        assert!(schema.validate(&json!(null)).is_empty());
    }

    #[test]
    fn test_or_accepts_any_member() {
        let schema = OrSchema::new(vec![int_schema(), string_schema()]);
        assert!(schema.is_valid(&json!(3)));
        assert!(schema.is_valid(&json!("x")));
        assert!(!schema.is_valid(&json!(true)));
    }

    #[test]
    fn test_or_failure_reports_every_branch() {
        let schema = OrSchema::new(vec![int_schema(), string_schema()]);
        let errors = schema.validate(&json!(true));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message(), "expected int, got bool");
        assert_eq!(errors[1].message(), "expected string, got bool");
    }

    #[test]
    fn test_empty_or_accepts_nothing() {
        let schema = OrSchema::new(Vec::new());
        assert!(!schema.is_valid(&json!(1)));
        let errors = schema.validate(&json!(1));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), SchemaErrorKind::Value);
    }

    #[test]
    fn test_or_resolves_first_satisfying_branch() {
        let schema = OrSchema::new(vec![int_schema(), string_schema()]);
        let branch = schema.get_schema(&json!("x")).unwrap();
        assert_eq!(branch.kind(), SchemaKind::Type);
        assert!(branch.is_valid(&json!("x")));
        assert!(schema.get_schema(&json!(true)).is_none());
    }

    struct ByShape;

    impl SchemaResolver for ByShape {
        fn resolve(&self, value: &Value) -> Option<Arc<Schema>> {
            match value {
                Value::Number(_) => Some(Arc::new(Schema::Range(RangeSchema::new(
                    Some(0.0),
                    None,
                )))),
                Value::String(_) => Some(Arc::new(Schema::of_type(ValueType::String))),
                _ => None,
            }
        }
    }

    #[test]
    fn test_runtime_delegates_to_resolved_schema() {
        let schema = RuntimeSchema::new(ByShape);
        assert!(schema.is_valid(&json!(3)));
        assert!(!schema.is_valid(&json!(-3)));
        assert!(schema.is_valid(&json!("x")));
    }

    #[test]
    fn test_runtime_unresolvable_is_a_type_error() {
        let schema = RuntimeSchema::new(ByShape);
        let errors = schema.validate(&json!(true));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), SchemaErrorKind::Type);
    }
}
