//! Schema error taxonomy.
//!
//! Error codes:
//! - TYPE_ERROR: value has the wrong shape
//! - VALUE_ERROR: right shape, invalid content (range, membership, length, keys)
//! - INDEX_ERROR / KEY_ERROR: bad sequence / mapping selector
//! - ATTRIBUTE_ERROR: bad attribute selector on an object-backed schema
//! - LOOKUP_ERROR: a path cannot be resolved against the schema at all
//! - NOT_SETTABLE / NOT_DELETABLE: write refused by the mutability gate
//!
//! Errors are immutable values. Each error carries the path to the offending
//! value, built bottom-up: container schemas prepend their own selector to
//! every child error before re-yielding it, so a fully propagated error reads
//! root-to-leaf.

use thiserror::Error;

use super::path::{Path, Selector};

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Classifies a [`SchemaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaErrorKind {
    /// Value has the wrong shape entirely.
    Type,
    /// Right shape, invalid content.
    Value,
    /// Bad sequence selector.
    Index,
    /// Bad mapping selector.
    Key,
    /// Bad attribute selector.
    Attribute,
    /// A path cannot be resolved against the schema at all.
    Lookup,
    /// Write refused: the schema is not mutable.
    NotSettable,
    /// Delete refused: the schema is not mutable.
    NotDeletable,
}

impl SchemaErrorKind {
    /// Returns the stable code string for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorKind::Type => "TYPE_ERROR",
            SchemaErrorKind::Value => "VALUE_ERROR",
            SchemaErrorKind::Index => "INDEX_ERROR",
            SchemaErrorKind::Key => "KEY_ERROR",
            SchemaErrorKind::Attribute => "ATTRIBUTE_ERROR",
            SchemaErrorKind::Lookup => "LOOKUP_ERROR",
            SchemaErrorKind::NotSettable => "NOT_SETTABLE",
            SchemaErrorKind::NotDeletable => "NOT_DELETABLE",
        }
    }

    /// True for the lookup class of errors (bad or unresolvable selectors).
    ///
    /// Attribute errors are a parallel class, not a lookup sub-kind; composite
    /// traversal falls back past lookup failures only.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            SchemaErrorKind::Index | SchemaErrorKind::Key | SchemaErrorKind::Lookup
        )
    }
}

impl std::fmt::Display for SchemaErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A typed validation or addressing failure with the path where it occurred.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {path}: {message}")]
pub struct SchemaError {
    kind: SchemaErrorKind,
    path: Path,
    message: String,
}

impl SchemaError {
    fn new(kind: SchemaErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: Path::root(),
            message: message.into(),
        }
    }

    /// Value has the wrong shape.
    pub fn wrong_type(expected: impl std::fmt::Display, actual: impl std::fmt::Display) -> Self {
        Self::new(
            SchemaErrorKind::Type,
            format!("expected {}, got {}", expected, actual),
        )
    }

    /// Right shape, invalid content.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(SchemaErrorKind::Value, message)
    }

    /// A required mapping key is absent. The error path is the missing key.
    pub fn missing_key(key: &str) -> Self {
        Self::new(SchemaErrorKind::Value, "required key is missing")
            .prepend(Selector::Key(key.to_string()))
    }

    /// Keys are present that the schema does not declare.
    pub fn undeclared_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: Vec<String> = keys.into_iter().map(|k| k.as_ref().to_string()).collect();
        Self::new(
            SchemaErrorKind::Value,
            format!("undeclared keys: {}", keys.join(", ")),
        )
    }

    /// Bad sequence selector.
    pub fn bad_index(message: impl Into<String>) -> Self {
        Self::new(SchemaErrorKind::Index, message)
    }

    /// Bad mapping selector.
    pub fn bad_key(message: impl Into<String>) -> Self {
        Self::new(SchemaErrorKind::Key, message)
    }

    /// Bad attribute selector.
    pub fn bad_attribute(message: impl Into<String>) -> Self {
        Self::new(SchemaErrorKind::Attribute, message)
    }

    /// A path cannot be resolved against the schema.
    pub fn unresolvable(message: impl Into<String>) -> Self {
        Self::new(SchemaErrorKind::Lookup, message)
    }

    /// Write refused by the mutability gate.
    pub fn not_settable() -> Self {
        Self::new(SchemaErrorKind::NotSettable, "schema is not settable")
    }

    /// Delete refused by the mutability gate.
    pub fn not_deletable() -> Self {
        Self::new(SchemaErrorKind::NotDeletable, "schema is not deletable")
    }

    /// Returns the error kind.
    pub fn kind(&self) -> SchemaErrorKind {
        self.kind
    }

    /// Returns the root-to-leaf path to the offending value.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the human-readable message, without kind or path.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// True for the lookup class of errors.
    pub fn is_lookup(&self) -> bool {
        self.kind.is_lookup()
    }

    /// Prepends one selector to the error path.
    ///
    /// Containers call this once per boundary the error crosses on its way
    /// out, innermost selector first.
    pub fn prepend(mut self, selector: Selector) -> Self {
        self.path.prepend(selector);
        self
    }
}

/// Converts a validation report into a result carrying the first error.
pub(crate) fn ensure_valid(errors: Vec<SchemaError>) -> SchemaResult<()> {
    match errors.into_iter().next() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
