//! Composable schema algebra for veridoc
//!
//! Schemas validate nested values, address positions inside them, and guard
//! every write behind a copy-validate-commit cycle.
//!
//! # Design Principles
//!
//! - One validation contract for every schema: validate, is_valid, assert_valid
//! - Eager, deterministic reports; same value in, same errors out
//! - Error paths build bottom-up and read root-to-leaf
//! - Schemas are immutable during checks; shared children via Arc
//! - Writes land only after the staged result validates

mod composite;
mod container;
mod core;
mod errors;
mod mutate;
mod path;
mod scalar;
mod types;

pub use composite::{AndSchema, OrSchema, RuntimeSchema, SchemaResolver};
pub use container::{AttributeSchema, DictSchema, ListSchema};
pub use core::Schema;
pub use errors::{SchemaError, SchemaErrorKind, SchemaResult};
pub use path::{Path, Selector};
pub use scalar::{EqualsSchema, RangeSchema, TypeSchema, WhitelistOption, WhitelistSchema};
pub use types::{SchemaKind, ValueType};
