//! veridoc - a strict, composable schema engine for nested documents
//!
//! Validate values against composable schemas, resolve ancestor chains for
//! selector paths, and mutate containers atomically via copy-validate-commit.

pub mod schema;
pub mod traverse;
