//! Ancestor-chain resolution.
//!
//! Given a schema, a value, and a selector path, [`Traverser::ancestors`]
//! produces the ordered chain of (schema, value, path) triples from the root
//! to the addressed position, both ends inclusive. The root must validate
//! before any descent; callers never traverse invalid documents.
//!
//! Containers consume one selector per step and contribute the declared
//! child schema as the next entry. Conjunctions are transparent: each member
//! is tried in order and the first that resolves the remaining path wins,
//! falling back past lookup-class failures only. Disjunctions and runtime
//! schemas resolve against the current value and are unwrapped without
//! consuming a selector, so they never shadow the concrete schema doing the
//! structural work.

use std::sync::Arc;

use log::debug;
use serde_json::Value;

use crate::schema::{Path, Schema, SchemaError, SchemaResult, Selector};

/// One link in an ancestor chain: the schema governing a position, the value
/// at that position, and the path from the root to it.
#[derive(Debug, Clone)]
pub struct Ancestor<'v> {
    schema: Arc<Schema>,
    value: &'v Value,
    path: Path,
}

impl<'v> Ancestor<'v> {
    /// The schema governing this position.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// The value at this position.
    pub fn value(&self) -> &'v Value {
        self.value
    }

    /// The path from the root to this position.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Resolves ancestor chains. Stateless; all context travels as arguments.
pub struct Traverser;

impl Traverser {
    /// Resolves the chain from the root of `value` to the position `path`
    /// addresses. The chain always holds `path.len() + 1` entries: the root
    /// plus one per consumed selector.
    pub fn ancestors<'v>(
        schema: &Schema,
        value: &'v Value,
        path: &Path,
    ) -> SchemaResult<Vec<Ancestor<'v>>> {
        schema.assert_valid(value)?;

        let root = Arc::new(schema.clone());
        let mut chain = vec![Ancestor {
            schema: root.clone(),
            value,
            path: Path::root(),
        }];
        descend(root, value, Path::root(), path.segments(), &mut chain)?;
        Ok(chain)
    }
}

fn descend<'v>(
    schema: Arc<Schema>,
    value: &'v Value,
    at: Path,
    remaining: &[Selector],
    chain: &mut Vec<Ancestor<'v>>,
) -> SchemaResult<()> {
    let (selector, rest) = match remaining.split_first() {
        Some(split) => split,
        None => return Ok(()),
    };

    match &*schema {
        Schema::List(list) => {
            let child_schema = match list.get_schema(selector) {
                Ok(child) => child.clone(),
                Err(error) => return Err(locate(error, &at)),
            };
            let child_value = match list.element(value, selector) {
                Ok(child) => child,
                Err(error) => return Err(locate(error, &at)),
            };
            step(child_schema, child_value, at, selector, rest, chain)
        }
        Schema::Dict(dict) => {
            let child_schema = match dict.get_schema(selector) {
                Ok(child) => child.clone(),
                Err(error) => return Err(locate(error, &at)),
            };
            let child_value = match dict.entry(value, selector) {
                Ok(child) => child,
                Err(error) => return Err(locate(error, &at)),
            };
            step(child_schema, child_value, at, selector, rest, chain)
        }
        Schema::Attribute(attribute) => {
            let child_schema = match attribute.get_schema(selector) {
                Ok(child) => child.clone(),
                Err(error) => return Err(locate(error, &at)),
            };
            let child_value = match attribute.entry(value, selector) {
                Ok(child) => child,
                Err(error) => return Err(locate(error, &at)),
            };
            step(child_schema, child_value, at, selector, rest, chain)
        }
        Schema::And(and) => {
            // Members are tried against the full remaining path. A member
            // that partially descended before failing a lookup has its
            // entries unwound before the next attempt.
            let mark = chain.len();
            for member in and.schemas() {
                chain.truncate(mark);
                match descend(member.clone(), value, at.clone(), remaining, chain) {
                    Ok(()) => return Ok(()),
                    Err(error) if error.is_lookup() => {
                        debug!("conjunction member cannot resolve path: {}", error);
                    }
                    Err(error) => return Err(error),
                }
            }
            chain.truncate(mark);
            Err(locate(
                SchemaError::unresolvable(format!(
                    "no conjunction member resolves selector '{}'",
                    selector
                )),
                &at,
            ))
        }
        Schema::Or(_) | Schema::Runtime(_) => match schema.resolve_for(value) {
            Some(resolved) => descend(resolved, value, at, remaining, chain),
            None => Err(locate(
                SchemaError::unresolvable("no schema resolves for the value"),
                &at,
            )),
        },
        Schema::Any
        | Schema::Type(_)
        | Schema::Equals(_)
        | Schema::Range(_)
        | Schema::Whitelist(_) => Err(locate(
            SchemaError::unresolvable(format!(
                "selector '{}' cannot descend into a {} schema",
                selector,
                schema.kind()
            )),
            &at,
        )),
    }
}

/// Appends the consumed step to the chain and keeps descending.
fn step<'v>(
    child_schema: Arc<Schema>,
    child_value: &'v Value,
    at: Path,
    selector: &Selector,
    rest: &[Selector],
    chain: &mut Vec<Ancestor<'v>>,
) -> SchemaResult<()> {
    let child_path = at.child(selector.clone());
    chain.push(Ancestor {
        schema: child_schema.clone(),
        value: child_value,
        path: child_path.clone(),
    });
    descend(child_schema, child_value, child_path, rest, chain)
}

/// Stamps the position a traversal failure occurred at onto the error.
fn locate(error: SchemaError, at: &Path) -> SchemaError {
    at.segments()
        .iter()
        .rev()
        .fold(error, |error, selector| error.prepend(selector.clone()))
}
