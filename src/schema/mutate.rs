//! Guarded writes for container schemas.
//!
//! Every write runs the same cycle:
//! 1. Validate the current container; refuse to touch invalid data
//! 2. Check the mutability gate (NOT_SETTABLE / NOT_DELETABLE)
//! 3. Assert the selector is valid for this schema
//! 4. Stage: deep copy the container
//! 5. Apply the write to the stage
//! 6. Validate the stage; on failure reject, original untouched
//! 7. Re-apply the identical write to the original
//!
//! The original is never swapped for the stage. Only the committed write
//! itself lands on it, so a container is either exactly its old state or its
//! old state plus one accepted write.

use log::{debug, trace};
use serde_json::Value;

use std::collections::BTreeMap;

use super::container::{AttributeSchema, DictSchema, ListSchema};
use super::errors::{ensure_valid, SchemaError, SchemaResult};
use super::path::Selector;
use super::types::ValueType;

/// Stages a write on a deep copy, validates the result, then re-applies the
/// identical write to the original. Steps 4 through 7 of the cycle.
fn commit(
    container: &mut Value,
    validate: impl Fn(&Value) -> Vec<SchemaError>,
    apply: impl Fn(&mut Value) -> SchemaResult<()>,
) -> SchemaResult<()> {
    let mut staged = container.clone();
    apply(&mut staged)?;
    if let Err(error) = ensure_valid(validate(&staged)) {
        debug!("write rejected, container unchanged: {}", error);
        return Err(error);
    }
    apply(container)?;
    trace!("write committed");
    Ok(())
}

fn set_element(container: &mut Value, index: usize, new_value: Value) -> SchemaResult<()> {
    let shape = ValueType::of(container);
    let items = container
        .as_array_mut()
        .ok_or_else(|| SchemaError::wrong_type("array", shape))?;
    let length = items.len();
    match items.get_mut(index) {
        Some(slot) => {
            *slot = new_value;
            Ok(())
        }
        None => Err(SchemaError::bad_index(format!(
            "index {} is out of bounds for length {}",
            index, length
        ))),
    }
}

fn remove_element(container: &mut Value, index: usize) -> SchemaResult<()> {
    let shape = ValueType::of(container);
    let items = container
        .as_array_mut()
        .ok_or_else(|| SchemaError::wrong_type("array", shape))?;
    if index < items.len() {
        items.remove(index);
        Ok(())
    } else {
        Err(SchemaError::bad_index(format!(
            "index {} is out of bounds for length {}",
            index,
            items.len()
        )))
    }
}

fn replace_elements(container: &mut Value, new_values: Vec<Value>) -> SchemaResult<()> {
    let shape = ValueType::of(container);
    let items = container
        .as_array_mut()
        .ok_or_else(|| SchemaError::wrong_type("array", shape))?;
    *items = new_values;
    Ok(())
}

fn clear_elements(container: &mut Value) -> SchemaResult<()> {
    let shape = ValueType::of(container);
    let items = container
        .as_array_mut()
        .ok_or_else(|| SchemaError::wrong_type("array", shape))?;
    items.clear();
    Ok(())
}

fn set_entry(container: &mut Value, key: &str, new_value: Value) -> SchemaResult<()> {
    let shape = ValueType::of(container);
    let object = container
        .as_object_mut()
        .ok_or_else(|| SchemaError::wrong_type("object", shape))?;
    object.insert(key.to_string(), new_value);
    Ok(())
}

/// Removes an entry, reporting whether it was present.
fn remove_entry(container: &mut Value, key: &str) -> SchemaResult<bool> {
    let shape = ValueType::of(container);
    let object = container
        .as_object_mut()
        .ok_or_else(|| SchemaError::wrong_type("object", shape))?;
    Ok(object.remove(key).is_some())
}

impl ListSchema {
    /// Replaces one item. The index must be in bounds; writes never append.
    pub fn set_value(
        &self,
        container: &mut Value,
        selector: &Selector,
        new_value: Value,
    ) -> SchemaResult<()> {
        ensure_valid(self.validate(container))?;
        if !self.is_mutable() {
            return Err(SchemaError::not_settable());
        }
        let index = self.index_of(selector)?;
        commit(
            container,
            |value| self.validate(value),
            |target| set_element(target, index, new_value.clone()),
        )
    }

    /// Replaces the whole sequence.
    pub fn set_values(&self, container: &mut Value, new_values: Vec<Value>) -> SchemaResult<()> {
        ensure_valid(self.validate(container))?;
        if !self.is_mutable() {
            return Err(SchemaError::not_settable());
        }
        commit(
            container,
            |value| self.validate(value),
            |target| replace_elements(target, new_values.clone()),
        )
    }

    /// Removes one item, shifting later items down.
    pub fn delete_value(&self, container: &mut Value, selector: &Selector) -> SchemaResult<()> {
        ensure_valid(self.validate(container))?;
        if !self.is_mutable() {
            return Err(SchemaError::not_deletable());
        }
        let index = self.index_of(selector)?;
        commit(
            container,
            |value| self.validate(value),
            |target| remove_element(target, index),
        )
    }

    /// Removes every item. A minimum length still applies to the result.
    pub fn delete_values(&self, container: &mut Value) -> SchemaResult<()> {
        ensure_valid(self.validate(container))?;
        if !self.is_mutable() {
            return Err(SchemaError::not_deletable());
        }
        commit(container, |value| self.validate(value), clear_elements)
    }
}

impl DictSchema {
    /// Writes one declared entry.
    pub fn set_value(
        &self,
        container: &mut Value,
        selector: &Selector,
        new_value: Value,
    ) -> SchemaResult<()> {
        ensure_valid(self.validate(container))?;
        if !self.is_mutable() {
            return Err(SchemaError::not_settable());
        }
        let key = self.declared_key(selector)?;
        commit(
            container,
            |value| self.validate(value),
            |target| set_entry(target, key, new_value.clone()),
        )
    }

    /// Writes a batch of entries in one staged step. Keys are not asserted
    /// individually; an undeclared key is caught by the staged validation
    /// when the schema is strict about additional keys.
    pub fn set_values(
        &self,
        container: &mut Value,
        new_values: BTreeMap<String, Value>,
    ) -> SchemaResult<()> {
        ensure_valid(self.validate(container))?;
        if !self.is_mutable() {
            return Err(SchemaError::not_settable());
        }
        commit(
            container,
            |value| self.validate(value),
            |target| {
                for (key, new_value) in &new_values {
                    set_entry(target, key, new_value.clone())?;
                }
                Ok(())
            },
        )
    }

    /// Removes one declared entry. The entry must be present.
    pub fn delete_value(&self, container: &mut Value, selector: &Selector) -> SchemaResult<()> {
        ensure_valid(self.validate(container))?;
        if !self.is_mutable() {
            return Err(SchemaError::not_deletable());
        }
        let key = self.declared_key(selector)?;
        commit(
            container,
            |value| self.validate(value),
            |target| {
                if remove_entry(target, key)? {
                    Ok(())
                } else {
                    Err(SchemaError::bad_key(format!("key '{}' is not present", key)))
                }
            },
        )
    }

    /// Removes every declared entry that is present. Required keys make the
    /// staged result invalid, so a fully required dict refuses this.
    pub fn delete_values(&self, container: &mut Value) -> SchemaResult<()> {
        ensure_valid(self.validate(container))?;
        if !self.is_mutable() {
            return Err(SchemaError::not_deletable());
        }
        commit(
            container,
            |value| self.validate(value),
            |target| {
                for key in self.keys() {
                    remove_entry(target, key)?;
                }
                Ok(())
            },
        )
    }
}

impl AttributeSchema {
    /// Writes one declared attribute.
    pub fn set_value(
        &self,
        container: &mut Value,
        selector: &Selector,
        new_value: Value,
    ) -> SchemaResult<()> {
        ensure_valid(self.validate(container))?;
        if !self.is_mutable() {
            return Err(SchemaError::not_settable());
        }
        let name = self.declared_attribute(selector)?;
        commit(
            container,
            |value| self.validate(value),
            |target| set_entry(target, name, new_value.clone()),
        )
    }

    /// Writes a batch of attributes in one staged step. Names are not
    /// asserted individually; undeclared attributes pass through, matching
    /// the lenient validation.
    pub fn set_values(
        &self,
        container: &mut Value,
        new_values: BTreeMap<String, Value>,
    ) -> SchemaResult<()> {
        ensure_valid(self.validate(container))?;
        if !self.is_mutable() {
            return Err(SchemaError::not_settable());
        }
        commit(
            container,
            |value| self.validate(value),
            |target| {
                for (name, new_value) in &new_values {
                    set_entry(target, name, new_value.clone())?;
                }
                Ok(())
            },
        )
    }

    /// Removes one declared attribute. The attribute must be present.
    pub fn delete_value(&self, container: &mut Value, selector: &Selector) -> SchemaResult<()> {
        ensure_valid(self.validate(container))?;
        if !self.is_mutable() {
            return Err(SchemaError::not_deletable());
        }
        let name = self.declared_attribute(selector)?;
        commit(
            container,
            |value| self.validate(value),
            |target| {
                if remove_entry(target, name)? {
                    Ok(())
                } else {
                    Err(SchemaError::bad_attribute(format!(
                        "attribute '{}' is not present",
                        name
                    )))
                }
            },
        )
    }

    /// Removes every declared attribute that is present.
    pub fn delete_values(&self, container: &mut Value) -> SchemaResult<()> {
        ensure_valid(self.validate(container))?;
        if !self.is_mutable() {
            return Err(SchemaError::not_deletable());
        }
        commit(
            container,
            |value| self.validate(value),
            |target| {
                for name in self.keys() {
                    remove_entry(target, name)?;
                }
                Ok(())
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::schema::core::Schema;
    use crate::schema::errors::SchemaErrorKind;

    use super::*;

    fn int_list(mutable: bool) -> ListSchema {
        ListSchema::new(Arc::new(Schema::of_type(ValueType::Int))).with_mutable(mutable)
    }

    fn point_dict(mutable: bool) -> DictSchema {
        let mut items = BTreeMap::new();
        items.insert("x".to_string(), Arc::new(Schema::of_type(ValueType::Int)));
        items.insert("y".to_string(), Arc::new(Schema::of_type(ValueType::Int)));
        DictSchema::new(items).with_mutable(mutable)
    }

    #[test]
    fn test_list_set_value_commits_valid_write() {
        let schema = int_list(true);
        let mut value = json!([1, 2, 3]);
        schema
            .set_value(&mut value, &Selector::Index(1), json!(20))
            .unwrap();
        assert_eq!(value, json!([1, 20, 3]));
    }

    #[test]
    fn test_list_set_value_rejects_invalid_write_unchanged() {
        let schema = int_list(true);
        let mut value = json!([1, 2, 3]);
        let err = schema
            .set_value(&mut value, &Selector::Index(1), json!("two"))
            .unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::Type);
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn test_list_set_value_never_appends() {
        let schema = int_list(true);
        let mut value = json!([1]);
        let err = schema
            .set_value(&mut value, &Selector::Index(3), json!(4))
            .unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::Index);
        assert_eq!(value, json!([1]));
    }

    #[test]
    fn test_immutable_gate_refuses_writes() {
        let schema = int_list(false);
        let mut value = json!([1]);

        let err = schema
            .set_value(&mut value, &Selector::Index(0), json!(2))
            .unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::NotSettable);

        let err = schema.delete_value(&mut value, &Selector::Index(0)).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::NotDeletable);
        assert_eq!(value, json!([1]));
    }

    #[test]
    fn test_invalid_container_wins_over_gate() {
        // Container invalid, gate closed, selector bad: validation reports first.
        let schema = int_list(false);
        let mut value = json!(["x"]);
        let err = schema
            .set_value(&mut value, &Selector::Key("a".to_string()), json!(1))
            .unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::Type);
    }

    #[test]
    fn test_gate_wins_over_selector() {
        let schema = int_list(false);
        let mut value = json!([1]);
        let err = schema
            .set_value(&mut value, &Selector::Key("a".to_string()), json!(1))
            .unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::NotSettable);
    }

    #[test]
    fn test_list_delete_respects_min_length() {
        let schema = int_list(true).with_min_length(2);
        let mut value = json!([1, 2]);
        let err = schema.delete_value(&mut value, &Selector::Index(0)).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::Value);
        assert_eq!(value, json!([1, 2]));
    }

    #[test]
    fn test_list_delete_values_clears() {
        let schema = int_list(true);
        let mut value = json!([1, 2, 3]);
        schema.delete_values(&mut value).unwrap();
        assert_eq!(value, json!([]));
    }

    #[test]
    fn test_dict_set_value_requires_declared_key() {
        let schema = point_dict(true);
        let mut value = json!({"x": 1, "y": 2});
        let err = schema
            .set_value(&mut value, &Selector::Key("z".to_string()), json!(3))
            .unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::Key);

        schema
            .set_value(&mut value, &Selector::Key("x".to_string()), json!(10))
            .unwrap();
        assert_eq!(value, json!({"x": 10, "y": 2}));
    }

    #[test]
    fn test_dict_set_values_batch() {
        let schema = point_dict(true);
        let mut value = json!({"x": 1, "y": 2});
        let mut batch = BTreeMap::new();
        batch.insert("x".to_string(), json!(10));
        batch.insert("y".to_string(), json!(20));
        schema.set_values(&mut value, batch).unwrap();
        assert_eq!(value, json!({"x": 10, "y": 20}));
    }

    #[test]
    fn test_dict_set_values_rejects_undeclared_key_when_strict() {
        let schema = point_dict(true);
        let mut value = json!({"x": 1, "y": 2});
        let mut batch = BTreeMap::new();
        batch.insert("z".to_string(), json!(3));
        let err = schema.set_values(&mut value, batch).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::Value);
        assert_eq!(value, json!({"x": 1, "y": 2}));
    }

    #[test]
    fn test_dict_delete_value_requires_presence() {
        let schema = point_dict(true).with_required_keys(["x"]);
        let mut value = json!({"x": 1});
        let err = schema
            .delete_value(&mut value, &Selector::Key("y".to_string()))
            .unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::Key);

        let mut value = json!({"x": 1, "y": 2});
        schema
            .delete_value(&mut value, &Selector::Key("y".to_string()))
            .unwrap();
        assert_eq!(value, json!({"x": 1}));
    }

    #[test]
    fn test_dict_delete_values_refused_when_keys_required() {
        let schema = point_dict(true);
        let mut value = json!({"x": 1, "y": 2});
        let err = schema.delete_values(&mut value).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::Value);
        assert_eq!(value, json!({"x": 1, "y": 2}));
    }

    #[test]
    fn test_attribute_delete_values_is_lenient() {
        let mut attributes = BTreeMap::new();
        attributes.insert("brightness".to_string(), Arc::new(Schema::of_type(ValueType::Int)));
        let schema = AttributeSchema::new("light", attributes).with_mutable(true);

        // One declared attribute present, one undeclared untouched.
        let mut value = json!({"brightness": 5, "color": "red"});
        schema.delete_values(&mut value).unwrap();
        assert_eq!(value, json!({"color": "red"}));
    }
}
