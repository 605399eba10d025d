//! Container schemas: homogeneous lists, fixed-key dicts, and object
//! attribute sets.
//!
//! Containers are the traversable layer. Beyond validation they support
//! selector checks, child schema lookup, and guarded reads. Child errors are
//! re-yielded with the container's own selector prepended, so paths build
//! bottom-up.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde_json::Value;

use super::core::Schema;
use super::errors::{ensure_valid, SchemaError, SchemaResult};
use super::path::Selector;
use super::types::ValueType;

/// What a declared but absent entry reads as.
static NULL: Value = Value::Null;

/// Accepts sequences whose items all satisfy one item schema, with optional
/// length bounds.
#[derive(Debug, Clone)]
pub struct ListSchema {
    item: Arc<Schema>,
    min_length: usize,
    max_length: Option<usize>,
    mutable: bool,
}

impl ListSchema {
    pub fn new(item: impl Into<Arc<Schema>>) -> Self {
        Self {
            item: item.into(),
            min_length: 0,
            max_length: None,
            mutable: false,
        }
    }

    /// Sets the minimum accepted length.
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Sets the maximum accepted length.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Opens or closes the mutability gate at construction time.
    pub fn with_mutable(mut self, mutable: bool) -> Self {
        self.mutable = mutable;
        self
    }

    /// Opens or closes the mutability gate.
    pub fn set_mutable(&mut self, mutable: bool) {
        self.mutable = mutable;
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    /// The schema every item must satisfy.
    pub fn item(&self) -> &Arc<Schema> {
        &self.item
    }

    pub fn validate(&self, value: &Value) -> Vec<SchemaError> {
        let items = match value.as_array() {
            Some(items) => items,
            None => return vec![SchemaError::wrong_type("array", ValueType::of(value))],
        };

        let mut errors = Vec::new();
        if items.len() < self.min_length {
            errors.push(SchemaError::invalid(format!(
                "length {} is less than minimum {}",
                items.len(),
                self.min_length
            )));
        }
        if let Some(max_length) = self.max_length {
            if items.len() > max_length {
                errors.push(SchemaError::invalid(format!(
                    "length {} is greater than maximum {}",
                    items.len(),
                    max_length
                )));
            }
        }
        for (index, item) in items.iter().enumerate() {
            for error in self.item.validate(item) {
                errors.push(error.prepend(Selector::Index(index)));
            }
        }
        errors
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        match value.as_array() {
            Some(items) => {
                items.len() >= self.min_length
                    && self.max_length.map_or(true, |max| items.len() <= max)
                    && items.iter().all(|item| self.item.is_valid(item))
            }
            None => false,
        }
    }

    /// Checks that a selector is shaped for a sequence. Bounds are a property
    /// of the value, not the schema, so they are not checked here.
    pub fn assert_valid_selector(&self, selector: &Selector) -> SchemaResult<()> {
        self.index_of(selector).map(|_| ())
    }

    /// The child schema a selector resolves to.
    pub fn get_schema(&self, selector: &Selector) -> SchemaResult<&Arc<Schema>> {
        self.index_of(selector)?;
        Ok(&self.item)
    }

    pub(crate) fn index_of(&self, selector: &Selector) -> SchemaResult<usize> {
        match selector {
            Selector::Index(index) => Ok(*index),
            Selector::Key(key) => Err(SchemaError::bad_index(format!(
                "selector '{}' is not a sequence index",
                key
            ))),
        }
    }

    /// Raw item lookup without validating the container first.
    pub(crate) fn element<'v>(&self, value: &'v Value, selector: &Selector) -> SchemaResult<&'v Value> {
        let index = self.index_of(selector)?;
        let items = value
            .as_array()
            .ok_or_else(|| SchemaError::wrong_type("array", ValueType::of(value)))?;
        items.get(index).ok_or_else(|| {
            SchemaError::bad_index(format!(
                "index {} is out of bounds for length {}",
                index,
                items.len()
            ))
        })
    }

    /// Reads one item after validating the whole container.
    pub fn get_value<'v>(&self, value: &'v Value, selector: &Selector) -> SchemaResult<&'v Value> {
        ensure_valid(self.validate(value))?;
        self.element(value, selector)
    }

    /// Reads all items after validating the whole container.
    pub fn get_values(&self, value: &Value) -> SchemaResult<Vec<Value>> {
        ensure_valid(self.validate(value))?;
        let items = value
            .as_array()
            .ok_or_else(|| SchemaError::wrong_type("array", ValueType::of(value)))?;
        Ok(items.to_vec())
    }
}

/// Accepts mappings with a declared key set.
///
/// Undeclared keys are rejected unless additional keys are allowed. Declared
/// keys are required unless the required set is narrowed. A declared but
/// absent key reads as null.
#[derive(Debug, Clone)]
pub struct DictSchema {
    items: BTreeMap<String, Arc<Schema>>,
    required_keys: Option<BTreeSet<String>>,
    allow_additional_keys: bool,
    mutable: bool,
}

impl DictSchema {
    pub fn new(items: BTreeMap<String, Arc<Schema>>) -> Self {
        Self {
            items,
            required_keys: None,
            allow_additional_keys: false,
            mutable: false,
        }
    }

    /// Narrows the required set. Declared keys outside it become optional.
    pub fn with_required_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Permits keys beyond the declared set. Such keys are not validated.
    pub fn with_additional_keys(mut self, allow: bool) -> Self {
        self.allow_additional_keys = allow;
        self
    }

    /// Opens or closes the mutability gate at construction time.
    pub fn with_mutable(mut self, mutable: bool) -> Self {
        self.mutable = mutable;
        self
    }

    /// Opens or closes the mutability gate.
    pub fn set_mutable(&mut self, mutable: bool) {
        self.mutable = mutable;
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// Declared keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    fn is_required(&self, key: &str) -> bool {
        self.required_keys
            .as_ref()
            .map_or(true, |required| required.contains(key))
    }

    pub fn validate(&self, value: &Value) -> Vec<SchemaError> {
        let object = match value.as_object() {
            Some(object) => object,
            None => return vec![SchemaError::wrong_type("object", ValueType::of(value))],
        };

        let mut errors = Vec::new();
        if !self.allow_additional_keys {
            let undeclared: Vec<&str> = object
                .keys()
                .filter(|key| !self.items.contains_key(key.as_str()))
                .map(String::as_str)
                .collect();
            if !undeclared.is_empty() {
                errors.push(SchemaError::undeclared_keys(undeclared));
            }
        }
        for (key, schema) in &self.items {
            match object.get(key) {
                Some(child) => {
                    for error in schema.validate(child) {
                        errors.push(error.prepend(Selector::Key(key.clone())));
                    }
                }
                None => {
                    if self.is_required(key) {
                        errors.push(SchemaError::missing_key(key));
                    }
                }
            }
        }
        errors
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        let object = match value.as_object() {
            Some(object) => object,
            None => return false,
        };
        if !self.allow_additional_keys
            && object.keys().any(|key| !self.items.contains_key(key.as_str()))
        {
            return false;
        }
        self.items.iter().all(|(key, schema)| match object.get(key) {
            Some(child) => schema.is_valid(child),
            None => !self.is_required(key),
        })
    }

    /// Checks that a selector names a declared key.
    pub fn assert_valid_selector(&self, selector: &Selector) -> SchemaResult<()> {
        self.declared_key(selector).map(|_| ())
    }

    /// The child schema a selector resolves to.
    pub fn get_schema(&self, selector: &Selector) -> SchemaResult<&Arc<Schema>> {
        let key = self.declared_key(selector)?;
        self.items
            .get(key)
            .ok_or_else(|| SchemaError::bad_key(format!("unknown key '{}'", key)))
    }

    pub(crate) fn declared_key<'s>(&self, selector: &'s Selector) -> SchemaResult<&'s str> {
        match selector {
            Selector::Key(key) if self.items.contains_key(key.as_str()) => Ok(key),
            Selector::Key(key) => Err(SchemaError::bad_key(format!("unknown key '{}'", key))),
            Selector::Index(index) => Err(SchemaError::bad_key(format!(
                "selector {} is not a mapping key",
                index
            ))),
        }
    }

    /// Raw entry lookup without validating the container first. A declared
    /// but absent key reads as null.
    pub(crate) fn entry<'v>(&self, value: &'v Value, selector: &Selector) -> SchemaResult<&'v Value> {
        let key = self.declared_key(selector)?;
        let object = value
            .as_object()
            .ok_or_else(|| SchemaError::wrong_type("object", ValueType::of(value)))?;
        Ok(object.get(key).unwrap_or(&NULL))
    }

    /// Reads one entry after validating the whole container.
    pub fn get_value<'v>(&self, value: &'v Value, selector: &Selector) -> SchemaResult<&'v Value> {
        ensure_valid(self.validate(value))?;
        self.entry(value, selector)
    }

    /// Reads all declared entries after validating the whole container.
    /// Absent optional keys are omitted, so a read-back writes the container
    /// back unchanged.
    pub fn get_values(&self, value: &Value) -> SchemaResult<BTreeMap<String, Value>> {
        ensure_valid(self.validate(value))?;
        let object = value
            .as_object()
            .ok_or_else(|| SchemaError::wrong_type("object", ValueType::of(value)))?;
        let mut values = BTreeMap::new();
        for key in self.items.keys() {
            if let Some(child) = object.get(key) {
                values.insert(key.clone(), child.clone());
            }
        }
        Ok(values)
    }
}

/// Accepts objects carrying a declared attribute set.
///
/// Unlike [`DictSchema`] this is lenient: attributes beyond the declared set
/// are ignored, declared attributes are validated only when present, and
/// selector failures use the attribute error kind, which composite traversal
/// does not fall back past.
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    type_name: String,
    attributes: BTreeMap<String, Arc<Schema>>,
    mutable: bool,
}

impl AttributeSchema {
    pub fn new(type_name: impl Into<String>, attributes: BTreeMap<String, Arc<Schema>>) -> Self {
        Self {
            type_name: type_name.into(),
            attributes,
            mutable: false,
        }
    }

    /// Opens or closes the mutability gate at construction time.
    pub fn with_mutable(mut self, mutable: bool) -> Self {
        self.mutable = mutable;
        self
    }

    /// Opens or closes the mutability gate.
    pub fn set_mutable(&mut self, mutable: bool) {
        self.mutable = mutable;
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// The type name used in error messages.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Declared attribute names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn validate(&self, value: &Value) -> Vec<SchemaError> {
        let object = match value.as_object() {
            Some(object) => object,
            None => return vec![SchemaError::wrong_type(&self.type_name, ValueType::of(value))],
        };

        let mut errors = Vec::new();
        for (name, schema) in &self.attributes {
            if let Some(child) = object.get(name) {
                for error in schema.validate(child) {
                    errors.push(error.prepend(Selector::Key(name.clone())));
                }
            }
        }
        errors
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        let object = match value.as_object() {
            Some(object) => object,
            None => return false,
        };
        self.attributes.iter().all(|(name, schema)| match object.get(name) {
            Some(child) => schema.is_valid(child),
            None => true,
        })
    }

    /// Checks that a selector names a declared attribute.
    pub fn assert_valid_selector(&self, selector: &Selector) -> SchemaResult<()> {
        self.declared_attribute(selector).map(|_| ())
    }

    /// The child schema a selector resolves to.
    pub fn get_schema(&self, selector: &Selector) -> SchemaResult<&Arc<Schema>> {
        let name = self.declared_attribute(selector)?;
        self.attributes.get(name).ok_or_else(|| {
            SchemaError::bad_attribute(format!("'{}' has no attribute '{}'", self.type_name, name))
        })
    }

    pub(crate) fn declared_attribute<'s>(&self, selector: &'s Selector) -> SchemaResult<&'s str> {
        match selector {
            Selector::Key(name) if self.attributes.contains_key(name.as_str()) => Ok(name),
            Selector::Key(name) => Err(SchemaError::bad_attribute(format!(
                "'{}' has no attribute '{}'",
                self.type_name, name
            ))),
            Selector::Index(index) => Err(SchemaError::bad_attribute(format!(
                "selector {} is not an attribute of '{}'",
                index, self.type_name
            ))),
        }
    }

    /// Raw attribute lookup without validating the container first. A
    /// declared but absent attribute reads as null.
    pub(crate) fn entry<'v>(&self, value: &'v Value, selector: &Selector) -> SchemaResult<&'v Value> {
        let name = self.declared_attribute(selector)?;
        let object = value
            .as_object()
            .ok_or_else(|| SchemaError::wrong_type(&self.type_name, ValueType::of(value)))?;
        Ok(object.get(name).unwrap_or(&NULL))
    }

    /// Reads one attribute after validating the whole container.
    pub fn get_value<'v>(&self, value: &'v Value, selector: &Selector) -> SchemaResult<&'v Value> {
        ensure_valid(self.validate(value))?;
        self.entry(value, selector)
    }

    /// Reads all declared attributes after validating the whole container.
    /// Absent attributes are omitted.
    pub fn get_values(&self, value: &Value) -> SchemaResult<BTreeMap<String, Value>> {
        ensure_valid(self.validate(value))?;
        let object = value
            .as_object()
            .ok_or_else(|| SchemaError::wrong_type(&self.type_name, ValueType::of(value)))?;
        let mut values = BTreeMap::new();
        for name in self.attributes.keys() {
            if let Some(child) = object.get(name) {
                values.insert(name.clone(), child.clone());
            }
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::schema::errors::SchemaErrorKind;
    use crate::schema::types::SchemaKind;

    use super::*;

    fn int_schema() -> Arc<Schema> {
        Arc::new(Schema::of_type(ValueType::Int))
    }

    fn point_dict() -> DictSchema {
        let mut items = BTreeMap::new();
        items.insert("x".to_string(), int_schema());
        items.insert("y".to_string(), int_schema());
        DictSchema::new(items)
    }

    #[test]
    fn test_list_validates_items_with_indexed_paths() {
        let schema = ListSchema::new(int_schema());
        let errors = schema.validate(&json!([1, "x", 3]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), SchemaErrorKind::Type);
        assert_eq!(errors[0].path().segments(), &[Selector::Index(1)]);
    }

    #[test]
    fn test_list_length_bounds() {
        let schema = ListSchema::new(int_schema())
            .with_min_length(2)
            .with_max_length(3);
        assert!(!schema.is_valid(&json!([1])));
        assert!(schema.is_valid(&json!([1, 2])));
        assert!(schema.is_valid(&json!([1, 2, 3])));
        assert!(!schema.is_valid(&json!([1, 2, 3, 4])));

        let errors = schema.validate(&json!([1]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), SchemaErrorKind::Value);
    }

    #[test]
    fn test_list_rejects_non_arrays() {
        let schema = ListSchema::new(int_schema());
        let errors = schema.validate(&json!({"0": 1}));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "expected array, got object");
    }

    #[test]
    fn test_list_get_value_checks_bounds() {
        let schema = ListSchema::new(int_schema());
        let value = json!([10, 20]);
        assert_eq!(schema.get_value(&value, &Selector::Index(1)).unwrap(), &json!(20));

        let err = schema.get_value(&value, &Selector::Index(5)).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::Index);
    }

    #[test]
    fn test_list_rejects_key_selector() {
        let schema = ListSchema::new(int_schema());
        let err = schema
            .assert_valid_selector(&Selector::Key("a".to_string()))
            .unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::Index);
    }

    #[test]
    fn test_list_get_value_refuses_invalid_container() {
        let schema = ListSchema::new(int_schema());
        let err = schema
            .get_value(&json!([1, "x"]), &Selector::Index(0))
            .unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::Type);
        assert_eq!(err.path().segments(), &[Selector::Index(1)]);
    }

    #[test]
    fn test_dict_validates_children_with_keyed_paths() {
        let schema = point_dict();
        let errors = schema.validate(&json!({"x": 1, "y": "two"}));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), SchemaErrorKind::Type);
        assert_eq!(errors[0].path().segments(), &[Selector::Key("y".to_string())]);
    }

    #[test]
    fn test_dict_rejects_undeclared_keys_by_default() {
        let schema = point_dict();
        let errors = schema.validate(&json!({"x": 1, "y": 2, "z": 3}));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), SchemaErrorKind::Value);
        assert!(errors[0].message().contains("z"));

        let open = point_dict().with_additional_keys(true);
        assert!(open.is_valid(&json!({"x": 1, "y": 2, "z": "anything"})));
    }

    #[test]
    fn test_dict_missing_required_key() {
        let schema = point_dict();
        let errors = schema.validate(&json!({"x": 1}));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path().segments(), &[Selector::Key("y".to_string())]);

        let relaxed = point_dict().with_required_keys(["x"]);
        assert!(relaxed.is_valid(&json!({"x": 1})));
    }

    #[test]
    fn test_dict_reports_all_independent_failures() {
        // Undeclared key and a missing required key at once.
        let schema = point_dict();
        let errors = schema.validate(&json!({"x": 1, "z": 3}));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_dict_absent_optional_key_reads_as_null() {
        let schema = point_dict().with_required_keys(["x"]);
        let value = json!({"x": 1});
        let read = schema.get_value(&value, &Selector::Key("y".to_string())).unwrap();
        assert_eq!(read, &Value::Null);
    }

    #[test]
    fn test_dict_get_values_omits_absent_keys() {
        let schema = point_dict().with_required_keys(["x"]);
        let values = schema.get_values(&json!({"x": 1})).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values.get("x"), Some(&json!(1)));
        assert!(!values.contains_key("y"));
    }

    #[test]
    fn test_dict_rejects_unknown_selector() {
        let schema = point_dict();
        let err = schema
            .get_value(&json!({"x": 1, "y": 2}), &Selector::Key("z".to_string()))
            .unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::Key);

        let err = schema
            .assert_valid_selector(&Selector::Index(0))
            .unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::Key);
    }

    #[test]
    fn test_dict_get_schema_resolves_declared_child() {
        let schema = point_dict();
        let child = schema.get_schema(&Selector::Key("x".to_string())).unwrap();
        assert_eq!(child.kind(), SchemaKind::Type);
    }

    #[test]
    fn test_attribute_ignores_undeclared_and_absent() {
        let mut attributes = BTreeMap::new();
        attributes.insert("brightness".to_string(), int_schema());
        let schema = AttributeSchema::new("light", attributes);

        // Undeclared attribute present, declared attribute absent.
        assert!(schema.is_valid(&json!({"color": "red"})));
        assert!(schema.validate(&json!({"color": "red"})).is_empty());
    }

    #[test]
    fn test_attribute_validates_present_attributes() {
        let mut attributes = BTreeMap::new();
        attributes.insert("brightness".to_string(), int_schema());
        let schema = AttributeSchema::new("light", attributes);

        let errors = schema.validate(&json!({"brightness": "high"}));
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].path().segments(),
            &[Selector::Key("brightness".to_string())]
        );
    }

    #[test]
    fn test_attribute_wrong_shape_names_the_type() {
        let schema = AttributeSchema::new("light", BTreeMap::new());
        let errors = schema.validate(&json!(42));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "expected light, got int");
    }

    #[test]
    fn test_attribute_selector_errors_use_attribute_kind() {
        let mut attributes = BTreeMap::new();
        attributes.insert("brightness".to_string(), int_schema());
        let schema = AttributeSchema::new("light", attributes);

        let err = schema
            .assert_valid_selector(&Selector::Key("hue".to_string()))
            .unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::Attribute);
        assert!(!err.is_lookup());
    }
}
