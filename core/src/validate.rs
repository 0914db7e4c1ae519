//! Value validation against parameter schemas.
//!
//! Validation is fail-fast: the first mismatch is returned and nothing is
//! collected or coerced. A numeric string is not an integer and an integer is
//! not a string.
//!
//! # Examples
//!
//! ```
//! use openstack_schema_core::*;
//! use serde_json::json;
//!
//! let networks = Parameter::from_value(json!({
//!     "name": "networks",
//!     "type": "array",
//!     "items": {"type": "string"}
//! }))
//! .unwrap();
//!
//! assert!(networks.validate(&json!(["1", "2", "3"])).is_ok());
//!
//! // Not a sequence
//! let err = networks.validate(&json!("a_network!")).unwrap_err();
//! assert!(matches!(err, ValidationError::WrongType { .. }));
//! ```

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::trace;

use crate::definition::ParamType;
use crate::parameter::{Parameter, Properties};

/// Validation failures.
///
/// Every variant carries the location of the offending value, rendered as a
/// dotted path with array indices (e.g. `networks[1].uuid`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The value's JSON type does not match the declared type.
    #[error("'{path}' has the wrong value type: expected {expected}, found {found}")]
    WrongType {
        /// Location of the value.
        path: String,
        /// Declared type.
        expected: ParamType,
        /// JSON type of the supplied value.
        found: &'static str,
    },
    /// An object contains a key with no declared property.
    #[error("'{path}' contains undefined property '{key}'")]
    UndefinedProperty {
        /// Location of the object.
        path: String,
        /// The undeclared key.
        key: String,
    },
    /// A required parameter or property was not supplied.
    #[error("'{name}' is required but was not provided (at '{path}')")]
    MissingRequired {
        /// Location of the enclosing object, empty at the top level.
        path: String,
        /// Name of the absent parameter.
        name: String,
    },
    /// Top-level keys that the operation does not define.
    #[error("the following keys are not supported: {}", keys.join(", "))]
    UnsupportedKeys {
        /// Offending keys, sorted.
        keys: Vec<String>,
    },
}

/// Whether `required` flags below the top level are enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredPolicy {
    /// Only operation-level parameters are checked for presence (the
    /// default).
    #[default]
    TopLevel,
    /// Required properties of nested objects must also be present.
    Recursive,
}

/// Options controlling [`Parameter::validate_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationOptions {
    /// Presence checks for nested `required` properties.
    pub required: RequiredPolicy,
}

impl ValidationOptions {
    /// Options that enforce `required` at every depth.
    pub fn recursive() -> Self {
        Self {
            required: RequiredPolicy::Recursive,
        }
    }
}

impl Parameter {
    /// Validates `value` with default options.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        self.validate_with(value, &ValidationOptions::default())
    }

    /// Validates `value` with explicit options.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn validate_with(
        &self,
        value: &Value,
        options: &ValidationOptions,
    ) -> Result<(), ValidationError> {
        self.check(value, self.canonical_name(), options)
    }

    fn check(
        &self,
        value: &Value,
        path: &str,
        options: &ValidationOptions,
    ) -> Result<(), ValidationError> {
        trace!(path, param_type = ?self.param_type(), "validating parameter");

        let Some(expected) = self.param_type() else {
            return Ok(());
        };

        if !matches_type(expected, value) {
            return Err(ValidationError::WrongType {
                path: path.to_string(),
                expected,
                found: json_type_name(value),
            });
        }

        match value {
            Value::Array(elements) => {
                if let Some(item_schema) = self.item_schema() {
                    for (index, element) in elements.iter().enumerate() {
                        item_schema.check(element, &format!("{path}[{index}]"), options)?;
                    }
                }
                Ok(())
            }
            Value::Object(map) => self.check_object(map, path, options),
            _ => Ok(()),
        }
    }

    fn check_object(
        &self,
        map: &Map<String, Value>,
        path: &str,
        options: &ValidationOptions,
    ) -> Result<(), ValidationError> {
        // Metadata maps accept arbitrary keys and values.
        if self.is_free_form() {
            return Ok(());
        }

        let declared = match self.properties() {
            Properties::Declared(declared) if !declared.is_empty() => declared,
            _ => return Ok(()),
        };

        for (key, value) in map {
            let Some(child) = declared.get(key) else {
                return Err(ValidationError::UndefinedProperty {
                    path: path.to_string(),
                    key: key.clone(),
                });
            };
            child.check(value, &join(path, key), options)?;
        }

        if options.required == RequiredPolicy::Recursive {
            if let Some((key, _)) = declared
                .iter()
                .find(|(key, child)| child.is_required() && !map.contains_key(key.as_str()))
            {
                return Err(ValidationError::MissingRequired {
                    path: path.to_string(),
                    name: key.clone(),
                });
            }
        }

        Ok(())
    }
}

fn matches_type(expected: ParamType, value: &Value) -> bool {
    match expected {
        ParamType::String => value.is_string(),
        ParamType::Integer => value.is_i64() || value.is_u64(),
        ParamType::Number => value.is_number(),
        ParamType::Boolean => value.is_boolean(),
        ParamType::Array => value.is_array(),
        ParamType::Object => value.is_object(),
        ParamType::Null => value.is_null(),
    }
}

/// Returns the JSON type name of `value` for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn server_schema() -> Parameter {
        Parameter::from_value(json!({
            "name": "server",
            "type": "object",
            "properties": {
                "name": {"type": "string", "required": true},
                "min_count": {"type": "integer"},
                "networks": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "uuid": {"type": "string", "required": true},
                            "port": {"type": "string"}
                        }
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_untyped_accepts_anything() {
        let param = Parameter::from_value(json!({"name": "anything"})).unwrap();

        for value in [json!(null), json!(1), json!("x"), json!([1]), json!({"a": 1})] {
            assert!(param.validate(&value).is_ok());
        }
    }

    #[test]
    fn test_no_coercion_between_scalars() {
        let count = Parameter::from_value(json!({"name": "count", "type": "integer"})).unwrap();
        let label = Parameter::from_value(json!({"name": "label", "type": "string"})).unwrap();

        assert!(count.validate(&json!(3)).is_ok());
        assert!(count.validate(&json!("3")).is_err());
        assert!(count.validate(&json!(3.5)).is_err());
        assert!(label.validate(&json!(3)).is_err());
    }

    #[test]
    fn test_number_accepts_integers_and_floats() {
        let ratio = Parameter::from_value(json!({"name": "ratio", "type": "number"})).unwrap();

        assert!(ratio.validate(&json!(1)).is_ok());
        assert!(ratio.validate(&json!(1.5)).is_ok());
        assert!(ratio.validate(&json!(true)).is_err());
    }

    #[test]
    fn test_error_path_points_at_nested_element() {
        let err = server_schema()
            .validate(&json!({
                "name": "web",
                "networks": [{"uuid": "a"}, {"uuid": 7}]
            }))
            .unwrap_err();

        assert_eq!(
            err,
            ValidationError::WrongType {
                path: "server.networks[1].uuid".to_string(),
                expected: ParamType::String,
                found: "integer",
            }
        );
    }

    #[test]
    fn test_undefined_property_reports_key() {
        let err = server_schema()
            .validate(&json!({"name": "web", "flavor": "m1.small"}))
            .unwrap_err();

        assert_eq!(
            err,
            ValidationError::UndefinedProperty {
                path: "server".to_string(),
                key: "flavor".to_string(),
            }
        );
    }

    #[test]
    fn test_nested_required_not_enforced_by_default() {
        let result = server_schema().validate(&json!({"networks": [{"port": "p1"}]}));
        assert!(result.is_ok());
    }

    #[test]
    fn test_recursive_policy_enforces_nested_required() {
        let options = ValidationOptions::recursive();

        let err = server_schema()
            .validate_with(&json!({"name": "web", "networks": [{"port": "p1"}]}), &options)
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequired {
                path: "server.networks[0]".to_string(),
                name: "uuid".to_string(),
            }
        );

        let err = server_schema()
            .validate_with(&json!({}), &options)
            .unwrap_err();
        assert!(matches!(err, ValidationError::MissingRequired { name, .. } if name == "name"));
    }

    #[test]
    fn test_object_without_properties_is_open() {
        let param = Parameter::from_value(json!({"name": "extra", "type": "object"})).unwrap();
        assert!(param.validate(&json!({"anything": [1, 2]})).is_ok());
        assert!(param.validate(&json!([])).is_err());
    }

    #[test]
    fn test_metadata_checks_outer_type_only() {
        let param = Parameter::from_value(json!({
            "name": "metadata",
            "type": "object",
            "properties": {"role": {"type": "string"}}
        }))
        .unwrap();

        assert!(param.validate(&json!({"any_key": "v"})).is_ok());
        assert!(param.validate(&json!({"role": 1})).is_ok());
        assert!(param.validate(&json!({"count": 1, "nested": {"a": [1, 2]}})).is_ok());
        assert!(param.validate(&json!("role=db")).is_err());
    }

    #[test]
    fn test_metadata_like_names_are_checked_per_key() {
        let param = Parameter::from_value(json!({
            "name": "imageMetadata",
            "type": "object",
            "properties": {"foo": {"type": "string"}}
        }))
        .unwrap();

        assert_eq!(
            param.validate(&json!({"bar": "baz"})).unwrap_err(),
            ValidationError::UndefinedProperty {
                path: "imageMetadata".to_string(),
                key: "bar".to_string(),
            }
        );
        assert!(matches!(
            param.validate(&json!({"foo": 1})),
            Err(ValidationError::WrongType { path, .. }) if path == "imageMetadata.foo"
        ));
    }

    #[test]
    fn test_null_matches_only_null_type() {
        let param = Parameter::from_value(json!({"name": "n", "type": "null"})).unwrap();
        assert!(param.validate(&json!(null)).is_ok());

        let typed = Parameter::from_value(json!({"name": "s", "type": "string"})).unwrap();
        assert!(typed.validate(&json!(null)).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = ValidationError::UnsupportedKeys {
            keys: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "the following keys are not supported: a, b");
    }
}
