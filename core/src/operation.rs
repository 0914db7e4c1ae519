//! Operation definitions: a named parameter set for one API call.
//!
//! An [`Operation`] is where top-level `required` flags are enforced and
//! where keys the API does not define are rejected.
//!
//! # Examples
//!
//! ```
//! use openstack_schema_core::*;
//! use serde_json::json;
//!
//! let definition: OperationDefinition = serde_json::from_value(json!({
//!     "method": "POST",
//!     "path": "servers",
//!     "jsonKey": "server",
//!     "params": {
//!         "name": {"type": "string", "required": true},
//!         "imageId": {"type": "string", "sentAs": "imageRef"}
//!     }
//! }))
//! .unwrap();
//! let op = Operation::new("postServer", definition).unwrap();
//!
//! let values = json!({"name": "web", "imageId": "abc"});
//! assert!(op.validate(values.as_object().unwrap()).is_ok());
//!
//! let missing = json!({"imageId": "abc"});
//! assert!(op.validate(missing.as_object().unwrap()).is_err());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::definition::ParameterDefinition;
use crate::parameter::{Parameter, SchemaError};
use crate::validate::{ValidationError, ValidationOptions};

/// Raw declarative mapping for an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDefinition {
    /// HTTP method (e.g. `"POST"`).
    pub method: String,
    /// URL path template relative to the service endpoint, with `{name}`
    /// placeholders for `url` parameters.
    pub path: String,
    /// Key the JSON body is wrapped in (e.g. `"server"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_key: Option<String>,
    /// Parameter definitions keyed by canonical name.
    #[serde(default)]
    pub params: BTreeMap<String, ParameterDefinition>,
}

/// Compiled operation with its parameter schemas.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    name: String,
    method: String,
    path: String,
    json_key: Option<String>,
    params: BTreeMap<String, Parameter>,
}

impl Operation {
    /// Compiles every parameter of `definition`.
    ///
    /// A parameter without an explicit `name` takes its map key.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidProperty`] naming the operation and the
    /// parameter that failed to compile.
    pub fn new(name: &str, definition: OperationDefinition) -> Result<Self, SchemaError> {
        let mut params = BTreeMap::new();
        for (key, mut param_def) in definition.params {
            if param_def.name.is_none() {
                param_def.name = Some(key.clone());
            }
            let param = Parameter::new(param_def).map_err(|source| SchemaError::InvalidProperty {
                parent: name.to_string(),
                property: key.clone(),
                source: Box::new(source),
            })?;
            params.insert(key, param);
        }

        Ok(Self {
            name: name.to_string(),
            method: definition.method.to_uppercase(),
            path: definition.path,
            json_key: definition.json_key,
            params,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn json_key(&self) -> Option<&str> {
        self.json_key.as_deref()
    }

    /// Looks up a parameter by canonical name.
    pub fn param(&self, name: &str) -> Option<&Parameter> {
        self.params.get(name)
    }

    /// Iterates parameters in canonical-name order.
    pub fn params(&self) -> impl Iterator<Item = (&str, &Parameter)> {
        self.params.iter().map(|(name, param)| (name.as_str(), param))
    }

    /// Validates user values with default options.
    ///
    /// # Errors
    ///
    /// See [`validate_with`](Self::validate_with).
    pub fn validate(&self, values: &Map<String, Value>) -> Result<(), ValidationError> {
        self.validate_with(values, &ValidationOptions::default())
    }

    /// Validates user values keyed by canonical parameter name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedKeys`] if any key is not a
    /// parameter of this operation, [`ValidationError::MissingRequired`] if
    /// a required parameter is absent, or the first error from validating an
    /// individual parameter.
    pub fn validate_with(
        &self,
        values: &Map<String, Value>,
        options: &ValidationOptions,
    ) -> Result<(), ValidationError> {
        debug!(operation = %self.name, keys = values.len(), "validating operation input");

        let mut unsupported: Vec<String> = values
            .keys()
            .filter(|key| !self.params.contains_key(key.as_str()))
            .cloned()
            .collect();
        if !unsupported.is_empty() {
            unsupported.sort();
            return Err(ValidationError::UnsupportedKeys { keys: unsupported });
        }

        for (name, param) in &self.params {
            match values.get(name) {
                Some(value) => param.validate_with(value, options)?,
                None if param.is_required() => {
                    return Err(ValidationError::MissingRequired {
                        path: String::new(),
                        name: name.clone(),
                    });
                }
                None => {}
            }
        }

        Ok(())
    }
}
