//! Compiled parameter schemas.
//!
//! A [`Parameter`] is built once from a [`ParameterDefinition`] and is
//! immutable afterwards. It owns its child schemas by value: an item schema
//! for arrays and a property table for objects.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use tracing::debug;

use crate::definition::{Location, ParamType, ParameterDefinition};

/// Errors raised while compiling a definition into a [`Parameter`].
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The definition mapping could not be deserialized (unknown type,
    /// unsupported location, wrong field shape).
    #[error("invalid parameter definition: {0}")]
    InvalidDefinition(#[from] serde_json::Error),

    /// `properties` on a non-free-form object is not a mapping.
    #[error("properties of '{0}' must be a mapping of names to definitions")]
    InvalidProperties(String),

    /// A property definition could not be compiled.
    #[error("property '{property}' of '{parent}': {source}")]
    InvalidProperty {
        /// Name of the owning parameter.
        parent: String,
        /// Key of the offending property.
        property: String,
        /// Underlying failure.
        #[source]
        source: Box<SchemaError>,
    },
}

/// Child schemas of an object parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Properties {
    /// No `properties` were declared; the object is an open map.
    Undeclared,
    /// Named child schemas, keyed by property name.
    Declared(BTreeMap<String, Parameter>),
}

/// Parameter schema: metadata accessors plus recursive validation.
///
/// # Examples
///
/// ```
/// use openstack_schema_core::Parameter;
/// use serde_json::json;
///
/// let param = Parameter::from_value(json!({
///     "name": "network",
///     "sentAs": "net_id",
///     "type": "string",
///     "location": "json",
///     "path": "server.networks"
/// }))
/// .unwrap();
///
/// assert_eq!(param.name(), "net_id");
/// assert_eq!(param.canonical_name(), "network");
/// assert_eq!(param.path(), "server.networks");
/// assert!(param.has_location("json"));
/// assert!(!param.has_location("query"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    sent_as: Option<String>,
    description: Option<String>,
    required: bool,
    path: Option<String>,
    prefix: Option<String>,
    locations: BTreeSet<Location>,
    param_type: Option<ParamType>,
    item_schema: Option<Box<Parameter>>,
    properties: Properties,
}

impl Parameter {
    /// Compiles a definition.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if `properties` has the wrong shape or any
    /// nested definition fails to compile.
    pub fn new(definition: ParameterDefinition) -> Result<Self, SchemaError> {
        let ParameterDefinition {
            name,
            sent_as,
            description,
            required,
            path,
            prefix,
            location,
            locations,
            param_type,
            items,
            properties,
        } = definition;

        let name = name.unwrap_or_default();

        let mut location_set: BTreeSet<Location> = location.into_iter().collect();
        location_set.extend(locations);
        if location_set.is_empty() {
            location_set.insert(Location::default());
        }

        let item_schema = match items {
            Some(items) => Some(Box::new(Parameter::new(*items)?)),
            None => None,
        };

        let properties = match properties {
            None => Properties::Undeclared,
            // Metadata properties are informational only; a table that does
            // not compile is dropped instead of failing the schema.
            Some(raw) if is_free_form_name(&name) => match compile_properties(&name, raw) {
                Ok(declared) => Properties::Declared(declared),
                Err(err) => {
                    debug!(name, error = %err, "ignoring metadata properties");
                    Properties::Undeclared
                }
            },
            Some(raw) => Properties::Declared(compile_properties(&name, raw)?),
        };

        Ok(Self {
            name,
            sent_as,
            description,
            required,
            path,
            prefix,
            locations: location_set,
            param_type,
            item_schema,
            properties,
        })
    }

    /// Deserializes and compiles a definition from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidDefinition`] for an unknown `type` or an
    /// unsupported `location`, and any error [`Parameter::new`] returns.
    pub fn from_value(value: serde_json::Value) -> Result<Self, SchemaError> {
        let definition: ParameterDefinition = serde_json::from_value(value)?;
        Self::new(definition)
    }

    /// Returns the wire name: `sentAs` if set, else the canonical name.
    pub fn name(&self) -> &str {
        self.sent_as.as_deref().unwrap_or(&self.name)
    }

    /// Returns the canonical name, ignoring `sentAs`.
    pub fn canonical_name(&self) -> &str {
        &self.name
    }

    /// Returns the wire-name override, if any.
    pub fn sent_as(&self) -> Option<&str> {
        self.sent_as.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the dotted nesting path, or an empty string when unset.
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or("")
    }

    pub fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or("")
    }

    /// Returns the wire name with the prefix prepended.
    ///
    /// # Examples
    ///
    /// ```
    /// use openstack_schema_core::Parameter;
    /// use serde_json::json;
    ///
    /// let param = Parameter::from_value(json!({
    ///     "name": "metadata",
    ///     "location": "header",
    ///     "prefix": "X-Object-Meta-"
    /// }))
    /// .unwrap();
    /// assert_eq!(param.prefixed_name(), "X-Object-Meta-metadata");
    /// ```
    pub fn prefixed_name(&self) -> String {
        format!("{}{}", self.prefix(), self.name())
    }

    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.locations.iter().copied()
    }

    /// Returns `true` if `location` is one of the declared channels.
    ///
    /// Unknown channel names are never declared, so they return `false`.
    pub fn has_location(&self, location: &str) -> bool {
        location
            .parse::<Location>()
            .is_ok_and(|loc| self.locations.contains(&loc))
    }

    pub fn param_type(&self) -> Option<ParamType> {
        self.param_type
    }

    /// Returns `true` for array parameters with an item schema.
    pub fn is_array(&self) -> bool {
        self.param_type == Some(ParamType::Array) && self.item_schema.is_some()
    }

    /// Returns `true` for object parameters with declared properties.
    pub fn is_object(&self) -> bool {
        self.param_type == Some(ParamType::Object)
            && matches!(&self.properties, Properties::Declared(map) if !map.is_empty())
    }

    /// Returns `true` for the `metadata` map, whose keys and values are not
    /// checked against declared properties.
    pub fn is_free_form(&self) -> bool {
        is_free_form_name(&self.name)
    }

    /// Returns the element schema of an array parameter.
    ///
    /// Returns `None` if the parameter is not typed `array` or declares no
    /// `items`.
    pub fn item_schema(&self) -> Option<&Parameter> {
        if self.param_type != Some(ParamType::Array) {
            return None;
        }
        self.item_schema.as_deref()
    }

    /// Returns the schema for property `key`, or `None` if `key` is not
    /// declared.
    ///
    /// # Examples
    ///
    /// ```
    /// use openstack_schema_core::Parameter;
    /// use serde_json::json;
    ///
    /// let network = Parameter::from_value(json!({
    ///     "name": "network",
    ///     "type": "object",
    ///     "properties": {"uuid": {"type": "string"}}
    /// }))
    /// .unwrap();
    ///
    /// assert_eq!(network.property("uuid").unwrap().name(), "uuid");
    /// assert!(network.property("port").is_none());
    /// ```
    pub fn property(&self, key: &str) -> Option<&Parameter> {
        match &self.properties {
            Properties::Undeclared => None,
            Properties::Declared(map) => map.get(key),
        }
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

/// Name of the one object parameter treated as an open key-value map.
const FREE_FORM_NAME: &str = "metadata";

fn is_free_form_name(name: &str) -> bool {
    name == FREE_FORM_NAME
}

fn compile_properties(
    parent: &str,
    raw: serde_json::Value,
) -> Result<BTreeMap<String, Parameter>, SchemaError> {
    let serde_json::Value::Object(map) = raw else {
        return Err(SchemaError::InvalidProperties(parent.to_string()));
    };

    let mut declared = BTreeMap::new();
    for (key, raw) in map {
        let child = compile_property(parent, &key, raw)?;
        declared.insert(key, child);
    }
    Ok(declared)
}

fn compile_property(
    parent: &str,
    key: &str,
    raw: serde_json::Value,
) -> Result<Parameter, SchemaError> {
    let wrap = |source: SchemaError| SchemaError::InvalidProperty {
        parent: parent.to_string(),
        property: key.to_string(),
        source: Box::new(source),
    };

    let mut definition: ParameterDefinition =
        serde_json::from_value(raw).map_err(|err| wrap(err.into()))?;
    if definition.name.is_none() {
        definition.name = Some(key.to_string());
    }
    Parameter::new(definition).map_err(wrap)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_default_location_is_json() {
        let param = Parameter::from_value(json!({"name": "name", "type": "string"})).unwrap();

        assert!(param.has_location("json"));
        assert_eq!(param.locations().collect::<Vec<_>>(), vec![Location::Json]);
    }

    #[test]
    fn test_location_and_locations_are_merged() {
        let param = Parameter::from_value(json!({
            "name": "marker",
            "location": "query",
            "locations": ["header"]
        }))
        .unwrap();

        assert!(param.has_location("query"));
        assert!(param.has_location("header"));
        assert!(!param.has_location("json"));
    }

    #[test]
    fn test_unknown_location_name_is_not_declared() {
        let param = Parameter::from_value(json!({"name": "name"})).unwrap();
        assert!(!param.has_location("foo"));
    }

    #[test]
    fn test_item_schema_requires_array_type() {
        let param = Parameter::from_value(json!({
            "name": "tags",
            "type": "string",
            "items": {"type": "string"}
        }))
        .unwrap();

        assert!(param.item_schema().is_none());
        assert!(!param.is_array());
    }

    #[test]
    fn test_declared_properties_take_key_as_name() {
        let param = Parameter::from_value(json!({
            "name": "network",
            "type": "object",
            "properties": {
                "uuid": {"type": "string"},
                "fixed_ip": {"type": "string", "name": "fixedIp", "sentAs": "fixed_ip"}
            }
        }))
        .unwrap();

        assert_eq!(param.property("uuid").unwrap().canonical_name(), "uuid");
        let fixed = param.property("fixed_ip").unwrap();
        assert_eq!(fixed.canonical_name(), "fixedIp");
        assert_eq!(fixed.name(), "fixed_ip");
        assert!(param.is_object());
    }

    #[test]
    fn test_metadata_with_non_table_properties_still_compiles() {
        let param = Parameter::from_value(json!({
            "name": "metadata",
            "type": "object",
            "properties": {"type": "string"}
        }))
        .unwrap();

        assert!(param.is_free_form());
        assert_eq!(param.properties(), &Properties::Undeclared);
        assert!(param.property("owner").is_none());
    }

    #[test]
    fn test_metadata_key_table_may_use_definition_field_names() {
        let param = Parameter::from_value(json!({
            "name": "metadata",
            "type": "object",
            "properties": {
                "type": {"type": "string"},
                "required": {"type": "boolean"}
            }
        }))
        .unwrap();

        assert!(param.is_free_form());
        assert_eq!(
            param.property("type").unwrap().param_type(),
            Some(ParamType::String)
        );
        assert_eq!(
            param.property("required").unwrap().param_type(),
            Some(ParamType::Boolean)
        );
    }

    #[test]
    fn test_only_exact_metadata_name_is_free_form() {
        for name in ["imageMetadata", "removeMetadata", "Metadata", "metadata_items"] {
            let param = Parameter::from_value(json!({"name": name, "type": "object"})).unwrap();
            assert!(!param.is_free_form(), "{name} should not be free-form");
        }
    }

    #[test]
    fn test_non_mapping_properties_are_rejected() {
        let result = Parameter::from_value(json!({
            "name": "server",
            "type": "object",
            "properties": ["a", "b"]
        }));

        assert!(matches!(result, Err(SchemaError::InvalidProperties(name)) if name == "server"));
    }

    #[test]
    fn test_nested_property_error_names_its_parent() {
        let result = Parameter::from_value(json!({
            "name": "server",
            "type": "object",
            "properties": {"flavor": {"type": "flavor"}}
        }));

        match result {
            Err(SchemaError::InvalidProperty { parent, property, .. }) => {
                assert_eq!(parent, "server");
                assert_eq!(property, "flavor");
            }
            other => panic!("expected InvalidProperty, got {other:?}"),
        }
    }

    #[test]
    fn test_prefix_defaults_to_empty() {
        let param = Parameter::from_value(json!({"name": "X-Auth-Token"})).unwrap();
        assert_eq!(param.prefix(), "");
        assert_eq!(param.prefixed_name(), "X-Auth-Token");
    }
}
