//! Declarative parameter definitions.
//!
//! This module defines the serde data model for the static API definition
//! tables that describe OpenStack operations. A [`ParameterDefinition`] is the
//! raw mapping (`name`, `sentAs`, `type`, `items`, `properties`, ...) before it
//! is compiled into a [`Parameter`](crate::Parameter). The types round-trip
//! through JSON and YAML.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Declared value type of a parameter.
///
/// Absence of a type (`None` on the definition) means the parameter accepts
/// any value.
///
/// # Examples
///
/// ```
/// use openstack_schema_core::ParamType;
///
/// let ty: ParamType = serde_json::from_str("\"array\"").unwrap();
/// assert_eq!(ty, ParamType::Array);
///
/// // Common aliases are accepted
/// let ty: ParamType = serde_json::from_str("\"double\"").unwrap();
/// assert_eq!(ty, ParamType::Number);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// JSON string.
    String,
    /// JSON number with no fractional part.
    #[serde(alias = "int")]
    Integer,
    /// Any JSON number.
    #[serde(alias = "double", alias = "float")]
    Number,
    /// JSON boolean.
    #[serde(alias = "bool")]
    Boolean,
    /// Ordered sequence; elements are described by `items`.
    Array,
    /// Key-value mapping; keys are described by `properties`.
    Object,
    /// JSON null.
    Null,
}

impl ParamType {
    /// Returns the lowercase name used in definition tables.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Null => "null",
        }
    }

    /// Returns `true` for the non-decomposable types.
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            Self::String | Self::Integer | Self::Number | Self::Boolean
        )
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transmission channel of a parameter within a request.
///
/// # Examples
///
/// ```
/// use openstack_schema_core::Location;
///
/// assert_eq!(Location::default(), Location::Json);
/// assert_eq!("query".parse::<Location>(), Ok(Location::Query));
/// assert!("cookie".parse::<Location>().is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// Request body, as a JSON document (the default).
    #[default]
    Json,
    /// URL query string.
    Query,
    /// HTTP header.
    Header,
    /// Placeholder in the operation's URL path.
    Url,
    /// Raw request body.
    Raw,
}

impl Location {
    /// Returns the lowercase name used in definition tables.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Query => "query",
            Self::Header => "header",
            Self::Url => "url",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "query" => Ok(Self::Query),
            "header" => Ok(Self::Header),
            "url" => Ok(Self::Url),
            "raw" => Ok(Self::Raw),
            other => Err(other.to_string()),
        }
    }
}

/// Raw declarative mapping for a single parameter.
///
/// Unrecognized keys are ignored. `location` and `locations` are both
/// accepted; they are merged when the parameter is compiled. `properties` is
/// kept as an untyped JSON value because its meaning depends on the owning
/// parameter: it maps property names to definitions, except on `metadata`,
/// where a value of any other shape is ignored instead of rejected.
///
/// # Examples
///
/// ```
/// use openstack_schema_core::{ParamType, ParameterDefinition};
///
/// let def: ParameterDefinition = serde_json::from_value(serde_json::json!({
///     "type": "array",
///     "sentAs": "net_id",
///     "items": {"type": "string"},
///     "x-unknown": true
/// }))
/// .unwrap();
///
/// assert_eq!(def.param_type, Some(ParamType::Array));
/// assert_eq!(def.sent_as.as_deref(), Some("net_id"));
/// assert!(def.items.is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDefinition {
    /// Canonical identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Wire-name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_as: Option<String>,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the value must be supplied.
    #[serde(default)]
    pub required: bool,
    /// Dotted nesting path for the JSON body (e.g. `"server.addresses"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Prefix prepended to the wire name, used by header parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Single transmission channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Additional transmission channels.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    /// Declared value type.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<ParamType>,
    /// Element definition for arrays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ParameterDefinition>>,
    /// Child definitions for objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
}

impl ParameterDefinition {
    /// Creates a definition with a name and type.
    pub fn new(name: &str, param_type: ParamType) -> Self {
        Self {
            name: Some(name.to_string()),
            param_type: Some(param_type),
            ..Default::default()
        }
    }

    /// Marks the definition as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the wire-name override.
    pub fn with_sent_as(mut self, sent_as: &str) -> Self {
        self.sent_as = Some(sent_as.to_string());
        self
    }

    /// Sets the single transmission channel.
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Sets the dotted nesting path.
    pub fn with_path(mut self, path: &str) -> Self {
        self.path = Some(path.to_string());
        self
    }

    /// Sets the element definition.
    pub fn with_items(mut self, items: ParameterDefinition) -> Self {
        self.items = Some(Box::new(items));
        self
    }
}
