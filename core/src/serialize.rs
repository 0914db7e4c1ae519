//! Request assembly from validated user values.
//!
//! [`Operation::serialize`] distributes each supplied value to the channels
//! its parameter declares: JSON body, query string, headers, URL path, or a
//! raw body. Wire names (`sentAs`), prefixes and dotted `path` nesting are
//! applied here. No HTTP is performed; the result is a plain
//! [`RequestParts`] value for a transport layer to send.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::definition::Location;
use crate::operation::Operation;
use crate::parameter::{Parameter, Properties};
use crate::validate::{ValidationError, ValidationOptions};

/// Request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum Body {
    /// JSON document.
    Json(Value),
    /// Raw payload, sent as-is.
    Raw(String),
}

/// Everything needed to issue a request for one operation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestParts {
    /// Upper-case HTTP method.
    pub method: String,
    /// Path with `url` parameters substituted.
    pub path: String,
    /// Query pairs in parameter order.
    pub query: Vec<(String, String)>,
    /// Header pairs in parameter order.
    pub headers: Vec<(String, String)>,
    /// Request body, if any parameter targets one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

impl Operation {
    /// Validates `values` with default options and assembles the request.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`]; nothing is assembled for
    /// invalid input.
    pub fn serialize(&self, values: &Map<String, Value>) -> Result<RequestParts, ValidationError> {
        self.serialize_with(values, &ValidationOptions::default())
    }

    /// Validates `values` with `options` and assembles the request.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`].
    pub fn serialize_with(
        &self,
        values: &Map<String, Value>,
        options: &ValidationOptions,
    ) -> Result<RequestParts, ValidationError> {
        self.validate_with(values, options)?;

        let mut path = self.path().to_string();
        let mut query = Vec::new();
        let mut headers = Vec::new();
        let mut json = Map::new();
        let mut raw = None;

        for (name, param) in self.params() {
            let Some(value) = values.get(name) else {
                continue;
            };

            for location in param.locations() {
                match location {
                    Location::Json => stock_json(&mut json, param, value),
                    Location::Query => stock_query(&mut query, param, value),
                    Location::Header => stock_header(&mut headers, param, value),
                    Location::Url => {
                        let encoded = urlencoding::encode(&scalar_string(value)).into_owned();
                        for placeholder in [name, param.name()] {
                            path = path.replace(&format!("{{{placeholder}}}"), &encoded);
                        }
                    }
                    Location::Raw => raw = Some(scalar_string(value)),
                }
            }
        }

        let body = match raw {
            Some(raw) => Some(Body::Raw(raw)),
            None if json.is_empty() => None,
            None => Some(Body::Json(match self.json_key() {
                Some(key) => {
                    let mut wrapped = Map::new();
                    wrapped.insert(key.to_string(), Value::Object(json));
                    Value::Object(wrapped)
                }
                None => Value::Object(json),
            })),
        };

        debug!(
            operation = self.name(),
            query = query.len(),
            headers = headers.len(),
            has_body = body.is_some(),
            "assembled request"
        );

        Ok(RequestParts {
            method: self.method().to_string(),
            path,
            query,
            headers,
            body,
        })
    }
}

/// Inserts `value` into `target` under the parameter's wire name, nested
/// below its dotted path.
fn stock_json(target: &mut Map<String, Value>, param: &Parameter, value: &Value) {
    let mut node = target;
    for segment in param.path().split('.').filter(|s| !s.is_empty()) {
        let entry = node
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Some(map) = entry.as_object_mut() else {
            return;
        };
        node = map;
    }
    node.insert(param.name().to_string(), stock_value(param, value));
}

fn stock_value(param: &Parameter, value: &Value) -> Value {
    match value {
        Value::Array(items) => match param.item_schema() {
            Some(item_schema) => Value::Array(
                items
                    .iter()
                    .map(|item| stock_value(item_schema, item))
                    .collect(),
            ),
            None => value.clone(),
        },
        Value::Object(_) if param.is_free_form() => value.clone(),
        Value::Object(map) => match param.properties() {
            Properties::Declared(declared) if !declared.is_empty() => {
                let mut out = Map::new();
                for (key, child_value) in map {
                    match declared.get(key) {
                        Some(child) => stock_json(&mut out, child, child_value),
                        None => {
                            out.insert(key.clone(), child_value.clone());
                        }
                    }
                }
                Value::Object(out)
            }
            _ => value.clone(),
        },
        _ => value.clone(),
    }
}

fn stock_query(query: &mut Vec<(String, String)>, param: &Parameter, value: &Value) {
    match value {
        Value::Array(items) => {
            for item in items {
                query.push((param.name().to_string(), scalar_string(item)));
            }
        }
        _ => query.push((param.name().to_string(), scalar_string(value))),
    }
}

fn stock_header(headers: &mut Vec<(String, String)>, param: &Parameter, value: &Value) {
    match value {
        Value::Object(map) if param.is_free_form() => {
            for (key, item) in map {
                headers.push((format!("{}{key}", param.prefix()), scalar_string(item)));
            }
        }
        _ => headers.push((param.prefixed_name(), scalar_string(value))),
    }
}

/// Renders a value for a text channel (query, header, URL, raw body).
fn scalar_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
