//! Declarative parameter schemas for OpenStack API operations.
//!
//! This crate turns the static definition tables that describe an API call
//! into typed schemas and checks user-supplied values against them:
//!
//! - [`ParameterDefinition`] — the raw mapping (`name`, `sentAs`, `type`,
//!   `items`, `properties`, `location`, ...) as found in definition files.
//! - [`Parameter`] — a compiled, immutable schema with metadata accessors
//!   and recursive validation.
//! - [`Operation`] — a named parameter set for one API call; enforces
//!   top-level `required` flags and rejects unknown keys.
//! - [`RequestParts`] — the query, headers, URL path and body produced by
//!   [`Operation::serialize`].
//!
//! Validation ([`Parameter::validate`], [`Operation::validate`]) is
//! fail-fast and performs no coercion. Nested `required` flags are enforced
//! only under [`RequiredPolicy::Recursive`].
//!
//! # Example
//!
//! ```
//! use openstack_schema_core::*;
//! use serde_json::json;
//!
//! let networks = Parameter::from_value(json!({
//!     "name": "networks",
//!     "type": "array",
//!     "items": {
//!         "type": "object",
//!         "properties": {
//!             "uuid": {"type": "string"},
//!             "port": {"type": "string"}
//!         }
//!     }
//! }))
//! .unwrap();
//!
//! let network = networks.item_schema().unwrap();
//! assert!(network.property("uuid").is_some());
//!
//! assert!(networks.validate(&json!([{"uuid": "abc"}])).is_ok());
//! assert!(networks.validate(&json!([{"name": false}])).is_err());
//! ```

mod definition;
mod operation;
mod parameter;
mod serialize;
mod validate;

pub use definition::{Location, ParamType, ParameterDefinition};
pub use operation::{Operation, OperationDefinition};
pub use parameter::{Parameter, Properties, SchemaError};
pub use serialize::{Body, RequestParts};
pub use validate::{RequiredPolicy, ValidationError, ValidationOptions};
