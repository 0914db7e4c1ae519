//! Loading of OpenStack API definition tables.
//!
//! This crate reads the static definition files that describe a service's
//! operations (method, path, parameter schemas) and compiles them into
//! [`Operation`](openstack_schema_core::Operation) values, plus the YAML
//! policy file that tunes validation.
//!
//! # Quick start
//!
//! ```no_run
//! use openstack_schema_catalog::{ApiCatalog, PolicyConfig};
//! use serde_json::json;
//!
//! let catalog = ApiCatalog::from_file("catalogs/compute-v2.yaml").unwrap();
//! let policy = PolicyConfig::load("policy.yml").unwrap_or_default();
//!
//! let op = catalog.get("postServer").unwrap();
//! let values = json!({"name": "web", "imageId": "img", "flavorId": "1"});
//! op.validate_with(values.as_object().unwrap(), &policy.validation_options())
//!     .unwrap();
//! ```

mod config;
mod error;
mod loader;

pub use config::{PolicyConfig, ValidationConfig};
pub use error::{CatalogError, Result};
pub use loader::{ApiCatalog, CatalogBuilder, CatalogFile, CatalogFormat, CatalogSource};
