//! Error types for catalog loading.
//!
//! Provides a unified error type covering I/O, JSON/YAML parsing, definition
//! compilation and source resolution failures.

use std::path::PathBuf;

use openstack_schema_core::SchemaError;
use thiserror::Error;

/// Errors that can occur while loading a catalog or its configuration.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// An operation definition could not be compiled.
    #[error("invalid definition: {0}")]
    Schema(#[from] SchemaError),

    /// Two catalog files define the same operation.
    #[error("duplicate operation '{0}'")]
    DuplicateOperation(String),

    /// File extension is neither JSON nor YAML.
    #[error("unsupported catalog format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// All configured loader sources failed.
    #[error("no catalog sources available")]
    NoSourcesAvailable,
}

/// Convenience alias for results with [`CatalogError`].
pub type Result<T> = std::result::Result<T, CatalogError>;
