//! API catalog loading with builder pattern and fallback chains.
//!
//! Provides [`ApiCatalog`] for in-memory operation lookup and
//! [`CatalogBuilder`] for constructing a catalog from multiple sources with
//! automatic fallback.
//!
//! # Catalog file format
//!
//! ```yaml
//! service: compute
//! version: v2
//! operations:
//!   getServer:
//!     method: GET
//!     path: servers/{id}
//!     params:
//!       id: { type: string, location: url, required: true }
//! ```
//!
//! # Loading patterns
//!
//! ```no_run
//! use openstack_schema_catalog::ApiCatalog;
//!
//! // A single YAML or JSON definition file
//! let catalog = ApiCatalog::from_file("catalogs/compute-v2.yaml").unwrap();
//! assert!(catalog.get("postServer").is_some());
//!
//! // Every definition file in a directory
//! let catalog = ApiCatalog::from_dir("catalogs/").unwrap();
//!
//! // A fallback chain
//! let catalog = ApiCatalog::builder()
//!     .from_dir("/etc/openstack-schema/catalogs")
//!     .from_file("catalogs/compute-v2.yaml")
//!     .build()
//!     .unwrap();
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use openstack_schema_core::{Operation, OperationDefinition};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CatalogError, Result};

/// On-disk encoding of a catalog file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Json,
    Yaml,
}

impl CatalogFormat {
    /// Infers the format from a file extension (`json`, `yaml`, `yml`).
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(Self::Json),
            Some("yaml" | "yml") => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Serialized form of a catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    /// Service type (e.g. `"compute"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// API version (e.g. `"v2"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Operation definitions keyed by operation name.
    #[serde(default)]
    pub operations: BTreeMap<String, OperationDefinition>,
}

/// Describes where an [`ApiCatalog`] was loaded from.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    /// Loaded from a single definition file.
    File(PathBuf),
    /// Loaded from a directory of definition files.
    Directory(PathBuf),
    /// Loaded from in-memory content.
    Inline,
    /// Loaded via a fallback chain of multiple sources.
    Multiple(Vec<CatalogSource>),
}

/// In-memory collection of compiled operations with O(1) lookup by name.
///
/// # Examples
///
/// ```
/// use openstack_schema_catalog::{ApiCatalog, CatalogFormat};
///
/// let yaml = r#"
/// service: compute
/// operations:
///   deleteServer:
///     method: DELETE
///     path: servers/{id}
///     params:
///       id: { type: string, location: url, required: true }
/// "#;
///
/// let catalog = ApiCatalog::parse(yaml, CatalogFormat::Yaml).unwrap();
/// assert_eq!(catalog.service(), Some("compute"));
/// assert_eq!(catalog.operations(), vec!["deleteServer"]);
/// ```
#[derive(Debug)]
pub struct ApiCatalog {
    service: Option<String>,
    version: Option<String>,
    operations: HashMap<String, Operation>,
    source: CatalogSource,
}

impl ApiCatalog {
    /// Returns a new [`CatalogBuilder`] for configuring a fallback chain.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Parses and compiles catalog content.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::JsonError`] or [`CatalogError::YamlError`] if
    /// the content does not parse, or [`CatalogError::Schema`] if a
    /// definition does not compile.
    pub fn parse(contents: &str, format: CatalogFormat) -> Result<Self> {
        let file: CatalogFile = match format {
            CatalogFormat::Json => serde_json::from_str(contents)?,
            CatalogFormat::Yaml => serde_yaml::from_str(contents)?,
        };
        Self::compile(file, CatalogSource::Inline)
    }

    /// Loads a single JSON or YAML definition file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnsupportedFormat`] for an unknown extension,
    /// [`CatalogError::IoError`] if the file cannot be read, and any error
    /// [`parse`](Self::parse) returns.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = read_catalog_file(path)?;
        let catalog = Self::compile(file, CatalogSource::File(path.to_path_buf()))?;
        debug!(path = %path.display(), operations = catalog.len(), "loaded catalog file");
        Ok(catalog)
    }

    /// Loads every `*.json`, `*.yaml` and `*.yml` file in a directory.
    ///
    /// Files with other extensions are skipped. Service and version are kept
    /// only when every file agrees on them.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateOperation`] if two files define the
    /// same operation, plus any error [`from_file`](Self::from_file) returns.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;
        files.sort();

        let mut merged: Option<CatalogFile> = None;
        for file_path in files {
            if CatalogFormat::from_path(&file_path).is_none() {
                debug!(path = %file_path.display(), "skipping non-catalog file");
                continue;
            }
            let file = read_catalog_file(&file_path)?;
            merged = Some(match merged {
                None => file,
                Some(mut acc) => {
                    if acc.service != file.service {
                        acc.service = None;
                    }
                    if acc.version != file.version {
                        acc.version = None;
                    }
                    for (name, definition) in file.operations {
                        if acc.operations.contains_key(&name) {
                            return Err(CatalogError::DuplicateOperation(name));
                        }
                        acc.operations.insert(name, definition);
                    }
                    acc
                }
            });
        }

        let catalog = Self::compile(
            merged.unwrap_or_default(),
            CatalogSource::Directory(path.to_path_buf()),
        )?;
        debug!(path = %path.display(), operations = catalog.len(), "loaded catalog directory");
        Ok(catalog)
    }

    fn compile(file: CatalogFile, source: CatalogSource) -> Result<Self> {
        let mut operations = HashMap::with_capacity(file.operations.len());
        for (name, definition) in file.operations {
            let operation = Operation::new(&name, definition)?;
            operations.insert(name, operation);
        }

        Ok(Self {
            service: file.service,
            version: file.version,
            operations,
            source,
        })
    }

    /// Looks up an operation by name.
    pub fn get(&self, operation: &str) -> Option<&Operation> {
        self.operations.get(operation)
    }

    /// Returns `true` if the catalog defines `operation`.
    pub fn contains(&self, operation: &str) -> bool {
        self.operations.contains_key(operation)
    }

    /// Returns the number of operations in the catalog.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` if the catalog defines no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Returns operation names in sorted order.
    pub fn operations(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operations.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns a reference to the source metadata.
    pub fn source(&self) -> &CatalogSource {
        &self.source
    }
}

fn read_catalog_file(path: &Path) -> Result<CatalogFile> {
    let format = CatalogFormat::from_path(path)
        .ok_or_else(|| CatalogError::UnsupportedFormat(path.to_path_buf()))?;
    let reader = std::io::BufReader::new(std::fs::File::open(path)?);
    let file = match format {
        CatalogFormat::Json => serde_json::from_reader(reader)?,
        CatalogFormat::Yaml => serde_yaml::from_reader(reader)?,
    };
    Ok(file)
}

/// Builder for constructing an [`ApiCatalog`] with a fallback chain.
///
/// Sources are tried in the order they are added. The first successful load
/// wins; if all fail, [`CatalogError::NoSourcesAvailable`] is returned.
pub struct CatalogBuilder {
    sources: Vec<CatalogSource>,
}

impl CatalogBuilder {
    /// Creates a new builder with no sources.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Adds a single definition file as a source.
    pub fn from_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(CatalogSource::File(path.into()));
        self
    }

    /// Adds a directory of definition files as a source.
    pub fn from_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(CatalogSource::Directory(path.into()));
        self
    }

    /// Attempts to load the catalog from configured sources in order.
    ///
    /// Returns the first successfully loaded catalog. If all sources fail,
    /// returns [`CatalogError::NoSourcesAvailable`].
    pub fn build(self) -> Result<ApiCatalog> {
        if self.sources.is_empty() {
            return Err(CatalogError::NoSourcesAvailable);
        }

        let all_sources = self.sources.clone();

        for source in &self.sources {
            let result = match source {
                CatalogSource::File(path) => ApiCatalog::from_file(path),
                CatalogSource::Directory(path) => ApiCatalog::from_dir(path),
                CatalogSource::Inline | CatalogSource::Multiple(_) => continue,
            };

            match result {
                Ok(mut catalog) => {
                    catalog.source = CatalogSource::Multiple(all_sources);
                    return Ok(catalog);
                }
                Err(err) => warn!(?source, error = %err, "catalog source failed, trying next"),
            }
        }

        Err(CatalogError::NoSourcesAvailable)
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPUTE_YAML: &str = r#"
service: compute
version: v2
operations:
  getServer:
    method: GET
    path: servers/{id}
    params:
      id: { type: string, location: url, required: true }
  getServers:
    method: GET
    path: servers
    params:
      limit: { type: integer, location: query }
"#;

    #[test]
    fn test_parse_yaml() {
        let catalog = ApiCatalog::parse(COMPUTE_YAML, CatalogFormat::Yaml).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.version(), Some("v2"));
        assert_eq!(catalog.operations(), vec!["getServer", "getServers"]);
        let op = catalog.get("getServer").unwrap();
        assert_eq!(op.name(), "getServer");
        assert!(op.param("id").unwrap().is_required());
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{"operations": {"listFlavors": {"method": "GET", "path": "flavors"}}}"#;
        let catalog = ApiCatalog::parse(json, CatalogFormat::Json).unwrap();

        assert!(catalog.contains("listFlavors"));
        assert!(catalog.service().is_none());
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let yaml = r#"
operations:
  getServers:
    method: GET
    path: servers
    params:
      limit: { type: long }
"#;
        assert!(ApiCatalog::parse(yaml, CatalogFormat::Yaml).is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            CatalogFormat::from_path(Path::new("a/compute.yml")),
            Some(CatalogFormat::Yaml)
        );
        assert_eq!(
            CatalogFormat::from_path(Path::new("compute.json")),
            Some(CatalogFormat::Json)
        );
        assert_eq!(CatalogFormat::from_path(Path::new("compute.toml")), None);
    }

    #[test]
    fn test_builder_no_sources() {
        let result = ApiCatalog::builder().build();
        assert!(matches!(result, Err(CatalogError::NoSourcesAvailable)));
    }

    #[test]
    fn test_builder_all_sources_fail() {
        let result = ApiCatalog::builder()
            .from_file("/nonexistent/compute.yaml")
            .from_dir("/nonexistent/catalogs")
            .build();
        assert!(matches!(result, Err(CatalogError::NoSourcesAvailable)));
    }
}
