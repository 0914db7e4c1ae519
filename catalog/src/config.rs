//! Validation policy configuration.
//!
//! Defines the YAML-serializable configuration that controls how strictly
//! user values are checked against catalog definitions.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! validation:
//!   required: recursive
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use openstack_schema_core::{RequiredPolicy, ValidationOptions};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Validation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Whether nested `required` flags are enforced (`top_level` or
    /// `recursive`).
    #[serde(default)]
    pub required: RequiredPolicy,
}

/// Top-level policy configuration.
///
/// # Examples
///
/// ```
/// use openstack_schema_catalog::PolicyConfig;
/// use openstack_schema_core::RequiredPolicy;
///
/// let config: PolicyConfig = serde_yaml::from_str("version: \"1.0\"").unwrap();
/// assert_eq!(config.validation.required, RequiredPolicy::TopLevel);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Validation settings; defaults apply when the section is absent.
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            validation: ValidationConfig::default(),
        }
    }
}

impl PolicyConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::CatalogError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::CatalogError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::CatalogError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::CatalogError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Returns the core validation options described by this config.
    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            required: self.validation.required,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_recursive() {
        let yaml = r#"
version: "1.0"
validation:
  required: recursive
"#;
        let config: PolicyConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.validation.required, RequiredPolicy::Recursive);
        assert_eq!(config.validation_options(), ValidationOptions::recursive());
    }

    #[test]
    fn test_deserialize_minimal() {
        let config: PolicyConfig = serde_yaml::from_str("version: \"1.0\"\n").unwrap();
        assert_eq!(config, PolicyConfig::default());
        assert_eq!(config.validation_options(), ValidationOptions::default());
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let yaml = "version: \"1.0\"\nvalidation:\n  required: sometimes\n";
        assert!(serde_yaml::from_str::<PolicyConfig>(yaml).is_err());
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.yml");

        let original = PolicyConfig {
            version: "1.0".to_string(),
            validation: ValidationConfig {
                required: RequiredPolicy::Recursive,
            },
        };
        original.save(&path).unwrap();

        let loaded = PolicyConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }
}
