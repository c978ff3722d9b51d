//! Registry configuration.
//!
//! [`RegistryConfig`] carries the process-wide naming settings the core
//! consumes. It is fixed when the coordinator and rewriter are constructed
//! and never re-read per call.
//!
//! ```
//! use registry_core::RegistryConfig;
//!
//! let config = RegistryConfig::new().audit_suffix("History");
//! assert_eq!(config.audit_collection("Teacher"), "Teacher_History");
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, RegistryResult};

/// Naming settings for audit collections and record identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Suffix appended to an entity type to name its audit collection.
    pub audit_suffix: String,
    /// Separator placed between the entity type and the suffix.
    pub audit_suffix_separator: String,
    /// Field holding a record's identifier in stored documents.
    pub uuid_property_name: String,
}

impl RegistryConfig {
    /// Create a configuration with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the audit collection suffix.
    pub fn audit_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.audit_suffix = suffix.into();
        self
    }

    /// Set the separator between entity type and audit suffix.
    pub fn audit_suffix_separator(mut self, separator: impl Into<String>) -> Self {
        self.audit_suffix_separator = separator.into();
        self
    }

    /// Set the identifier field name.
    pub fn uuid_property_name(mut self, name: impl Into<String>) -> Self {
        self.uuid_property_name = name.into();
        self
    }

    /// Name of the audit collection for `entity_type`.
    pub fn audit_collection(&self, entity_type: &str) -> String {
        format!(
            "{}{}{}",
            entity_type, self.audit_suffix_separator, self.audit_suffix
        )
    }

    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> RegistryResult<Self> {
        toml::from_str(text).map_err(|e| RegistryError::Config {
            reason: e.to_string(),
        })
    }

    /// Load a configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> RegistryResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| RegistryError::Config {
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&text)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            audit_suffix: "Audit".to_string(),
            audit_suffix_separator: "_".to_string(),
            uuid_property_name: "osid".to_string(),
        }
    }
}
