// SPDX-License-Identifier: GPL-3.0-only

//! Driver configuration
//!
//! A [`DriverConfig`] is handed to a driver factory at construction and
//! validated by the driver's `init`. The orchestration layer typically
//! deserializes it from a TOML fragment supplied by its own
//! configuration subsystem.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use blockstore_contracts::DriverError;

/// Identity of the local instance, as configured.
///
/// Backends that resolve instance identity from their own metadata
/// service may leave these unset; the built-in memory backend requires
/// `instance_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstanceConfig {
    /// Backend-assigned identifier of the local instance
    pub instance_id: Option<String>,

    /// Human-readable instance name
    pub name: Option<String>,

    /// Region the instance runs in
    pub region: Option<String>,

    /// Default availability zone for new volumes
    pub availability_zone: Option<String>,
}

/// Settings for constructing and initializing one driver
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DriverConfig {
    /// Registry key of the driver to construct
    pub driver: String,

    /// Local instance identity
    #[serde(default)]
    pub instance: InstanceConfig,

    /// Backend-specific settings, passed through uninterpreted
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl DriverConfig {
    /// Construct a config naming the given driver
    pub fn for_driver(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            ..Self::default()
        }
    }

    /// Parse a TOML fragment into a driver config
    pub fn from_toml_str(raw: &str) -> Result<Self, DriverError> {
        toml::from_str(raw)
            .map_err(|e| DriverError::invalid_argument(format!("invalid driver config: {e}")))
    }

    /// Look up a backend-specific option
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_toml_config() {
        let config = DriverConfig::from_toml_str(
            r#"
            driver = "memory"

            [instance]
            instance_id = "i-0a1b2c3d"
            region = "us-east-1"
            availability_zone = "us-east-1a"

            [options]
            endpoint = "http://localhost:9000"
            "#,
        )
        .unwrap();

        assert_eq!(config.driver, "memory");
        assert_eq!(config.instance.instance_id.as_deref(), Some("i-0a1b2c3d"));
        assert_eq!(config.option("endpoint"), Some("http://localhost:9000"));
        assert_eq!(config.option("missing"), None);
    }

    #[test]
    fn instance_and_options_default_to_empty() {
        let config = DriverConfig::from_toml_str("driver = \"memory\"").unwrap();
        assert_eq!(config.instance, InstanceConfig::default());
        assert!(config.options.is_empty());
    }

    #[test]
    fn malformed_toml_is_invalid_argument() {
        let err = DriverConfig::from_toml_str("driver = [").unwrap_err();
        assert_eq!(
            err.kind,
            blockstore_contracts::DriverErrorKind::InvalidArgument
        );
    }
}
