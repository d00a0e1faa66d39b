// SPDX-License-Identifier: GPL-3.0-only

//! Name-keyed driver registry
//!
//! Route selection over backend variants: each backend registers a
//! constructor under its driver name, and the orchestration layer
//! constructs whichever one its configuration names. Keeps every backend
//! self-contained behind the contract with no inheritance chains.

use std::collections::HashMap;
use std::sync::Arc;

use blockstore_contracts::{DriverError, StorageDriver};

use crate::config::DriverConfig;
use crate::memory::MemoryDriver;

/// Constructor for one driver variant.
///
/// Construction is cheap and infallible apart from configuration shape
/// problems; backend reachability is the business of `init`.
pub type DriverFactory =
    Box<dyn Fn(&DriverConfig) -> Result<Arc<dyn StorageDriver>, DriverError> + Send + Sync>;

/// Registry of driver constructors keyed by backend name
pub struct DriverRegistry {
    factories: HashMap<String, DriverFactory>,
}

impl DriverRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A registry seeded with the built-in drivers
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(MemoryDriver::DRIVER_NAME, |config| {
            Ok(Arc::new(MemoryDriver::new(config.clone())) as Arc<dyn StorageDriver>)
        });
        registry
    }

    /// Register a driver constructor under its backend name.
    ///
    /// A later registration under the same name replaces the earlier
    /// one, which lets deployments shadow a built-in.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&DriverConfig) -> Result<Arc<dyn StorageDriver>, DriverError>
            + Send
            + Sync
            + 'static,
    {
        let name = name.into();
        if self.factories.insert(name.clone(), Box::new(factory)).is_some() {
            tracing::warn!("Replacing existing driver registration: {}", name);
        }
    }

    /// Whether a driver is registered under the given name
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Names of all registered drivers, sorted
    pub fn driver_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Construct the driver the config names.
    ///
    /// The driver still needs `init` before serving operations.
    pub fn construct(&self, config: &DriverConfig) -> Result<Arc<dyn StorageDriver>, DriverError> {
        if config.driver.is_empty() {
            return Err(DriverError::invalid_argument(
                "driver config does not name a driver",
            ));
        }
        let factory = self.factories.get(&config.driver).ok_or_else(|| {
            DriverError::not_found(format!("no driver registered under \"{}\"", config.driver))
        })?;

        let driver = factory(config)?;
        tracing::info!("Constructed storage driver: {}", driver.name());
        Ok(driver)
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
