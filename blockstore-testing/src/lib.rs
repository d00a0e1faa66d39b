//! Shared fixtures for the blockstore integration suites
//!
//! Every suite drives the contract end-to-end: a config names the
//! driver, the registry constructs it, `init` brings it up, and the
//! assertions run against the trait object only.

use std::sync::Arc;
use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt};

use blockstore_contracts::{RequestContext, StorageDriver};
use blockstore_drivers::{DriverConfig, DriverRegistry, InstanceConfig};

/// Instance id every fixture driver runs as
pub const FIXTURE_INSTANCE_ID: &str = "i-fixture";

static TRACING: Once = Once::new();

/// Initialize logging to stderr once per test binary
pub fn init_tracing() {
    TRACING.call_once(|| {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("blockstore_drivers=info,warn")),
            )
            .with_writer(std::io::stderr)
            .init();
    });
}

/// A memory-driver config with a complete instance identity
pub fn memory_config() -> DriverConfig {
    DriverConfig {
        driver: "memory".to_string(),
        instance: InstanceConfig {
            instance_id: Some(FIXTURE_INSTANCE_ID.to_string()),
            name: Some("fixture".to_string()),
            region: Some("us-test-1".to_string()),
            availability_zone: Some("us-test-1a".to_string()),
        },
        options: Default::default(),
    }
}

/// Construct and initialize a memory driver through the registry
pub async fn ready_memory_driver() -> anyhow::Result<Arc<dyn StorageDriver>> {
    init_tracing();
    let registry = DriverRegistry::with_builtins();
    let driver = registry.construct(&memory_config())?;
    driver.init(&RequestContext::new()).await?;
    Ok(driver)
}
