//! End-to-end driver selection from a TOML config fragment

use blockstore_contracts::{DriverErrorKind, RequestContext};
use blockstore_drivers::{DriverConfig, DriverRegistry};

use blockstore_testing::init_tracing;

#[tokio::test]
async fn toml_config_selects_and_initializes_a_driver() {
    init_tracing();
    let config = DriverConfig::from_toml_str(
        r#"
        driver = "memory"

        [instance]
        instance_id = "i-from-toml"
        region = "eu-north-1"
        "#,
    )
    .unwrap();

    let registry = DriverRegistry::with_builtins();
    let driver = registry.construct(&config).unwrap();
    let ctx = RequestContext::new();
    driver.init(&ctx).await.unwrap();

    let instance = driver.get_instance(&ctx).await.unwrap();
    assert_eq!(instance.instance_id, "i-from-toml");
    assert_eq!(instance.region, "eu-north-1");
    assert_eq!(instance.provider_name, "memory");
}

#[tokio::test]
async fn init_rejects_config_without_instance_identity() {
    init_tracing();
    let config = DriverConfig::from_toml_str("driver = \"memory\"").unwrap();

    let registry = DriverRegistry::with_builtins();
    let driver = registry.construct(&config).unwrap();

    let err = driver.init(&RequestContext::new()).await.unwrap_err();
    assert_eq!(err.kind, DriverErrorKind::InvalidArgument);
}

#[test]
fn unknown_driver_name_does_not_construct() {
    init_tracing();
    let registry = DriverRegistry::with_builtins();
    let err = registry
        .construct(&DriverConfig::for_driver("iscsi"))
        .unwrap_err();
    assert_eq!(err.kind, DriverErrorKind::NotFound);
}
