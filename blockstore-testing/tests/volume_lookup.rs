//! Volume lookup consistency across the list-all and list-one views

use std::collections::BTreeSet;

use blockstore_contracts::{DriverErrorKind, RequestContext};
use blockstore_types::{CreateVolumeRequest, VolumeFilter};

use blockstore_testing::ready_memory_driver;

fn volume_request(name: &str) -> CreateVolumeRequest {
    CreateVolumeRequest {
        name: name.to_string(),
        size_gb: 8,
        ..Default::default()
    }
}

#[tokio::test]
async fn list_all_matches_individual_lookups() {
    let driver = ready_memory_driver().await.unwrap();
    let ctx = RequestContext::new();

    for name in ["data", "logs", "scratch"] {
        driver
            .create_volume(&ctx, &volume_request(name))
            .await
            .unwrap();
    }

    let all = driver
        .list_volumes(&ctx, &VolumeFilter::all())
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let mut individually_reachable = BTreeSet::new();
    for volume in &all {
        let found = driver
            .list_volumes(&ctx, &VolumeFilter::by_id(&volume.volume_id))
            .await
            .unwrap();
        assert_eq!(found.len(), 1, "id lookup must return exactly one volume");
        assert_eq!(found[0].volume_id, volume.volume_id);
        individually_reachable.insert(found[0].volume_id.clone());
    }

    let listed: BTreeSet<String> = all.into_iter().map(|v| v.volume_id).collect();
    assert_eq!(listed, individually_reachable);
}

#[tokio::test]
async fn unknown_volume_id_yields_empty_sequence() {
    let driver = ready_memory_driver().await.unwrap();
    let ctx = RequestContext::new();

    let found = driver
        .list_volumes(&ctx, &VolumeFilter::by_id("vol-does-not-exist"))
        .await
        .unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn created_volume_is_reachable_by_its_assigned_id() {
    let driver = ready_memory_driver().await.unwrap();
    let ctx = RequestContext::new();

    let created = driver
        .create_volume(&ctx, &volume_request("data"))
        .await
        .unwrap();

    let found = driver
        .list_volumes(&ctx, &VolumeFilter::by_id(&created.volume_id))
        .await
        .unwrap();
    assert!(found.iter().any(|v| v.volume_id == created.volume_id));
}

#[tokio::test]
async fn name_lookup_may_return_multiple_volumes() {
    let driver = ready_memory_driver().await.unwrap();
    let ctx = RequestContext::new();

    driver
        .create_volume(&ctx, &volume_request("shared"))
        .await
        .unwrap();
    driver
        .create_volume(&ctx, &volume_request("shared"))
        .await
        .unwrap();

    let found = driver
        .list_volumes(&ctx, &VolumeFilter::by_name("shared"))
        .await
        .unwrap();
    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn second_remove_of_a_volume_is_not_found() {
    let driver = ready_memory_driver().await.unwrap();
    let ctx = RequestContext::new();

    let volume = driver
        .create_volume(&ctx, &volume_request("transient"))
        .await
        .unwrap();

    driver.remove_volume(&ctx, &volume.volume_id).await.unwrap();
    let err = driver
        .remove_volume(&ctx, &volume.volume_id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, DriverErrorKind::NotFound);
}
