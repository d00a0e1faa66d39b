// SPDX-License-Identifier: GPL-3.0-only

//! In-process reference backend
//!
//! Implements the whole driver contract against tables held in memory.
//! Serves as the conformance target for the integration suites and as a
//! stand-in backend for orchestration development. Provisioning is
//! synchronous, so created entities come back `available`; callers must
//! still tolerate `provisioning` results from real providers.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use blockstore_contracts::{DriverError, RequestContext, StorageDriver};
use blockstore_types::{
    AttachmentStatus, BlockDevice, CopySnapshotRequest, CreateVolumeRequest, Instance,
    ProvisionState, Snapshot, SnapshotFilter, Volume, VolumeAttachment, VolumeFilter,
    next_device_info,
};

use crate::config::DriverConfig;

const CLIENT_TOOL_NAME: &str = "blockstore-memory.sh";
const CLIENT_TOOL: &[u8] = include_bytes!("../resources/blockstore-memory.sh");

#[derive(Default)]
struct MemoryState {
    /// Set by `init`; its presence is the initialization marker
    instance: Option<Instance>,
    volumes: BTreeMap<String, Volume>,
    snapshots: BTreeMap<String, Snapshot>,
}

/// Reference driver backed by in-process state.
///
/// Requires `instance.instance_id` in its configuration; region defaults
/// to "local" when unset. All tables sit behind one async mutex, so
/// concurrent callers see a consistent view without any caller-visible
/// locking.
pub struct MemoryDriver {
    config: DriverConfig,
    state: Mutex<MemoryState>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn require_instance(state: &MemoryState) -> Result<&Instance, DriverError> {
    state
        .instance
        .as_ref()
        .ok_or_else(|| DriverError::not_initialized("memory driver is not initialized"))
}

impl MemoryDriver {
    pub const DRIVER_NAME: &'static str = "memory";

    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Check the context, take the state lock, and require `init`.
    async fn ready(&self, ctx: &RequestContext) -> Result<MutexGuard<'_, MemoryState>, DriverError> {
        ctx.ensure_active()?;
        let state = self.state.lock().await;
        require_instance(&state)?;
        Ok(state)
    }

    fn default_availability_zone(&self, region: &str) -> String {
        non_empty(&self.config.instance.availability_zone)
            .map(str::to_string)
            .unwrap_or_else(|| region.to_string())
    }

    /// Device names already claimed by this instance, across all volumes
    fn devices_in_use(state: &MemoryState, instance_id: &str) -> HashSet<String> {
        state
            .volumes
            .values()
            .flat_map(|v| v.attachments.iter())
            .filter(|a| a.instance_id == instance_id)
            .map(|a| a.device_name.clone())
            .collect()
    }

    fn pick_device_name(state: &MemoryState, instance_id: &str) -> Result<String, DriverError> {
        let info = next_device_info();
        if info.ignore {
            return Err(DriverError::unsupported(
                "device naming does not apply to this backend",
            ));
        }
        let in_use = Self::devices_in_use(state, instance_id);
        info.candidates()
            .into_iter()
            .find(|candidate| !in_use.contains(candidate))
            .ok_or_else(|| DriverError::conflict("device naming scheme is exhausted"))
    }

    fn resolve_copy_source<'a>(
        state: &'a MemoryState,
        request: &CopySnapshotRequest,
    ) -> Result<&'a Snapshot, DriverError> {
        let by_volume = non_empty(&request.volume_id);
        let by_id = non_empty(&request.snapshot_id);
        let by_name = non_empty(&request.snapshot_name);

        if by_volume.is_none() && by_id.is_none() && by_name.is_none() {
            return Err(DriverError::invalid_argument(
                "copy source requires a volume id, snapshot id, or snapshot name",
            ));
        }

        if let Some(volume_id) = by_volume {
            let matches: Vec<&Snapshot> = state
                .snapshots
                .values()
                .filter(|s| s.volume_id == volume_id)
                .collect();
            match matches.as_slice() {
                [] => {}
                [only] => return Ok(only),
                many => {
                    return Err(DriverError::ambiguous(format!(
                        "volume \"{}\" has {} snapshots; identify one by id or name",
                        volume_id,
                        many.len()
                    )));
                }
            }
        }

        if let Some(snapshot_id) = by_id
            && let Some(snapshot) = state.snapshots.get(snapshot_id)
        {
            return Ok(snapshot);
        }

        if let Some(name) = by_name {
            let matches: Vec<&Snapshot> =
                state.snapshots.values().filter(|s| s.name == name).collect();
            match matches.as_slice() {
                [] => {}
                [only] => return Ok(only),
                many => {
                    return Err(DriverError::ambiguous(format!(
                        "snapshot name \"{}\" matches {} snapshots",
                        name,
                        many.len()
                    )));
                }
            }
        }

        Err(DriverError::not_found("copy source does not resolve"))
    }
}

fn new_volume_id() -> String {
    format!("vol-{}", Uuid::new_v4().simple())
}

fn new_snapshot_id() -> String {
    format!("snap-{}", Uuid::new_v4().simple())
}

#[async_trait]
impl StorageDriver for MemoryDriver {
    fn name(&self) -> &str {
        Self::DRIVER_NAME
    }

    async fn init(&self, ctx: &RequestContext) -> Result<(), DriverError> {
        ctx.ensure_active()?;
        let mut state = self.state.lock().await;
        if state.instance.is_some() {
            // Repeat init is a no-op for this backend.
            return Ok(());
        }

        let instance_id = non_empty(&self.config.instance.instance_id).ok_or_else(|| {
            DriverError::invalid_argument("memory driver requires instance.instance_id")
        })?;
        let region = non_empty(&self.config.instance.region)
            .unwrap_or("local")
            .to_string();
        let name = non_empty(&self.config.instance.name)
            .unwrap_or(instance_id)
            .to_string();

        tracing::info!("Memory driver initialized for instance {}", instance_id);
        state.instance = Some(Instance {
            provider_name: Self::DRIVER_NAME.to_string(),
            instance_id: instance_id.to_string(),
            region,
            name,
        });
        Ok(())
    }

    async fn list_volume_mapping(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<BlockDevice>, DriverError> {
        let state = self.ready(ctx).await?;
        let instance = require_instance(&state)?;

        let mapping = state
            .volumes
            .values()
            .flat_map(|volume| {
                volume
                    .attachments
                    .iter()
                    .filter(|a| a.instance_id == instance.instance_id)
                    .map(|a| BlockDevice {
                        provider_name: Self::DRIVER_NAME.to_string(),
                        instance_id: a.instance_id.clone(),
                        volume_id: a.volume_id.clone(),
                        device_name: a.device_name.clone(),
                        region: instance.region.clone(),
                        status: a.status.to_string(),
                    })
            })
            .collect();
        Ok(mapping)
    }

    async fn get_instance(&self, ctx: &RequestContext) -> Result<Instance, DriverError> {
        let state = self.ready(ctx).await?;
        Ok(require_instance(&state)?.clone())
    }

    async fn list_volumes(
        &self,
        ctx: &RequestContext,
        filter: &VolumeFilter,
    ) -> Result<Vec<Volume>, DriverError> {
        let state = self.ready(ctx).await?;
        Ok(state
            .volumes
            .values()
            .filter(|v| filter.matches(v))
            .cloned()
            .collect())
    }

    async fn list_volume_attachments(
        &self,
        ctx: &RequestContext,
        volume_id: &str,
    ) -> Result<Vec<VolumeAttachment>, DriverError> {
        let state = self.ready(ctx).await?;
        Ok(state
            .volumes
            .get(volume_id)
            .map(|v| v.attachments.clone())
            .unwrap_or_default())
    }

    async fn create_snapshot(
        &self,
        ctx: &RequestContext,
        snapshot_name: &str,
        volume_id: &str,
        description: Option<&str>,
    ) -> Result<Vec<Snapshot>, DriverError> {
        let mut state = self.ready(ctx).await?;
        let instance_region = require_instance(&state)?.region.clone();

        let volume = state
            .volumes
            .get(volume_id)
            .ok_or_else(|| DriverError::not_found(format!("no volume with id \"{volume_id}\"")))?;

        let snapshot = Snapshot {
            snapshot_id: new_snapshot_id(),
            name: snapshot_name.to_string(),
            volume_id: volume.volume_id.clone(),
            volume_size_gb: volume.size_gb,
            region: instance_region,
            start_time: Utc::now(),
            description: description.unwrap_or_default().to_string(),
            status: ProvisionState::Available,
        };

        tracing::info!(
            "Created snapshot {} of volume {}",
            snapshot.snapshot_id,
            volume_id
        );
        state
            .snapshots
            .insert(snapshot.snapshot_id.clone(), snapshot.clone());
        Ok(vec![snapshot])
    }

    async fn list_snapshots(
        &self,
        ctx: &RequestContext,
        filter: &SnapshotFilter,
    ) -> Result<Vec<Snapshot>, DriverError> {
        let state = self.ready(ctx).await?;
        Ok(state
            .snapshots
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect())
    }

    async fn remove_snapshot(
        &self,
        ctx: &RequestContext,
        snapshot_id: &str,
    ) -> Result<(), DriverError> {
        let mut state = self.ready(ctx).await?;
        state.snapshots.remove(snapshot_id).ok_or_else(|| {
            DriverError::not_found(format!("no snapshot with id \"{snapshot_id}\""))
        })?;
        tracing::info!("Removed snapshot {}", snapshot_id);
        Ok(())
    }

    async fn create_volume(
        &self,
        ctx: &RequestContext,
        request: &CreateVolumeRequest,
    ) -> Result<Volume, DriverError> {
        let mut state = self.ready(ctx).await?;
        let region = require_instance(&state)?.region.clone();

        if request.name.is_empty() {
            return Err(DriverError::invalid_argument("volume name must not be empty"));
        }
        if request.iops.is_some_and(|iops| iops < 0) {
            return Err(DriverError::invalid_argument("iops must not be negative"));
        }

        // A clone source takes precedence over a snapshot source.
        let inherited_size = if let Some(source_id) = non_empty(&request.source_volume_id) {
            let source = state.volumes.get(source_id).ok_or_else(|| {
                DriverError::not_found(format!("no clone source volume \"{source_id}\""))
            })?;
            Some(source.size_gb)
        } else if let Some(snapshot_id) = non_empty(&request.source_snapshot_id) {
            let source = state.snapshots.get(snapshot_id).ok_or_else(|| {
                DriverError::not_found(format!("no restore source snapshot \"{snapshot_id}\""))
            })?;
            Some(source.volume_size_gb)
        } else {
            None
        };

        let size_gb = if request.size_gb > 0 {
            request.size_gb
        } else {
            inherited_size.ok_or_else(|| {
                DriverError::invalid_argument("size_gb must be positive for a blank volume")
            })?
        };

        let volume = Volume {
            volume_id: new_volume_id(),
            name: request.name.clone(),
            availability_zone: non_empty(&request.availability_zone)
                .map(str::to_string)
                .unwrap_or_else(|| self.default_availability_zone(&region)),
            status: ProvisionState::Available,
            volume_type: non_empty(&request.volume_type)
                .unwrap_or("standard")
                .to_string(),
            iops: request.iops,
            size_gb,
            attachments: Vec::new(),
        };

        tracing::info!("Created volume {} ({} GB)", volume.volume_id, volume.size_gb);
        state.volumes.insert(volume.volume_id.clone(), volume.clone());
        Ok(volume)
    }

    async fn remove_volume(
        &self,
        ctx: &RequestContext,
        volume_id: &str,
    ) -> Result<(), DriverError> {
        let mut state = self.ready(ctx).await?;

        let volume = state
            .volumes
            .get(volume_id)
            .ok_or_else(|| DriverError::not_found(format!("no volume with id \"{volume_id}\"")))?;
        if !volume.attachments.is_empty() {
            return Err(DriverError::conflict(format!(
                "volume \"{volume_id}\" is attached; detach it first"
            )));
        }

        state.volumes.remove(volume_id);
        tracing::info!("Removed volume {}", volume_id);
        Ok(())
    }

    async fn next_available_device(&self, ctx: &RequestContext) -> Result<String, DriverError> {
        let state = self.ready(ctx).await?;
        let instance_id = require_instance(&state)?.instance_id.clone();
        Self::pick_device_name(&state, &instance_id)
    }

    async fn attach_volume(
        &self,
        ctx: &RequestContext,
        next_device_name: &str,
        volume_id: &str,
    ) -> Result<Vec<VolumeAttachment>, DriverError> {
        let mut state = self.ready(ctx).await?;
        let instance_id = require_instance(&state)?.instance_id.clone();
        let in_use = Self::devices_in_use(&state, &instance_id);

        let volume = state
            .volumes
            .get_mut(volume_id)
            .ok_or_else(|| DriverError::not_found(format!("no volume with id \"{volume_id}\"")))?;
        if volume.is_attached_to(&instance_id) {
            return Err(DriverError::conflict(format!(
                "volume \"{volume_id}\" is already attached to this instance"
            )));
        }

        let device_name = if next_device_name.is_empty() {
            let info = next_device_info();
            if info.ignore {
                return Err(DriverError::unsupported(
                    "device naming does not apply to this backend",
                ));
            }
            info.candidates()
                .into_iter()
                .find(|candidate| !in_use.contains(candidate))
                .ok_or_else(|| DriverError::conflict("device naming scheme is exhausted"))?
        } else {
            if in_use.contains(next_device_name) {
                return Err(DriverError::conflict(format!(
                    "device \"{next_device_name}\" is already in use on this instance"
                )));
            }
            next_device_name.to_string()
        };

        volume.attachments.push(VolumeAttachment {
            volume_id: volume_id.to_string(),
            instance_id: instance_id.clone(),
            device_name: device_name.clone(),
            status: AttachmentStatus::Attached,
        });

        tracing::info!("Attached volume {} at {}", volume_id, device_name);
        Ok(volume.attachments.clone())
    }

    async fn detach_volume(
        &self,
        ctx: &RequestContext,
        volume_id: &str,
    ) -> Result<(), DriverError> {
        let mut state = self.ready(ctx).await?;
        let instance_id = require_instance(&state)?.instance_id.clone();

        let volume = state
            .volumes
            .get_mut(volume_id)
            .ok_or_else(|| DriverError::not_found(format!("no volume with id \"{volume_id}\"")))?;
        let bound = volume
            .attachments
            .iter()
            .position(|a| a.instance_id == instance_id)
            .ok_or_else(|| {
                DriverError::conflict(format!(
                    "volume \"{volume_id}\" is not attached to this instance"
                ))
            })?;

        let removed = volume.attachments.remove(bound);
        tracing::info!("Detached volume {} from {}", volume_id, removed.device_name);
        Ok(())
    }

    async fn copy_snapshot(
        &self,
        ctx: &RequestContext,
        request: &CopySnapshotRequest,
    ) -> Result<Snapshot, DriverError> {
        let mut state = self.ready(ctx).await?;

        if request.destination_snapshot_name.is_empty() {
            return Err(DriverError::invalid_argument(
                "destination snapshot name must not be empty",
            ));
        }
        if request.destination_region.is_empty() {
            return Err(DriverError::invalid_argument(
                "destination region must not be empty",
            ));
        }

        let source = Self::resolve_copy_source(&state, request)?;
        let copy = Snapshot {
            snapshot_id: new_snapshot_id(),
            name: request.destination_snapshot_name.clone(),
            volume_id: source.volume_id.clone(),
            volume_size_gb: source.volume_size_gb,
            region: request.destination_region.clone(),
            start_time: Utc::now(),
            description: source.description.clone(),
            status: ProvisionState::Available,
        };

        tracing::info!(
            "Copied snapshot {} to {} in region {}",
            source.snapshot_id,
            copy.snapshot_id,
            copy.region
        );
        state.snapshots.insert(copy.snapshot_id.clone(), copy.clone());
        Ok(copy)
    }

    async fn client_tool_name(&self, ctx: &RequestContext) -> Result<String, DriverError> {
        self.ready(ctx).await?;
        Ok(CLIENT_TOOL_NAME.to_string())
    }

    async fn client_tool(&self, ctx: &RequestContext) -> Result<Vec<u8>, DriverError> {
        self.ready(ctx).await?;
        Ok(CLIENT_TOOL.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InstanceConfig;
    use blockstore_contracts::DriverErrorKind;

    fn configured() -> MemoryDriver {
        MemoryDriver::new(DriverConfig {
            driver: MemoryDriver::DRIVER_NAME.to_string(),
            instance: InstanceConfig {
                instance_id: Some("i-test".to_string()),
                name: None,
                region: Some("us-test-1".to_string()),
                availability_zone: Some("us-test-1a".to_string()),
            },
            options: Default::default(),
        })
    }

    async fn initialized() -> (MemoryDriver, RequestContext) {
        let driver = configured();
        let ctx = RequestContext::new();
        driver.init(&ctx).await.unwrap();
        (driver, ctx)
    }

    fn blank_volume(name: &str) -> CreateVolumeRequest {
        CreateVolumeRequest {
            name: name.to_string(),
            size_gb: 8,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn init_requires_an_instance_id() {
        let driver = MemoryDriver::new(DriverConfig::for_driver("memory"));
        let err = driver.init(&RequestContext::new()).await.unwrap_err();
        assert_eq!(err.kind, DriverErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn init_is_idempotent() {
        let (driver, ctx) = initialized().await;
        driver.init(&ctx).await.unwrap();

        let instance = driver.get_instance(&ctx).await.unwrap();
        assert_eq!(instance.instance_id, "i-test");
        assert_eq!(instance.region, "us-test-1");
    }

    #[tokio::test]
    async fn operations_before_init_are_not_initialized() {
        let driver = configured();
        let ctx = RequestContext::new();

        let err = driver
            .list_volumes(&ctx, &VolumeFilter::all())
            .await
            .unwrap_err();
        assert_eq!(err.kind, DriverErrorKind::NotInitialized);

        let err = driver.client_tool_name(&ctx).await.unwrap_err();
        assert_eq!(err.kind, DriverErrorKind::NotInitialized);
    }

    #[tokio::test]
    async fn blank_volume_requires_positive_size() {
        let (driver, ctx) = initialized().await;
        let err = driver
            .create_volume(
                &ctx,
                &CreateVolumeRequest {
                    name: "data".to_string(),
                    size_gb: 0,
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, DriverErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn restored_volume_inherits_snapshot_size() {
        let (driver, ctx) = initialized().await;
        let source = driver
            .create_volume(&ctx, &blank_volume("source"))
            .await
            .unwrap();
        let snapshot = driver
            .create_snapshot(&ctx, "base", &source.volume_id, None)
            .await
            .unwrap()
            .remove(0);

        let restored = driver
            .create_volume(
                &ctx,
                &CreateVolumeRequest {
                    name: "restored".to_string(),
                    source_snapshot_id: Some(snapshot.snapshot_id),
                    size_gb: 0,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(restored.size_gb, source.size_gb);
    }

    #[tokio::test]
    async fn copy_source_by_volume_is_ambiguous_with_two_snapshots() {
        let (driver, ctx) = initialized().await;
        let volume = driver
            .create_volume(&ctx, &blank_volume("data"))
            .await
            .unwrap();
        driver
            .create_snapshot(&ctx, "first", &volume.volume_id, None)
            .await
            .unwrap();
        driver
            .create_snapshot(&ctx, "second", &volume.volume_id, None)
            .await
            .unwrap();

        let err = driver
            .copy_snapshot(
                &ctx,
                &CopySnapshotRequest {
                    volume_id: Some(volume.volume_id),
                    destination_snapshot_name: "copy".to_string(),
                    destination_region: "eu-west-1".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, DriverErrorKind::Ambiguous);
    }

    #[tokio::test]
    async fn attach_rejects_device_already_in_use() {
        let (driver, ctx) = initialized().await;
        let first = driver
            .create_volume(&ctx, &blank_volume("first"))
            .await
            .unwrap();
        let second = driver
            .create_volume(&ctx, &blank_volume("second"))
            .await
            .unwrap();

        driver
            .attach_volume(&ctx, "/dev/xvdb", &first.volume_id)
            .await
            .unwrap();
        let err = driver
            .attach_volume(&ctx, "/dev/xvdb", &second.volume_id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, DriverErrorKind::Conflict);
    }

    #[tokio::test]
    async fn client_tool_matches_its_name() {
        let (driver, ctx) = initialized().await;
        let name = driver.client_tool_name(&ctx).await.unwrap();
        let payload = driver.client_tool(&ctx).await.unwrap();

        assert!(name.ends_with(".sh"));
        assert!(payload.starts_with(b"#!/bin/sh"));
    }
}
