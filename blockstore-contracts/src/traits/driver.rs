// SPDX-License-Identifier: GPL-3.0-only

//! The polymorphic block-storage driver contract
//!
//! Every backing storage provider implements [`StorageDriver`] in full.
//! Operations a backend cannot support fail with
//! [`DriverErrorKind::Unsupported`](crate::DriverErrorKind::Unsupported)
//! rather than being omitted, so callers can treat any driver
//! interchangeably.
//!
//! Identity is dual-keyed throughout: backends expose both durable IDs
//! and human-assigned names, and callers may only hold one of the two.
//! Wherever uniqueness is not guaranteed the contract returns a sequence
//! and pushes disambiguation to the caller instead of silently picking a
//! match.

use async_trait::async_trait;

use blockstore_types::{
    BlockDevice, CopySnapshotRequest, CreateVolumeRequest, Instance, Snapshot, SnapshotFilter,
    Volume, VolumeAttachment, VolumeFilter,
};

use crate::{DriverError, RequestContext};

/// Contract every block-storage backend satisfies.
///
/// Drivers are invoked concurrently by multiple callers against the same
/// instance; any shared session state uses internal synchronization
/// invisible to the caller. No operation blocks beyond normal backend
/// I/O latency: create and copy operations may return entities still in
/// the `provisioning` state, and every created entity is independently
/// retrievable by its assigned ID so callers can poll for completion.
#[async_trait]
pub trait StorageDriver: Send + Sync {
    /// Stable, non-empty backend identifier (the registry key).
    fn name(&self) -> &str;

    /// Validate configuration and establish the backend session.
    ///
    /// Must succeed before any other operation; calls made earlier fail
    /// with `NotInitialized`. Fails if required backend configuration is
    /// missing or invalid.
    async fn init(&self, ctx: &RequestContext) -> Result<(), DriverError>;

    /// List the block devices attached to the local instance.
    ///
    /// An instance with nothing attached yields an empty sequence.
    async fn list_volume_mapping(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<BlockDevice>, DriverError>;

    /// Resolve the local instance's identity.
    async fn get_instance(&self, ctx: &RequestContext) -> Result<Instance, DriverError>;

    /// List volumes visible to the instance, narrowed by the filter.
    ///
    /// An unconstrained filter lists everything. A filter that matches
    /// nothing yields an empty sequence, not a failure; a name may
    /// legitimately select multiple volumes.
    async fn list_volumes(
        &self,
        ctx: &RequestContext,
        filter: &VolumeFilter,
    ) -> Result<Vec<Volume>, DriverError>;

    /// List the attachments currently bound to a volume.
    ///
    /// An unattached volume yields an empty sequence.
    async fn list_volume_attachments(
        &self,
        ctx: &RequestContext,
        volume_id: &str,
    ) -> Result<Vec<VolumeAttachment>, DriverError>;

    /// Snapshot a volume.
    ///
    /// May return before the snapshot is fully materialized; the result
    /// is "accepted" and callers poll [`list_snapshots`] by the assigned
    /// ID. Fails if the source volume is absent.
    ///
    /// [`list_snapshots`]: StorageDriver::list_snapshots
    async fn create_snapshot(
        &self,
        ctx: &RequestContext,
        snapshot_name: &str,
        volume_id: &str,
        description: Option<&str>,
    ) -> Result<Vec<Snapshot>, DriverError>;

    /// List snapshots selected by the filter (inclusive OR across keys).
    async fn list_snapshots(
        &self,
        ctx: &RequestContext,
        filter: &SnapshotFilter,
    ) -> Result<Vec<Snapshot>, DriverError>;

    /// Remove a snapshot by ID. Fails `NotFound` if absent.
    async fn remove_snapshot(
        &self,
        ctx: &RequestContext,
        snapshot_id: &str,
    ) -> Result<(), DriverError>;

    /// Provision a volume, blank or from a clone/restore source.
    ///
    /// The returned volume may still be provisioning. Fails
    /// `InvalidArgument` on a size/type/zone combination the backend
    /// rejects.
    async fn create_volume(
        &self,
        ctx: &RequestContext,
        request: &CreateVolumeRequest,
    ) -> Result<Volume, DriverError>;

    /// Remove a volume by ID.
    ///
    /// Fails `Conflict` if the volume is attached and the backend
    /// disallows removal while attached.
    async fn remove_volume(
        &self,
        ctx: &RequestContext,
        volume_id: &str,
    ) -> Result<(), DriverError>;

    /// Compute the next device path not currently in use on the local
    /// instance, per the platform's naming convention.
    ///
    /// Fails `Unsupported` for backends without a device-naming concept
    /// and `Conflict` when the naming scheme is exhausted.
    async fn next_available_device(&self, ctx: &RequestContext) -> Result<String, DriverError>;

    /// Attach a volume to the local instance at the hinted device path.
    ///
    /// Returns the volume's resulting attachments, which may include
    /// pre-existing ones alongside the new binding. Fails if the volume
    /// does not exist or is incompatible with the instance.
    async fn attach_volume(
        &self,
        ctx: &RequestContext,
        next_device_name: &str,
        volume_id: &str,
    ) -> Result<Vec<VolumeAttachment>, DriverError>;

    /// Detach a volume from the local instance.
    ///
    /// Fails `Conflict` if the volume is not attached to this instance.
    async fn detach_volume(
        &self,
        ctx: &RequestContext,
        volume_id: &str,
    ) -> Result<(), DriverError>;

    /// Copy a snapshot into a destination region under a new name.
    ///
    /// The source is resolved from the request's volume ID, snapshot ID,
    /// or snapshot name, first unambiguous match in that order.
    async fn copy_snapshot(
        &self,
        ctx: &RequestContext,
        request: &CopySnapshotRequest,
    ) -> Result<Snapshot, DriverError>;

    /// File name of the client-side helper this driver distributes.
    ///
    /// Callers use the name's extension to decide whether the payload
    /// from [`client_tool`] is executed as a binary or interpreted as a
    /// script. Fails `Unsupported` when the backend ships no tool.
    ///
    /// [`client_tool`]: StorageDriver::client_tool
    async fn client_tool_name(&self, ctx: &RequestContext) -> Result<String, DriverError>;

    /// Raw payload of the client-side helper artifact.
    async fn client_tool(&self, ctx: &RequestContext) -> Result<Vec<u8>, DriverError>;
}

impl std::fmt::Debug for dyn StorageDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageDriver").field("name", &self.name()).finish()
    }
}
