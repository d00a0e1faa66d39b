// SPDX-License-Identifier: GPL-3.0-only

//! Canonical domain models for the blockstore driver abstraction
//!
//! This crate defines the single source of truth for the entities the
//! driver contract operates over. These models are used throughout the
//! stack:
//!
//! - **blockstore-contracts**: Driver operations accept and return these
//!   types directly
//! - **blockstore-drivers**: Backend implementations populate them from
//!   provider state
//! - Transport layers serialize/deserialize them unchanged
//!
//! Every value returned by a driver call is a fresh, disconnected view of
//! backend state at the time of the call. Nothing in this crate caches or
//! owns entities across calls.

pub mod attachment;
pub mod common;
pub mod device;
pub mod instance;
pub mod snapshot;
pub mod volume;

pub use attachment::{AttachmentStatus, VolumeAttachment};
pub use common::ProvisionState;
pub use device::{BlockDevice, NextDeviceInfo, next_device_info};
pub use instance::Instance;
pub use snapshot::{CopySnapshotRequest, Snapshot, SnapshotFilter};
pub use volume::{CreateVolumeRequest, Volume, VolumeFilter};
