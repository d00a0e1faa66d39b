//! Volume models, lookup filters, and creation payloads
//!
//! These types represent the canonical domain model for provisioned block
//! storage. All layers (drivers, orchestration, transport) use them as the
//! single source of truth.

use serde::{Deserialize, Serialize};

use crate::attachment::VolumeAttachment;
use crate::common::ProvisionState;

/// A unit of provisioned block storage (single source of truth)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Volume {
    // === Identity ===
    /// Backend-assigned, stable volume identifier
    pub volume_id: String,

    /// Human-assigned volume name; may be ambiguous within a backend
    pub name: String,

    // === Placement ===
    /// Availability zone the volume was provisioned in
    pub availability_zone: String,

    // === Lifecycle ===
    /// Current provisioning state
    pub status: ProvisionState,

    // === Shape ===
    /// Backend-specific volume type/class (e.g., "gp2", "thin")
    pub volume_type: String,

    /// Provisioned IOPS (None where the backend has no such knob)
    pub iops: Option<i64>,

    /// Provisioned size in gigabytes
    pub size_gb: u64,

    // === Relationships ===
    /// Attachments currently bound to this volume. A volume may carry
    /// zero, one, or more attachments; exclusivity is backend policy.
    pub attachments: Vec<VolumeAttachment>,
}

impl Volume {
    /// Whether the volume is attached to the given instance
    pub fn is_attached_to(&self, instance_id: &str) -> bool {
        self.attachments
            .iter()
            .any(|a| a.instance_id == instance_id)
    }
}

/// Lookup filter for volumes, dual-keyed by ID or name.
///
/// Both axes unconstrained means "all volumes visible to the instance".
/// When both are supplied the ID is authoritative and the name is
/// ignored. An empty string on either axis is treated as unconstrained,
/// the same as absence.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VolumeFilter {
    /// Match by backend-assigned volume ID
    pub volume_id: Option<String>,

    /// Match by human-assigned name; may select multiple volumes
    pub volume_name: Option<String>,
}

fn constraint(axis: &Option<String>) -> Option<&str> {
    axis.as_deref().filter(|value| !value.is_empty())
}

impl VolumeFilter {
    /// Filter selecting every volume visible to the instance
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(volume_id: impl Into<String>) -> Self {
        Self {
            volume_id: Some(volume_id.into()),
            volume_name: None,
        }
    }

    pub fn by_name(volume_name: impl Into<String>) -> Self {
        Self {
            volume_id: None,
            volume_name: Some(volume_name.into()),
        }
    }

    /// Whether neither axis constrains the lookup
    pub fn is_unconstrained(&self) -> bool {
        constraint(&self.volume_id).is_none() && constraint(&self.volume_name).is_none()
    }

    /// Whether the given volume satisfies this filter.
    ///
    /// ID wins over name when both are present.
    pub fn matches(&self, volume: &Volume) -> bool {
        if let Some(id) = constraint(&self.volume_id) {
            return volume.volume_id == id;
        }
        if let Some(name) = constraint(&self.volume_name) {
            return volume.name == name;
        }
        true
    }
}

/// Payload for the `create_volume` operation.
///
/// `source_volume_id` (clone) and `source_snapshot_id` (restore) are
/// mutually informative; a backend given both decides precedence and
/// documents it. Neither set means a blank volume.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateVolumeRequest {
    /// Human-assigned name for the new volume
    pub name: String,

    /// Existing volume to clone from
    pub source_volume_id: Option<String>,

    /// Snapshot to restore from
    pub source_snapshot_id: Option<String>,

    /// Backend-specific volume type/class
    pub volume_type: Option<String>,

    /// Requested IOPS
    pub iops: Option<i64>,

    /// Requested size in gigabytes
    pub size_gb: u64,

    /// Target availability zone
    pub availability_zone: Option<String>,
}
