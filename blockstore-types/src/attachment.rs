//! Volume-to-instance attachment model

use serde::{Deserialize, Serialize};

/// Live state of an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentStatus {
    Attaching,
    Attached,
    Detaching,
}

impl std::fmt::Display for AttachmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Attaching => write!(f, "attaching"),
            Self::Attached => write!(f, "attached"),
            Self::Detaching => write!(f, "detaching"),
        }
    }
}

/// The binding of a volume to an instance at a device path.
///
/// Identified by the (volume_id, instance_id, device_name) triple;
/// created by `attach_volume`, destroyed by `detach_volume`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VolumeAttachment {
    /// Attached volume
    pub volume_id: String,

    /// Instance the volume is attached to
    pub instance_id: String,

    /// Device path the volume is exposed at (e.g., "/dev/xvdb")
    pub device_name: String,

    /// Current attachment state
    pub status: AttachmentStatus,
}
