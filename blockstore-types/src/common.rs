//! Lifecycle state shared by volumes and snapshots

use serde::{Deserialize, Serialize};

/// Provisioning state of a volume or snapshot.
///
/// Create and copy operations may return before the backend has fully
/// materialized the entity. The returned entity then carries
/// `Provisioning` and callers poll the matching `list_*` operation by
/// the assigned ID until the state settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionState {
    /// Accepted by the backend but not yet usable
    Provisioning,

    /// Fully materialized and usable
    Available,

    /// Removal accepted but not yet complete
    Removing,

    /// The backend failed to materialize the entity
    Error,
}

impl ProvisionState {
    /// Whether the entity can be operated on (attached, snapshotted, ...)
    pub fn is_usable(self) -> bool {
        matches!(self, Self::Available)
    }
}

impl std::fmt::Display for ProvisionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Provisioning => write!(f, "provisioning"),
            Self::Available => write!(f, "available"),
            Self::Removing => write!(f, "removing"),
            Self::Error => write!(f, "error"),
        }
    }
}
