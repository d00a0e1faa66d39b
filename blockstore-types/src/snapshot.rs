//! Snapshot models, lookup filters, and copy payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::ProvisionState;

/// A point-in-time copy of a volume
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    /// Backend-assigned, stable snapshot identifier
    pub snapshot_id: String,

    /// Human-assigned snapshot name
    pub name: String,

    /// Volume this snapshot was taken from
    pub volume_id: String,

    /// Size of the source volume in gigabytes
    pub volume_size_gb: u64,

    /// Region/namespace the snapshot lives in. Cross-region copies
    /// produce a new snapshot entity in a different region.
    pub region: String,

    /// When the backend accepted the snapshot operation
    pub start_time: DateTime<Utc>,

    /// Free-form description
    pub description: String,

    /// Current provisioning state
    pub status: ProvisionState,
}

/// Lookup filter for snapshots.
///
/// Matching is an inclusive OR across whichever keys are present: a
/// snapshot is selected if its volume matches `volume_id`, or its ID
/// matches `snapshot_id`, or its name matches `snapshot_name`. An empty
/// filter selects all snapshots. Empty strings are treated the same as
/// absent keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotFilter {
    /// Select snapshots of this source volume
    pub volume_id: Option<String>,

    /// Select the snapshot with this ID
    pub snapshot_id: Option<String>,

    /// Select snapshots with this name
    pub snapshot_name: Option<String>,
}

fn constraint(axis: &Option<String>) -> Option<&str> {
    axis.as_deref().filter(|value| !value.is_empty())
}

impl SnapshotFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(snapshot_id: impl Into<String>) -> Self {
        Self {
            snapshot_id: Some(snapshot_id.into()),
            ..Self::default()
        }
    }

    pub fn by_name(snapshot_name: impl Into<String>) -> Self {
        Self {
            snapshot_name: Some(snapshot_name.into()),
            ..Self::default()
        }
    }

    pub fn for_volume(volume_id: impl Into<String>) -> Self {
        Self {
            volume_id: Some(volume_id.into()),
            ..Self::default()
        }
    }

    /// Whether no key constrains the lookup
    pub fn is_unconstrained(&self) -> bool {
        constraint(&self.volume_id).is_none()
            && constraint(&self.snapshot_id).is_none()
            && constraint(&self.snapshot_name).is_none()
    }

    /// Whether the given snapshot satisfies this filter
    pub fn matches(&self, snapshot: &Snapshot) -> bool {
        if self.is_unconstrained() {
            return true;
        }
        if constraint(&self.volume_id) == Some(snapshot.volume_id.as_str()) {
            return true;
        }
        if constraint(&self.snapshot_id) == Some(snapshot.snapshot_id.as_str()) {
            return true;
        }
        constraint(&self.snapshot_name) == Some(snapshot.name.as_str())
    }
}

/// Payload for the `copy_snapshot` operation.
///
/// The source is identified by whichever of the three keys resolves
/// first, in the order volume ID, snapshot ID, snapshot name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CopySnapshotRequest {
    /// Source volume whose most recent snapshot is copied
    pub volume_id: Option<String>,

    /// Source snapshot ID
    pub snapshot_id: Option<String>,

    /// Source snapshot name
    pub snapshot_name: Option<String>,

    /// Name for the copy in the destination region
    pub destination_snapshot_name: String,

    /// Region the copy is created in
    pub destination_region: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: &str, name: &str, volume_id: &str) -> Snapshot {
        Snapshot {
            snapshot_id: id.to_string(),
            name: name.to_string(),
            volume_id: volume_id.to_string(),
            volume_size_gb: 16,
            region: "us-east-1".to_string(),
            start_time: Utc::now(),
            description: String::new(),
            status: ProvisionState::Available,
        }
    }

    #[test]
    fn snapshot_serialization_roundtrips() {
        let snap = snapshot("snap-1", "nightly", "vol-1");
        let json = serde_json::to_string(&snap).unwrap();
        let deserialized: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snap, deserialized);
    }

    #[test]
    fn empty_filter_matches_all() {
        let filter = SnapshotFilter::all();
        assert!(filter.matches(&snapshot("snap-1", "nightly", "vol-1")));
        assert!(filter.matches(&snapshot("snap-2", "weekly", "vol-2")));
    }

    #[test]
    fn filter_keys_combine_with_inclusive_or() {
        let filter = SnapshotFilter {
            volume_id: Some("vol-1".to_string()),
            snapshot_id: None,
            snapshot_name: Some("weekly".to_string()),
        };

        // Matches by volume even though the name differs.
        assert!(filter.matches(&snapshot("snap-1", "nightly", "vol-1")));
        // Matches by name even though the volume differs.
        assert!(filter.matches(&snapshot("snap-2", "weekly", "vol-2")));
        // Matches neither key.
        assert!(!filter.matches(&snapshot("snap-3", "nightly", "vol-3")));
    }

    #[test]
    fn empty_strings_do_not_constrain() {
        let filter = SnapshotFilter {
            volume_id: Some(String::new()),
            snapshot_id: Some(String::new()),
            snapshot_name: Some(String::new()),
        };
        assert!(filter.is_unconstrained());
        assert!(filter.matches(&snapshot("snap-1", "nightly", "vol-1")));
    }
}
