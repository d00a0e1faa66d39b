//! Compute instance identity

use serde::{Deserialize, Serialize};

/// The compute host on whose behalf storage requests are made.
///
/// Resolved once per request context via the driver's `get_instance`
/// operation; never persisted by the contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Instance {
    /// Backend this instance was resolved by (e.g., "memory", "ebs")
    pub provider_name: String,

    /// Opaque, backend-assigned instance identifier
    pub instance_id: String,

    /// Region the instance runs in
    pub region: String,

    /// Human-readable instance name, if the backend exposes one
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_serialization_roundtrips() {
        let instance = Instance {
            provider_name: "memory".to_string(),
            instance_id: "i-0a1b2c3d".to_string(),
            region: "us-east-1".to_string(),
            name: "worker-7".to_string(),
        };

        let json = serde_json::to_string(&instance).unwrap();
        let deserialized: Instance = serde_json::from_str(&json).unwrap();

        assert_eq!(instance, deserialized);
    }
}
