//! Block device mappings and platform device-naming conventions

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Caller-visible device mapping for an instance.
///
/// Produced read-only by the driver's `list_volume_mapping` operation;
/// never mutated through this crate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockDevice {
    /// Backend the mapping was resolved by
    pub provider_name: String,

    /// Instance the device is visible on
    pub instance_id: String,

    /// Volume backing the device
    pub volume_id: String,

    /// Local device path (e.g., "/dev/xvdb")
    pub device_name: String,

    /// Region the backing volume lives in
    pub region: String,

    /// Backend-reported device status, passed through verbatim
    pub status: String,
}

/// Per-backend, per-platform device-naming descriptor.
///
/// Tells a device-naming resolver how to compute the next free device
/// path on the local instance. Immutable, process-wide configuration,
/// not request data. Backends where the concept does not apply (object
/// gateways, network filesystems) set `ignore`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NextDeviceInfo {
    /// Device path prefix (e.g., "/dev/xvd")
    pub prefix: String,

    /// Suffix character range in `[a-z]` form
    pub pattern: String,

    /// Device naming does not apply to this backend
    pub ignore: bool,
}

impl NextDeviceInfo {
    /// Expand the naming pattern into full candidate device paths in
    /// probe order. Empty when `ignore` is set or the pattern is not a
    /// single character range.
    pub fn candidates(&self) -> Vec<String> {
        if self.ignore {
            return Vec::new();
        }
        let Some(range) = self
            .pattern
            .strip_prefix('[')
            .and_then(|p| p.strip_suffix(']'))
        else {
            return Vec::new();
        };
        let mut bounds = range.splitn(2, '-');
        let (Some(start), Some(end)) = (bounds.next(), bounds.next()) else {
            return Vec::new();
        };
        let (Some(start), Some(end)) = (start.chars().next(), end.chars().next()) else {
            return Vec::new();
        };
        (start..=end)
            .map(|suffix| format!("{}{}", self.prefix, suffix))
            .collect()
    }
}

static NEXT_DEVICE_INFO: OnceLock<NextDeviceInfo> = OnceLock::new();

/// The device-naming convention for the current platform.
///
/// Selected once per process; Unix hosts probe `/dev/xvd[b-z]`, while
/// platforms without stable guest device names opt out entirely.
pub fn next_device_info() -> &'static NextDeviceInfo {
    NEXT_DEVICE_INFO.get_or_init(platform_next_device_info)
}

#[cfg(unix)]
fn platform_next_device_info() -> NextDeviceInfo {
    NextDeviceInfo {
        prefix: "/dev/xvd".to_string(),
        pattern: "[b-z]".to_string(),
        ignore: false,
    }
}

#[cfg(not(unix))]
fn platform_next_device_info() -> NextDeviceInfo {
    NextDeviceInfo {
        prefix: String::new(),
        pattern: String::new(),
        ignore: true,
    }
}
