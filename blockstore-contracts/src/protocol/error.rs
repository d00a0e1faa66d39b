// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverErrorKind {
    /// Operation invoked before `init` succeeded
    NotInitialized,
    /// Requested ID/name does not resolve to any entity
    NotFound,
    /// A name resolved to multiple entities where at most one was usable
    Ambiguous,
    /// Malformed size, type, zone, or parameter combination
    InvalidArgument,
    /// Operation conflicts with current entity state
    Conflict,
    /// Backend does not implement this capability
    Unsupported,
    /// Request context was canceled before the backend responded
    Canceled,
    /// Request deadline passed before the backend responded
    DeadlineExceeded,
    /// Transport or auth failure against the underlying storage system
    Unavailable,
    Internal,
}

impl DriverErrorKind {
    pub fn code(self) -> u16 {
        match self {
            Self::Ambiguous => 300,
            Self::InvalidArgument => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::NotInitialized => 425,
            Self::Canceled => 499,
            Self::Internal => 500,
            Self::Unsupported => 501,
            Self::Unavailable => 503,
            Self::DeadlineExceeded => 504,
        }
    }
}

/// Typed failure value every driver operation surfaces.
///
/// Carries the failure kind plus a human-readable detail. Drivers never
/// swallow or retry failures internally; retry policy belongs to the
/// backend implementation or the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind:?}: {message}")]
pub struct DriverError {
    pub kind: DriverErrorKind,
    pub message: String,
}

impl DriverError {
    pub fn new(kind: DriverErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_initialized(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::NotInitialized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::NotFound, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::InvalidArgument, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Conflict, message)
    }

    pub fn ambiguous(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Ambiguous, message)
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Unsupported, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Unavailable, message)
    }
}
