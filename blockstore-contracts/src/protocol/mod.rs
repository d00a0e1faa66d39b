// SPDX-License-Identifier: GPL-3.0-only

pub mod context;
pub mod error;

pub use context::RequestContext;
pub use error::{DriverError, DriverErrorKind};
