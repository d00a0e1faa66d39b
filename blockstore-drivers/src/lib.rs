// SPDX-License-Identifier: GPL-3.0-only

//! Driver selection and built-in backends
//!
//! Backends register a constructor under their driver name; an
//! orchestration layer builds a [`DriverRegistry`] from configuration at
//! startup and constructs the driver its [`DriverConfig`] names. The
//! built-in [`MemoryDriver`] implements the whole contract against
//! in-process state and backs the integration suites.

pub mod config;
pub mod memory;
pub mod registry;

pub use config::{DriverConfig, InstanceConfig};
pub use memory::MemoryDriver;
pub use registry::{DriverFactory, DriverRegistry};
