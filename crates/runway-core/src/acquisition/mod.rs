//! Deduplicated, crash-safe acquisition of versions.

pub mod coordinator;
pub mod inflight;

pub use coordinator::{AcquisitionCoordinator, CoordinatorOptions, DEFAULT_INSTALL_TIMEOUT};
pub use inflight::{InflightCache, Registration, SharedAcquisition};
