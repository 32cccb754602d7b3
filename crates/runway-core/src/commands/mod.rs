//! High-level commands for runway operations.
//!
//! Thin request/report layer over the coordinator, called by the CLI.

pub mod acquire;
pub mod status;
pub mod uninstall;

pub use acquire::{AcquireCommand, AcquireOptions, AcquireReport, PathSource};
pub use status::{StatusCommand, StatusOptions, StatusReport};
pub use uninstall::{UninstallAllCommand, UninstallReport};
