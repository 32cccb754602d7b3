//! Runway Core Library
//!
//! On-demand acquisition of versioned runtime components: deduplicated
//! installs, crash recovery through a durable "installing" marker, and
//! full teardown.

pub mod acquisition;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod existing_path;
pub mod fs;
pub mod installer;
pub mod state;
pub mod types;
pub mod validator;

/// Re-exports of commonly used types
pub mod prelude {
    // Coordinator
    pub use crate::acquisition::{AcquisitionCoordinator, CoordinatorOptions};

    // Collaborators
    pub use crate::events::{AcquisitionEvent, EventSink, EventStream, TracingEventSink};
    pub use crate::installer::{InstallContext, Installer, ScriptInstaller};
    pub use crate::state::{JsonFileStateStore, MemoryStateStore, StateStore};
    pub use crate::validator::{FsInstallValidator, InstallValidator};

    // Layout
    pub use crate::fs::InstallLayout;

    // Errors
    pub use crate::error::{AcquisitionError, InstallError, StateError, ValidationError};

    // Types
    pub use crate::types::{AcquireResult, AcquisitionKind};

    // Host wiring
    pub use crate::config::{ConfigStore, RunwayConfig};
    pub use crate::context::AppContext;
}
