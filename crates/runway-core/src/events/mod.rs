//! Acquisition lifecycle events.
//!
//! Events are a side channel: posting never blocks, never fails, and nothing
//! in the coordinator branches on whether a sink accepted an event.

pub mod jsonl;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::types::AcquisitionKind;

pub use jsonl::JsonlEventSink;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AcquisitionEvent {
    AcquisitionStarted {
        version: String,
        kind: AcquisitionKind,
    },
    AcquisitionCompleted {
        version: String,
        kind: AcquisitionKind,
        path: PathBuf,
    },
    AcquisitionFailed {
        version: String,
        message: String,
    },
    /// A caller joined an acquisition that was already running or done.
    AcquisitionInProgress {
        version: String,
    },
    AlreadyInstalled {
        version: String,
    },
    PartialInstallation {
        version: String,
        kind: AcquisitionKind,
    },
    Deletion {
        path: PathBuf,
    },
    UninstallAllStarted,
    UninstallAllCompleted,
    StatusResolved {
        version: String,
    },
    StatusUndefined {
        version: String,
    },
    ExistingPathWarning {
        message: String,
    },
}

impl AcquisitionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AcquisitionEvent::AcquisitionStarted { .. } => "acquisition_started",
            AcquisitionEvent::AcquisitionCompleted { .. } => "acquisition_completed",
            AcquisitionEvent::AcquisitionFailed { .. } => "acquisition_failed",
            AcquisitionEvent::AcquisitionInProgress { .. } => "acquisition_in_progress",
            AcquisitionEvent::AlreadyInstalled { .. } => "already_installed",
            AcquisitionEvent::PartialInstallation { .. } => "partial_installation",
            AcquisitionEvent::Deletion { .. } => "deletion",
            AcquisitionEvent::UninstallAllStarted => "uninstall_all_started",
            AcquisitionEvent::UninstallAllCompleted => "uninstall_all_completed",
            AcquisitionEvent::StatusResolved { .. } => "status_resolved",
            AcquisitionEvent::StatusUndefined { .. } => "status_undefined",
            AcquisitionEvent::ExistingPathWarning { .. } => "existing_path_warning",
        }
    }

    /// Version the event refers to, if any.
    pub fn version(&self) -> Option<&str> {
        match self {
            AcquisitionEvent::AcquisitionStarted { version, .. }
            | AcquisitionEvent::AcquisitionCompleted { version, .. }
            | AcquisitionEvent::AcquisitionFailed { version, .. }
            | AcquisitionEvent::AcquisitionInProgress { version }
            | AcquisitionEvent::AlreadyInstalled { version }
            | AcquisitionEvent::PartialInstallation { version, .. }
            | AcquisitionEvent::StatusResolved { version }
            | AcquisitionEvent::StatusUndefined { version } => Some(version),
            AcquisitionEvent::Deletion { .. }
            | AcquisitionEvent::UninstallAllStarted
            | AcquisitionEvent::UninstallAllCompleted
            | AcquisitionEvent::ExistingPathWarning { .. } => None,
        }
    }
}

/// Receiver of lifecycle events. Must not block.
pub trait EventSink: Send + Sync {
    fn post(&self, event: &AcquisitionEvent);
}

/// Fans each event out to every subscribed sink, in subscription order.
#[derive(Default, Clone)]
pub struct EventStream {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl EventStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, sink: Arc<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.subscribe(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for EventStream {
    fn post(&self, event: &AcquisitionEvent) {
        for sink in &self.sinks {
            sink.post(event);
        }
    }
}

/// Writes events to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn post(&self, event: &AcquisitionEvent) {
        match event {
            AcquisitionEvent::AcquisitionStarted { version, kind } => {
                info!(version = %version, kind = %kind, "acquisition started");
            }
            AcquisitionEvent::AcquisitionCompleted {
                version,
                kind,
                path,
            } => {
                info!(version = %version, kind = %kind, path = %path.display(), "acquisition completed");
            }
            AcquisitionEvent::AcquisitionFailed { version, message } => {
                warn!(version = %version, error = %message, "acquisition failed");
            }
            AcquisitionEvent::PartialInstallation { version, kind } => {
                warn!(version = %version, kind = %kind, "partial installation detected");
            }
            AcquisitionEvent::Deletion { path } => {
                info!(path = %path.display(), "removing install directory");
            }
            AcquisitionEvent::UninstallAllStarted => info!("uninstall all started"),
            AcquisitionEvent::UninstallAllCompleted => info!("uninstall all completed"),
            AcquisitionEvent::ExistingPathWarning { message } => warn!("{message}"),
            other => debug!(event = other.name(), version = ?other.version()),
        }
    }
}

/// Keeps every event in memory. Used by tests to assert on the lifecycle.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<AcquisitionEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AcquisitionEvent> {
        self.lock().clone()
    }

    /// Number of recorded events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&AcquisitionEvent) -> bool) -> usize {
        self.lock().iter().filter(|e| predicate(e)).count()
    }

    pub fn contains(&self, event: &AcquisitionEvent) -> bool {
        self.lock().iter().any(|e| e == event)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<AcquisitionEvent>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl EventSink for RecordingEventSink {
    fn post(&self, event: &AcquisitionEvent) {
        self.lock().push(event.clone());
    }
}
