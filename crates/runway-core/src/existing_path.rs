//! Pinned installs supplied by the host instead of acquired on demand.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::events::{AcquisitionEvent, EventSink};

/// A requesting tool that should use an already-installed runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingPath {
    /// Identifier of the tool asking for a runtime.
    pub requester: String,
    /// Executable to hand back instead of acquiring.
    pub path: PathBuf,
}

pub struct ExistingPathResolver<'a> {
    events: &'a dyn EventSink,
}

impl<'a> ExistingPathResolver<'a> {
    pub fn new(events: &'a dyn EventSink) -> Self {
        Self { events }
    }

    /// First configured path for `requester`.
    ///
    /// Without a requester id the entries cannot be matched; a warning event
    /// is posted so the misconfiguration is visible, and `None` is returned.
    pub fn resolve(&self, entries: &[ExistingPath], requester: Option<&str>) -> Option<PathBuf> {
        if entries.is_empty() {
            return None;
        }
        let Some(requester) = requester else {
            self.events.post(&AcquisitionEvent::ExistingPathWarning {
                message: "Existing paths are configured but no requesting extension id was provided; ignoring them".to_string(),
            });
            return None;
        };
        entries
            .iter()
            .find(|entry| entry.requester == requester)
            .map(|entry| entry.path.clone())
    }
}
