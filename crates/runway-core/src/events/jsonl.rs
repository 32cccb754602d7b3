//! Append-only JSON-lines event log.
//!
//! Events are handed to a writer thread through a bounded queue. When the
//! queue is full the event is dropped rather than blocking the caller.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{AcquisitionEvent, EventSink};

const EVENT_QUEUE_CAPACITY: usize = 256;

#[derive(Serialize)]
struct LogRecord {
    at: DateTime<Utc>,
    #[serde(flatten)]
    event: AcquisitionEvent,
}

pub struct JsonlEventSink {
    path: PathBuf,
    sender: SyncSender<LogRecord>,
}

impl JsonlEventSink {
    pub fn new(path: PathBuf) -> Self {
        let (sender, receiver) = sync_channel(EVENT_QUEUE_CAPACITY);
        start_writer_thread(path.clone(), receiver);
        Self { path, sender }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSink for JsonlEventSink {
    fn post(&self, event: &AcquisitionEvent) {
        let record = LogRecord {
            at: Utc::now(),
            event: event.clone(),
        };
        // Dropped when the writer falls behind or has exited.
        let _ = self.sender.try_send(record);
    }
}

fn start_writer_thread(path: PathBuf, receiver: Receiver<LogRecord>) {
    std::thread::spawn(move || {
        while let Ok(record) = receiver.recv() {
            write_record(&path, &record);
        }
    });
}

fn write_record(path: &Path, record: &LogRecord) {
    if let Some(parent) = path.parent()
        && let Err(err) = fs::create_dir_all(parent)
    {
        tracing::debug!("event log: failed to create {}: {err}", parent.display());
        return;
    }

    let mut file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => file,
        Err(err) => {
            tracing::debug!("event log: failed to open {}: {err}", path.display());
            return;
        }
    };
    if let Ok(line) = serde_json::to_string(record) {
        let _ = writeln!(file, "{line}");
    }
}
