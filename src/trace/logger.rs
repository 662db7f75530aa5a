use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::trace::trace::SuiteEvent;

/// One JSON line per [`SuiteEvent`]. An unopenable or unwritable file is
/// logged as a warning and the run carries on.
pub struct TraceLogger {
    file: Option<Mutex<File>>,
}

impl TraceLogger {
    /// Appends to `path`, creating it when missing.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Self {
                file: Some(Mutex::new(file)),
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not open trace file");
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self { file: None }
    }

    pub fn log(&self, event: &SuiteEvent) {
        let Some(file) = &self.file else { return };
        if let Err(e) = append_line(file, event) {
            tracing::warn!(suite = %event.suite, error = %e, "failed to write trace event");
        }
    }
}

fn append_line(file: &Mutex<File>, event: &SuiteEvent) -> io::Result<()> {
    let mut line = serde_json::to_vec(event)?;
    line.push(b'\n');
    // A single write keeps lines whole.
    file.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .write_all(&line)
}
