//! Background survey import.
//!
//! [`spawn_import`] reads a survey on its own thread and reports progress,
//! completion and failure over a channel.  The caller's data model is
//! untouched until [`ImportEvent::Completed`] hands over the finished graph.

use std::fs::File;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::Duration;

use haul_grid::GridGraph;

use crate::import::load_survey_with_progress;
use crate::{ImportError, ImportOptions, ImportResult};

#[derive(Debug)]
pub enum ImportEvent {
    /// Percentage of the file read so far.
    Progress(u8),
    Completed(GridGraph),
    Failed(ImportError),
}

/// Handle to one background import.
pub struct ImportHandle {
    events: Receiver<ImportEvent>,
    worker: Option<JoinHandle<()>>,
}

/// Start importing `path` on a thread named `haul-import`.
///
/// # Errors
///
/// Only if the thread cannot be spawned; every import failure arrives as
/// [`ImportEvent::Failed`].
pub fn spawn_import(path: impl Into<PathBuf>, options: ImportOptions) -> std::io::Result<ImportHandle> {
    let path = path.into();
    let (tx, rx) = mpsc::channel();

    let worker = std::thread::Builder::new()
        .name("haul-import".into())
        .spawn(move || {
            let result = File::open(&path).map_err(ImportError::from).and_then(|file| {
                let progress = tx.clone();
                load_survey_with_progress(file, &options, move |pct| {
                    let _ = progress.send(ImportEvent::Progress(pct));
                })
            });
            let event = match result {
                Ok(grid) => ImportEvent::Completed(grid),
                Err(e) => ImportEvent::Failed(e),
            };
            // A dropped receiver only means nobody is listening.
            let _ = tx.send(event);
        })?;

    Ok(ImportHandle { events: rx, worker: Some(worker) })
}

impl ImportHandle {
    /// Next event, waiting at most `timeout`.  `None` on timeout or once the
    /// worker has finished and every event was taken.
    pub fn next_event(&self, timeout: Duration) -> Option<ImportEvent> {
        match self.events.recv_timeout(timeout) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Block until the import finishes, forwarding progress to `on_progress`.
    pub fn wait_with<F: FnMut(u8)>(mut self, mut on_progress: F) -> ImportResult<GridGraph> {
        let mut outcome = None;
        for event in self.events.iter() {
            match event {
                ImportEvent::Progress(pct) => on_progress(pct),
                ImportEvent::Completed(grid) => outcome = Some(Ok(grid)),
                ImportEvent::Failed(e) => outcome = Some(Err(e)),
            }
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        outcome.unwrap_or_else(|| {
            Err(ImportError::Io(std::io::Error::other("import worker ended without a result")))
        })
    }

    /// Block until the import finishes.
    pub fn wait(self) -> ImportResult<GridGraph> {
        self.wait_with(|_| {})
    }
}
