//! Persistence: one JSON file per day and a background saver.
//!
//! The editor never waits on disk. Save requests go to a worker thread over
//! a channel, the worker coalesces them per day and reports back with a
//! [`SaveAck`] that the front-end drains on its tick.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use chrono::NaiveDate;
use crossbeam::channel::{self, Receiver, Sender};
use log::{info, warn};
use thiserror::Error;

use crate::editor::SaveRequest;
use crate::outline::Document;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed document {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Save worker is not running")]
    WorkerGone,
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Where daily documents live.
pub trait DocumentStore: Send + 'static {
    /// `Ok(None)` when nothing was saved for `day` yet.
    fn load(&self, day: NaiveDate) -> Result<Option<Document>, StoreError>;

    fn save(&self, day: NaiveDate, document: &Document) -> Result<(), StoreError>;
}

/// Stores `<dir>/<YYYY-MM-DD>.json`, written through a temp file and rename.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, day: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.json", day.format("%Y-%m-%d")))
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self, day: NaiveDate) -> Result<Option<Document>, StoreError> {
        let path = self.path_for(day);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::io(&path, err)),
        };
        let document = serde_json::from_str(&content)
            .map_err(|source| StoreError::Format { path, source })?;
        Ok(Some(document))
    }

    fn save(&self, day: NaiveDate, document: &Document) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|err| StoreError::io(&self.dir, err))?;
        let path = self.path_for(day);
        let content = serde_json::to_string_pretty(document).map_err(|source| {
            StoreError::Format {
                path: path.clone(),
                source,
            }
        })?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, content).map_err(|err| StoreError::io(&tmp_path, err))?;
        fs::rename(&tmp_path, &path).map_err(|err| StoreError::io(&path, err))?;
        Ok(())
    }
}

struct SaveJob {
    day: NaiveDate,
    version: u64,
    document: Document,
}

#[derive(Debug)]
pub struct SaveAck {
    pub day: NaiveDate,
    pub version: u64,
    pub result: Result<(), StoreError>,
}

/// Background writer. Dropping it finishes every queued save first.
pub struct Saver {
    tx: Option<Sender<SaveJob>>,
    acks: Receiver<SaveAck>,
    handle: Option<JoinHandle<()>>,
}

impl Saver {
    pub fn spawn<S: DocumentStore>(store: S) -> Self {
        let (tx, rx) = channel::unbounded::<SaveJob>();
        let (ack_tx, acks) = channel::unbounded::<SaveAck>();
        let handle = thread::spawn(move || run_worker(store, rx, ack_tx));
        Self {
            tx: Some(tx),
            acks,
            handle: Some(handle),
        }
    }

    pub fn submit(&self, day: NaiveDate, request: SaveRequest) -> Result<(), StoreError> {
        let tx = self.tx.as_ref().ok_or(StoreError::WorkerGone)?;
        tx.send(SaveJob {
            day,
            version: request.version,
            document: request.document,
        })
        .map_err(|_| StoreError::WorkerGone)
    }

    /// Acknowledgements that arrived since the last call.
    pub fn drain_acks(&self) -> Vec<SaveAck> {
        self.acks.try_iter().collect()
    }

    /// Stops accepting work, waits for queued saves and returns their acks.
    pub fn shutdown(mut self) -> Vec<SaveAck> {
        self.finish();
        self.drain_acks()
    }

    fn finish(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("event=saver_stop module=store status=panicked");
        }
    }
}

impl Drop for Saver {
    fn drop(&mut self) {
        self.finish();
    }
}

fn run_worker<S: DocumentStore>(store: S, rx: Receiver<SaveJob>, acks: Sender<SaveAck>) {
    while let Ok(job) = rx.recv() {
        // only the newest queued version of each day is worth writing
        let mut jobs = vec![job];
        for next in rx.try_iter() {
            match jobs.iter_mut().find(|queued| queued.day == next.day) {
                Some(queued) if queued.version < next.version => *queued = next,
                Some(_) => {}
                None => jobs.push(next),
            }
        }
        for job in jobs {
            let result = store.save(job.day, &job.document);
            match &result {
                Ok(()) => info!(
                    "event=save module=store status=ok day={} version={}",
                    job.day, job.version
                ),
                Err(err) => warn!(
                    "event=save module=store status=error day={} version={} error={}",
                    job.day, job.version, err
                ),
            }
            let ack = SaveAck {
                day: job.day,
                version: job.version,
                result,
            };
            if acks.send(ack).is_err() {
                return;
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Pending,
    Offline(String),
}

impl SaveStatus {
    pub fn label(&self) -> &str {
        match self {
            SaveStatus::Saved => "saved",
            SaveStatus::Pending => "saving",
            SaveStatus::Offline(_) => "offline",
        }
    }
}

/// Folds requests and acknowledgements into the status shown to the user.
#[derive(Clone, Debug)]
pub struct SaveTracker {
    status: SaveStatus,
    latest_requested: u64,
}

impl Default for SaveTracker {
    fn default() -> Self {
        Self {
            status: SaveStatus::Saved,
            latest_requested: 0,
        }
    }
}

impl SaveTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    pub fn requested(&mut self, version: u64) {
        self.latest_requested = self.latest_requested.max(version);
        if !matches!(self.status, SaveStatus::Offline(_)) {
            self.status = SaveStatus::Pending;
        }
    }

    /// Returns `true` when the status changed.
    pub fn acknowledge(&mut self, ack: &SaveAck) -> bool {
        if ack.version < self.latest_requested {
            return false;
        }
        let next = match &ack.result {
            Ok(()) => SaveStatus::Saved,
            Err(err) => SaveStatus::Offline(err.to_string()),
        };
        let changed = next != self.status;
        self.status = next;
        changed
    }
}
