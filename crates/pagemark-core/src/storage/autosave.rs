//! Save scheduling.
//!
//! Edits request saves through [`SaveScheduler`]. [`DebouncedSaver`] collapses
//! a burst of requests into one write that becomes due after a quiet period.

use crate::config::EngineConfig;
use crate::document::DocumentState;
use crate::storage::SaveResult;
use log::{debug, warn};
use std::future::Future;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Receives persistence requests after successful edits. Fire-and-forget.
pub trait SaveScheduler {
    /// Request a save; `immediate` skips any debounce window.
    fn schedule_save(&mut self, immediate: bool);
}

/// Scheduler for hosts without persistence.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSaver;

impl SaveScheduler for NoopSaver {
    fn schedule_save(&mut self, _immediate: bool) {}
}

/// Debounced save requests.
///
/// Each request marks the document dirty and pushes the deadline out to
/// `debounce` after the latest request. The host polls [`is_due`] from its
/// event loop and calls [`flush`] when it returns true.
///
/// [`is_due`]: DebouncedSaver::is_due
/// [`flush`]: DebouncedSaver::flush
#[derive(Debug, Clone)]
pub struct DebouncedSaver {
    debounce: Duration,
    dirty: bool,
    deadline: Option<Instant>,
    last_save: Option<Instant>,
    requests: u64,
}

impl DebouncedSaver {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            dirty: false,
            deadline: None,
            last_save: None,
            requests: 0,
        }
    }

    /// Create a saver using the configured debounce window.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.save_debounce())
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Check if the document has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// When the pending save becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn last_save(&self) -> Option<Instant> {
        self.last_save
    }

    /// Number of save requests received so far.
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// Check if a save should happen at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        self.dirty && self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Encode the document and pass it to `write`, then mark it clean.
    ///
    /// On any failure the document stays dirty and the deadline is kept, so
    /// the next poll of [`is_due`](DebouncedSaver::is_due) retries.
    pub async fn flush<F, Fut>(&mut self, document: &DocumentState, write: F) -> SaveResult<()>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = SaveResult<()>>,
    {
        let json = document.to_json()?;
        let bytes = json.len();
        if let Err(err) = write(json).await {
            warn!("Save failed, will retry: {err}");
            return Err(err);
        }

        self.last_save = Some(Instant::now());
        self.dirty = false;
        self.deadline = None;
        debug!("Saved document ({bytes} bytes, {} requests)", self.requests);
        Ok(())
    }

    /// Flush if the save is due at `now`. Returns true if a save was performed.
    pub async fn flush_if_due<F, Fut>(&mut self, now: Instant, document: &DocumentState, write: F) -> SaveResult<bool>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = SaveResult<()>>,
    {
        if !self.is_due(now) {
            return Ok(false);
        }
        self.flush(document, write).await?;
        Ok(true)
    }
}

impl Default for DebouncedSaver {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl SaveScheduler for DebouncedSaver {
    fn schedule_save(&mut self, immediate: bool) {
        let now = Instant::now();
        self.dirty = true;
        self.requests += 1;
        self.deadline = Some(if immediate { now } else { now + self.debounce });
        debug!("Save requested (immediate: {immediate}, pending requests: {})", self.requests);
    }
}
