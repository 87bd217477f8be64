//! Persistence hooks.
//!
//! The editing engine only ever *requests* a save through a [`SaveScheduler`].
//! When a debounced save comes due, [`DebouncedSaver::flush`] encodes the
//! document and hands the JSON to a writer the host supplies; where it ends
//! up is the host's business.

mod autosave;

pub use autosave::{DebouncedSaver, NoopSaver, SaveScheduler};

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Failure while flushing a save.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Save failed: {0}")]
    Write(String),
}

/// Result type for save flushes.
pub type SaveResult<T> = Result<T, SaveError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;
