//! Snapshot-based undo/redo timeline.
//!
//! The timeline is a single branch of whole-document snapshots with a cursor
//! marking the present. Entries before the cursor are undoable, entries after
//! it are redoable. Committing after an undo discards the redoable entries.
//!
//! # Usage
//!
//! ```ignore
//! let mut history = HistoryTimeline::new();
//! history.init(&doc, None);
//!
//! history.begin(&doc, Some("Move highlight"));
//! // ... mutate `doc` ...
//! history.commit(&doc, None);
//!
//! history.undo(&mut doc);
//! ```
//!
//! None of the operations fail: stale ids and out-of-range undo/redo calls
//! report `false` and leave everything untouched.

use crate::document::{DocumentSnapshot, DocumentState};
use log::debug;
use std::fmt;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// Maximum number of past entries kept behind the present one.
pub const MAX_HISTORY: usize = 100;

/// Label given to the entry created by [`HistoryTimeline::init`].
pub const INITIAL_LABEL: &str = "Initial state";

/// Identifier of a history entry. Monotonic, never reused.
pub type HistoryId = u64;

/// A single point on the timeline.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub id: HistoryId,
    /// Human-readable description of the edit that produced this state.
    pub label: String,
    /// When this entry was created.
    pub timestamp: Instant,
    snapshot: DocumentSnapshot,
}

impl HistoryEntry {
    /// The document state captured by this entry.
    pub fn snapshot(&self) -> &DocumentSnapshot {
        &self.snapshot
    }
}

/// Change notification sent to history listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEvent {
    Initialized { present: HistoryId },
    Committed { present: HistoryId, evicted: usize },
    Undone { present: HistoryId },
    Redone { present: HistoryId },
    Jumped { present: HistoryId },
}

impl HistoryEvent {
    /// Id of the entry that is present after the change.
    pub fn present(&self) -> HistoryId {
        match *self {
            HistoryEvent::Initialized { present }
            | HistoryEvent::Committed { present, .. }
            | HistoryEvent::Undone { present }
            | HistoryEvent::Redone { present }
            | HistoryEvent::Jumped { present } => present,
        }
    }
}

/// Callback invoked after every history change.
pub type HistoryListener = Box<dyn FnMut(HistoryEvent)>;

/// Chronological (oldest first) split of the timeline around the cursor.
#[derive(Debug, Clone, Copy)]
pub struct TimelineView<'a> {
    pub past: &'a [HistoryEntry],
    pub present: Option<&'a HistoryEntry>,
    pub future: &'a [HistoryEntry],
}

/// Where an entry sits relative to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelinePosition {
    Past,
    Present,
    Future,
}

/// Row of the recency-first listing used by undo/redo menus.
#[derive(Debug, Clone, Copy)]
pub struct DisplayEntry<'a> {
    pub entry: &'a HistoryEntry,
    pub position: TimelinePosition,
}

/// Branching undo/redo store.
pub struct HistoryTimeline {
    entries: Vec<HistoryEntry>,
    /// Index of the present entry; `None` only while empty.
    cursor: Option<usize>,
    next_id: HistoryId,
    /// Label proposed by the open transaction, consumed on commit.
    pending_label: Option<String>,
    max_past: usize,
    listeners: Vec<HistoryListener>,
}

impl Default for HistoryTimeline {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HistoryTimeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryTimeline")
            .field("entries", &self.entries.len())
            .field("cursor", &self.cursor)
            .field("next_id", &self.next_id)
            .field("pending_label", &self.pending_label)
            .field("max_past", &self.max_past)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl HistoryTimeline {
    /// Create an empty timeline keeping at most [`MAX_HISTORY`] past entries.
    pub fn new() -> Self {
        Self::with_max_past(MAX_HISTORY)
    }

    /// Create an empty timeline with a custom cap on past entries.
    pub fn with_max_past(max_past: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            next_id: 1,
            pending_label: None,
            max_past,
            listeners: Vec::new(),
        }
    }

    /// Register a listener called after every change.
    pub fn subscribe(&mut self, listener: HistoryListener) {
        self.listeners.push(listener);
    }

    /// Reset to a single present entry capturing `doc`.
    pub fn init(&mut self, doc: &DocumentState, label: Option<&str>) -> HistoryId {
        let label = label.unwrap_or(INITIAL_LABEL).to_string();
        let entry = self.make_entry(doc, label);
        let id = entry.id;

        self.entries.clear();
        self.entries.push(entry);
        self.cursor = Some(0);
        self.pending_label = None;

        debug!("History initialized at entry {id}");
        self.notify(HistoryEvent::Initialized { present: id });
        id
    }

    /// Open a transaction. Initializes the timeline from `doc` if it is empty.
    ///
    /// Calling `begin` again before `commit` replaces the pending label.
    pub fn begin(&mut self, doc: &DocumentState, label: Option<&str>) {
        if self.entries.is_empty() {
            self.init(doc, None);
        }
        self.pending_label = label.map(str::to_owned);
        debug!("History transaction begun: {:?}", self.pending_label);
    }

    /// Drop the pending label of an abandoned transaction.
    pub fn discard_pending(&mut self) {
        if let Some(label) = self.pending_label.take() {
            debug!("History transaction discarded: {label}");
        }
    }

    /// Record `doc` as the new present entry, discarding any redoable entries.
    ///
    /// Label resolution: `label`, then the pending label, then `"Edit {id}"`.
    pub fn commit(&mut self, doc: &DocumentState, label: Option<&str>) -> HistoryId {
        if let Some(cursor) = self.cursor {
            let discarded = self.entries.len() - cursor - 1;
            if discarded > 0 {
                debug!("Discarding {discarded} redo entries");
            }
            self.entries.truncate(cursor + 1);
        }

        let id = self.next_id;
        let label = label
            .map(str::to_owned)
            .or_else(|| self.pending_label.take())
            .unwrap_or_else(|| format!("Edit {id}"));
        let entry = self.make_entry(doc, label);
        debug!("History commit {id}: {}", entry.label);

        self.entries.push(entry);
        self.cursor = Some(self.entries.len() - 1);
        self.pending_label = None;
        let evicted = self.evict();

        self.notify(HistoryEvent::Committed { present: id, evicted });
        id
    }

    /// Step back one entry and restore it into `doc`.
    pub fn undo(&mut self, doc: &mut DocumentState) -> bool {
        let Some(cursor) = self.cursor else {
            return false;
        };
        if cursor == 0 {
            return false;
        }
        let present = self.restore_at(cursor - 1, doc);
        debug!("Undo to entry {present}");
        self.notify(HistoryEvent::Undone { present });
        true
    }

    /// Step forward one entry and restore it into `doc`.
    pub fn redo(&mut self, doc: &mut DocumentState) -> bool {
        let Some(cursor) = self.cursor else {
            return false;
        };
        if cursor + 1 >= self.entries.len() {
            return false;
        }
        let present = self.restore_at(cursor + 1, doc);
        debug!("Redo to entry {present}");
        self.notify(HistoryEvent::Redone { present });
        true
    }

    /// Move the cursor straight to the entry with `id` and restore it.
    ///
    /// Unknown ids return `false`; the present entry is a no-op `true`.
    pub fn jump_to(&mut self, id: HistoryId, doc: &mut DocumentState) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.id == id) else {
            debug!("Jump to unknown history entry {id} ignored");
            return false;
        };
        if self.cursor == Some(index) {
            return true;
        }
        let present = self.restore_at(index, doc);
        debug!("Jumped to entry {present}");
        self.notify(HistoryEvent::Jumped { present });
        true
    }

    /// Chronological past/present/future split.
    pub fn timeline(&self) -> TimelineView<'_> {
        match self.cursor {
            Some(cursor) => TimelineView {
                past: &self.entries[..cursor],
                present: self.entries.get(cursor),
                future: &self.entries[cursor + 1..],
            },
            None => TimelineView {
                past: &[],
                present: None,
                future: &[],
            },
        }
    }

    /// All entries, newest first, tagged with their position.
    pub fn display_entries(&self) -> Vec<DisplayEntry<'_>> {
        self.entries
            .iter()
            .enumerate()
            .rev()
            .map(|(index, entry)| DisplayEntry {
                entry,
                position: self.position_of(index),
            })
            .collect()
    }

    /// All entries in chronological order.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// The present entry.
    pub fn present(&self) -> Option<&HistoryEntry> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    /// Index of the present entry.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn pending_label(&self) -> Option<&str> {
        self.pending_label.as_deref()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.entries.len())
    }

    /// Label of the edit that `undo` would revert.
    pub fn undo_label(&self) -> Option<&str> {
        match self.cursor {
            Some(c) if c > 0 => Some(self.entries[c].label.as_str()),
            _ => None,
        }
    }

    /// Label of the edit that `redo` would re-apply.
    pub fn redo_label(&self) -> Option<&str> {
        self.cursor
            .and_then(|c| self.entries.get(c + 1))
            .map(|e| e.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_past(&self) -> usize {
        self.max_past
    }

    /// Change the cap on past entries, evicting immediately if needed.
    pub fn set_max_past(&mut self, max_past: usize) {
        self.max_past = max_past;
        self.evict();
    }

    fn make_entry(&mut self, doc: &DocumentState, label: String) -> HistoryEntry {
        let id = self.next_id;
        self.next_id += 1;
        HistoryEntry {
            id,
            label,
            timestamp: Instant::now(),
            snapshot: DocumentSnapshot::capture(doc),
        }
    }

    fn restore_at(&mut self, index: usize, doc: &mut DocumentState) -> HistoryId {
        let entry = &self.entries[index];
        entry.snapshot.restore(doc);
        let id = entry.id;
        self.cursor = Some(index);
        self.pending_label = None;
        id
    }

    /// Drop the oldest past entries beyond the cap. Returns how many went.
    fn evict(&mut self) -> usize {
        let Some(cursor) = self.cursor else {
            return 0;
        };
        if cursor <= self.max_past {
            return 0;
        }
        let excess = cursor - self.max_past;
        self.entries.drain(..excess);
        self.cursor = Some(cursor - excess);
        debug!("Evicted {excess} oldest history entries");
        excess
    }

    fn position_of(&self, index: usize) -> TimelinePosition {
        match self.cursor {
            Some(c) if index < c => TimelinePosition::Past,
            Some(c) if index == c => TimelinePosition::Present,
            _ => TimelinePosition::Future,
        }
    }

    fn notify(&mut self, event: HistoryEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }
}
