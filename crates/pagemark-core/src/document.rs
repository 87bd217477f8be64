//! Document state and snapshots.

use crate::annotation::{Annotation, AnnotationId, PageNumber};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Live annotation state of an open document.
///
/// The rendered pages themselves live elsewhere; this is only the part the
/// editing engine mutates and the history restores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentState {
    /// Page currently shown.
    pub current_page: PageNumber,
    /// Zoom factor (1.0 = 100%).
    pub scale: f64,
    /// Annotations per page, in z-order (back to front).
    pub annotations: BTreeMap<PageNumber, Vec<Annotation>>,
}

impl Default for DocumentState {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentState {
    /// Create an empty document positioned on page 1 at 100%.
    pub fn new() -> Self {
        Self {
            current_page: 1,
            scale: 1.0,
            annotations: BTreeMap::new(),
        }
    }

    /// Annotations on a page (empty slice if the page has none).
    pub fn page_annotations(&self, page: PageNumber) -> &[Annotation] {
        self.annotations.get(&page).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append an annotation to a page and return its id.
    pub fn add_annotation(&mut self, page: PageNumber, annotation: Annotation) -> AnnotationId {
        let id = annotation.id();
        self.annotations.entry(page).or_default().push(annotation);
        id
    }

    /// Remove an annotation by id. Pages left empty are dropped.
    pub fn remove_annotation(&mut self, id: AnnotationId) -> Option<(PageNumber, Annotation)> {
        let (page, index) = self.locate(id)?;
        let list = self.annotations.get_mut(&page)?;
        let removed = list.remove(index);
        if list.is_empty() {
            self.annotations.remove(&page);
        }
        Some((page, removed))
    }

    /// Find an annotation and the page it lives on.
    pub fn find(&self, id: AnnotationId) -> Option<(PageNumber, &Annotation)> {
        self.annotations
            .iter()
            .find_map(|(&page, list)| list.iter().find(|a| a.id() == id).map(|a| (page, a)))
    }

    /// Get a mutable reference to an annotation by id.
    pub fn get_mut(&mut self, id: AnnotationId) -> Option<&mut Annotation> {
        self.annotations
            .values_mut()
            .find_map(|list| list.iter_mut().find(|a| a.id() == id))
    }

    /// Page an annotation lives on.
    pub fn page_of(&self, id: AnnotationId) -> Option<PageNumber> {
        self.find(id).map(|(page, _)| page)
    }

    /// Total number of annotations across all pages.
    pub fn len(&self) -> usize {
        self.annotations.values().map(Vec::len).sum()
    }

    /// Check if the document has no annotations.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a document from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn locate(&self, id: AnnotationId) -> Option<(PageNumber, usize)> {
        self.annotations.iter().find_map(|(&page, list)| {
            list.iter().position(|a| a.id() == id).map(|index| (page, index))
        })
    }
}

/// Independent deep copy of everything needed to restore a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    current_page: PageNumber,
    scale: f64,
    annotations: BTreeMap<PageNumber, Vec<Annotation>>,
}

impl DocumentSnapshot {
    /// Capture a snapshot of the current document state.
    pub fn capture(state: &DocumentState) -> Self {
        Self {
            current_page: state.current_page,
            scale: state.scale,
            annotations: state.annotations.clone(),
        }
    }

    /// Replace the live state with this snapshot (no merging).
    pub fn restore(&self, state: &mut DocumentState) {
        state.current_page = self.current_page;
        state.scale = self.scale;
        state.annotations = self.annotations.clone();
    }

    pub fn current_page(&self) -> PageNumber {
        self.current_page
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Annotations held by the snapshot.
    pub fn annotations(&self) -> &BTreeMap<PageNumber, Vec<Annotation>> {
        &self.annotations
    }
}
