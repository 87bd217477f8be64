//! The editing session context.
//!
//! An [`Editor`] owns everything one open document needs: its annotation
//! state, the undo timeline, configuration, the save scheduler and change
//! subscribers. Creating it starts a session and dropping it ends one.

use crate::annotation::{Annotation, AnnotationId, ImageSource, PageNumber, TextStyle};
use crate::config::{ConfigError, EngineConfig};
use crate::document::DocumentState;
use crate::error::{EditError, EditResult};
use crate::history::{HistoryEvent, HistoryId, HistoryTimeline};
use crate::operations::{self, Operation};
use crate::storage::{BoxFuture, SaveScheduler};
use kurbo::{Point, Size};
use log::{debug, trace};
use std::fmt;

/// What changed in the document.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentChange {
    /// An edit was committed as a new history entry.
    Committed { entry: HistoryId, label: String },
    /// The document was replaced by an existing history entry.
    Restored { entry: HistoryId },
}

/// Callback for document changes.
pub type ChangeListener = Box<dyn FnMut(&DocumentChange)>;

/// One document editing session.
pub struct Editor<S: SaveScheduler> {
    document: DocumentState,
    history: HistoryTimeline,
    config: EngineConfig,
    saver: S,
    listeners: Vec<ChangeListener>,
}

impl<S: SaveScheduler + fmt::Debug> fmt::Debug for Editor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("document", &self.document)
            .field("history", &self.history)
            .field("config", &self.config)
            .field("saver", &self.saver)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<S: SaveScheduler> Editor<S> {
    /// Start a session. The history stays empty until [`init_history`] or
    /// the first transaction. Fails if `config` does not validate.
    ///
    /// [`init_history`]: Editor::init_history
    pub fn new(document: DocumentState, config: EngineConfig, saver: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let history = HistoryTimeline::with_max_past(config.max_history);
        Ok(Self {
            document,
            history,
            config,
            saver,
            listeners: Vec::new(),
        })
    }

    pub fn document(&self) -> &DocumentState {
        &self.document
    }

    /// Mutable access for drag targets. Edits made here are only recorded
    /// if the caller brackets them with [`begin`](Editor::begin) and
    /// [`commit`](Editor::commit).
    pub(crate) fn document_mut(&mut self) -> &mut DocumentState {
        &mut self.document
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn history(&self) -> &HistoryTimeline {
        &self.history
    }

    pub fn saver(&self) -> &S {
        &self.saver
    }

    pub fn saver_mut(&mut self) -> &mut S {
        &mut self.saver
    }

    /// Subscribe to document changes made through this editor.
    pub fn subscribe_changes(&mut self, listener: impl FnMut(&DocumentChange) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Subscribe to history changes.
    pub fn subscribe_history(&mut self, listener: impl FnMut(HistoryEvent) + 'static) {
        self.history.subscribe(Box::new(listener));
    }

    /// Reset the history to the current document.
    pub fn init_history(&mut self, label: Option<&str>) -> HistoryId {
        self.history.init(&self.document, label)
    }

    /// Open a transaction.
    pub fn begin(&mut self, label: Option<&str>) {
        self.history.begin(&self.document, label);
    }

    /// Close the open transaction: record an entry, notify and request a save.
    pub fn commit(&mut self, label: Option<&str>) -> HistoryId {
        let entry = self.history.commit(&self.document, label);
        let label = self
            .history
            .present()
            .map(|e| e.label.clone())
            .unwrap_or_default();
        self.emit(DocumentChange::Committed { entry, label });
        self.saver.schedule_save(false);
        entry
    }

    /// Drop the pending label of an abandoned transaction.
    pub fn discard_transaction(&mut self) {
        self.history.discard_pending();
    }

    pub fn undo(&mut self) -> bool {
        self.navigate(&operations::UNDO, |history, document| history.undo(document))
    }

    pub fn redo(&mut self) -> bool {
        self.navigate(&operations::REDO, |history, document| history.redo(document))
    }

    /// Teleport to a history entry. Unknown ids return false.
    pub fn jump_to_history(&mut self, id: HistoryId) -> bool {
        let before = self.history.cursor();
        let mut found = false;
        self.navigate(&operations::JUMP_TO_HISTORY, |history, document| {
            found = history.jump_to(id, document);
            found && history.cursor() != before
        });
        found
    }

    /// Move the history cursor as `op`. History control is never recorded
    /// itself; when the cursor moved the restored document is announced and
    /// a save requested.
    fn navigate(
        &mut self,
        op: &Operation,
        step: impl FnOnce(&mut HistoryTimeline, &mut DocumentState) -> bool,
    ) -> bool {
        debug_assert!(!op.mutates_document, "{} must be passive", op.name);
        let moved = step(&mut self.history, &mut self.document);
        trace!("{} moved cursor: {moved}", op.name);
        if moved {
            self.after_restore();
        }
        moved
    }

    /// Run a synchronous handler as `op`.
    ///
    /// Document-mutating operations are bracketed by a transaction that is
    /// committed only when the handler succeeds. A handler error is
    /// returned unchanged and leaves the timeline untouched.
    pub fn run<R, E>(
        &mut self,
        op: &Operation,
        handler: impl FnOnce(&mut DocumentState) -> Result<R, E>,
    ) -> Result<R, E> {
        if !op.mutates_document {
            trace!("{} runs outside history", op.name);
            return handler(&mut self.document);
        }

        self.history.begin(&self.document, Some(op.label));
        match handler(&mut self.document) {
            Ok(value) => {
                self.commit(None);
                Ok(value)
            }
            Err(err) => {
                debug!("{} failed, nothing committed", op.name);
                self.history.discard_pending();
                Err(err)
            }
        }
    }

    /// Run an asynchronous handler as `op`.
    ///
    /// The transaction stays open while the future is pending and commits
    /// only once it resolves successfully.
    pub async fn run_async<R, E, F>(&mut self, op: &Operation, handler: F) -> Result<R, E>
    where
        F: for<'a> FnOnce(&'a mut DocumentState) -> BoxFuture<'a, Result<R, E>>,
    {
        if !op.mutates_document {
            trace!("{} runs outside history", op.name);
            return handler(&mut self.document).await;
        }

        self.history.begin(&self.document, Some(op.label));
        let result = handler(&mut self.document).await;
        match result {
            Ok(value) => {
                self.commit(None);
                Ok(value)
            }
            Err(err) => {
                debug!("{} failed, nothing committed", op.name);
                self.history.discard_pending();
                Err(err)
            }
        }
    }

    /// Place an annotation on a page.
    pub fn add_annotation(&mut self, page: PageNumber, annotation: Annotation) -> EditResult<AnnotationId> {
        if page == 0 {
            return Err(EditError::InvalidValue("page numbers start at 1".into()));
        }
        let op = operations::add_operation_for(&annotation);
        self.run(op, |doc| Ok(doc.add_annotation(page, annotation)))
    }

    /// Delete an annotation, returning it.
    pub fn delete_annotation(&mut self, id: AnnotationId) -> EditResult<Annotation> {
        self.run(&operations::DELETE_ANNOTATION, |doc| {
            doc.remove_annotation(id)
                .map(|(_, annotation)| annotation)
                .ok_or(EditError::AnnotationNotFound(id))
        })
    }

    /// Replace the text of a note or text box.
    pub fn set_annotation_text(&mut self, id: AnnotationId, text: impl Into<String>) -> EditResult<()> {
        let op = match self.lookup(id)? {
            Annotation::Note(_) => &operations::EDIT_NOTE_TEXT,
            Annotation::TextBox(_) => &operations::EDIT_TEXT_BOX_TEXT,
            other => return Err(EditError::unsupported(other.kind_name(), "text")),
        };
        let text = text.into();
        self.run(op, |doc| {
            let annotation = doc.get_mut(id).ok_or(EditError::AnnotationNotFound(id))?;
            annotation.set_text(text);
            Ok(())
        })
    }

    /// Restyle a text box.
    pub fn set_text_style(&mut self, id: AnnotationId, style: TextStyle) -> EditResult<()> {
        self.run(&operations::RESTYLE_TEXT_BOX, |doc| {
            match doc.get_mut(id).ok_or(EditError::AnnotationNotFound(id))? {
                Annotation::TextBox(text_box) => {
                    text_box.style = style;
                    Ok(())
                }
                other => Err(EditError::unsupported(other.kind_name(), "text styles")),
            }
        })
    }

    /// Point an image annotation at a new source.
    pub fn set_image_source(&mut self, id: AnnotationId, source: ImageSource) -> EditResult<()> {
        self.run(&operations::REPLACE_IMAGE_SOURCE, |doc| {
            match doc.get_mut(id).ok_or(EditError::AnnotationNotFound(id))? {
                Annotation::Image(image) => {
                    image.source = source;
                    Ok(())
                }
                other => Err(EditError::unsupported(other.kind_name(), "image sources")),
            }
        })
    }

    /// Move an annotation so its top-left corner is at `origin` (normalized).
    pub fn move_annotation(&mut self, id: AnnotationId, origin: Point) -> EditResult<()> {
        self.run(&operations::MOVE_ANNOTATION, |doc| {
            let annotation = doc.get_mut(id).ok_or(EditError::AnnotationNotFound(id))?;
            annotation.set_origin(origin);
            Ok(())
        })
    }

    /// Resize an annotation to `size` (normalized), keeping its top-left corner.
    pub fn resize_annotation(&mut self, id: AnnotationId, size: Size) -> EditResult<()> {
        if !(size.width > 0.0 && size.height > 0.0) {
            return Err(EditError::InvalidValue("size must be positive".into()));
        }
        let kind = self.lookup(id)?.kind_name();
        if !self.lookup(id)?.is_resizable() {
            return Err(EditError::unsupported(kind, "resizing"));
        }
        self.run(&operations::RESIZE_ANNOTATION, |doc| {
            let annotation = doc.get_mut(id).ok_or(EditError::AnnotationNotFound(id))?;
            annotation.resize(size);
            Ok(())
        })
    }

    /// Show another page. Not recorded in the history.
    pub fn go_to_page(&mut self, page: PageNumber) -> EditResult<()> {
        if page == 0 {
            return Err(EditError::InvalidValue("page numbers start at 1".into()));
        }
        self.run(&operations::GO_TO_PAGE, |doc| {
            doc.current_page = page;
            Ok(())
        })
    }

    /// Change the zoom factor. Not recorded in the history.
    pub fn set_scale(&mut self, scale: f64) -> EditResult<()> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(EditError::InvalidValue(format!("scale must be positive, got {scale}")));
        }
        self.run(&operations::SET_SCALE, |doc| {
            doc.scale = scale;
            Ok(())
        })
    }

    fn lookup(&self, id: AnnotationId) -> EditResult<&Annotation> {
        self.document
            .find(id)
            .map(|(_, annotation)| annotation)
            .ok_or(EditError::AnnotationNotFound(id))
    }

    fn after_restore(&mut self) {
        if let Some(entry) = self.history.present().map(|e| e.id) {
            self.emit(DocumentChange::Restored { entry });
        }
        self.saver.schedule_save(false);
    }

    fn emit(&mut self, change: DocumentChange) {
        for listener in &mut self.listeners {
            listener(&change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Highlight, ImageAnnotation, Note, TextBox};
    use crate::storage::NoopSaver;
    use kurbo::Rect;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Counts save requests.
    #[derive(Debug, Default)]
    struct CountingSaver {
        deferred: usize,
        immediate: usize,
    }

    impl SaveScheduler for CountingSaver {
        fn schedule_save(&mut self, immediate: bool) {
            if immediate {
                self.immediate += 1;
            } else {
                self.deferred += 1;
            }
        }
    }

    fn editor() -> Editor<CountingSaver> {
        let mut editor = Editor::new(DocumentState::new(), EngineConfig::default(), CountingSaver::default()).unwrap();
        editor.init_history(None);
        editor
    }

    fn note(text: &str) -> Annotation {
        Annotation::from(Note::new(Point::new(0.2, 0.2), text))
    }

    #[test]
    fn test_add_commits_entry_and_saves() {
        let mut editor = editor();
        let id = editor.add_annotation(1, note("hello")).unwrap();

        assert_eq!(editor.document().page_of(id), Some(1));
        assert_eq!(editor.history().len(), 2);
        assert_eq!(editor.history().present().unwrap().label, "Add note");
        assert_eq!(editor.saver().deferred, 1);
        assert!(editor.history().timeline().future.is_empty());
    }

    #[test]
    fn test_failed_handler_leaves_timeline_untouched() {
        let mut editor = editor();
        let before = editor.document().clone();

        let result: Result<(), &str> = editor.run(&operations::ADD_NOTE, |_| Err("disk on fire"));
        assert_eq!(result, Err("disk on fire"));
        assert_eq!(editor.history().len(), 1);
        assert!(editor.history().pending_label().is_none());
        assert_eq!(editor.saver().deferred, 0);
        assert_eq!(editor.document(), &before);
    }

    #[test]
    fn test_passive_operations_skip_history() {
        let mut editor = editor();
        editor.go_to_page(3).unwrap();
        editor.set_scale(1.5).unwrap();

        assert_eq!(editor.document().current_page, 3);
        assert_eq!(editor.document().scale, 1.5);
        assert_eq!(editor.history().len(), 1);
        assert_eq!(editor.saver().deferred, 0);
    }

    #[test]
    fn test_host_passive_operation_runs_outside_history() {
        let mut editor = editor();
        let tool = editor
            .run(&operations::SELECT_TOOL, |_| Ok::<_, EditError>("highlight"))
            .unwrap();

        assert_eq!(tool, "highlight");
        assert!(editor.history().pending_label().is_none());
        assert_eq!(editor.history().len(), 1);
        assert_eq!(editor.saver().deferred, 0);
    }

    #[test]
    fn test_history_controls_are_passive() {
        for op in [operations::UNDO, operations::REDO, operations::JUMP_TO_HISTORY] {
            assert!(!op.mutates_document);
        }
        let mut editor = editor();
        editor.add_annotation(1, note("a")).unwrap();
        let entries = editor.history().len();

        assert!(editor.undo());
        assert!(editor.redo());
        assert_eq!(editor.history().len(), entries);
        assert!(editor.history().pending_label().is_none());
    }

    #[test]
    fn test_invalid_values() {
        let mut editor = editor();
        assert!(matches!(editor.set_scale(0.0), Err(EditError::InvalidValue(_))));
        assert!(matches!(editor.set_scale(f64::NAN), Err(EditError::InvalidValue(_))));
        assert!(matches!(editor.go_to_page(0), Err(EditError::InvalidValue(_))));
        assert!(matches!(editor.add_annotation(0, note("x")), Err(EditError::InvalidValue(_))));
        assert_eq!(editor.history().len(), 1);
    }

    #[test]
    fn test_text_edits() {
        let mut editor = editor();
        let note_id = editor.add_annotation(1, note("a")).unwrap();
        let box_id = editor
            .add_annotation(1, Annotation::from(TextBox::new(Rect::new(0.1, 0.1, 0.3, 0.2), "b")))
            .unwrap();
        let hl_id = editor
            .add_annotation(1, Annotation::from(Highlight::new(vec![Rect::new(0.0, 0.0, 0.1, 0.1)])))
            .unwrap();

        editor.set_annotation_text(note_id, "note text").unwrap();
        assert_eq!(editor.history().present().unwrap().label, "Edit note");
        editor.set_annotation_text(box_id, "box text").unwrap();
        assert_eq!(editor.history().present().unwrap().label, "Edit text");

        let len = editor.history().len();
        assert!(matches!(
            editor.set_annotation_text(hl_id, "nope"),
            Err(EditError::Unsupported { kind: "highlight", .. })
        ));
        assert_eq!(editor.history().len(), len);
    }

    #[test]
    fn test_style_and_image_source() {
        let mut editor = editor();
        let box_id = editor
            .add_annotation(1, Annotation::from(TextBox::new(Rect::new(0.1, 0.1, 0.3, 0.2), "b")))
            .unwrap();
        let image_id = editor
            .add_annotation(
                1,
                Annotation::from(ImageAnnotation::new(
                    Rect::new(0.5, 0.5, 0.7, 0.7),
                    ImageSource::new("stamp.png"),
                )),
            )
            .unwrap();

        let style = TextStyle {
            font_size: 20.0,
            bold: true,
            ..TextStyle::default()
        };
        editor.set_text_style(box_id, style.clone()).unwrap();
        editor.set_image_source(image_id, ImageSource::new("logo.jpg")).unwrap();

        let Some((_, Annotation::TextBox(text_box))) = editor.document().find(box_id) else {
            panic!("expected text box");
        };
        assert_eq!(text_box.style, style);
        let Some((_, Annotation::Image(image))) = editor.document().find(image_id) else {
            panic!("expected image");
        };
        assert_eq!(image.source.uri, "logo.jpg");

        assert!(editor.set_text_style(image_id, style).is_err());
        assert!(editor.set_image_source(box_id, ImageSource::new("x.png")).is_err());
    }

    #[test]
    fn test_move_and_resize() {
        let mut editor = editor();
        let id = editor
            .add_annotation(1, Annotation::from(TextBox::new(Rect::new(0.1, 0.1, 0.3, 0.2), "b")))
            .unwrap();
        editor.move_annotation(id, Point::new(0.4, 0.5)).unwrap();
        editor.resize_annotation(id, Size::new(0.1, 0.1)).unwrap();

        let bounds = editor.document().find(id).unwrap().1.bounds();
        assert!((bounds.x0 - 0.4).abs() < 1e-12);
        assert!((bounds.width() - 0.1).abs() < 1e-12);
        assert_eq!(editor.history().present().unwrap().label, "Resize annotation");

        let note_id = editor.add_annotation(1, note("n")).unwrap();
        assert!(matches!(
            editor.resize_annotation(note_id, Size::new(0.1, 0.1)),
            Err(EditError::Unsupported { kind: "note", .. })
        ));
    }

    #[test]
    fn test_delete_missing() {
        let mut editor = editor();
        let id = editor.add_annotation(1, note("a")).unwrap();
        editor.delete_annotation(id).unwrap();
        assert!(editor.document().is_empty());
        assert_eq!(editor.delete_annotation(id), Err(EditError::AnnotationNotFound(id)));
        assert_eq!(editor.history().len(), 3);
    }

    #[test]
    fn test_undo_redo_restore_and_notify() {
        let mut editor = editor();
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = changes.clone();
        editor.subscribe_changes(move |change| sink.borrow_mut().push(change.clone()));

        let id = editor.add_annotation(1, note("a")).unwrap();
        assert!(editor.undo());
        assert!(editor.document().is_empty());
        assert!(!editor.undo());
        assert!(editor.redo());
        assert!(editor.document().find(id).is_some());

        let changes = changes.borrow();
        assert_eq!(changes.len(), 3);
        assert!(matches!(&changes[0], DocumentChange::Committed { label, .. } if label == "Add note"));
        assert!(matches!(changes[1], DocumentChange::Restored { .. }));
        // One save per commit plus one per cursor move.
        assert_eq!(editor.saver().deferred, 3);
    }

    #[test]
    fn test_jump_to_present_does_not_save() {
        let mut editor = editor();
        editor.add_annotation(1, note("a")).unwrap();
        let present = editor.history().present().unwrap().id;
        let saves = editor.saver().deferred;

        assert!(editor.jump_to_history(present));
        assert_eq!(editor.saver().deferred, saves);
        assert!(!editor.jump_to_history(9_999));
    }

    #[test]
    fn test_history_listener() {
        let mut editor = Editor::new(DocumentState::new(), EngineConfig::default(), NoopSaver).unwrap();
        let events = Rc::new(RefCell::new(0));
        let sink = events.clone();
        editor.subscribe_history(move |_| *sink.borrow_mut() += 1);

        editor.add_annotation(1, note("a")).unwrap();
        // Lazy init on begin, then the commit.
        assert_eq!(*events.borrow(), 2);
    }

    #[test]
    fn test_max_history_from_config() {
        let config = EngineConfig {
            max_history: 3,
            ..EngineConfig::default()
        };
        let mut editor = Editor::new(DocumentState::new(), config, NoopSaver).unwrap();
        editor.init_history(None);
        for i in 0..10 {
            editor.add_annotation(1, note(&i.to_string())).unwrap();
        }
        assert_eq!(editor.history().len(), 4);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.snap.min_size = f64::NAN;
        let result = Editor::new(DocumentState::new(), config, NoopSaver);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "snap.min_size",
                ..
            })
        ));
    }

    #[test]
    fn test_run_async() {
        let mut editor = editor();

        let id = pollster::block_on(editor.run_async(&operations::ADD_NOTE, |doc| {
            Box::pin(async move { Ok::<_, EditError>(doc.add_annotation(2, note("async"))) })
        }))
        .unwrap();
        assert_eq!(editor.document().page_of(id), Some(2));
        assert_eq!(editor.history().present().unwrap().label, "Add note");

        let result = pollster::block_on(editor.run_async(&operations::DELETE_ANNOTATION, |_| {
            Box::pin(async move { Err::<(), _>(EditError::AnnotationNotFound(id)) })
        }));
        assert!(result.is_err());
        assert_eq!(editor.history().len(), 2);
        assert_eq!(editor.saver().deferred, 1);
    }
}
