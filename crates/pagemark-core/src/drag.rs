//! Pointer drag sessions for moving and resizing annotations.
//!
//! A [`DragSession`] is a small state machine driven by the host's event
//! loop:
//!
//! ```text
//! Idle --pointer_down--> Armed --first real move--> Dragging
//!   ^                      |                          |
//!   +------ pointer_up / pointer_cancel / Escape -----+   (via Settling)
//! ```
//!
//! While dragging only visual feedback changes; the document is mutated once,
//! by [`DragTarget::commit`], when the gesture ends. The history transaction
//! is opened on the first non-zero movement and committed only if the target
//! reports a real change.

use crate::annotation::{
    Annotation, AnnotationId, point_from_canvas, rect_to_canvas, size_from_canvas,
};
use crate::config::EngineConfig;
use crate::document::DocumentState;
use crate::editor::Editor;
use crate::error::EditError;
use crate::history::HistoryId;
use crate::input::{CaptureError, Key, ModifierBindings, Modifiers, MouseButton, PointerEvent, PointerId};
use crate::snap::{
    AlignmentLines, GuideLine, SnapModifiers, SnapRequest, SnapResult, SnapSettings,
    collect_alignment_lines, resolve_move, resolve_resize,
};
use crate::storage::SaveScheduler;
use kurbo::{Point, Size, Vec2};
use log::{debug, trace, warn};

/// Tolerance when comparing normalized geometry for "did anything change".
const GEOMETRY_EPSILON: f64 = 1e-9;

/// What a drag does to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragKind {
    /// Translate, keeping the size.
    Move,
    /// Drag the bottom-right corner, keeping the top-left fixed.
    Resize,
}

impl DragKind {
    pub fn verb(self) -> &'static str {
        match self {
            DragKind::Move => "Move",
            DragKind::Resize => "Resize",
        }
    }
}

/// Lifecycle state of a [`DragSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    /// Pointer is down but has not moved yet.
    Armed,
    /// Pointer has moved; a history transaction is open.
    Dragging,
    /// The gesture is ending and the target is committing.
    Settling,
}

/// Whether the host needs to schedule an animation frame after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRequest {
    /// First move since the last frame: request one.
    Schedule,
    /// A frame is already pending; this move was folded into it.
    Coalesced,
    /// No active session for this pointer.
    Ignored,
}

/// Starting geometry of a drag target, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGeometry {
    /// Top-left corner.
    pub origin: Point,
    pub size: Size,
    /// Size of the page canvas the target lives on.
    pub canvas: Size,
}

/// Visual-only state for one animation frame.
///
/// Hosts should apply `offset` as a translation (and `size` for resizes)
/// without relayout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragFeedback {
    pub kind: DragKind,
    /// Translation from the starting position.
    pub offset: Vec2,
    pub position: Point,
    pub size: Size,
    /// Alignment guide to draw on the x axis.
    pub guide_x: Option<GuideLine>,
    /// Alignment guide to draw on the y axis.
    pub guide_y: Option<GuideLine>,
}

/// Final geometry handed to [`DragTarget::commit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragRelease {
    pub kind: DragKind,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub canvas: Size,
    /// Whether the pointer moved at all during the gesture.
    pub did_move: bool,
}

impl DragRelease {
    pub fn position(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Top-left corner as a fraction of the canvas.
    pub fn normalized_origin(&self) -> Point {
        point_from_canvas(self.position(), self.canvas)
    }

    /// Size as a fraction of the canvas.
    pub fn normalized_size(&self) -> Size {
        size_from_canvas(self.size(), self.canvas)
    }
}

/// How a gesture ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// The event did not belong to an active session.
    Ignored,
    /// The target reported no change.
    Unchanged,
    /// The target changed but the pointer never moved, so nothing was recorded.
    Changed,
    /// The change was recorded as a new history entry.
    Committed(HistoryId),
}

/// Something that can be dragged.
pub trait DragTarget {
    type Error;

    /// Current geometry, or `None` if the target cannot be dragged.
    fn geometry(&self, document: &DocumentState) -> Option<DragGeometry>;

    /// Guide lines to snap against. Computed once per session.
    fn alignment_lines(&self, _document: &DocumentState, _canvas: Size) -> AlignmentLines {
        AlignmentLines::new()
    }

    /// History label for the gesture.
    fn label(&self, document: &DocumentState, kind: DragKind) -> String;

    /// Show in-progress feedback. Called at most once per animation frame.
    fn show_feedback(&mut self, feedback: &DragFeedback);

    /// Remove any feedback.
    fn clear_feedback(&mut self);

    /// Apply the final geometry to the document. Called exactly once per
    /// settled gesture; returns whether anything actually changed.
    fn commit(&mut self, document: &mut DocumentState, release: &DragRelease) -> Result<bool, Self::Error>;
}

/// Exclusive pointer capture provided by the host.
pub trait PointerCapture {
    fn capture(&mut self, pointer: PointerId) -> Result<(), CaptureError>;
    fn release(&mut self, pointer: PointerId);
}

/// Capture for hosts that deliver all pointer events anyway.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapture;

impl PointerCapture for NoCapture {
    fn capture(&mut self, _pointer: PointerId) -> Result<(), CaptureError> {
        Ok(())
    }

    fn release(&mut self, _pointer: PointerId) {}
}

#[derive(Debug, Clone)]
struct ActiveDrag {
    pointer: PointerId,
    start_pointer: Point,
    geometry: DragGeometry,
    lines: AlignmentLines,
    label: String,
    delta: Vec2,
    modifiers: SnapModifiers,
    started: bool,
    frame_pending: bool,
}

impl ActiveDrag {
    fn resolve(&self, kind: DragKind, settings: &SnapSettings) -> SnapResult {
        let request = SnapRequest {
            origin: self.geometry.origin,
            size: self.geometry.size,
            delta: self.delta,
            canvas: self.geometry.canvas,
            modifiers: self.modifiers,
        };
        match kind {
            DragKind::Move => resolve_move(&request, &self.lines, settings),
            DragKind::Resize => resolve_resize(&request, &self.lines, settings),
        }
    }
}

/// One interactive drag gesture at a time on one target.
#[derive(Debug)]
pub struct DragSession<C: PointerCapture = NoCapture> {
    kind: DragKind,
    settings: SnapSettings,
    bindings: ModifierBindings,
    capture: C,
    phase: DragPhase,
    active: Option<ActiveDrag>,
}

impl DragSession<NoCapture> {
    pub fn new(kind: DragKind, config: &EngineConfig) -> Self {
        Self::with_capture(kind, config, NoCapture)
    }
}

impl<C: PointerCapture> DragSession<C> {
    pub fn with_capture(kind: DragKind, config: &EngineConfig, capture: C) -> Self {
        Self {
            kind,
            settings: config.snap,
            bindings: config.modifiers,
            capture,
            phase: DragPhase::Idle,
            active: None,
        }
    }

    pub fn kind(&self) -> DragKind {
        self.kind
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn capture(&self) -> &C {
        &self.capture
    }

    /// Arm the session. Returns false if the event was not accepted.
    pub fn pointer_down<S, T>(&mut self, event: &PointerEvent, target: &T, editor: &Editor<S>) -> bool
    where
        S: SaveScheduler,
        T: DragTarget,
    {
        if self.active.is_some() {
            trace!("Pointer down from {:?} ignored: drag already active", event.id);
            return false;
        }
        if event.button != MouseButton::Left {
            trace!("Pointer down with {:?} ignored", event.button);
            return false;
        }
        let document = editor.document();
        let Some(geometry) = target.geometry(document) else {
            debug!("Drag target has no geometry; not arming");
            return false;
        };

        if let Err(err) = self.capture.capture(event.id) {
            warn!("{err}; continuing without capture");
        }

        self.active = Some(ActiveDrag {
            pointer: event.id,
            start_pointer: event.position,
            lines: target.alignment_lines(document, geometry.canvas),
            label: target.label(document, self.kind),
            geometry,
            delta: Vec2::ZERO,
            modifiers: self.bindings.resolve(&event.modifiers),
            started: false,
            frame_pending: false,
        });
        self.phase = DragPhase::Armed;
        debug!("{:?} drag armed at {:?}", self.kind, event.position);
        true
    }

    /// Track pointer movement. The first non-zero movement opens the
    /// history transaction.
    pub fn pointer_move<S: SaveScheduler>(&mut self, event: &PointerEvent, editor: &mut Editor<S>) -> FrameRequest {
        let bindings = self.bindings;
        let Some(active) = self.active.as_mut().filter(|a| a.pointer == event.id) else {
            trace!("Pointer move from {:?} ignored", event.id);
            return FrameRequest::Ignored;
        };

        active.delta = event.position - active.start_pointer;
        active.modifiers = bindings.resolve(&event.modifiers);

        if !active.started && active.delta != Vec2::ZERO {
            editor.begin(Some(active.label.as_str()));
            active.started = true;
            self.phase = DragPhase::Dragging;
            debug!("Drag started: {}", active.label);
        }

        request_frame(active)
    }

    /// Re-evaluate snapping after modifier keys changed without movement.
    pub fn modifiers_changed(&mut self, modifiers: &Modifiers) -> FrameRequest {
        let bindings = self.bindings;
        let Some(active) = self.active.as_mut() else {
            return FrameRequest::Ignored;
        };
        let resolved = bindings.resolve(modifiers);
        if resolved == active.modifiers {
            return FrameRequest::Coalesced;
        }
        active.modifiers = resolved;
        request_frame(active)
    }

    /// Apply the pending visual update, if any.
    pub fn animation_frame<T: DragTarget>(&mut self, target: &mut T) -> Option<DragFeedback> {
        let kind = self.kind;
        let settings = self.settings;
        let active = self.active.as_mut()?;
        if !active.frame_pending {
            return None;
        }
        active.frame_pending = false;

        let result = active.resolve(kind, &settings);
        let feedback = DragFeedback {
            kind,
            offset: result.position - active.geometry.origin,
            position: result.position,
            size: result.size,
            guide_x: result.guide_x,
            guide_y: result.guide_y,
        };
        target.show_feedback(&feedback);
        Some(feedback)
    }

    /// Finish the gesture at the release position.
    pub fn pointer_up<S, T>(
        &mut self,
        event: &PointerEvent,
        target: &mut T,
        editor: &mut Editor<S>,
    ) -> Result<DragOutcome, T::Error>
    where
        S: SaveScheduler,
        T: DragTarget,
    {
        let bindings = self.bindings;
        let Some(active) = self.active.as_mut().filter(|a| a.pointer == event.id) else {
            trace!("Pointer up from {:?} ignored", event.id);
            return Ok(DragOutcome::Ignored);
        };

        active.delta = event.position - active.start_pointer;
        active.modifiers = bindings.resolve(&event.modifiers);
        if !active.started && active.delta != Vec2::ZERO {
            editor.begin(Some(active.label.as_str()));
            active.started = true;
        }

        self.settle(target, editor)
    }

    /// The platform cancelled the pointer. Settles at the last known position.
    pub fn pointer_cancel<S, T>(
        &mut self,
        pointer: PointerId,
        target: &mut T,
        editor: &mut Editor<S>,
    ) -> Result<DragOutcome, T::Error>
    where
        S: SaveScheduler,
        T: DragTarget,
    {
        if self.active.as_ref().is_none_or(|a| a.pointer != pointer) {
            return Ok(DragOutcome::Ignored);
        }
        debug!("Pointer {pointer:?} cancelled; settling drag");
        self.settle(target, editor)
    }

    /// Escape abandons the gesture without touching the document.
    /// Returns true if a session was cancelled.
    pub fn key_down<S, T>(&mut self, key: &Key, target: &mut T, editor: &mut Editor<S>) -> bool
    where
        S: SaveScheduler,
        T: DragTarget,
    {
        if *key != Key::Escape {
            return false;
        }
        let Some(active) = self.active.take() else {
            return false;
        };

        self.capture.release(active.pointer);
        target.clear_feedback();
        if active.started {
            editor.discard_transaction();
        }
        self.phase = DragPhase::Idle;
        debug!("Drag cancelled: {}", active.label);
        true
    }

    fn settle<S, T>(&mut self, target: &mut T, editor: &mut Editor<S>) -> Result<DragOutcome, T::Error>
    where
        S: SaveScheduler,
        T: DragTarget,
    {
        let Some(active) = self.active.take() else {
            return Ok(DragOutcome::Ignored);
        };
        self.phase = DragPhase::Settling;

        // Released before commit so a failing commit cannot keep the pointer captured.
        self.capture.release(active.pointer);
        target.clear_feedback();

        let result = active.resolve(self.kind, &self.settings);
        let release = DragRelease {
            kind: self.kind,
            left: result.position.x,
            top: result.position.y,
            width: result.size.width,
            height: result.size.height,
            canvas: active.geometry.canvas,
            did_move: active.started,
        };
        trace!("Settling drag: {release:?}");

        let changed = target.commit(editor.document_mut(), &release);
        self.phase = DragPhase::Idle;

        match changed {
            Ok(true) if active.started => {
                let entry = editor.commit(None);
                Ok(DragOutcome::Committed(entry))
            }
            Ok(true) => Ok(DragOutcome::Changed),
            Ok(false) => {
                if active.started {
                    editor.discard_transaction();
                }
                Ok(DragOutcome::Unchanged)
            }
            Err(err) => {
                if active.started {
                    editor.discard_transaction();
                }
                Err(err)
            }
        }
    }
}

fn request_frame(active: &mut ActiveDrag) -> FrameRequest {
    if active.frame_pending {
        FrameRequest::Coalesced
    } else {
        active.frame_pending = true;
        FrameRequest::Schedule
    }
}

/// Drags one annotation of the document.
#[derive(Debug, Clone)]
pub struct AnnotationDrag {
    id: AnnotationId,
    canvas: Size,
    feedback: Option<DragFeedback>,
}

impl AnnotationDrag {
    /// `canvas` is the pixel size of the page the annotation is drawn on.
    pub fn new(id: AnnotationId, canvas: Size) -> Self {
        Self {
            id,
            canvas,
            feedback: None,
        }
    }

    pub fn id(&self) -> AnnotationId {
        self.id
    }

    /// Feedback from the latest animation frame, for the renderer.
    pub fn feedback(&self) -> Option<&DragFeedback> {
        self.feedback.as_ref()
    }

    fn annotation<'a>(&self, document: &'a DocumentState) -> Option<&'a Annotation> {
        document.find(self.id).map(|(_, annotation)| annotation)
    }
}

impl DragTarget for AnnotationDrag {
    type Error = EditError;

    fn geometry(&self, document: &DocumentState) -> Option<DragGeometry> {
        let bounds = rect_to_canvas(self.annotation(document)?.bounds(), self.canvas).abs();
        Some(DragGeometry {
            origin: bounds.origin(),
            size: bounds.size(),
            canvas: self.canvas,
        })
    }

    fn alignment_lines(&self, document: &DocumentState, canvas: Size) -> AlignmentLines {
        match document.page_of(self.id) {
            Some(page) => collect_alignment_lines(document.page_annotations(page), Some(self.id), canvas),
            None => AlignmentLines::new(),
        }
    }

    fn label(&self, document: &DocumentState, kind: DragKind) -> String {
        let noun = self
            .annotation(document)
            .map(Annotation::kind_name)
            .unwrap_or("annotation");
        format!("{} {noun}", kind.verb())
    }

    fn show_feedback(&mut self, feedback: &DragFeedback) {
        self.feedback = Some(*feedback);
    }

    fn clear_feedback(&mut self) {
        self.feedback = None;
    }

    fn commit(&mut self, document: &mut DocumentState, release: &DragRelease) -> Result<bool, EditError> {
        let annotation = document
            .get_mut(self.id)
            .ok_or(EditError::AnnotationNotFound(self.id))?;

        match release.kind {
            DragKind::Move => {
                let origin = release.normalized_origin();
                let before = annotation.origin();
                if !release.did_move || (origin - before).hypot() < GEOMETRY_EPSILON {
                    return Ok(false);
                }
                annotation.set_origin(origin);
                Ok(true)
            }
            DragKind::Resize => {
                if !release.did_move {
                    return Ok(false);
                }
                if !annotation.is_resizable() {
                    return Err(EditError::unsupported(annotation.kind_name(), "resizing"));
                }
                let size = release.normalized_size();
                let before = annotation.bounds().size();
                let unchanged = (size.width - before.width).abs() < GEOMETRY_EPSILON
                    && (size.height - before.height).abs() < GEOMETRY_EPSILON;
                if unchanged {
                    return Ok(false);
                }
                Ok(annotation.resize(size))
            }
        }
    }
}
