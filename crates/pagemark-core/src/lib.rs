//! Pagemark Core Library
//!
//! Interactive editing engine for page annotations: a branching undo/redo
//! timeline over the annotation document, a pointer drag controller, and the
//! snapping geometry both rely on. Rendering and file formats live elsewhere.

pub mod annotation;
pub mod config;
pub mod document;
pub mod drag;
pub mod editor;
pub mod error;
pub mod history;
pub mod input;
pub mod operations;
pub mod snap;
pub mod storage;

pub use annotation::{
    Anchor, Annotation, AnnotationId, Highlight, ImageAnnotation, ImageFormat, ImageSource, Note,
    PageNumber, SerializableColor, TextBox, TextStyle,
};
pub use config::{ConfigError, EngineConfig};
pub use document::{DocumentSnapshot, DocumentState};
pub use drag::{
    AnnotationDrag, DragFeedback, DragGeometry, DragKind, DragOutcome, DragPhase, DragRelease,
    DragSession, DragTarget, FrameRequest, NoCapture, PointerCapture,
};
pub use editor::{ChangeListener, DocumentChange, Editor};
pub use error::{EditError, EditResult};
pub use history::{
    DisplayEntry, HistoryEntry, HistoryEvent, HistoryId, HistoryTimeline, INITIAL_LABEL, MAX_HISTORY,
    TimelinePosition, TimelineView,
};
pub use input::{CaptureError, Key, ModifierBindings, ModifierKey, Modifiers, MouseButton, PointerEvent, PointerId};
pub use operations::Operation;
pub use snap::{
    AlignmentLines, GuideAxis, GuideKind, GuideLine, SnapModifiers, SnapRequest, SnapResult, SnapSettings,
    collect_alignment_lines, resolve_move, resolve_resize, snap_move, snap_resize, snap_to_container_edge,
    snap_to_grid,
};
pub use storage::{DebouncedSaver, NoopSaver, SaveError, SaveResult, SaveScheduler};
