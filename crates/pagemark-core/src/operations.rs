//! Declarations of every editor operation.
//!
//! Whether an operation goes through the history is a property of its
//! declaration, never of its name.

use crate::annotation::Annotation;

/// A named editor operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operation {
    /// Stable identifier, e.g. for key bindings.
    pub name: &'static str,
    /// History label for the entry the operation produces.
    pub label: &'static str,
    /// Whether the operation changes the annotation document.
    /// Only these are bracketed by a history transaction.
    pub mutates_document: bool,
}

impl Operation {
    /// An operation that edits the document.
    pub const fn edit(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            mutates_document: true,
        }
    }

    /// Navigation, view or history control. Never recorded.
    pub const fn passive(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            mutates_document: false,
        }
    }
}

pub const GO_TO_PAGE: Operation = Operation::passive("go_to_page", "Go to page");
pub const SET_SCALE: Operation = Operation::passive("set_scale", "Zoom");
/// Declared for hosts: tool switching lives in the host UI but still runs
/// through [`Editor::run`](crate::Editor::run).
pub const SELECT_TOOL: Operation = Operation::passive("select_tool", "Select tool");
pub const UNDO: Operation = Operation::passive("undo", "Undo");
pub const REDO: Operation = Operation::passive("redo", "Redo");
pub const JUMP_TO_HISTORY: Operation = Operation::passive("jump_to_history", "Jump to history");

pub const ADD_HIGHLIGHT: Operation = Operation::edit("add_highlight", "Add highlight");
pub const ADD_NOTE: Operation = Operation::edit("add_note", "Add note");
pub const ADD_TEXT_BOX: Operation = Operation::edit("add_text_box", "Add text box");
pub const ADD_IMAGE: Operation = Operation::edit("add_image", "Add image");
pub const DELETE_ANNOTATION: Operation = Operation::edit("delete_annotation", "Delete annotation");
pub const EDIT_NOTE_TEXT: Operation = Operation::edit("edit_note_text", "Edit note");
pub const EDIT_TEXT_BOX_TEXT: Operation = Operation::edit("edit_text_box_text", "Edit text");
pub const RESTYLE_TEXT_BOX: Operation = Operation::edit("restyle_text_box", "Change text style");
pub const REPLACE_IMAGE_SOURCE: Operation = Operation::edit("replace_image_source", "Replace image");
pub const MOVE_ANNOTATION: Operation = Operation::edit("move_annotation", "Move annotation");
pub const RESIZE_ANNOTATION: Operation = Operation::edit("resize_annotation", "Resize annotation");

/// Every declared operation.
pub const ALL: &[Operation] = &[
    GO_TO_PAGE,
    SET_SCALE,
    SELECT_TOOL,
    UNDO,
    REDO,
    JUMP_TO_HISTORY,
    ADD_HIGHLIGHT,
    ADD_NOTE,
    ADD_TEXT_BOX,
    ADD_IMAGE,
    DELETE_ANNOTATION,
    EDIT_NOTE_TEXT,
    EDIT_TEXT_BOX_TEXT,
    RESTYLE_TEXT_BOX,
    REPLACE_IMAGE_SOURCE,
    MOVE_ANNOTATION,
    RESIZE_ANNOTATION,
];

/// Look up an operation by name.
pub fn find(name: &str) -> Option<&'static Operation> {
    ALL.iter().find(|op| op.name == name)
}

/// The operation that places `annotation` on a page.
pub fn add_operation_for(annotation: &Annotation) -> &'static Operation {
    match annotation {
        Annotation::Highlight(_) => &ADD_HIGHLIGHT,
        Annotation::Note(_) => &ADD_NOTE,
        Annotation::TextBox(_) => &ADD_TEXT_BOX,
        Annotation::Image(_) => &ADD_IMAGE,
    }
}
