//! Errors raised by the built-in editing operations.

use crate::annotation::AnnotationId;
use thiserror::Error;

/// Failure of a built-in document edit.
///
/// A failed edit leaves both the document and the history untouched.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EditError {
    #[error("annotation not found: {0}")]
    AnnotationNotFound(AnnotationId),

    #[error("a {kind} annotation does not support {edit}")]
    Unsupported {
        kind: &'static str,
        edit: &'static str,
    },

    #[error("invalid value: {0}")]
    InvalidValue(String),
}

impl EditError {
    pub(crate) fn unsupported(kind: &'static str, edit: &'static str) -> Self {
        Self::Unsupported { kind, edit }
    }
}

/// Result type for built-in edits.
pub type EditResult<T> = Result<T, EditError>;
