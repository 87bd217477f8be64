//! Sticky-note annotation anchored to a single point.

use super::{Anchor, AnnotationId, AnnotationTrait, SerializableColor, new_id};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// A note pinned at a normalized point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub(crate) id: AnnotationId,
    /// Pin position.
    pub position: Point,
    /// Note body.
    pub text: String,
    #[serde(default = "SerializableColor::note")]
    pub color: SerializableColor,
}

impl Note {
    pub fn new(position: Point, text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            position,
            text: text.into(),
            color: SerializableColor::note(),
        }
    }
}

impl AnnotationTrait for Note {
    fn id(&self) -> AnnotationId {
        self.id
    }

    fn anchor(&self) -> Anchor {
        Anchor::Point(self.position)
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}
