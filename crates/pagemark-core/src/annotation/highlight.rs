//! Highlight annotation.

use super::{Anchor, AnnotationId, AnnotationTrait, SerializableColor, new_id};
use kurbo::{Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// A highlight covering one or more normalized rectangles (one per text line).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub(crate) id: AnnotationId,
    /// Covered rectangles, in reading order.
    pub rects: Vec<Rect>,
    /// Fill color.
    #[serde(default = "SerializableColor::highlight")]
    pub color: SerializableColor,
}

impl Highlight {
    /// Create a new highlight with the default color.
    pub fn new(rects: Vec<Rect>) -> Self {
        Self {
            id: new_id(),
            rects,
            color: SerializableColor::highlight(),
        }
    }

    /// Union of all rectangles. An empty highlight has an empty rect.
    pub fn union(&self) -> Rect {
        let mut iter = self.rects.iter().map(Rect::abs);
        match iter.next() {
            Some(first) => iter.fold(first, |acc, r| acc.union(r)),
            None => Rect::ZERO,
        }
    }
}

impl AnnotationTrait for Highlight {
    fn id(&self) -> AnnotationId {
        self.id
    }

    fn anchor(&self) -> Anchor {
        Anchor::Area(self.union())
    }

    fn translate(&mut self, delta: Vec2) {
        for rect in &mut self.rects {
            *rect = *rect + delta;
        }
    }

    fn resize(&mut self, size: Size) -> bool {
        // Multi-line highlights follow the text; only a single box stretches.
        match self.rects.as_mut_slice() {
            [rect] => {
                *rect = Rect::from_origin_size(rect.abs().origin(), size);
                true
            }
            _ => false,
        }
    }
}
