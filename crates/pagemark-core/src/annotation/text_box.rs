//! Free text box annotation.

use super::{Anchor, AnnotationId, AnnotationTrait, SerializableColor, new_id};
use kurbo::{Rect, Size, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};

/// Typography of a text box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font size in points at 100% zoom.
    pub font_size: f64,
    pub color: SerializableColor,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

impl TextStyle {
    /// Get the text color as a peniko Color.
    pub fn color(&self) -> Color {
        self.color.into()
    }

    /// Set the text color from a peniko Color.
    pub fn set_color(&mut self, color: Color) {
        self.color = color.into();
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            color: SerializableColor::black(),
            bold: false,
            italic: false,
        }
    }
}

/// A rectangular box of text placed on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub(crate) id: AnnotationId,
    /// Normalized extent.
    pub rect: Rect,
    pub text: String,
    #[serde(default)]
    pub style: TextStyle,
}

impl TextBox {
    pub fn new(rect: Rect, text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            rect,
            text: text.into(),
            style: TextStyle::default(),
        }
    }
}

impl AnnotationTrait for TextBox {
    fn id(&self) -> AnnotationId {
        self.id
    }

    fn anchor(&self) -> Anchor {
        Anchor::Area(self.rect)
    }

    fn translate(&mut self, delta: Vec2) {
        self.rect = self.rect + delta;
    }

    fn resize(&mut self, size: Size) -> bool {
        self.rect = Rect::from_origin_size(self.rect.abs().origin(), size);
        true
    }
}
