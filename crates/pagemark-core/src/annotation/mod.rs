//! Annotation records placed on document pages.
//!
//! Geometry stored here is normalized: `x` and widths are fractions of the
//! canvas width, `y` and heights fractions of the canvas height. Values are
//! not clamped at this level; the interaction layer keeps them on the page.

mod highlight;
mod image;
mod note;
mod text_box;

pub use highlight::Highlight;
pub use image::{ImageAnnotation, ImageFormat, ImageSource};
pub use note::Note;
pub use text_box::{TextBox, TextStyle};

use kurbo::{Point, Rect, Size, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for annotations.
pub type AnnotationId = Uuid;

/// One-based page number.
pub type PageNumber = u32;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    /// Translucent yellow used for new highlights.
    pub fn highlight() -> Self {
        Self::new(255, 221, 0, 96)
    }

    /// Default sticky-note color.
    pub fn note() -> Self {
        Self::new(255, 196, 0, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// How an annotation is attached to its page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    /// Rectangular extent (normalized).
    Area(Rect),
    /// Single point (normalized).
    Point(Point),
}

/// Common behaviour of every annotation variant.
pub trait AnnotationTrait {
    /// Get the unique identifier.
    fn id(&self) -> AnnotationId;

    /// Get the anchor in normalized coordinates.
    fn anchor(&self) -> Anchor;

    /// Move by a normalized offset.
    fn translate(&mut self, delta: Vec2);

    /// Set a new normalized size, keeping the top-left corner fixed.
    /// Returns false when the annotation cannot be resized.
    fn resize(&mut self, _size: Size) -> bool {
        false
    }
}

/// Enum wrapper for all annotation kinds (for storage and snapshots).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Annotation {
    Highlight(Highlight),
    Note(Note),
    TextBox(TextBox),
    Image(ImageAnnotation),
}

impl Annotation {
    pub fn id(&self) -> AnnotationId {
        match self {
            Annotation::Highlight(a) => a.id(),
            Annotation::Note(a) => a.id(),
            Annotation::TextBox(a) => a.id(),
            Annotation::Image(a) => a.id(),
        }
    }

    pub fn anchor(&self) -> Anchor {
        match self {
            Annotation::Highlight(a) => a.anchor(),
            Annotation::Note(a) => a.anchor(),
            Annotation::TextBox(a) => a.anchor(),
            Annotation::Image(a) => a.anchor(),
        }
    }

    /// Normalized bounding box with positive width and height, whichever
    /// way the stored rect was drawn. Point anchors yield a zero-size rect.
    pub fn bounds(&self) -> Rect {
        match self.anchor() {
            Anchor::Area(rect) => rect.abs(),
            Anchor::Point(p) => Rect::from_points(p, p),
        }
    }

    /// Top-left corner of the bounds (the point itself for notes).
    pub fn origin(&self) -> Point {
        self.bounds().origin()
    }

    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Annotation::Highlight(a) => a.translate(delta),
            Annotation::Note(a) => a.translate(delta),
            Annotation::TextBox(a) => a.translate(delta),
            Annotation::Image(a) => a.translate(delta),
        }
    }

    /// Move so the bounds' top-left corner lands on `origin`.
    pub fn set_origin(&mut self, origin: Point) {
        let delta = origin - self.origin();
        self.translate(delta);
    }

    pub fn resize(&mut self, size: Size) -> bool {
        match self {
            Annotation::Highlight(a) => a.resize(size),
            Annotation::Note(a) => a.resize(size),
            Annotation::TextBox(a) => a.resize(size),
            Annotation::Image(a) => a.resize(size),
        }
    }

    /// Whether `resize` can succeed for this annotation.
    pub fn is_resizable(&self) -> bool {
        match self {
            Annotation::Highlight(h) => h.rects.len() == 1,
            Annotation::Note(_) => false,
            Annotation::TextBox(_) | Annotation::Image(_) => true,
        }
    }

    /// Human-readable kind, used in history labels.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Annotation::Highlight(_) => "highlight",
            Annotation::Note(_) => "note",
            Annotation::TextBox(_) => "text box",
            Annotation::Image(_) => "image",
        }
    }

    /// Editable text, if this kind carries any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Annotation::Note(n) => Some(&n.text),
            Annotation::TextBox(t) => Some(&t.text),
            Annotation::Highlight(_) | Annotation::Image(_) => None,
        }
    }

    /// Replace the text. Returns false for kinds without text.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        match self {
            Annotation::Note(n) => {
                n.text = text.into();
                true
            }
            Annotation::TextBox(t) => {
                t.text = text.into();
                true
            }
            Annotation::Highlight(_) | Annotation::Image(_) => false,
        }
    }
}

impl From<Highlight> for Annotation {
    fn from(a: Highlight) -> Self {
        Annotation::Highlight(a)
    }
}

impl From<Note> for Annotation {
    fn from(a: Note) -> Self {
        Annotation::Note(a)
    }
}

impl From<TextBox> for Annotation {
    fn from(a: TextBox) -> Self {
        Annotation::TextBox(a)
    }
}

impl From<ImageAnnotation> for Annotation {
    fn from(a: ImageAnnotation) -> Self {
        Annotation::Image(a)
    }
}

/// Convert a normalized point to canvas pixels.
pub fn point_to_canvas(point: Point, canvas: Size) -> Point {
    Point::new(point.x * canvas.width, point.y * canvas.height)
}

/// Convert a canvas-pixel point to normalized coordinates.
/// A degenerate canvas maps everything to the origin.
pub fn point_from_canvas(point: Point, canvas: Size) -> Point {
    if canvas.width <= 0.0 || canvas.height <= 0.0 {
        return Point::ZERO;
    }
    Point::new(point.x / canvas.width, point.y / canvas.height)
}

/// Convert a normalized rect to canvas pixels.
pub fn rect_to_canvas(rect: Rect, canvas: Size) -> Rect {
    Rect::new(
        rect.x0 * canvas.width,
        rect.y0 * canvas.height,
        rect.x1 * canvas.width,
        rect.y1 * canvas.height,
    )
}

/// Convert a canvas-pixel size to a normalized size.
pub fn size_from_canvas(size: Size, canvas: Size) -> Size {
    if canvas.width <= 0.0 || canvas.height <= 0.0 {
        return Size::ZERO;
    }
    Size::new(size.width / canvas.width, size.height / canvas.height)
}

pub(crate) fn new_id() -> AnnotationId {
    Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_and_origin() {
        let tb = TextBox::new(Rect::new(0.1, 0.2, 0.4, 0.3), "hello");
        let ann = Annotation::from(tb);
        assert_eq!(ann.bounds(), Rect::new(0.1, 0.2, 0.4, 0.3));
        assert_eq!(ann.origin(), Point::new(0.1, 0.2));
    }

    #[test]
    fn test_reversed_rect_bounds() {
        let mut ann = Annotation::from(TextBox::new(Rect::new(0.3, 0.2, 0.1, 0.1), "rtl"));
        assert_eq!(ann.bounds(), Rect::new(0.1, 0.1, 0.3, 0.2));
        assert_eq!(ann.origin(), Point::new(0.1, 0.1));

        ann.set_origin(Point::new(0.15, 0.1));
        let bounds = ann.bounds();
        assert!((bounds.x0 - 0.15).abs() < 1e-12);
        assert!((bounds.x1 - 0.35).abs() < 1e-12);

        assert!(ann.resize(Size::new(0.4, 0.1)));
        let bounds = ann.bounds();
        assert!((bounds.x0 - 0.15).abs() < 1e-12);
        assert!((bounds.x1 - 0.55).abs() < 1e-12);
    }

    #[test]
    fn test_note_bounds_are_degenerate() {
        let ann = Annotation::from(Note::new(Point::new(0.5, 0.5), "n"));
        let bounds = ann.bounds();
        assert_eq!(bounds.width(), 0.0);
        assert_eq!(bounds.height(), 0.0);
        assert!(matches!(ann.anchor(), Anchor::Point(_)));
    }

    #[test]
    fn test_set_origin_moves_all_highlight_rects() {
        let mut ann = Annotation::from(Highlight::new(vec![
            Rect::new(0.1, 0.1, 0.5, 0.15),
            Rect::new(0.1, 0.15, 0.3, 0.2),
        ]));
        ann.set_origin(Point::new(0.2, 0.3));
        let Annotation::Highlight(h) = &ann else {
            panic!("expected highlight");
        };
        assert!((h.rects[0].x0 - 0.2).abs() < 1e-12);
        assert!((h.rects[0].y0 - 0.3).abs() < 1e-12);
        assert!((h.rects[1].y0 - 0.35).abs() < 1e-12);
        assert!((h.rects[1].x1 - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_resizable_kinds() {
        let note = Annotation::from(Note::new(Point::new(0.5, 0.5), "n"));
        assert!(!note.is_resizable());
        let single = Annotation::from(Highlight::new(vec![Rect::new(0.0, 0.0, 0.1, 0.1)]));
        assert!(single.is_resizable());
        let multi = Annotation::from(Highlight::new(vec![
            Rect::new(0.0, 0.0, 0.1, 0.1),
            Rect::new(0.0, 0.1, 0.1, 0.2),
        ]));
        assert!(!multi.is_resizable());
    }

    #[test]
    fn test_set_text() {
        let mut ann = Annotation::from(Note::new(Point::new(0.5, 0.5), "old"));
        assert!(ann.set_text("new"));
        assert_eq!(ann.text(), Some("new"));

        let mut hl = Annotation::from(Highlight::new(vec![Rect::new(0.0, 0.0, 0.1, 0.1)]));
        assert!(!hl.set_text("nope"));
        assert_eq!(hl.text(), None);
    }

    #[test]
    fn test_canvas_conversion() {
        let canvas = Size::new(800.0, 1000.0);
        let px = rect_to_canvas(Rect::new(0.25, 0.5, 0.5, 0.6), canvas);
        assert_eq!(px, Rect::new(200.0, 500.0, 400.0, 600.0));
        assert_eq!(point_from_canvas(Point::new(400.0, 250.0), canvas), Point::new(0.5, 0.25));
        assert_eq!(point_from_canvas(Point::new(1.0, 1.0), Size::ZERO), Point::ZERO);
    }

    #[test]
    fn test_serde_tagged() {
        let ann = Annotation::from(Note::new(Point::new(0.5, 0.5), "n"));
        let json = serde_json::to_string(&ann).unwrap();
        assert!(json.contains("\"type\":\"note\""));
        let back: Annotation = serde_json::from_str(&json).unwrap();
        assert_eq!(ann, back);
    }
}
