//! Image annotation referencing an external image source.

use super::{Anchor, AnnotationId, AnnotationTrait, new_id};
use kurbo::{Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Image format of the referenced source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }
}

/// Reference to image bytes held elsewhere (asset store, data URL, file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSource {
    pub uri: String,
    pub format: Option<ImageFormat>,
}

impl ImageSource {
    /// Build a source, guessing the format from the URI's extension.
    pub fn new(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let format = uri
            .rsplit_once('.')
            .and_then(|(_, ext)| ImageFormat::from_extension(ext));
        Self { uri, format }
    }
}

/// An image stamped onto the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnnotation {
    pub(crate) id: AnnotationId,
    /// Normalized extent.
    pub rect: Rect,
    pub source: ImageSource,
}

impl ImageAnnotation {
    pub fn new(rect: Rect, source: ImageSource) -> Self {
        Self {
            id: new_id(),
            rect,
            source,
        }
    }
}

impl AnnotationTrait for ImageAnnotation {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_uri() {
        assert_eq!(ImageSource::new("stamp.PNG").format, Some(ImageFormat::Png));
        assert_eq!(ImageSource::new("photo.jpeg").format, Some(ImageFormat::Jpeg));
        assert_eq!(ImageSource::new("blob:1234").format, None);
    }

    #[test]
    fn test_mime_type() {
        assert_eq!(ImageFormat::WebP.mime_type(), "image/webp");
    }
}
