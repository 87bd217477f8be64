//! Snap functionality for aligning annotations to the page, each other and a grid.
//!
//! Everything here is pure and works in canvas (device) pixels. The drag
//! controller runs the same pipeline for live feedback and for the final
//! committed position, so both always agree.

use crate::annotation::{Anchor, Annotation, AnnotationId, point_to_canvas, rect_to_canvas};
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Default grid size for grid snapping.
pub const DEFAULT_GRID_SIZE: f64 = 10.0;

/// Default distance (in device pixels) within which snapping engages.
pub const DEFAULT_SNAP_THRESHOLD: f64 = 6.0;

/// Default smallest width/height a resize may produce.
pub const DEFAULT_MIN_SIZE: f64 = 8.0;

/// Guide lines closer than this are considered the same line.
const GUIDE_DEDUP_TOLERANCE: f64 = 0.5;

/// Orientation of a guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuideAxis {
    /// A line of constant x.
    Vertical,
    /// A line of constant y.
    Horizontal,
}

/// Which feature of another annotation produced a guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideKind {
    /// Left or top edge.
    Start,
    /// Right or bottom edge.
    End,
    /// Horizontal or vertical center.
    Center,
    /// Anchor point of a point annotation.
    Point,
}

/// A candidate alignment position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideLine {
    pub axis: GuideAxis,
    /// Canvas-pixel coordinate along the axis.
    pub position: f64,
    pub kind: GuideKind,
}

/// Deduplicated guide lines for one drag session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignmentLines {
    pub vertical: Vec<GuideLine>,
    pub horizontal: Vec<GuideLine>,
}

impl AlignmentLines {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a line unless one already lies within half a pixel on that axis.
    pub fn push(&mut self, line: GuideLine) {
        let list = match line.axis {
            GuideAxis::Vertical => &mut self.vertical,
            GuideAxis::Horizontal => &mut self.horizontal,
        };
        let duplicate = list
            .iter()
            .any(|l| (l.position - line.position).abs() < GUIDE_DEDUP_TOLERANCE);
        if !duplicate {
            list.push(line);
        }
    }

    pub fn len(&self) -> usize {
        self.vertical.len() + self.horizontal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertical.is_empty() && self.horizontal.is_empty()
    }
}

/// Collect guide lines from every annotation on a page except `excluding`.
///
/// Areas contribute their edges and centers; point anchors contribute one
/// line per axis through the point.
pub fn collect_alignment_lines(
    page_annotations: &[Annotation],
    excluding: Option<AnnotationId>,
    canvas: Size,
) -> AlignmentLines {
    let mut lines = AlignmentLines::new();

    for annotation in page_annotations {
        if Some(annotation.id()) == excluding {
            continue;
        }
        match annotation.anchor() {
            Anchor::Area(rect) => {
                let px = rect_to_canvas(rect, canvas).abs();
                let center = px.center();
                for (position, kind) in [
                    (px.x0, GuideKind::Start),
                    (px.x1, GuideKind::End),
                    (center.x, GuideKind::Center),
                ] {
                    lines.push(GuideLine { axis: GuideAxis::Vertical, position, kind });
                }
                for (position, kind) in [
                    (px.y0, GuideKind::Start),
                    (px.y1, GuideKind::End),
                    (center.y, GuideKind::Center),
                ] {
                    lines.push(GuideLine { axis: GuideAxis::Horizontal, position, kind });
                }
            }
            Anchor::Point(p) => {
                let px = point_to_canvas(p, canvas);
                lines.push(GuideLine {
                    axis: GuideAxis::Vertical,
                    position: px.x,
                    kind: GuideKind::Point,
                });
                lines.push(GuideLine {
                    axis: GuideAxis::Horizontal,
                    position: px.y,
                    kind: GuideKind::Point,
                });
            }
        }
    }

    lines
}

/// Closest (reference, line) pairing within `threshold`.
/// Returns the line and the offset that moves the reference onto it.
fn nearest_guide(refs: &[f64], lines: &[GuideLine], threshold: f64) -> Option<(GuideLine, f64)> {
    let mut best: Option<(GuideLine, f64)> = None;
    let mut best_dist = threshold;

    for line in lines {
        for &reference in refs {
            let offset = line.position - reference;
            let dist = offset.abs();
            if dist <= best_dist && best.is_none_or(|(_, o)| dist < o.abs()) {
                best_dist = dist;
                best = Some((*line, offset));
            }
        }
    }

    best
}

/// Result of [`snap_move`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveSnap {
    /// Adjusted top-left corner.
    pub position: Point,
    pub guide_x: Option<GuideLine>,
    pub guide_y: Option<GuideLine>,
}

/// Snap a moving box to guide lines, each axis independently.
///
/// The box's leading edge, trailing edge and center are all tried against
/// every line on the axis; the closest pairing within `threshold` wins.
pub fn snap_move(candidate: Point, size: Size, lines: &AlignmentLines, threshold: f64) -> MoveSnap {
    let mut result = MoveSnap {
        position: candidate,
        guide_x: None,
        guide_y: None,
    };

    let refs_x = [candidate.x, candidate.x + size.width, candidate.x + size.width / 2.0];
    if let Some((line, offset)) = nearest_guide(&refs_x, &lines.vertical, threshold) {
        result.position.x += offset;
        result.guide_x = Some(line);
    }

    let refs_y = [candidate.y, candidate.y + size.height, candidate.y + size.height / 2.0];
    if let Some((line, offset)) = nearest_guide(&refs_y, &lines.horizontal, threshold) {
        result.position.y += offset;
        result.guide_y = Some(line);
    }

    result
}

/// Result of [`snap_resize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeSnap {
    pub size: Size,
    pub guide_x: Option<GuideLine>,
    pub guide_y: Option<GuideLine>,
}

/// Snap the trailing (right/bottom) edges of a box anchored at `origin`.
pub fn snap_resize(origin: Point, size: Size, lines: &AlignmentLines, threshold: f64) -> ResizeSnap {
    let mut result = ResizeSnap {
        size,
        guide_x: None,
        guide_y: None,
    };

    if let Some((line, offset)) = nearest_guide(&[origin.x + size.width], &lines.vertical, threshold) {
        result.size.width += offset;
        result.guide_x = Some(line);
    }
    if let Some((line, offset)) = nearest_guide(&[origin.y + size.height], &lines.horizontal, threshold) {
        result.size.height += offset;
        result.guide_y = Some(line);
    }

    result
}

/// Pull a coordinate to `0` or `max` when it lies within `threshold` of either.
pub fn snap_to_container_edge(value: f64, max: f64, threshold: f64) -> f64 {
    container_edge(value, max, threshold).unwrap_or(value)
}

fn container_edge(value: f64, max: f64, threshold: f64) -> Option<f64> {
    if value.abs() <= threshold {
        Some(0.0)
    } else if (max - value).abs() <= threshold {
        Some(max)
    } else {
        None
    }
}

/// Round a coordinate to the nearest multiple of `grid_size`.
pub fn snap_to_grid(value: f64, grid_size: f64) -> f64 {
    if grid_size <= 0.0 {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// Tunable snapping behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapSettings {
    /// Engagement distance in device pixels.
    pub threshold: f64,
    pub grid_size: f64,
    /// Snap to the page edges.
    pub edges: bool,
    /// Snap to other annotations' edges and centers.
    pub guides: bool,
    /// Smallest width/height a resize may produce, in device pixels.
    pub min_size: f64,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SNAP_THRESHOLD,
            grid_size: DEFAULT_GRID_SIZE,
            edges: true,
            guides: true,
            min_size: DEFAULT_MIN_SIZE,
        }
    }
}

/// Modifier-driven flags for one evaluation of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SnapModifiers {
    /// Constrain movement to the dominant axis.
    pub axis_lock: bool,
    /// Snap to the grid instead of guides.
    pub grid: bool,
}

/// Geometry handed to the pipeline, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapRequest {
    /// Top-left corner at gesture start.
    pub origin: Point,
    /// Size at gesture start.
    pub size: Size,
    /// Pointer travel since gesture start.
    pub delta: Vec2,
    pub canvas: Size,
    pub modifiers: SnapModifiers,
}

/// Outcome of the snap pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// Final top-left corner.
    pub position: Point,
    /// Final size (unchanged for moves).
    pub size: Size,
    /// Guide used on the x axis, for visual feedback.
    pub guide_x: Option<GuideLine>,
    /// Guide used on the y axis, for visual feedback.
    pub guide_y: Option<GuideLine>,
    /// Whether the x coordinate was snapped by any source.
    pub snapped_x: bool,
    /// Whether the y coordinate was snapped by any source.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }

    /// Offset from the request's origin to the final position.
    pub fn offset_from(&self, origin: Point) -> Vec2 {
        self.position - origin
    }
}

/// Zero the non-dominant component of a delta.
pub fn lock_to_dominant_axis(delta: Vec2) -> Vec2 {
    if delta.x.abs() >= delta.y.abs() {
        Vec2::new(delta.x, 0.0)
    } else {
        Vec2::new(0.0, delta.y)
    }
}

struct AxisOutcome {
    value: f64,
    guide: Option<GuideLine>,
    snapped: bool,
}

/// One axis of a move: grid, or page edge then guides; finally kept on the page.
fn resolve_move_axis(
    value: f64,
    extent: f64,
    container: f64,
    lines: &[GuideLine],
    settings: &SnapSettings,
    grid: bool,
) -> AxisOutcome {
    let max = (container - extent).max(0.0);
    let mut outcome = AxisOutcome {
        value,
        guide: None,
        snapped: false,
    };

    if grid {
        outcome.value = snap_to_grid(value, settings.grid_size);
        outcome.snapped = true;
    } else {
        if settings.edges {
            if let Some(edge) = container_edge(value, max, settings.threshold) {
                outcome.value = edge;
                outcome.snapped = true;
            }
        }
        if !outcome.snapped && settings.guides {
            let refs = [value, value + extent, value + extent / 2.0];
            if let Some((line, offset)) = nearest_guide(&refs, lines, settings.threshold) {
                outcome.value = value + offset;
                outcome.guide = Some(line);
                outcome.snapped = true;
            }
        }
    }

    outcome.value = outcome.value.clamp(0.0, max);
    outcome
}

/// One axis of a resize: only the trailing edge moves.
fn resolve_resize_axis(
    origin: f64,
    extent: f64,
    container: f64,
    lines: &[GuideLine],
    settings: &SnapSettings,
    grid: bool,
) -> AxisOutcome {
    let mut trailing = origin + extent;
    let mut guide = None;
    let mut snapped = false;

    if grid {
        trailing = snap_to_grid(trailing, settings.grid_size);
        snapped = true;
    } else {
        if settings.edges && (container - trailing).abs() <= settings.threshold {
            trailing = container;
            snapped = true;
        }
        if !snapped && settings.guides {
            if let Some((line, offset)) = nearest_guide(&[trailing], lines, settings.threshold) {
                trailing += offset;
                guide = Some(line);
                snapped = true;
            }
        }
    }

    // `f64::clamp` panics on NaN bounds; settings may come from an unvalidated config.
    let max_extent = (container - origin).max(settings.min_size);
    AxisOutcome {
        value: (trailing - origin).max(settings.min_size).min(max_extent),
        guide,
        snapped,
    }
}

/// Full snapping pipeline for a move gesture.
///
/// Order per axis: axis lock, then grid (when requested) or page edge and
/// guides, then clamping to the page.
pub fn resolve_move(request: &SnapRequest, lines: &AlignmentLines, settings: &SnapSettings) -> SnapResult {
    let delta = if request.modifiers.axis_lock {
        lock_to_dominant_axis(request.delta)
    } else {
        request.delta
    };
    let candidate = request.origin + delta;
    let grid = request.modifiers.grid;

    let x = resolve_move_axis(
        candidate.x,
        request.size.width,
        request.canvas.width,
        &lines.vertical,
        settings,
        grid,
    );
    let y = resolve_move_axis(
        candidate.y,
        request.size.height,
        request.canvas.height,
        &lines.horizontal,
        settings,
        grid,
    );

    SnapResult {
        position: Point::new(x.value, y.value),
        size: request.size,
        guide_x: x.guide,
        guide_y: y.guide,
        snapped_x: x.snapped,
        snapped_y: y.snapped,
    }
}

/// Full snapping pipeline for a resize gesture anchored at the top-left corner.
pub fn resolve_resize(request: &SnapRequest, lines: &AlignmentLines, settings: &SnapSettings) -> SnapResult {
    let delta = if request.modifiers.axis_lock {
        lock_to_dominant_axis(request.delta)
    } else {
        request.delta
    };
    let grid = request.modifiers.grid;

    let width = resolve_resize_axis(
        request.origin.x,
        request.size.width + delta.x,
        request.canvas.width,
        &lines.vertical,
        settings,
        grid,
    );
    let height = resolve_resize_axis(
        request.origin.y,
        request.size.height + delta.y,
        request.canvas.height,
        &lines.horizontal,
        settings,
        grid,
    );

    SnapResult {
        position: request.origin,
        size: Size::new(width.value, height.value),
        guide_x: width.guide,
        guide_y: height.guide,
        snapped_x: width.snapped,
        snapped_y: height.snapped,
    }
}
