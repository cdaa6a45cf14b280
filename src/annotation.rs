//! Annotation geometry, hit testing and measurements.
//!
//! Annotations are stored in the screen-pixel coordinates they were created
//! in, together with the screen rectangle that was current at the time. They
//! are never rescaled when the rectangle changes.

use crate::transform::{PixelSize, ScreenRect};

/// Minimum number of vertices of a closed area.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// A screen-space position, viewport relative.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    pub fn midpoint(&self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

/// Distance from `p` to the segment `a`-`b`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f32::EPSILON {
        return p.distance_to(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_to(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Angle at `vertex` between the arms towards `a` and `b`, in degrees.
///
/// Arms are scaled to physical units first, so anisotropic pixels measure
/// the real angle.
pub fn angle_degrees(a: Point, vertex: Point, b: Point, pixel_size: PixelSize) -> Option<f32> {
    let (ux, uy) = ((a.x - vertex.x) * pixel_size.x, (a.y - vertex.y) * pixel_size.y);
    let (vx, vy) = ((b.x - vertex.x) * pixel_size.x, (b.y - vertex.y) * pixel_size.y);
    let norms = ux.hypot(uy) * vx.hypot(vy);
    if norms <= f32::EPSILON {
        return None;
    }
    let cos = ((ux * vx + uy * vy) / norms).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

/// Shoelace area of a closed polygon in square pixels.
pub fn polygon_area(vertices: &[Point]) -> f32 {
    if vertices.len() < MIN_POLYGON_VERTICES {
        return 0.0;
    }
    let twice: f32 = vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(p, q)| p.x * q.y - q.x * p.y)
        .sum();
    twice.abs() * 0.5
}

/// Shape data for an annotation (in screen coordinates).
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Segment { a: Point, b: Point },
    /// Two arms sharing the middle point.
    Angle { a: Point, vertex: Point, b: Point },
    Polygon { vertices: Vec<Point> },
    Rect { a: Point, b: Point },
    Label { at: Point, text: String },
}

impl Shape {
    /// Control points, in the order `move_handle` addresses them.
    pub fn handles(&self) -> Vec<Point> {
        match self {
            Shape::Segment { a, b } | Shape::Rect { a, b } => vec![*a, *b],
            Shape::Angle { a, vertex, b } => vec![*a, *vertex, *b],
            Shape::Polygon { vertices } => vertices.clone(),
            Shape::Label { at, .. } => vec![*at],
        }
    }

    pub fn move_handle(&mut self, handle: usize, to: Point) -> bool {
        let slot = match (self, handle) {
            (Shape::Segment { a, .. } | Shape::Rect { a, .. }, 0) => a,
            (Shape::Segment { b, .. } | Shape::Rect { b, .. }, 1) => b,
            (Shape::Angle { a, .. }, 0) => a,
            (Shape::Angle { vertex, .. }, 1) => vertex,
            (Shape::Angle { b, .. }, 2) => b,
            (Shape::Polygon { vertices }, i) if i < vertices.len() => &mut vertices[i],
            (Shape::Label { at, .. }, 0) => at,
            _ => return false,
        };
        *slot = to;
        true
    }

    /// Index of the handle closest to `p` within `tolerance`.
    pub fn nearest_handle(&self, p: Point, tolerance: f32) -> Option<usize> {
        self.handles()
            .iter()
            .enumerate()
            .map(|(i, h)| (i, h.distance_to(p)))
            .filter(|&(_, d)| d <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    fn edges(&self) -> Vec<(Point, Point)> {
        match self {
            Shape::Segment { a, b } => vec![(*a, *b)],
            Shape::Angle { a, vertex, b } => vec![(*a, *vertex), (*vertex, *b)],
            Shape::Polygon { vertices } => vertices
                .iter()
                .zip(vertices.iter().cycle().skip(1))
                .map(|(p, q)| (*p, *q))
                .collect(),
            Shape::Rect { a, b } => {
                let (c, d) = (Point::new(b.x, a.y), Point::new(a.x, b.y));
                vec![(*a, c), (c, *b), (*b, d), (d, *a)]
            }
            Shape::Label { .. } => Vec::new(),
        }
    }

    /// True when `p` is within `tolerance` of a handle or an outline edge.
    pub fn hit(&self, p: Point, tolerance: f32) -> bool {
        self.nearest_handle(p, tolerance).is_some()
            || self
                .edges()
                .iter()
                .any(|&(a, b)| distance_to_segment(p, a, b) <= tolerance)
    }

    /// Measurement label in physical units, if the shape measures anything.
    pub fn measurement(&self, pixel_size: PixelSize) -> Option<String> {
        match self {
            Shape::Segment { a, b } => {
                Some(format!("{:.1} mm", pixel_size.length(b.x - a.x, b.y - a.y)))
            }
            Shape::Angle { a, vertex, b } => {
                angle_degrees(*a, *vertex, *b, pixel_size).map(|deg| format!("{deg:.1}°"))
            }
            Shape::Polygon { vertices } => Some(format!(
                "{:.1} mm²",
                pixel_size.area(polygon_area(vertices))
            )),
            Shape::Rect { a, b } => Some(format!(
                "{:.1} x {:.1} mm",
                (b.x - a.x).abs() * pixel_size.x,
                (b.y - a.y).abs() * pixel_size.y
            )),
            Shape::Label { .. } => None,
        }
    }
}

/// A committed annotation and the screen rectangle it was drawn under.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub shape: Shape,
    pub frame: ScreenRect,
}

impl Annotation {
    pub fn new(shape: Shape, frame: ScreenRect) -> Self {
        Self { shape, frame }
    }

    /// True when the screen rectangle changed since creation.
    pub fn is_stale(&self, current: ScreenRect) -> bool {
        self.frame != current
    }
}

/// Annotations owned by one tool.
#[derive(Clone, Debug, Default)]
pub struct AnnotationStore {
    items: Vec<Annotation>,
}

impl AnnotationStore {
    pub fn push(&mut self, annotation: Annotation) {
        self.items.push(annotation);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, index: usize) -> Option<&Annotation> {
        self.items.get(index)
    }

    /// First annotation whose outline or handles are within `tolerance`.
    pub fn hit(&self, p: Point, tolerance: f32) -> Option<usize> {
        self.items.iter().position(|a| a.shape.hit(p, tolerance))
    }

    /// Closest handle within `tolerance` across all annotations.
    pub fn nearest_handle(&self, p: Point, tolerance: f32) -> Option<(usize, usize, f32)> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(i, a)| {
                let h = a.shape.nearest_handle(p, tolerance)?;
                Some((i, h, a.shape.handles()[h].distance_to(p)))
            })
            .min_by(|a, b| a.2.total_cmp(&b.2))
    }

    pub fn move_handle(&mut self, index: usize, handle: usize, to: Point) -> bool {
        self.items
            .get_mut(index)
            .is_some_and(|a| a.shape.move_handle(handle, to))
    }

    pub fn remove(&mut self, index: usize) -> Option<Annotation> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT: PixelSize = PixelSize { x: 1.0, y: 1.0 };

    #[test]
    fn segment_length_is_physical() {
        let shape = Shape::Segment {
            a: Point::new(0.0, 0.0),
            b: Point::new(3.0, 4.0),
        };
        assert_eq!(shape.measurement(UNIT).as_deref(), Some("5.0 mm"));
        assert_eq!(
            shape.measurement(PixelSize::new(2.0, 2.0)).as_deref(),
            Some("10.0 mm")
        );
    }

    #[test]
    fn right_angle_measures_ninety_degrees() {
        let deg = angle_degrees(
            Point::new(10.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(0.0, 7.0),
            UNIT,
        )
        .unwrap();
        assert!((deg - 90.0).abs() < 1e-4);
    }

    #[test]
    fn degenerate_angle_has_no_value() {
        let p = Point::new(1.0, 1.0);
        assert!(angle_degrees(p, p, Point::new(4.0, 4.0), UNIT).is_none());
    }

    #[test]
    fn shoelace_area_ignores_winding() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
        ];
        assert_eq!(polygon_area(&square), 16.0);
        let mut reversed = square;
        reversed.reverse();
        assert_eq!(polygon_area(&reversed), 16.0);
        assert_eq!(polygon_area(&square[..2]), 0.0);
    }

    #[test]
    fn hit_test_covers_edges_and_handles() {
        let rect = Shape::Rect {
            a: Point::new(10.0, 10.0),
            b: Point::new(50.0, 30.0),
        };
        assert!(rect.hit(Point::new(30.0, 11.0), 3.0));
        assert!(rect.hit(Point::new(50.0, 30.0), 3.0));
        assert!(!rect.hit(Point::new(30.0, 20.0), 3.0));
    }

    #[test]
    fn handles_can_be_moved() {
        let mut shape = Shape::Angle {
            a: Point::new(0.0, 0.0),
            vertex: Point::new(5.0, 5.0),
            b: Point::new(10.0, 0.0),
        };
        assert_eq!(shape.nearest_handle(Point::new(6.0, 5.0), 2.0), Some(1));
        assert!(shape.move_handle(1, Point::new(5.0, 9.0)));
        assert!(!shape.move_handle(3, Point::new(0.0, 0.0)));
        assert_eq!(shape.handles()[1], Point::new(5.0, 9.0));
    }

    #[test]
    fn store_removes_first_hit() {
        let frame = ScreenRect::new(100, 100);
        let mut store = AnnotationStore::default();
        for y in [10.0, 20.0] {
            store.push(Annotation::new(
                Shape::Segment {
                    a: Point::new(0.0, y),
                    b: Point::new(50.0, y),
                },
                frame,
            ));
        }
        assert_eq!(store.hit(Point::new(25.0, 15.0), 6.0), Some(0));
        assert!(store.remove(0).is_some());
        assert_eq!(store.len(), 1);
        assert!(store.remove(5).is_none());
        assert!(store.get(0).is_some_and(|a| !a.is_stale(frame)));
        assert!(store.get(0).is_some_and(|a| a.is_stale(ScreenRect::new(80, 100))));
    }
}
