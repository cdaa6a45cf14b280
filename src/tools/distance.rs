use super::{MIN_GESTURE_DISTANCE, Tool, ToolContext, ToolFrame, commit, draw_shape, draw_store};
use crate::annotation::{AnnotationStore, Point, Shape};
use crate::enums::ToolKind;
use crate::surface::RasterSurface;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum DistanceState {
    #[default]
    Idle,
    /// First point placed, second one follows the pointer.
    Placing { start: Point, end: Point },
}

/// Measures the physical length of a segment.
///
/// Either drag from start to end, or click the start and then the end.
#[derive(Debug, Default)]
pub struct DistanceTool {
    frame: ToolFrame,
    state: DistanceState,
    store: AnnotationStore,
}

impl DistanceTool {
    pub fn is_placing(&self) -> bool {
        matches!(self.state, DistanceState::Placing { .. })
    }
}

impl Tool for DistanceTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Distance
    }

    fn frame(&self) -> &ToolFrame {
        &self.frame
    }

    fn frame_mut(&mut self) -> &mut ToolFrame {
        &mut self.frame
    }

    fn on_mouse_down(&mut self, at: Point, _ctx: &ToolContext<'_>) {
        if self.state == DistanceState::Idle {
            self.state = DistanceState::Placing { start: at, end: at };
        }
    }

    fn on_mouse_move(&mut self, at: Point, _ctx: &ToolContext<'_>) {
        if let DistanceState::Placing { end, .. } = &mut self.state {
            *end = at;
        }
    }

    fn on_mouse_up(&mut self, at: Point, _ctx: &ToolContext<'_>) {
        let DistanceState::Placing { start, .. } = self.state else {
            return;
        };
        if start.distance_to(at) > MIN_GESTURE_DISTANCE {
            commit(&mut self.store, &self.frame, Shape::Segment { a: start, b: at });
            self.state = DistanceState::Idle;
        } else {
            self.state = DistanceState::Placing { start, end: at };
        }
    }

    fn render(&self, surface: &mut dyn RasterSurface, ctx: &ToolContext<'_>) {
        draw_store(surface, &self.store, &self.frame, ctx);
        if let DistanceState::Placing { start, end } = self.state {
            if start.distance_to(end) > MIN_GESTURE_DISTANCE {
                let preview = Shape::Segment { a: start, b: end };
                draw_shape(surface, &preview, &ctx.preview_style(), self.frame.pixel_size, ctx);
            }
        }
    }

    fn clear(&mut self) {
        self.state = DistanceState::Idle;
        self.store.clear();
    }

    fn annotations(&self) -> Option<&AnnotationStore> {
        Some(&self.store)
    }

    fn annotations_mut(&mut self) -> Option<&mut AnnotationStore> {
        Some(&mut self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::config::ViewerConfig;
    use crate::enums::Plane;

    #[test]
    fn three_four_five() {
        let config = ViewerConfig::default();
        let ctx = ToolContext::new(Plane::Transverse, ToolKind::Distance, &config);
        let mut tool = DistanceTool::default();
        tool.set_pixel_size(1.0, 1.0);
        tool.on_mouse_down(Point::new(0.0, 0.0), &ctx);
        tool.on_mouse_up(Point::new(3.0, 4.0), &ctx);

        let shape = &tool.store.get(0).unwrap().shape;
        assert_eq!(shape.measurement(tool.frame().pixel_size).as_deref(), Some("5.0 mm"));
        assert!(!tool.is_placing());
    }

    #[test]
    fn click_click_commits_on_second_release() {
        let config = ViewerConfig::default();
        let ctx = ToolContext::new(Plane::Transverse, ToolKind::Distance, &config);
        let mut tool = DistanceTool::default();
        click(&mut tool, Point::new(10.0, 10.0), &ctx);
        assert!(tool.is_placing());
        assert!(tool.store.is_empty());

        tool.on_mouse_move(Point::new(30.0, 10.0), &ctx);
        click(&mut tool, Point::new(40.0, 10.0), &ctx);
        assert_eq!(tool.store.len(), 1);
        assert_eq!(
            tool.store.get(0).unwrap().shape,
            Shape::Segment {
                a: Point::new(10.0, 10.0),
                b: Point::new(40.0, 10.0)
            }
        );
    }

    #[test]
    fn single_point_renders_nothing() {
        let config = ViewerConfig::default();
        let ctx = ToolContext::new(Plane::Transverse, ToolKind::Distance, &config);
        let mut tool = DistanceTool::default();
        tool.frame = frame();
        click(&mut tool, Point::new(50.0, 50.0), &ctx);

        let mut surface = surface();
        tool.render(&mut surface, &ctx);
        assert!(is_blank(&surface));
    }

    #[test]
    fn preview_follows_pointer_without_committing() {
        let config = ViewerConfig::default();
        let ctx = ToolContext::new(Plane::Transverse, ToolKind::Distance, &config);
        let mut tool = DistanceTool::default();
        tool.frame = frame();
        tool.on_mouse_down(Point::new(10.0, 50.0), &ctx);
        tool.on_mouse_move(Point::new(80.0, 50.0), &ctx);

        let mut surface = surface();
        tool.render(&mut surface, &ctx);
        assert!(tool.store.is_empty());
        assert_eq!(surface.text_runs()[0].text, "70.0 mm");
    }

    #[test]
    fn points_outside_screen_rect_are_kept() {
        let config = ViewerConfig::default();
        let ctx = ToolContext::new(Plane::Transverse, ToolKind::Distance, &config);
        let mut tool = DistanceTool::default();
        tool.set_screen_dim(100, 50);
        tool.set_pixel_size(1.0, 1.0);
        tool.on_mouse_down(Point::new(20.0, 80.0), &ctx);
        tool.on_mouse_move(Point::new(70.0, 80.0), &ctx);
        tool.on_mouse_up(Point::new(70.0, 80.0), &ctx);

        assert_eq!(
            tool.store.get(0).unwrap().shape,
            Shape::Segment {
                a: Point::new(20.0, 80.0),
                b: Point::new(70.0, 80.0)
            }
        );
        let mut surface = surface();
        tool.render(&mut surface, &ctx);
        assert_eq!(surface.text_runs()[0].text, "50.0 mm");
        assert!(surface.to_image().get_pixel(45, 80).0[0] > 0);
    }

    #[test]
    fn pixel_size_scales_label() {
        let config = ViewerConfig::default();
        let ctx = ToolContext::new(Plane::Transverse, ToolKind::Distance, &config);
        let mut tool = DistanceTool::default();
        tool.frame = frame();
        tool.set_pixel_size(0.5, 0.5);
        tool.on_mouse_down(Point::new(10.0, 10.0), &ctx);
        tool.on_mouse_up(Point::new(10.0, 34.8), &ctx);

        let mut surface = surface();
        tool.render(&mut surface, &ctx);
        assert_eq!(surface.text_runs()[0].text, "12.4 mm");
    }
}
