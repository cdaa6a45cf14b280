use super::{
    MIN_GESTURE_DISTANCE, Tool, ToolContext, ToolFrame, commit, draw_polyline, draw_store,
};
use crate::annotation::{AnnotationStore, Point, Shape};
use crate::enums::ToolKind;
use crate::surface::RasterSurface;

#[derive(Clone, Debug, Default, PartialEq)]
enum AngleState {
    #[default]
    Idle,
    /// One or two points committed; `cursor` previews the next one.
    Placing { points: Vec<Point>, cursor: Point },
}

/// Measures the angle between two arms sharing a vertex.
///
/// The first arm runs from the first point to the vertex (second point), the
/// second arm from the vertex to the third point.
#[derive(Debug, Default)]
pub struct AngleTool {
    frame: ToolFrame,
    state: AngleState,
    store: AnnotationStore,
}

impl AngleTool {
    /// Points collected for the angle in progress.
    pub fn pending_points(&self) -> &[Point] {
        match &self.state {
            AngleState::Idle => &[],
            AngleState::Placing { points, .. } => points,
        }
    }
}

impl Tool for AngleTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Angle
    }

    fn frame(&self) -> &ToolFrame {
        &self.frame
    }

    fn frame_mut(&mut self) -> &mut ToolFrame {
        &mut self.frame
    }

    fn on_mouse_down(&mut self, at: Point, _ctx: &ToolContext<'_>) {
        if self.state == AngleState::Idle {
            self.state = AngleState::Placing {
                points: vec![at],
                cursor: at,
            };
        }
    }

    fn on_mouse_move(&mut self, at: Point, _ctx: &ToolContext<'_>) {
        if let AngleState::Placing { cursor, .. } = &mut self.state {
            *cursor = at;
        }
    }

    fn on_mouse_up(&mut self, at: Point, _ctx: &ToolContext<'_>) {
        let AngleState::Placing { points, cursor } = &mut self.state else {
            return;
        };
        *cursor = at;
        if points
            .last()
            .is_some_and(|last| last.distance_to(at) > MIN_GESTURE_DISTANCE)
        {
            points.push(at);
        }
        if let [a, vertex, b] = points[..] {
            commit(&mut self.store, &self.frame, Shape::Angle { a, vertex, b });
            self.state = AngleState::Idle;
        }
    }

    fn render(&self, surface: &mut dyn RasterSurface, ctx: &ToolContext<'_>) {
        draw_store(surface, &self.store, &self.frame, ctx);
        if let AngleState::Placing { points, cursor } = &self.state {
            let mut preview = points.clone();
            preview.push(*cursor);
            draw_polyline(surface, &preview, &ctx.preview_style());
        }
    }

    fn clear(&mut self) {
        self.state = AngleState::Idle;
        self.store.clear();
    }

    fn annotations(&self) -> Option<&AnnotationStore> {
        Some(&self.store)
    }

    fn annotations_mut(&mut self) -> Option<&mut AnnotationStore> {
        Some(&mut self.store)
    }
}
