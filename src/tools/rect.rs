use super::{MIN_GESTURE_DISTANCE, Tool, ToolContext, ToolFrame, commit, draw_shape, draw_store};
use crate::annotation::{AnnotationStore, Point, Shape};
use crate::enums::ToolKind;
use crate::surface::RasterSurface;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum RectState {
    #[default]
    Idle,
    Placing { start: Point, end: Point },
}

fn has_area(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() > MIN_GESTURE_DISTANCE && (a.y - b.y).abs() > MIN_GESTURE_DISTANCE
}

/// Axis-aligned rectangle between two corners, labeled with its physical size.
#[derive(Debug, Default)]
pub struct RectTool {
    frame: ToolFrame,
    state: RectState,
    store: AnnotationStore,
}

impl Tool for RectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Rect
    }

    fn frame(&self) -> &ToolFrame {
        &self.frame
    }

    fn frame_mut(&mut self) -> &mut ToolFrame {
        &mut self.frame
    }

    fn on_mouse_down(&mut self, at: Point, _ctx: &ToolContext<'_>) {
        if self.state == RectState::Idle {
            self.state = RectState::Placing { start: at, end: at };
        }
    }

    fn on_mouse_move(&mut self, at: Point, _ctx: &ToolContext<'_>) {
        if let RectState::Placing { end, .. } = &mut self.state {
            *end = at;
        }
    }

    fn on_mouse_up(&mut self, at: Point, _ctx: &ToolContext<'_>) {
        let RectState::Placing { start, .. } = self.state else {
            return;
        };
        if has_area(start, at) {
            commit(&mut self.store, &self.frame, Shape::Rect { a: start, b: at });
            self.state = RectState::Idle;
        } else {
            self.state = RectState::Placing { start, end: at };
        }
    }

    fn render(&self, surface: &mut dyn RasterSurface, ctx: &ToolContext<'_>) {
        draw_store(surface, &self.store, &self.frame, ctx);
        if let RectState::Placing { start, end } = self.state {
            if has_area(start, end) {
                let preview = Shape::Rect { a: start, b: end };
                draw_shape(surface, &preview, &ctx.preview_style(), self.frame.pixel_size, ctx);
            }
        }
    }

    fn clear(&mut self) {
        self.state = RectState::Idle;
        self.store.clear();
    }

    fn annotations(&self) -> Option<&AnnotationStore> {
        Some(&self.store)
    }

    fn annotations_mut(&mut self) -> Option<&mut AnnotationStore> {
        Some(&mut self.store)
    }
}
