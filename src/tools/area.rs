use super::{
    MIN_GESTURE_DISTANCE, Tool, ToolContext, ToolFrame, commit, draw_polyline, draw_shape,
    draw_store,
};
use crate::annotation::{AnnotationStore, MIN_POLYGON_VERTICES, Point, Shape};
use crate::enums::ToolKind;
use crate::surface::RasterSurface;

#[derive(Clone, Debug, Default, PartialEq)]
enum AreaState {
    #[default]
    Idle,
    /// Open polygon; `cursor` previews the next vertex.
    Placing { vertices: Vec<Point>, cursor: Point },
    /// Close gesture started on the first vertex, committed on release.
    Closing { vertices: Vec<Point> },
}

/// Measures the area enclosed by a polygon.
///
/// Vertices are added on each release. The polygon closes when the first
/// vertex is clicked again, on a double click, or through [`AreaTool::close`].
#[derive(Debug, Default)]
pub struct AreaTool {
    frame: ToolFrame,
    state: AreaState,
    store: AnnotationStore,
}

impl AreaTool {
    pub fn vertex_count(&self) -> usize {
        match &self.state {
            AreaState::Idle => 0,
            AreaState::Placing { vertices, .. } | AreaState::Closing { vertices } => vertices.len(),
        }
    }

    pub fn is_closing(&self) -> bool {
        matches!(self.state, AreaState::Closing { .. })
    }

    /// Commit the open polygon. Returns false if it has too few vertices.
    pub fn close(&mut self) -> bool {
        let vertices = match &mut self.state {
            AreaState::Placing { vertices, .. } | AreaState::Closing { vertices }
                if vertices.len() >= MIN_POLYGON_VERTICES =>
            {
                std::mem::take(vertices)
            }
            _ => return false,
        };
        commit(&mut self.store, &self.frame, Shape::Polygon { vertices });
        self.state = AreaState::Idle;
        true
    }
}

impl Tool for AreaTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Area
    }

    fn frame(&self) -> &ToolFrame {
        &self.frame
    }

    fn frame_mut(&mut self) -> &mut ToolFrame {
        &mut self.frame
    }

    fn on_mouse_down(&mut self, at: Point, ctx: &ToolContext<'_>) {
        match &mut self.state {
            AreaState::Idle => {
                self.state = AreaState::Placing {
                    vertices: vec![at],
                    cursor: at,
                };
            }
            AreaState::Placing { vertices, .. }
                if vertices.len() >= MIN_POLYGON_VERTICES
                    && vertices[0].distance_to(at) <= ctx.config.close_tolerance =>
            {
                let vertices = std::mem::take(vertices);
                self.state = AreaState::Closing { vertices };
            }
            _ => {}
        }
    }

    fn on_mouse_move(&mut self, at: Point, _ctx: &ToolContext<'_>) {
        if let AreaState::Placing { cursor, .. } = &mut self.state {
            *cursor = at;
        }
    }

    fn on_mouse_up(&mut self, at: Point, _ctx: &ToolContext<'_>) {
        match &mut self.state {
            AreaState::Placing { vertices, cursor } => {
                *cursor = at;
                if vertices
                    .last()
                    .is_some_and(|last| last.distance_to(at) > MIN_GESTURE_DISTANCE)
                {
                    vertices.push(at);
                }
            }
            AreaState::Closing { .. } => {
                self.close();
            }
            AreaState::Idle => {}
        }
    }

    fn render(&self, surface: &mut dyn RasterSurface, ctx: &ToolContext<'_>) {
        draw_store(surface, &self.store, &self.frame, ctx);
        match &self.state {
            AreaState::Placing { vertices, cursor } => {
                let mut preview = vertices.clone();
                preview.push(*cursor);
                draw_polyline(surface, &preview, &ctx.preview_style());
            }
            AreaState::Closing { vertices } => {
                let shape = Shape::Polygon {
                    vertices: vertices.clone(),
                };
                draw_shape(surface, &shape, &ctx.preview_style(), self.frame.pixel_size, ctx);
            }
            AreaState::Idle => {}
        }
    }

    fn clear(&mut self) {
        self.state = AreaState::Idle;
        self.store.clear();
    }

    fn annotations(&self) -> Option<&AnnotationStore> {
        Some(&self.store)
    }

    fn annotations_mut(&mut self) -> Option<&mut AnnotationStore> {
        Some(&mut self.store)
    }
}
