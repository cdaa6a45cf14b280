use super::{HandleRef, Tool, ToolContext, ToolFrame};
use crate::annotation::Point;
use crate::enums::ToolKind;
use crate::surface::RasterSurface;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum EditState {
    #[default]
    Idle,
    Dragging { handle: HandleRef, cursor: Point },
}

/// Drags control points of annotations owned by other tools.
///
/// The tool only tracks the gesture; the registry resolves the handle under
/// the pointer and applies the queued move to the owning tool.
#[derive(Debug, Default)]
pub struct EditTool {
    frame: ToolFrame,
    state: EditState,
    pending: Option<(HandleRef, Point)>,
}

impl EditTool {
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, EditState::Dragging { .. })
    }

    pub(crate) fn take_pending_move(&mut self) -> Option<(HandleRef, Point)> {
        self.pending.take()
    }

    /// Abandon the drag, e.g. when its annotation was deleted.
    pub(crate) fn cancel(&mut self) {
        self.state = EditState::Idle;
        self.pending = None;
    }
}

impl Tool for EditTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Edit
    }

    fn frame(&self) -> &ToolFrame {
        &self.frame
    }

    fn frame_mut(&mut self) -> &mut ToolFrame {
        &mut self.frame
    }

    fn on_mouse_down(&mut self, at: Point, ctx: &ToolContext<'_>) {
        if let Some(handle) = ctx.hit_handle {
            log::debug!("Editing {handle:?}");
            self.state = EditState::Dragging { handle, cursor: at };
        }
    }

    fn on_mouse_move(&mut self, at: Point, _ctx: &ToolContext<'_>) {
        if let EditState::Dragging { handle, cursor } = &mut self.state {
            *cursor = at;
            self.pending = Some((*handle, at));
        }
    }

    fn on_mouse_up(&mut self, at: Point, _ctx: &ToolContext<'_>) {
        if let EditState::Dragging { handle, .. } = self.state {
            self.pending = Some((handle, at));
            self.state = EditState::Idle;
        }
    }

    fn render(&self, surface: &mut dyn RasterSurface, ctx: &ToolContext<'_>) {
        if let EditState::Dragging { cursor, .. } = self.state {
            surface.draw_circle(
                cursor,
                ctx.config.overlay.handle_radius * 2.0,
                &ctx.highlight_style(),
            );
        }
    }

    fn clear(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::enums::Plane;
    use crate::tools::AnnotationRef;

    #[test]
    fn press_without_handle_stays_idle() {
        let config = ViewerConfig::default();
        let ctx = ToolContext::new(Plane::Transverse, ToolKind::Edit, &config);
        let mut tool = EditTool::default();
        tool.on_mouse_down(Point::new(1.0, 1.0), &ctx);
        tool.on_mouse_move(Point::new(5.0, 5.0), &ctx);
        assert!(!tool.is_dragging());
        assert!(tool.take_pending_move().is_none());
    }

    #[test]
    fn drag_queues_moves_until_release() {
        let config = ViewerConfig::default();
        let handle = HandleRef {
            annotation: AnnotationRef {
                tool: ToolKind::Rect,
                index: 0,
            },
            handle: 1,
        };
        let mut ctx = ToolContext::new(Plane::Transverse, ToolKind::Edit, &config);
        ctx.hit_handle = Some(handle);
        let mut tool = EditTool::default();
        tool.on_mouse_down(Point::new(1.0, 1.0), &ctx);
        assert!(tool.is_dragging());

        tool.on_mouse_move(Point::new(5.0, 6.0), &ctx);
        assert_eq!(tool.take_pending_move(), Some((handle, Point::new(5.0, 6.0))));
        tool.on_mouse_up(Point::new(7.0, 8.0), &ctx);
        assert_eq!(tool.take_pending_move(), Some((handle, Point::new(7.0, 8.0))));
        assert!(!tool.is_dragging());
    }
}
