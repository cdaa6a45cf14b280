use super::{AnnotationRef, Tool, ToolContext, ToolFrame};
use crate::annotation::Point;
use crate::enums::ToolKind;
use crate::surface::RasterSurface;

/// Removes the first annotation under the pointer, whichever tool owns it.
#[derive(Debug, Default)]
pub struct DeleteTool {
    frame: ToolFrame,
    /// Pointer position while it hovers an annotation.
    hover: Option<Point>,
    pending: Option<AnnotationRef>,
}

impl DeleteTool {
    pub(crate) fn take_pending_delete(&mut self) -> Option<AnnotationRef> {
        self.pending.take()
    }
}

impl Tool for DeleteTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Delete
    }

    fn frame(&self) -> &ToolFrame {
        &self.frame
    }

    fn frame_mut(&mut self) -> &mut ToolFrame {
        &mut self.frame
    }

    fn on_mouse_down(&mut self, _at: Point, ctx: &ToolContext<'_>) {
        self.pending = ctx.hit_annotation;
        self.hover = None;
    }

    fn on_mouse_move(&mut self, at: Point, ctx: &ToolContext<'_>) {
        self.hover = ctx.hit_annotation.map(|_| at);
    }

    fn render(&self, surface: &mut dyn RasterSurface, ctx: &ToolContext<'_>) {
        if let Some(at) = self.hover {
            surface.draw_circle(at, ctx.config.hit_tolerance, &ctx.highlight_style());
        }
    }

    fn clear(&mut self) {
        self.hover = None;
        self.pending = None;
    }
}
