//! Interactive 2D tools.
//!
//! Every tool receives the current screen rectangle and pixel size from the
//! slice view before it renders or handles input, owns its own annotations,
//! and is driven through the [`Tool`] trait. Cross-tool operations (edit and
//! delete) are mediated by [`ToolSet`], which owns the whole registry.

mod angle;
mod area;
mod delete;
mod distance;
mod edit;
mod pick;
mod rect;
mod text;

pub use angle::AngleTool;
pub use area::AreaTool;
pub use delete::DeleteTool;
pub use distance::DistanceTool;
pub use edit::EditTool;
pub use pick::{PickReadout, PickTool};
pub use rect::RectTool;
pub use text::TextTool;

use crate::annotation::{Annotation, AnnotationStore, Point, Shape};
use crate::config::ViewerConfig;
use crate::enums::{Plane, ToolKind};
use crate::raster::SliceSampler;
use crate::surface::{RasterSurface, StrokeStyle};
use crate::transform::{PixelSize, ScreenRect};

/// Points closer than this are treated as the same click.
pub const MIN_GESTURE_DISTANCE: f32 = 0.5;

/// Offset of measurement labels from their anchor.
const LABEL_OFFSET: (f32, f32) = (6.0, -6.0);

/// Screen rectangle and pixel size pushed to a tool each render pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ToolFrame {
    pub rect: ScreenRect,
    pub pixel_size: PixelSize,
}

/// Identifies one annotation in the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnnotationRef {
    pub tool: ToolKind,
    pub index: usize,
}

/// Identifies one control point of an annotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandleRef {
    pub annotation: AnnotationRef,
    pub handle: usize,
}

/// Pointer phase delivered to a tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerAction {
    Down,
    Move,
    Up,
}

/// Read-only state shared with tools for one event or render pass.
#[derive(Clone, Copy)]
pub struct ToolContext<'a> {
    pub plane: Plane,
    pub active: ToolKind,
    pub config: &'a ViewerConfig,
    /// Present while a slice is on screen.
    pub sampler: Option<SliceSampler<'a>>,
    /// Annotation under the pointer, filled in by the registry for edit and delete.
    pub hit_annotation: Option<AnnotationRef>,
    /// Handle under the pointer, filled in by the registry for edit.
    pub hit_handle: Option<HandleRef>,
}

impl<'a> ToolContext<'a> {
    pub fn new(plane: Plane, active: ToolKind, config: &'a ViewerConfig) -> Self {
        Self {
            plane,
            active,
            config,
            sampler: None,
            hit_annotation: None,
            hit_handle: None,
        }
    }

    pub fn with_sampler(mut self, sampler: Option<SliceSampler<'a>>) -> Self {
        self.sampler = sampler;
        self
    }

    fn stroke(&self, color: [u8; 4]) -> StrokeStyle {
        StrokeStyle {
            color,
            width: self.config.overlay.line_width,
        }
    }

    pub(crate) fn line_style(&self) -> StrokeStyle {
        self.stroke(self.config.overlay.line_color)
    }

    pub(crate) fn preview_style(&self) -> StrokeStyle {
        self.stroke(self.config.overlay.preview_color)
    }

    pub(crate) fn handle_style(&self) -> StrokeStyle {
        self.stroke(self.config.overlay.handle_color)
    }

    pub(crate) fn highlight_style(&self) -> StrokeStyle {
        self.stroke(self.config.overlay.highlight_color)
    }
}

/// Common capability set of all 2D tools.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    fn frame(&self) -> &ToolFrame;

    fn frame_mut(&mut self) -> &mut ToolFrame;

    fn set_screen_dim(&mut self, width: u32, height: u32) {
        self.frame_mut().rect = ScreenRect::new(width, height);
    }

    fn set_pixel_size(&mut self, x: f32, y: f32) {
        self.frame_mut().pixel_size = PixelSize::new(x, y);
    }

    fn on_mouse_down(&mut self, at: Point, ctx: &ToolContext<'_>);

    fn on_mouse_move(&mut self, _at: Point, _ctx: &ToolContext<'_>) {}

    fn on_mouse_up(&mut self, _at: Point, _ctx: &ToolContext<'_>) {}

    fn render(&self, surface: &mut dyn RasterSurface, ctx: &ToolContext<'_>);

    /// Drop all annotations and any gesture in progress.
    fn clear(&mut self);

    fn annotations(&self) -> Option<&AnnotationStore> {
        None
    }

    fn annotations_mut(&mut self) -> Option<&mut AnnotationStore> {
        None
    }
}

pub(crate) fn draw_label(surface: &mut dyn RasterSurface, at: Point, text: &str, ctx: &ToolContext<'_>) {
    let overlay = &ctx.config.overlay;
    surface.draw_text(
        at.offset(LABEL_OFFSET.0, LABEL_OFFSET.1),
        text,
        overlay.text_color,
        overlay.font_size,
    );
}

fn label_anchor(shape: &Shape) -> Point {
    match shape {
        Shape::Segment { a, b } => a.midpoint(*b),
        Shape::Angle { vertex, .. } => *vertex,
        Shape::Polygon { vertices } => {
            let n = vertices.len().max(1) as f32;
            let (sx, sy) = vertices
                .iter()
                .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
            Point::new(sx / n, sy / n)
        }
        Shape::Rect { b, .. } => *b,
        Shape::Label { at, .. } => *at,
    }
}

/// Draw the outline of a shape, open or closed.
pub(crate) fn draw_outline(
    surface: &mut dyn RasterSurface,
    shape: &Shape,
    style: &StrokeStyle,
) {
    match shape {
        Shape::Segment { a, b } => surface.draw_line(*a, *b, style),
        Shape::Angle { a, vertex, b } => {
            surface.draw_line(*a, *vertex, style);
            surface.draw_line(*vertex, *b, style);
        }
        Shape::Polygon { vertices } => {
            for (p, q) in vertices.iter().zip(vertices.iter().cycle().skip(1)) {
                surface.draw_line(*p, *q, style);
            }
        }
        Shape::Rect { a, b } => surface.draw_rect(*a, *b, style),
        Shape::Label { .. } => {}
    }
}

pub(crate) fn draw_polyline(surface: &mut dyn RasterSurface, points: &[Point], style: &StrokeStyle) {
    for pair in points.windows(2) {
        surface.draw_line(pair[0], pair[1], style);
    }
}

/// Draw a shape with its handles and measurement label.
pub(crate) fn draw_shape(
    surface: &mut dyn RasterSurface,
    shape: &Shape,
    style: &StrokeStyle,
    pixel_size: PixelSize,
    ctx: &ToolContext<'_>,
) {
    draw_outline(surface, shape, style);
    if let Shape::Label { at, text } = shape {
        let overlay = &ctx.config.overlay;
        surface.draw_text(*at, text, overlay.text_color, overlay.font_size);
        return;
    }
    let handle = ctx.handle_style();
    for p in shape.handles() {
        surface.draw_circle(p, ctx.config.overlay.handle_radius, &handle);
    }
    if let Some(label) = shape.measurement(pixel_size) {
        draw_label(surface, label_anchor(shape), &label, ctx);
    }
}

/// Draw every annotation of a store at its stored position.
pub(crate) fn draw_store(
    surface: &mut dyn RasterSurface,
    store: &AnnotationStore,
    frame: &ToolFrame,
    ctx: &ToolContext<'_>,
) {
    let style = ctx.line_style();
    for annotation in store.iter() {
        if ctx.config.hide_stale_annotations && annotation.is_stale(frame.rect) {
            continue;
        }
        draw_shape(surface, &annotation.shape, &style, frame.pixel_size, ctx);
    }
}

pub(crate) fn commit(store: &mut AnnotationStore, frame: &ToolFrame, shape: Shape) {
    log::debug!("Committed {shape:?}");
    store.push(Annotation::new(shape, frame.rect));
}

/// Registry of all tool instances and mediator of cross-tool operations.
pub struct ToolSet {
    pick: PickTool,
    distance: DistanceTool,
    angle: AngleTool,
    area: AreaTool,
    rect: RectTool,
    text: TextTool,
    edit: EditTool,
    delete: DeleteTool,
}

impl ToolSet {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            pick: PickTool::default(),
            distance: DistanceTool::default(),
            angle: AngleTool::default(),
            area: AreaTool::default(),
            rect: RectTool::default(),
            text: TextTool::new(config.default_text.clone()),
            edit: EditTool::default(),
            delete: DeleteTool::default(),
        }
    }

    /// Dispatch table keyed by tool kind; zoom modes have no tool instance.
    pub fn tool(&self, kind: ToolKind) -> Option<&dyn Tool> {
        let tool: &dyn Tool = match kind {
            ToolKind::Zoom | ToolKind::ZoomReset => return None,
            ToolKind::Pick => &self.pick,
            ToolKind::Distance => &self.distance,
            ToolKind::Angle => &self.angle,
            ToolKind::Area => &self.area,
            ToolKind::Rect => &self.rect,
            ToolKind::Text => &self.text,
            ToolKind::Edit => &self.edit,
            ToolKind::Delete => &self.delete,
        };
        Some(tool)
    }

    pub fn tool_mut(&mut self, kind: ToolKind) -> Option<&mut dyn Tool> {
        let tool: &mut dyn Tool = match kind {
            ToolKind::Zoom | ToolKind::ZoomReset => return None,
            ToolKind::Pick => &mut self.pick,
            ToolKind::Distance => &mut self.distance,
            ToolKind::Angle => &mut self.angle,
            ToolKind::Area => &mut self.area,
            ToolKind::Rect => &mut self.rect,
            ToolKind::Text => &mut self.text,
            ToolKind::Edit => &mut self.edit,
            ToolKind::Delete => &mut self.delete,
        };
        Some(tool)
    }

    fn all_mut(&mut self) -> [&mut dyn Tool; 8] {
        [
            &mut self.pick,
            &mut self.distance,
            &mut self.angle,
            &mut self.area,
            &mut self.rect,
            &mut self.text,
            &mut self.edit,
            &mut self.delete,
        ]
    }

    pub fn all(&self) -> [&dyn Tool; 8] {
        [
            &self.pick,
            &self.distance,
            &self.angle,
            &self.area,
            &self.rect,
            &self.text,
            &self.edit,
            &self.delete,
        ]
    }

    /// Push the frame of the current render pass to every tool.
    pub fn set_frame(&mut self, rect: ScreenRect, pixel_size: PixelSize) {
        for tool in self.all_mut() {
            tool.set_screen_dim(rect.width, rect.height);
            tool.set_pixel_size(pixel_size.x, pixel_size.y);
        }
    }

    /// First annotation hit across all annotating tools, in registry order.
    pub fn hit_annotation(&self, at: Point, tolerance: f32) -> Option<AnnotationRef> {
        ToolKind::ANNOTATING.iter().find_map(|&tool| {
            let index = self.tool(tool)?.annotations()?.hit(at, tolerance)?;
            Some(AnnotationRef { tool, index })
        })
    }

    /// Closest handle within tolerance across all annotating tools.
    pub fn nearest_handle(&self, at: Point, tolerance: f32) -> Option<HandleRef> {
        ToolKind::ANNOTATING
            .iter()
            .filter_map(|&tool| {
                let (index, handle, dist) =
                    self.tool(tool)?.annotations()?.nearest_handle(at, tolerance)?;
                Some((HandleRef { annotation: AnnotationRef { tool, index }, handle }, dist))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(handle, _)| handle)
    }

    pub fn remove(&mut self, target: AnnotationRef) -> Option<Annotation> {
        self.tool_mut(target.tool)?
            .annotations_mut()?
            .remove(target.index)
    }

    pub fn move_handle(&mut self, target: HandleRef, to: Point) -> bool {
        self.tool_mut(target.annotation.tool)
            .and_then(|t| t.annotations_mut())
            .is_some_and(|s| s.move_handle(target.annotation.index, target.handle, to))
    }

    /// Route one pointer action to a tool and apply any cross-tool request it made.
    pub fn dispatch(
        &mut self,
        kind: ToolKind,
        action: PointerAction,
        at: Point,
        mut ctx: ToolContext<'_>,
    ) {
        let tolerance = ctx.config.hit_tolerance;
        match kind {
            ToolKind::Edit if action == PointerAction::Down => {
                ctx.hit_handle = self.nearest_handle(at, tolerance);
            }
            ToolKind::Delete => ctx.hit_annotation = self.hit_annotation(at, tolerance),
            _ => {}
        }

        let Some(tool) = self.tool_mut(kind) else {
            return;
        };
        match action {
            PointerAction::Down => tool.on_mouse_down(at, &ctx),
            PointerAction::Move => tool.on_mouse_move(at, &ctx),
            PointerAction::Up => tool.on_mouse_up(at, &ctx),
        }

        if let Some((handle, to)) = self.edit.take_pending_move() {
            if !self.move_handle(handle, to) {
                log::debug!("Edit target {handle:?} no longer exists");
                self.edit.cancel();
            }
        }
        if let Some(target) = self.delete.take_pending_delete() {
            if let Some(removed) = self.remove(target) {
                log::debug!("Deleted {:?} from {:?}", removed.shape, target.tool);
            }
        }
    }

    /// Finish the area polygon in progress, if it has enough vertices.
    pub fn close_area(&mut self) -> bool {
        self.area.close()
    }

    pub fn clear(&mut self) {
        for tool in self.all_mut() {
            tool.clear();
        }
    }

    pub fn render(&self, surface: &mut dyn RasterSurface, ctx: &ToolContext<'_>) {
        for tool in self.all() {
            tool.render(surface, ctx);
        }
    }

    pub fn pick(&self) -> &PickTool {
        &self.pick
    }

    pub fn distance(&self) -> &DistanceTool {
        &self.distance
    }

    pub fn angle(&self) -> &AngleTool {
        &self.angle
    }

    pub fn area(&self) -> &AreaTool {
        &self.area
    }

    pub fn rect(&self) -> &RectTool {
        &self.rect
    }

    pub fn text(&self) -> &TextTool {
        &self.text
    }

    pub fn text_mut(&mut self) -> &mut TextTool {
        &mut self.text
    }

    pub fn edit(&self) -> &EditTool {
        &self.edit
    }
}
