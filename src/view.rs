//! The slice view: owns the raster surface, the viewport state and the tool
//! registry, and composites slice, segmentation and overlays.

use crate::annotation::Point;
use crate::config::ViewerConfig;
use crate::enums::{Plane, ToolKind};
use crate::error::ViewerError;
use crate::palette::PaletteTable;
use crate::raster::{RenderedSlice, SliceRasterizer, SliceSampler};
use crate::segmentation::SegmentationMask;
use crate::surface::RasterSurface;
use crate::tools::{PickReadout, PointerAction, ToolContext, ToolSet};
use crate::transform::{SliceGeometry, ViewportSpec};
use crate::volume::VolumeSet;

/// Pointer input in viewport coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
    DoubleClick(Point),
    Wheel { delta_y: f32 },
}

/// State changes the view reports to its host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewIntent {
    ZoomChanged(f32),
    ToolChanged(ToolKind),
    SliceRatioChanged(f32),
    PlaneChanged(Plane),
    VoxelPicked(PickReadout),
}

pub struct SliceView<S: RasterSurface> {
    surface: S,
    viewport: ViewportSpec,
    volume_index: usize,
    config: ViewerConfig,
    palette: PaletteTable,
    tools: ToolSet,
    active_tool: ToolKind,
    frame: Option<RenderedSlice>,
    dirty: bool,
    segmentation: Option<SegmentationMask>,
    show_segmentation: bool,
    active: bool,
    intents: Vec<ViewIntent>,
}

impl<S: RasterSurface> SliceView<S> {
    /// Take ownership of a surface; a surface without pixels is a hard fault.
    pub fn mount(surface: S, config: ViewerConfig, palette: PaletteTable) -> Result<Self, ViewerError> {
        let (width, height) = surface.size();
        if width == 0 || height == 0 {
            return Err(ViewerError::InvalidSurface { width, height });
        }
        let tools = ToolSet::new(&config);
        log::debug!("Mounted slice view on {width}x{height} surface");
        Ok(Self {
            surface,
            viewport: ViewportSpec {
                width,
                height,
                ..ViewportSpec::default()
            },
            volume_index: 0,
            config,
            palette,
            tools,
            active_tool: ToolKind::default(),
            frame: None,
            dirty: true,
            segmentation: None,
            show_segmentation: false,
            active: true,
            intents: Vec::new(),
        })
    }

    /// Tear the view down; later calls are ignored.
    pub fn dispose(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.frame = None;
        self.segmentation = None;
        self.intents.clear();
        self.tools.clear();
        log::debug!("Disposed slice view");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn guard(&self, operation: &str) -> bool {
        if !self.active {
            log::warn!("Ignoring {operation} on a disposed slice view");
        }
        self.active
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), ViewerError> {
        if !self.active {
            return Err(ViewerError::Disposed);
        }
        if width == 0 || height == 0 {
            return Err(ViewerError::InvalidSurface { width, height });
        }
        if (self.viewport.width, self.viewport.height) != (width, height) {
            self.surface.resize(width, height)?;
            self.viewport.width = width;
            self.viewport.height = height;
            self.dirty = true;
        }
        Ok(())
    }

    pub fn set_plane(&mut self, plane: Plane) {
        if !self.guard("plane change") || self.viewport.plane == plane {
            return;
        }
        self.viewport.plane = plane;
        self.dirty = true;
        self.intents.push(ViewIntent::PlaneChanged(plane));
    }

    pub fn set_slice_ratio(&mut self, ratio: f32) {
        if !self.guard("slice change") || self.viewport.slice_ratio == ratio {
            return;
        }
        self.viewport.slice_ratio = ratio;
        self.dirty = true;
        self.intents.push(ViewIntent::SliceRatioChanged(ratio));
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        if !self.guard("zoom change") || self.viewport.zoom == zoom {
            return;
        }
        log::debug!("Zoom {} -> {}", self.viewport.zoom, zoom);
        self.viewport.zoom = zoom;
        self.dirty = true;
        self.intents.push(ViewIntent::ZoomChanged(zoom));
    }

    pub fn set_volume_index(&mut self, index: usize) {
        if !self.guard("volume change") || self.volume_index == index {
            return;
        }
        self.volume_index = index;
        self.dirty = true;
    }

    /// Make `kind` the tool that receives pointer events.
    ///
    /// Selecting [`ToolKind::ZoomReset`] also resets the zoom to 1.
    pub fn select_tool(&mut self, kind: ToolKind) {
        if !self.guard("tool change") {
            return;
        }
        if kind == ToolKind::ZoomReset {
            self.set_zoom(1.0);
        }
        if self.active_tool != kind {
            self.active_tool = kind;
            self.intents.push(ViewIntent::ToolChanged(kind));
        }
    }

    /// Replace the segmentation overlay, or remove it with `None`.
    pub fn set_segmentation(&mut self, mask: Option<SegmentationMask>) {
        if !self.guard("segmentation update") {
            return;
        }
        self.segmentation = mask;
    }

    pub fn show_segmentation(&mut self, show: bool) {
        if self.guard("segmentation toggle") {
            self.show_segmentation = show;
        }
    }

    pub fn clear_tools(&mut self) {
        if self.guard("clear") {
            self.tools.clear();
        }
    }

    /// Rasterize the current volume and push the new frame to every tool.
    pub fn prepare_image<V: VolumeSet + ?Sized>(&mut self, volumes: &V) {
        if !self.guard("render") {
            return;
        }
        self.dirty = false;
        let Some(volume) = volumes
            .volume(self.volume_index)
            .filter(|volume| !volume.is_empty())
        else {
            log::debug!(
                "Nothing to render: volume {} of {}",
                self.volume_index,
                volumes.num_volumes()
            );
            self.frame = None;
            return;
        };
        let Some(geometry) = SliceGeometry::compute(volume, &self.viewport) else {
            self.frame = None;
            return;
        };
        self.tools.set_frame(geometry.rect, geometry.pixel_size);
        let slice = SliceRasterizer::new(volume, &self.palette).rasterize(&geometry);
        self.frame = Some(slice);
    }

    /// Switch to another volume of the set and rasterize it.
    pub fn prepare_image_for<V: VolumeSet + ?Sized>(&mut self, volumes: &V, index: usize) {
        self.set_volume_index(index);
        self.prepare_image(volumes);
    }

    /// Composite the current frame: slice or segmentation, then tool overlays.
    pub fn render(&mut self) {
        if !self.guard("render") {
            return;
        }
        self.surface.fill(self.config.background);
        if let Some(frame) = &self.frame {
            match (&self.segmentation, self.show_segmentation) {
                (Some(mask), true) => {
                    let mut image = frame.image.clone();
                    mask.blend_into(&mut image, &self.palette, self.config.segmentation_opacity);
                    self.surface.put_pixels(&image);
                }
                _ => self.surface.put_pixels(&frame.image),
            }
        }
        let ctx = ToolContext::new(self.viewport.plane, self.active_tool, &self.config);
        self.tools.render(&mut self.surface, &ctx);
    }

    /// Re-rasterize if any input changed, then composite.
    pub fn refresh<V: VolumeSet + ?Sized>(&mut self, volumes: &V) {
        if self.dirty {
            self.prepare_image(volumes);
        }
        self.render();
    }

    /// Route one pointer event to the active tool.
    ///
    /// A pending re-rasterization runs first so tools never see a frame
    /// older than the current viewport.
    pub fn handle_pointer<V: VolumeSet + ?Sized>(&mut self, volumes: &V, event: PointerEvent) {
        if !self.guard("pointer event") {
            return;
        }
        let (action, at) = match event {
            PointerEvent::Wheel { delta_y } => {
                let zoom = self
                    .config
                    .limit_zoom(self.viewport.zoom + delta_y * self.config.wheel_zoom_step);
                self.set_zoom(zoom);
                return;
            }
            PointerEvent::DoubleClick(_) => {
                if self.active_tool == ToolKind::Area && self.tools.close_area() {
                    log::debug!("Closed area polygon");
                }
                return;
            }
            PointerEvent::Down(at) => (PointerAction::Down, at),
            PointerEvent::Move(at) => (PointerAction::Move, at),
            PointerEvent::Up(at) => (PointerAction::Up, at),
        };
        if self.dirty || self.frame.is_none() {
            self.prepare_image(volumes);
        }

        let volume = volumes
            .volume(self.volume_index)
            .filter(|volume| !volume.is_empty());
        let sampler = match (volume, &self.frame) {
            (Some(volume), Some(frame)) => {
                Some(SliceSampler::new(volume, &self.palette, frame.geometry))
            }
            _ => None,
        };
        let ctx = ToolContext::new(self.viewport.plane, self.active_tool, &self.config)
            .with_sampler(sampler);
        self.tools.dispatch(self.active_tool, action, at, ctx);

        if self.active_tool == ToolKind::Pick && action == PointerAction::Down {
            if let Some(readout) = self.tools.pick().last() {
                self.intents.push(ViewIntent::VoxelPicked(*readout));
            }
        }
    }

    /// The current surface contents as PNG.
    pub fn screenshot(&self) -> Result<Vec<u8>, ViewerError> {
        if !self.active {
            return Err(ViewerError::Disposed);
        }
        self.surface.encode_png()
    }

    /// Take all intents queued since the last call.
    pub fn drain_intents(&mut self) -> Vec<ViewIntent> {
        std::mem::take(&mut self.intents)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn viewport(&self) -> &ViewportSpec {
        &self.viewport
    }

    pub fn volume_index(&self) -> usize {
        self.volume_index
    }

    pub fn active_tool(&self) -> ToolKind {
        self.active_tool
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    pub fn tools_mut(&mut self) -> &mut ToolSet {
        &mut self.tools
    }

    /// The last rasterized slice, if anything was rendered.
    pub fn frame(&self) -> Option<&RenderedSlice> {
        self.frame.as_ref()
    }

    pub fn needs_render(&self) -> bool {
        self.dirty
    }
}
