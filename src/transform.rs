//! Mapping between screen pixels, voxels and physical units.
//!
//! Everything here is pure: the slice view computes a [`SliceGeometry`] once
//! per render pass and hands the derived rectangle and pixel size to every
//! tool before anything is drawn or any pointer event is processed.

use serde::{Deserialize, Serialize};

use crate::enums::Plane;
use crate::volume::Volume;

/// Physical volumes below this are treated as missing box information.
pub const TOO_SMALL: f32 = 1.0e-5;

/// What to show and where: the viewport plus slicing parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportSpec {
    pub width: u32,
    pub height: u32,
    pub plane: Plane,
    /// Normalized position along the plane normal.
    pub slice_ratio: f32,
    pub zoom: f32,
}

impl Default for ViewportSpec {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            plane: Plane::Transverse,
            slice_ratio: 0.5,
            zoom: 1.0,
        }
    }
}

/// The aspect-correct area of the viewport the slice is drawn into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub width: u32,
    pub height: u32,
}

impl ScreenRect {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && y >= 0.0 && x < self.width as f32 && y < self.height as f32
    }
}

/// Physical size of one pixel along the horizontal and vertical screen axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PixelSize {
    pub x: f32,
    pub y: f32,
}

impl PixelSize {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Physical length of a screen-space displacement.
    pub fn length(&self, dx: f32, dy: f32) -> f32 {
        (dx * self.x).hypot(dy * self.y)
    }

    /// Physical area of a screen-space area.
    pub fn area(&self, pixels: f32) -> f32 {
        pixels * self.x * self.y
    }
}

impl Default for PixelSize {
    fn default() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}

/// Largest rectangle within `width` x `height` with the given width/height ratio.
pub fn fit_screen_rect(width: u32, height: u32, ratio: f64) -> ScreenRect {
    let mut w_screen = width;
    let mut h_screen = (width as f64 / ratio).floor() as u32;
    if h_screen > height {
        h_screen = height;
        w_screen = (height as f64 * ratio).floor() as u32;
        if w_screen > width {
            log::warn!("Screen rect {w_screen}x{h_screen} exceeds viewport {width}x{height}");
            w_screen = width;
        }
    }
    ScreenRect::new(w_screen, h_screen.max(1))
}

/// Index of the slice selected by a normalized ratio, never past the last slice.
pub fn slice_index(dim: usize, ratio: f32) -> usize {
    if dim == 0 {
        return 0;
    }
    let index = (dim as f64 * ratio as f64).floor();
    if index.is_nan() || index < 0.0 {
        0
    } else {
        (index as usize).min(dim - 1)
    }
}

/// Source step per screen pixel along one axis.
pub fn axis_step(zoom: f32, source_dim: usize, screen_dim: u32) -> f64 {
    zoom as f64 * source_dim as f64 / screen_dim.max(1) as f64
}

/// Source index for screen pixel `i`.
///
/// The accumulator starts at the full source dimension and advances by
/// `step` per pixel; the truncated position wraps around the axis so reads
/// stay inside the volume for any zoom, including negative ones.
#[inline]
pub fn source_index(source_dim: usize, step: f64, i: u32) -> usize {
    if source_dim == 0 {
        return 0;
    }
    let position = (source_dim as f64 + step * i as f64).floor();
    if !position.is_finite() {
        return 0;
    }
    (position as i64).rem_euclid(source_dim as i64) as usize
}

/// Everything a render pass derives from a volume and a viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SliceGeometry {
    pub plane: Plane,
    pub rect: ScreenRect,
    pub pixel_size: PixelSize,
    pub slice_index: usize,
    pub zoom: f32,
    /// Source voxel counts along the horizontal, vertical and normal axes.
    pub source: (usize, usize, usize),
    /// Set when the box size could not be used for framing.
    pub degenerate: bool,
}

impl SliceGeometry {
    /// Returns `None` for an empty volume.
    pub fn compute(volume: &Volume, spec: &ViewportSpec) -> Option<Self> {
        if volume.is_empty() {
            return None;
        }
        let dims = volume.dims();
        let pbox = volume.box_size();
        let axes = spec.plane.axes();
        let (dim_h, dim_v, dim_n) = (
            dims.along(axes.horizontal),
            dims.along(axes.vertical),
            dims.along(axes.normal),
        );

        let (extent_h, extent_v) = (pbox.along(axes.horizontal), pbox.along(axes.vertical));
        let pixel_size = PixelSize::new(extent_h / dim_h as f32, extent_v / dim_v as f32);
        // Only framing falls back to voxel counts; measurements keep box / dims.
        let degenerate = !(pbox.volume() >= TOO_SMALL);
        let ratio = if degenerate {
            log::warn!(
                "Bad physical dimensions for rendered volume = {}*{}*{}",
                pbox.x,
                pbox.y,
                pbox.z
            );
            dim_h as f64 / dim_v as f64
        } else {
            extent_h as f64 / extent_v as f64
        };

        Some(Self {
            plane: spec.plane,
            rect: fit_screen_rect(spec.width, spec.height, ratio),
            pixel_size,
            slice_index: slice_index(dim_n, spec.slice_ratio),
            zoom: spec.zoom,
            source: (dim_h, dim_v, dim_n),
            degenerate,
        })
    }

    /// Per-pixel source steps along the horizontal and vertical axis.
    pub fn steps(&self) -> (f64, f64) {
        (
            axis_step(self.zoom, self.source.0, self.rect.width),
            axis_step(self.zoom, self.source.1, self.rect.height),
        )
    }

    /// Volume coordinates (x, y, z) sampled for an in-plane source position.
    pub fn voxel_coords(&self, h: usize, v: usize) -> (usize, usize, usize) {
        let n = self.slice_index;
        match self.plane {
            Plane::Transverse => (h, v, n),
            Plane::Sagittal => (n, h, v),
            Plane::Coronal => (h, n, v),
        }
    }

    /// Inverse mapping of a screen position to the voxel drawn there.
    pub fn screen_to_voxel(&self, x: f32, y: f32) -> Option<(usize, usize, usize)> {
        if !self.rect.contains(x, y) {
            return None;
        }
        let (step_h, step_v) = self.steps();
        let h = source_index(self.source.0, step_h, x as u32);
        let v = source_index(self.source.1, step_v, y as u32);
        Some(self.voxel_coords(h, v))
    }
}
