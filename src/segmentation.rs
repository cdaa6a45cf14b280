//! Label-map overlay shown in place of the plain slice.

use image::RgbaImage;
use ndarray::Array2;

use crate::palette::PaletteTable;

/// Per-pixel labels in screen space, shaped (height, width).
///
/// Label 0 is background and leaves the slice untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentationMask {
    labels: Array2<u8>,
}

impl SegmentationMask {
    pub fn new(labels: Array2<u8>) -> Self {
        Self { labels }
    }

    /// Build a mask from a row-major label buffer.
    pub fn from_raw(width: u32, height: u32, labels: Vec<u8>) -> Option<Self> {
        Array2::from_shape_vec((height as usize, width as usize), labels)
            .ok()
            .map(Self::new)
    }

    /// Size as (width, height).
    pub fn size(&self) -> (u32, u32) {
        let (height, width) = self.labels.dim();
        (width as u32, height as u32)
    }

    pub fn labels(&self) -> &Array2<u8> {
        &self.labels
    }

    #[inline]
    pub fn label_at(&self, x: u32, y: u32) -> u8 {
        self.labels
            .get((y as usize, x as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Blend palette colors of all labelled pixels into `image`.
    ///
    /// Pixels outside the mask are left alone, so a mask computed for an
    /// older screen rectangle still blends where the two overlap.
    pub fn blend_into(&self, image: &mut RgbaImage, palette: &PaletteTable, opacity: f32) {
        if self.size() != image.dimensions() {
            log::warn!(
                "Segmentation mask {:?} does not match slice {:?}",
                self.size(),
                image.dimensions()
            );
        }
        let alpha = opacity.clamp(0.0, 1.0);
        for (x, y, pixel) in image.enumerate_pixels_mut() {
            let label = self.label_at(x, y);
            if label == 0 {
                continue;
            }
            let color = palette.bgr(label);
            for (channel, &c) in pixel.0.iter_mut().zip(&color) {
                let mixed = *channel as f32 * (1.0 - alpha) + c as f32 * alpha;
                *channel = mixed.round() as u8;
            }
        }
    }
}
