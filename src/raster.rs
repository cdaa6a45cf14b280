use crate::enums::VoxelFormat;
use crate::palette::PaletteTable;
use crate::transform::{SliceGeometry, source_index};
use crate::volume::Volume;

use image::RgbaImage;
use web_time::Instant;

/// A voxel read back from the screen through the inverse transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoxelSample {
    pub voxel: (usize, usize, usize),
    /// Grayscale value, or the palette index for palette-indexed volumes.
    pub value: u8,
    pub rgb: [u8; 3],
}

/// Nearest-neighbour reads from one slice of a volume.
#[derive(Clone, Copy)]
pub struct SliceSampler<'a> {
    volume: &'a Volume,
    palette: &'a PaletteTable,
    geometry: SliceGeometry,
}

impl<'a> SliceSampler<'a> {
    pub fn new(volume: &'a Volume, palette: &'a PaletteTable, geometry: SliceGeometry) -> Self {
        Self {
            volume,
            palette,
            geometry,
        }
    }

    pub fn geometry(&self) -> &SliceGeometry {
        &self.geometry
    }

    #[inline]
    fn color(&self, value: u8) -> [u8; 3] {
        match self.volume.format() {
            VoxelFormat::Gray8 => [value, value, value],
            VoxelFormat::PaletteIndexed => self.palette.bgr(value),
        }
    }

    /// Sample the voxel displayed at a screen position, if it lies in the slice.
    pub fn sample(&self, x: f32, y: f32) -> Option<VoxelSample> {
        let voxel = self.geometry.screen_to_voxel(x, y)?;
        let value = self
            .volume
            .value_at(self.volume.voxel_index(voxel.0, voxel.1, voxel.2));
        Some(VoxelSample {
            voxel,
            value,
            rgb: self.color(value),
        })
    }
}

/// The output of one render pass.
#[derive(Clone, Debug)]
pub struct RenderedSlice {
    pub geometry: SliceGeometry,
    pub image: RgbaImage,
}

/// Converts one slice of a volume into an RGBA buffer.
pub struct SliceRasterizer<'a> {
    volume: &'a Volume,
    palette: &'a PaletteTable,
}

impl<'a> SliceRasterizer<'a> {
    pub fn new(volume: &'a Volume, palette: &'a PaletteTable) -> Self {
        Self { volume, palette }
    }

    pub fn rasterize(&self, geometry: &SliceGeometry) -> RenderedSlice {
        let start = Instant::now();
        let (width, height) = (geometry.rect.width, geometry.rect.height);
        let mut image = RgbaImage::new(width, height);
        if image.as_raw().len() != width as usize * height as usize * 4 {
            log::warn!(
                "Bad dst data len = {}, but expect {}*{}*4",
                image.as_raw().len(),
                width,
                height
            );
        }

        let sampler = SliceSampler::new(self.volume, self.palette, *geometry);
        let (step_h, step_v) = geometry.steps();
        let (dim_h, dim_v, _) = geometry.source;
        // Column lookups are identical for every row.
        let columns: Vec<usize> = (0..width)
            .map(|x| source_index(dim_h, step_h, x))
            .collect();

        let pixels: &mut [[u8; 4]] = bytemuck::cast_slice_mut(&mut *image);
        for (y, row) in pixels.chunks_exact_mut(width.max(1) as usize).enumerate() {
            let v = source_index(dim_v, step_v, y as u32);
            for (pixel, &h) in row.iter_mut().zip(&columns) {
                let (vx, vy, vz) = geometry.voxel_coords(h, v);
                let value = self.volume.value_at(self.volume.voxel_index(vx, vy, vz));
                let [r, g, b] = sampler.color(value);
                *pixel = [r, g, b, 255];
            }
        }

        log::debug!(
            "Rasterized {:?} slice {} into {}x{} in {:?}",
            geometry.plane,
            geometry.slice_index,
            width,
            height,
            start.elapsed()
        );
        RenderedSlice {
            geometry: *geometry,
            image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::Plane;
    use crate::transform::ViewportSpec;
    use crate::volume::{BoxSize, Extent3};

    fn spec(width: u32, height: u32, plane: Plane, zoom: f32) -> ViewportSpec {
        ViewportSpec {
            width,
            height,
            plane,
            slice_ratio: 0.0,
            zoom,
        }
    }

    fn render(volume: &Volume, palette: &PaletteTable, spec: &ViewportSpec) -> RenderedSlice {
        let geometry = SliceGeometry::compute(volume, spec).unwrap();
        SliceRasterizer::new(volume, palette).rasterize(&geometry)
    }

    #[test]
    fn single_bright_voxel_lands_at_center() {
        let mut voxels = vec![0u8; 64 * 64];
        voxels[32 * 64 + 32] = 255;
        let volume = Volume::new(
            Extent3::new(64, 64, 1),
            BoxSize::new(64.0, 64.0, 1.0),
            VoxelFormat::Gray8,
            voxels,
        );
        let slice = render(&volume, &PaletteTable::grayscale(), &spec(64, 64, Plane::Transverse, 1.0));

        assert_eq!(slice.image.dimensions(), (64, 64));
        let bright: Vec<_> = slice
            .image
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] > 0)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert_eq!(bright, vec![(32, 32)]);
        assert!(slice.image.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn grayscale_replicates_value() {
        let voxels: Vec<u8> = (0..16 * 16 * 4).map(|i| (i * 7 % 251) as u8).collect();
        let volume = Volume::new(
            Extent3::new(16, 16, 4),
            BoxSize::new(16.0, 16.0, 4.0),
            VoxelFormat::Gray8,
            voxels,
        );
        for plane in Plane::ALL {
            let slice = render(&volume, &PaletteTable::grayscale(), &spec(40, 30, plane, 1.3));
            for p in slice.image.pixels() {
                assert_eq!(p.0[0], p.0[1]);
                assert_eq!(p.0[1], p.0[2]);
                assert_eq!(p.0[3], 255);
            }
        }
    }

    #[test]
    fn palette_volume_uses_swapped_channels() {
        let dims = Extent3::new(4, 3, 2);
        let mut voxels = Vec::new();
        for i in 0..dims.count() as u8 {
            voxels.extend_from_slice(&[1, 2, 3, i * 10]);
        }
        let volume = Volume::new(
            dims,
            BoxSize::new(4.0, 3.0, 2.0),
            VoxelFormat::PaletteIndexed,
            voxels,
        );
        let table: Vec<u8> = (0..=255u8).flat_map(|i| [i, i / 2, 255 - i, 0]).collect();
        let palette = PaletteTable::from_flat(&table).unwrap();

        for plane in Plane::ALL {
            let s = ViewportSpec {
                slice_ratio: 0.7,
                ..spec(12, 12, plane, 1.0)
            };
            let slice = render(&volume, &palette, &s);
            for (x, y, p) in slice.image.enumerate_pixels() {
                let (vx, vy, vz) = slice.geometry.screen_to_voxel(x as f32, y as f32).unwrap();
                let idx = volume.voxel_index(vx, vy, vz) * 10;
                let t = &table;
                assert_eq!(
                    p.0,
                    [t[idx * 4 + 2], t[idx * 4 + 1], t[idx * 4], 255],
                    "{plane:?} pixel {x},{y}"
                );
            }
        }
    }

    #[test]
    fn rasterizing_twice_is_bit_identical() {
        let voxels: Vec<u8> = (0..24 * 12 * 6).map(|i| (i % 256) as u8).collect();
        let volume = Volume::new(
            Extent3::new(24, 12, 6),
            BoxSize::new(12.0, 12.0, 3.0),
            VoxelFormat::Gray8,
            voxels,
        );
        let s = ViewportSpec {
            slice_ratio: 0.6,
            ..spec(97, 53, Plane::Coronal, 0.7)
        };
        let palette = PaletteTable::grayscale();
        let a = render(&volume, &palette, &s);
        let b = render(&volume, &palette, &s);
        assert_eq!(a.image.as_raw(), b.image.as_raw());
    }

    #[test]
    fn short_voxel_buffer_renders_black_instead_of_panicking() {
        let volume = Volume::new(
            Extent3::new(10, 10, 10),
            BoxSize::new(1.0, 1.0, 1.0),
            VoxelFormat::Gray8,
            vec![200; 50],
        );
        let slice = render(&volume, &PaletteTable::grayscale(), &spec(10, 10, Plane::Sagittal, -2.5));
        assert!(slice.image.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn sampler_matches_rendered_pixel() {
        let voxels: Vec<u8> = (0..32 * 32 * 3).map(|i| (i * 13 % 256) as u8).collect();
        let volume = Volume::new(
            Extent3::new(32, 32, 3),
            BoxSize::new(32.0, 32.0, 3.0),
            VoxelFormat::Gray8,
            voxels,
        );
        let palette = PaletteTable::grayscale();
        let s = spec(50, 50, Plane::Transverse, 0.8);
        let slice = render(&volume, &palette, &s);
        let sampler = SliceSampler::new(&volume, &palette, slice.geometry);
        for &(x, y) in &[(0u32, 0u32), (10, 20), (49, 49), (25, 3)] {
            let sample = sampler.sample(x as f32 + 0.5, y as f32 + 0.5).unwrap();
            assert_eq!(slice.image.get_pixel(x, y).0[0], sample.value);
        }
        assert!(sampler.sample(60.0, 1.0).is_none());
    }
}
