use crate::enums::{Axis, VoxelFormat};
use crate::error::ViewerError;

use ndarray::Array3;

/// Voxel counts along each axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Extent3 {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Extent3 {
    pub fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    pub fn along(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Number of voxels, `None` if it does not fit in `usize`.
    pub fn checked_count(&self) -> Option<usize> {
        self.x.checked_mul(self.y)?.checked_mul(self.z)
    }

    /// Number of voxels; dimensions whose product overflows count as empty.
    pub fn count(&self) -> usize {
        self.checked_count().unwrap_or(0)
    }
}

/// Physical extents of the volume box (e.g. millimeters).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxSize {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl BoxSize {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn volume(&self) -> f32 {
        self.x * self.y * self.z
    }
}

/// A read-only voxel volume as handed over by the loader.
///
/// The voxel buffer is kept as-is even when its length disagrees with the
/// dimensions; every read is bounds-checked and falls back to zero.
#[derive(Clone, Debug, Default)]
pub struct Volume {
    dims: Extent3,
    box_size: BoxSize,
    format: VoxelFormat,
    voxels: Vec<u8>,
}

impl Volume {
    pub fn new(dims: Extent3, box_size: BoxSize, format: VoxelFormat, voxels: Vec<u8>) -> Self {
        let volume = Self {
            dims,
            box_size,
            format,
            voxels,
        };
        if dims.checked_count().is_none() {
            log::warn!(
                "Volume dims {}*{}*{} overflow, treating volume as empty",
                dims.x,
                dims.y,
                dims.z
            );
        } else if !volume.has_consistent_length() {
            log::warn!(
                "Bad src data len = {}, but expect {}*{}*{}*{}",
                volume.voxels.len(),
                dims.x,
                dims.y,
                dims.z,
                format.bytes_per_voxel()
            );
        }
        volume
    }

    /// Build a volume from raw bytes, rejecting unsupported voxel sizes.
    pub fn from_raw(
        dims: Extent3,
        box_size: BoxSize,
        bytes_per_voxel: usize,
        voxels: Vec<u8>,
    ) -> Result<Self, ViewerError> {
        let format = VoxelFormat::from_bytes_per_voxel(bytes_per_voxel).ok_or_else(|| {
            ViewerError::InvalidVolume(format!("unsupported {bytes_per_voxel} bytes per voxel"))
        })?;
        Ok(Self::new(dims, box_size, format, voxels))
    }

    /// Build a grayscale volume from an array shaped (depth, height, width).
    pub fn from_array(data: Array3<u8>, box_size: BoxSize) -> Self {
        let (depth, height, width) = data.dim();
        let voxels: Vec<u8> = data.iter().copied().collect();
        Self::new(
            Extent3::new(width, height, depth),
            box_size,
            VoxelFormat::Gray8,
            voxels,
        )
    }

    /// Get the dimensions of the volume (x, y, z)
    pub fn dims(&self) -> Extent3 {
        self.dims
    }

    pub fn box_size(&self) -> BoxSize {
        self.box_size
    }

    pub fn format(&self) -> VoxelFormat {
        self.format
    }

    pub fn bytes_per_voxel(&self) -> usize {
        self.format.bytes_per_voxel()
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &[u8] {
        &self.voxels
    }

    pub fn expected_len(&self) -> usize {
        self.dims.count().saturating_mul(self.bytes_per_voxel())
    }

    pub fn has_consistent_length(&self) -> bool {
        self.voxels.len() == self.expected_len()
    }

    /// True when there is nothing to slice.
    pub fn is_empty(&self) -> bool {
        self.dims.count() == 0 || self.voxels.is_empty()
    }

    /// Flat voxel index of (x, y, z), X fastest.
    ///
    /// An index that overflows saturates to `usize::MAX`, which reads as zero.
    #[inline]
    pub fn voxel_index(&self, x: usize, y: usize, z: usize) -> usize {
        z.checked_mul(self.dims.y)
            .and_then(|i| i.checked_add(y))
            .and_then(|i| i.checked_mul(self.dims.x))
            .and_then(|i| i.checked_add(x))
            .unwrap_or(usize::MAX)
    }

    /// Grayscale value or palette index stored for a voxel.
    #[inline]
    pub fn value_at(&self, voxel: usize) -> u8 {
        let offset = match self.format {
            VoxelFormat::Gray8 => Some(voxel),
            VoxelFormat::PaletteIndexed => voxel.checked_mul(4).and_then(|o| o.checked_add(3)),
        };
        offset
            .and_then(|o| self.voxels.get(o))
            .copied()
            .unwrap_or(0)
    }
}

/// Source of volumes addressed by index.
pub trait VolumeSet {
    fn volume(&self, index: usize) -> Option<&Volume>;
    fn num_volumes(&self) -> usize;
}

impl VolumeSet for [Volume] {
    fn volume(&self, index: usize) -> Option<&Volume> {
        self.get(index)
    }

    fn num_volumes(&self) -> usize {
        self.len()
    }
}

impl VolumeSet for Vec<Volume> {
    fn volume(&self, index: usize) -> Option<&Volume> {
        self.get(index)
    }

    fn num_volumes(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_array_keeps_x_fastest() {
        let mut data = Array3::<u8>::zeros((2, 3, 4));
        data[[1, 2, 3]] = 77;
        let volume = Volume::from_array(data, BoxSize::new(4.0, 3.0, 2.0));
        assert_eq!(volume.dims(), Extent3::new(4, 3, 2));
        assert!(volume.has_consistent_length());
        assert_eq!(volume.value_at(volume.voxel_index(3, 2, 1)), 77);
    }

    #[test]
    fn palette_index_is_read_from_last_byte() {
        let voxels = vec![10, 20, 30, 40, 11, 21, 31, 41];
        let volume = Volume::from_raw(Extent3::new(2, 1, 1), BoxSize::new(1.0, 1.0, 1.0), 4, voxels)
            .unwrap();
        assert_eq!(volume.value_at(0), 40);
        assert_eq!(volume.value_at(1), 41);
    }

    #[test]
    fn short_buffer_reads_zero() {
        let volume = Volume::new(
            Extent3::new(4, 4, 1),
            BoxSize::new(1.0, 1.0, 1.0),
            VoxelFormat::Gray8,
            vec![5; 8],
        );
        assert!(!volume.has_consistent_length());
        assert_eq!(volume.value_at(7), 5);
        assert_eq!(volume.value_at(15), 0);
        assert_eq!(volume.value_at(usize::MAX), 0);
    }

    #[test]
    fn overflowing_dims_are_an_empty_volume() {
        let dims = Extent3::new(usize::MAX, 2, 2);
        assert_eq!(dims.checked_count(), None);
        assert_eq!(dims.count(), 0);

        let volume = Volume::new(dims, BoxSize::new(1.0, 1.0, 1.0), VoxelFormat::Gray8, vec![1; 16]);
        assert!(volume.is_empty());
        assert_eq!(volume.voxel_index(3, 1, 1), usize::MAX);
        assert_eq!(volume.value_at(volume.voxel_index(3, 1, 1)), 0);
    }

    #[test]
    fn unsupported_voxel_size_is_rejected() {
        let result = Volume::from_raw(Extent3::new(1, 1, 1), BoxSize::default(), 2, vec![0, 0]);
        assert!(matches!(result, Err(ViewerError::InvalidVolume(_))));
    }

    #[test]
    fn vec_is_a_volume_set() {
        let volumes = vec![Volume::default()];
        assert_eq!(volumes.num_volumes(), 1);
        assert!(volumes.volume(0).is_some_and(Volume::is_empty));
        assert!(volumes.volume(1).is_none());
    }
}
