use serde::{Deserialize, Serialize};

/// Canonical slicing orientation through a volume.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Plane {
    /// Z slice, X across and Y down the screen.
    #[default]
    Transverse,
    /// X slice, Y across and Z down the screen.
    Sagittal,
    /// Y slice, X across and Z down the screen.
    Coronal,
}

/// Volume axis, used to describe which axes span a plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Axes of a plane: horizontal screen axis, vertical screen axis, normal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaneAxes {
    pub horizontal: Axis,
    pub vertical: Axis,
    pub normal: Axis,
}

impl Plane {
    pub const ALL: [Plane; 3] = [Plane::Transverse, Plane::Sagittal, Plane::Coronal];

    pub fn axes(self) -> PlaneAxes {
        match self {
            Plane::Transverse => PlaneAxes {
                horizontal: Axis::X,
                vertical: Axis::Y,
                normal: Axis::Z,
            },
            Plane::Sagittal => PlaneAxes {
                horizontal: Axis::Y,
                vertical: Axis::Z,
                normal: Axis::X,
            },
            Plane::Coronal => PlaneAxes {
                horizontal: Axis::X,
                vertical: Axis::Z,
                normal: Axis::Y,
            },
        }
    }
}

/// Storage format of a single voxel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VoxelFormat {
    /// One byte per voxel, rendered as grayscale.
    #[default]
    Gray8,
    /// Four bytes per voxel, palette index stored in the last byte.
    PaletteIndexed,
}

impl VoxelFormat {
    pub fn bytes_per_voxel(self) -> usize {
        match self {
            VoxelFormat::Gray8 => 1,
            VoxelFormat::PaletteIndexed => 4,
        }
    }

    pub fn from_bytes_per_voxel(bytes: usize) -> Option<Self> {
        match bytes {
            1 => Some(VoxelFormat::Gray8),
            4 => Some(VoxelFormat::PaletteIndexed),
            _ => None,
        }
    }
}

/// Interactive 2D tools selectable by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    /// Wheel zoom mode; pointer presses do nothing.
    #[default]
    Zoom,
    /// Resets zoom to 1.0 when selected.
    ZoomReset,
    /// Voxel intensity readout.
    Pick,
    Distance,
    Angle,
    Area,
    Rect,
    Text,
    Edit,
    Delete,
}

impl ToolKind {
    /// Tools that own annotations, in registry order.
    pub const ANNOTATING: [ToolKind; 5] = [
        ToolKind::Distance,
        ToolKind::Angle,
        ToolKind::Area,
        ToolKind::Rect,
        ToolKind::Text,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Zoom => "Zoom",
            ToolKind::ZoomReset => "Zoom to default",
            ToolKind::Pick => "Intensity",
            ToolKind::Distance => "Distance",
            ToolKind::Angle => "Angle",
            ToolKind::Area => "Area",
            ToolKind::Rect => "Rectangle",
            ToolKind::Text => "Text",
            ToolKind::Edit => "Edit",
            ToolKind::Delete => "Delete",
        }
    }
}
