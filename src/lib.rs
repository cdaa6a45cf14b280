//! # slice-view library
//!
//! Axis-aligned slicing of voxel volumes for 2D display, together with the
//! interactive measurement tools that sit on top of a slice.
//!
//! A volume is cut along one of the three medical planes:
//!  - Transverse
//!  - Sagittal
//!  - Coronal
//!
//! The slice is fitted into the viewport with the aspect ratio of the
//! physical box, resampled nearest-neighbour into an RGBA buffer, and drawn
//! on a [`RasterSurface`]. The physical size of one screen pixel is handed to
//! every tool so measurements are labelled in real units. Volumes hold either
//! 8-bit grayscale voxels or 4-byte voxels whose last byte indexes a
//! [`PaletteTable`].
//!
//! Tools:
//!  - Pick (voxel readout)
//!  - Distance, Angle, Area and Rect measurements
//!  - Text labels
//!  - Edit and Delete, which work across the annotations of all tools
//!
//! Rendering is single-threaded and lenient: malformed voxel buffers and
//! degenerate boxes are logged and drawn on a best-effort basis. Only a
//! surface that cannot exist is an error.
//!
//! # Examples
//!
//! ## Rendering a slice with a distance measurement
//!
//! ```no_run
//! # use slice_view::{BoxSize, Extent3, PaletteTable, PixmapSurface, Plane, Point,
//! #     PointerEvent, SliceView, ToolKind, ViewerConfig, Volume, VoxelFormat};
//! let volume = Volume::new(
//!     Extent3::new(256, 256, 64),
//!     BoxSize::new(200.0, 200.0, 80.0),
//!     VoxelFormat::Gray8,
//!     vec![0; 256 * 256 * 64],
//! );
//! let volumes = vec![volume];
//! let surface = PixmapSurface::new(512, 512).expect("should have created surface");
//! let mut view = SliceView::mount(surface, ViewerConfig::default(), PaletteTable::grayscale())
//!     .expect("should have mounted view");
//! view.set_plane(Plane::Coronal);
//! view.select_tool(ToolKind::Distance);
//! view.handle_pointer(&volumes, PointerEvent::Down(Point::new(100.0, 100.0)));
//! view.handle_pointer(&volumes, PointerEvent::Up(Point::new(300.0, 220.0)));
//! view.refresh(&volumes);
//! std::fs::write("slice.png", view.screenshot().expect("should have encoded png"))
//!     .expect("should have written screenshot");
//! ```

pub mod annotation;
pub mod config;
pub mod enums;
pub mod error;
pub mod palette;
pub mod raster;
pub mod segmentation;
pub mod surface;
pub mod tools;
pub mod transform;
pub mod view;
pub mod volume;

pub use annotation::{Annotation, AnnotationStore, Point, Shape};
pub use config::{LogLevel, OverlayStyle, ViewerConfig, ZoomLimits};
pub use enums::{Axis, Plane, ToolKind, VoxelFormat};
pub use error::ViewerError;
pub use palette::PaletteTable;
pub use raster::{RenderedSlice, SliceRasterizer, SliceSampler, VoxelSample};
pub use segmentation::SegmentationMask;
pub use surface::{PixmapSurface, RasterSurface, StrokeStyle, TextRun};
pub use tools::{Tool, ToolSet};
pub use transform::{PixelSize, ScreenRect, SliceGeometry, ViewportSpec};
pub use view::{PointerEvent, SliceView, ViewIntent};
pub use volume::{BoxSize, Extent3, Volume, VolumeSet};
