use thiserror::Error;

/// Hard faults raised by the viewer core.
///
/// Malformed imaging data is never an error here: shape mismatches and
/// degenerate geometry are logged and rendered on a best-effort basis.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("Cannot create a {width}x{height} raster surface")]
    InvalidSurface { width: u32, height: u32 },

    #[error("Palette must hold 256 RGB or RGBA entries, got {len} bytes")]
    InvalidPalette { len: usize },

    #[error("Invalid volume: {0}")]
    InvalidVolume(String),

    #[error("View has been disposed")]
    Disposed,

    #[error("Image encoding error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}
