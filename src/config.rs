//! Viewer settings, serializable to JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ViewerError;

/// Current configuration file format version.
pub const CONFIG_VERSION: u32 = 1;

/// Log level setting for the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Optional bounds applied to zoom changes coming from the wheel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min: f32,
    pub max: f32,
}

impl ZoomLimits {
    /// Bounds as (low, high); a reversed pair is swapped and NaN leaves that side open.
    pub fn bounds(&self) -> (f32, f32) {
        let min = if self.min.is_nan() { f32::NEG_INFINITY } else { self.min };
        let max = if self.max.is_nan() { f32::INFINITY } else { self.max };
        if min <= max { (min, max) } else { (max, min) }
    }

    pub fn clamp(&self, zoom: f32) -> f32 {
        let (low, high) = self.bounds();
        zoom.max(low).min(high)
    }

    fn is_well_formed(&self) -> bool {
        self.min <= self.max
    }
}

/// Colors and sizes used by tool overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    pub line_color: [u8; 4],
    pub preview_color: [u8; 4],
    pub handle_color: [u8; 4],
    pub highlight_color: [u8; 4],
    pub text_color: [u8; 4],
    pub line_width: f32,
    pub handle_radius: f32,
    pub font_size: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            line_color: [255, 255, 0, 255],
            preview_color: [0, 255, 255, 255],
            handle_color: [0, 255, 0, 255],
            highlight_color: [255, 0, 0, 255],
            text_color: [255, 255, 255, 255],
            line_width: 2.0,
            handle_radius: 3.0,
            font_size: 14.0,
        }
    }
}

/// Settings of a slice view and its tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub version: u32,
    pub log_level: LogLevel,
    /// Fill color behind the rendered slice.
    pub background: [u8; 4],
    /// Radius in screen pixels for handle and edge hit tests.
    pub hit_tolerance: f32,
    /// Radius around the first polygon vertex that closes an area.
    pub close_tolerance: f32,
    /// Zoom change per unit of wheel delta.
    pub wheel_zoom_step: f32,
    /// `None` keeps wheel zoom unbounded.
    pub zoom_limits: Option<ZoomLimits>,
    pub segmentation_opacity: f32,
    /// Skip annotations created under a different screen rectangle.
    pub hide_stale_annotations: bool,
    pub default_text: String,
    pub overlay: OverlayStyle,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            log_level: LogLevel::default(),
            background: [0, 0, 0, 255],
            hit_tolerance: 6.0,
            close_tolerance: 10.0,
            wheel_zoom_step: 1.0 / 64.0,
            zoom_limits: None,
            segmentation_opacity: 0.5,
            hide_stale_annotations: false,
            default_text: String::from("Text"),
            overlay: OverlayStyle::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> Result<Self, ViewerError> {
        let config: ViewerConfig = serde_json::from_str(json)?;
        if config.version > CONFIG_VERSION {
            log::warn!(
                "Config version {} is newer than supported version {}",
                config.version,
                CONFIG_VERSION
            );
        }
        if let Some(limits) = config.zoom_limits.filter(|l| !l.is_well_formed()) {
            log::warn!(
                "Zoom limits {} .. {} are reversed or not numbers, using {:?}",
                limits.min,
                limits.max,
                limits.bounds()
            );
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ViewerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ViewerError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ViewerError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Applies the configured zoom limits, if any.
    pub fn limit_zoom(&self, zoom: f32) -> f32 {
        match &self.zoom_limits {
            Some(limits) => limits.clamp(zoom),
            None => zoom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = ViewerConfig::from_json(r#"{ "hit_tolerance": 9.0 }"#).unwrap();
        assert_eq!(config.hit_tolerance, 9.0);
        assert_eq!(config.close_tolerance, 10.0);
        assert_eq!(config.zoom_limits, None);
        assert_eq!(config.overlay, OverlayStyle::default());
    }

    #[test]
    fn json_roundtrip_preserves_limits() {
        let config = ViewerConfig {
            zoom_limits: Some(ZoomLimits { min: 0.25, max: 4.0 }),
            log_level: LogLevel::Debug,
            ..Default::default()
        };
        let parsed = ViewerConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn zoom_is_unbounded_without_limits() {
        let mut config = ViewerConfig::default();
        assert_eq!(config.limit_zoom(-3.0), -3.0);
        config.zoom_limits = Some(ZoomLimits { min: 0.1, max: 8.0 });
        assert_eq!(config.limit_zoom(-3.0), 0.1);
        assert_eq!(config.limit_zoom(20.0), 8.0);
    }

    #[test]
    fn reversed_zoom_limits_are_swapped() {
        let config = ViewerConfig::from_json(r#"{"zoom_limits":{"min":4.0,"max":0.25}}"#).unwrap();
        assert_eq!(config.limit_zoom(1.0 + 1.0 / 64.0), 1.0 + 1.0 / 64.0);
        assert_eq!(config.limit_zoom(10.0), 4.0);
        assert_eq!(config.limit_zoom(-2.0), 0.25);
    }

    #[test]
    fn nan_zoom_limit_leaves_side_open() {
        let limits = ZoomLimits {
            min: f32::NAN,
            max: 2.0,
        };
        assert_eq!(limits.clamp(-5.0), -5.0);
        assert_eq!(limits.clamp(3.0), 2.0);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            ViewerConfig::from_json("{ not json"),
            Err(ViewerError::Config(_))
        ));
    }
}
