//! The 2D raster surface slices and tool overlays are drawn onto.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};
use tiny_skia::{ColorU8, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::annotation::Point;
use crate::error::ViewerError;

/// Color and width of stroked overlay geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub color: [u8; 4],
    pub width: f32,
}

/// A text label queued for the host's text renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub at: Point,
    pub text: String,
    pub color: [u8; 4],
    pub size: f32,
}

/// Drawing operations the viewer needs from its host canvas.
pub trait RasterSurface {
    fn size(&self) -> (u32, u32);

    fn resize(&mut self, width: u32, height: u32) -> Result<(), ViewerError>;

    /// Clear the whole surface to one color.
    fn fill(&mut self, color: [u8; 4]);

    /// Copy an RGBA buffer to the top-left corner, clipped to the surface.
    fn put_pixels(&mut self, image: &RgbaImage);

    fn draw_line(&mut self, from: Point, to: Point, style: &StrokeStyle);

    fn draw_rect(&mut self, a: Point, b: Point, style: &StrokeStyle);

    fn draw_circle(&mut self, center: Point, radius: f32, style: &StrokeStyle);

    fn draw_text(&mut self, at: Point, text: &str, color: [u8; 4], size: f32);

    /// Current contents as straight-alpha RGBA.
    fn to_image(&self) -> RgbaImage;

    /// Current contents encoded as PNG.
    fn encode_png(&self) -> Result<Vec<u8>, ViewerError> {
        let mut bytes = Vec::new();
        self.to_image()
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

/// CPU surface backed by a tiny-skia pixmap.
///
/// tiny-skia has no text shaping, so text is recorded as [`TextRun`]s for the
/// host to draw on top.
pub struct PixmapSurface {
    pixmap: Pixmap,
    text_runs: Vec<TextRun>,
}

impl PixmapSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, ViewerError> {
        let pixmap = Pixmap::new(width, height).ok_or(ViewerError::InvalidSurface { width, height })?;
        Ok(Self {
            pixmap,
            text_runs: Vec::new(),
        })
    }

    pub fn text_runs(&self) -> &[TextRun] {
        &self.text_runs
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    fn paint(color: [u8; 4]) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
        paint.anti_alias = true;
        paint
    }

    fn stroke_path(&mut self, path: Option<tiny_skia::Path>, style: &StrokeStyle) {
        let Some(path) = path else {
            return;
        };
        let stroke = Stroke {
            width: style.width,
            ..Stroke::default()
        };
        self.pixmap.stroke_path(
            &path,
            &Self::paint(style.color),
            &stroke,
            Transform::identity(),
            None,
        );
    }
}

impl RasterSurface for PixmapSurface {
    fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), ViewerError> {
        if self.size() != (width, height) {
            self.pixmap =
                Pixmap::new(width, height).ok_or(ViewerError::InvalidSurface { width, height })?;
            self.text_runs.clear();
        }
        Ok(())
    }

    fn fill(&mut self, color: [u8; 4]) {
        self.pixmap.fill(tiny_skia::Color::from_rgba8(
            color[0], color[1], color[2], color[3],
        ));
        self.text_runs.clear();
    }

    fn put_pixels(&mut self, image: &RgbaImage) {
        let (width, height) = self.size();
        let copy_w = image.width().min(width) as usize;
        let copy_h = image.height().min(height);
        let stride = width as usize;
        let pixels = self.pixmap.pixels_mut();
        for y in 0..copy_h {
            let dst = &mut pixels[y as usize * stride..][..copy_w];
            for (x, out) in dst.iter_mut().enumerate() {
                let [r, g, b, a] = image.get_pixel(x as u32, y).0;
                *out = ColorU8::from_rgba(r, g, b, a).premultiply();
            }
        }
    }

    fn draw_line(&mut self, from: Point, to: Point, style: &StrokeStyle) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.x, from.y);
        pb.line_to(to.x, to.y);
        self.stroke_path(pb.finish(), style);
    }

    fn draw_rect(&mut self, a: Point, b: Point, style: &StrokeStyle) {
        let mut pb = PathBuilder::new();
        pb.move_to(a.x, a.y);
        pb.line_to(b.x, a.y);
        pb.line_to(b.x, b.y);
        pb.line_to(a.x, b.y);
        pb.close();
        self.stroke_path(pb.finish(), style);
    }

    fn draw_circle(&mut self, center: Point, radius: f32, style: &StrokeStyle) {
        self.stroke_path(PathBuilder::from_circle(center.x, center.y, radius), style);
    }

    fn draw_text(&mut self, at: Point, text: &str, color: [u8; 4], size: f32) {
        self.text_runs.push(TextRun {
            at,
            text: text.to_owned(),
            color,
            size,
        });
    }

    fn to_image(&self) -> RgbaImage {
        let (width, height) = self.size();
        let raw: Vec<u8> = self
            .pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        RgbaImage::from_raw(width, height, raw).unwrap_or_else(|| RgbaImage::new(width, height))
    }
}
