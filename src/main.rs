use std::path::Path;

use ndarray::Array3;
use slice_view::{
    BoxSize, PaletteTable, PixmapSurface, Plane, Point, PointerEvent, SliceView, ToolKind,
    ViewerConfig, ViewerError, Volume,
};

/// A sphere of rising intensity in a 128x128x64 box.
fn phantom() -> Volume {
    let (depth, height, width) = (64, 128, 128);
    let data = Array3::from_shape_fn((depth, height, width), |(z, y, x)| {
        let dx = x as f32 - width as f32 / 2.0;
        let dy = y as f32 - height as f32 / 2.0;
        let dz = (z as f32 - depth as f32 / 2.0) * 2.0;
        let r = (dx * dx + dy * dy + dz * dz).sqrt();
        if r < 50.0 { (255.0 - r * 4.0) as u8 } else { 0 }
    });
    Volume::from_array(data, BoxSize::new(128.0, 128.0, 128.0))
}

fn main() -> Result<(), ViewerError> {
    let config_path = std::env::args().nth(1);
    let config = match &config_path {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .init();

    let volumes = vec![phantom()];
    let surface = PixmapSurface::new(512, 384)?;
    let mut view = SliceView::mount(surface, config, PaletteTable::grayscale())?;
    view.set_plane(Plane::Coronal);

    view.select_tool(ToolKind::Distance);
    view.handle_pointer(&volumes, PointerEvent::Down(Point::new(90.0, 192.0)));
    view.handle_pointer(&volumes, PointerEvent::Up(Point::new(290.0, 192.0)));

    view.select_tool(ToolKind::Pick);
    view.handle_pointer(&volumes, PointerEvent::Down(Point::new(190.0, 190.0)));
    view.refresh(&volumes);

    for intent in view.drain_intents() {
        log::info!("{intent:?}");
    }
    for run in view.surface().text_runs() {
        log::info!("Label '{}' at ({:.0}, {:.0})", run.text, run.at.x, run.at.y);
    }
    let out = Path::new("screenshot.png");
    std::fs::write(out, view.screenshot()?)?;
    log::info!("Saved {}", out.display());
    Ok(())
}
