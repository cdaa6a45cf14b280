use super::{Tool, ToolContext, ToolFrame, draw_label};
use crate::annotation::Point;
use crate::enums::ToolKind;
use crate::raster::VoxelSample;
use crate::surface::RasterSurface;

/// Result of the most recent pick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickReadout {
    pub at: Point,
    pub sample: VoxelSample,
}

/// Reports the voxel value under the pointer on every press.
///
/// Nothing is persisted; only the latest readout is kept for display.
#[derive(Debug, Default)]
pub struct PickTool {
    frame: ToolFrame,
    last: Option<PickReadout>,
}

impl PickTool {
    pub fn last(&self) -> Option<&PickReadout> {
        self.last.as_ref()
    }
}

impl Tool for PickTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Pick
    }

    fn frame(&self) -> &ToolFrame {
        &self.frame
    }

    fn frame_mut(&mut self) -> &mut ToolFrame {
        &mut self.frame
    }

    fn on_mouse_down(&mut self, at: Point, ctx: &ToolContext<'_>) {
        self.last = ctx
            .sampler
            .as_ref()
            .and_then(|sampler| sampler.sample(at.x, at.y))
            .map(|sample| PickReadout { at, sample });
        match &self.last {
            Some(readout) => log::info!(
                "Picked voxel {:?} = {} at ({:.0}, {:.0})",
                readout.sample.voxel,
                readout.sample.value,
                at.x,
                at.y
            ),
            None => log::debug!("Pick at ({:.0}, {:.0}) is outside the slice", at.x, at.y),
        }
    }

    fn render(&self, surface: &mut dyn RasterSurface, ctx: &ToolContext<'_>) {
        let Some(readout) = &self.last else {
            return;
        };
        let (x, y, z) = readout.sample.voxel;
        surface.draw_circle(readout.at, ctx.config.overlay.handle_radius, &ctx.highlight_style());
        draw_label(
            surface,
            readout.at,
            &format!("[{x}, {y}, {z}] = {}", readout.sample.value),
            ctx,
        );
    }

    fn clear(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::config::ViewerConfig;
    use crate::enums::{Plane, VoxelFormat};
    use crate::palette::PaletteTable;
    use crate::raster::SliceSampler;
    use crate::transform::{SliceGeometry, ViewportSpec};
    use crate::volume::{BoxSize, Extent3, Volume};

    fn ramp() -> Volume {
        let voxels: Vec<u8> = (0..10 * 10 * 2).map(|i| i as u8).collect();
        Volume::new(
            Extent3::new(10, 10, 2),
            BoxSize::new(10.0, 10.0, 2.0),
            VoxelFormat::Gray8,
            voxels,
        )
    }

    #[test]
    fn pick_reports_voxel_under_pointer() {
        let volume = ramp();
        let palette = PaletteTable::grayscale();
        let spec = ViewportSpec {
            width: 100,
            height: 100,
            plane: Plane::Transverse,
            slice_ratio: 1.0,
            zoom: 1.0,
        };
        let geometry = SliceGeometry::compute(&volume, &spec).unwrap();
        let config = ViewerConfig::default();
        let ctx = ToolContext::new(Plane::Transverse, ToolKind::Pick, &config)
            .with_sampler(Some(SliceSampler::new(&volume, &palette, geometry)));

        let mut tool = PickTool::default();
        tool.frame = frame();
        tool.on_mouse_down(Point::new(35.0, 72.0), &ctx);
        let readout = tool.last().unwrap();
        assert_eq!(readout.sample.voxel, (3, 7, 1));
        assert_eq!(readout.sample.value, 173);

        let mut surface = surface();
        tool.render(&mut surface, &ctx);
        assert_eq!(surface.text_runs()[0].text, "[3, 7, 1] = 173");
    }

    #[test]
    fn pick_outside_slice_or_without_volume_reports_nothing() {
        let config = ViewerConfig::default();
        let ctx = ToolContext::new(Plane::Transverse, ToolKind::Pick, &config);
        let mut tool = PickTool::default();
        tool.on_mouse_down(Point::new(5.0, 5.0), &ctx);
        assert!(tool.last().is_none());

        let mut surface = surface();
        tool.render(&mut surface, &ctx);
        assert!(is_blank(&surface));
    }
}
