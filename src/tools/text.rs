use super::{Tool, ToolContext, ToolFrame, commit, draw_store};
use crate::annotation::{AnnotationStore, Point, Shape};
use crate::enums::ToolKind;
use crate::surface::RasterSurface;

/// Places free text labels at the pointer.
#[derive(Debug, Default)]
pub struct TextTool {
    frame: ToolFrame,
    text: String,
    store: AnnotationStore,
}

impl TextTool {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Text used for the next placed label.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Tool for TextTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Text
    }

    fn frame(&self) -> &ToolFrame {
        &self.frame
    }

    fn frame_mut(&mut self) -> &mut ToolFrame {
        &mut self.frame
    }

    fn on_mouse_down(&mut self, at: Point, _ctx: &ToolContext<'_>) {
        if self.text.trim().is_empty() {
            return;
        }
        let text = self.text.clone();
        commit(&mut self.store, &self.frame, Shape::Label { at, text });
    }

    fn render(&self, surface: &mut dyn RasterSurface, ctx: &ToolContext<'_>) {
        draw_store(surface, &self.store, &self.frame, ctx);
    }

    fn clear(&mut self) {
        self.store.clear();
    }

    fn annotations(&self) -> Option<&AnnotationStore> {
        Some(&self.store)
    }

    fn annotations_mut(&mut self) -> Option<&mut AnnotationStore> {
        Some(&mut self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::config::ViewerConfig;
    use crate::enums::Plane;

    #[test]
    fn label_is_drawn_at_click() {
        let config = ViewerConfig::default();
        let ctx = ToolContext::new(Plane::Sagittal, ToolKind::Text, &config);
        let mut tool = TextTool::new("lesion");
        tool.frame = frame();
        click(&mut tool, Point::new(12.0, 34.0), &ctx);

        let mut surface = surface();
        tool.render(&mut surface, &ctx);
        let runs = surface.text_runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "lesion");
        assert_eq!(runs[0].at, Point::new(12.0, 34.0));
    }

    #[test]
    fn blank_text_places_nothing() {
        let config = ViewerConfig::default();
        let ctx = ToolContext::new(Plane::Sagittal, ToolKind::Text, &config);
        let mut tool = TextTool::new("  ");
        click(&mut tool, Point::new(12.0, 34.0), &ctx);
        assert!(tool.store.is_empty());
        tool.set_text("ok");
        click(&mut tool, Point::new(12.0, 34.0), &ctx);
        assert_eq!(tool.store.len(), 1);
    }
}
