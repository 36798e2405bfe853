use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use egui::{ColorImage, Context as EguiContext, TextureHandle, TextureOptions, Vec2};
use image::DynamicImage;

pub const ZOOM_STEPS: &[f32] = &[0.1, 0.25, 0.33, 0.5, 0.67, 0.75, 1.0, 1.5, 2.0, 3.0, 4.0];

/// The map image being annotated plus its GPU texture.
pub struct Picture {
    pub dynamic: DynamicImage,
    pub texture: Option<TextureHandle>,
    pub path: Option<PathBuf>,
}

impl Picture {
    pub fn open(path: &Path) -> Result<Self> {
        let dynamic =
            image::open(path).with_context(|| format!("cannot decode {}", path.display()))?;
        Ok(Self {
            dynamic,
            texture: None,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn from_dynamic(dynamic: DynamicImage) -> Self {
        Self {
            dynamic,
            texture: None,
            path: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.dynamic.width()
    }

    pub fn height(&self) -> u32 {
        self.dynamic.height()
    }

    pub fn size_vec2(&self) -> Vec2 {
        Vec2::new(self.width() as f32, self.height() as f32)
    }

    pub fn file_name(&self) -> Option<String> {
        self.path
            .as_ref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
    }

    pub fn ensure_texture(&mut self, ctx: &EguiContext) -> &TextureHandle {
        self.texture.get_or_insert_with(|| {
            let rgba = self.dynamic.to_rgba8();
            let size = [rgba.width() as usize, rgba.height() as usize];
            let color = ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
            ctx.load_texture("roi-map", color, TextureOptions::LINEAR)
        })
    }
}

/// Display zoom of the canvas. The image is always shown at its aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct View {
    pub zoom: f32,
    pub fit_pending: bool,
}

impl Default for View {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            fit_pending: true,
        }
    }
}

impl View {
    pub fn nearest_zoom_step(&self) -> usize {
        let mut best_idx = 0usize;
        let mut best_diff = f32::MAX;
        for (idx, step) in ZOOM_STEPS.iter().enumerate() {
            let diff = (self.zoom - step).abs();
            if diff < best_diff {
                best_diff = diff;
                best_idx = idx;
            }
        }
        best_idx
    }

    pub fn zoom_in(&mut self) {
        let idx = self.nearest_zoom_step();
        if idx + 1 < ZOOM_STEPS.len() {
            self.zoom = ZOOM_STEPS[idx + 1];
        }
    }

    pub fn zoom_out(&mut self) {
        let idx = self.nearest_zoom_step();
        if idx > 0 {
            self.zoom = ZOOM_STEPS[idx - 1];
        }
    }

    pub fn request_fit(&mut self) {
        self.fit_pending = true;
    }

    /// Largest zoom at which the whole image fits into `view_size`.
    pub fn fit(&mut self, image_size: Vec2, view_size: Vec2) {
        if image_size.x <= 0.0 || image_size.y <= 0.0 {
            return;
        }
        let width_scale = view_size.x / image_size.x;
        let height_scale = view_size.y / image_size.y;
        self.zoom = width_scale.min(height_scale).clamp(0.1, 4.0);
        self.fit_pending = false;
    }
}

#[cfg(test)]
mod tests {
    use egui::vec2;
    use image::DynamicImage;

    use super::{Picture, View};

    #[test]
    fn zoom_steps_move_to_neighbours() {
        let mut view = View::default();
        view.zoom_in();
        assert_eq!(view.zoom, 1.5);
        view.zoom = 0.9;
        view.zoom_out();
        assert_eq!(view.zoom, 0.75);
    }

    #[test]
    fn fit_keeps_whole_image_visible() {
        let mut view = View::default();
        view.fit(vec2(1600.0, 1200.0), vec2(800.0, 900.0));
        assert_eq!(view.zoom, 0.5);
        assert!(!view.fit_pending);
    }

    #[test]
    fn picture_reports_natural_size() {
        let picture = Picture::from_dynamic(DynamicImage::new_rgba8(800, 600));
        assert_eq!((picture.width(), picture.height()), (800, 600));
        assert_eq!(picture.file_name(), None);
    }
}
