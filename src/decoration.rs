/// Decorative overlay image drawn above smiling faces
///
/// Loaded once at startup and shared by every graphic through an `Arc`.
use std::path::Path;
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_ellipse_mut;
use log::info;

const PLACEHOLDER_SIZE: u32 = 128;

#[derive(Debug, Clone)]
pub struct Decoration {
    image: RgbaImage,
}

impl Decoration {
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Load the decoration from an image file (PNG with alpha works best)
    pub fn load(path: &Path) -> Result<Self, String> {
        let image = image::open(path)
            .map_err(|e| format!("Failed to load decoration {}: {}", path.display(), e))?
            .to_rgba8();

        if image.width() == 0 || image.height() == 0 {
            return Err(format!("Decoration {} has zero dimensions", path.display()));
        }

        info!("Loaded decoration {} ({}x{})", path.display(), image.width(), image.height());
        Ok(Self { image })
    }

    /// Built-in pair of ears, used when no decoration file is configured
    pub fn placeholder() -> Self {
        let size = PLACEHOLDER_SIZE;
        let mut image = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 0]));

        let outer = Rgba([245, 245, 245, 255]);
        let inner = Rgba([255, 170, 190, 255]);
        let half = (size / 2) as i32;
        let ear_w = (size / 8) as i32;
        let ear_h = (size * 3 / 8) as i32;

        for cx in [half - size as i32 / 5, half + size as i32 / 5] {
            draw_filled_ellipse_mut(&mut image, (cx, half), ear_w, ear_h, outer);
            draw_filled_ellipse_mut(&mut image, (cx, half + ear_h / 6), ear_w / 2, ear_h * 2 / 3, inner);
        }

        Self { image }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}
