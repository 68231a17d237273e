/// Drawing surfaces the overlay paints onto
///
/// `Surface` is the only drawing capability a graphic sees. Two surfaces are
/// provided:
/// - `DisplayList` records primitives in order (tests, diagnostics)
/// - `RasterSurface` paints into an RGBA frame with imageproc
use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use log::{debug, info};

use crate::decoration::Decoration;
use crate::detection::Point;

/// Axis-aligned rectangle in view space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl ViewRect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Rectangle of the given half extents centered on `center`
    pub fn centered(center: Point, half_width: f32, half_height: f32) -> Self {
        Self::new(
            center.x - half_width,
            center.y - half_height,
            center.x + half_width,
            center.y + half_height,
        )
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Same rectangle with left <= right and top <= bottom
    pub fn normalized(&self) -> Self {
        Self::new(
            self.left.min(self.right),
            self.top.min(self.bottom),
            self.left.max(self.right),
            self.top.max(self.bottom),
        )
    }
}

pub trait Surface {
    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba<u8>);
    fn stroke_rect(&mut self, rect: ViewRect, stroke_width: f32, color: Rgba<u8>);
    /// `origin` is the left end of the text baseline
    fn draw_text(&mut self, text: &str, origin: Point, size: f32, color: Rgba<u8>);
    fn draw_image(&mut self, image: &Decoration, dest: ViewRect);
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Circle { center: Point, radius: f32, color: Rgba<u8> },
    Rect { rect: ViewRect, stroke_width: f32, color: Rgba<u8> },
    Text { text: String, origin: Point, size: f32, color: Rgba<u8> },
    Image { dest: ViewRect, source_size: (u32, u32) },
}

/// Records every drawing call in issue order
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    primitives: Vec<Primitive>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn into_primitives(self) -> Vec<Primitive> {
        self.primitives
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn clear(&mut self) {
        self.primitives.clear();
    }
}

impl Surface for DisplayList {
    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba<u8>) {
        self.primitives.push(Primitive::Circle { center, radius, color });
    }

    fn stroke_rect(&mut self, rect: ViewRect, stroke_width: f32, color: Rgba<u8>) {
        self.primitives.push(Primitive::Rect { rect, stroke_width, color });
    }

    fn draw_text(&mut self, text: &str, origin: Point, size: f32, color: Rgba<u8>) {
        self.primitives.push(Primitive::Text {
            text: text.to_string(),
            origin,
            size,
            color,
        });
    }

    fn draw_image(&mut self, image: &Decoration, dest: ViewRect) {
        self.primitives.push(Primitive::Image {
            dest,
            source_size: image.dimensions(),
        });
    }
}

/// Load a TrueType/OpenType font for raster text
pub fn load_font(path: &Path) -> Result<FontVec, String> {
    let bytes = std::fs::read(path)
        .map_err(|e| format!("Failed to read font {}: {}", path.display(), e))?;
    let font = FontVec::try_from_vec(bytes)
        .map_err(|e| format!("Failed to parse font {}: {}", path.display(), e))?;
    info!("Loaded font {}", path.display());
    Ok(font)
}

/// Paints into an RGBA frame. Everything is clipped to the frame bounds.
pub struct RasterSurface<'f> {
    image: RgbaImage,
    font: Option<&'f FontVec>,
}

impl<'f> RasterSurface<'f> {
    pub fn new(width: u32, height: u32, background: Rgba<u8>) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, background),
            font: None,
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image, font: None }
    }

    /// Without a font, text primitives are skipped
    pub fn with_font(mut self, font: Option<&'f FontVec>) -> Self {
        self.font = font;
        self
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

impl Surface for RasterSurface<'_> {
    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba<u8>) {
        draw_filled_circle_mut(
            &mut self.image,
            (center.x.round() as i32, center.y.round() as i32),
            radius.round().max(1.0) as i32,
            color,
        );
    }

    fn stroke_rect(&mut self, rect: ViewRect, stroke_width: f32, color: Rgba<u8>) {
        let rect = rect.normalized();
        let left = rect.left.round() as i32;
        let top = rect.top.round() as i32;
        let width = rect.width().round() as i32;
        let height = rect.height().round() as i32;

        // Stroke is centered on the rectangle outline
        let thickness = stroke_width.round().max(1.0) as i32;
        let outset = thickness / 2;
        for t in -outset..(thickness - outset) {
            let w = width - 2 * t;
            let h = height - 2 * t;
            if w <= 0 || h <= 0 {
                continue;
            }
            let ring = Rect::at(left + t, top + t).of_size(w as u32, h as u32);
            draw_hollow_rect_mut(&mut self.image, ring, color);
        }
    }

    fn draw_text(&mut self, text: &str, origin: Point, size: f32, color: Rgba<u8>) {
        let Some(font) = self.font else {
            return;
        };
        let top = origin.y - size;
        draw_text_mut(
            &mut self.image,
            color,
            origin.x.round() as i32,
            top.round() as i32,
            PxScale::from(size),
            font,
            text,
        );
    }

    fn draw_image(&mut self, image: &Decoration, dest: ViewRect) {
        let dest = dest.normalized();
        if dest.width().round() < 1.0 || dest.height().round() < 1.0 {
            debug!("Skipping degenerate decoration rect {:?}", dest);
            return;
        }

        // Only the part of the destination inside the frame is resampled
        let (frame_w, frame_h) = self.image.dimensions();
        let visible = ViewRect::new(
            dest.left.max(0.0).round(),
            dest.top.max(0.0).round(),
            dest.right.min(frame_w as f32).round(),
            dest.bottom.min(frame_h as f32).round(),
        );
        if visible.width() < 1.0 || visible.height() < 1.0 {
            return;
        }

        // Matching region of the source image
        let source = image.image();
        let (src_w, src_h) = source.dimensions();
        if src_w == 0 || src_h == 0 {
            return;
        }
        let scale_x = src_w as f32 / dest.width();
        let scale_y = src_h as f32 / dest.height();
        let sx0 = (((visible.left - dest.left) * scale_x).floor() as u32).min(src_w - 1);
        let sy0 = (((visible.top - dest.top) * scale_y).floor() as u32).min(src_h - 1);
        let sx1 = (((visible.right - dest.left) * scale_x).ceil() as u32).clamp(sx0 + 1, src_w);
        let sy1 = (((visible.bottom - dest.top) * scale_y).ceil() as u32).clamp(sy0 + 1, src_h);

        let region = imageops::crop_imm(source, sx0, sy0, sx1 - sx0, sy1 - sy0).to_image();
        let scaled = imageops::resize(
            &region,
            visible.width() as u32,
            visible.height() as u32,
            FilterType::Triangle,
        );
        imageops::overlay(&mut self.image, &scaled, visible.left as i64, visible.top as i64);
    }
}
