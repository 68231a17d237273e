/// Detection-space to view-space coordinate mapping
///
/// The renderer never hard-codes mirroring or scaling: it only goes through
/// `CoordinateTransform`. `PreviewTransform` is the camera-preview
/// implementation the overlay container hands out.
use serde::{Deserialize, Serialize};

pub trait CoordinateTransform {
    /// Map a detection-space X coordinate into view space
    fn to_view_x(&self, x: f32) -> f32;
    /// Map a detection-space Y coordinate into view space
    fn to_view_y(&self, y: f32) -> f32;
    /// Scale a horizontal detection-space extent into view space
    fn scale_x(&self, extent: f32) -> f32;
    /// Scale a vertical detection-space extent into view space
    fn scale_y(&self, extent: f32) -> f32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    /// Selfie camera; the preview is shown mirrored
    #[default]
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Scale each axis independently to fill the view
    #[default]
    Stretch,
    /// Uniform scale, centered with letterboxing
    Contain,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewTransform {
    pub facing: CameraFacing,
    pub width_scale: f32,
    pub height_scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub view_width: f32,
}

impl PreviewTransform {
    /// Build the transform for a camera preview of `preview_size` shown in a view of `view_size`
    pub fn new(
        facing: CameraFacing,
        preview_size: (u32, u32),
        view_size: (f32, f32),
        fit: FitMode,
    ) -> Self {
        let (preview_width, preview_height) = preview_size;
        let (view_width, view_height) = view_size;

        if preview_width == 0 || preview_height == 0 {
            // No camera info yet: identity scale
            return Self {
                facing,
                width_scale: 1.0,
                height_scale: 1.0,
                offset_x: 0.0,
                offset_y: 0.0,
                view_width,
            };
        }

        let width_ratio = view_width / preview_width as f32;
        let height_ratio = view_height / preview_height as f32;

        match fit {
            FitMode::Stretch => Self {
                facing,
                width_scale: width_ratio,
                height_scale: height_ratio,
                offset_x: 0.0,
                offset_y: 0.0,
                view_width,
            },
            FitMode::Contain => {
                let scale = width_ratio.min(height_ratio);
                let scaled_width = preview_width as f32 * scale;
                let scaled_height = preview_height as f32 * scale;
                Self {
                    facing,
                    width_scale: scale,
                    height_scale: scale,
                    offset_x: (view_width - scaled_width) / 2.0,
                    offset_y: (view_height - scaled_height) / 2.0,
                    view_width,
                }
            }
        }
    }

    pub fn is_mirrored(&self) -> bool {
        self.facing == CameraFacing::Front
    }
}

impl CoordinateTransform for PreviewTransform {
    fn to_view_x(&self, x: f32) -> f32 {
        let scaled = self.scale_x(x) + self.offset_x;
        match self.facing {
            CameraFacing::Front => self.view_width - scaled,
            CameraFacing::Back => scaled,
        }
    }

    fn to_view_y(&self, y: f32) -> f32 {
        self.scale_y(y) + self.offset_y
    }

    fn scale_x(&self, extent: f32) -> f32 {
        extent * self.width_scale
    }

    fn scale_y(&self, extent: f32) -> f32 {
        extent * self.height_scale
    }
}
