/// Overlay container for per-face graphics
///
/// Owns the set of live graphics, the camera parameters the coordinate
/// transform is built from, and the palette colours are handed out from.
/// Composites every graphic onto one surface per repaint.
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, info};

use crate::decoration::Decoration;
use crate::graphic::{DebugGraphic, FaceGraphic, GraphicStyle, OverlayGraphic};
use crate::palette::PaletteAssigner;
use crate::surface::Surface;
use crate::transform::{CameraFacing, FitMode, PreviewTransform};

/// Coalescing repaint request flag.
///
/// Any number of `request()` calls between two `take()` calls result in a
/// single repaint.
#[derive(Debug, Default)]
pub struct RedrawSignal {
    pending: AtomicBool,
    requests: AtomicU64,
}

impl RedrawSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.pending.store(true, Ordering::Release);
    }

    /// Returns true if a repaint was requested since the last call
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Total number of requests ever made
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }
}

/// Camera and view parameters the coordinate transform depends on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraInfo {
    pub facing: CameraFacing,
    /// Size of the frames the detector analyses
    pub preview_size: (u32, u32),
    /// Size of the surface the overlay is painted on
    pub view_size: (f32, f32),
    pub fit: FitMode,
}

impl CameraInfo {
    pub fn transform(&self) -> PreviewTransform {
        PreviewTransform::new(self.facing, self.preview_size, self.view_size, self.fit)
    }
}

pub struct GraphicOverlay {
    graphics: Mutex<Vec<Arc<dyn OverlayGraphic>>>,
    camera: Mutex<CameraInfo>,
    palette: PaletteAssigner,
    style: GraphicStyle,
    decoration: Arc<Decoration>,
    redraw: Arc<RedrawSignal>,
}

impl GraphicOverlay {
    pub fn new(camera: CameraInfo, style: GraphicStyle, decoration: Arc<Decoration>) -> Self {
        info!(
            "Overlay: {:?} camera, preview {}x{}, view {}x{}, fit {:?}",
            camera.facing,
            camera.preview_size.0,
            camera.preview_size.1,
            camera.view_size.0,
            camera.view_size.1,
            camera.fit
        );
        Self {
            graphics: Mutex::new(Vec::new()),
            camera: Mutex::new(camera),
            palette: PaletteAssigner::new(),
            style,
            decoration,
            redraw: Arc::new(RedrawSignal::new()),
        }
    }

    /// A new face graphic wired to this overlay, with the next palette colour.
    /// Not drawn until passed to `add`.
    pub fn new_face_graphic(&self) -> FaceGraphic {
        FaceGraphic::new(
            Arc::clone(&self.redraw),
            Arc::clone(&self.decoration),
            self.palette.next_color(),
            self.style,
        )
    }

    pub fn new_debug_graphic(&self) -> DebugGraphic {
        DebugGraphic::new(Arc::clone(&self.redraw), self.palette.next_color(), self.style)
    }

    pub fn add(&self, graphic: Arc<dyn OverlayGraphic>) {
        self.lock_graphics().push(graphic);
        self.redraw.request();
    }

    /// Returns false if the graphic was not part of this overlay
    pub fn remove(&self, graphic: &Arc<dyn OverlayGraphic>) -> bool {
        let target = Arc::as_ptr(graphic) as *const u8;
        let removed = {
            let mut graphics = self.lock_graphics();
            let before = graphics.len();
            graphics.retain(|g| Arc::as_ptr(g) as *const u8 != target);
            before != graphics.len()
        };
        if removed {
            self.redraw.request();
        }
        removed
    }

    pub fn clear(&self) {
        self.lock_graphics().clear();
        self.redraw.request();
    }

    pub fn len(&self) -> usize {
        self.lock_graphics().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_graphics().is_empty()
    }

    pub fn set_camera_info(&self, camera: CameraInfo) {
        debug!("Camera info changed: {:?}", camera);
        *self.camera.lock().unwrap_or_else(PoisonError::into_inner) = camera;
        self.redraw.request();
    }

    pub fn camera_info(&self) -> CameraInfo {
        *self.camera.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn transform(&self) -> PreviewTransform {
        self.camera_info().transform()
    }

    pub fn redraw_signal(&self) -> Arc<RedrawSignal> {
        Arc::clone(&self.redraw)
    }

    /// Paint every graphic onto `surface`, in insertion order
    pub fn draw_all(&self, surface: &mut dyn Surface) {
        // Draw from a copy so publishers are never blocked by a repaint
        let graphics: Vec<_> = self.lock_graphics().clone();
        let transform = self.transform();
        for graphic in &graphics {
            graphic.draw(surface, &transform);
        }
    }

    fn lock_graphics(&self) -> std::sync::MutexGuard<'_, Vec<Arc<dyn OverlayGraphic>>> {
        self.graphics.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{DetectionSnapshot, Point};
    use crate::palette::PALETTE;
    use crate::surface::{DisplayList, Primitive};

    fn camera(facing: CameraFacing) -> CameraInfo {
        CameraInfo {
            facing,
            preview_size: (640, 480),
            view_size: (640.0, 480.0),
            fit: FitMode::Stretch,
        }
    }

    fn overlay() -> GraphicOverlay {
        GraphicOverlay::new(
            camera(CameraFacing::Back),
            GraphicStyle::default(),
            Arc::new(Decoration::placeholder()),
        )
    }

    fn face() -> DetectionSnapshot {
        DetectionSnapshot::new(Point::new(100.0, 100.0), 200.0, 100.0, 0.0)
    }

    #[test]
    fn test_redraw_requests_coalesce() {
        let signal = RedrawSignal::new();
        assert!(!signal.take());
        signal.request();
        signal.request();
        signal.request();
        assert!(signal.is_pending());
        assert!(signal.take());
        assert!(!signal.take());
        assert_eq!(signal.request_count(), 3);
    }

    #[test]
    fn test_graphics_get_round_robin_colors() {
        let overlay = overlay();
        for i in 0..10 {
            let graphic = overlay.new_face_graphic();
            assert_eq!(graphic.color(), PALETTE[(i + 1) % PALETTE.len()]);
        }
    }

    #[test]
    fn test_add_remove_and_draw_all() {
        let overlay = overlay();
        let signal = overlay.redraw_signal();

        let first: Arc<dyn OverlayGraphic> = Arc::new(overlay.new_face_graphic());
        let second: Arc<dyn OverlayGraphic> = Arc::new(overlay.new_face_graphic());
        overlay.add(Arc::clone(&first));
        overlay.add(Arc::clone(&second));
        assert_eq!(overlay.len(), 2);
        assert!(signal.take());

        // Only graphics with a snapshot draw anything
        second.update_snapshot(face());
        assert!(signal.take());
        let mut list = DisplayList::new();
        overlay.draw_all(&mut list);
        assert_eq!(list.len(), 3);
        assert!(matches!(list.primitives()[0], Primitive::Circle { color, .. } if color == PALETTE[2]));

        assert!(overlay.remove(&second));
        assert!(!overlay.remove(&second));
        assert!(signal.take());
        list.clear();
        overlay.draw_all(&mut list);
        assert!(list.is_empty());

        overlay.clear();
        assert!(overlay.is_empty());
    }

    #[test]
    fn test_camera_change_applies_on_next_draw() {
        let overlay = overlay();
        let graphic: Arc<dyn OverlayGraphic> = Arc::new(overlay.new_face_graphic());
        graphic.update_snapshot(face());
        overlay.add(Arc::clone(&graphic));

        let center_x = |overlay: &GraphicOverlay| {
            let mut list = DisplayList::new();
            overlay.draw_all(&mut list);
            match list.primitives()[0] {
                Primitive::Circle { center, .. } => center.x,
                _ => panic!("expected center marker"),
            }
        };

        assert_eq!(center_x(&overlay), 200.0);
        overlay.set_camera_info(camera(CameraFacing::Front));
        assert!(overlay.redraw_signal().take());
        assert_eq!(center_x(&overlay), 440.0);
    }
}
