/// Face tracking lifecycle
///
/// Turns per-frame detection results into graphic lifecycle events:
/// new face id -> create and add a graphic, known id -> publish the snapshot,
/// id missing from a frame -> blank the graphic, missing for too long ->
/// remove it from the overlay.
use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::detection::DetectionFrame;
use crate::graphic::OverlayGraphic;
use crate::overlay::GraphicOverlay;

struct TrackedGraphic {
    graphic: Arc<dyn OverlayGraphic>,
    missed: u32,
}

/// What one frame changed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameUpdate {
    pub created: usize,
    pub updated: usize,
    pub lost: usize,
    pub removed: usize,
}

pub struct FaceTracker {
    overlay: Arc<GraphicOverlay>,
    tracked: HashMap<u32, TrackedGraphic>,
    max_missed_frames: u32,
    debug_graphics: bool,
}

impl FaceTracker {
    pub fn new(overlay: Arc<GraphicOverlay>, max_missed_frames: u32) -> Self {
        Self {
            overlay,
            tracked: HashMap::new(),
            max_missed_frames,
            debug_graphics: false,
        }
    }

    /// Use the minimal debug graphic for faces created from now on
    pub fn with_debug_graphics(mut self, enabled: bool) -> Self {
        self.debug_graphics = enabled;
        self
    }

    pub fn process_frame(&mut self, frame: &DetectionFrame) -> FrameUpdate {
        let mut update = FrameUpdate::default();

        for face in &frame.faces {
            let snapshot = face.to_snapshot();
            match self.tracked.get_mut(&face.id) {
                Some(tracked) => {
                    tracked.missed = 0;
                    tracked.graphic.update_snapshot(snapshot);
                    update.updated += 1;
                }
                None => {
                    let graphic = self.create_graphic();
                    graphic.set_identity(face.id);
                    graphic.update_snapshot(snapshot);
                    self.overlay.add(Arc::clone(&graphic));
                    self.tracked.insert(face.id, TrackedGraphic { graphic, missed: 0 });
                    debug!("Tracking new face {}", face.id);
                    update.created += 1;
                }
            }
        }

        let mut expired = Vec::new();
        for (id, tracked) in self.tracked.iter_mut() {
            if frame.faces.iter().any(|face| face.id == *id) {
                continue;
            }
            tracked.missed += 1;
            if tracked.missed == 1 {
                tracked.graphic.clear_snapshot();
                update.lost += 1;
            }
            if tracked.missed > self.max_missed_frames {
                expired.push(*id);
            }
        }

        for id in expired {
            if let Some(tracked) = self.tracked.remove(&id) {
                self.overlay.remove(&tracked.graphic);
                debug!("Face {} gone for {} frames, removed", id, tracked.missed);
                update.removed += 1;
            }
        }

        update
    }

    /// Drop every tracked face, e.g. when the detection stream ends
    pub fn finish(&mut self) {
        for (_, tracked) in self.tracked.drain() {
            self.overlay.remove(&tracked.graphic);
        }
    }

    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    fn create_graphic(&self) -> Arc<dyn OverlayGraphic> {
        if self.debug_graphics {
            Arc::new(self.overlay.new_debug_graphic())
        } else {
            Arc::new(self.overlay.new_face_graphic())
        }
    }
}
