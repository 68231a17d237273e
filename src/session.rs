/// Replay session
///
/// Replays a recorded detection stream through the overlay: a producer thread
/// feeds the tracker at the detection rate while the calling thread repaints
/// at the render rate, only when a redraw was requested, and writes each
/// repaint to `frame_NNNNN.png`.
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use ab_glyph::FontVec;
use image::{Rgba, RgbaImage};
use log::{debug, info, warn};

use crate::config::DEFAULT_BACKGROUND;
use crate::decoration::Decoration;
use crate::detection::DetectionStream;
use crate::overlay::{CameraInfo, GraphicOverlay};
use crate::settings::OverlaySettings;
use crate::surface::{load_font, RasterSurface};
use crate::tracker::FaceTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    /// Detection frames handed to the tracker
    pub published_frames: usize,
    /// Repaints written to disk
    pub rendered_frames: usize,
    pub duration: Duration,
}

impl SessionReport {
    pub fn print_summary(&self) {
        info!("=== Replay Summary ===");
        info!("Duration: {:.2}s", self.duration.as_secs_f64());
        info!("Published frames: {}", self.published_frames);
        info!("Rendered frames: {}", self.rendered_frames);
        if self.published_frames > 0 {
            info!(
                "Repaints per detection frame: {:.2}",
                self.rendered_frames as f64 / self.published_frames as f64
            );
        }
    }
}

pub struct Session;

impl Session {
    pub fn run(
        stream: DetectionStream,
        settings: &OverlaySettings,
        output_dir: &Path,
    ) -> Result<SessionReport, String> {
        std::fs::create_dir_all(output_dir)
            .map_err(|e| format!("Failed to create output directory {}: {}", output_dir.display(), e))?;

        let decoration = match &settings.decoration_path {
            Some(path) => Decoration::load(path)?,
            None => Decoration::placeholder(),
        };
        let font = settings.font_path.as_deref().map(load_font).transpose()?;
        if font.is_none() && !settings.debug_graphics {
            warn!("No font configured, score labels will not be rasterized");
        }

        let camera = CameraInfo {
            facing: settings.camera_facing,
            preview_size: (stream.image_width, stream.image_height),
            view_size: (settings.view_width as f32, settings.view_height as f32),
            fit: settings.fit_mode,
        };
        let overlay = Arc::new(GraphicOverlay::new(camera, settings.style(), Arc::new(decoration)));
        let redraw = overlay.redraw_signal();

        let detect_interval = Duration::from_millis(settings.detect_interval_ms);
        let render_interval = Duration::from_millis(settings.render_interval_ms);
        let producer_done = Arc::new(AtomicBool::new(false));

        info!(
            "Replaying {} detection frames ({}ms detect, {}ms render) into {}",
            stream.frames.len(),
            settings.detect_interval_ms,
            settings.render_interval_ms,
            output_dir.display()
        );
        let start = Instant::now();

        let producer = {
            let mut tracker = FaceTracker::new(Arc::clone(&overlay), settings.max_missed_frames)
                .with_debug_graphics(settings.debug_graphics);
            let frames = stream.frames;
            spawn_producer(Arc::clone(&producer_done), move || {
                let mut published = 0;
                for frame in &frames {
                    let update = tracker.process_frame(frame);
                    published += 1;
                    debug!("Detection frame {}: {:?}", published, update);
                    thread::sleep(detect_interval);
                }
                tracker.finish();
                published
            })?
        };

        let mut rendered = 0;
        let render_result = loop {
            // Read before take(): requests made before the producer finished
            // are then guaranteed to be seen by this take()
            let finished = producer_done.load(Ordering::Acquire);
            if redraw.take() {
                let frame = render_frame(&overlay, settings, font.as_ref());
                let path = frame_path(output_dir, rendered);
                if let Err(e) = frame.save(&path) {
                    break Err(format!("Failed to write {}: {}", path.display(), e));
                }
                rendered += 1;
            } else if finished {
                break Ok(());
            }
            thread::sleep(render_interval);
        };

        let published = producer
            .join()
            .map_err(|_| "Detection replay thread panicked".to_string())?;
        render_result?;

        let report = SessionReport {
            published_frames: published,
            rendered_frames: rendered,
            duration: start.elapsed(),
        };
        report.print_summary();
        Ok(report)
    }
}

/// Marks the producer as done when dropped, including while unwinding
struct ProducerDone(Arc<AtomicBool>);

impl Drop for ProducerDone {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

fn spawn_producer<F>(done: Arc<AtomicBool>, work: F) -> Result<JoinHandle<usize>, String>
where
    F: FnOnce() -> usize + Send + 'static,
{
    thread::Builder::new()
        .name("detection-replay".to_string())
        .spawn(move || {
            let _done = ProducerDone(done);
            work()
        })
        .map_err(|e| format!("Failed to spawn detection replay thread: {}", e))
}

/// Paint the current overlay state onto a fresh view-sized frame
pub fn render_frame(overlay: &GraphicOverlay, settings: &OverlaySettings, font: Option<&FontVec>) -> RgbaImage {
    let mut surface = RasterSurface::new(settings.view_width, settings.view_height, Rgba(DEFAULT_BACKGROUND))
        .with_font(font);
    overlay.draw_all(&mut surface);
    surface.into_image()
}

pub fn frame_path(output_dir: &Path, index: usize) -> PathBuf {
    output_dir.join(format!("frame_{:05}.png", index))
}
