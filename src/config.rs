// Default values for configuration
// These serve as fallback values for missing settings and for "reset to defaults"

// Annotation style (view-space pixels)
pub const DEFAULT_MARKER_RADIUS: f32 = 10.0;
pub const DEFAULT_STROKE_WIDTH: f32 = 5.0;
pub const DEFAULT_TEXT_SIZE: f32 = 40.0;
pub const DEFAULT_LABEL_Y_OFFSET: f32 = 50.0;
pub const DEFAULT_EYE_EXTENT_RATIO: f32 = 1.0 / 5.0;
pub const DEFAULT_DECORATION_THRESHOLD: f32 = 0.3;

// Output view
pub const DEFAULT_VIEW_WIDTH: u32 = 1280;
pub const DEFAULT_VIEW_HEIGHT: u32 = 720;
pub const DEFAULT_BACKGROUND: [u8; 4] = [24, 24, 24, 255];

// Replay pacing
pub const DEFAULT_DETECT_INTERVAL_MS: u64 = 33;     // ~30 detection frames per second
pub const DEFAULT_RENDER_INTERVAL_MS: u64 = 50;     // 20 repaints per second at most
pub const DEFAULT_MAX_MISSED_FRAMES: u32 = 3;       // Frames a face may vanish before its graphic is dropped

pub const APP_NAME: &str = "face-overlay";
pub const SETTINGS_DIR_NAME: &str = "FaceOverlay";
