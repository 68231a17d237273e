use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use log::{debug, info, warn, error};

use crate::config::*;
use crate::graphic::GraphicStyle;
use crate::transform::{CameraFacing, FitMode};

/// User-specific settings that persist across sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlaySettings {
    /// Camera facing: "front" (mirrored preview) or "back"
    #[serde(default)]
    pub camera_facing: CameraFacing,

    /// How the camera frame is fitted into the view: "stretch" or "contain"
    #[serde(default)]
    pub fit_mode: FitMode,

    /// Output view width in pixels
    #[serde(default = "default_view_width")]
    pub view_width: u32,

    /// Output view height in pixels
    #[serde(default = "default_view_height")]
    pub view_height: u32,

    /// Delay between replayed detection frames
    #[serde(default = "default_detect_interval_ms")]
    pub detect_interval_ms: u64,

    /// Minimum delay between repaints
    #[serde(default = "default_render_interval_ms")]
    pub render_interval_ms: u64,

    /// Frames a face may be missing before its graphic is removed
    #[serde(default = "default_max_missed_frames")]
    pub max_missed_frames: u32,

    /// Draw only marker, box and id for each face
    #[serde(default)]
    pub debug_graphics: bool,

    /// Decoration image; a built-in placeholder is used when unset
    #[serde(default)]
    pub decoration_path: Option<PathBuf>,

    /// TTF/OTF font for score labels; labels are not rasterized when unset
    #[serde(default)]
    pub font_path: Option<PathBuf>,

    /// Smile probability above which the decoration is drawn
    #[serde(default = "default_decoration_threshold")]
    pub decoration_threshold: f32,

    #[serde(default = "default_marker_radius")]
    pub marker_radius: f32,

    #[serde(default = "default_stroke_width")]
    pub stroke_width: f32,

    #[serde(default = "default_text_size")]
    pub text_size: f32,
}

fn default_view_width() -> u32 {
    DEFAULT_VIEW_WIDTH
}

fn default_view_height() -> u32 {
    DEFAULT_VIEW_HEIGHT
}

fn default_detect_interval_ms() -> u64 {
    DEFAULT_DETECT_INTERVAL_MS
}

fn default_render_interval_ms() -> u64 {
    DEFAULT_RENDER_INTERVAL_MS
}

fn default_max_missed_frames() -> u32 {
    DEFAULT_MAX_MISSED_FRAMES
}

fn default_decoration_threshold() -> f32 {
    DEFAULT_DECORATION_THRESHOLD
}

fn default_marker_radius() -> f32 {
    DEFAULT_MARKER_RADIUS
}

fn default_stroke_width() -> f32 {
    DEFAULT_STROKE_WIDTH
}

fn default_text_size() -> f32 {
    DEFAULT_TEXT_SIZE
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            camera_facing: CameraFacing::default(),
            fit_mode: FitMode::default(),
            view_width: DEFAULT_VIEW_WIDTH,
            view_height: DEFAULT_VIEW_HEIGHT,
            detect_interval_ms: DEFAULT_DETECT_INTERVAL_MS,
            render_interval_ms: DEFAULT_RENDER_INTERVAL_MS,
            max_missed_frames: DEFAULT_MAX_MISSED_FRAMES,
            debug_graphics: false,
            decoration_path: None,
            font_path: None,
            decoration_threshold: DEFAULT_DECORATION_THRESHOLD,
            marker_radius: DEFAULT_MARKER_RADIUS,
            stroke_width: DEFAULT_STROKE_WIDTH,
            text_size: DEFAULT_TEXT_SIZE,
        }
    }
}

impl OverlaySettings {
    /// Get the path to the settings file
    /// On macOS: ~/Library/Application Support/FaceOverlay/settings.yaml
    /// On Linux: ~/.config/FaceOverlay/settings.yaml
    /// On Windows: C:\Users\<user>\AppData\Roaming\FaceOverlay\settings.yaml
    pub fn settings_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."));

        config_dir.join(SETTINGS_DIR_NAME).join("settings.yaml")
    }

    /// Load settings from the YAML file
    /// If custom_path is provided, uses that path; otherwise uses the default settings path
    pub fn load(custom_path: Option<&str>) -> Self {
        let path = match custom_path {
            Some(p) => {
                info!("Using custom settings path: {}", p);
                PathBuf::from(p)
            }
            None => Self::settings_path(),
        };

        if !path.exists() {
            info!("Settings file not found at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => {
                match Self::from_yaml(&contents) {
                    Ok(settings) => {
                        info!("Loaded settings from {:?}", path);
                        debug!("Settings: facing={:?}, fit={:?}, view={}x{}, debug_graphics={}",
                            settings.camera_facing, settings.fit_mode,
                            settings.view_width, settings.view_height, settings.debug_graphics);
                        settings
                    }
                    Err(e) => {
                        error!("Failed to parse settings file at {:?}: {}", path, e);
                        warn!("Using default settings");
                        Self::default()
                    }
                }
            }
            Err(e) => {
                error!("Failed to read settings file at {:?}: {}", path, e);
                warn!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn from_yaml(contents: &str) -> Result<Self, String> {
        serde_yaml::from_str::<OverlaySettings>(contents)
            .map_err(|e| format!("Invalid settings YAML: {}", e))
    }

    /// Save settings to `path` (default location when None) while preserving comments
    pub fn save(&self, path: Option<PathBuf>) -> Result<PathBuf, String> {
        let path = path.unwrap_or_else(Self::settings_path);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create settings directory: {}", e))?;
            }
        }

        // If file exists, try to preserve comments by doing in-place value updates
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(contents) => {
                    let updated = self.update_yaml_values(&contents);
                    fs::write(&path, updated)
                        .map_err(|e| format!("Failed to write settings file: {}", e))?;
                    info!("Saved settings to {:?} (comments preserved)", path);
                    return Ok(path);
                }
                Err(e) => {
                    warn!("Failed to read existing settings file for comment preservation: {}", e);
                }
            }
        }

        fs::write(&path, self.to_yaml_with_comments())
            .map_err(|e| format!("Failed to write settings file: {}", e))?;

        info!("Saved settings to {:?}", path);
        Ok(path)
    }

    pub fn style(&self) -> GraphicStyle {
        GraphicStyle {
            marker_radius: self.marker_radius,
            stroke_width: self.stroke_width,
            text_size: self.text_size,
            decoration_threshold: self.decoration_threshold,
            ..GraphicStyle::default()
        }
    }

    fn facing_str(&self) -> &'static str {
        match self.camera_facing {
            CameraFacing::Front => "front",
            CameraFacing::Back => "back",
        }
    }

    fn fit_str(&self) -> &'static str {
        match self.fit_mode {
            FitMode::Stretch => "stretch",
            FitMode::Contain => "contain",
        }
    }

    /// Single-quoted YAML scalar: backslashes stay literal, quotes are doubled
    fn optional_path(path: &Option<PathBuf>) -> String {
        match path {
            Some(p) => format!("'{}'", p.display().to_string().replace('\'', "''")),
            None => "null".to_string(),
        }
    }

    /// Update YAML values while preserving existing comments and structure
    fn update_yaml_values(&self, yaml_content: &str) -> String {
        let values = [
            ("camera_facing", format!("\"{}\"", self.facing_str())),
            ("fit_mode", format!("\"{}\"", self.fit_str())),
            ("view_width", self.view_width.to_string()),
            ("view_height", self.view_height.to_string()),
            ("detect_interval_ms", self.detect_interval_ms.to_string()),
            ("render_interval_ms", self.render_interval_ms.to_string()),
            ("max_missed_frames", self.max_missed_frames.to_string()),
            ("debug_graphics", self.debug_graphics.to_string()),
            ("decoration_path", Self::optional_path(&self.decoration_path)),
            ("font_path", Self::optional_path(&self.font_path)),
            ("decoration_threshold", self.decoration_threshold.to_string()),
            ("marker_radius", self.marker_radius.to_string()),
            ("stroke_width", self.stroke_width.to_string()),
            ("text_size", self.text_size.to_string()),
        ];

        values.iter().fold(yaml_content.to_string(), |mut yaml, (key, value)| {
            if Self::has_yaml_key(&yaml, key) {
                Self::replace_yaml_value(&yaml, key, value)
            } else {
                // Keys missing from an older file are appended
                if !yaml.is_empty() && !yaml.ends_with('\n') {
                    yaml.push('\n');
                }
                yaml.push_str(&format!("{}: {}\n", key, value));
                yaml
            }
        })
    }

    fn key_pattern(key: &str) -> String {
        format!(r"(?m)^(\s*{}\s*:\s*).*$", regex::escape(key))
    }

    fn has_yaml_key(yaml: &str, key: &str) -> bool {
        regex::Regex::new(&Self::key_pattern(key))
            .map(|re| re.is_match(yaml))
            .unwrap_or(false)
    }

    /// Replace a YAML key's value while preserving the rest of the file
    fn replace_yaml_value(yaml: &str, key: &str, new_value: &str) -> String {
        match regex::Regex::new(&Self::key_pattern(key)) {
            // The value is inserted literally; `$` in paths is not a group reference
            Ok(re) => re
                .replace_all(yaml, |caps: &regex::Captures| format!("{}{}", &caps[1], new_value))
                .to_string(),
            Err(e) => {
                warn!("Failed to create regex for key '{}': {}", key, e);
                yaml.to_string()
            }
        }
    }

    /// Generate YAML content with comments for new files
    fn to_yaml_with_comments(&self) -> String {
        format!(
            r#"# Face Overlay Settings
# Command line flags override the values in this file.

# Camera facing: "front" (preview is mirrored) or "back"
camera_facing: "{}"

# How camera frames are fitted into the view
# - "stretch": scale X and Y independently to fill the view
# - "contain": uniform scale, centered with letterboxing
fit_mode: "{}"

# Output view size in pixels
view_width: {}
view_height: {}

# Delay between replayed detection frames (ms)
detect_interval_ms: {}

# Minimum delay between repaints (ms); repaint requests in between are merged
render_interval_ms: {}

# Frames a face may be missing before its graphic is removed
max_missed_frames: {}

# Draw only the center marker, bounding box and face id
debug_graphics: {}

# Decoration image drawn above smiling faces (null = built-in placeholder)
decoration_path: {}

# Font used for score labels (null = labels are not rasterized)
font_path: {}

# Smile probability above which the decoration is drawn
decoration_threshold: {}

# Annotation sizes in view pixels
marker_radius: {}
stroke_width: {}
text_size: {}
"#,
            self.facing_str(),
            self.fit_str(),
            self.view_width,
            self.view_height,
            self.detect_interval_ms,
            self.render_interval_ms,
            self.max_missed_frames,
            self.debug_graphics,
            Self::optional_path(&self.decoration_path),
            Self::optional_path(&self.font_path),
            self.decoration_threshold,
            self.marker_radius,
            self.stroke_width,
            self.text_size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings = OverlaySettings::from_yaml("camera_facing: back\nview_width: 640\n").unwrap();
        assert_eq!(settings.camera_facing, CameraFacing::Back);
        assert_eq!(settings.view_width, 640);
        assert_eq!(settings.view_height, DEFAULT_VIEW_HEIGHT);
        assert_eq!(settings.decoration_threshold, 0.3);
        assert!(settings.decoration_path.is_none());
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(OverlaySettings::from_yaml("camera_facing: sideways\n").is_err());
    }

    #[test]
    fn test_load_nonexistent_falls_back() {
        let settings = OverlaySettings::load(Some("/definitely/not/here/settings.yaml"));
        assert_eq!(settings, OverlaySettings::default());
    }

    #[test]
    fn test_commented_yaml_parses_back() {
        let mut settings = OverlaySettings::default();
        settings.fit_mode = FitMode::Contain;
        settings.font_path = Some(PathBuf::from("/fonts/a.ttf"));
        let parsed = OverlaySettings::from_yaml(&settings.to_yaml_with_comments()).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_save_preserves_comments() {
        let path = std::env::temp_dir().join(format!("face_overlay_settings_{}.yaml", std::process::id()));
        let _ = fs::remove_file(&path);

        let mut settings = OverlaySettings::default();
        settings.save(Some(path.clone())).unwrap();

        settings.camera_facing = CameraFacing::Back;
        settings.max_missed_frames = 9;
        settings.save(Some(path.clone())).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# Face Overlay Settings"));
        assert_eq!(OverlaySettings::load(path.to_str()), settings);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_paths_with_special_characters_roundtrip() {
        let path = std::env::temp_dir().join(format!("face_overlay_settings_paths_{}.yaml", std::process::id()));
        let _ = fs::remove_file(&path);

        let mut settings = OverlaySettings::default();
        settings.font_path = Some(PathBuf::from(r"C:\Users\me\fonts\a.ttf"));
        settings.decoration_path = Some(PathBuf::from("/assets/it's ears$1.png"));

        let parsed = OverlaySettings::from_yaml(&settings.to_yaml_with_comments()).unwrap();
        assert_eq!(parsed, settings);

        // Second save goes through the in-place value replacement
        settings.save(Some(path.clone())).unwrap();
        settings.decoration_path = Some(PathBuf::from("/assets/ears$1${0}.png"));
        settings.save(Some(path.clone())).unwrap();
        assert_eq!(OverlaySettings::load(path.to_str()), settings);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_save_appends_missing_keys() {
        let path = std::env::temp_dir().join(format!("face_overlay_settings_minimal_{}.yaml", std::process::id()));
        fs::write(&path, "# mine\nview_width: 640").unwrap();

        let mut settings = OverlaySettings::load(path.to_str());
        settings.font_path = Some(PathBuf::from("/fonts/label.ttf"));
        settings.text_size = 22.0;
        settings.save(Some(path.clone())).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# mine\nview_width: 640\n"));
        assert_eq!(OverlaySettings::load(path.to_str()), settings);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_style_from_settings() {
        let mut settings = OverlaySettings::default();
        settings.stroke_width = 2.0;
        let style = settings.style();
        assert_eq!(style.stroke_width, 2.0);
        assert_eq!(style.eye_extent_ratio, DEFAULT_EYE_EXTENT_RATIO);
    }
}
