/// Detection-space data model
///
/// Snapshots of one tracked face as reported by the detection stage, plus the
/// recorded stream format the replay session reads. All coordinates here are
/// in detection space (the pixel grid of the analysed camera frame).
use std::collections::HashSet;
use std::path::Path;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Face landmark vocabulary reported by the detector.
///
/// Types the detector may add later deserialize to `Unknown` and are ignored
/// by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkType {
    BottomMouth,
    LeftCheek,
    LeftEar,
    LeftEarTip,
    LeftEye,
    LeftMouth,
    NoseBase,
    RightCheek,
    RightEar,
    RightEarTip,
    RightEye,
    RightMouth,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Landmark {
    #[serde(rename = "type")]
    pub kind: LandmarkType,
    #[serde(flatten)]
    pub position: Point,
}

impl Landmark {
    pub fn new(kind: LandmarkType, x: f32, y: f32) -> Self {
        Self { kind, position: Point::new(x, y) }
    }
}

/// One frame's detection result for one tracked face.
///
/// Never edited after construction: a new frame produces a new snapshot that
/// replaces the old one wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionSnapshot {
    /// Top-left corner of the face box
    pub position: Point,
    pub width: f32,
    pub height: f32,
    pub landmarks: Vec<Landmark>,
    /// Smile probability, nominally in [0, 1]
    pub expression_score: f32,
}

impl DetectionSnapshot {
    pub fn new(position: Point, width: f32, height: f32, expression_score: f32) -> Self {
        Self {
            position,
            width,
            height,
            landmarks: Vec::new(),
            expression_score,
        }
    }

    pub fn with_landmarks(mut self, landmarks: Vec<Landmark>) -> Self {
        self.landmarks = landmarks;
        self
    }

    /// Center of the face box in detection space
    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.width / 2.0,
            self.position.y + self.height / 2.0,
        )
    }
}

/// A face as it appears in a recorded detection stream
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackedFace {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub smiling_probability: f32,
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
}

impl TrackedFace {
    pub fn to_snapshot(&self) -> DetectionSnapshot {
        DetectionSnapshot::new(
            Point::new(self.x, self.y),
            self.width,
            self.height,
            self.smiling_probability,
        )
        .with_landmarks(self.landmarks.clone())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DetectionFrame {
    #[serde(default)]
    pub faces: Vec<TrackedFace>,
}

/// A recorded sequence of detection frames
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectionStream {
    /// Size of the analysed camera frames (detection space)
    pub image_width: u32,
    pub image_height: u32,
    pub frames: Vec<DetectionFrame>,
}

impl DetectionStream {
    /// Parse a detection stream from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read detection stream {}: {}", path.display(), e))?;

        Self::from_json(&content)
    }

    /// Parse a detection stream from a JSON string
    pub fn from_json(content: &str) -> Result<Self, String> {
        serde_json::from_str(content)
            .map_err(|e| format!("Failed to parse detection stream JSON: {}", e))
    }

    /// Drop faces the renderer cannot draw sensibly and duplicate ids within a frame.
    /// Returns number of skipped faces and warnings
    pub fn validate_and_clean(&mut self) -> (usize, Vec<String>) {
        let mut warnings = Vec::new();

        if self.image_width == 0 || self.image_height == 0 {
            warnings.push(format!(
                "Detection stream has degenerate image size {}x{}",
                self.image_width, self.image_height
            ));
        }

        let mut skipped = 0;
        for (index, frame) in self.frames.iter_mut().enumerate() {
            let mut seen = HashSet::new();
            let before = frame.faces.len();
            frame.faces.retain(|face| {
                if !(face.width > 0.0 && face.height > 0.0) {
                    warnings.push(format!(
                        "Frame {}: skipping face {} with non-positive size {}x{}",
                        index, face.id, face.width, face.height
                    ));
                    return false;
                }
                if !seen.insert(face.id) {
                    warnings.push(format!("Frame {}: skipping duplicate face id {}", index, face.id));
                    return false;
                }
                true
            });
            skipped += before - frame.faces.len();
        }

        (skipped, warnings)
    }
}
