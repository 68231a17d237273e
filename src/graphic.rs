/// Per-face graphic rendering
///
/// One `FaceGraphic` exists per tracked face. The detection thread publishes
/// snapshots into it; the render loop asks it to draw. Every draw pass derives
/// a `FaceAnnotation` from the latest snapshot and issues it in a fixed order:
///
/// 1. center marker
/// 2. bounding box
/// 3. eye boxes (left, right), each only if that eye was detected
/// 4. mouth box, only if both corners and the bottom of the mouth were detected
/// 5. expression score label
/// 6. decoration, only while the score is above the threshold
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use image::Rgba;
use log::debug;

use crate::config::{
    DEFAULT_DECORATION_THRESHOLD, DEFAULT_EYE_EXTENT_RATIO, DEFAULT_LABEL_Y_OFFSET,
    DEFAULT_MARKER_RADIUS, DEFAULT_STROKE_WIDTH, DEFAULT_TEXT_SIZE,
};
use crate::decoration::Decoration;
use crate::detection::{DetectionSnapshot, Landmark, LandmarkType, Point};
use crate::overlay::RedrawSignal;
use crate::snapshot::{SnapshotCell, SnapshotSlot};
use crate::surface::{Surface, ViewRect};
use crate::transform::CoordinateTransform;

/// What the overlay container needs from a graphic
pub trait OverlayGraphic: Send + Sync {
    /// Replace the latest detection. Called from the detection thread.
    fn update_snapshot(&self, snapshot: DetectionSnapshot);

    /// The face was lost upstream; draw nothing until the next update
    fn clear_snapshot(&self);

    fn set_identity(&self, id: u32);

    fn identity(&self) -> u32;

    /// Issue this graphic's primitives. Called from the render loop.
    fn draw(&self, surface: &mut dyn Surface, transform: &dyn CoordinateTransform);
}

/// Fixed sizes and thresholds for face annotations (view-space pixels)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphicStyle {
    pub marker_radius: f32,
    pub stroke_width: f32,
    pub text_size: f32,
    /// Label baseline distance below the bounding box
    pub label_y_offset: f32,
    /// Eye box half-extent as a fraction of the detection-space face width
    pub eye_extent_ratio: f32,
    /// Decoration is drawn while the score is strictly above this
    pub decoration_threshold: f32,
}

impl Default for GraphicStyle {
    fn default() -> Self {
        Self {
            marker_radius: DEFAULT_MARKER_RADIUS,
            stroke_width: DEFAULT_STROKE_WIDTH,
            text_size: DEFAULT_TEXT_SIZE,
            label_y_offset: DEFAULT_LABEL_Y_OFFSET,
            eye_extent_ratio: DEFAULT_EYE_EXTENT_RATIO,
            decoration_threshold: DEFAULT_DECORATION_THRESHOLD,
        }
    }
}

const MAPPED_LANDMARKS: [LandmarkType; 5] = [
    LandmarkType::LeftEye,
    LandmarkType::RightEye,
    LandmarkType::LeftMouth,
    LandmarkType::RightMouth,
    LandmarkType::BottomMouth,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappedLandmark {
    pub detection: Point,
    pub view: Point,
}

/// Landmarks the annotations use, keyed by type, in both coordinate spaces.
/// Rebuilt on every draw pass.
#[derive(Debug, Default)]
pub struct LandmarkMap {
    entries: HashMap<LandmarkType, MappedLandmark>,
}

impl LandmarkMap {
    pub fn build(landmarks: &[Landmark], transform: &dyn CoordinateTransform) -> Self {
        let mut entries = HashMap::with_capacity(MAPPED_LANDMARKS.len());
        for landmark in landmarks {
            if !MAPPED_LANDMARKS.contains(&landmark.kind) {
                continue;
            }
            let view = Point::new(
                transform.to_view_x(landmark.position.x),
                transform.to_view_y(landmark.position.y),
            );
            entries.insert(landmark.kind, MappedLandmark { detection: landmark.position, view });
        }
        Self { entries }
    }

    pub fn get(&self, kind: LandmarkType) -> Option<&MappedLandmark> {
        self.entries.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything one draw pass paints for one face, in view space
#[derive(Debug, Clone, PartialEq)]
pub struct FaceAnnotation {
    pub center: Point,
    pub bounding_box: ViewRect,
    pub left_eye_box: Option<ViewRect>,
    pub right_eye_box: Option<ViewRect>,
    pub mouth_box: Option<ViewRect>,
    pub label: String,
    pub label_origin: Point,
    pub decoration: Option<ViewRect>,
}

impl FaceAnnotation {
    pub fn derive(
        snapshot: &DetectionSnapshot,
        transform: &dyn CoordinateTransform,
        style: &GraphicStyle,
    ) -> Self {
        let face_center = snapshot.center();
        let center = Point::new(
            transform.to_view_x(face_center.x),
            transform.to_view_y(face_center.y),
        );

        // Extents are scaled separately from the position: X and Y scale
        // factors may differ and the position may be mirrored.
        let x_offset = transform.scale_x(snapshot.width / 2.0);
        let y_offset = transform.scale_y(snapshot.height / 2.0);
        let bounding_box = ViewRect::centered(center, x_offset, y_offset);

        let landmarks = LandmarkMap::build(&snapshot.landmarks, transform);

        let eye_half = snapshot.width * style.eye_extent_ratio;
        let eye_box = |kind| {
            landmarks
                .get(kind)
                .map(|eye: &MappedLandmark| ViewRect::centered(eye.view, eye_half, eye_half))
        };
        let left_eye_box = eye_box(LandmarkType::LeftEye);
        let right_eye_box = eye_box(LandmarkType::RightEye);

        let mouth_box = Self::mouth_box(&landmarks);

        let label = format!("{:.2}", snapshot.expression_score);
        let label_origin = Point::new(
            bounding_box.left,
            bounding_box.bottom + style.label_y_offset,
        );

        let decoration = if snapshot.expression_score > style.decoration_threshold {
            // Square, spanning the box horizontally, its bottom a quarter face
            // height above the face center
            let bottom = center.y - transform.scale_y(snapshot.height / 4.0);
            let side = bounding_box.right - bounding_box.left;
            Some(ViewRect::new(bounding_box.left, bottom - side, bounding_box.right, bottom))
        } else {
            None
        };

        Self {
            center,
            bounding_box,
            left_eye_box,
            right_eye_box,
            mouth_box,
            label,
            label_origin,
            decoration,
        }
    }

    fn mouth_box(landmarks: &LandmarkMap) -> Option<ViewRect> {
        let left = landmarks.get(LandmarkType::LeftMouth)?;
        let right = landmarks.get(LandmarkType::RightMouth)?;
        let bottom = landmarks.get(LandmarkType::BottomMouth)?;

        // The lower of the two corners in the detection frame bounds the top
        let top = if left.detection.y >= right.detection.y { left } else { right };

        Some(ViewRect::new(left.view.x, top.view.y, right.view.x, bottom.view.y))
    }

    /// Number of primitives `render` will issue
    pub fn primitive_count(&self) -> usize {
        3 + [self.left_eye_box, self.right_eye_box, self.mouth_box, self.decoration]
            .iter()
            .filter(|r| r.is_some())
            .count()
    }

    pub fn render(
        &self,
        surface: &mut dyn Surface,
        color: Rgba<u8>,
        style: &GraphicStyle,
        decoration: &Decoration,
    ) {
        surface.fill_circle(self.center, style.marker_radius, color);
        surface.stroke_rect(self.bounding_box, style.stroke_width, color);

        for eye in [self.left_eye_box, self.right_eye_box].into_iter().flatten() {
            surface.stroke_rect(eye, style.stroke_width, color);
        }

        if let Some(mouth) = self.mouth_box {
            surface.stroke_rect(mouth, style.stroke_width, color);
        }

        surface.draw_text(&self.label, self.label_origin, style.text_size, color);

        if let Some(dest) = self.decoration {
            surface.draw_image(decoration, dest);
        }
    }
}

/// Annotates one tracked face
pub struct FaceGraphic {
    identity: AtomicU32,
    color: Rgba<u8>,
    style: GraphicStyle,
    snapshot: SnapshotCell,
    decoration: Arc<Decoration>,
    redraw: Arc<RedrawSignal>,
}

impl FaceGraphic {
    pub fn new(
        redraw: Arc<RedrawSignal>,
        decoration: Arc<Decoration>,
        color: Rgba<u8>,
        style: GraphicStyle,
    ) -> Self {
        debug!("Creating face graphic with color {:?}", color.0);
        Self {
            identity: AtomicU32::new(0),
            color,
            style,
            snapshot: SnapshotCell::new(),
            decoration,
            redraw,
        }
    }

    pub fn color(&self) -> Rgba<u8> {
        self.color
    }

    pub fn style(&self) -> &GraphicStyle {
        &self.style
    }

    /// Derive what the next draw pass would paint, if anything
    pub fn annotation(&self, transform: &dyn CoordinateTransform) -> Option<FaceAnnotation> {
        match self.snapshot.load() {
            SnapshotSlot::Absent => None,
            SnapshotSlot::Present(snapshot) => {
                Some(FaceAnnotation::derive(&snapshot, transform, &self.style))
            }
        }
    }
}

impl OverlayGraphic for FaceGraphic {
    fn update_snapshot(&self, snapshot: DetectionSnapshot) {
        self.snapshot.publish(snapshot);
        self.redraw.request();
    }

    fn clear_snapshot(&self) {
        self.snapshot.clear();
        self.redraw.request();
    }

    fn set_identity(&self, id: u32) {
        self.identity.store(id, Ordering::Relaxed);
    }

    fn identity(&self) -> u32 {
        self.identity.load(Ordering::Relaxed)
    }

    fn draw(&self, surface: &mut dyn Surface, transform: &dyn CoordinateTransform) {
        let Some(annotation) = self.annotation(transform) else {
            return;
        };
        annotation.render(surface, self.color, &self.style, &self.decoration);
    }
}

/// Minimal graphic for debugging the tracking itself: center marker,
/// bounding box and the face id instead of the score
pub struct DebugGraphic {
    identity: AtomicU32,
    color: Rgba<u8>,
    style: GraphicStyle,
    snapshot: SnapshotCell,
    redraw: Arc<RedrawSignal>,
}

impl DebugGraphic {
    pub fn new(redraw: Arc<RedrawSignal>, color: Rgba<u8>, style: GraphicStyle) -> Self {
        Self {
            identity: AtomicU32::new(0),
            color,
            style,
            snapshot: SnapshotCell::new(),
            redraw,
        }
    }
}

impl OverlayGraphic for DebugGraphic {
    fn update_snapshot(&self, snapshot: DetectionSnapshot) {
        self.snapshot.publish(snapshot);
        self.redraw.request();
    }

    fn clear_snapshot(&self) {
        self.snapshot.clear();
        self.redraw.request();
    }

    fn set_identity(&self, id: u32) {
        self.identity.store(id, Ordering::Relaxed);
    }

    fn identity(&self) -> u32 {
        self.identity.load(Ordering::Relaxed)
    }

    fn draw(&self, surface: &mut dyn Surface, transform: &dyn CoordinateTransform) {
        let SnapshotSlot::Present(snapshot) = self.snapshot.load() else {
            return;
        };
        let annotation = FaceAnnotation::derive(&snapshot, transform, &self.style);
        surface.fill_circle(annotation.center, self.style.marker_radius, self.color);
        surface.stroke_rect(annotation.bounding_box, self.style.stroke_width, self.color);
        surface.draw_text(
            &format!("id: {}", self.identity()),
            annotation.label_origin,
            self.style.text_size,
            self.color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PALETTE;
    use crate::surface::{DisplayList, Primitive};
    use crate::transform::{CameraFacing, FitMode, PreviewTransform};
    use proptest::prelude::*;
    use std::sync::Barrier;

    fn identity_transform() -> PreviewTransform {
        PreviewTransform::new(CameraFacing::Back, (640, 480), (640.0, 480.0), FitMode::Stretch)
    }

    fn graphic() -> (FaceGraphic, Arc<RedrawSignal>) {
        let redraw = Arc::new(RedrawSignal::new());
        let graphic = FaceGraphic::new(
            Arc::clone(&redraw),
            Arc::new(Decoration::placeholder()),
            PALETTE[1],
            GraphicStyle::default(),
        );
        (graphic, redraw)
    }

    fn face(score: f32) -> DetectionSnapshot {
        DetectionSnapshot::new(Point::new(100.0, 100.0), 200.0, 100.0, score)
    }

    fn draw(graphic: &dyn OverlayGraphic, transform: &dyn CoordinateTransform) -> Vec<Primitive> {
        let mut list = DisplayList::new();
        graphic.draw(&mut list, transform);
        list.into_primitives()
    }

    fn rects(primitives: &[Primitive]) -> Vec<ViewRect> {
        primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Rect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_absent_snapshot_draws_nothing() {
        let (graphic, redraw) = graphic();
        assert!(draw(&graphic, &identity_transform()).is_empty());
        assert!(!redraw.take());

        graphic.update_snapshot(face(0.9));
        graphic.clear_snapshot();
        assert!(draw(&graphic, &identity_transform()).is_empty());
        assert!(redraw.take());
    }

    #[test]
    fn test_no_landmarks_draw_order() {
        let (graphic, _) = graphic();
        graphic.update_snapshot(face(0.2));
        let primitives = draw(&graphic, &identity_transform());

        assert_eq!(primitives.len(), 3);
        assert_eq!(
            primitives[0],
            Primitive::Circle { center: Point::new(200.0, 150.0), radius: 10.0, color: PALETTE[1] }
        );
        assert_eq!(
            primitives[1],
            Primitive::Rect {
                rect: ViewRect::new(100.0, 100.0, 300.0, 200.0),
                stroke_width: 5.0,
                color: PALETTE[1],
            }
        );
        assert_eq!(
            primitives[2],
            Primitive::Text {
                text: "0.20".to_string(),
                origin: Point::new(100.0, 250.0),
                size: 40.0,
                color: PALETTE[1],
            }
        );
    }

    #[test]
    fn test_single_eye_draws_one_eye_box() {
        let (graphic, _) = graphic();
        graphic.update_snapshot(
            face(0.0).with_landmarks(vec![Landmark::new(LandmarkType::RightEye, 250.0, 130.0)]),
        );
        let primitives = draw(&graphic, &identity_transform());
        let rects = rects(&primitives);

        assert_eq!(rects.len(), 2);
        // Half-extent is a fifth of the detection-space width
        assert_eq!(rects[1], ViewRect::new(210.0, 90.0, 290.0, 170.0));
    }

    #[test]
    fn test_eye_extent_ignores_transform_scale() {
        let transform = PreviewTransform::new(CameraFacing::Back, (640, 480), (1280.0, 960.0), FitMode::Stretch);
        let snapshot = face(0.0).with_landmarks(vec![Landmark::new(LandmarkType::LeftEye, 150.0, 130.0)]);
        let annotation = FaceAnnotation::derive(&snapshot, &transform, &GraphicStyle::default());
        let eye = annotation.left_eye_box.unwrap();
        assert_eq!(eye.width(), 80.0);
        assert_eq!(eye.left, 300.0 - 40.0);
    }

    #[test]
    fn test_mouth_needs_all_three_points() {
        let mouth = [
            Landmark::new(LandmarkType::LeftMouth, 150.0, 170.0),
            Landmark::new(LandmarkType::RightMouth, 250.0, 172.0),
            Landmark::new(LandmarkType::BottomMouth, 200.0, 190.0),
        ];
        let transform = identity_transform();
        let style = GraphicStyle::default();

        for skip in 0..3 {
            let partial: Vec<_> = mouth.iter().enumerate().filter(|(i, _)| *i != skip).map(|(_, l)| *l).collect();
            let annotation = FaceAnnotation::derive(&face(0.0).with_landmarks(partial), &transform, &style);
            assert!(annotation.mouth_box.is_none());
        }

        let annotation = FaceAnnotation::derive(&face(0.0).with_landmarks(mouth.to_vec()), &transform, &style);
        assert_eq!(annotation.mouth_box, Some(ViewRect::new(150.0, 172.0, 250.0, 190.0)));
    }

    #[test]
    fn test_mouth_top_uses_lower_corner() {
        let transform = PreviewTransform::new(CameraFacing::Front, (640, 480), (1280.0, 720.0), FitMode::Stretch);
        let snapshot = face(0.0).with_landmarks(vec![
            Landmark::new(LandmarkType::LeftMouth, 150.0, 100.0),
            Landmark::new(LandmarkType::RightMouth, 250.0, 80.0),
            Landmark::new(LandmarkType::BottomMouth, 200.0, 120.0),
        ]);
        let annotation = FaceAnnotation::derive(&snapshot, &transform, &GraphicStyle::default());
        let mouth = annotation.mouth_box.unwrap();

        assert_eq!(mouth.top, transform.to_view_y(100.0));
        assert_eq!(mouth.top, transform.to_view_y(100.0).max(transform.to_view_y(80.0)));
        assert_eq!(mouth.left, transform.to_view_x(150.0));
        assert_eq!(mouth.right, transform.to_view_x(250.0));
        assert_eq!(mouth.bottom, transform.to_view_y(120.0));
    }

    #[test]
    fn test_unmapped_landmarks_are_ignored() {
        let landmarks = vec![
            Landmark::new(LandmarkType::NoseBase, 1.0, 1.0),
            Landmark::new(LandmarkType::Unknown, 2.0, 2.0),
            Landmark::new(LandmarkType::LeftEye, 3.0, 3.0),
        ];
        let map = LandmarkMap::build(&landmarks, &identity_transform());
        assert_eq!(map.len(), 1);
        assert!(map.get(LandmarkType::NoseBase).is_none());
        assert_eq!(map.get(LandmarkType::LeftEye).unwrap().view, Point::new(3.0, 3.0));
    }

    #[test]
    fn test_decoration_follows_current_score_only() {
        let (graphic, _) = graphic();
        let transform = identity_transform();

        graphic.update_snapshot(face(0.35));
        let shown = draw(&graphic, &transform);
        assert!(matches!(shown.last(), Some(Primitive::Image { .. })));

        graphic.update_snapshot(face(0.1));
        let hidden = draw(&graphic, &transform);
        assert!(!hidden.iter().any(|p| matches!(p, Primitive::Image { .. })));

        // Exactly at the threshold is not enough
        graphic.update_snapshot(face(0.3));
        assert!(!draw(&graphic, &transform).iter().any(|p| matches!(p, Primitive::Image { .. })));
    }

    #[test]
    fn test_decoration_is_square_above_center() {
        let transform = PreviewTransform::new(CameraFacing::Back, (640, 480), (1280.0, 720.0), FitMode::Stretch);
        let annotation = FaceAnnotation::derive(&face(0.9), &transform, &GraphicStyle::default());
        let dest = annotation.decoration.unwrap();
        let bbox = annotation.bounding_box;

        assert_eq!(dest.left, bbox.left);
        assert_eq!(dest.right, bbox.right);
        assert_eq!(dest.height(), bbox.width());
        assert_eq!(dest.bottom, annotation.center.y - transform.scale_y(25.0));
    }

    #[test]
    fn test_mirrored_bounding_box() {
        let back = PreviewTransform::new(CameraFacing::Back, (640, 480), (640.0, 480.0), FitMode::Stretch);
        let front = PreviewTransform::new(CameraFacing::Front, (640, 480), (640.0, 480.0), FitMode::Stretch);
        let style = GraphicStyle::default();

        let back_box = FaceAnnotation::derive(&face(0.0), &back, &style).bounding_box;
        let front_box = FaceAnnotation::derive(&face(0.0), &front, &style).bounding_box;

        assert_eq!(back_box.left, 100.0);
        assert_eq!(back_box.right, 300.0);
        // Mirroring swaps the edges around the view's vertical axis
        assert_eq!(front_box.left, 640.0 - back_box.right);
        assert_eq!(front_box.right, 640.0 - back_box.left);
        assert_eq!(front_box.top, back_box.top);
        assert_eq!(front_box.bottom, back_box.bottom);
    }

    #[test]
    fn test_identity_and_debug_graphic() {
        let redraw = Arc::new(RedrawSignal::new());
        let debug = DebugGraphic::new(Arc::clone(&redraw), PALETTE[2], GraphicStyle::default());
        debug.set_identity(7);
        debug.update_snapshot(face(0.9).with_landmarks(vec![Landmark::new(LandmarkType::LeftEye, 1.0, 1.0)]));

        let primitives = draw(&debug, &identity_transform());
        assert_eq!(primitives.len(), 3);
        assert!(matches!(&primitives[2], Primitive::Text { text, .. } if text == "id: 7"));
    }

    #[test]
    fn test_concurrent_publish_never_tears() {
        // Every field of snapshot k is a function of k, so a torn read
        // would produce an annotation matching no published snapshot.
        fn snapshot_for(k: u32) -> DetectionSnapshot {
            let k = k as f32;
            DetectionSnapshot::new(Point::new(10.0 + k, 20.0 + 2.0 * k), 50.0 + k, 40.0 + 3.0 * k, (k % 10.0) / 10.0)
                .with_landmarks(vec![
                    Landmark::new(LandmarkType::LeftEye, 15.0 + k, 25.0 + k),
                    Landmark::new(LandmarkType::LeftMouth, 20.0 + k, 40.0 + k),
                    Landmark::new(LandmarkType::RightMouth, 30.0 + k, 41.0 + k),
                    Landmark::new(LandmarkType::BottomMouth, 25.0 + k, 45.0 + k),
                ])
        }

        const PUBLISHES: u32 = 2000;
        let (graphic, _) = graphic();
        let graphic = Arc::new(graphic);
        let transform = PreviewTransform::new(CameraFacing::Front, (640, 480), (1280.0, 720.0), FitMode::Stretch);
        let style = GraphicStyle::default();
        let barrier = Arc::new(Barrier::new(2));

        let producer = {
            let graphic = Arc::clone(&graphic);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                for k in 0..PUBLISHES {
                    graphic.update_snapshot(snapshot_for(k));
                }
            })
        };

        barrier.wait();
        let mut draws = Vec::new();
        for _ in 0..PUBLISHES {
            let mut list = DisplayList::new();
            graphic.draw(&mut list, &transform);
            draws.push(list.into_primitives());
        }
        producer.join().unwrap();

        for primitives in draws.into_iter().filter(|p| !p.is_empty()) {
            let Primitive::Circle { center, .. } = primitives[0] else {
                panic!("first primitive must be the center marker");
            };
            // center.y = 1.5 * (40 + 3.5k) under this transform
            let k = ((center.y / 1.5 - 40.0) / 3.5).round() as u32;
            let expected = FaceAnnotation::derive(&snapshot_for(k), &transform, &style);

            let mut list = DisplayList::new();
            expected.render(&mut list, PALETTE[1], &style, &Decoration::placeholder());
            assert_eq!(primitives, list.into_primitives(), "draw mixed snapshots around k={}", k);
        }
    }

    fn arb_snapshot() -> impl Strategy<Value = DetectionSnapshot> {
        (0.0f32..500.0, 0.0f32..400.0, 1.0f32..300.0, 1.0f32..300.0, 0.0f32..1.0).prop_map(
            |(x, y, w, h, score)| DetectionSnapshot::new(Point::new(x, y), w, h, score),
        )
    }

    proptest! {
        #[test]
        fn prop_no_landmarks_only_core_shapes(snapshot in arb_snapshot(), front in any::<bool>()) {
            let facing = if front { CameraFacing::Front } else { CameraFacing::Back };
            let transform = PreviewTransform::new(facing, (640, 480), (1280.0, 720.0), FitMode::Stretch);
            let style = GraphicStyle::default();

            let annotation = FaceAnnotation::derive(&snapshot, &transform, &style);
            let mut list = DisplayList::new();
            annotation.render(&mut list, PALETTE[0], &style, &Decoration::placeholder());
            let primitives = list.into_primitives();

            let decorated = snapshot.expression_score > 0.3;
            prop_assert_eq!(primitives.len(), if decorated { 4 } else { 3 });
            prop_assert_eq!(primitives.len(), annotation.primitive_count());
            prop_assert!(matches!(primitives[0], Primitive::Circle { .. }), "center marker first");
            prop_assert!(matches!(primitives[1], Primitive::Rect { .. }), "bounding box second");
            prop_assert!(matches!(primitives[2], Primitive::Text { .. }), "label third");
            prop_assert_eq!(decorated, matches!(primitives.last(), Some(Primitive::Image { .. })));
        }

        #[test]
        fn prop_bounding_box_contains_center(snapshot in arb_snapshot()) {
            let transform = PreviewTransform::new(CameraFacing::Front, (640, 480), (800.0, 600.0), FitMode::Contain);
            let annotation = FaceAnnotation::derive(&snapshot, &transform, &GraphicStyle::default());
            let bbox = annotation.bounding_box;
            prop_assert!(bbox.left <= annotation.center.x && annotation.center.x <= bbox.right);
            prop_assert!(bbox.top <= annotation.center.y && annotation.center.y <= bbox.bottom);
        }
    }
}
