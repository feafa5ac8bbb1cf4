//! Builder for creating Detection objects from various input formats.

use crate::tracker::{Detection, Rect, TrackError};

/// Builder for creating `Detection` objects from various input formats.
///
/// Validation happens once, in [`DetectionBuilder::build`]: a degenerate box
/// or an out-of-range confidence yields [`TrackError::InvalidDetection`].
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    class_id: Option<u32>,
    confidence: Option<f32>,
}

impl DetectionBuilder {
    /// Create a new detection builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.x1 = x1;
        self.y1 = y1;
        self.x2 = x2;
        self.y2 = y2;
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.x1 = cx - w / 2.0;
        self.y1 = cy - h / 2.0;
        self.x2 = cx + w / 2.0;
        self.y2 = cy + h / 2.0;
        self
    }

    /// Set bounding box in TLWH format (top-left x, top-left y, width, height).
    pub fn tlwh(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.x1 = x;
        self.y1 = y;
        self.x2 = x + w;
        self.y2 = y + h;
        self
    }

    /// Set the detector class id.
    pub fn class_id(mut self, class_id: u32) -> Self {
        self.class_id = Some(class_id);
        self
    }

    /// Set the confidence score (must be in [0, 1]).
    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Validate and build the final `Detection`.
    pub fn build(self) -> Result<Detection, TrackError> {
        Detection::with_meta(
            Rect::from_tlbr(self.x1, self.y1, self.x2, self.y2),
            self.class_id,
            self.confidence,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_builder() {
        let det = DetectionBuilder::new()
            .tlbr(10.0, 20.0, 50.0, 80.0)
            .class_id(2)
            .confidence(0.95)
            .build()
            .unwrap();

        assert_eq!(det.confidence, Some(0.95));
        assert_eq!(det.class_id, Some(2));
        assert_eq!(det.rect.to_tlwh(), [10.0, 20.0, 40.0, 60.0]);
    }

    #[test]
    fn test_formats_agree() {
        let a = DetectionBuilder::new().tlwh(10.0, 20.0, 40.0, 60.0).build().unwrap();
        let b = DetectionBuilder::new().xywh(30.0, 50.0, 40.0, 60.0).build().unwrap();
        assert_eq!(a.rect, b.rect);
    }

    #[test]
    fn test_degenerate_box_rejected() {
        let err = DetectionBuilder::new().tlbr(50.0, 20.0, 10.0, 80.0).build();
        assert!(matches!(err, Err(TrackError::InvalidDetection { .. })));
    }

    #[test]
    fn test_bad_confidence_rejected() {
        let err = DetectionBuilder::new()
            .tlbr(10.0, 20.0, 50.0, 80.0)
            .confidence(1.2)
            .build();
        assert!(err.is_err());
    }
}
