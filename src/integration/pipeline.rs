//! TrackerPipeline for combining detection, tracking, and lane counting.

use thiserror::Error;

use crate::tracker::{SortTracker, TrackError, TrackView, TrackerConfig};

use super::lane::{CrossingEvent, LaneAssigner, LaneCounter};
use super::DetectionSource;

/// Error from a pipeline frame: either the detector backend failed or the
/// tracker rejected the step.
#[derive(Debug, Error)]
pub enum PipelineError<E: std::error::Error + 'static> {
    #[error("detection failed")]
    Detector(#[source] E),
    #[error(transparent)]
    Tracker(#[from] TrackError),
}

/// End-to-end per-frame processing: detect → track → count.
///
/// Bundles any [`DetectionSource`] with a [`SortTracker`] and a
/// [`LaneCounter`], advancing the frame index once per processed frame.
/// The surrounding caller may pipeline decode/encode across frames as long
/// as `process_frame` calls stay sequential, which `&mut self` enforces.
pub struct TrackerPipeline<D: DetectionSource, A: LaneAssigner> {
    detector: D,
    tracker: SortTracker,
    counter: LaneCounter<A>,
    frame: u64,
}

impl<D: DetectionSource, A: LaneAssigner> TrackerPipeline<D, A>
where
    D::Error: std::error::Error + 'static,
{
    /// Create a new pipeline with the given collaborators.
    pub fn new(detector: D, config: TrackerConfig, assigner: A, frame_rate: f64) -> Self {
        Self {
            detector,
            tracker: SortTracker::new(config),
            counter: LaneCounter::new(assigner, frame_rate),
            frame: 0,
        }
    }

    /// Process a single frame: run detection on the image, update the
    /// tracker, and count lane entries among the visible tracks.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    ///
    /// # Returns
    /// The tracker's visible track list for this frame.
    pub fn process_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<TrackView>, PipelineError<D::Error>> {
        let detections = self
            .detector
            .detect(input, width, height)
            .map_err(PipelineError::Detector)?;

        self.frame += 1;
        let tracks = self.tracker.step(self.frame, &detections)?;
        self.counter.update(self.frame, &tracks);

        Ok(tracks)
    }

    /// Index of the last processed frame (0 before the first frame).
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// All crossing events recorded so far.
    pub fn events(&self) -> &[CrossingEvent] {
        self.counter.events()
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &SortTracker {
        &self.tracker
    }

    /// Get a mutable reference to the underlying tracker.
    pub fn tracker_mut(&mut self) -> &mut SortTracker {
        &mut self.tracker
    }

    /// Get a reference to the lane counter.
    pub fn counter(&self) -> &LaneCounter<A> {
        &self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::DetectionBuilder;
    use crate::tracker::Detection;

    struct MockDetector {
        frames: Vec<Vec<Detection>>,
        cursor: usize,
    }

    impl DetectionSource for MockDetector {
        type Error = std::convert::Infallible;

        fn detect(
            &mut self,
            _input: &[u8],
            _width: u32,
            _height: u32,
        ) -> Result<Vec<Detection>, Self::Error> {
            let dets = self.frames.get(self.cursor).cloned().unwrap_or_default();
            self.cursor += 1;
            Ok(dets)
        }
    }

    fn moving_car(frame: usize) -> Detection {
        DetectionBuilder::new()
            .tlwh(100.0 + 5.0 * frame as f32, 100.0, 50.0, 50.0)
            .class_id(2)
            .confidence(0.9)
            .build()
            .unwrap()
    }

    #[test]
    fn test_pipeline_tracks_and_counts() {
        let detector = MockDetector {
            frames: (0..6).map(|f| vec![moving_car(f)]).collect(),
            cursor: 0,
        };
        // one lane spanning the whole strip
        let assigner =
            |cx: f32, _cy: f32| -> Option<crate::integration::LaneId> {
                if cx < 640.0 { Some(1) } else { None }
            };
        let mut pipeline =
            TrackerPipeline::new(detector, TrackerConfig::default(), assigner, 25.0);

        let mut last = Vec::new();
        for _ in 0..6 {
            last = pipeline.process_frame(&[], 640, 480).unwrap();
        }

        assert_eq!(last.len(), 1);
        assert_eq!(pipeline.counter().counts()[&1], 1);
        assert_eq!(pipeline.events().len(), 1);
        // confirmed on the third consecutive match
        assert_eq!(pipeline.events()[0].frame, 3);
        assert_eq!(pipeline.events()[0].vehicle_id, last[0].id);
    }
}
