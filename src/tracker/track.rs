//! Single vehicle track: one object's kinematic estimate plus lifecycle
//! bookkeeping.

use ndarray::{Array1, Array2};

use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::matching::Detection;
use crate::tracker::rect::Rect;
use crate::tracker::track_state::TrackState;

/// A persistent estimated trajectory with a stable identity.
///
/// The kinematic estimate (mean/covariance) is only ever mutated by the
/// predict/update pair; the stored lifecycle is Tentative → Confirmed →
/// Removed, with coasting expressed through `time_since_update`.
#[derive(Debug, Clone)]
pub struct Track {
    id: u64,
    state: TrackState,
    hits: u32,
    age: u32,
    time_since_update: u32,
    /// Kalman state mean: (cx, cy, w, h, vcx, vcy, vw, vh)
    mean: Array1<f64>,
    /// Kalman state covariance (8x8)
    covariance: Array2<f64>,
    class_id: Option<u32>,
    confidence: Option<f32>,
}

impl Track {
    /// Start a new tentative track from an unmatched detection.
    pub(crate) fn new(detection: &Detection, id: u64, kalman_filter: &KalmanFilter) -> Self {
        let cxcywh = detection.rect.to_cxcywh();
        let measurement = [
            cxcywh[0] as f64,
            cxcywh[1] as f64,
            cxcywh[2] as f64,
            cxcywh[3] as f64,
        ];
        let (mean, covariance) = kalman_filter.initiate(measurement);

        Self {
            id,
            state: TrackState::Tentative,
            hits: 1,
            age: 0,
            time_since_update: 0,
            mean,
            covariance,
            class_id: detection.class_id,
            confidence: detection.confidence,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// The externally reported state. A confirmed track that went unmatched
    /// this frame reports `Lost` (coasting) without leaving the stored
    /// Confirmed state, so it can never be re-promoted after removal.
    pub fn state(&self) -> TrackState {
        match self.state {
            TrackState::Confirmed if self.time_since_update > 0 => TrackState::Lost,
            s => s,
        }
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    /// Frames since creation.
    pub fn age(&self) -> u32 {
        self.age
    }

    /// Frames since the last successful match.
    pub fn time_since_update(&self) -> u32 {
        self.time_since_update
    }

    pub fn class_id(&self) -> Option<u32> {
        self.class_id
    }

    pub fn confidence(&self) -> Option<f32> {
        self.confidence
    }

    /// Current estimated bounding box, derived from the Kalman mean.
    pub fn rect(&self) -> Rect {
        Rect::from_cxcywh(
            self.mean[0] as f32,
            self.mean[1] as f32,
            self.mean[2] as f32,
            self.mean[3] as f32,
        )
    }

    pub fn is_tentative(&self) -> bool {
        self.state == TrackState::Tentative
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == TrackState::Confirmed
    }

    pub fn is_removed(&self) -> bool {
        self.state == TrackState::Removed
    }

    /// Advance the estimate by one frame. Runs exactly once per frame for
    /// every live track, before matching.
    pub(crate) fn predict(&mut self, kalman_filter: &KalmanFilter) {
        if self.time_since_update > 0 {
            // While coasting, hold the box size instead of extrapolating it.
            self.mean[6] = 0.0;
            self.mean[7] = 0.0;
        }
        let (mean, covariance) = kalman_filter.predict(&self.mean, &self.covariance);
        self.mean = mean;
        self.covariance = covariance;
        self.age += 1;
    }

    /// Fuse the predicted estimate with a matched detection.
    pub(crate) fn update(
        &mut self,
        detection: &Detection,
        kalman_filter: &KalmanFilter,
        min_hits: u32,
    ) {
        let cxcywh = detection.rect.to_cxcywh();
        let measurement = [
            cxcywh[0] as f64,
            cxcywh[1] as f64,
            cxcywh[2] as f64,
            cxcywh[3] as f64,
        ];
        let (mean, covariance) = kalman_filter.update(&self.mean, &self.covariance, measurement);
        self.mean = mean;
        self.covariance = covariance;

        self.hits += 1;
        self.time_since_update = 0;
        if detection.class_id.is_some() {
            self.class_id = detection.class_id;
        }
        if detection.confidence.is_some() {
            self.confidence = detection.confidence;
        }

        if self.state == TrackState::Tentative && self.hits >= min_hits {
            self.state = TrackState::Confirmed;
        }
    }

    /// Age an unmatched track. Tentative tracks are removed immediately (no
    /// grace period, so transient false positives never surface); confirmed
    /// tracks coast until `time_since_update` exceeds `max_age`.
    pub(crate) fn mark_missed(&mut self, max_age: u32) {
        self.time_since_update += 1;
        match self.state {
            TrackState::Tentative => self.state = TrackState::Removed,
            TrackState::Confirmed if self.time_since_update > max_age => {
                self.state = TrackState::Removed;
            }
            _ => {}
        }
    }
}
