//! Per-frame tracking orchestration: predict, associate, update, age.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::tracker::error::TrackError;
use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::matching::{
    AssignmentResult, AssignmentSolver, CostMatrix, Detection, JonkerVolgenantSolver,
};
use crate::tracker::rect::Rect;
use crate::tracker::track::Track;
use crate::tracker::track_state::TrackState;

/// Configuration for the tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Minimum IoU between a predicted track box and a detection for the
    /// pair to be a feasible match.
    pub min_iou: f32,
    /// Consecutive matches required to promote a tentative track.
    pub min_hits: u32,
    /// Maximum frames a confirmed track may coast unmatched before removal
    /// (roughly one second of video at the source frame rate).
    pub max_age: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            min_iou: 0.3,
            min_hits: 3,
            max_age: 25,
        }
    }
}

/// One row of the tracker's visible output: a stable identity, its current
/// box estimate, and the reported lifecycle state.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackView {
    pub id: u64,
    pub rect: Rect,
    pub state: TrackState,
    pub class_id: Option<u32>,
    pub confidence: Option<f32>,
}

impl TrackView {
    fn from_track(track: &Track) -> Self {
        Self {
            id: track.id(),
            rect: track.rect(),
            state: track.state(),
            class_id: track.class_id(),
            confidence: track.confidence(),
        }
    }
}

/// Online multi-object tracker (SORT-style): constant-velocity Kalman
/// prediction, IoU cost, exact minimum-cost assignment.
///
/// The tracker owns its track collection; there is no process-wide state.
/// It is strictly sequential: each `step` must complete before the next one
/// is issued, which `&mut self` enforces at compile time, and frame indices
/// must strictly increase.
pub struct SortTracker {
    config: TrackerConfig,
    kalman_filter: KalmanFilter,
    solver: Box<dyn AssignmentSolver>,
    /// Live tracks in creation order, i.e. ascending id. Keeping this order
    /// makes equal-cost assignment ties resolve toward the older track.
    tracks: Vec<Track>,
    next_id: u64,
    last_frame: Option<u64>,
}

impl SortTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self::with_solver(config, Box::new(JonkerVolgenantSolver))
    }

    /// Create a tracker with a custom assignment solver.
    pub fn with_solver(config: TrackerConfig, solver: Box<dyn AssignmentSolver>) -> Self {
        Self {
            config,
            kalman_filter: KalmanFilter::default(),
            solver,
            tracks: Vec::new(),
            next_id: 1,
            last_frame: None,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Number of live tracks, confirmed or tentative.
    pub fn live_track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Run one prediction + association + update cycle.
    ///
    /// `frame_id` must strictly increase across calls. Malformed detections
    /// are dropped with a warning; the rest of the frame proceeds. Returns
    /// the visible track list: confirmed tracks only (coasting ones report
    /// [`TrackState::Lost`]), tentative tracks are withheld until confirmed.
    pub fn step(
        &mut self,
        frame_id: u64,
        detections: &[Detection],
    ) -> Result<Vec<TrackView>, TrackError> {
        if let Some(last) = self.last_frame {
            if frame_id <= last {
                return Err(TrackError::TrackerMisuse {
                    frame: frame_id,
                    last_frame: last,
                });
            }
        }

        let detections: Vec<Detection> = detections
            .iter()
            .filter(|det| {
                let ok = det.rect.is_valid();
                if !ok {
                    warn!(frame_id, rect = ?det.rect, "dropping invalid detection");
                }
                ok
            })
            .cloned()
            .collect();

        // 1. Predict every live track, exactly once, before matching.
        for track in &mut self.tracks {
            track.predict(&self.kalman_filter);
        }

        // 2.-3. Cost matrix over predicted boxes, then assignment. Entries
        // below the IoU floor are infeasible regardless of relative cost.
        let track_rects: Vec<Rect> = self.tracks.iter().map(Track::rect).collect();
        let det_rects: Vec<Rect> = detections.iter().map(|d| d.rect).collect();
        let costs = CostMatrix::from_iou(&track_rects, &det_rects);
        let gate = 1.0 - self.config.min_iou;

        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = self.solver.solve(&costs, gate)?;

        // 4. Apply: update matched tracks, age the rest, spawn new tracks.
        for (track_idx, det_idx) in matches {
            self.tracks[track_idx].update(
                &detections[det_idx],
                &self.kalman_filter,
                self.config.min_hits,
            );
        }

        for track_idx in unmatched_tracks {
            self.tracks[track_idx].mark_missed(self.config.max_age);
        }

        for det_idx in unmatched_detections {
            let track = Track::new(&detections[det_idx], self.next_id, &self.kalman_filter);
            debug!(frame_id, id = track.id(), "spawned tentative track");
            self.next_id += 1;
            self.tracks.push(track);
        }

        // 5. Evict removed tracks; their ids are never reused.
        self.tracks.retain(|track| {
            if track.is_removed() {
                debug!(frame_id, id = track.id(), "removed track");
                false
            } else {
                true
            }
        });

        self.last_frame = Some(frame_id);

        // 6. Report.
        Ok(self
            .tracks
            .iter()
            .filter(|track| track.is_confirmed())
            .map(TrackView::from_track)
            .collect())
    }
}
