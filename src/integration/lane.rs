//! Lane-assignment boundary and per-lane vehicle counting.
//!
//! Lane geometry and membership testing live outside this crate, behind the
//! [`LaneAssigner`] trait. The counter consumes the tracker's visible list
//! and records the frame at which each vehicle first enters a lane.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tracker::TrackView;

/// Identifier of a lane, as assigned by the external lane definition.
pub type LaneId = u32;

/// Collaborator that classifies a point into a lane.
pub trait LaneAssigner {
    /// Lane containing the given point (typically a track's box center), or
    /// `None` when the point lies outside every lane.
    fn assign(&self, cx: f32, cy: f32) -> Option<LaneId>;
}

impl<F> LaneAssigner for F
where
    F: Fn(f32, f32) -> Option<LaneId>,
{
    fn assign(&self, cx: f32, cy: f32) -> Option<LaneId> {
        self(cx, cy)
    }
}

/// One row of the results table: a vehicle's first entry into a lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossingEvent {
    pub vehicle_id: u64,
    pub lane: LaneId,
    pub frame: u64,
    /// Seconds from the start of the video, derived from frame and rate.
    pub timestamp: f64,
}

/// Counts vehicles per lane, each vehicle id at most once per lane.
pub struct LaneCounter<A: LaneAssigner> {
    assigner: A,
    frame_rate: f64,
    counts: BTreeMap<LaneId, u64>,
    seen: BTreeMap<LaneId, BTreeSet<u64>>,
    events: Vec<CrossingEvent>,
}

impl<A: LaneAssigner> LaneCounter<A> {
    pub fn new(assigner: A, frame_rate: f64) -> Self {
        Self {
            assigner,
            frame_rate,
            counts: BTreeMap::new(),
            seen: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    /// Feed one frame's visible tracks. Returns the crossing events newly
    /// emitted for this frame (one per vehicle entering a lane it has not
    /// been counted in before).
    pub fn update(&mut self, frame: u64, tracks: &[TrackView]) -> Vec<CrossingEvent> {
        let mut new_events = Vec::new();

        for track in tracks {
            let (cx, cy) = track.rect.center();
            let Some(lane) = self.assigner.assign(cx, cy) else {
                continue;
            };
            let seen = self.seen.entry(lane).or_default();
            if seen.insert(track.id) {
                *self.counts.entry(lane).or_insert(0) += 1;
                let event = CrossingEvent {
                    vehicle_id: track.id,
                    lane,
                    frame,
                    timestamp: frame as f64 / self.frame_rate,
                };
                debug!(vehicle_id = track.id, lane, frame, "lane entry counted");
                new_events.push(event.clone());
                self.events.push(event);
            }
        }

        new_events
    }

    /// Current per-lane totals.
    pub fn counts(&self) -> &BTreeMap<LaneId, u64> {
        &self.counts
    }

    /// All crossing events recorded so far, in emission order. Frames are
    /// monotonically non-decreasing.
    pub fn events(&self) -> &[CrossingEvent] {
        &self.events
    }
}
