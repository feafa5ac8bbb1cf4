//! Online multi-object vehicle tracking for lane-counting pipelines.
//!
//! The crate is split into two strictly layered modules:
//!
//! - [`tracker`] — the tracking core: per-frame prediction (constant-velocity
//!   Kalman filter), IoU cost matrix, minimum-cost assignment, and track
//!   lifecycle management (tentative → confirmed → removed).
//! - [`integration`] — collaborator interfaces: detection sources, lane
//!   assignment, and a pipeline that glues detection, tracking, and lane
//!   counting together.

pub mod integration;
pub mod tracker;

pub use integration::{
    CrossingEvent, DetectionBuilder, DetectionSource, IntoDetections, LaneAssigner, LaneCounter,
    LaneId, PipelineError, TrackerPipeline,
};
pub use tracker::{
    AssignmentResult, AssignmentSolver, CostMatrix, Detection, JonkerVolgenantSolver, Rect,
    SortTracker, TrackError, TrackState, TrackView, TrackerConfig,
};
