//! Integration module for connecting the tracker to its collaborators.
//!
//! This module provides the traits and glue around the tracking core:
//! pluggable detection backends, the lane-assignment boundary, and a
//! pipeline combining detection, tracking, and lane counting.

mod builder;
mod detector;
mod lane;
mod pipeline;

pub use builder::DetectionBuilder;
pub use detector::{DetectionSource, IntoDetections};
pub use lane::{CrossingEvent, LaneAssigner, LaneCounter, LaneId};
pub use pipeline::{PipelineError, TrackerPipeline};
