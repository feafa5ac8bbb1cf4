mod error;
mod kalman_filter;
mod matching;
mod rect;
mod sort_tracker;
mod track;
mod track_state;

pub use error::TrackError;
pub use kalman_filter::KalmanFilter;
pub use matching::{
    AssignmentResult, AssignmentSolver, CostMatrix, Detection, JonkerVolgenantSolver,
};
pub use rect::Rect;
pub use sort_tracker::{SortTracker, TrackView, TrackerConfig};
pub use track::Track;
pub use track_state::TrackState;
