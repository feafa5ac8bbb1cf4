//! Error taxonomy for the tracking core.

use thiserror::Error;

/// Errors surfaced by the tracker and its collaborators.
///
/// Per-detection problems (`InvalidDetection`) are recovered locally: the
/// offending detection is dropped and the rest of the frame proceeds.
/// `AssignmentInfeasible` and `TrackerMisuse` are contract violations and
/// abort the current step.
#[derive(Debug, Clone, Error)]
pub enum TrackError {
    /// Malformed bounding box: non-positive or non-finite width/height,
    /// or a confidence outside [0, 1].
    #[error("invalid detection: box ({x}, {y}, {width}, {height})")]
    InvalidDetection { x: f32, y: f32, width: f32, height: f32 },

    /// The assignment solver failed to produce a matching. The solver always
    /// returns a (possibly partial) matching for well-formed input, so this
    /// indicates an internal invariant violation.
    #[error("assignment infeasible: {0}")]
    AssignmentInfeasible(String),

    /// `step` was called with a frame index that does not advance the clock.
    #[error("tracker misuse: step(frame {frame}) after frame {last_frame}")]
    TrackerMisuse { frame: u64, last_frame: u64 },
}

impl TrackError {
    pub(crate) fn invalid_rect(rect: &crate::tracker::Rect) -> Self {
        TrackError::InvalidDetection {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }
}
