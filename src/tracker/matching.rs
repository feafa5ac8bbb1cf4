//! Association between predicted tracks and per-frame detections: the IoU
//! cost matrix and the pluggable assignment solver.

use ndarray::Array2;

use crate::tracker::error::TrackError;
use crate::tracker::rect::Rect;

/// One observed bounding box in one frame. Ephemeral: it only exists for the
/// duration of a single `step` call and has no identity of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Bounding box in TLWH format
    pub rect: Rect,
    /// Optional detector class id (e.g. COCO: 2=car, 5=bus, 7=truck)
    pub class_id: Option<u32>,
    /// Optional detector confidence in [0, 1]
    pub confidence: Option<f32>,
}

impl Detection {
    /// Create a detection from a validated box.
    pub fn new(rect: Rect) -> Result<Self, TrackError> {
        Self::with_meta(rect, None, None)
    }

    /// Create a detection carrying class and confidence metadata.
    pub fn with_meta(
        rect: Rect,
        class_id: Option<u32>,
        confidence: Option<f32>,
    ) -> Result<Self, TrackError> {
        if !rect.is_valid() {
            return Err(TrackError::invalid_rect(&rect));
        }
        if let Some(c) = confidence {
            if !c.is_finite() || !(0.0..=1.0).contains(&c) {
                return Err(TrackError::invalid_rect(&rect));
            }
        }
        Ok(Self {
            rect,
            class_id,
            confidence,
        })
    }
}

/// Dense M×N dissimilarity matrix between M tracks and N detections.
///
/// Entry (i, j) is `1 - IoU(track_i, detection_j)`; lower is better.
#[derive(Debug, Clone)]
pub struct CostMatrix {
    costs: Array2<f32>,
}

impl CostMatrix {
    /// Build the cost matrix from predicted track boxes and detection boxes.
    pub fn from_iou(track_boxes: &[Rect], det_boxes: &[Rect]) -> Self {
        let mut costs = Array2::zeros((track_boxes.len(), det_boxes.len()));
        for (i, t) in track_boxes.iter().enumerate() {
            for (j, d) in det_boxes.iter().enumerate() {
                costs[[i, j]] = 1.0 - t.iou(d);
            }
        }
        Self { costs }
    }

    /// (rows, cols) = (tracks, detections).
    pub fn dim(&self) -> (usize, usize) {
        self.costs.dim()
    }

    pub fn get(&self, track_idx: usize, det_idx: usize) -> f32 {
        self.costs[[track_idx, det_idx]]
    }

    pub fn as_array(&self) -> &Array2<f32> {
        &self.costs
    }
}

/// Outcome of one assignment round.
#[derive(Debug, Clone)]
pub struct AssignmentResult {
    /// Matched (track index, detection index) pairs
    pub matches: Vec<(usize, usize)>,
    /// Track indices left without a detection
    pub unmatched_tracks: Vec<usize>,
    /// Detection indices left without a track
    pub unmatched_detections: Vec<usize>,
}

/// Minimum-cost bipartite matching over the feasible entries of a cost
/// matrix. Implementations must be deterministic: identical input produces
/// an identical result.
pub trait AssignmentSolver {
    /// Solve the matching. Entries with cost above `gate` are infeasible and
    /// must never appear in the returned matches.
    fn solve(&self, costs: &CostMatrix, gate: f32) -> Result<AssignmentResult, TrackError>;
}

/// Cost placed on padding cells and infeasible entries so the solver prefers
/// leaving them unassigned.
const INFEASIBLE_COST: f64 = 1e6;

/// Per-row bias added to feasible entries so an exact cost tie resolves
/// toward the lower row (the older track). Far below the resolution of an
/// f32 cost, so it can never override a real cost difference.
const TIE_BREAK_BIAS: f64 = 1e-12;

/// Exact rectangular solver backed by the Jonker-Volgenant algorithm
/// (`lapjv` crate). The default solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct JonkerVolgenantSolver;

impl AssignmentSolver for JonkerVolgenantSolver {
    fn solve(&self, costs: &CostMatrix, gate: f32) -> Result<AssignmentResult, TrackError> {
        let (num_rows, num_cols) = costs.dim();

        if num_rows == 0 {
            return Ok(AssignmentResult {
                matches: vec![],
                unmatched_tracks: vec![],
                unmatched_detections: (0..num_cols).collect(),
            });
        }

        if num_cols == 0 {
            return Ok(AssignmentResult {
                matches: vec![],
                unmatched_tracks: (0..num_rows).collect(),
                unmatched_detections: vec![],
            });
        }

        // Pad to square; mask infeasible entries so they are excluded from
        // consideration regardless of relative cost.
        let size = num_rows.max(num_cols);
        let mut padded = Array2::<f64>::from_elem((size, size), INFEASIBLE_COST);
        for i in 0..num_rows {
            for j in 0..num_cols {
                let c = costs.get(i, j);
                if c <= gate {
                    padded[[i, j]] = c as f64 + i as f64 * TIE_BREAK_BIAS;
                }
            }
        }

        let (row_to_col, _) = lapjv::lapjv(&padded)
            .map_err(|e| TrackError::AssignmentInfeasible(format!("{e:?}")))?;

        let mut matches = vec![];
        let mut unmatched_tracks = vec![];
        let mut unmatched_detections_mask: Vec<bool> = vec![true; num_cols];

        for (row_idx, &col_idx) in row_to_col.iter().enumerate() {
            if row_idx >= num_rows {
                continue;
            }
            if col_idx >= num_cols || costs.get(row_idx, col_idx) > gate {
                unmatched_tracks.push(row_idx);
            } else {
                matches.push((row_idx, col_idx));
                unmatched_detections_mask[col_idx] = false;
            }
        }

        let unmatched_detections: Vec<usize> = unmatched_detections_mask
            .iter()
            .enumerate()
            .filter_map(|(i, &u)| if u { Some(i) } else { None })
            .collect();

        Ok(AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxes(corners: &[(f32, f32)]) -> Vec<Rect> {
        corners
            .iter()
            .map(|&(x, y)| Rect::new(x, y, 10.0, 10.0))
            .collect()
    }

    #[test]
    fn test_detection_validation() {
        assert!(Detection::new(Rect::new(0.0, 0.0, 5.0, 5.0)).is_ok());
        assert!(Detection::new(Rect::new(0.0, 0.0, 0.0, 5.0)).is_err());
        assert!(Detection::with_meta(Rect::new(0.0, 0.0, 5.0, 5.0), Some(2), Some(1.5)).is_err());
    }

    #[test]
    fn test_cost_matrix_values() {
        let a = boxes(&[(0.0, 0.0)]);
        let costs = CostMatrix::from_iou(&a, &a);
        assert_eq!(costs.dim(), (1, 1));
        assert!(costs.get(0, 0).abs() < 1e-6); // identical boxes, zero cost
    }

    #[test]
    fn test_solver_matches_nearest() {
        let tracks = boxes(&[(0.0, 0.0), (100.0, 100.0)]);
        let dets = boxes(&[(101.0, 100.0), (1.0, 0.0)]);
        let costs = CostMatrix::from_iou(&tracks, &dets);

        let result = JonkerVolgenantSolver.solve(&costs, 0.7).unwrap();
        let mut matches = result.matches.clone();
        matches.sort_unstable();
        assert_eq!(matches, vec![(0, 1), (1, 0)]);
        assert!(result.unmatched_tracks.is_empty());
        assert!(result.unmatched_detections.is_empty());
    }

    #[test]
    fn test_solver_gates_infeasible() {
        let tracks = boxes(&[(0.0, 0.0)]);
        let dets = boxes(&[(50.0, 50.0)]); // zero overlap
        let costs = CostMatrix::from_iou(&tracks, &dets);

        let result = JonkerVolgenantSolver.solve(&costs, 0.7).unwrap();
        assert!(result.matches.is_empty());
        assert_eq!(result.unmatched_tracks, vec![0]);
        assert_eq!(result.unmatched_detections, vec![0]);
    }

    #[test]
    fn test_solver_rectangular() {
        let tracks = boxes(&[(0.0, 0.0)]);
        let dets = boxes(&[(1.0, 0.0), (200.0, 200.0), (400.0, 0.0)]);
        let costs = CostMatrix::from_iou(&tracks, &dets);

        let result = JonkerVolgenantSolver.solve(&costs, 0.7).unwrap();
        assert_eq!(result.matches, vec![(0, 0)]);
        assert_eq!(result.unmatched_detections, vec![1, 2]);
    }

    #[test]
    fn test_solver_empty_inputs() {
        let empty: Vec<Rect> = vec![];
        let dets = boxes(&[(0.0, 0.0)]);

        let costs = CostMatrix::from_iou(&empty, &dets);
        let result = JonkerVolgenantSolver.solve(&costs, 0.7).unwrap();
        assert_eq!(result.unmatched_detections, vec![0]);

        let costs = CostMatrix::from_iou(&dets, &empty);
        let result = JonkerVolgenantSolver.solve(&costs, 0.7).unwrap();
        assert_eq!(result.unmatched_tracks, vec![0]);
    }

    #[test]
    fn test_equal_cost_tie_prefers_older_track() {
        // One detection exactly between two tracks: both pairings cost the
        // same, and the older (lower-index) track must win so its identity
        // survives when paths converge.
        let tracks = boxes(&[(0.0, 0.0), (8.0, 0.0)]);
        let dets = boxes(&[(4.0, 0.0)]);
        let costs = CostMatrix::from_iou(&tracks, &dets);
        assert_eq!(costs.get(0, 0), costs.get(1, 0));

        let result = JonkerVolgenantSolver.solve(&costs, 0.9).unwrap();
        assert_eq!(result.matches, vec![(0, 0)]);
        assert_eq!(result.unmatched_tracks, vec![1]);
    }

    #[test]
    fn test_solver_deterministic() {
        let tracks = boxes(&[(0.0, 0.0), (8.0, 0.0)]);
        // Equidistant detections: the solver must resolve the tie the same
        // way on every run.
        let dets = boxes(&[(4.0, 0.0), (12.0, 0.0)]);
        let costs = CostMatrix::from_iou(&tracks, &dets);

        let a = JonkerVolgenantSolver.solve(&costs, 0.9).unwrap();
        let b = JonkerVolgenantSolver.solve(&costs, 0.9).unwrap();
        assert_eq!(a.matches, b.matches);
        assert_eq!(a.unmatched_tracks, b.unmatched_tracks);
        assert_eq!(a.unmatched_detections, b.unmatched_detections);
    }
}
