//! Association of candidate boxes with retained boxes.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::tracker::rect::BoundingBox;

/// How candidates are associated with retained boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Each candidate, in order, takes the first retained box whose top-left
    /// corner is close enough. Later candidates overwrite earlier ones.
    #[default]
    Greedy,
    /// Minimum total corner displacement over all pairs within range.
    Optimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentResult {
    /// `(tracked index, candidate index)` pairs
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// Compute the top-left corner distance matrix between retained and candidate boxes.
pub fn corner_distance(tracked: &[BoundingBox], candidates: &[BoundingBox]) -> Array2<f64> {
    let mut dists = Array2::zeros((tracked.len(), candidates.len()));
    for (i, t) in tracked.iter().enumerate() {
        for (j, c) in candidates.iter().enumerate() {
            dists[[i, j]] = t.corner_distance(c);
        }
    }
    dists
}

/// First-fit association in candidate order.
///
/// Each candidate takes the first retained box within `max_distance`. Several
/// candidates may land on the same retained box; `matches` keeps them in
/// candidate order so the last one is applied last.
pub fn greedy_assignment(
    tracked: &[BoundingBox],
    candidates: &[BoundingBox],
    max_distance: f64,
) -> AssignmentResult {
    let mut matched = vec![false; tracked.len()];
    let mut matches = Vec::new();
    let mut unmatched_detections = Vec::new();

    for (j, candidate) in candidates.iter().enumerate() {
        match tracked
            .iter()
            .position(|t| t.corner_distance(candidate) < max_distance)
        {
            Some(i) => {
                matched[i] = true;
                matches.push((i, j));
            }
            None => unmatched_detections.push(j),
        }
    }

    let unmatched_tracks = matched
        .iter()
        .enumerate()
        .filter_map(|(i, &m)| if m { None } else { Some(i) })
        .collect();

    AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    }
}

/// Solve the assignment problem on `cost_matrix`, keeping only pairs whose
/// cost is strictly below `thresh`.
///
/// The matrix is padded square with a prohibitive cost. Pairs at or beyond
/// `thresh` get that same cost, so the solver never trades an in-range pair
/// away to serve one that would be rejected afterwards.
pub fn linear_assignment(cost_matrix: &Array2<f64>, thresh: f64) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();

    if num_rows == 0 {
        return AssignmentResult {
            matches: vec![],
            unmatched_tracks: vec![],
            unmatched_detections: (0..num_cols).collect(),
        };
    }

    if num_cols == 0 {
        return AssignmentResult {
            matches: vec![],
            unmatched_tracks: (0..num_rows).collect(),
            unmatched_detections: vec![],
        };
    }

    let size = num_rows.max(num_cols);
    let mut padded = Array2::<f64>::from_elem((size, size), 1e6);

    for i in 0..num_rows {
        for j in 0..num_cols {
            let cost = cost_matrix[[i, j]];
            padded[[i, j]] = if cost < thresh { cost } else { 1e6 };
        }
    }

    let result = lapjv::lapjv(&padded);
    let mut matches = vec![];
    let mut unmatched_tracks = vec![];
    let mut unmatched_detections_mask: Vec<bool> = vec![true; num_cols];

    match result {
        Ok((row_to_col, _)) => {
            for (row_idx, &col_idx) in row_to_col.iter().enumerate() {
                if row_idx >= num_rows {
                    continue;
                }
                if col_idx >= num_cols {
                    unmatched_tracks.push(row_idx);
                } else if cost_matrix[[row_idx, col_idx]] < thresh {
                    matches.push((row_idx, col_idx));
                    unmatched_detections_mask[col_idx] = false;
                } else {
                    unmatched_tracks.push(row_idx);
                }
            }
        }
        Err(_) => {
            unmatched_tracks = (0..num_rows).collect();
        }
    }

    let unmatched_detections: Vec<usize> = unmatched_detections_mask
        .iter()
        .enumerate()
        .filter_map(|(i, &u)| if u { Some(i) } else { None })
        .collect();

    AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    }
}

/// Repeatedly replace any pair of boxes whose IoU reaches `overlap_threshold`
/// with their union, until no such pair remains.
pub fn merge_overlapping(boxes: &[BoundingBox], overlap_threshold: f32) -> Vec<BoundingBox> {
    let mut merged = boxes.to_vec();

    'scan: loop {
        for i in 0..merged.len() {
            for j in (i + 1)..merged.len() {
                if merged[i].iou(&merged[j]) >= overlap_threshold {
                    merged[i] = merged[i].union(&merged[j]);
                    merged.remove(j);
                    continue 'scan;
                }
            }
        }
        break;
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greedy_first_fit() {
        let tracked = [BoundingBox::new(0, 0, 10, 10), BoundingBox::new(10, 0, 20, 10)];
        let candidates = [BoundingBox::new(5, 0, 15, 10)];

        // Both retained boxes are within range; the first one wins.
        let result = greedy_assignment(&tracked, &candidates, 50.0);
        assert_eq!(result.matches, vec![(0, 0)]);
        assert_eq!(result.unmatched_tracks, vec![1]);
        assert!(result.unmatched_detections.is_empty());
    }

    #[test]
    fn test_greedy_candidates_share_entry() {
        let tracked = [BoundingBox::new(0, 0, 10, 10)];
        let candidates = [BoundingBox::new(1, 1, 10, 10), BoundingBox::new(2, 2, 10, 10)];

        let result = greedy_assignment(&tracked, &candidates, 50.0);
        assert_eq!(result.matches, vec![(0, 0), (0, 1)]);
        assert!(result.unmatched_detections.is_empty());
        assert!(result.unmatched_tracks.is_empty());
    }

    #[test]
    fn test_greedy_threshold_is_strict() {
        let tracked = [BoundingBox::new(0, 0, 10, 10)];
        let candidates = [BoundingBox::new(30, 40, 60, 60)];

        let result = greedy_assignment(&tracked, &candidates, 50.0);
        assert!(result.matches.is_empty());
        assert_eq!(result.unmatched_detections, vec![0]);
    }

    #[test]
    fn test_optimal_prefers_lower_total_cost() {
        // Greedy sends both candidates to track 0 and leaves track 1 stale.
        let tracked = [BoundingBox::new(0, 0, 10, 10), BoundingBox::new(40, 0, 50, 10)];
        let candidates = [BoundingBox::new(20, 0, 30, 10), BoundingBox::new(0, 0, 10, 10)];

        let greedy = greedy_assignment(&tracked, &candidates, 50.0);
        assert_eq!(greedy.matches, vec![(0, 0), (0, 1)]);
        assert_eq!(greedy.unmatched_tracks, vec![1]);

        let dists = corner_distance(&tracked, &candidates);
        let mut optimal = linear_assignment(&dists, 50.0).matches;
        optimal.sort();
        assert_eq!(optimal, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_linear_assignment_empty() {
        let dists = Array2::<f64>::zeros((0, 2));
        let result = linear_assignment(&dists, 50.0);
        assert_eq!(result.unmatched_detections, vec![0, 1]);
    }

    #[test]
    fn test_merge_overlapping() {
        let boxes = [
            BoundingBox::new(0, 0, 10, 10),
            BoundingBox::new(1, 1, 11, 11),
            BoundingBox::new(100, 100, 110, 110),
        ];
        let merged = merge_overlapping(&boxes, 0.5);
        assert_eq!(
            merged,
            vec![BoundingBox::new(0, 0, 11, 11), BoundingBox::new(100, 100, 110, 110)]
        );
    }

    #[test]
    fn test_merge_keeps_disjoint() {
        let boxes = [BoundingBox::new(0, 0, 10, 10), BoundingBox::new(5, 5, 15, 15)];
        assert_eq!(merge_overlapping(&boxes, 0.5), boxes.to_vec());
    }
}
