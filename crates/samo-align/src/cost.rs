use samo_linalg::{linalg::squared_distance, RigidTransform};

use crate::PointSequence;

/// Thresholded pairwise cost `|T a_i - b_j|^2 - lambda^2` between every A and B point.
///
/// Entries with a non-positive cost are the active edges: matching such a pair
/// never makes the score worse than leaving `i` unmatched.
pub(crate) struct CostMatrix {
    len_a: usize,
    len_b: usize,
    // row-major, one row per A-index
    data: Vec<f64>,
}

impl CostMatrix {
    pub fn new(
        a: &PointSequence,
        b: &PointSequence,
        transform: &RigidTransform,
        lambda: f64,
    ) -> Self {
        let lambda2 = lambda * lambda;
        let moved = transform.apply_all(a.points());
        let data = moved
            .iter()
            .flat_map(|pa| b.points().iter().map(move |pb| squared_distance(pa, pb) - lambda2))
            .collect();
        Self {
            len_a: a.len(),
            len_b: b.len(),
            data,
        }
    }

    #[inline]
    pub fn len_a(&self) -> usize {
        self.len_a
    }

    #[inline]
    pub fn len_b(&self) -> usize {
        self.len_b
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.len_b + j]
    }

    #[inline]
    pub fn is_active(&self, i: usize, j: usize) -> bool {
        self.get(i, j) <= 0.0
    }

    /// For every B-index the ascending list of A-indices with an active edge.
    pub fn active_by_b(&self) -> Vec<Vec<usize>> {
        let mut active = vec![Vec::new(); self.len_b];
        for i in 0..self.len_a {
            for (j, list) in active.iter_mut().enumerate() {
                if self.is_active(i, j) {
                    list.push(i);
                }
            }
        }
        active
    }

    /// Smallest entry among the active edges, 0 when there is none.
    pub fn min_active(&self) -> f64 {
        self.data.iter().copied().fold(0.0, f64::min)
    }
}
