use serde::Serialize;

use samo_linalg::RigidTransform;

use crate::{metrics, Correspondence, PointSequence};

/// Outcome of aligning sequence A onto sequence B.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentResult {
    /// The correspondence from A to B.
    pub correspondence: Correspondence,
    /// Transform that moves A onto B.
    pub transform: RigidTransform,
    /// Root mean square distance of the matched pairs.
    pub rmsd: f64,
    /// Number of matched positions.
    pub aligned_count: usize,
    /// Number of discontinuities in the correspondence.
    pub break_count: usize,
    /// Number of matched positions out of increasing B order.
    pub permutation_count: usize,
    /// Fraction of matched pairs with identical residues.
    pub sequence_identity: f64,
    /// `(rmsd^2 - lambda^2) * aligned_count`, lower is better.
    pub score: f64,
}

impl AlignmentResult {
    /// Evaluate a correspondence and transform without optimizing anything.
    pub fn measure(
        a: &PointSequence,
        b: &PointSequence,
        correspondence: Correspondence,
        transform: RigidTransform,
        lambda: f64,
    ) -> Self {
        let rmsd = metrics::rmsd(a, b, &correspondence, &transform);
        let aligned_count = correspondence.aligned_count();
        Self {
            rmsd,
            aligned_count,
            break_count: metrics::break_count(&correspondence),
            permutation_count: metrics::permutation_count(&correspondence),
            sequence_identity: metrics::sequence_identity(a, b, &correspondence),
            score: alignment_score(rmsd, aligned_count, lambda),
            correspondence,
            transform,
        }
    }

    /// Whether this result is strictly better than `other`.
    #[inline]
    pub fn is_better_than(&self, other: &Self) -> bool {
        self.score < other.score
    }
}

/// The objective `(rmsd^2 - lambda^2) * aligned_count`.
#[inline]
pub fn alignment_score(rmsd: f64, aligned_count: usize, lambda: f64) -> f64 {
    (rmsd * rmsd - lambda * lambda) * aligned_count as f64
}
