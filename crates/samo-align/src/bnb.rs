//! Exact search over the correspondence space.
//!
//! Positions of A are assigned in order, each one trying every free B-index in
//! ascending order and then "unmatched". Every new match refits the transform
//! and scores the partial correspondence. Since adding a pair can lower the
//! score by at most `lambda^2`, a branch whose score minus `lambda^2` per
//! unassigned position cannot beat the incumbent is cut. A prefix without a
//! usable fit is not scored; its bound is the parent's minus `lambda^2` and the
//! search still descends into it.

use samo_linalg::fit_rigid_pairs;

use crate::{
    error::AlignError, metrics, result::alignment_score, AlignConfig, AlignmentResult,
    Correspondence, PointSequence,
};

/// Counters of one branch and bound run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Number of partial assignments visited.
    pub nodes: u64,
    /// Number of rigid fits computed.
    pub fits: u64,
    /// Number of times the incumbent was replaced.
    pub improvements: u64,
    /// Whether the whole tree was searched, false when the node budget ran out.
    pub exhaustive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    Fresh,
    Matched(usize),
    Skipped,
}

/// Branch and bound search for the correspondence with the lowest score.
pub struct BranchAndBound<'a> {
    a: &'a PointSequence,
    b: &'a PointSequence,
    config: &'a AlignConfig,
}

impl<'a> BranchAndBound<'a> {
    /// Create a search moving `a` onto `b`.
    pub fn new(a: &'a PointSequence, b: &'a PointSequence, config: &'a AlignConfig) -> Self {
        Self { a, b, config }
    }

    /// Search the correspondence space, starting from `incumbent` as the best known result.
    ///
    /// The returned result is never worse than `incumbent`. Unless the node
    /// budget runs out it has the lowest score over all correspondences.
    pub fn search(
        &self,
        incumbent: AlignmentResult,
    ) -> Result<(AlignmentResult, SearchStats), AlignError> {
        let (a, b) = (self.a, self.b);
        let (len_a, len_b) = (a.len(), b.len());
        if len_a == 0 || len_b == 0 {
            return Err(AlignError::EmptyInput { len_a, len_b });
        }

        let lambda = self.config.lambda;
        let lambda2 = lambda * lambda;

        let mut best = incumbent;
        let mut stats = SearchStats {
            exhaustive: true,
            ..Default::default()
        };

        let mut slots = vec![Slot::Fresh; len_a];
        let mut occupied = vec![false; len_b];
        let mut correspondence = Correspondence::unmatched(len_a);
        // score of the partial assignment of the positions before each depth,
        // or a lower bound of it below an unscored prefix
        let mut depth_score = vec![0.0f64; len_a];

        let next_free = |occupied: &[bool], from: usize| (from..len_b).find(|&j| !occupied[j]);

        let mut index = 0usize;
        loop {
            let candidate = match slots[index] {
                Slot::Fresh => Some(next_free(&occupied, 0)),
                Slot::Matched(j) => {
                    occupied[j] = false;
                    correspondence.set(index, None);
                    Some(next_free(&occupied, j + 1))
                }
                Slot::Skipped => None,
            };

            let Some(candidate) = candidate else {
                // all values tried, backtrack
                slots[index] = Slot::Fresh;
                if index == 0 {
                    break;
                }
                index -= 1;
                continue;
            };

            if self
                .config
                .max_search_nodes
                .is_some_and(|limit| stats.nodes >= limit)
            {
                log::warn!(
                    "Branch and bound stopped after {} nodes, result may not be optimal",
                    stats.nodes
                );
                stats.exhaustive = false;
                break;
            }
            stats.nodes += 1;

            let remaining = (len_a - index - 1) as f64;
            let score = match candidate {
                Some(j) => {
                    slots[index] = Slot::Matched(j);
                    occupied[j] = true;
                    correspondence.set(index, Some(j));

                    stats.fits += 1;
                    let score = match fit_rigid_pairs(correspondence.point_pairs(a, b)) {
                        // no usable fit, bounded through the parent
                        Err(_) => depth_score[index] - lambda2,
                        Ok(transform) => {
                            let rmsd = metrics::rmsd(a, b, &correspondence, &transform);
                            let score =
                                alignment_score(rmsd, correspondence.aligned_count(), lambda);
                            if score < best.score {
                                best = AlignmentResult::measure(
                                    a,
                                    b,
                                    correspondence.clone(),
                                    transform,
                                    lambda,
                                );
                                stats.improvements += 1;
                                log::debug!(
                                    "\tScore: {:.6}, Aligned: {}, RMSD: {:.6}",
                                    best.score,
                                    best.aligned_count,
                                    best.rmsd
                                );
                            }
                            score
                        }
                    };
                    if score - lambda2 * remaining >= best.score {
                        continue;
                    }
                    score
                }
                None => {
                    slots[index] = Slot::Skipped;
                    let score = depth_score[index];
                    if score - lambda2 * remaining >= best.score {
                        continue;
                    }
                    score
                }
            };

            if index + 1 < len_a {
                index += 1;
                depth_score[index] = score;
            }
        }

        log::info!(
            "Branch and bound: {} nodes, {} fits, {} improvements",
            stats.nodes,
            stats.fits,
            stats.improvements
        );
        Ok((best, stats))
    }
}
