use samo_linalg::{fit_rigid_pairs, RigidTransform};

use crate::{
    annealing::AnnealingScheduler, assignment::solve_correspondence, error::AlignError,
    AlignConfig, AlignmentResult, Correspondence, PointSequence,
};

/// State reached by one fit/match alternation.
#[derive(Debug, Clone)]
pub(crate) struct Refinement {
    pub correspondence: Correspondence,
    pub transform: RigidTransform,
    pub score: f64,
    /// Matching score after every accepted step.
    pub history: Vec<f64>,
    pub converged: bool,
}

/// Local optimizer alternating rigid fitting and optimal correspondence search.
pub struct AlternatingOptimizer<'a> {
    a: &'a PointSequence,
    b: &'a PointSequence,
    config: &'a AlignConfig,
}

impl<'a> AlternatingOptimizer<'a> {
    /// Create an optimizer moving `a` onto `b`.
    pub fn new(a: &'a PointSequence, b: &'a PointSequence, config: &'a AlignConfig) -> Self {
        Self { a, b, config }
    }

    #[inline]
    pub(crate) fn lambda(&self) -> f64 {
        self.config.lambda
    }

    fn check_inputs(&self) -> Result<(), AlignError> {
        if self.a.is_empty() || self.b.is_empty() {
            return Err(AlignError::EmptyInput {
                len_a: self.a.len(),
                len_b: self.b.len(),
            });
        }
        Ok(())
    }

    /// Alternate fitting and matching at threshold `lambda` starting from `seed`.
    ///
    /// When the seed has no usable fit the matching starts from `current`
    /// instead. A failing fit later on, a score increase or running out of
    /// iterations stops the loop and keeps the last accepted state. Only a
    /// malformed seed is an error.
    pub(crate) fn refine(
        &self,
        seed: &Correspondence,
        current: &RigidTransform,
        lambda: f64,
    ) -> Result<Refinement, AlignError> {
        seed.validate(self.a, self.b)?;

        let mut transform = match fit_rigid_pairs(seed.point_pairs(self.a, self.b)) {
            Ok(transform) => transform,
            Err(err) => {
                log::warn!("Keeping the current transform, no fit for the seed: {}", err);
                *current
            }
        };
        let (mut correspondence, mut score) =
            solve_correspondence(self.a, self.b, &transform, lambda);
        let mut history = vec![score];
        log::debug!("\tlambda {:.3}: {:.6}", lambda, score);

        let mut converged = false;
        while history.len() < self.config.max_iterations {
            let next_transform = match fit_rigid_pairs(correspondence.point_pairs(self.a, self.b))
            {
                Ok(transform) => transform,
                Err(err) => {
                    log::warn!("Stopping alternation: {}", err);
                    break;
                }
            };
            let (next_correspondence, next_score) =
                solve_correspondence(self.a, self.b, &next_transform, lambda);
            log::debug!("\tlambda {:.3}: {:.6}", lambda, next_score);

            if next_score > score {
                log::warn!(
                    "Not convergent, score went from {:.6} to {:.6}",
                    score,
                    next_score
                );
                break;
            }

            let delta = score - next_score;
            transform = next_transform;
            correspondence = next_correspondence;
            score = next_score;
            history.push(score);

            if delta <= self.config.convergence_tolerance {
                converged = true;
                break;
            }
        }

        if !converged && history.len() >= self.config.max_iterations {
            log::warn!(
                "Alternation stopped after {} iterations",
                self.config.max_iterations
            );
        }

        Ok(Refinement {
            correspondence,
            transform,
            score,
            history,
            converged,
        })
    }

    /// Optimize from a single seed correspondence, annealing first when enabled.
    pub fn run_from(&self, seed: Correspondence) -> Result<AlignmentResult, AlignError> {
        self.check_inputs()?;

        if let Ok(seed_transform) = fit_rigid_pairs(seed.point_pairs(self.a, self.b)) {
            log::info!(
                "\tInitial solution: {:.6}",
                crate::metrics::rmsd(self.a, self.b, &seed, &seed_transform)
            );
        }

        let (start, current) = if self.config.annealing_enabled {
            AnnealingScheduler::from_config(self.config).anneal(self, seed)?
        } else {
            (seed, RigidTransform::identity())
        };

        let refined = self.refine(&start, &current, self.config.lambda)?;
        log::debug!(
            "\t{} steps, converged: {}",
            refined.history.len(),
            refined.converged
        );
        let result = AlignmentResult::measure(
            self.a,
            self.b,
            refined.correspondence,
            refined.transform,
            self.config.lambda,
        );
        log::info!(
            "\tScore: {:.6}, Aligned: {}, RMSD: {:.6}",
            result.score,
            result.aligned_count,
            result.rmsd
        );
        Ok(result)
    }

    /// Optimize from every seed of the configured heuristic level and keep the best result.
    pub fn run(&self) -> Result<AlignmentResult, AlignError> {
        self.check_inputs()?;

        let mut best: Option<AlignmentResult> = None;
        let mut last_error = None;

        let seeds = seed_correspondences(
            self.a.len(),
            self.b.len(),
            self.config.heuristic_start_level,
        );
        for (index, seed) in seeds.enumerate() {
            match self.run_from(seed) {
                Ok(result) => {
                    if best.as_ref().map_or(true, |b| result.is_better_than(b)) {
                        best = Some(result);
                    }
                }
                Err(err) => {
                    log::warn!("Skipping seed {}: {}", index, err);
                    last_error = Some(err);
                }
            }
        }

        match (best, last_error) {
            (Some(result), _) => Ok(result),
            (None, Some(err)) => Err(err),
            (None, None) => Err(AlignError::EmptyInput {
                len_a: self.a.len(),
                len_b: self.b.len(),
            }),
        }
    }
}

/// Starting correspondences for the alternating optimizer.
///
/// Level 0 yields the sequential mapping `i -> i` only. Level `L > 0` cuts both
/// sequences into blocks of `ceil(max(len_a, len_b) / L)` positions and yields
/// the diagonal of every pair of blocks, A-block major.
pub fn seed_correspondences(len_a: usize, len_b: usize, level: usize) -> SeedCorrespondences {
    let block_len = if level == 0 {
        0
    } else {
        len_a.max(len_b).div_ceil(level)
    };
    let (blocks_a, blocks_b) = if block_len == 0 {
        (0, 0)
    } else {
        (len_a.div_ceil(block_len), len_b.div_ceil(block_len))
    };
    SeedCorrespondences {
        len_a,
        len_b,
        level,
        block_len,
        blocks_a,
        blocks_b,
        index: 0,
    }
}

/// Iterator over seed correspondences, see [`seed_correspondences`].
#[derive(Debug, Clone)]
pub struct SeedCorrespondences {
    len_a: usize,
    len_b: usize,
    level: usize,
    block_len: usize,
    blocks_a: usize,
    blocks_b: usize,
    index: usize,
}

impl Iterator for SeedCorrespondences {
    type Item = Correspondence;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.index;
        if self.level == 0 {
            if index > 0 || self.len_a == 0 || self.len_b == 0 {
                return None;
            }
            self.index += 1;
            return Some(Correspondence::identity(self.len_a, self.len_b));
        }

        if self.blocks_b == 0 || index >= self.blocks_a * self.blocks_b {
            return None;
        }
        self.index += 1;

        let block_a = index / self.blocks_b;
        let block_b = index % self.blocks_b;
        let mut seed = Correspondence::unmatched(self.len_a);
        for k in 0..self.block_len {
            let i = block_a * self.block_len + k;
            let j = block_b * self.block_len + k;
            if i < self.len_a && j < self.len_b {
                seed.set(i, Some(j));
            }
        }
        Some(seed)
    }
}
