use samo_linalg::{fit_rigid_pairs, RigidTransform};

use crate::{
    alternating::AlternatingOptimizer, assignment::solve_correspondence, bnb::BranchAndBound,
    error::AlignError, sequential::solve_order_preserving, AlignConfig, AlignmentResult,
    Correspondence, PointSequence, Solution,
};

/// Alignment of one sequence onto another.
///
/// Sequence A is the one that is moved, B stays fixed.
pub struct PairAlign<'a> {
    a: &'a PointSequence,
    b: &'a PointSequence,
    config: AlignConfig,
}

impl<'a> PairAlign<'a> {
    /// Create a pairwise alignment of `a` onto `b`.
    pub fn new(a: &'a PointSequence, b: &'a PointSequence, config: AlignConfig) -> Self {
        Self { a, b, config }
    }

    /// The configuration used by this alignment.
    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    fn check_inputs(&self) -> Result<(), AlignError> {
        if self.a.is_empty() || self.b.is_empty() {
            log::warn!(
                "Attempt to align empty chain: {} (size={}) vs {} (size={})",
                self.a.name(),
                self.a.len(),
                self.b.name(),
                self.b.len()
            );
            return Err(AlignError::EmptyInput {
                len_a: self.a.len(),
                len_b: self.b.len(),
            });
        }
        self.config.validate()
    }

    /// Run the configured optimizer without post-processing.
    pub fn solve(&self) -> Result<AlignmentResult, AlignError> {
        self.check_inputs()?;

        let optimizer = AlternatingOptimizer::new(self.a, self.b, &self.config);
        if !self.config.use_branch_and_bound {
            return optimizer.run();
        }

        let incumbent = match optimizer.run() {
            Ok(result) => result,
            Err(err) => {
                log::warn!("No local optimum to start the exact search from: {}", err);
                AlignmentResult::measure(
                    self.a,
                    self.b,
                    Correspondence::unmatched(self.a.len()),
                    RigidTransform::identity(),
                    self.config.lambda,
                )
            }
        };
        let (result, _) = BranchAndBound::new(self.a, self.b, &self.config).search(incumbent)?;
        Ok(result)
    }

    /// Solve and post-process.
    pub fn align(&self) -> Result<AlignmentResult, AlignError> {
        let result = self.solve()?;
        Ok(self.post_process(result))
    }

    /// Resume the alternation from the correspondence of a previous result.
    pub fn continue_align(&self, previous: &AlignmentResult) -> Result<AlignmentResult, AlignError> {
        self.check_inputs()?;
        let optimizer = AlternatingOptimizer::new(self.a, self.b, &self.config);
        let refined = optimizer.refine(
            &previous.correspondence,
            &previous.transform,
            self.config.lambda,
        )?;
        Ok(AlignmentResult::measure(
            self.a,
            self.b,
            refined.correspondence,
            refined.transform,
            self.config.lambda,
        ))
    }

    /// Measure a stored solution without optimizing it.
    ///
    /// With a correspondence and a transform both are used as they are: the
    /// stored transform is not refit, so the reported RMSD is the one of the
    /// stored superposition even when a better fit of the correspondence
    /// exists. A correspondence alone gets its transform from a rigid fit, a
    /// transform alone gets the optimal correspondence under it.
    pub fn evaluate(&self, solution: &Solution) -> Result<AlignmentResult, AlignError> {
        self.check_inputs()?;

        let (correspondence, transform) = match solution.correspondence(self.b.len()) {
            Some(correspondence) => {
                let correspondence = correspondence?;
                correspondence.validate(self.a, self.b)?;
                let transform = match solution.transform() {
                    Some(transform) => transform,
                    None => fit_rigid_pairs(correspondence.point_pairs(self.a, self.b))?,
                };
                (correspondence, transform)
            }
            None => {
                let transform = match (solution.translation, solution.transform()) {
                    (_, Some(transform)) => transform,
                    (Some(_), None) => return Err(AlignError::MissingRotation),
                    (None, None) => return Err(AlignError::MissingTransform),
                };
                let (correspondence, _) =
                    solve_correspondence(self.a, self.b, &transform, self.config.lambda);
                (correspondence, transform)
            }
        };

        let result =
            AlignmentResult::measure(self.a, self.b, correspondence, transform, self.config.lambda);
        log::debug!("\tEvaluated: {}, RMSD: {:.6}", result.aligned_count, result.rmsd);
        Ok(result)
    }

    /// Evaluate a stored solution and run the alternation from it.
    pub fn improve(&self, solution: &Solution) -> Result<AlignmentResult, AlignError> {
        let start = self.evaluate(solution)?;
        let result = self.continue_align(&start)?;
        log::debug!("\tImproved: {}, RMSD: {:.6}", result.aligned_count, result.rmsd);
        Ok(result)
    }

    /// Log a summary of `result` and enforce sequential order when configured.
    pub fn post_process(&self, result: AlignmentResult) -> AlignmentResult {
        self.log_summary("PairAlign", &result);
        if !self.config.enforce_sequential_order {
            return result;
        }

        let (correspondence, _) =
            solve_order_preserving(self.a, self.b, &result.transform, self.config.lambda);
        let result = AlignmentResult::measure(
            self.a,
            self.b,
            correspondence,
            result.transform,
            self.config.lambda,
        );
        self.log_summary("PostAlign", &result);
        result
    }

    fn log_summary(&self, stage: &str, result: &AlignmentResult) {
        log::info!(
            "{}: {} (size={}) vs {} (size={})\n\tAligned = {}, RMSD = {:.6}\n\tBreak/Permutation = {}/{}, SeqId = {:5.3}",
            stage,
            self.a.name(),
            self.a.len(),
            self.b.name(),
            self.b.len(),
            result.aligned_count,
            result.rmsd,
            result.break_count,
            result.permutation_count,
            result.sequence_identity
        );
    }
}

/// Align `a` onto `b` with `config`, including post-processing.
pub fn align(
    a: &PointSequence,
    b: &PointSequence,
    config: &AlignConfig,
) -> Result<AlignmentResult, AlignError> {
    PairAlign::new(a, b, config.clone()).align()
}

/// Resume the alignment of `a` onto `b` from `previous`.
pub fn continue_align(
    a: &PointSequence,
    b: &PointSequence,
    previous: &AlignmentResult,
    config: &AlignConfig,
) -> Result<AlignmentResult, AlignError> {
    PairAlign::new(a, b, config.clone()).continue_align(previous)
}
