use samo_linalg::RigidTransform;

use crate::{
    alternating::AlternatingOptimizer, error::AlignError, AlignConfig, Correspondence,
};

/// Deterministic continuation over the distance threshold.
///
/// Each round runs the alternation at `lambda + temperature`, warm started from
/// the correspondence of the previous round, and then multiplies the
/// temperature by `rate`. The first round always runs, later rounds stop once
/// the temperature drops to `min_temperature` or below.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnealingScheduler {
    /// Threshold relaxation of the first round.
    pub initial: f64,
    /// Factor applied to the relaxation after every round.
    pub rate: f64,
    /// Relaxation at or below which no more rounds are run.
    pub min_temperature: f64,
}

impl AnnealingScheduler {
    /// Scheduler with the annealing parameters of `config`.
    pub fn from_config(config: &AlignConfig) -> Self {
        Self {
            initial: config.annealing_initial,
            rate: config.annealing_rate,
            min_temperature: config.annealing_min_temperature,
        }
    }

    /// The relaxations of all rounds, in order. Never empty.
    pub fn temperatures(&self) -> impl Iterator<Item = f64> {
        let Self {
            initial,
            rate,
            min_temperature,
        } = *self;
        let cooled = std::iter::successors(Some(initial * rate), move |t| Some(t * rate))
            .take_while(move |&t| t > min_temperature);
        std::iter::once(initial).chain(cooled)
    }

    /// Run all rounds from `seed` and return the state of the last successful one.
    ///
    /// A failure in the first round is returned; a failure in a later round
    /// ends the schedule early.
    pub(crate) fn anneal(
        &self,
        optimizer: &AlternatingOptimizer<'_>,
        seed: Correspondence,
    ) -> Result<(Correspondence, RigidTransform), AlignError> {
        let lambda = optimizer.lambda();
        let mut current = seed;
        let mut transform = RigidTransform::identity();
        for (round, temperature) in self.temperatures().enumerate() {
            match optimizer.refine(&current, &transform, lambda + temperature) {
                Ok(refined) => {
                    log::debug!(
                        "\tannealing round {} at {:.3}: {:.6}",
                        round,
                        lambda + temperature,
                        refined.score
                    );
                    current = refined.correspondence;
                    transform = refined.transform;
                }
                Err(err) if round == 0 => return Err(err),
                Err(err) => {
                    log::warn!("Stopping annealing at {:.3}: {}", lambda + temperature, err);
                    break;
                }
            }
        }
        Ok((current, transform))
    }
}
