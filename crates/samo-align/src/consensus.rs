use crate::{error::AlignError, pair::PairAlign, AlignConfig, AlignmentResult, PointSequence};

/// Outcome of a multiple alignment against a consensus structure.
#[derive(Debug, Clone)]
pub struct ConsensusResult {
    /// The final consensus coordinates.
    pub consensus: PointSequence,
    /// Alignment of every input chain onto the consensus, in input order.
    pub results: Vec<AlignmentResult>,
    /// Mean number of aligned positions over all chains.
    pub mean_aligned: f64,
    /// Mean RMSD over all chains.
    pub mean_rmsd: f64,
}

/// Multiple alignment of several chains through a running average structure.
///
/// The longest chain is the initial consensus. Every chain is aligned onto it,
/// then each round replaces every consensus position by the mean of the moved
/// points matched to it and resumes all pairwise alignments.
pub struct MultiAlign<'a> {
    chains: &'a [PointSequence],
    config: AlignConfig,
    rounds: usize,
}

impl<'a> MultiAlign<'a> {
    /// Number of consensus refinement rounds used by default.
    pub const DEFAULT_ROUNDS: usize = 5;

    /// Create a multiple alignment of `chains`.
    pub fn new(chains: &'a [PointSequence], config: AlignConfig) -> Self {
        Self {
            chains,
            config,
            rounds: Self::DEFAULT_ROUNDS,
        }
    }

    /// Set the number of refinement rounds.
    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    /// Run the multiple alignment.
    pub fn align(&self) -> Result<ConsensusResult, AlignError> {
        if self.chains.len() < 2 {
            return Err(AlignError::ConsensusTooFewChains(self.chains.len()));
        }

        // first chain of maximal length
        let max_len = self.chains.iter().map(PointSequence::len).max().unwrap_or(0);
        let longest = self
            .chains
            .iter()
            .position(|c| c.len() == max_len)
            .unwrap_or(0);
        let mut consensus = self.chains[longest].clone().with_name("consensus");
        log::info!(
            "Initial consensus from {} (size={})",
            self.chains[longest].name(),
            max_len
        );

        let mut results = self
            .chains
            .iter()
            .map(|chain| PairAlign::new(chain, &consensus, self.config.clone()).solve())
            .collect::<Result<Vec<_>, _>>()?;
        let (mut mean_aligned, mut mean_rmsd) = summarize(&results);
        log::info!("Multiple Aligned: {:.1}, RMSD: {:.6}", mean_aligned, mean_rmsd);

        for round in 0..self.rounds {
            update_consensus(&mut consensus, self.chains, &results);
            results = self
                .chains
                .iter()
                .zip(results.iter())
                .map(|(chain, previous)| {
                    PairAlign::new(chain, &consensus, self.config.clone()).continue_align(previous)
                })
                .collect::<Result<Vec<_>, _>>()?;
            (mean_aligned, mean_rmsd) = summarize(&results);
            log::info!(
                "Round {}: Multiple Aligned: {:.1}, RMSD: {:.6}",
                round + 1,
                mean_aligned,
                mean_rmsd
            );
        }

        Ok(ConsensusResult {
            consensus,
            results,
            mean_aligned,
            mean_rmsd,
        })
    }
}

fn summarize(results: &[AlignmentResult]) -> (f64, f64) {
    let n = results.len().max(1) as f64;
    let aligned = results.iter().map(|r| r.aligned_count as f64).sum::<f64>() / n;
    let rmsd = results.iter().map(|r| r.rmsd).sum::<f64>() / n;
    (aligned, rmsd)
}

/// Replace every consensus position by the mean of the moved points matched to it.
///
/// Positions nothing is matched to keep their coordinates.
fn update_consensus(
    consensus: &mut PointSequence,
    chains: &[PointSequence],
    results: &[AlignmentResult],
) {
    let mut sums = vec![[0.0f64; 3]; consensus.len()];
    let mut counts = vec![0usize; consensus.len()];

    for (chain, result) in chains.iter().zip(results) {
        for (i, k) in result.correspondence.matched_pairs() {
            let (Some(sum), Some(count)) = (sums.get_mut(k), counts.get_mut(k)) else {
                continue;
            };
            let moved = result.transform.apply(&chain.points()[i]);
            for (s, m) in sum.iter_mut().zip(moved) {
                *s += m;
            }
            *count += 1;
        }
    }

    for ((point, sum), count) in consensus.points_mut().iter_mut().zip(sums).zip(counts) {
        if count > 0 {
            *point = sum.map(|s| s / count as f64);
        }
    }
}
