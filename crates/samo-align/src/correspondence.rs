use serde::{Deserialize, Serialize};

use crate::{error::AlignError, PointSequence};

/// Injective partial mapping from the points of sequence A to the points of sequence B.
///
/// Entry `i` holds the B-index matched to A-index `i`, or `None` when `i` is unmatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correspondence(Vec<Option<usize>>);

impl Correspondence {
    /// A correspondence of length `len_a` with every position unmatched.
    pub fn unmatched(len_a: usize) -> Self {
        Self(vec![None; len_a])
    }

    /// The sequential mapping `i -> i` for every index valid in both sequences.
    pub fn identity(len_a: usize, len_b: usize) -> Self {
        Self((0..len_a).map(|i| (i < len_b).then_some(i)).collect())
    }

    /// Build from signed indices where any negative value means unmatched.
    ///
    /// Fails when an index is out of range for B or when two positions share a B-index.
    pub fn from_indices(indices: &[i64], len_b: usize) -> Result<Self, AlignError> {
        let entries = indices
            .iter()
            .map(|&j| match j {
                j if j < 0 => Ok(None),
                j if (j as u64) < len_b as u64 => Ok(Some(j as usize)),
                j => Err(AlignError::InvalidCorrespondence(format!(
                    "index {j} out of range for a sequence of length {len_b}"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let correspondence = Self(entries);
        if !correspondence.is_injective(len_b) {
            return Err(AlignError::InvalidCorrespondence(
                "two positions are matched to the same index".to_string(),
            ));
        }
        Ok(correspondence)
    }

    /// Signed indices, `-1` for unmatched positions.
    pub fn to_indices(&self) -> Vec<i64> {
        self.0
            .iter()
            .map(|j| j.map_or(-1, |j| j as i64))
            .collect()
    }

    /// Length of the correspondence, i.e. the length of sequence A.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the correspondence has no positions at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The B-index matched to A-index `i`.
    #[inline]
    pub fn get(&self, i: usize) -> Option<usize> {
        self.0.get(i).copied().flatten()
    }

    /// Set the match of A-index `i`.
    #[inline]
    pub fn set(&mut self, i: usize, j: Option<usize>) {
        self.0[i] = j;
    }

    /// All entries in A order.
    pub fn as_slice(&self) -> &[Option<usize>] {
        &self.0
    }

    /// Iterate over the matched `(a_index, b_index)` pairs in A order.
    pub fn matched_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, j)| j.map(|j| (i, j)))
    }

    /// Matched point pairs `(a_point, b_point)` for rigid fitting.
    pub fn point_pairs<'a>(
        &'a self,
        a: &'a PointSequence,
        b: &'a PointSequence,
    ) -> impl Iterator<Item = ([f64; 3], [f64; 3])> + 'a {
        self.matched_pairs()
            .map(move |(i, j)| (a.points()[i], b.points()[j]))
    }

    /// Number of matched positions.
    pub fn aligned_count(&self) -> usize {
        self.0.iter().filter(|j| j.is_some()).count()
    }

    /// Whether every B-index is used at most once and lies inside `0..len_b`.
    pub fn is_injective(&self, len_b: usize) -> bool {
        let mut used = vec![false; len_b];
        for j in self.0.iter().flatten() {
            match used.get_mut(*j) {
                Some(seen) if !*seen => *seen = true,
                _ => return false,
            }
        }
        true
    }

    /// Check that the correspondence can be used with the sequences `a` and `b`.
    pub fn validate(&self, a: &PointSequence, b: &PointSequence) -> Result<(), AlignError> {
        if self.len() != a.len() {
            return Err(AlignError::InvalidCorrespondence(format!(
                "length {} does not match sequence {} of length {}",
                self.len(),
                a.name(),
                a.len()
            )));
        }
        if !self.is_injective(b.len()) {
            return Err(AlignError::InvalidCorrespondence(format!(
                "not an injective mapping into {} of length {}",
                b.name(),
                b.len()
            )));
        }
        Ok(())
    }
}

impl From<Vec<Option<usize>>> for Correspondence {
    fn from(entries: Vec<Option<usize>>) -> Self {
        Self(entries)
    }
}
