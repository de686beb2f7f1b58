use samo_linalg::{linalg::squared_distance, RigidTransform};

use crate::{Correspondence, PointSequence};

/// Number of discontinuities of a correspondence.
///
/// Every unmatched run that follows a matched position counts once, as does
/// every matched position whose B-index is not adjacent to the one of the
/// position before it. A trailing unmatched run is not counted.
pub fn break_count(correspondence: &Correspondence) -> usize {
    let entries = correspondence.as_slice();
    let Some(first) = entries.first() else {
        return 0;
    };

    let mut breaks = 0usize;
    let mut in_gap = first.is_none();
    for pair in entries.windows(2) {
        match (pair[0], pair[1]) {
            (_, Some(_)) if in_gap => in_gap = false,
            (_, None) if in_gap => {}
            (_, None) => {
                in_gap = true;
                breaks += 1;
            }
            (Some(prev), Some(curr)) => {
                if curr.abs_diff(prev) != 1 {
                    breaks += 1;
                }
            }
            // not in a gap, so the previous entry is matched
            (None, Some(_)) => {}
        }
    }

    if in_gap && breaks > 0 {
        breaks -= 1;
    }
    breaks
}

/// Number of matched positions whose B-index is lower than that of the previous matched position.
pub fn permutation_count(correspondence: &Correspondence) -> usize {
    let mut count = 0;
    let mut previous = None;
    for (_, j) in correspondence.matched_pairs() {
        if previous.is_some_and(|p| j < p) {
            count += 1;
        }
        previous = Some(j);
    }
    count
}

/// Fraction of matched pairs with identical residue names.
///
/// Pairs where either residue is unknown count as different; an empty
/// correspondence has identity 0.
pub fn sequence_identity(
    a: &PointSequence,
    b: &PointSequence,
    correspondence: &Correspondence,
) -> f64 {
    let (identical, matched) =
        correspondence
            .matched_pairs()
            .fold((0usize, 0usize), |(identical, matched), (i, j)| {
                let same = matches!((a.residue(i), b.residue(j)), (Some(x), Some(y)) if x == y);
                (identical + same as usize, matched + 1)
            });
    if matched == 0 {
        return 0.0;
    }
    identical as f64 / matched as f64
}

/// Root mean square distance between the matched pairs after moving `a` by `transform`.
///
/// Zero when nothing is matched.
pub fn rmsd(
    a: &PointSequence,
    b: &PointSequence,
    correspondence: &Correspondence,
    transform: &RigidTransform,
) -> f64 {
    let (sum, n) = correspondence
        .point_pairs(a, b)
        .fold((0.0, 0usize), |(sum, n), (pa, pb)| {
            (sum + squared_distance(&transform.apply(&pa), &pb), n + 1)
        });
    if n == 0 {
        return 0.0;
    }
    (sum / n as f64).sqrt()
}

/// The aligned residues of both sequences as one-letter codes, `-` for gaps.
///
/// The first string follows A and shows the residue of A at every matched
/// position; the second shows the residue of B it is matched to.
pub fn aligned_sequences(
    a: &PointSequence,
    b: &PointSequence,
    correspondence: &Correspondence,
) -> (String, String) {
    let code = |seq: &PointSequence, k: usize| seq.residue(k).map_or('X', crate::residue_code);
    correspondence
        .as_slice()
        .iter()
        .enumerate()
        .map(|(i, j)| match j {
            Some(j) => (code(a, i), code(b, *j)),
            None => (code(a, i), '-'),
        })
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn corr(entries: &[i64]) -> Correspondence {
        Correspondence::from(
            entries
                .iter()
                .map(|&j| (j >= 0).then_some(j as usize))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_break_count() {
        assert_eq!(break_count(&corr(&[])), 0);
        assert_eq!(break_count(&corr(&[0, 1, 2, 3])), 0);
        // descending runs are contiguous too
        assert_eq!(break_count(&corr(&[3, 2, 1, 0])), 0);
        assert_eq!(break_count(&corr(&[0, 1, 5, 6])), 1);
        assert_eq!(break_count(&corr(&[0, -1, -1, 3, 4])), 1);
        // leading gaps are free
        assert_eq!(break_count(&corr(&[-1, -1, 0, 1])), 0);
        // trailing gap is not counted
        assert_eq!(break_count(&corr(&[0, 1, -1, -1])), 0);
        assert_eq!(break_count(&corr(&[0, 4, -1])), 1);
        // a jump right after a gap is not counted
        assert_eq!(break_count(&corr(&[0, -1, 9, 10, 2])), 2);
    }

    #[test]
    fn test_permutation_count() {
        assert_eq!(permutation_count(&corr(&[0, 1, 2])), 0);
        assert_eq!(permutation_count(&corr(&[2, 1, 0])), 2);
        assert_eq!(permutation_count(&corr(&[3, -1, 1, 4, 2])), 2);
    }

    #[test]
    fn test_sequence_identity() {
        let res = |names: &[&str]| Some(names.iter().map(|s| s.to_string()).collect());
        let a = PointSequence::new("a", vec![[0.0; 3]; 3], res(&["ALA", "GLY", "SER"]));
        let b = PointSequence::new("b", vec![[0.0; 3]; 3], res(&["ALA", "SER", "GLY"]));

        assert_relative_eq!(sequence_identity(&a, &b, &corr(&[0, 1, 2])), 1.0 / 3.0);
        assert_relative_eq!(sequence_identity(&a, &b, &corr(&[0, 2, 1])), 1.0);
        assert_eq!(sequence_identity(&a, &b, &corr(&[-1, -1, -1])), 0.0);

        let bare = PointSequence::from_points("c", vec![[0.0; 3]; 3]);
        assert_eq!(sequence_identity(&a, &bare, &corr(&[0, 1, 2])), 0.0);
    }

    #[test]
    fn test_rmsd() {
        let a = PointSequence::from_points("a", vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        let b = PointSequence::from_points("b", vec![[0.0, 3.0, 0.0], [1.0, 1.0, 0.0]]);
        let transform = RigidTransform::identity();

        assert_relative_eq!(rmsd(&a, &b, &corr(&[0, 1]), &transform), 5.0f64.sqrt());
        assert_relative_eq!(rmsd(&a, &b, &corr(&[-1, 1]), &transform), 1.0);
        assert_eq!(rmsd(&a, &b, &corr(&[-1, -1]), &transform), 0.0);

        let shifted = RigidTransform::new(RigidTransform::identity().rotation, [0.0, 1.0, 0.0]);
        assert_relative_eq!(rmsd(&a, &b, &corr(&[-1, 1]), &shifted), 0.0);
    }

    #[test]
    fn test_aligned_sequences() {
        let res = |names: &[&str]| Some(names.iter().map(|s| s.to_string()).collect());
        let a = PointSequence::new("a", vec![[0.0; 3]; 3], res(&["ALA", "GLY", "SER"]));
        let b = PointSequence::new("b", vec![[0.0; 3]; 2], res(&["TRP", "GLY"]));
        let (top, bottom) = aligned_sequences(&a, &b, &corr(&[-1, 1, 0]));
        assert_eq!(top, "AGS");
        assert_eq!(bottom, "-GW");
    }
}
