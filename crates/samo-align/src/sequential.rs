use samo_linalg::RigidTransform;

use crate::{cost::CostMatrix, Correspondence, PointSequence};

#[derive(Clone, Copy, Debug, PartialEq)]
enum Step {
    Match,
    SkipA,
    SkipB,
}

/// Compute the best correspondence whose matched B-indices strictly increase with the A-index.
///
/// This is a global alignment of the two index ranges where matching `i` to `j`
/// costs `|T a_i - b_j|^2 - lambda^2` and is only allowed when that cost is not
/// positive; skipping a position on either side is free.
///
/// # Arguments
///
/// * `a` - The sequence that is moved.
/// * `b` - The fixed sequence.
/// * `transform` - Transform applied to the points of `a`.
/// * `lambda` - Distance threshold.
///
/// # Returns
///
/// The monotonic correspondence and its score.
pub fn solve_order_preserving(
    a: &PointSequence,
    b: &PointSequence,
    transform: &RigidTransform,
    lambda: f64,
) -> (Correspondence, f64) {
    let cost = CostMatrix::new(a, b, transform, lambda);
    let (len_a, len_b) = (cost.len_a(), cost.len_b());
    let cols = len_b + 1;

    // table[i][j] is the best score aligning the prefixes a[..i] and b[..j]
    let mut table = vec![0.0f64; (len_a + 1) * cols];
    let mut steps = vec![Step::SkipA; (len_a + 1) * cols];

    for i in 1..=len_a {
        steps[i * cols] = Step::SkipA;
    }
    for j in 1..=len_b {
        steps[j] = Step::SkipB;
    }

    for i in 1..=len_a {
        for j in 1..=len_b {
            let skip_a = table[(i - 1) * cols + j];
            let skip_b = table[i * cols + j - 1];

            let mut best = (skip_a, Step::SkipA);
            if cost.is_active(i - 1, j - 1) {
                let matched = table[(i - 1) * cols + j - 1] + cost.get(i - 1, j - 1);
                if matched <= best.0 {
                    best = (matched, Step::Match);
                }
            }
            if skip_b < best.0 {
                best = (skip_b, Step::SkipB);
            }

            table[i * cols + j] = best.0;
            steps[i * cols + j] = best.1;
        }
    }

    let mut correspondence = Correspondence::unmatched(len_a);
    let (mut i, mut j) = (len_a, len_b);
    while i > 0 && j > 0 {
        match steps[i * cols + j] {
            Step::Match => {
                correspondence.set(i - 1, Some(j - 1));
                i -= 1;
                j -= 1;
            }
            Step::SkipA => i -= 1,
            Step::SkipB => j -= 1,
        }
    }

    (correspondence, table[len_a * cols + len_b])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::solve_correspondence;
    use approx::assert_relative_eq;

    fn line(name: &str, xs: &[f64]) -> PointSequence {
        PointSequence::from_points(name, xs.iter().map(|&x| [x, 0.0, 0.0]).collect())
    }

    #[test]
    fn test_order_preserving_identity() {
        let a = line("a", &[0.0, 4.0, 8.0, 12.0]);
        let (correspondence, score) =
            solve_order_preserving(&a, &a, &RigidTransform::identity(), 2.0);
        assert_eq!(
            correspondence.as_slice(),
            &[Some(0), Some(1), Some(2), Some(3)]
        );
        assert_relative_eq!(score, -16.0);
    }

    #[test]
    fn test_order_preserving_reversed() {
        let a = line("a", &[0.0, 10.0, 20.0, 30.0, 40.0]);
        let b = line("b", &[40.0, 30.0, 20.0, 10.0, 0.0]);
        let transform = RigidTransform::identity();

        let (free, _) = solve_correspondence(&a, &b, &transform, 2.0);
        assert_eq!(free.aligned_count(), 5);

        let (ordered, score) = solve_order_preserving(&a, &b, &transform, 2.0);
        assert_eq!(ordered.aligned_count(), 1);
        assert_relative_eq!(score, -4.0);
    }

    #[test]
    fn test_order_preserving_is_strictly_increasing() {
        let a = PointSequence::from_points(
            "a",
            (0..25)
                .map(|i| {
                    let t = i as f64 * 0.7;
                    [3.0 * t.cos(), 3.0 * t.sin(), 1.5 * t]
                })
                .collect(),
        );
        // a reversed subsample followed by a forward stretch
        let points = a
            .points()
            .iter()
            .rev()
            .step_by(2)
            .chain(a.points()[5..15].iter())
            .copied()
            .collect();
        let b = PointSequence::from_points("b", points);
        let (correspondence, score) =
            solve_order_preserving(&a, &b, &RigidTransform::identity(), 3.0);

        let matched: Vec<usize> = correspondence.matched_pairs().map(|(_, j)| j).collect();
        assert!(!matched.is_empty());
        assert!(matched.windows(2).all(|w| w[0] < w[1]));
        assert!(correspondence.is_injective(b.len()));

        // never better than the unconstrained optimum
        let (_, free_score) = solve_correspondence(&a, &b, &RigidTransform::identity(), 3.0);
        assert!(free_score <= score + 1e-9);
    }

    #[test]
    fn test_order_preserving_empty_side() {
        let a = line("a", &[0.0, 1.0]);
        let b = line("b", &[]);
        let (correspondence, score) =
            solve_order_preserving(&a, &b, &RigidTransform::identity(), 2.0);
        assert_eq!(correspondence.len(), 2);
        assert_eq!(correspondence.aligned_count(), 0);
        assert_eq!(score, 0.0);
    }
}
