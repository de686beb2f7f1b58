//! Optimal correspondence for a fixed transform.
//!
//! Matching A-index `i` to B-index `j` costs `|T a_i - b_j|^2 - lambda^2`, leaving
//! `i` unmatched costs nothing. The cheapest injective correspondence is found
//! with successive shortest augmenting paths: the residual graph runs from the
//! free B nodes over unmatched edges `B -> A`, back over matched edges `A -> B`,
//! and ends in a virtual sink reachable from every free A node. Node potentials
//! keep all reduced costs non-negative so each path is found with Dijkstra.
//! Path costs never decrease, so the first non-negative path proves optimality.

use std::{cmp::Ordering, collections::BinaryHeap};

use samo_linalg::RigidTransform;

use crate::{cost::CostMatrix, Correspondence, PointSequence};

/// Compute the optimal correspondence between `a` (moved by `transform`) and `b`.
///
/// # Arguments
///
/// * `a` - The sequence that is moved.
/// * `b` - The fixed sequence.
/// * `transform` - Transform applied to the points of `a`.
/// * `lambda` - Distance threshold, pairs farther apart are never matched.
///
/// # Returns
///
/// The correspondence and its score, the (non-positive) sum of the costs of
/// the matched pairs.
pub fn solve_correspondence(
    a: &PointSequence,
    b: &PointSequence,
    transform: &RigidTransform,
    lambda: f64,
) -> (Correspondence, f64) {
    let cost = CostMatrix::new(a, b, transform, lambda);
    let mut solver = AssignmentSolver::new(&cost);
    let score = solver.solve();
    (solver.into_correspondence(), score)
}

#[derive(PartialEq)]
struct Label {
    dist: f64,
    node: usize,
}

impl Eq for Label {}

impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed: BinaryHeap is a max-heap, ties go to the lower node index
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct AssignmentSolver<'a> {
    cost: &'a CostMatrix,
    // active A-indices per B-index
    active: Vec<Vec<usize>>,
    mate_a: Vec<Option<usize>>,
    mate_b: Vec<Option<usize>>,
    potential_a: Vec<f64>,
    potential_b: Vec<f64>,
    potential_sink: f64,
    // per-round scratch
    dist_a: Vec<f64>,
    dist_b: Vec<f64>,
    prev_a: Vec<usize>,
    prev_b: Vec<Option<usize>>,
    heap: BinaryHeap<Label>,
}

impl<'a> AssignmentSolver<'a> {
    fn new(cost: &'a CostMatrix) -> Self {
        let (len_a, len_b) = (cost.len_a(), cost.len_b());
        // every active cost is >= min_active, so these potentials start feasible
        let shift = cost.min_active();
        Self {
            cost,
            active: cost.active_by_b(),
            mate_a: vec![None; len_a],
            mate_b: vec![None; len_b],
            potential_a: vec![shift; len_a],
            potential_b: vec![0.0; len_b],
            potential_sink: shift,
            dist_a: vec![f64::INFINITY; len_a],
            dist_b: vec![f64::INFINITY; len_b],
            prev_a: vec![0; len_a],
            prev_b: vec![None; len_b],
            heap: BinaryHeap::new(),
        }
    }

    fn solve(&mut self) -> f64 {
        let mut score = 0.0;
        while let Some((dist_sink, last)) = self.shortest_path() {
            // free B nodes keep a zero potential, so this is the true path cost
            let path_cost = dist_sink + self.potential_sink;
            if path_cost >= 0.0 {
                break;
            }
            score += path_cost;

            for (p, d) in self.potential_a.iter_mut().zip(self.dist_a.iter()) {
                *p += d.min(dist_sink);
            }
            for (p, d) in self.potential_b.iter_mut().zip(self.dist_b.iter()) {
                *p += d.min(dist_sink);
            }
            self.potential_sink += dist_sink;

            self.augment(last);
        }
        score
    }

    /// Dijkstra from all free B nodes to the sink. Returns the reduced distance
    /// of the sink and the free A node the path leaves through.
    fn shortest_path(&mut self) -> Option<(f64, usize)> {
        let len_b = self.cost.len_b();

        self.dist_a.fill(f64::INFINITY);
        self.dist_b.fill(f64::INFINITY);
        self.prev_b.fill(None);
        self.heap.clear();

        for j in 0..len_b {
            if self.mate_b[j].is_none() {
                self.dist_b[j] = 0.0;
                self.heap.push(Label { dist: 0.0, node: j });
            }
        }

        let mut dist_sink = f64::INFINITY;
        let mut last = None;

        while let Some(Label { dist, node }) = self.heap.pop() {
            if dist >= dist_sink {
                break;
            }
            if node < len_b {
                let j = node;
                if dist > self.dist_b[j] {
                    continue;
                }
                for &i in &self.active[j] {
                    if self.mate_a[i] == Some(j) {
                        continue;
                    }
                    let reduced =
                        self.cost.get(i, j) + self.potential_b[j] - self.potential_a[i];
                    let next = dist + reduced.max(0.0);
                    if next < self.dist_a[i] {
                        self.dist_a[i] = next;
                        self.prev_a[i] = j;
                        self.heap.push(Label {
                            dist: next,
                            node: len_b + i,
                        });
                    }
                }
            } else {
                let i = node - len_b;
                if dist > self.dist_a[i] {
                    continue;
                }
                match self.mate_a[i] {
                    Some(j) => {
                        let reduced =
                            -self.cost.get(i, j) + self.potential_a[i] - self.potential_b[j];
                        let next = dist + reduced.max(0.0);
                        if next < self.dist_b[j] {
                            self.dist_b[j] = next;
                            self.prev_b[j] = Some(i);
                            self.heap.push(Label { dist: next, node: j });
                        }
                    }
                    None => {
                        let reduced = self.potential_a[i] - self.potential_sink;
                        let next = dist + reduced.max(0.0);
                        if next < dist_sink {
                            dist_sink = next;
                            last = Some(i);
                        }
                    }
                }
            }
        }

        last.map(|i| (dist_sink, i))
    }

    /// Flip the matched and unmatched edges along the path ending in `last`.
    fn augment(&mut self, last: usize) {
        let mut i = last;
        loop {
            let j = self.prev_a[i];
            let previous = self.prev_b[j];
            self.mate_a[i] = Some(j);
            self.mate_b[j] = Some(i);
            match previous {
                Some(p) => i = p,
                None => break,
            }
        }
    }

    fn into_correspondence(self) -> Correspondence {
        Correspondence::from(self.mate_a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng};

    fn random_sequence(rng: &mut impl Rng, name: &str, n: usize, size: f64) -> PointSequence {
        let points = (0..n)
            .map(|_| {
                [
                    rng.random::<f64>() * size,
                    rng.random::<f64>() * size,
                    rng.random::<f64>() * size,
                ]
            })
            .collect();
        PointSequence::from_points(name, points)
    }

    // exhaustive minimum over all injective partial correspondences
    fn brute_force(cost: &CostMatrix, i: usize, used: &mut Vec<bool>) -> f64 {
        if i == cost.len_a() {
            return 0.0;
        }
        let mut best = brute_force(cost, i + 1, used);
        for j in 0..cost.len_b() {
            if !used[j] && cost.is_active(i, j) {
                used[j] = true;
                best = best.min(cost.get(i, j) + brute_force(cost, i + 1, used));
                used[j] = false;
            }
        }
        best
    }

    #[test]
    fn test_solve_simple() {
        let a = PointSequence::from_points("a", vec![[0.0, 0.0, 0.0], [5.0, 0.0, 0.0]]);
        let b = PointSequence::from_points("b", vec![[5.5, 0.0, 0.0], [0.5, 0.0, 0.0]]);
        let (correspondence, score) =
            solve_correspondence(&a, &b, &RigidTransform::identity(), 1.0);
        assert_eq!(correspondence.as_slice(), &[Some(1), Some(0)]);
        assert_relative_eq!(score, 2.0 * (0.25 - 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_solve_prefers_global_optimum() {
        // greedy would match a0 -> b0 and leave a1 without a partner
        let a = PointSequence::from_points("a", vec![[0.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        let b = PointSequence::from_points("b", vec![[0.9, 0.0, 0.0], [-1.0, 0.0, 0.0]]);
        let (correspondence, score) =
            solve_correspondence(&a, &b, &RigidTransform::identity(), 1.5);
        assert_eq!(correspondence.as_slice(), &[Some(1), Some(0)]);
        assert_relative_eq!(score, (1.0 - 2.25) + (1.21 - 2.25), epsilon = 1e-12);
    }

    #[test]
    fn test_solve_nothing_in_range() {
        let a = PointSequence::from_points("a", vec![[0.0, 0.0, 0.0]]);
        let b = PointSequence::from_points("b", vec![[10.0, 0.0, 0.0]]);
        let (correspondence, score) =
            solve_correspondence(&a, &b, &RigidTransform::identity(), 1.0);
        assert_eq!(correspondence.aligned_count(), 0);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_solve_matches_brute_force() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for trial in 0..40 {
            let len_a = 2 + trial % 5;
            let len_b = 2 + (trial * 3) % 5;
            let a = random_sequence(&mut rng, "a", len_a, 8.0);
            let b = random_sequence(&mut rng, "b", len_b, 8.0);
            let lambda = 2.0 + rng.random::<f64>() * 4.0;
            let transform = RigidTransform::identity();

            let (correspondence, score) = solve_correspondence(&a, &b, &transform, lambda);

            let cost = CostMatrix::new(&a, &b, &transform, lambda);
            let expected = brute_force(&cost, 0, &mut vec![false; len_b]);
            assert_relative_eq!(score, expected, epsilon = 1e-9);

            // the reported score is the cost of the returned correspondence
            assert!(correspondence.is_injective(len_b));
            let mut total = 0.0;
            for (i, j) in correspondence.matched_pairs() {
                assert!(cost.get(i, j) <= 0.0, "positive edge ({i}, {j}) selected");
                total += cost.get(i, j);
            }
            assert_relative_eq!(total, score, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_solve_uneven_lengths() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        let a = random_sequence(&mut rng, "a", 30, 10.0);
        let b = random_sequence(&mut rng, "b", 12, 10.0);
        let (correspondence, score) =
            solve_correspondence(&a, &b, &RigidTransform::identity(), 100.0);
        // every pair is active, so all of B gets used
        assert_eq!(correspondence.aligned_count(), 12);
        assert!(correspondence.is_injective(12));
        assert!(score < 0.0);
    }
}
