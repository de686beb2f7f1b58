//! End-to-end scenarios of the pairwise and multiple alignment engine.

use approx::assert_relative_eq;
use rand::{Rng, SeedableRng};

use samo_align::{
    align, AlignConfig, AlignmentResult, Correspondence, MultiAlign, PairAlign, PointSequence,
    RigidTransform, Solution,
};
use samo_linalg::linalg::is_rotation_matrix;

// six points without any symmetry, all pairwise distances above 7
fn asymmetric() -> PointSequence {
    PointSequence::from_points(
        "asymmetric",
        vec![
            [0.0, 0.0, 0.0],
            [7.0, 0.0, 0.0],
            [7.5, 8.0, 0.0],
            [1.0, 9.0, 2.0],
            [3.0, 4.0, 10.0],
            [12.0, 6.0, 5.0],
        ],
    )
}

fn helix(name: &str, n: usize) -> PointSequence {
    PointSequence::from_points(
        name,
        (0..n)
            .map(|i| {
                let t = i as f64 * 1.75;
                [2.3 * t.cos() + 0.1 * i as f64, 2.3 * t.sin(), 1.5 * i as f64]
            })
            .collect(),
    )
}

fn moved(seq: &PointSequence, name: &str, transform: &RigidTransform) -> PointSequence {
    PointSequence::from_points(name, transform.apply_all(seq.points()))
}

#[test]
fn identical_translated_sequences() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    let points: Vec<[f64; 3]> = (0..20)
        .map(|_| {
            [
                rng.random::<f64>() * 30.0,
                rng.random::<f64>() * 30.0,
                rng.random::<f64>() * 30.0,
            ]
        })
        .collect();
    let a = PointSequence::from_points("a", points);
    let offset = RigidTransform::new(RigidTransform::identity().rotation, [5.0, -3.0, 12.0]);
    let b = moved(&a, "b", &offset);

    let config = AlignConfig {
        lambda: 100.0,
        ..Default::default()
    };
    let result = align(&a, &b, &config)?;

    assert_eq!(result.correspondence, Correspondence::identity(20, 20));
    assert_eq!(result.aligned_count, 20);
    assert!(result.rmsd < 1e-6);
    assert!(is_rotation_matrix(&result.transform.rotation, 1e-6));
    for k in 0..3 {
        assert_relative_eq!(
            result.transform.translation[k],
            offset.translation[k],
            epsilon = 1e-6
        );
    }
    Ok(())
}

#[test]
fn rotated_helix_is_recovered() -> Result<(), Box<dyn std::error::Error>> {
    let a = helix("a", 40);
    let transform = RigidTransform::from_axis_angle(&[1.0, 0.5, -0.2], 0.6, [10.0, 4.0, -7.0])
        .ok_or("zero rotation axis")?;
    let b = moved(&a, "b", &transform);

    for annealing_enabled in [false, true] {
        let config = AlignConfig {
            annealing_enabled,
            ..Default::default()
        };
        let result = align(&a, &b, &config)?;
        assert_eq!(result.aligned_count, 40);
        assert!(result.rmsd < 1e-6);
        assert_eq!(result.break_count, 0);
        assert_eq!(result.permutation_count, 0);
        assert!(is_rotation_matrix(&result.transform.rotation, 1e-6));
    }
    Ok(())
}

#[test]
fn reversed_sequence_with_and_without_order() -> Result<(), Box<dyn std::error::Error>> {
    let a = asymmetric();
    let b = PointSequence::from_points("reversed", a.points().iter().rev().copied().collect());
    let n = a.len();

    let config = AlignConfig {
        lambda: 3.0,
        use_branch_and_bound: true,
        ..Default::default()
    };
    let free = align(&a, &b, &config)?;
    assert_eq!(free.aligned_count, n);
    assert!(free.rmsd < 1e-6);
    assert_eq!(free.permutation_count, n - 1);

    let ordered_config = AlignConfig {
        enforce_sequential_order: true,
        ..config
    };
    let ordered = align(&a, &b, &ordered_config)?;
    assert!(ordered.aligned_count < n);
    assert_eq!(ordered.permutation_count, 0);
    let matched: Vec<usize> = ordered.correspondence.matched_pairs().map(|(_, j)| j).collect();
    assert!(matched.windows(2).all(|w| w[0] < w[1]));
    Ok(())
}

#[test]
fn reversed_sequence_on_local_search_paths() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(25);
    let mut cases = vec![asymmetric()];
    for k in 0..10 {
        let points = (0..25)
            .map(|_| {
                [
                    rng.random::<f64>() * 30.0,
                    rng.random::<f64>() * 30.0,
                    rng.random::<f64>() * 30.0,
                ]
            })
            .collect();
        cases.push(PointSequence::from_points(format!("random{}", k), points));
    }

    for a in &cases {
        let b = PointSequence::from_points("reversed", a.points().iter().rev().copied().collect());
        for annealing_enabled in [false, true] {
            for heuristic_start_level in [0, 2] {
                let config = AlignConfig {
                    annealing_enabled,
                    heuristic_start_level,
                    ..Default::default()
                };
                let result = align(a, &b, &config)?;
                assert!(result.correspondence.is_injective(b.len()));
                assert!(result.score <= 0.0);
                assert!(is_rotation_matrix(&result.transform.rotation, 1e-6));
            }
        }
    }
    Ok(())
}

#[test]
fn exact_search_never_loses_to_local_search() -> Result<(), Box<dyn std::error::Error>> {
    let a = asymmetric();
    // drop one point and distort the rest a little
    let b = PointSequence::from_points(
        "distorted",
        a.points()[1..]
            .iter()
            .enumerate()
            .map(|(k, p)| [p[0] + 0.4 * (k as f64).sin(), p[1] - 0.3, p[2] + 0.2 * k as f64])
            .collect(),
    );

    let local_config = AlignConfig {
        lambda: 4.0,
        heuristic_start_level: 2,
        ..Default::default()
    };
    let exact_config = AlignConfig {
        use_branch_and_bound: true,
        ..local_config.clone()
    };

    let local = PairAlign::new(&a, &b, local_config).solve()?;
    let exact = PairAlign::new(&a, &b, exact_config).solve()?;
    assert!(exact.score <= local.score + 1e-9);
    Ok(())
}

#[test]
fn stored_solution_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let a = helix("a", 30);
    let transform = RigidTransform::from_axis_angle(&[0.0, 0.0, 1.0], 0.3, [1.0, 2.0, 3.0])
        .ok_or("zero rotation axis")?;
    let b = PointSequence::from_points("b", transform.apply_all(&a.points()[3..27]));

    let pair = PairAlign::new(&a, &b, AlignConfig::default());
    let result = pair.align()?;
    let evaluated = pair.evaluate(&Solution::from_result(&result))?;

    assert_eq!(evaluated.aligned_count, result.aligned_count);
    assert_relative_eq!(evaluated.rmsd, result.rmsd, epsilon = 1e-9);
    assert_eq!(evaluated.correspondence, result.correspondence);
    Ok(())
}

#[test]
fn improve_from_transform_only() -> Result<(), Box<dyn std::error::Error>> {
    let a = helix("a", 25);
    let b = moved(
        &a,
        "b",
        &RigidTransform::new(RigidTransform::identity().rotation, [0.8, -0.6, 0.4]),
    );
    let pair = PairAlign::new(&a, &b, AlignConfig::default());

    // the identity transform is close enough to find most of the pairs
    let solution = Solution {
        translation: Some([0.0; 3]),
        rotation: Some(RigidTransform::identity().rotation),
        ..Default::default()
    };
    let evaluated = pair.evaluate(&solution)?;
    assert!(evaluated.rmsd > 0.5);

    let improved = pair.improve(&solution)?;
    assert_eq!(improved.aligned_count, 25);
    assert!(improved.rmsd < 1e-6);
    Ok(())
}

#[test]
fn consensus_of_shifted_copies() -> Result<(), Box<dyn std::error::Error>> {
    let base = helix("base", 20);
    let chains: Vec<PointSequence> = [[0.0, 0.0, 0.0], [4.0, 1.0, -2.0], [-3.0, 2.0, 5.0]]
        .iter()
        .enumerate()
        .map(|(k, shift)| {
            moved(
                &base,
                &format!("chain{}", k),
                &RigidTransform::new(RigidTransform::identity().rotation, *shift),
            )
        })
        .collect();

    let result = MultiAlign::new(&chains, AlignConfig::default())
        .with_rounds(2)
        .align()?;
    assert_eq!(result.results.len(), 3);
    assert_relative_eq!(result.mean_aligned, 20.0);
    assert!(result.mean_rmsd < 1e-6);
    assert!(result
        .results
        .iter()
        .all(|r: &AlignmentResult| r.correspondence == Correspondence::identity(20, 20)));
    Ok(())
}
