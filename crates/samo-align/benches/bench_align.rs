use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use samo_align::{align, solve_correspondence, AlignConfig, PointSequence, RigidTransform};

// a CA-like trace: helix with a slow drift so that distant parts stay apart
fn backbone(name: &str, n: usize, phase: f64) -> PointSequence {
    let points = (0..n)
        .map(|i| {
            let t = i as f64 * 1.75 + phase;
            [
                2.3 * t.cos() + 0.05 * i as f64,
                2.3 * t.sin(),
                1.5 * i as f64,
            ]
        })
        .collect();
    PointSequence::from_points(name, points)
}

fn bench_solve_correspondence(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve_correspondence");

    for num_points in [50, 200, 800].iter() {
        group.throughput(criterion::Throughput::Elements(*num_points as u64));
        let parameter_string = format!("{}", num_points);

        let a = backbone("a", *num_points, 0.0);
        let b = backbone("b", *num_points, 0.3);
        let transform = RigidTransform::identity();

        group.bench_with_input(
            BenchmarkId::new("solve_correspondence", &parameter_string),
            &(&a, &b),
            |bencher, (a, b)| {
                bencher.iter(|| {
                    let (correspondence, score) = solve_correspondence(a, b, &transform, 6.0);
                    black_box((correspondence, score));
                });
            },
        );
    }
}

fn bench_align(c: &mut Criterion) {
    let mut group = c.benchmark_group("align");
    group.sample_size(10);

    for num_points in [50, 200].iter() {
        let parameter_string = format!("{}", num_points);

        let a = backbone("a", *num_points, 0.0);
        let b = backbone("b", *num_points + 10, 0.3);

        for level in [0usize, 2] {
            let config = AlignConfig {
                heuristic_start_level: level,
                ..Default::default()
            };
            group.bench_with_input(
                BenchmarkId::new(format!("align_level{}", level), &parameter_string),
                &(&a, &b),
                |bencher, (a, b)| {
                    bencher.iter(|| {
                        let result = align(a, b, &config);
                        black_box(result.is_ok());
                    });
                },
            );
        }
    }
}

criterion_group!(benches, bench_solve_correspondence, bench_align);
criterion_main!(benches);
