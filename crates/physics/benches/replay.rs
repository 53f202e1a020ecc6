use criterion::{criterion_group, criterion_main, Criterion};
use physics::{replay, DriftingSphere, JointDynamics, ObstacleField, ObstacleTable, RobotState, SerialArm, SimConfig};
use std::hint::black_box;
use std::sync::Arc;

fn bench_replay(c: &mut Criterion) {
    let config = SimConfig::default();
    let arm = Arc::new(SerialArm::five_link());
    let oracle = JointDynamics::new(arm, &config);

    let rng = fastrand::Rng::with_seed(11);
    let mut field = ObstacleField::new();
    for _ in 0..3 {
        field.push(DriftingSphere::random(&rng, &config));
    }
    let table = ObstacleTable::build(&mut field, config.steps_ceiling());
    let start = RobotState::at_rest(vec![0.0, 0.4, -0.3, 0.2, 0.0]);
    let goal = [1.2, -0.2, 0.6, -0.4, 0.3];

    c.bench_function("replay_50_steps", |b| {
        b.iter(|| replay(&oracle, &config, black_box(&start), black_box(&goal), &table, 50));
    });
}

criterion_group!(benches, bench_replay);
criterion_main!(benches);
