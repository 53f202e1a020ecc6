use physics::{
    replay, Dynamics, JointDynamics, NextState, ObstacleTable, RobotState, SerialArm, SimConfig,
    Termination, Vec3,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Wraps the reference oracle and counts how often it is called.
struct CountingOracle {
    inner: JointDynamics,
    calls: AtomicUsize,
}

impl CountingOracle {
    fn new(config: &SimConfig) -> Self {
        let arm = Arc::new(SerialArm::new(vec![0.3, 0.4], 0.04));
        Self {
            inner: JointDynamics::new(arm, config),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Dynamics for CountingOracle {
    fn joint_count(&self) -> usize {
        self.inner.joint_count()
    }

    fn next_state(&self, obstacles: &[Vec3], th: &[f64], w: &[f64], tau: &[f64]) -> NextState {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.inner.next_state(obstacles, th, w, tau)
    }

    fn proximity(&self, obstacles: &[Vec3], th: &[f64]) -> f64 {
        self.inner.proximity(obstacles, th)
    }
}

const FAR: Vec3 = Vec3::new(10.0, 10.0, 10.0);
/// Midpoint of the second link of the two-joint arm at pose [0, 0].
const ON_ARM: Vec3 = Vec3::new(0.2, 0.0, 0.3);

#[test]
fn expired_start_returns_sentinel_without_simulating() {
    let config = SimConfig::default();
    let oracle = CountingOracle::new(&config);
    let ceiling = config.steps_ceiling();
    let table = ObstacleTable::empty(ceiling);
    let start = RobotState {
        th: vec![0.1, 0.2],
        w: vec![0.0, 0.0],
        t: ceiling,
    };

    let rollout = replay(&oracle, &config, &start, &[1.0, 1.0], &table, 10);

    assert_eq!(rollout.score, f64::NEG_INFINITY);
    assert!(rollout.expired());
    assert!(!rollout.collision_free);
    assert_eq!(rollout.end_step, ceiling);
    assert_eq!(rollout.pose, start.th);
    assert_eq!(oracle.calls(), 0);
}

#[test]
fn replay_is_deterministic() {
    let config = SimConfig::default();
    let oracle = CountingOracle::new(&config);
    let rows = (0..config.steps_ceiling())
        .map(|t| vec![Vec3::new(0.5, 0.5, 0.01 * t as f64)])
        .collect();
    let table = ObstacleTable::from_rows(rows).unwrap();
    let start = RobotState {
        th: vec![0.3, -0.4],
        w: vec![0.1, 0.0],
        t: 7,
    };

    let a = replay(&oracle, &config, &start, &[-0.5, 0.6], &table, 40);
    let b = replay(&oracle, &config, &start, &[-0.5, 0.6], &table, 40);
    assert_eq!(a, b);
}

#[test]
fn budget_bounds_the_rollout() {
    let config = SimConfig::default();
    let oracle = CountingOracle::new(&config);
    let table = ObstacleTable::empty(config.steps_ceiling());
    let start = RobotState {
        th: vec![0.0, 0.0],
        w: vec![0.0, 0.0],
        t: 20,
    };

    let rollout = replay(&oracle, &config, &start, &[2.0, 2.0], &table, 5);

    assert_eq!(rollout.end_step, 25);
    assert_eq!(rollout.score, -5.0);
    assert_eq!(rollout.termination, None);
    assert!(rollout.collision_free);
    assert_eq!(oracle.calls(), 5);
}

#[test]
fn rollout_stops_at_step_ceiling() {
    let config = SimConfig {
        dt: 0.1,
        t_limit: 1.0,
        ..SimConfig::default()
    };
    let oracle = CountingOracle::new(&config);
    let table = ObstacleTable::empty(config.steps_ceiling());
    let start = RobotState {
        th: vec![0.0, 0.0],
        w: vec![0.0, 0.0],
        t: 8,
    };

    let rollout = replay(&oracle, &config, &start, &[2.0, 2.0], &table, 5);

    assert_eq!(rollout.end_step, 10);
    assert_eq!(rollout.score, -2.0);
    assert_eq!(rollout.termination, Some(Termination::TimeLimit));
    assert!(rollout.collision_free);
}

#[test]
fn rollout_never_reads_past_the_table() {
    let config = SimConfig::default();
    let oracle = CountingOracle::new(&config);
    let table = ObstacleTable::empty(4);
    let start = RobotState::at_rest(vec![0.0, 0.0]);

    let rollout = replay(&oracle, &config, &start, &[2.0, 2.0], &table, 10);

    assert_eq!(rollout.end_step, 4);
    assert_eq!(oracle.calls(), 4);
}

#[test]
fn collision_clears_flag_at_first_violation() {
    let config = SimConfig::default();
    let oracle = CountingOracle::new(&config);
    let mut rows = vec![vec![FAR], vec![FAR]];
    rows.extend((2..config.steps_ceiling()).map(|_| vec![ON_ARM]));
    let table = ObstacleTable::from_rows(rows).unwrap();
    let start = RobotState::at_rest(vec![0.0, 0.0]);

    let rollout = replay(&oracle, &config, &start, &[0.0, 0.5], &table, 50);

    assert!(!rollout.collision_free);
    assert_eq!(rollout.termination, Some(Termination::Collision));
    // the obstacle row for step 2 is seen by the tick that ends on step 3
    assert_eq!(rollout.end_step, 3);
    assert_eq!(rollout.score, -3.0);
}

#[test]
fn time_limit_outranks_collision_on_the_last_tick() {
    let config = SimConfig {
        dt: 0.1,
        t_limit: 1.0,
        ..SimConfig::default()
    };
    let oracle = CountingOracle::new(&config);
    let mut rows = vec![vec![FAR]; 9];
    rows.push(vec![ON_ARM]);
    let table = ObstacleTable::from_rows(rows).unwrap();
    let start = RobotState {
        th: vec![0.0, 0.0],
        w: vec![0.0, 0.0],
        t: 9,
    };

    let rollout = replay(&oracle, &config, &start, &[0.0, 0.5], &table, 5);

    assert!(oracle.proximity(&[ON_ARM], &rollout.pose) < config.min_prox);
    assert_eq!(rollout.termination, Some(Termination::TimeLimit));
    assert!(rollout.collision_free);
    assert_eq!(rollout.end_step, 10);
}

#[test]
fn goal_outranks_collision_on_the_same_tick() {
    let config = SimConfig::default();
    let oracle = CountingOracle::new(&config);
    let rows = (0..config.steps_ceiling()).map(|_| vec![ON_ARM]).collect();
    let table = ObstacleTable::from_rows(rows).unwrap();
    let start = RobotState::at_rest(vec![0.0, 0.0]);

    let rollout = replay(&oracle, &config, &start, &[0.01, 0.01], &table, 10);

    assert!(oracle.proximity(&[ON_ARM], &rollout.pose) < config.min_prox);
    assert!(rollout.reached_goal());
    assert!(rollout.collision_free);
    assert_eq!(rollout.end_step, 1);
}

#[test]
fn start_past_the_table_is_expired() {
    let config = SimConfig::default();
    let oracle = CountingOracle::new(&config);
    let table = ObstacleTable::empty(4);
    let start = RobotState {
        th: vec![0.0, 0.0],
        w: vec![0.0, 0.0],
        t: 4,
    };

    let rollout = replay(&oracle, &config, &start, &[1.0, 1.0], &table, 10);

    assert!(rollout.expired());
    assert!(!rollout.collision_free);
    assert_eq!(rollout.end_step, 4);
    assert_eq!(oracle.calls(), 0);
}

#[test]
fn mismatched_goal_is_rejected_without_simulating() {
    let config = SimConfig::default();
    let oracle = CountingOracle::new(&config);
    let table = ObstacleTable::empty(config.steps_ceiling());
    let start = RobotState::at_rest(vec![0.0, 0.0]);

    let rollout = replay(&oracle, &config, &start, &[1.0], &table, 10);

    assert!(rollout.expired());
    assert_eq!(rollout.pose, start.th);
    assert_eq!(oracle.calls(), 0);
}

#[test]
fn goal_check_ignores_velocity() {
    let config = SimConfig::default();
    let oracle = CountingOracle::new(&config);
    let table = ObstacleTable::empty(config.steps_ceiling());
    let start = RobotState {
        th: vec![0.0, 0.0],
        w: vec![0.5, 0.5],
        t: 0,
    };

    let rollout = replay(&oracle, &config, &start, &[0.01, 0.01], &table, 10);

    assert!(rollout.reached_goal());
    assert_eq!(rollout.end_step, 1);
    assert_eq!(rollout.score, -1.0);
    assert!(rollout.collision_free);
    assert!(rollout.velocity.iter().all(|w| w.abs() > config.vel_thres));
}

#[test]
fn parallel_rollouts_match_sequential_ones() {
    let config = SimConfig::default();
    let arm = Arc::new(SerialArm::five_link());
    let oracle = JointDynamics::new(arm, &config);
    let rows = (0..config.steps_ceiling())
        .map(|t| vec![Vec3::new(0.6, -0.2 + 0.002 * t as f64, 0.4), FAR])
        .collect();
    let table = ObstacleTable::from_rows(rows).unwrap();
    let start = RobotState::at_rest(vec![0.0, 0.3, -0.2, 0.1, 0.0]);
    let goals: Vec<Vec<f64>> = (0..4_i32)
        .map(|i| vec![0.2 * f64::from(i), -0.3, 0.5, -0.1, 0.2])
        .collect();

    let sequential: Vec<_> = goals
        .iter()
        .map(|goal| replay(&oracle, &config, &start, goal, &table, 60))
        .collect();

    let parallel: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = goals
            .iter()
            .map(|goal| {
                let (oracle, config, start, table) = (&oracle, &config, &start, &table);
                scope.spawn(move || replay(oracle, config, start, goal, table, 60))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, parallel);
}
