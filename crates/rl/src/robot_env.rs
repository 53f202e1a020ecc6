//! # Arm Environment
//!
//! [`ArmEnv`] wires the step engine, an obstacle field and the replay memory
//! into one episode. Everything random (start and goal poses, obstacle
//! spawns, memory sampling) draws from a single seeded generator owned by the
//! environment.

use crate::env::Env;
use crate::error::EnvError;
use crate::replay_buffer::{ReplayBuffer, Transition};
use physics::control::wrap_angle;
use physics::kinematics::proximity;
use physics::{
    replay, ArmSim, ControlMode, DriftingSphere, Dynamics, JointDynamics, Kinematics, Obstacle,
    ObstacleField, ObstacleTable, Observation, PhysicsError, Rollout, SerialArm, SimConfig,
    StepOutcome,
};
use planning::Vertex;
use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;

/// Retry limit for pose sampling and obstacle spawning.
pub const MAX_ATTEMPTS: usize = 1000;
/// Steps of a candidate obstacle's path checked against the start pose.
pub const SPAWN_LOOKAHEAD: usize = 30;
/// Minimum end effector height of a sampled pose.
pub const FLOOR_CLEARANCE: f64 = 0.05;

#[derive(Clone, Debug, PartialEq)]
pub struct EnvOptions {
    pub has_objects: bool,
    pub num_obj: usize,
    /// Random pose when `None`
    pub start: Option<Vec<f64>>,
    /// Random pose when `None`
    pub goal: Option<Vec<f64>>,
    pub batch_size: usize,
    pub seed: u64,
}

impl Default for EnvOptions {
    fn default() -> Self {
        Self {
            has_objects: true,
            num_obj: 3,
            start: None,
            goal: None,
            batch_size: 128,
            seed: 0,
        }
    }
}

#[derive(Debug)]
pub struct ArmEnv {
    sim: ArmSim,
    field: ObstacleField,
    memory: ReplayBuffer<Transition>,
    batch_size: usize,
    rng: fastrand::Rng,
}

impl ArmEnv {
    /// Environment around the default five-link arm.
    ///
    /// # Errors
    ///
    /// Fails on an invalid config, on explicit poses of the wrong length, or
    /// when no random pose clears the floor.
    pub fn new(config: SimConfig, options: EnvOptions) -> Result<Self, EnvError> {
        let arm = Arc::new(SerialArm::five_link());
        let oracle = Arc::new(JointDynamics::new(arm.clone(), &config));
        Self::with_models(config, arm, oracle, options)
    }

    /// # Errors
    ///
    /// See [`ArmEnv::new`].
    pub fn with_models(
        config: SimConfig,
        arm: Arc<dyn Kinematics>,
        oracle: Arc<dyn Dynamics>,
        options: EnvOptions,
    ) -> Result<Self, EnvError> {
        config.validate()?;
        let expected = arm.joint_count();
        for (what, pose) in [("start pose", &options.start), ("goal pose", &options.goal)] {
            if let Some(got) = pose.as_ref().map(Vec::len).filter(|&got| got != expected) {
                return Err(PhysicsError::JointCount { what, expected, got }.into());
            }
        }
        let rng = fastrand::Rng::with_seed(options.seed);

        let start_quadrant = rng.u8(0..4);
        let goal_quadrant = loop {
            let q = rng.u8(0..4);
            if q != start_quadrant {
                break q;
            }
        };
        let start = match options.start {
            Some(start) => start,
            None => random_pose(&rng, arm.as_ref(), &config, start_quadrant)?,
        };
        let goal = match options.goal {
            Some(goal) => goal,
            None => random_pose(&rng, arm.as_ref(), &config, goal_quadrant)?,
        };

        let field = if options.has_objects {
            spawn_obstacles(&rng, arm.as_ref(), &config, &start, options.num_obj)
        } else {
            ObstacleField::new()
        };

        let capacity = config.steps_ceiling().max(1);
        let sim = ArmSim::new(config, oracle, arm, start, goal)?;
        tracing::info!(
            start = ?sim.start(),
            goal = ?sim.goal(),
            obstacles = field.len(),
            seed = options.seed,
            "environment ready"
        );

        Ok(Self {
            sim,
            field,
            memory: ReplayBuffer::new(capacity),
            batch_size: options.batch_size,
            rng,
        })
    }

    /// Advance the live trajectory by one tick.
    ///
    /// # Errors
    ///
    /// Fails when an external action does not have one entry per joint.
    pub fn step(
        &mut self,
        action: Option<&[f64]>,
        mode: ControlMode,
        eval: bool,
    ) -> Result<StepOutcome, EnvError> {
        Ok(self.sim.step(&self.field, action, mode, eval)?)
    }

    #[must_use]
    pub fn observe(&self) -> Observation {
        self.sim.observe(&self.field)
    }

    /// Back to the start pose at step 0 with obstacles rewound and an empty
    /// memory.
    pub fn reset(&mut self) -> Observation {
        self.sim.reset();
        self.field.rewind();
        self.memory.clear();
        tracing::info!(obstacles = self.field.len(), "environment reset");
        self.observe()
    }

    /// Sample every obstacle up to the step ceiling, then rewind the field.
    pub fn obstacle_table(&mut self) -> ObstacleTable {
        let table = ObstacleTable::build(&mut self.field, self.sim.config().steps_ceiling());
        self.field.rewind();
        table
    }

    /// Bounded PD rollout from a stored vertex toward `goal`.
    ///
    /// # Errors
    ///
    /// [`PhysicsError::JointCount`] if the vertex or goal does not match the
    /// arm.
    pub fn replay_from(
        &self,
        vertex: &Vertex,
        goal: &[f64],
        table: &ObstacleTable,
        steps: usize,
    ) -> Result<Rollout, EnvError> {
        let expected = self.action_size();
        for (what, got) in [
            ("vertex pose", vertex.dims()),
            ("vertex velocity", vertex.w.len()),
            ("goal pose", goal.len()),
        ] {
            if got != expected {
                return Err(PhysicsError::JointCount { what, expected, got }.into());
            }
        }
        Ok(replay(
            self.sim.oracle().as_ref(),
            self.sim.config(),
            &vertex.state(),
            goal,
            table,
            steps,
        ))
    }

    pub fn store_transition(&mut self, transition: Transition) {
        self.memory.store(transition);
    }

    /// One batch of the configured size.
    ///
    /// # Errors
    ///
    /// [`BufferError::Underfilled`](crate::BufferError::Underfilled) until
    /// enough transitions are stored.
    pub fn sample_memory(&self) -> Result<Vec<&Transition>, EnvError> {
        Ok(self.memory.sample(self.batch_size, &self.rng)?)
    }

    #[must_use]
    pub fn sim(&self) -> &ArmSim {
        &self.sim
    }

    #[must_use]
    pub fn field(&self) -> &ObstacleField {
        &self.field
    }

    #[must_use]
    pub fn memory(&self) -> &ReplayBuffer<Transition> {
        &self.memory
    }

    #[must_use]
    pub fn config(&self) -> &SimConfig {
        self.sim.config()
    }

    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// The environment's generator, for callers that want to stay on the
    /// same seeded stream.
    #[must_use]
    pub fn rng(&self) -> &fastrand::Rng {
        &self.rng
    }
}

impl Env for ArmEnv {
    fn step(&mut self, action: &[f64]) -> Result<(Observation, f64, bool), EnvError> {
        let outcome = ArmEnv::step(self, Some(action), ControlMode::External, false)?;
        Ok((outcome.observation, outcome.reward, outcome.done))
    }

    fn reset(&mut self) -> Observation {
        ArmEnv::reset(self)
    }

    fn obs_size(&self) -> usize {
        self.field.len() + self.sim.arm().snapshot(self.sim.start(), 0).len()
    }

    fn action_size(&self) -> usize {
        self.sim.arm().joint_count()
    }
}

/// Base yaw of quadrant `quadrant` (0 to 3, counter-clockwise from +x);
/// every other joint uniform within `pose_range`. Retried until the end
/// effector clears the floor.
fn random_pose(
    rng: &fastrand::Rng,
    arm: &dyn Kinematics,
    config: &SimConfig,
    quadrant: u8,
) -> Result<Vec<f64>, EnvError> {
    for _ in 0..MAX_ATTEMPTS {
        let pose: Vec<f64> = (0..arm.joint_count())
            .map(|joint| {
                if joint == 0 {
                    wrap_angle((f64::from(quadrant) + rng.f64()) * FRAC_PI_2)
                } else {
                    (rng.f64() * 2.0 - 1.0) * config.pose_range
                }
            })
            .collect();
        if arm.end_effector(&pose).z > FLOOR_CLEARANCE {
            return Ok(pose);
        }
    }
    Err(EnvError::PoseSampling {
        attempts: MAX_ATTEMPTS,
    })
}

/// Up to `count` random spheres whose first [`SPAWN_LOOKAHEAD`] steps stay
/// clear of the arm at `start`.
fn spawn_obstacles(
    rng: &fastrand::Rng,
    arm: &dyn Kinematics,
    config: &SimConfig,
    start: &[f64],
    count: usize,
) -> ObstacleField {
    let mut field = ObstacleField::new();
    let mut attempts = 0;
    while field.len() < count && attempts < MAX_ATTEMPTS {
        attempts += 1;
        let candidate = DriftingSphere::random(rng, config);
        let clearance = (0..SPAWN_LOOKAHEAD)
            .map(|step| proximity(arm, start, &[candidate.path(step)], candidate.radius()))
            .fold(f64::INFINITY, f64::min);
        if clearance > config.min_prox {
            field.push(candidate);
        }
    }
    if field.len() < count {
        tracing::warn!(
            spawned = field.len(),
            requested = count,
            attempts,
            "obstacle spawning gave up"
        );
    } else {
        tracing::debug!(spawned = field.len(), attempts, "obstacles spawned");
    }
    field
}
