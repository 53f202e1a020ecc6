//! # Step Engine
//!
//! [`ArmSim`] owns one live trajectory of the arm: pose, velocity, step index,
//! and the joint error against a fixed goal. Each call to [`ArmSim::step`]
//! applies one control input, asks the dynamics oracle for the next state,
//! and decides whether the episode is over.
//!
//! Termination on the live path is time limit or goal reached (pose AND
//! velocity inside their tolerance bands). Proximity is reported in
//! [`StepInfo`] but a collision does not end the episode here; only replay
//! rollouts stop on collision.
//!
//! Once the step ceiling is reached the engine is expired: further steps
//! return a `-inf` reward with `done` set and leave the state alone.

use crate::config::SimConfig;
use crate::control::{error_rate, joint_error, pd_control, within_band};
use crate::error::PhysicsError;
use crate::integrator::Dynamics;
use crate::kinematics::Kinematics;
use crate::obstacle::ObstacleField;
use crate::types::{Observation, RobotState, Vec3};
use std::sync::Arc;

/// Reward for every tick.
pub const STEP_PENALTY: f64 = -1.0;
/// Added once, on the tick the goal is reached.
pub const GOAL_BONUS: f64 = 10.0;

/// Where the control input of a step comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlMode {
    /// Torque supplied by the caller
    External,
    /// PD law on the stored joint error and its derivative
    Pid,
}

/// Why a trajectory ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    TimeLimit,
    GoalReached,
    Collision,
}

/// Diagnostics of a single step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepInfo {
    /// Torque handed to the oracle
    pub action: Vec<f64>,
    /// Clearance to the nearest obstacle after the step
    pub proximity: f64,
    /// Obstacle centers the oracle saw
    pub obstacles: Vec<Vec3>,
    /// Obstacle centers one step later
    pub next_obstacles: Vec<Vec3>,
    pub termination: Option<Termination>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    pub observation: Observation,
    pub reward: f64,
    pub done: bool,
    pub info: StepInfo,
}

/// Live trajectory driver.
pub struct ArmSim {
    config: SimConfig,
    oracle: Arc<dyn Dynamics>,
    arm: Arc<dyn Kinematics>,
    start: Vec<f64>,
    goal: Vec<f64>,
    state: RobotState,
    joint_error: Vec<f64>,
    error_rate: Vec<f64>,
}

impl ArmSim {
    /// Create an engine at rest in `start`, heading for `goal`.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::JointCount`] if the oracle, `start` or `goal`
    /// disagree with the arm's joint count.
    pub fn new(
        config: SimConfig,
        oracle: Arc<dyn Dynamics>,
        arm: Arc<dyn Kinematics>,
        start: Vec<f64>,
        goal: Vec<f64>,
    ) -> Result<Self, PhysicsError> {
        let expected = arm.joint_count();
        for (what, got) in [
            ("oracle", oracle.joint_count()),
            ("start pose", start.len()),
            ("goal pose", goal.len()),
        ] {
            if got != expected {
                return Err(PhysicsError::JointCount { what, expected, got });
            }
        }

        let joint_error = joint_error(&start, &goal);
        let error_rate = vec![0.0; expected];
        Ok(Self {
            config,
            oracle,
            arm,
            state: RobotState::at_rest(start.clone()),
            start,
            goal,
            joint_error,
            error_rate,
        })
    }

    /// Advance the trajectory by one tick.
    ///
    /// `action` is only read in [`ControlMode::External`]. With `eval` set
    /// the scene geometry is skipped and the observation carries only the
    /// joint error and its derivative.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidActionShape`] when an external action
    /// is missing or does not have one component per joint. The engine state
    /// is left untouched in that case.
    pub fn step(
        &mut self,
        field: &ObstacleField,
        action: Option<&[f64]>,
        mode: ControlMode,
        eval: bool,
    ) -> Result<StepOutcome, PhysicsError> {
        let t = self.state.t;
        let obstacles = field.positions_at(t);
        let next_obstacles = field.positions_at(t + 1);

        if self.expired() {
            tracing::trace!(step = t, "step on an expired episode");
            return Ok(StepOutcome {
                observation: self.observation(field, eval),
                reward: f64::NEG_INFINITY,
                done: true,
                info: StepInfo {
                    action: vec![0.0; self.state.joint_count()],
                    proximity: self.oracle.proximity(&obstacles, &self.state.th),
                    obstacles,
                    next_obstacles,
                    termination: Some(Termination::TimeLimit),
                },
            });
        }

        let control = match mode {
            ControlMode::Pid => pd_control(&self.joint_error, &self.error_rate, &self.config),
            ControlMode::External => {
                let expected = self.state.joint_count();
                let action = action.ok_or(PhysicsError::InvalidActionShape { expected, got: 0 })?;
                if action.len() != expected {
                    return Err(PhysicsError::InvalidActionShape {
                        expected,
                        got: action.len(),
                    });
                }
                action.to_vec()
            }
        };

        let next = self
            .oracle
            .next_state(&obstacles, &self.state.th, &self.state.w, &control);

        self.state.t += 1;
        let err = joint_error(&next.th, &self.goal);

        let mut reward = STEP_PENALTY;
        let termination = if self.state.t >= self.config.steps_ceiling() {
            Some(Termination::TimeLimit)
        } else if within_band(&err, self.config.thres) && within_band(&next.w, self.config.vel_thres) {
            reward += GOAL_BONUS;
            Some(Termination::GoalReached)
        } else {
            None
        };
        if let Some(reason) = termination {
            tracing::debug!(step = self.state.t, ?reason, "episode terminated");
        }

        self.error_rate = error_rate(&next.w);
        self.joint_error = err;
        self.state.th = next.th;
        self.state.w = next.w;

        Ok(StepOutcome {
            observation: self.observation(field, eval),
            reward,
            done: termination.is_some(),
            info: StepInfo {
                action: control,
                proximity: next.proximity,
                obstacles,
                next_obstacles,
                termination,
            },
        })
    }

    /// Full observation of the current state: obstacle geometry followed by
    /// the arm's own geometry, then joint error and its derivative.
    #[must_use]
    pub fn observe(&self, field: &ObstacleField) -> Observation {
        let mut scene = field.snapshot(self.state.t);
        scene.append(self.arm.snapshot(&self.state.th, self.state.t));
        Observation::from_scene(scene, self.joint_error.clone(), self.error_rate.clone())
    }

    /// True once the step index has reached the episode's step ceiling.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.state.t >= self.config.steps_ceiling()
    }

    fn observation(&self, field: &ObstacleField, eval: bool) -> Observation {
        if eval {
            Observation {
                joint_error: self.joint_error.clone(),
                error_rate: self.error_rate.clone(),
                ..Observation::default()
            }
        } else {
            self.observe(field)
        }
    }

    /// Back to rest in the start pose at step 0.
    pub fn reset(&mut self) {
        self.state = RobotState::at_rest(self.start.clone());
        self.joint_error = joint_error(&self.state.th, &self.goal);
        self.error_rate = error_rate(&self.state.w);
    }

    #[must_use]
    pub fn state(&self) -> &RobotState {
        &self.state
    }

    #[must_use]
    pub fn start(&self) -> &[f64] {
        &self.start
    }

    #[must_use]
    pub fn goal(&self) -> &[f64] {
        &self.goal
    }

    #[must_use]
    pub fn joint_error(&self) -> &[f64] {
        &self.joint_error
    }

    #[must_use]
    pub fn error_rate(&self) -> &[f64] {
        &self.error_rate
    }

    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[must_use]
    pub fn oracle(&self) -> &Arc<dyn Dynamics> {
        &self.oracle
    }

    #[must_use]
    pub fn arm(&self) -> &Arc<dyn Kinematics> {
        &self.arm
    }
}

impl std::fmt::Debug for ArmSim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmSim")
            .field("state", &self.state)
            .field("goal", &self.goal)
            .field("joint_error", &self.joint_error)
            .finish_non_exhaustive()
    }
}
