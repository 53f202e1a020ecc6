//! # Replay Rollouts
//!
//! [`replay`] re-simulates the arm from a stored state toward a target under
//! PD control, reading obstacle positions from a precomputed
//! [`ObstacleTable`]. It touches no shared state, so planners can evaluate
//! many candidate edges at once against one table.

use crate::config::SimConfig;
use crate::control::{error_rate, joint_error, pd_control, within_band};
use crate::integrator::Dynamics;
use crate::obstacle_table::ObstacleTable;
use crate::simulation::{Termination, STEP_PENALTY};
use crate::types::RobotState;

/// Outcome of a bounded rollout.
#[derive(Clone, Debug, PartialEq)]
pub struct Rollout {
    pub pose: Vec<f64>,
    pub velocity: Vec<f64>,
    /// Sum of step penalties, `-inf` when the start could not be simulated
    pub score: f64,
    pub end_step: usize,
    /// False on collision or on a start that could not be simulated
    pub collision_free: bool,
    /// Last torque applied, zero if no step ran
    pub control: Vec<f64>,
    /// `None` when the step budget ran out or the start had expired
    pub termination: Option<Termination>,
}

impl Rollout {
    /// True when no step ran because the start was unusable: its step was at
    /// or past the episode end or the end of the table, or its shape did not
    /// match `goal`.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.score == f64::NEG_INFINITY
    }

    #[must_use]
    pub fn reached_goal(&self) -> bool {
        self.termination == Some(Termination::GoalReached)
    }
}

/// Simulate at most `max_steps` ticks from `start` toward `goal`.
///
/// Each tick computes the PD torque, looks up the obstacles at the current
/// step, calls the oracle, advances the step and scores -1. The rollout then
/// stops on the first of: time limit, every joint error inside the tolerance
/// band (velocity is not checked), proximity below `min_prox` (which clears
/// `collision_free`). It never runs past `start.t + max_steps`, the episode
/// step ceiling, or the end of the table.
///
/// A start at or past the ceiling, a start with no table row left, and a
/// `goal` or velocity whose length differs from the pose all return the
/// [expired](Rollout::expired) sentinel without calling the oracle.
#[must_use]
pub fn replay(
    oracle: &dyn Dynamics,
    config: &SimConfig,
    start: &RobotState,
    goal: &[f64],
    table: &ObstacleTable,
    max_steps: usize,
) -> Rollout {
    let ceiling = config.steps_ceiling();

    let mut rollout = Rollout {
        pose: start.th.clone(),
        velocity: start.w.clone(),
        score: 0.0,
        end_step: start.t,
        collision_free: true,
        control: vec![0.0; start.th.len()],
        termination: None,
    };

    let joints = start.th.len();
    if goal.len() != joints || start.w.len() != joints {
        tracing::warn!(
            joints,
            goal = goal.len(),
            velocity = start.w.len(),
            "replay shape mismatch"
        );
        rollout.score = f64::NEG_INFINITY;
        rollout.collision_free = false;
        return rollout;
    }
    if start.t >= ceiling || start.t >= table.len() {
        tracing::trace!(start = start.t, ceiling, table = table.len(), "replay start expired");
        rollout.score = f64::NEG_INFINITY;
        rollout.collision_free = false;
        return rollout;
    }

    let stop = start.t.saturating_add(max_steps).min(ceiling).min(table.len());
    let mut t = start.t;
    let mut err = joint_error(&rollout.pose, goal);
    let mut dedt = error_rate(&rollout.velocity);

    while t < stop {
        let Some(obstacles) = table.at(t) else { break };
        let tau = pd_control(&err, &dedt, config);
        let next = oracle.next_state(obstacles, &rollout.pose, &rollout.velocity, &tau);

        t += 1;
        err = joint_error(&next.th, goal);
        dedt = error_rate(&next.w);
        rollout.pose = next.th;
        rollout.velocity = next.w;
        rollout.control = tau;
        rollout.score += STEP_PENALTY;

        if t >= ceiling {
            rollout.termination = Some(Termination::TimeLimit);
        } else if within_band(&err, config.thres) {
            rollout.termination = Some(Termination::GoalReached);
        } else if next.proximity < config.min_prox {
            rollout.termination = Some(Termination::Collision);
            rollout.collision_free = false;
        }
        if rollout.termination.is_some() {
            break;
        }
    }

    rollout.end_step = t;
    tracing::trace!(
        start = start.t,
        end = t,
        score = rollout.score,
        termination = ?rollout.termination,
        "replay finished"
    );
    rollout
}
