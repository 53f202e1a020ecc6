//! Rapidly-exploring random tree search in joint space.
//!
//! Every edge is the result of a bounded [`replay`] from an existing vertex
//! toward a sampled pose, so the tree only ever holds states the arm can
//! actually reach without touching an obstacle.

use crate::error::TreeError;
use crate::tree::Tree;
use crate::vertex::{Vertex, VertexId};
use physics::control::{joint_error, within_band};
use physics::{replay, Dynamics, ObstacleTable, SimConfig};
use std::f64::consts::PI;

#[derive(Clone, Debug, PartialEq)]
pub struct RrtConfig {
    /// Replay budget for a single edge
    pub steps_per_edge: usize,
    /// Probability of steering straight at the goal
    pub goal_bias: f64,
    pub max_iterations: usize,
}

impl Default for RrtConfig {
    fn default() -> Self {
        Self {
            steps_per_edge: 25,
            goal_bias: 0.1,
            max_iterations: 500,
        }
    }
}

/// Result of one extension attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extension {
    Added(VertexId),
    /// Added, and the new vertex is within tolerance of the goal
    Reached(VertexId),
    /// Rollout collided, expired or made no progress
    Rejected,
}

pub struct Rrt<'a> {
    oracle: &'a dyn Dynamics,
    sim: &'a SimConfig,
    table: &'a ObstacleTable,
    goal: Vec<f64>,
    config: RrtConfig,
    next_id: u64,
}

impl<'a> Rrt<'a> {
    #[must_use]
    pub fn new(
        oracle: &'a dyn Dynamics,
        sim: &'a SimConfig,
        table: &'a ObstacleTable,
        goal: Vec<f64>,
        config: RrtConfig,
    ) -> Self {
        Self {
            oracle,
            sim,
            table,
            goal,
            config,
            next_id: 0,
        }
    }

    #[must_use]
    pub fn goal(&self) -> &[f64] {
        &self.goal
    }

    #[must_use]
    pub fn config(&self) -> &RrtConfig {
        &self.config
    }

    fn fresh_id(&mut self, tree: &Tree) -> VertexId {
        while tree.contains(VertexId(self.next_id)) {
            self.next_id += 1;
        }
        let id = VertexId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Insert the start pose, at rest at step 0.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if `th` does not match the tree.
    pub fn root(&mut self, tree: &mut Tree, th: Vec<f64>) -> Result<VertexId, TreeError> {
        let id = self.fresh_id(tree);
        tree.insert(Vertex::new(id, th))?;
        Ok(id)
    }

    /// Random target pose: the goal with probability `goal_bias`, otherwise
    /// uniform with the base yaw over the full circle and the other joints
    /// within `pose_range`.
    #[must_use]
    pub fn sample(&self, rng: &fastrand::Rng) -> Vec<f64> {
        if rng.f64() < self.config.goal_bias {
            return self.goal.clone();
        }
        (0..self.goal.len())
            .map(|joint| {
                let span = if joint == 0 { PI } else { self.sim.pose_range };
                (rng.f64() * 2.0 - 1.0) * span
            })
            .collect()
    }

    /// Grow the tree by one edge toward a fresh sample.
    ///
    /// # Errors
    ///
    /// Propagates tree errors; never fails for a tree built by this driver.
    pub fn extend(&mut self, tree: &mut Tree, rng: &fastrand::Rng) -> Result<Extension, TreeError> {
        let target = self.sample(rng);
        self.extend_toward(tree, target)
    }

    /// Steer the nearest stored vertex toward `target` for one edge budget.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if `target` does not match the tree.
    pub fn extend_toward(&mut self, tree: &mut Tree, target: Vec<f64>) -> Result<Extension, TreeError> {
        let near = match tree.nearest(&target, 1)?.first() {
            Some((vertex, _)) => (*vertex).clone(),
            None => return Ok(Extension::Rejected),
        };

        let rollout = replay(
            self.oracle,
            self.sim,
            &near.state(),
            &target,
            self.table,
            self.config.steps_per_edge,
        );
        if rollout.expired() || !rollout.collision_free || rollout.end_step <= near.t {
            tracing::trace!(from = %near.id, end = rollout.end_step, "extension rejected");
            return Ok(Extension::Rejected);
        }

        #[allow(clippy::cast_precision_loss)]
        let elapsed = (rollout.end_step - near.t) as f64 * self.sim.dt;
        let jerk = rollout
            .control
            .iter()
            .zip(&near.tau)
            .map(|(tau, prev)| (tau - prev) / elapsed)
            .collect();

        let id = self.fresh_id(tree);
        let reached = within_band(&joint_error(&rollout.pose, &self.goal), self.sim.thres);
        let vertex = Vertex::new(id, rollout.pose)
            .with_velocity(rollout.velocity)
            .at_step(rollout.end_step)
            .with_control(rollout.control, jerk)
            .with_reward(near.reward + rollout.score)
            .with_target(target);
        tree.insert(vertex)?;
        tree.add_edge(near.id, id, -rollout.score)?;

        Ok(if reached {
            Extension::Reached(id)
        } else {
            Extension::Added(id)
        })
    }

    /// Extend until a vertex reaches the goal or the iteration budget runs
    /// out. Returns the root-to-goal path on success.
    ///
    /// # Errors
    ///
    /// Propagates tree errors from [`Rrt::extend`].
    pub fn plan(&mut self, tree: &mut Tree, rng: &fastrand::Rng) -> Result<Option<Vec<VertexId>>, TreeError> {
        for iteration in 0..self.config.max_iterations {
            if let Extension::Reached(id) = self.extend(tree, rng)? {
                let path = tree.path_to(id)?;
                tracing::debug!(
                    iteration,
                    vertices = tree.count(),
                    path_len = path.len(),
                    "goal reached"
                );
                return Ok(Some(path));
            }
        }
        tracing::debug!(
            iterations = self.config.max_iterations,
            vertices = tree.count(),
            "search exhausted"
        );
        Ok(None)
    }
}
