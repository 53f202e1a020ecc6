use physics::RobotState;
use std::fmt;

/// Identity key of a vertex in the planning graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub u64);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A stored arm configuration with the kinematic and control state it was
/// reached with.
///
/// Every numeric field owns its buffer, so `clone()` yields a vertex that
/// shares nothing with the original.
#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
    pub id: VertexId,
    /// Joint angles
    pub th: Vec<f64>,
    /// Joint velocities
    pub w: Vec<f64>,
    /// Step index at which the pose is reached
    pub t: usize,
    /// Last applied torque
    pub tau: Vec<f64>,
    /// Last applied jerk (rate of change of torque)
    pub jerk: Vec<f64>,
    /// Accumulated score along the path to this vertex
    pub reward: f64,
    /// Pose this vertex was steered toward
    pub targ: Option<Vec<f64>>,
    /// Traversal bookkeeping
    pub tag: bool,
}

impl Vertex {
    /// At rest at step 0 with zero torque and jerk.
    #[must_use]
    pub fn new(id: VertexId, th: Vec<f64>) -> Self {
        let zeros = vec![0.0; th.len()];
        Self {
            id,
            w: zeros.clone(),
            t: 0,
            tau: zeros.clone(),
            jerk: zeros,
            reward: 0.0,
            targ: None,
            tag: false,
            th,
        }
    }

    #[must_use]
    pub fn with_velocity(mut self, w: Vec<f64>) -> Self {
        self.w = w;
        self
    }

    #[must_use]
    pub fn at_step(mut self, t: usize) -> Self {
        self.t = t;
        self
    }

    #[must_use]
    pub fn with_control(mut self, tau: Vec<f64>, jerk: Vec<f64>) -> Self {
        self.tau = tau;
        self.jerk = jerk;
        self
    }

    #[must_use]
    pub fn with_reward(mut self, reward: f64) -> Self {
        self.reward = reward;
        self
    }

    #[must_use]
    pub fn with_target(mut self, targ: Vec<f64>) -> Self {
        self.targ = Some(targ);
        self
    }

    #[must_use]
    pub fn dims(&self) -> usize {
        self.th.len()
    }

    /// Simulation state to resume a rollout from.
    #[must_use]
    pub fn state(&self) -> RobotState {
        RobotState {
            th: self.th.clone(),
            w: self.w.clone(),
            t: self.t,
        }
    }
}
