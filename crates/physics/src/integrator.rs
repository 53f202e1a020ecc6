//! # Joint-Space Integration
//!
//! This module defines the dynamics oracle consumed by the step engine and the
//! replay engine, and a reference implementation of it.
//!
//! [`JointDynamics`] treats every joint as an independent damped rotor:
//! torques are clamped to the configured limit, acceleration is
//! `(tau - damping * w) / inertia`, and the state advances with semi-implicit
//! Euler (velocity first, then position from the new velocity). Joint speed is
//! clamped after the velocity update. Proximity is measured at the new pose.

use crate::config::SimConfig;
use crate::kinematics::{proximity, Kinematics};
use crate::types::Vec3;
use std::sync::Arc;

/// Result of one oracle call.
#[derive(Clone, Debug, PartialEq)]
pub struct NextState {
    pub th: Vec<f64>,
    pub w: Vec<f64>,
    /// Clearance to the nearest obstacle at the new pose
    pub proximity: f64,
}

/// Pure per-step dynamics. Implementations must be deterministic and free of
/// side effects so rollouts can run concurrently.
pub trait Dynamics: Send + Sync {
    fn joint_count(&self) -> usize;

    fn next_state(&self, obstacles: &[Vec3], th: &[f64], w: &[f64], tau: &[f64]) -> NextState;

    fn proximity(&self, obstacles: &[Vec3], th: &[f64]) -> f64;
}

#[derive(Clone)]
pub struct JointDynamics {
    arm: Arc<dyn Kinematics>,
    dt: f64,
    tau_max: f64,
    damping: f64,
    inertia: f64,
    jnt_vel_max: f64,
    obstacle_radius: f64,
}

impl JointDynamics {
    #[must_use]
    pub fn new(arm: Arc<dyn Kinematics>, config: &SimConfig) -> Self {
        Self {
            arm,
            dt: config.dt,
            tau_max: config.tau_max,
            damping: config.damping,
            inertia: config.inertia,
            jnt_vel_max: config.jnt_vel_max,
            obstacle_radius: config.obstacle_radius,
        }
    }

    #[must_use]
    pub fn arm(&self) -> &Arc<dyn Kinematics> {
        &self.arm
    }
}

impl Dynamics for JointDynamics {
    fn joint_count(&self) -> usize {
        self.arm.joint_count()
    }

    fn next_state(&self, obstacles: &[Vec3], th: &[f64], w: &[f64], tau: &[f64]) -> NextState {
        debug_assert_eq!(th.len(), w.len());
        debug_assert_eq!(th.len(), tau.len());

        let mut next_th = Vec::with_capacity(th.len());
        let mut next_w = Vec::with_capacity(w.len());
        for ((angle, speed), torque) in th.iter().zip(w).zip(tau) {
            let torque = torque.clamp(-self.tau_max, self.tau_max);
            let acceleration = (torque - self.damping * speed) / self.inertia;
            let speed = (speed + acceleration * self.dt).clamp(-self.jnt_vel_max, self.jnt_vel_max);
            next_w.push(speed);
            next_th.push(angle + speed * self.dt);
        }

        let proximity = self.proximity(obstacles, &next_th);
        NextState {
            th: next_th,
            w: next_w,
            proximity,
        }
    }

    fn proximity(&self, obstacles: &[Vec3], th: &[f64]) -> f64 {
        proximity(self.arm.as_ref(), th, obstacles, self.obstacle_radius)
    }
}
