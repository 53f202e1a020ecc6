//! Simulation constants.
//!
//! Every core operation takes a [`SimConfig`] by reference and never mutates
//! it. The defaults describe the 5-link arm used by the `reach` binary; any
//! subset of fields can be overridden from JSON.

use crate::error::PhysicsError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Integration time step in seconds
    pub dt: f64,
    /// Episode length in seconds
    pub t_limit: f64,
    /// Joint error tolerance for goal termination (radians)
    pub thres: f64,
    /// Joint velocity tolerance for goal termination (rad/s)
    pub vel_thres: f64,
    /// Proximity below which a replay counts as a collision (meters)
    pub min_prox: f64,
    /// Torque limit per joint
    pub tau_max: f64,
    /// Viscous joint damping coefficient
    pub damping: f64,
    /// Effective inertia of every joint
    pub inertia: f64,
    /// Proportional gain of the PD law
    pub p_gain: f64,
    /// Derivative gain of the PD law
    pub d_gain: f64,
    /// Joint speed limit (rad/s)
    pub jnt_vel_max: f64,
    /// Radius of every obstacle sphere (meters)
    pub obstacle_radius: f64,
    /// Obstacle speed (m/s)
    pub obstacle_speed: f64,
    /// Half-width of the box obstacles bounce inside (meters)
    pub workspace_radius: f64,
    /// Range of randomly sampled non-base joint angles, `[-pose_range, pose_range]`
    pub pose_range: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.02,
            t_limit: 10.0,
            thres: 0.03,
            vel_thres: 0.05,
            min_prox: 0.05,
            tau_max: 20.0,
            damping: 0.5,
            inertia: 1.0,
            p_gain: 8.0,
            d_gain: 4.0,
            jnt_vel_max: 2.0,
            obstacle_radius: 0.1,
            obstacle_speed: 0.2,
            workspace_radius: 1.2,
            pose_range: std::f64::consts::FRAC_PI_2,
        }
    }
}

impl SimConfig {
    /// Parse a (possibly partial) configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::Json`] on malformed input and
    /// [`PhysicsError::InvalidConfig`] when a value is out of range.
    pub fn from_json_str(json: &str) -> Result<Self, PhysicsError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or does not parse, see
    /// [`SimConfig::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PhysicsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check that every constant is usable by the integrator.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        let positive = [
            ("dt", self.dt),
            ("t_limit", self.t_limit),
            ("thres", self.thres),
            ("vel_thres", self.vel_thres),
            ("tau_max", self.tau_max),
            ("inertia", self.inertia),
            ("jnt_vel_max", self.jnt_vel_max),
            ("workspace_radius", self.workspace_radius),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(PhysicsError::InvalidConfig(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        let non_negative = [
            ("damping", self.damping),
            ("p_gain", self.p_gain),
            ("d_gain", self.d_gain),
            ("obstacle_radius", self.obstacle_radius),
            ("obstacle_speed", self.obstacle_speed),
            ("pose_range", self.pose_range),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(PhysicsError::InvalidConfig(format!(
                    "{name} must be non-negative and finite, got {value}"
                )));
            }
        }
        if !self.min_prox.is_finite() {
            return Err(PhysicsError::InvalidConfig("min_prox must be finite".into()));
        }
        Ok(())
    }

    /// Number of steps in a full episode, `ceil(t_limit / dt)`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn steps_ceiling(&self) -> usize {
        (self.t_limit / self.dt).ceil() as usize
    }
}
