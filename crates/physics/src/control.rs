//! Joint error and the PD control law.

use crate::config::SimConfig;
use std::f64::consts::{PI, TAU};

/// Wrap an angle into `(-PI, PI]`.
#[must_use]
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Signed shortest-way error from `pose` to `goal`, per joint.
#[must_use]
pub fn joint_error(pose: &[f64], goal: &[f64]) -> Vec<f64> {
    debug_assert_eq!(pose.len(), goal.len());
    pose.iter()
        .zip(goal)
        .map(|(th, target)| wrap_angle(target - th))
        .collect()
}

/// Time derivative of the joint error for a fixed goal.
#[must_use]
pub fn error_rate(w: &[f64]) -> Vec<f64> {
    w.iter().map(|w| -w).collect()
}

/// `tau = P * err + D * dedt`, clamped to the torque limit.
#[must_use]
pub fn pd_control(err: &[f64], dedt: &[f64], config: &SimConfig) -> Vec<f64> {
    err.iter()
        .zip(dedt)
        .map(|(e, de)| (config.p_gain * e + config.d_gain * de).clamp(-config.tau_max, config.tau_max))
        .collect()
}

/// True when every component of `values` is strictly inside `(-band, band)`.
#[must_use]
pub fn within_band(values: &[f64], band: f64) -> bool {
    values.iter().all(|v| v.abs() < band)
}
