//! Forward kinematics and arm geometry.
//!
//! The core only needs two things from an arm model: where its joints are for
//! a given pose, and how thick its links are. [`SerialArm`] is a yaw-then-pitch
//! serial chain that serves as the default model.

use crate::types::{Snapshot, Vec3};

pub trait Kinematics: Send + Sync {
    /// Degrees of freedom of the arm.
    fn joint_count(&self) -> usize;

    /// Base, every joint, and the end effector, in that order.
    fn forward(&self, pose: &[f64]) -> Vec<Vec3>;

    /// Radius of the capsule around every link.
    fn link_radius(&self) -> f64;

    fn end_effector(&self, pose: &[f64]) -> Vec3 {
        self.forward(pose).last().copied().unwrap_or(Vec3::ZERO)
    }

    /// Geometry snapshot used to build observations.
    fn snapshot(&self, pose: &[f64], _step: usize) -> Snapshot {
        let coords = self.forward(pose);
        let features = vec![[self.link_radius(), 1.0]; coords.len()];
        Snapshot { coords, features }
    }
}

/// Serial chain: joint 0 yaws a vertical base link about `z`, every later
/// joint pitches the next link within the yawed vertical plane.
#[derive(Clone, Debug, PartialEq)]
pub struct SerialArm {
    links: Vec<f64>,
    link_radius: f64,
}

impl SerialArm {
    /// # Panics
    ///
    /// Panics if `links` is empty.
    #[must_use]
    pub fn new(links: Vec<f64>, link_radius: f64) -> Self {
        assert!(!links.is_empty(), "arm needs at least one link");
        Self { links, link_radius }
    }

    /// Default 5-link geometry, about 1.35 m of reach including the base.
    #[must_use]
    pub fn five_link() -> Self {
        Self::new(vec![0.3, 0.4, 0.35, 0.2, 0.1], 0.04)
    }

    #[must_use]
    pub fn links(&self) -> &[f64] {
        &self.links
    }

    /// Horizontal reach with every pitch joint straight.
    #[must_use]
    pub fn reach(&self) -> f64 {
        self.links[1..].iter().sum()
    }
}

impl Kinematics for SerialArm {
    fn joint_count(&self) -> usize {
        self.links.len()
    }

    fn forward(&self, pose: &[f64]) -> Vec<Vec3> {
        debug_assert_eq!(pose.len(), self.links.len());
        let mut points = Vec::with_capacity(self.links.len() + 1);
        let mut p = Vec3::ZERO;
        points.push(p);
        p.z += self.links[0];
        points.push(p);

        let (sin_yaw, cos_yaw) = pose[0].sin_cos();
        let mut pitch = 0.0;
        for (angle, length) in pose[1..].iter().zip(&self.links[1..]) {
            pitch += angle;
            let (sin_p, cos_p) = f64::sin_cos(pitch);
            p += Vec3::new(cos_p * cos_yaw, cos_p * sin_yaw, sin_p) * *length;
            points.push(p);
        }
        points
    }

    fn link_radius(&self) -> f64 {
        self.link_radius
    }
}

/// Clearance between the arm at `pose` and the nearest obstacle sphere.
///
/// Negative values mean the capsule and a sphere overlap. Returns
/// `f64::INFINITY` when there are no obstacles.
#[must_use]
pub fn proximity(arm: &dyn Kinematics, pose: &[f64], obstacles: &[Vec3], obstacle_radius: f64) -> f64 {
    if obstacles.is_empty() {
        return f64::INFINITY;
    }
    let points = arm.forward(pose);
    let clearance = obstacle_radius + arm.link_radius();
    points
        .windows(2)
        .flat_map(|link| obstacles.iter().map(move |o| o.distance_to_segment(link[0], link[1])))
        .fold(f64::INFINITY, f64::min)
        - clearance
}
