use std::ops::{Add, AddAssign, Mul, Sub};

/// Width of a per-point feature row: `[radius, is_robot]`.
pub const FEATURE_DIM: usize = 2;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Shortest distance from `self` to the segment `a..b`.
    #[must_use]
    pub fn distance_to_segment(self, a: Self, b: Self) -> f64 {
        let ab = b - a;
        let len_sq = ab.dot(ab);
        if len_sq <= f64::EPSILON {
            return self.distance(a);
        }
        let s = ((self - a).dot(ab) / len_sq).clamp(0.0, 1.0);
        self.distance(a + ab * s)
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Joint-space state of the arm at a discrete step.
///
/// `th` and `w` always have one entry per joint.
#[derive(Clone, Debug, PartialEq)]
pub struct RobotState {
    pub th: Vec<f64>,
    pub w: Vec<f64>,
    pub t: usize,
}

impl RobotState {
    /// At rest in `th`, at step 0.
    #[must_use]
    pub fn at_rest(th: Vec<f64>) -> Self {
        let w = vec![0.0; th.len()];
        Self { th, w, t: 0 }
    }

    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.th.len()
    }
}

/// Point cloud of one body (or a whole scene) at a given step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub coords: Vec<Vec3>,
    pub features: Vec<[f64; FEATURE_DIM]>,
}

impl Snapshot {
    #[must_use]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn append(&mut self, other: Snapshot) {
        self.coords.extend(other.coords);
        self.features.extend(other.features);
    }
}

/// What the environment hands to a policy after each step.
///
/// Obstacle points come first, the robot's own points last. `coords` and
/// `features` are left empty when a step runs in eval mode.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Observation {
    pub coords: Vec<Vec3>,
    pub features: Vec<[f64; FEATURE_DIM]>,
    pub joint_error: Vec<f64>,
    pub error_rate: Vec<f64>,
}

impl Observation {
    #[must_use]
    pub fn from_scene(scene: Snapshot, joint_error: Vec<f64>, error_rate: Vec<f64>) -> Self {
        Self {
            coords: scene.coords,
            features: scene.features,
            joint_error,
            error_rate,
        }
    }
}
