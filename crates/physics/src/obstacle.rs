//! Moving obstacles.
//!
//! An obstacle's position is a deterministic function of the step index, so
//! the live engine can query any step directly while the obstacle table is
//! built by walking the same trajectory tick by tick.

use crate::config::SimConfig;
use crate::types::{Snapshot, Vec3};

pub trait Obstacle: Send {
    /// Center at an arbitrary step.
    fn path(&self, step: usize) -> Vec3;

    /// Center at the obstacle's own tick.
    fn position(&self) -> Vec3;

    /// Move the obstacle's own tick forward by one step.
    fn advance(&mut self);

    /// Return to step 0.
    fn rewind(&mut self);

    fn radius(&self) -> f64;

    fn snapshot(&self, step: usize) -> Snapshot {
        Snapshot {
            coords: vec![self.path(step)],
            features: vec![[self.radius(), 0.0]],
        }
    }
}

/// Sphere moving at constant velocity, bouncing off the walls of an
/// axis-aligned box.
#[derive(Clone, Debug, PartialEq)]
pub struct DriftingSphere {
    start: Vec3,
    /// Displacement per step
    velocity: Vec3,
    radius: f64,
    lo: Vec3,
    hi: Vec3,
    tick: usize,
}

impl DriftingSphere {
    #[must_use]
    pub fn new(start: Vec3, velocity: Vec3, radius: f64, lo: Vec3, hi: Vec3) -> Self {
        Self {
            start,
            velocity,
            radius,
            lo,
            hi,
            tick: 0,
        }
    }

    /// A sphere that never moves.
    #[must_use]
    pub fn fixed(center: Vec3, radius: f64) -> Self {
        Self::new(center, Vec3::ZERO, radius, center, center)
    }

    /// Random start inside the workspace box and random heading at the
    /// configured speed.
    #[must_use]
    pub fn random(rng: &fastrand::Rng, config: &SimConfig) -> Self {
        let r = config.workspace_radius;
        let lo = Vec3::new(-r, -r, 0.0);
        let hi = Vec3::new(r, r, r);
        let start = Vec3::new(
            lo.x + rng.f64() * (hi.x - lo.x),
            lo.y + rng.f64() * (hi.y - lo.y),
            lo.z + rng.f64() * (hi.z - lo.z),
        );
        let heading = loop {
            let v = Vec3::new(rng.f64() * 2.0 - 1.0, rng.f64() * 2.0 - 1.0, rng.f64() * 2.0 - 1.0);
            let len = v.length();
            if len > 1e-6 && len <= 1.0 {
                break v * (1.0 / len);
            }
        };
        let velocity = heading * (config.obstacle_speed * config.dt);
        Self::new(start, velocity, config.obstacle_radius, lo, hi)
    }
}

/// Fold `x` back into `[lo, hi]` as if it bounced off both walls.
fn reflect(x: f64, lo: f64, hi: f64) -> f64 {
    let span = hi - lo;
    if span <= 0.0 {
        return lo;
    }
    let m = (x - lo).rem_euclid(2.0 * span);
    if m <= span {
        lo + m
    } else {
        lo + 2.0 * span - m
    }
}

impl Obstacle for DriftingSphere {
    #[allow(clippy::cast_precision_loss)]
    fn path(&self, step: usize) -> Vec3 {
        let free = self.start + self.velocity * step as f64;
        Vec3::new(
            reflect(free.x, self.lo.x, self.hi.x),
            reflect(free.y, self.lo.y, self.hi.y),
            reflect(free.z, self.lo.z, self.hi.z),
        )
    }

    fn position(&self) -> Vec3 {
        self.path(self.tick)
    }

    fn advance(&mut self) {
        self.tick += 1;
    }

    fn rewind(&mut self) {
        self.tick = 0;
    }

    fn radius(&self) -> f64 {
        self.radius
    }
}

/// Every obstacle of one environment.
#[derive(Default)]
pub struct ObstacleField {
    obstacles: Vec<Box<dyn Obstacle>>,
}

impl ObstacleField {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, obstacle: impl Obstacle + 'static) {
        self.obstacles.push(Box::new(obstacle));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(dyn Obstacle + 'static)> {
        self.obstacles.iter().map(|o| &**o)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Obstacle>> {
        self.obstacles.iter_mut()
    }

    /// Obstacle centers at `step`, one per obstacle.
    #[must_use]
    pub fn positions_at(&self, step: usize) -> Vec<Vec3> {
        self.obstacles.iter().map(|o| o.path(step)).collect()
    }

    /// Geometry of every obstacle at `step`, in field order.
    #[must_use]
    pub fn snapshot(&self, step: usize) -> Snapshot {
        let mut scene = Snapshot::default();
        for obstacle in &self.obstacles {
            scene.append(obstacle.snapshot(step));
        }
        scene
    }

    pub fn rewind(&mut self) {
        for obstacle in &mut self.obstacles {
            obstacle.rewind();
        }
    }
}

impl std::fmt::Debug for ObstacleField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObstacleField")
            .field("len", &self.obstacles.len())
            .finish()
    }
}
