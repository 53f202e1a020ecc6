//! Precomputed obstacle trajectories for replay rollouts.

use crate::error::PhysicsError;
use crate::obstacle::ObstacleField;
use crate::types::Vec3;

/// Obstacle centers for every step `0..len()`, one column per obstacle.
///
/// Rows are stored back to back in a single buffer. The table is immutable
/// once built and can be shared by reference across concurrent rollouts.
#[derive(Clone, Debug, PartialEq)]
pub struct ObstacleTable {
    width: usize,
    rows: usize,
    centers: Vec<Vec3>,
}

impl ObstacleTable {
    /// Walk every obstacle forward in lockstep for `steps` ticks.
    ///
    /// Each obstacle is left `steps` ticks ahead of where it started; callers
    /// that keep using the field afterwards should rewind it.
    #[must_use]
    pub fn build(field: &mut ObstacleField, steps: usize) -> Self {
        let width = field.len();
        let mut centers = Vec::with_capacity(width * steps);
        for _ in 0..steps {
            for obstacle in field.iter_mut() {
                centers.push(obstacle.position());
                obstacle.advance();
            }
        }
        tracing::debug!(steps, width, "built obstacle table");
        Self {
            width,
            rows: steps,
            centers,
        }
    }

    /// Table for a scene without obstacles.
    #[must_use]
    pub fn empty(steps: usize) -> Self {
        Self {
            width: 0,
            rows: steps,
            centers: Vec::new(),
        }
    }

    /// Assemble a table from explicit rows.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::TableShape`] if the rows differ in width.
    pub fn from_rows(rows: Vec<Vec<Vec3>>) -> Result<Self, PhysicsError> {
        let width = rows.first().map_or(0, Vec::len);
        let count = rows.len();
        let mut centers = Vec::with_capacity(width * count);
        for (row, entries) in rows.into_iter().enumerate() {
            if entries.len() != width {
                return Err(PhysicsError::TableShape {
                    row,
                    expected: width,
                    got: entries.len(),
                });
            }
            centers.extend(entries);
        }
        Ok(Self {
            width,
            rows: count,
            centers,
        })
    }

    /// Obstacle centers at `step`, or `None` past the end of the table.
    #[must_use]
    pub fn at(&self, step: usize) -> Option<&[Vec3]> {
        if step >= self.rows {
            return None;
        }
        let start = step * self.width;
        Some(&self.centers[start..start + self.width])
    }

    /// Number of steps covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Number of obstacles per row.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Row-major `x, y, z` view of the whole table.
    #[must_use]
    pub fn as_flat(&self) -> &[f64] {
        bytemuck::cast_slice(&self.centers)
    }
}
