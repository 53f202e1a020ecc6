#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Arm Physics
//!
//! Joint-space simulation of an articulated arm among moving obstacles.
//!
//! This crate is the simulation layer of the workspace. It advances joint
//! angles and velocities under torque or PD control, measures clearance to
//! moving obstacles, and scores trajectories for training and planning.
//!
//! ## Key Components
//!
//! -   **Step Engine:** [`ArmSim`] in the [`simulation`] module owns one live
//!     trajectory and advances it one tick per call.
//! -   **Replay:** [`replay`](replay::replay) re-simulates a bounded number of
//!     steps from any stored state against an [`ObstacleTable`], without
//!     touching the live trajectory.
//! -   **Oracles:** the [`Dynamics`] and [`Kinematics`] traits hide the
//!     numerical model. [`JointDynamics`] and [`SerialArm`] are the default
//!     implementations.
//! -   **Obstacles:** [`Obstacle`] bodies live in an [`ObstacleField`] and can
//!     be sampled into an [`ObstacleTable`] once per episode.
//!
//! ## Usage
//!
//! ```rust
//! use physics::{ArmSim, ControlMode, JointDynamics, ObstacleField, SerialArm, SimConfig};
//! use std::sync::Arc;
//!
//! let config = SimConfig::default();
//! let arm = Arc::new(SerialArm::five_link());
//! let oracle = Arc::new(JointDynamics::new(arm.clone(), &config));
//! let mut sim = ArmSim::new(config, oracle, arm, vec![0.0; 5], vec![0.2; 5])?;
//!
//! let field = ObstacleField::new();
//! let outcome = sim.step(&field, None, ControlMode::Pid, false)?;
//! assert_eq!(sim.state().t, 1);
//! assert!(outcome.reward <= -1.0);
//! # Ok::<(), physics::PhysicsError>(())
//! ```

pub mod config;
pub mod control;
pub mod error;
pub mod integrator;
pub mod kinematics;
pub mod obstacle;
pub mod obstacle_table;
pub mod replay;
pub mod simulation;
pub mod types;

pub use config::SimConfig;
pub use error::PhysicsError;
pub use integrator::{Dynamics, JointDynamics, NextState};
pub use kinematics::{Kinematics, SerialArm};
pub use obstacle::{DriftingSphere, Obstacle, ObstacleField};
pub use obstacle_table::ObstacleTable;
pub use replay::{replay, Rollout};
pub use simulation::{ArmSim, ControlMode, StepInfo, StepOutcome, Termination, GOAL_BONUS, STEP_PENALTY};
pub use types::{Observation, RobotState, Snapshot, Vec3, FEATURE_DIM};
