#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! Training-side plumbing for the arm: the [`Env`] interface, the
//! [`ReplayBuffer`] of [`Transition`]s and the [`ArmEnv`] that ties a live
//! simulation to both.

pub mod env;
pub mod error;
pub mod replay_buffer;
pub mod robot_env;

pub use env::Env;
pub use error::{BufferError, EnvError};
pub use replay_buffer::{ReplayBuffer, Transition};
pub use robot_env::{ArmEnv, EnvOptions, FLOOR_CLEARANCE, MAX_ATTEMPTS, SPAWN_LOOKAHEAD};
