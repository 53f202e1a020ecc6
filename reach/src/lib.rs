//! # Reach
//!
//! Joint-space reaching for a 5-link arm among drifting spherical obstacles.
//!
//! ## Project Architecture
//!
//! -   **`reach`:** The crate you are currently viewing. It holds the episode
//!     and planning runs behind the `reach` binary.
//! -   **[`physics`]:** Arm kinematics, the joint dynamics oracle, obstacles,
//!     the live step engine and the pure [`replay`](physics::replay::replay) rollout.
//! -   **[`planning`]:** Vertices, the k-d tree backed vertex store with its
//!     edge map, and an RRT driver built on replay rollouts.
//! -   **[`rl`]:** The environment interface, the experience replay memory and
//!     the environment that composes them.
//!
//! ## Getting Started
//!
//! `reach episode` runs PD-controlled episodes and fills the replay memory.
//! `reach plan` grows a search tree from the start pose toward the goal over
//! the episode's precomputed obstacle table. Both accept `--config` with a
//! JSON file of simulation constants (see `config/arm5.json`).

pub mod app;

pub use physics;
pub use planning;
pub use rl;
