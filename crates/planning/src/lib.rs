#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Planning
//!
//! Motion-planning graph over arm configurations.
//!
//! -   [`Vertex`] is a stored configuration with the velocity, step, torque
//!     and score it was reached with.
//! -   [`Tree`] indexes vertices by pose for nearest and box queries and keeps
//!     the directed edge map between them.
//! -   [`Rrt`] grows a [`Tree`] by bounded [`replay`](physics::replay::replay) rollouts toward
//!     sampled poses.
//!
//! ```rust
//! use planning::{Region, Tree, Vertex, VertexId};
//!
//! let mut tree = Tree::new(2);
//! tree.insert(Vertex::new(VertexId(0), vec![0.0, 0.0]))?;
//! tree.insert(Vertex::new(VertexId(1), vec![0.5, 0.1]))?;
//! tree.add_edge(VertexId(0), VertexId(1), 3.0)?;
//!
//! let (closest, _) = tree.nearest(&[0.4, 0.0], 1)?[0];
//! assert_eq!(closest.id, VertexId(1));
//! assert_eq!(tree.range_query(&Region::around(&[0.0, 0.0], 0.2))?.len(), 1);
//! # Ok::<(), planning::TreeError>(())
//! ```

pub mod error;
pub mod kdtree;
pub mod rrt;
pub mod tree;
pub mod vertex;

pub use error::TreeError;
pub use kdtree::KdTree;
pub use rrt::{Extension, Rrt, RrtConfig};
pub use tree::{Region, Tree};
pub use vertex::{Vertex, VertexId};
