//! Visual half of the sandbox.
//!
//! A headless node table: each node is a convex mesh placed by a transform.
//! Renderers pull the add/remove journal once per frame and read transforms
//! from the live nodes.

mod node;

pub use node::{NodeId, Scene, SceneChanges, SceneNode};
