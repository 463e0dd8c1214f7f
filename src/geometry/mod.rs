//! Convex geometry: hull meshes, render vertices and picking rays.

mod convex;
mod raycast;
mod vertex;

pub use convex::{ConvexMesh, GeometryError};
pub use raycast::Ray;
pub use vertex::Vertex;
