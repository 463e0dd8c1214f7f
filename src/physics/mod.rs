//! Physics world capability and its rapier backend.
//!
//! The fracture pipeline only talks to [`PhysicsWorld`]; the solver behind it
//! is opaque. Contacts are exposed as owned [`ContactManifold`] snapshots of
//! the last executed sub-step so that bodies may be added while they are being
//! read.

mod rapier;
mod world;

pub use rapier::RapierWorld;
pub use world::{
    BodyDesc, BodyHandle, BodyShape, ContactManifold, ContactPoint, PhysicsError, PhysicsWorld,
};
