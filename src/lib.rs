//! # fracture-sandbox
//!
//! Impact-driven fracture of convex rigid bodies on top of a physics step.
//!
//! ## Features
//! - Fixed-step rigid-body simulation (rapier) behind a `PhysicsWorld` trait
//! - Contact scanning for the strongest penetrating impulse per manifold
//! - Seeded convex breaker splitting hulls around the impact point
//! - Deferred removal so manifolds stay valid while they are scanned
//! - Cross-platform: native demo binary + WASM facade
//!
//! ## Example
//! ```rust,no_run
//! use fracture_sandbox::{Camera, Sandbox, SandboxConfig};
//!
//! let mut sim = Sandbox::rapier(SandboxConfig::default());
//! let layout = Sandbox::build(&mut sim)?;
//!
//! let ray = Camera::default().screen_to_ray(-0.35, 0.05);
//! Sandbox::throw_ball(&mut sim, &ray)?;
//!
//! for _ in 0..120 {
//!     let report = sim.step(1.0 / 60.0);
//!     println!("{} fractures, {} removed", report.fractures, report.removed.len());
//! }
//! println!("tower still standing: {}", sim.world().contains(layout.towers[0]));
//! # Ok::<(), fracture_sandbox::SandboxError>(())
//! ```

pub mod config;
pub mod error;
pub mod fracture;
pub mod geometry;
pub mod math;
pub mod physics;
pub mod sandbox;
pub mod scene;
pub mod sim;
pub mod view;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{BallConfig, ConfigError, FractureConfig, PhysicsConfig, SandboxConfig};
pub use error::{Result, SandboxError};
pub use fracture::{ConvexBreaker, FractureError, Piece, SubdivisionParams, Subdivider};
pub use geometry::{ConvexMesh, Ray, Vertex};
pub use math::{Plane, Transform};
pub use physics::{BodyDesc, BodyHandle, BodyShape, PhysicsError, PhysicsWorld, RapierWorld};
pub use sandbox::{Sandbox, SandboxLayout};
pub use scene::{NodeId, Scene, SceneChanges, SceneNode};
pub use sim::{ObjectId, RigidObject, Simulation, StepReport};
pub use view::Camera;
