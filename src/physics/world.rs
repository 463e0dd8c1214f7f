use glam::Vec3;
use thiserror::Error;

use crate::math::Transform;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("collision shape rejected: {0}")]
    InvalidShape(&'static str),
    #[error("mass must be finite and non-negative, got {0}")]
    InvalidMass(f32),
}

/// Opaque reference to a body owned by a [`PhysicsWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle {
    pub index: u32,
    pub generation: u32,
}

impl BodyHandle {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodyShape {
    Cuboid { half_extents: Vec3 },
    Ball { radius: f32 },
    /// Points in the body's local frame.
    ConvexHull { points: Vec<Vec3> },
}

/// Everything needed to create a rigid body. A mass of zero makes the body
/// static.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    pub shape: BodyShape,
    pub mass: f32,
    pub transform: Transform,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub friction: f32,
}

impl BodyDesc {
    pub fn new(shape: BodyShape, mass: f32, transform: Transform) -> Self {
        Self {
            shape,
            mass,
            transform,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            friction: 0.5,
        }
    }

    pub fn with_velocity(mut self, linear: Vec3, angular: Vec3) -> Self {
        self.linear_velocity = linear;
        self.angular_velocity = angular;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn is_static(&self) -> bool {
        self.mass <= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    /// Signed separation; negative while penetrating.
    pub distance: f32,
    pub applied_impulse: f32,
    pub position_on_b: Vec3,
    pub normal_on_b: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactManifold {
    pub body0: Option<BodyHandle>,
    pub body1: Option<BodyHandle>,
    pub points: Vec<ContactPoint>,
}

pub trait PhysicsWorld {
    /// Advances the world by `delta_seconds`, running at most `max_sub_steps`
    /// fixed sub-steps.
    fn step_simulation(&mut self, delta_seconds: f32, max_sub_steps: u32);

    fn add_rigid_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, PhysicsError>;

    /// Returns `false` if the handle was already gone.
    fn remove_rigid_body(&mut self, handle: BodyHandle) -> bool;

    fn manifold_count(&self) -> usize;

    fn manifold(&self, index: usize) -> Option<&ContactManifold>;

    /// `None` when the body has no valid motion state.
    fn world_transform(&self, handle: BodyHandle) -> Option<Transform>;

    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec3>;

    fn angular_velocity(&self, handle: BodyHandle) -> Option<Vec3>;

    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec3);

    fn set_angular_velocity(&mut self, handle: BodyHandle, velocity: Vec3);

    fn body_count(&self) -> usize;
}
