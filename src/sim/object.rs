use glam::Vec3;

use crate::physics::BodyHandle;
use crate::scene::NodeId;

/// Never reused; a removed object's id can only miss afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u64);

impl ObjectId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Pairs a scene node with a physics body. Neither half is owned here; the
/// scene and the physics world own them.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidObject {
    pub node: NodeId,
    pub body: BodyHandle,
    pub mass: f32,
    pub breakable: bool,
    /// Latched when the object fractures; cleared by the next transform sync.
    pub collided: bool,
    /// 0 for objects placed at setup, parent + 1 for debris.
    pub generation: u32,
    /// Velocities inherited at creation; only debris carry them.
    pub velocity: Option<Vec3>,
    pub angular_velocity: Option<Vec3>,
}

impl RigidObject {
    pub fn is_movable(&self) -> bool {
        self.mass > 0.0
    }
}
