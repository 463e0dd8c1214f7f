use std::collections::{BTreeMap, HashMap};

use glam::Vec3;

use super::object::{ObjectId, RigidObject};
use crate::fracture::Piece;
use crate::geometry::ConvexMesh;
use crate::math::Transform;
use crate::physics::{BodyDesc, BodyHandle, BodyShape, PhysicsError, PhysicsWorld};
use crate::scene::{Scene, SceneNode};

/// Physics world, scene and the object table pairing them.
///
/// `by_body` is the body → object back-reference; the physics side never
/// holds anything pointing back at objects.
pub struct ObjectWorld<W> {
    pub(crate) physics: W,
    pub(crate) scene: Scene,
    pub(crate) objects: BTreeMap<ObjectId, RigidObject>,
    pub(crate) by_body: HashMap<BodyHandle, ObjectId>,
    /// Movable objects whose transforms are synced every step.
    pub(crate) tracked: Vec<ObjectId>,
    next_id: u64,
    friction: f32,
}

impl<W: PhysicsWorld> ObjectWorld<W> {
    pub fn new(physics: W, friction: f32) -> Self {
        Self {
            physics,
            scene: Scene::new(),
            objects: BTreeMap::new(),
            by_body: HashMap::new(),
            tracked: Vec::new(),
            next_id: 0,
            friction,
        }
    }

    pub fn physics(&self) -> &W {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut W {
        &mut self.physics
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Static box that never breaks, e.g. the ground.
    pub fn add_static_box(
        &mut self,
        half_extents: Vec3,
        transform: Transform,
        color: [f32; 3],
    ) -> Result<ObjectId, PhysicsError> {
        let desc = BodyDesc::new(BodyShape::Cuboid { half_extents }, 0.0, transform);
        self.insert(desc, ConvexMesh::cuboid(half_extents), false, 0, color)
    }

    pub fn add_ball(
        &mut self,
        radius: f32,
        mass: f32,
        transform: Transform,
        velocity: Vec3,
        color: [f32; 3],
    ) -> Result<ObjectId, PhysicsError> {
        let desc = BodyDesc::new(BodyShape::Ball { radius }, mass, transform)
            .with_velocity(velocity, Vec3::ZERO);
        self.insert(desc, ConvexMesh::sphere(radius, 14, 10), false, 0, color)
    }

    /// Breakable object placed at world setup.
    pub fn add_breakable(&mut self, piece: &Piece, color: [f32; 3]) -> Result<ObjectId, PhysicsError> {
        self.add_convex(piece, true, 0, color)
    }

    /// Fragment of a fractured object; keeps the velocities carried by `piece`.
    pub fn add_debris(
        &mut self,
        piece: &Piece,
        breakable: bool,
        generation: u32,
        color: [f32; 3],
    ) -> Result<ObjectId, PhysicsError> {
        let id = self.add_convex(piece, breakable, generation, color)?;
        if let Some(object) = self.objects.get_mut(&id) {
            object.velocity = Some(piece.linear_velocity);
            object.angular_velocity = Some(piece.angular_velocity);
        }
        Ok(id)
    }

    fn add_convex(
        &mut self,
        piece: &Piece,
        breakable: bool,
        generation: u32,
        color: [f32; 3],
    ) -> Result<ObjectId, PhysicsError> {
        let shape = BodyShape::ConvexHull {
            points: piece.mesh.vertices().to_vec(),
        };
        let desc = BodyDesc::new(shape, piece.mass, piece.transform)
            .with_velocity(piece.linear_velocity, piece.angular_velocity);
        self.insert(desc, piece.mesh.clone(), breakable, generation, color)
    }

    fn insert(
        &mut self,
        desc: BodyDesc,
        mesh: ConvexMesh,
        breakable: bool,
        generation: u32,
        color: [f32; 3],
    ) -> Result<ObjectId, PhysicsError> {
        let desc = desc.with_friction(self.friction);
        let body = self.physics.add_rigid_body(&desc)?;
        let node = self.scene.add(SceneNode::new(mesh, desc.transform, color));

        let id = ObjectId(self.next_id);
        self.next_id += 1;

        let object = RigidObject {
            node,
            body,
            mass: desc.mass,
            breakable,
            collided: false,
            generation,
            velocity: None,
            angular_velocity: None,
        };
        if object.is_movable() {
            self.tracked.push(id);
        }
        self.by_body.insert(body, id);
        self.objects.insert(id, object);
        Ok(id)
    }

    /// Deletes both halves of the object. `None` if it was already gone.
    pub fn remove(&mut self, id: ObjectId) -> Option<RigidObject> {
        let object = self.objects.remove(&id)?;
        self.by_body.remove(&object.body);
        self.scene.remove(object.node);
        self.physics.remove_rigid_body(object.body);
        Some(object)
    }

    /// Drops tracking entries of removed objects.
    pub fn compact_tracked(&mut self) {
        let objects = &self.objects;
        self.tracked.retain(|id| objects.contains_key(id));
    }

    pub fn object(&self, id: ObjectId) -> Option<&RigidObject> {
        self.objects.get(&id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut RigidObject> {
        self.objects.get_mut(&id)
    }

    pub fn object_for_body(&self, body: BodyHandle) -> Option<ObjectId> {
        self.by_body.get(&body).copied()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn tracked(&self) -> &[ObjectId] {
        &self.tracked
    }

    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Transform of the visual half.
    pub fn transform(&self, id: ObjectId) -> Option<Transform> {
        let object = self.objects.get(&id)?;
        self.scene.get(object.node).map(|node| node.transform)
    }

    pub fn color(&self, id: ObjectId) -> Option<[f32; 3]> {
        let object = self.objects.get(&id)?;
        self.scene.get(object.node).map(|node| node.color)
    }

    /// The object as a breakable piece: visual mesh, visual transform, mass.
    pub fn piece(&self, id: ObjectId) -> Option<Piece> {
        let object = self.objects.get(&id)?;
        let node = self.scene.get(object.node)?;
        Some(Piece::new(node.mesh.clone(), node.transform, object.mass))
    }
}

impl<W> std::fmt::Debug for ObjectWorld<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectWorld")
            .field("object_count", &self.objects.len())
            .field("tracked_count", &self.tracked.len())
            .field("node_count", &self.scene.len())
            .finish()
    }
}
