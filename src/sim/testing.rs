//! In-memory stand-ins for the physics world and the breaker, used to drive
//! the step pipeline with hand-written contacts.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};

use glam::Vec3;

use crate::fracture::{FractureError, Piece, SubdivisionParams, Subdivider};
use crate::geometry::ConvexMesh;
use crate::math::Transform;
use crate::physics::{
    BodyDesc, BodyHandle, BodyShape, ContactManifold, ContactPoint, PhysicsError, PhysicsWorld,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    Step(f32),
    Add(BodyHandle),
    Remove(BodyHandle),
    ManifoldRead { index: usize, count: usize },
}

#[derive(Debug, Clone)]
struct ScriptedBody {
    desc: BodyDesc,
    transform: Option<Transform>,
    linear_velocity: Vec3,
    angular_velocity: Vec3,
}

/// Bodies never collide on their own: every step publishes the next batch
/// of scripted manifolds and moves dynamic bodies by `drift`.
#[derive(Debug, Default)]
pub(crate) struct ScriptedWorld {
    bodies: BTreeMap<u32, ScriptedBody>,
    next_index: u32,
    script: VecDeque<Vec<ContactManifold>>,
    manifolds: Vec<ContactManifold>,
    events: RefCell<Vec<Event>>,
    pub drift: Vec3,
    pub reject_hulls: bool,
}

impl ScriptedWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manifolds reported after the next unscripted step.
    pub fn script_step(&mut self, manifolds: Vec<ContactManifold>) {
        self.script.push_back(manifolds);
    }

    pub fn hide_transform(&mut self, handle: BodyHandle) {
        if let Some(body) = self.bodies.get_mut(&handle.index) {
            body.transform = None;
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn clear_events(&self) {
        self.events.borrow_mut().clear();
    }
}

impl PhysicsWorld for ScriptedWorld {
    fn step_simulation(&mut self, delta_seconds: f32, _max_sub_steps: u32) {
        self.events.borrow_mut().push(Event::Step(delta_seconds));
        for body in self.bodies.values_mut() {
            if body.desc.is_static() {
                continue;
            }
            if let Some(transform) = body.transform.as_mut() {
                transform.position += self.drift;
            }
        }
        self.manifolds = self.script.pop_front().unwrap_or_default();
    }

    fn add_rigid_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, PhysicsError> {
        if self.reject_hulls && matches!(desc.shape, BodyShape::ConvexHull { .. }) {
            return Err(PhysicsError::InvalidShape("scripted rejection"));
        }
        let handle = BodyHandle::new(self.next_index, 0);
        self.next_index += 1;
        self.bodies.insert(
            handle.index,
            ScriptedBody {
                desc: desc.clone(),
                transform: Some(desc.transform),
                linear_velocity: desc.linear_velocity,
                angular_velocity: desc.angular_velocity,
            },
        );
        self.events.borrow_mut().push(Event::Add(handle));
        Ok(handle)
    }

    fn remove_rigid_body(&mut self, handle: BodyHandle) -> bool {
        let removed = self.bodies.remove(&handle.index).is_some();
        if removed {
            self.events.borrow_mut().push(Event::Remove(handle));
        }
        removed
    }

    fn manifold_count(&self) -> usize {
        self.manifolds.len()
    }

    fn manifold(&self, index: usize) -> Option<&ContactManifold> {
        self.events.borrow_mut().push(Event::ManifoldRead {
            index,
            count: self.manifolds.len(),
        });
        self.manifolds.get(index)
    }

    fn world_transform(&self, handle: BodyHandle) -> Option<Transform> {
        self.bodies.get(&handle.index)?.transform
    }

    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.bodies.get(&handle.index).map(|b| b.linear_velocity)
    }

    fn angular_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.bodies.get(&handle.index).map(|b| b.angular_velocity)
    }

    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(&handle.index) {
            body.linear_velocity = velocity;
        }
    }

    fn set_angular_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(&handle.index) {
            body.angular_velocity = velocity;
        }
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

/// Splits every piece into two unit-less halves along x, or fails on demand.
#[derive(Debug, Default)]
pub(crate) struct SplitInTwo {
    pub calls: usize,
    pub fail: bool,
}

impl Subdivider for SplitInTwo {
    fn subdivide_by_impact(
        &mut self,
        piece: &Piece,
        _impact_point: Vec3,
        _impact_normal: Vec3,
        params: &SubdivisionParams,
    ) -> Result<Vec<Piece>, FractureError> {
        self.calls += 1;
        if self.fail {
            return Err(FractureError::NoFragments);
        }
        let half = ConvexMesh::cuboid(Vec3::new(0.5, 1.0, 1.0));
        let pieces = [-0.5, 0.5]
            .into_iter()
            .map(|x| {
                let offset = piece.transform.transform_direction(Vec3::new(x, 0.0, 0.0));
                let transform = Transform::new(
                    piece.transform.position + offset,
                    piece.transform.rotation,
                );
                Piece::new(half.clone(), transform, piece.mass * params.piece_mass_ratio)
            })
            .collect();
        Ok(pieces)
    }
}

pub(crate) fn contact(
    body0: Option<BodyHandle>,
    body1: Option<BodyHandle>,
    impulse: f32,
) -> ContactManifold {
    ContactManifold {
        body0,
        body1,
        points: vec![ContactPoint {
            distance: -0.01,
            applied_impulse: impulse,
            position_on_b: Vec3::new(0.0, 0.5, 0.0),
            normal_on_b: Vec3::Y,
        }],
    }
}
