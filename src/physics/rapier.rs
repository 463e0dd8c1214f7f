use glam::{Quat, Vec3};
use rapier3d::dynamics::{
    CCDSolver, ImpulseJointSet, IntegrationParameters, IslandManager, MultibodyJointSet,
    RigidBodyBuilder, RigidBodyHandle, RigidBodySet,
};
use rapier3d::geometry::{BroadPhase, ColliderBuilder, ColliderSet, NarrowPhase};
use rapier3d::na::{Isometry3, Point3, Quaternion, Translation3, UnitQuaternion, Vector3};
use rapier3d::pipeline::PhysicsPipeline;

use super::world::{
    BodyDesc, BodyHandle, BodyShape, ContactManifold, ContactPoint, PhysicsError, PhysicsWorld,
};
use crate::config::PhysicsConfig;
use crate::math::Transform;

/// [`PhysicsWorld`] backed by a rapier pipeline running fixed sub-steps.
pub struct RapierWorld {
    gravity: Vector3<f32>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    fixed_time_step: f32,
    accumulator: f32,
    sub_steps_taken: u64,
    manifolds: Vec<ContactManifold>,
}

impl RapierWorld {
    pub fn new(config: &PhysicsConfig) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.fixed_time_step;

        Self {
            gravity: Vector3::new(0.0, -config.gravity, 0.0),
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            fixed_time_step: config.fixed_time_step,
            accumulator: 0.0,
            sub_steps_taken: 0,
            manifolds: Vec::new(),
        }
    }

    pub fn sub_steps_taken(&self) -> u64 {
        self.sub_steps_taken
    }

    fn step_once(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
        self.sub_steps_taken += 1;
    }

    fn snapshot_manifolds(&mut self) {
        self.manifolds.clear();

        for pair in self.narrow_phase.contact_pairs() {
            let (Some(collider1), Some(collider2)) = (
                self.colliders.get(pair.collider1),
                self.colliders.get(pair.collider2),
            ) else {
                continue;
            };

            let body0 = collider1.parent().map(to_body_handle);
            let body1 = collider2.parent().map(to_body_handle);
            let position_b = collider2.position();

            for manifold in &pair.manifolds {
                if manifold.points.is_empty() {
                    continue;
                }
                // rapier's manifold normal points out of the first collider
                let normal_on_b = -to_vec3(&manifold.data.normal);
                let points = manifold
                    .points
                    .iter()
                    .map(|p| {
                        let on_b = position_b * p.local_p2;
                        ContactPoint {
                            distance: p.dist,
                            applied_impulse: p.data.impulse,
                            position_on_b: Vec3::new(on_b.x, on_b.y, on_b.z),
                            normal_on_b,
                        }
                    })
                    .collect();

                self.manifolds.push(ContactManifold {
                    body0,
                    body1,
                    points,
                });
            }
        }
    }
}

impl PhysicsWorld for RapierWorld {
    fn step_simulation(&mut self, delta_seconds: f32, max_sub_steps: u32) {
        if !(delta_seconds > 0.0) || max_sub_steps == 0 {
            self.manifolds.clear();
            return;
        }

        self.accumulator += delta_seconds;
        let due = ((self.accumulator / self.fixed_time_step) + 1e-4).floor() as u32;
        self.accumulator = (self.accumulator - due as f32 * self.fixed_time_step).max(0.0);

        // whatever does not fit in max_sub_steps is dropped
        let steps = due.min(max_sub_steps);
        for _ in 0..steps {
            self.step_once();
        }

        if steps > 0 {
            self.snapshot_manifolds();
        } else {
            self.manifolds.clear();
        }
    }

    fn add_rigid_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, PhysicsError> {
        if !desc.mass.is_finite() || desc.mass < 0.0 {
            return Err(PhysicsError::InvalidMass(desc.mass));
        }

        let collider = match &desc.shape {
            BodyShape::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            BodyShape::Ball { radius } => ColliderBuilder::ball(*radius),
            BodyShape::ConvexHull { points } => {
                let cloud: Vec<Point3<f32>> =
                    points.iter().map(|p| Point3::new(p.x, p.y, p.z)).collect();
                ColliderBuilder::convex_hull(&cloud)
                    .ok_or(PhysicsError::InvalidShape("convex hull"))?
            }
        };
        let collider = collider.friction(desc.friction);

        let (builder, collider) = if desc.is_static() {
            (RigidBodyBuilder::fixed(), collider)
        } else {
            // no CCD: a fast hit has to show up as a penetrating contact
            (
                RigidBodyBuilder::dynamic().can_sleep(false),
                collider.mass(desc.mass),
            )
        };

        let body = builder
            .position(to_isometry(&desc.transform))
            .linvel(to_vector(desc.linear_velocity))
            .angvel(to_vector(desc.angular_velocity))
            .build();

        let handle = self.bodies.insert(body);
        self.colliders
            .insert_with_parent(collider.build(), handle, &mut self.bodies);

        Ok(to_body_handle(handle))
    }

    fn remove_rigid_body(&mut self, handle: BodyHandle) -> bool {
        self.bodies
            .remove(
                to_rapier_handle(handle),
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    fn manifold_count(&self) -> usize {
        self.manifolds.len()
    }

    fn manifold(&self, index: usize) -> Option<&ContactManifold> {
        self.manifolds.get(index)
    }

    fn world_transform(&self, handle: BodyHandle) -> Option<Transform> {
        self.bodies
            .get(to_rapier_handle(handle))
            .map(|body| from_isometry(body.position()))
    }

    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.bodies
            .get(to_rapier_handle(handle))
            .map(|body| to_vec3(body.linvel()))
    }

    fn angular_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.bodies
            .get(to_rapier_handle(handle))
            .map(|body| to_vec3(body.angvel()))
    }

    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(to_rapier_handle(handle)) {
            body.set_linvel(to_vector(velocity), true);
        }
    }

    fn set_angular_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(to_rapier_handle(handle)) {
            body.set_angvel(to_vector(velocity), true);
        }
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

impl std::fmt::Debug for RapierWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RapierWorld")
            .field("body_count", &self.bodies.len())
            .field("collider_count", &self.colliders.len())
            .field("manifold_count", &self.manifolds.len())
            .field("sub_steps_taken", &self.sub_steps_taken)
            .finish()
    }
}

fn to_body_handle(handle: RigidBodyHandle) -> BodyHandle {
    let (index, generation) = handle.into_raw_parts();
    BodyHandle::new(index, generation)
}

fn to_rapier_handle(handle: BodyHandle) -> RigidBodyHandle {
    RigidBodyHandle::from_raw_parts(handle.index, handle.generation)
}

fn to_vector(v: Vec3) -> Vector3<f32> {
    Vector3::new(v.x, v.y, v.z)
}

fn to_vec3(v: &Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn to_isometry(transform: &Transform) -> Isometry3<f32> {
    let q = transform.rotation;
    let p = transform.position;
    Isometry3::from_parts(
        Translation3::new(p.x, p.y, p.z),
        UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z)),
    )
}

fn from_isometry(iso: &Isometry3<f32>) -> Transform {
    let t = iso.translation.vector;
    let q = iso.rotation;
    Transform::new(Vec3::new(t.x, t.y, t.z), Quat::from_xyzw(q.i, q.j, q.k, q.w))
}
