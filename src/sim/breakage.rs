use glam::Vec3;

use super::contacts::{ContactSide, Impact};
use super::object::ObjectId;
use super::removal::RemovalQueue;
use super::world::ObjectWorld;
use crate::config::FractureConfig;
use crate::fracture::{FractureError, SubdivisionParams, Subdivider};
use crate::physics::PhysicsWorld;

#[derive(Debug, Clone, PartialEq)]
pub struct FractureOutcome {
    pub parent: ObjectId,
    pub debris: Vec<ObjectId>,
    /// Fragments whose collision shape the physics world rejected.
    pub skipped_fragments: usize,
}

pub struct FractureHandler;

impl FractureHandler {
    pub fn should_fracture(side: &ContactSide, impulse: f32, threshold: f32) -> bool {
        side.breakable && !side.collided && impulse > threshold
    }

    /// Replaces `id` by debris cut around `impact`. Debris are spawned right
    /// away; the parent is only queued, never removed here.
    ///
    /// The parent's latch is set even when subdivision fails so that it is
    /// not retried within the same step; a failed attempt leaves it in place.
    pub fn fracture<W: PhysicsWorld, S: Subdivider + ?Sized>(
        world: &mut ObjectWorld<W>,
        breaker: &mut S,
        removal: &mut RemovalQueue,
        id: ObjectId,
        impact: &Impact,
        config: &FractureConfig,
    ) -> Result<FractureOutcome, FractureError> {
        let piece = world.piece(id).ok_or(FractureError::MissingObject(id.raw()))?;
        let color = world.color(id).unwrap_or([1.0; 3]);
        let object = world
            .object_mut(id)
            .ok_or(FractureError::MissingObject(id.raw()))?;
        object.collided = true;
        let (body, generation) = (object.body, object.generation);

        let linear_velocity = world.physics().linear_velocity(body).unwrap_or(Vec3::ZERO);
        let angular_velocity = world.physics().angular_velocity(body).unwrap_or(Vec3::ZERO);

        let params = SubdivisionParams::from(config);
        let fragments = breaker.subdivide_by_impact(&piece, impact.point, impact.normal, &params)?;

        let child_generation = generation + 1;
        let mut debris = Vec::with_capacity(fragments.len());
        let mut skipped_fragments = 0;

        for mut fragment in fragments {
            fragment.linear_velocity = linear_velocity;
            fragment.angular_velocity = angular_velocity;
            let breakable =
                config.allows_breaking(child_generation, fragment.mesh.bounding_radius());

            match world.add_debris(&fragment, breakable, child_generation, color) {
                Ok(child) => debris.push(child),
                Err(err) => {
                    log::warn!("dropping fragment of object {}: {}", id.raw(), err);
                    skipped_fragments += 1;
                }
            }
        }

        if debris.is_empty() {
            return Err(FractureError::NoFragments);
        }

        removal.push(id);
        log::debug!(
            "object {} broke into {} pieces (impulse {:.1}, generation {})",
            id.raw(),
            debris.len(),
            impact.impulse,
            child_generation
        );

        Ok(FractureOutcome {
            parent: id,
            debris,
            skipped_fragments,
        })
    }
}
