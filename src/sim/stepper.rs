use super::world::ObjectWorld;
use crate::config::PhysicsConfig;
use crate::physics::PhysicsWorld;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub synced: usize,
    /// Tracked objects whose body had no transform to read back.
    pub skipped: usize,
}

pub struct SimulationStepper;

impl SimulationStepper {
    /// Negative or non-finite deltas become zero; long stalls are capped.
    pub fn clamp_delta(delta_seconds: f32, max_frame_delta: f32) -> f32 {
        if !delta_seconds.is_finite() || delta_seconds < 0.0 {
            return 0.0;
        }
        delta_seconds.min(max_frame_delta)
    }

    /// Steps the physics world and copies body transforms onto the scene.
    /// Returns the delta actually simulated.
    pub fn advance<W: PhysicsWorld>(
        world: &mut ObjectWorld<W>,
        delta_seconds: f32,
        config: &PhysicsConfig,
    ) -> (f32, SyncReport) {
        let delta = Self::clamp_delta(delta_seconds, config.max_frame_delta);
        world.physics.step_simulation(delta, config.max_sub_steps);
        let report = Self::sync_transforms(world);
        (delta, report)
    }

    /// Overwrites each tracked object's visual transform with its physics
    /// transform and clears its `collided` latch.
    pub fn sync_transforms<W: PhysicsWorld>(world: &mut ObjectWorld<W>) -> SyncReport {
        let mut report = SyncReport::default();

        for id in &world.tracked {
            let Some(object) = world.objects.get_mut(id) else {
                report.skipped += 1;
                continue;
            };
            let Some(transform) = world.physics.world_transform(object.body) else {
                report.skipped += 1;
                continue;
            };

            world.scene.set_transform(object.node, transform);
            object.collided = false;
            report.synced += 1;
        }

        report
    }
}
