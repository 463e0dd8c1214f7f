use super::breakage::FractureHandler;
use super::contacts::ContactScanner;
use super::object::ObjectId;
use super::removal::RemovalQueue;
use super::stepper::SimulationStepper;
use super::world::ObjectWorld;
use crate::config::SandboxConfig;
use crate::fracture::{ConvexBreaker, Subdivider};
use crate::physics::PhysicsWorld;

/// What one call to [`Simulation::step`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Delta handed to the physics world after clamping.
    pub delta: f32,
    pub synced: usize,
    pub sync_skipped: usize,
    pub manifolds: usize,
    pub fractures: usize,
    pub failed_fractures: usize,
    pub debris_created: usize,
    pub removed: Vec<ObjectId>,
}

/// The whole fracture pipeline: physics world, scene, breaker and the
/// removal queue, advanced one frame at a time.
pub struct Simulation<W, S = ConvexBreaker> {
    world: ObjectWorld<W>,
    breaker: S,
    removal: RemovalQueue,
    config: SandboxConfig,
    frames: u64,
}

impl<W: PhysicsWorld> Simulation<W, ConvexBreaker> {
    pub fn with_default_breaker(physics: W, config: SandboxConfig) -> Self {
        let breaker = ConvexBreaker::new(config.fracture.seed);
        Self::new(physics, breaker, config)
    }
}

impl<W: PhysicsWorld, S: Subdivider> Simulation<W, S> {
    pub fn new(physics: W, breaker: S, config: SandboxConfig) -> Self {
        Self {
            world: ObjectWorld::new(physics, config.physics.friction),
            breaker,
            removal: RemovalQueue::new(),
            config,
            frames: 0,
        }
    }

    pub fn world(&self) -> &ObjectWorld<W> {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut ObjectWorld<W> {
        &mut self.world
    }

    pub fn breaker(&self) -> &S {
        &self.breaker
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Objects queued but not yet removed. Always empty between steps.
    pub fn pending_removals(&self) -> &[ObjectId] {
        self.removal.pending()
    }

    /// Runs one frame: step physics, sync transforms, scan every manifold
    /// for fracture-worthy impacts, then delete the broken parents.
    ///
    /// Debris are created during the scan; nothing is removed from the
    /// physics world until the scan is finished.
    pub fn step(&mut self, delta_seconds: f32) -> StepReport {
        let (delta, sync) =
            SimulationStepper::advance(&mut self.world, delta_seconds, &self.config.physics);

        let mut report = StepReport {
            delta,
            synced: sync.synced,
            sync_skipped: sync.skipped,
            ..StepReport::default()
        };

        let threshold = self.config.fracture.impulse_threshold;
        let manifold_count = self.world.physics().manifold_count();
        report.manifolds = manifold_count;

        for index in 0..manifold_count {
            let hit = match self.world.physics().manifold(index) {
                Some(manifold) => ContactScanner::scan_manifold(&self.world, manifold),
                None => None,
            };
            let Some(hit) = hit else {
                continue;
            };

            for side in hit.sides.into_iter().flatten() {
                if !FractureHandler::should_fracture(&side, hit.impact.impulse, threshold) {
                    continue;
                }

                let outcome = FractureHandler::fracture(
                    &mut self.world,
                    &mut self.breaker,
                    &mut self.removal,
                    side.object,
                    &hit.impact,
                    &self.config.fracture,
                );
                match outcome {
                    Ok(outcome) => {
                        report.fractures += 1;
                        report.debris_created += outcome.debris.len();
                    }
                    Err(err) => {
                        log::warn!("object {} did not break: {}", side.object.raw(), err);
                        report.failed_fractures += 1;
                    }
                }
            }
        }

        report.removed = self.removal.drain(&mut self.world);
        self.frames += 1;

        log::trace!(
            "frame {}: dt {:.4}, {} manifolds, {} fractures, {} removed, {} objects",
            self.frames,
            delta,
            report.manifolds,
            report.fractures,
            report.removed.len(),
            self.world.len()
        );

        report
    }
}

impl<W, S> std::fmt::Debug for Simulation<W, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("world", &self.world)
            .field("frames", &self.frames)
            .field("pending_removals", &self.removal.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FractureConfig;
    use crate::fracture::Piece;
    use crate::geometry::ConvexMesh;
    use crate::math::Transform;
    use crate::physics::BodyHandle;
    use crate::sim::testing::{contact, Event, ScriptedWorld, SplitInTwo};
    use glam::Vec3;

    const GREY: [f32; 3] = [0.5, 0.5, 0.5];

    struct Fixture {
        sim: Simulation<ScriptedWorld, SplitInTwo>,
        ground: ObjectId,
        block: ObjectId,
    }

    impl Fixture {
        fn new(breaker: SplitInTwo) -> Self {
            let mut sim = Simulation::new(ScriptedWorld::new(), breaker, SandboxConfig::default());
            let world = sim.world_mut();
            let ground = world
                .add_static_box(Vec3::new(20.0, 0.5, 20.0), Transform::IDENTITY, GREY)
                .unwrap();
            let block = world.add_breakable(&block_piece(Vec3::new(0.0, 1.5, 0.0)), GREY).unwrap();
            Self { sim, ground, block }
        }

        fn body(&self, id: ObjectId) -> Option<BodyHandle> {
            self.sim.world().object(id).map(|o| o.body)
        }

        fn script(&mut self, manifolds: Vec<crate::physics::ContactManifold>) {
            self.sim.world_mut().physics_mut().script_step(manifolds);
        }
    }

    fn block_piece(position: Vec3) -> Piece {
        Piece::new(
            ConvexMesh::cuboid(Vec3::ONE),
            Transform::from_position(position),
            100.0,
        )
    }

    #[test]
    fn test_impulse_above_threshold_breaks() {
        let mut fx = Fixture::new(SplitInTwo::default());
        fx.script(vec![contact(fx.body(fx.ground), fx.body(fx.block), 300.0)]);

        let report = fx.sim.step(1.0 / 60.0);

        assert_eq!(report.fractures, 1);
        assert_eq!(report.debris_created, 2);
        assert_eq!(report.removed, vec![fx.block]);
        assert!(!fx.sim.world().contains(fx.block));
        // ground plus two debris
        assert_eq!(fx.sim.world().len(), 3);
        assert_eq!(fx.sim.world().physics().body_count(), 3);
    }

    #[test]
    fn test_impulse_below_threshold_is_ignored() {
        let mut fx = Fixture::new(SplitInTwo::default());
        fx.script(vec![contact(fx.body(fx.ground), fx.body(fx.block), 200.0)]);

        let report = fx.sim.step(1.0 / 60.0);

        assert_eq!(report.fractures, 0);
        assert!(report.removed.is_empty());
        assert!(fx.sim.world().contains(fx.block));
        assert_eq!(fx.sim.breaker().calls, 0);
    }

    #[test]
    fn test_impulse_at_threshold_is_ignored() {
        let mut fx = Fixture::new(SplitInTwo::default());
        fx.script(vec![contact(fx.body(fx.ground), fx.body(fx.block), 250.0)]);

        let report = fx.sim.step(1.0 / 60.0);

        assert_eq!(report.fractures, 0);
        assert!(fx.sim.world().contains(fx.block));
        assert_eq!(fx.sim.breaker().calls, 0);
    }

    #[test]
    fn test_intact_side_breaks_against_collided_side() {
        let mut fx = Fixture::new(SplitInTwo::default());
        let other = fx
            .sim
            .world_mut()
            .add_breakable(&block_piece(Vec3::new(0.0, 3.5, 0.0)), GREY)
            .unwrap();
        let (ground, block, other_body) = (fx.body(fx.ground), fx.body(fx.block), fx.body(other));
        fx.script(vec![
            contact(ground, block, 300.0),
            contact(block, other_body, 300.0),
        ]);

        let report = fx.sim.step(1.0 / 60.0);

        assert_eq!(fx.sim.breaker().calls, 2);
        assert_eq!(report.fractures, 2);
        assert_eq!(report.removed, vec![fx.block, other]);
        assert!(!fx.sim.world().contains(other));
    }

    #[test]
    fn test_collided_object_breaks_once_per_step() {
        let mut fx = Fixture::new(SplitInTwo::default());
        let (ground, block) = (fx.body(fx.ground), fx.body(fx.block));
        fx.script(vec![
            contact(ground, block, 300.0),
            contact(block, ground, 900.0),
        ]);

        let report = fx.sim.step(1.0 / 60.0);

        assert_eq!(fx.sim.breaker().calls, 1);
        assert_eq!(report.debris_created, 2);
        assert_eq!(report.removed, vec![fx.block]);
    }

    #[test]
    fn test_removal_waits_for_end_of_scan() {
        let mut fx = Fixture::new(SplitInTwo::default());
        let (ground, block) = (fx.body(fx.ground), fx.body(fx.block));
        fx.script(vec![
            contact(ground, block, 300.0),
            contact(ground, None, 50.0),
            contact(None, ground, 50.0),
        ]);
        fx.sim.world().physics().clear_events();

        fx.sim.step(1.0 / 60.0);

        let events = fx.sim.world().physics().events();
        let reads: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, Event::ManifoldRead { .. }))
            .map(|(i, _)| i)
            .collect();
        let first_removal = events
            .iter()
            .position(|e| matches!(e, Event::Remove(_)))
            .unwrap();

        assert_eq!(reads.len(), 3);
        assert!(reads.iter().all(|i| *i < first_removal));
        assert!(events
            .iter()
            .filter_map(|e| match e {
                Event::ManifoldRead { count, .. } => Some(*count),
                _ => None,
            })
            .all(|count| count == 3));
        assert_eq!(events[first_removal], Event::Remove(block.unwrap()));
    }

    #[test]
    fn test_debris_inherit_parent_velocity() {
        let mut fx = Fixture::new(SplitInTwo::default());
        let block = fx.body(fx.block).unwrap();
        let linear = Vec3::new(1.0, 2.0, 3.0);
        let angular = Vec3::new(0.0, 0.5, 0.0);
        let physics = fx.sim.world_mut().physics_mut();
        physics.set_linear_velocity(block, linear);
        physics.set_angular_velocity(block, angular);
        fx.script(vec![contact(fx.body(fx.ground), Some(block), 400.0)]);

        fx.sim.step(1.0 / 60.0);

        let world = fx.sim.world();
        let debris: Vec<ObjectId> = world.ids().filter(|id| *id != fx.ground).collect();
        assert_eq!(debris.len(), 2);
        for id in debris {
            let object = world.object(id).unwrap();
            assert_eq!(object.velocity, Some(linear));
            assert_eq!(object.angular_velocity, Some(angular));
            assert_eq!(object.generation, 1);
            assert_eq!(object.mass, 50.0);
            assert!(object.breakable);
            assert_eq!(world.physics().linear_velocity(object.body), Some(linear));
            assert_eq!(world.physics().angular_velocity(object.body), Some(angular));
        }
    }

    #[test]
    fn test_both_breakable_sides_removed_once() {
        let mut fx = Fixture::new(SplitInTwo::default());
        let other = fx
            .sim
            .world_mut()
            .add_breakable(&block_piece(Vec3::new(0.0, 3.5, 0.0)), GREY)
            .unwrap();
        let (block, other_body) = (fx.body(fx.block), fx.body(other));
        fx.script(vec![
            contact(block, other_body, 500.0),
            contact(other_body, block, 500.0),
        ]);
        fx.sim.world().physics().clear_events();

        let report = fx.sim.step(1.0 / 60.0);

        assert_eq!(report.fractures, 2);
        assert_eq!(report.removed, vec![fx.block, other]);
        let removals = fx
            .sim
            .world()
            .physics()
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::Remove(_)))
            .count();
        assert_eq!(removals, 2);
        assert!(fx.sim.pending_removals().is_empty());
    }

    #[test]
    fn test_sync_copies_physics_transform() {
        let mut fx = Fixture::new(SplitInTwo::default());
        fx.sim.world_mut().physics_mut().drift = Vec3::new(0.0, -0.25, 0.0);

        let report = fx.sim.step(1.0 / 60.0);

        let world = fx.sim.world();
        let body = fx.body(fx.block).unwrap();
        let physics = world.physics().world_transform(body).unwrap();
        assert_eq!(report.synced, 1);
        assert_eq!(world.transform(fx.block), Some(physics));
        assert_eq!(physics.position, Vec3::new(0.0, 1.25, 0.0));
        // static ground is never synced
        assert_eq!(world.transform(fx.ground), Some(Transform::IDENTITY));
    }

    #[test]
    fn test_missing_transform_is_skipped() {
        let mut fx = Fixture::new(SplitInTwo::default());
        let body = fx.body(fx.block).unwrap();
        let before = fx.sim.world().transform(fx.block);
        let physics = fx.sim.world_mut().physics_mut();
        physics.drift = Vec3::X;
        physics.hide_transform(body);

        let report = fx.sim.step(1.0 / 60.0);

        assert_eq!(report.synced, 0);
        assert_eq!(report.sync_skipped, 1);
        assert_eq!(fx.sim.world().transform(fx.block), before);
    }

    #[test]
    fn test_failed_subdivision_keeps_parent() {
        let mut fx = Fixture::new(SplitInTwo {
            fail: true,
            ..SplitInTwo::default()
        });
        let (ground, block) = (fx.body(fx.ground), fx.body(fx.block));
        fx.script(vec![contact(ground, block, 300.0), contact(ground, block, 300.0)]);

        let report = fx.sim.step(1.0 / 60.0);

        assert_eq!(report.failed_fractures, 1);
        assert_eq!(fx.sim.breaker().calls, 1);
        assert!(report.removed.is_empty());
        assert!(fx.sim.world().object(fx.block).unwrap().collided);

        fx.sim.step(1.0 / 60.0);
        assert!(!fx.sim.world().object(fx.block).unwrap().collided);
    }

    #[test]
    fn test_rejected_fragments_keep_parent() {
        let mut fx = Fixture::new(SplitInTwo::default());
        fx.sim.world_mut().physics_mut().reject_hulls = true;
        fx.script(vec![contact(fx.body(fx.ground), fx.body(fx.block), 300.0)]);

        let report = fx.sim.step(1.0 / 60.0);

        assert_eq!(report.failed_fractures, 1);
        assert!(fx.sim.world().contains(fx.block));
        assert_eq!(fx.sim.world().len(), 2);
    }

    #[test]
    fn test_generation_limit_makes_debris_unbreakable() {
        let config = SandboxConfig::default()
            .with_fracture(FractureConfig::default().with_max_generation(Some(1)));
        let mut sim = Simulation::new(ScriptedWorld::new(), SplitInTwo::default(), config);
        let block = sim
            .world_mut()
            .add_breakable(&block_piece(Vec3::ZERO), GREY)
            .unwrap();
        let body = sim.world().object(block).map(|o| o.body);
        sim.world_mut().physics_mut().script_step(vec![contact(None, body, 300.0)]);

        sim.step(1.0 / 60.0);

        let world = sim.world();
        assert_eq!(world.len(), 2);
        assert!(world.ids().all(|id| !world.object(id).unwrap().breakable));
    }

    #[test]
    fn test_unknown_bodies_are_ignored() {
        let mut fx = Fixture::new(SplitInTwo::default());
        let stranger = Some(BodyHandle::new(99, 0));
        fx.script(vec![contact(stranger, None, 1000.0), contact(None, None, 1000.0)]);

        let report = fx.sim.step(1.0 / 60.0);

        assert_eq!(report.manifolds, 2);
        assert_eq!(report.fractures, 0);
        assert_eq!(fx.sim.world().len(), 2);
    }

    #[test]
    fn test_step_clamps_delta() {
        let mut fx = Fixture::new(SplitInTwo::default());
        fx.sim.world().physics().clear_events();

        assert_eq!(fx.sim.step(5.0).delta, 0.1);
        assert_eq!(fx.sim.step(f32::NAN).delta, 0.0);
        assert_eq!(fx.sim.frames(), 2);
        assert_eq!(fx.sim.world().physics().events()[0], Event::Step(0.1));
    }
}
