//! The demo scene: ground, two towers joined by a bridge, a row of stones
//! and a mountain, plus balls thrown from the camera.

use glam::Vec3;

use crate::config::{FractureConfig, SandboxConfig};
use crate::error::Result;
use crate::fracture::{ConvexBreaker, Piece, Subdivider};
use crate::geometry::{ConvexMesh, Ray};
use crate::math::Transform;
use crate::physics::{PhysicsError, PhysicsWorld, RapierWorld};
use crate::sim::{ObjectId, Simulation};

pub const STONE_COUNT: usize = 8;

const GROUND_COLOR: u32 = 0xffffff;
const TOWER_COLORS: [u32; 2] = [0xb03014, 0xb03214];
const BRIDGE_COLOR: u32 = 0xb3b865;
const STONE_COLOR: u32 = 0xb0b0b0;
const MOUNTAIN_COLOR: u32 = 0xb03814;
const BALL_COLOR: u32 = 0x202020;

fn rgb(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
    [channel(16), channel(8), channel(0)]
}

/// Ids of everything [`Sandbox::build`] placed.
#[derive(Debug, Clone, PartialEq)]
pub struct SandboxLayout {
    pub ground: ObjectId,
    pub towers: [ObjectId; 2],
    pub bridge: ObjectId,
    pub stones: Vec<ObjectId>,
    pub mountain: ObjectId,
}

impl SandboxLayout {
    pub fn breakables(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.towers
            .iter()
            .copied()
            .chain(std::iter::once(self.bridge))
            .chain(self.stones.iter().copied())
            .chain(std::iter::once(self.mountain))
    }
}

pub struct Sandbox;

impl Sandbox {
    /// Defaults plus a minimum break size, so debris stop splitting once
    /// they are small instead of crumbling into slivers.
    pub fn demo_config() -> SandboxConfig {
        let fracture = FractureConfig::default()
            .with_min_break_size(Some(FractureConfig::MIN_BREAK_SIZE));
        SandboxConfig::default().with_fracture(fracture)
    }

    /// Simulation on the rapier backend with the seeded convex breaker.
    pub fn rapier(config: SandboxConfig) -> Simulation<RapierWorld, ConvexBreaker> {
        let physics = RapierWorld::new(&config.physics);
        Simulation::with_default_breaker(physics, config)
    }

    pub fn build<W: PhysicsWorld, S: Subdivider>(
        sim: &mut Simulation<W, S>,
    ) -> Result<SandboxLayout> {
        let world = sim.world_mut();

        let ground = world.add_static_box(
            Vec3::new(20.0, 0.5, 20.0),
            Transform::from_position(Vec3::new(0.0, -0.5, 0.0)),
            rgb(GROUND_COLOR),
        )?;

        let tower_half = Vec3::new(2.0, 5.0, 2.0);
        let mut towers = [ground; 2];
        for ((slot, x), color) in towers.iter_mut().zip([-8.0, 8.0]).zip(TOWER_COLORS) {
            let piece = Self::block(tower_half, Vec3::new(x, 5.0, 0.0), 1000.0);
            *slot = world.add_breakable(&piece, rgb(color))?;
        }

        let bridge = world.add_breakable(
            &Self::block(Vec3::new(7.0, 0.2, 1.5), Vec3::new(0.0, 10.2, 0.0), 100.0),
            rgb(BRIDGE_COLOR),
        )?;

        let stone_half = Vec3::new(1.0, 2.0, 0.15);
        let stones = (0..STONE_COUNT)
            .map(|i| {
                let z = 15.0 * (0.5 - i as f32 / (STONE_COUNT + 1) as f32);
                let piece = Self::block(stone_half, Vec3::new(0.0, 2.0, z), 120.0);
                world.add_breakable(&piece, rgb(STONE_COLOR))
            })
            .collect::<std::result::Result<Vec<_>, PhysicsError>>()?;

        let mountain_points = [
            Vec3::new(-4.0, -5.0, -4.0),
            Vec3::new(4.0, -5.0, -4.0),
            Vec3::new(4.0, -5.0, 4.0),
            Vec3::new(-4.0, -5.0, 4.0),
            Vec3::new(0.0, 5.0, 0.0),
        ];
        // base resting on the ground
        let mountain_piece = Piece::new(
            ConvexMesh::from_points(&mountain_points)?,
            Transform::from_position(Vec3::new(5.0, 5.0, -7.0)),
            860.0,
        );
        let mountain = world.add_breakable(&mountain_piece, rgb(MOUNTAIN_COLOR))?;

        log::info!(
            "sandbox ready: {} objects, {} breakable",
            world.len(),
            world.len() - 1
        );

        Ok(SandboxLayout {
            ground,
            towers,
            bridge,
            stones,
            mountain,
        })
    }

    /// Launches a ball one unit along `ray`, moving along it at the
    /// configured speed.
    pub fn throw_ball<W: PhysicsWorld, S: Subdivider>(
        sim: &mut Simulation<W, S>,
        ray: &Ray,
    ) -> std::result::Result<ObjectId, PhysicsError> {
        let ball = sim.config().ball.clone();
        let position = ray.origin + ray.direction;
        let velocity = ray.direction * ball.speed;

        let id = sim.world_mut().add_ball(
            ball.radius,
            ball.mass,
            Transform::from_position(position),
            velocity,
            rgb(BALL_COLOR),
        )?;
        log::debug!("ball {} thrown from {:?}", id.raw(), position);
        Ok(id)
    }

    fn block(half_extents: Vec3, position: Vec3, mass: f32) -> Piece {
        Piece::new(
            ConvexMesh::cuboid(half_extents),
            Transform::from_position(position),
            mass,
        )
    }
}
