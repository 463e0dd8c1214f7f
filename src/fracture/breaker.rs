use std::f32::consts::{PI, TAU};

use glam::{Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::config::FractureConfig;
use crate::geometry::{ConvexMesh, GeometryError};
use crate::math::{Plane, Transform};

/// Vertices closer than this to a cut plane go to both sides.
const SMALL_DELTA: f32 = 1e-4;

/// A piece needs more than this many points to survive a cut.
const MIN_PIECE_POINTS: usize = 4;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FractureError {
    #[error("degenerate piece: {0}")]
    Geometry(#[from] GeometryError),
    #[error("impact normal is zero or not finite")]
    InvalidNormal,
    #[error("subdivision produced no fragments")]
    NoFragments,
    #[error("object {0} is not in the world")]
    MissingObject(u64),
}

/// A convex chunk of matter: hull mesh in its local frame, placement and mass.
///
/// Velocities are zero on freshly cut pieces; whoever spawns them fills them
/// in.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub mesh: ConvexMesh,
    pub transform: Transform,
    pub mass: f32,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl Piece {
    pub fn new(mesh: ConvexMesh, transform: Transform, mass: f32) -> Self {
        Self {
            mesh,
            transform,
            mass,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        }
    }

    pub fn world_vertices(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.mesh
            .vertices()
            .iter()
            .map(|v| self.transform.transform_point(*v))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubdivisionParams {
    pub radial_iterations: u32,
    pub random_iterations: u32,
    pub piece_mass_ratio: f32,
}

impl Default for SubdivisionParams {
    fn default() -> Self {
        Self::from(&FractureConfig::default())
    }
}

impl From<&FractureConfig> for SubdivisionParams {
    fn from(config: &FractureConfig) -> Self {
        Self {
            radial_iterations: config.radial_iterations,
            random_iterations: config.random_iterations,
            piece_mass_ratio: config.piece_mass_ratio,
        }
    }
}

impl SubdivisionParams {
    pub fn max_total_iterations(&self) -> u32 {
        self.radial_iterations + self.random_iterations
    }
}

pub trait Subdivider {
    fn subdivide_by_impact(
        &mut self,
        piece: &Piece,
        impact_point: Vec3,
        impact_normal: Vec3,
        params: &SubdivisionParams,
    ) -> Result<Vec<Piece>, FractureError>;
}

/// Everything fixed for the duration of one impact.
struct Impact {
    point: Vec3,
    normal: Vec3,
    origin: Vec3,
    first_plane: Plane,
    params: SubdivisionParams,
}

#[derive(Debug, Clone)]
pub struct ConvexBreaker {
    rng: ChaCha8Rng,
}

impl ConvexBreaker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Splits `piece` by a world-space plane. The first result lies on the
    /// negative side, the second on the positive side. Each surviving side is
    /// re-centred on the mean of its points; when both survive each gets
    /// `mass_ratio` of the parent mass.
    pub fn cut_by_plane(
        &self,
        piece: &Piece,
        plane: &Plane,
        mass_ratio: f32,
    ) -> (Option<Piece>, Option<Piece>) {
        let local = plane.to_local(&piece.transform);
        let vertices = piece.mesh.vertices();
        let distances: Vec<f32> = vertices
            .iter()
            .map(|v| local.distance_to_point(*v))
            .collect();

        let mut below = Vec::with_capacity(vertices.len());
        let mut above = Vec::with_capacity(vertices.len());

        for (v, d) in vertices.iter().zip(&distances) {
            if *d < -SMALL_DELTA {
                below.push(*v);
            } else if *d > SMALL_DELTA {
                above.push(*v);
            } else {
                below.push(*v);
                above.push(*v);
            }
        }

        for (a, b) in piece.mesh.edges() {
            let (da, db) = (distances[a as usize], distances[b as usize]);
            let crosses = (da < -SMALL_DELTA && db > SMALL_DELTA)
                || (da > SMALL_DELTA && db < -SMALL_DELTA);
            if crosses {
                let t = da / (da - db);
                let (va, vb) = (vertices[a as usize], vertices[b as usize]);
                let p = va + (vb - va) * t;
                below.push(p);
                above.push(p);
            }
        }

        let mut first = Self::piece_from_points(piece, &below);
        let mut second = Self::piece_from_points(piece, &above);

        if let (Some(a), Some(b)) = (first.as_mut(), second.as_mut()) {
            a.mass = piece.mass * mass_ratio;
            b.mass = piece.mass * mass_ratio;
        }

        (first, second)
    }

    fn piece_from_points(parent: &Piece, points: &[Vec3]) -> Option<Piece> {
        if points.len() <= MIN_PIECE_POINTS {
            return None;
        }

        let center = points.iter().copied().sum::<Vec3>() / points.len() as f32;
        let centred: Vec<Vec3> = points.iter().map(|p| *p - center).collect();
        let mesh = ConvexMesh::from_points(&centred).ok()?;

        let transform = Transform::new(
            parent.transform.transform_point(center),
            parent.transform.rotation,
        );
        Some(Piece::new(mesh, transform, parent.mass))
    }

    fn subdivide_radial(
        &mut self,
        piece: Piece,
        start_angle: f32,
        end_angle: f32,
        iteration: u32,
        impact: &Impact,
        debris: &mut Vec<Piece>,
    ) {
        let stop_roll: f32 = self.rng.random();
        if stop_roll < iteration as f32 * 0.05
            || iteration > impact.params.max_total_iterations()
        {
            debris.push(piece);
            return;
        }

        let (plane, angle) = if iteration == 0 {
            (Some(impact.first_plane), PI)
        } else if iteration <= impact.params.radial_iterations {
            let roll: f32 = self.rng.random();
            let angle = (end_angle - start_angle) * (0.2 + 0.6 * roll) + start_angle;
            // rotate the origin about the normal axis through the impact point
            let rotated = Quat::from_axis_angle(impact.normal, angle)
                * (impact.origin - impact.point)
                + impact.point;
            let plane = Plane::from_coplanar_points(
                impact.point,
                impact.point + impact.normal,
                rotated,
            );
            (plane, angle)
        } else {
            let roll: f32 = self.rng.random();
            let parity = (iteration & 1) as f32;
            let angle = (0.5 * parity + 0.2 * (2.0 - roll)) * PI;
            let center = piece.transform.position;
            let rotated =
                Quat::from_axis_angle(impact.normal, angle) * (impact.point - center) + center;
            let plane = Plane::from_coplanar_points(center, center + impact.normal, rotated);
            (plane, angle)
        };

        let Some(plane) = plane else {
            debris.push(piece);
            return;
        };

        match self.cut_by_plane(&piece, &plane, impact.params.piece_mass_ratio) {
            (None, None) => debris.push(piece),
            (first, second) => {
                if let Some(first) = first {
                    self.subdivide_radial(first, start_angle, angle, iteration + 1, impact, debris);
                }
                if let Some(second) = second {
                    self.subdivide_radial(second, angle, end_angle, iteration + 1, impact, debris);
                }
            }
        }
    }
}

impl Default for ConvexBreaker {
    fn default() -> Self {
        Self::new(FractureConfig::default().seed)
    }
}

impl Subdivider for ConvexBreaker {
    fn subdivide_by_impact(
        &mut self,
        piece: &Piece,
        impact_point: Vec3,
        impact_normal: Vec3,
        params: &SubdivisionParams,
    ) -> Result<Vec<Piece>, FractureError> {
        if !impact_point.is_finite() {
            return Err(FractureError::InvalidNormal);
        }
        let normal = impact_normal
            .try_normalize()
            .ok_or(FractureError::InvalidNormal)?;
        if piece.mesh.vertex_count() <= MIN_PIECE_POINTS {
            return Err(GeometryError::TooFewPoints(piece.mesh.vertex_count()).into());
        }

        let origin = piece.transform.position;
        // first cut contains the impact point, the centre and the normal;
        // if those are collinear fall back to any plane along the normal
        let first_plane = Plane::from_coplanar_points(impact_point, origin, impact_point + normal)
            .or_else(|| Plane::from_normal_and_point(normal.any_orthonormal_vector(), impact_point))
            .ok_or(FractureError::InvalidNormal)?;

        let impact = Impact {
            point: impact_point,
            normal,
            origin,
            first_plane,
            params: *params,
        };

        let mut debris = Vec::new();
        self.subdivide_radial(piece.clone(), 0.0, TAU, 0, &impact, &mut debris);

        let only_parent = debris.len() == 1 && debris[0] == *piece;
        if debris.is_empty() || only_parent {
            return Err(FractureError::NoFragments);
        }
        Ok(debris)
    }
}
