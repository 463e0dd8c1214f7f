use std::collections::BTreeSet;
use std::f32::consts::PI;

use glam::Vec3;
use rapier3d::na::Point3;
use rapier3d::parry::transformation;
use thiserror::Error;

use super::vertex::Vertex;

const DEGENERATE_EPSILON: f32 = 1e-4;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("convex hull needs at least 4 points, got {0}")]
    TooFewPoints(usize),
    #[error("points do not span a volume")]
    Degenerate,
}

/// Closed convex hull in the local frame of its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexMesh {
    vertices: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
}

impl ConvexMesh {
    /// Convex hull of an arbitrary point cloud.
    pub fn from_points(points: &[Vec3]) -> Result<Self, GeometryError> {
        check_spans_volume(points)?;

        let cloud: Vec<Point3<f32>> = points.iter().map(|p| Point3::new(p.x, p.y, p.z)).collect();
        let (hull_points, hull_triangles) = transformation::convex_hull(&cloud);
        if hull_triangles.is_empty() {
            return Err(GeometryError::Degenerate);
        }

        // keep only the points referenced by a face, renumbered in order
        let mut remap = vec![u32::MAX; hull_points.len()];
        let mut vertices = Vec::new();
        let mut triangles = Vec::with_capacity(hull_triangles.len());
        for tri in &hull_triangles {
            let mut out = [0u32; 3];
            for (slot, &index) in out.iter_mut().zip(tri) {
                let index = index as usize;
                if remap[index] == u32::MAX {
                    remap[index] = vertices.len() as u32;
                    let p = hull_points[index];
                    vertices.push(Vec3::new(p.x, p.y, p.z));
                }
                *slot = remap[index];
            }
            triangles.push(out);
        }

        let mut mesh = Self {
            vertices,
            triangles,
        };
        mesh.orient_outward();
        Ok(mesh)
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        let h = half_extents;
        let vertices = vec![
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ];
        let triangles = vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [3, 6, 2],
            [3, 7, 6],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ];
        Self {
            vertices,
            triangles,
        }
    }

    /// Latitude/longitude sphere with single pole vertices.
    pub fn sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut vertices = vec![Vec3::Y * radius];
        let mut triangles = Vec::new();

        for ring in 1..rings {
            let phi = PI * ring as f32 / rings as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();

            for seg in 0..segments {
                let theta = 2.0 * PI * seg as f32 / segments as f32;
                let (sin_theta, cos_theta) = theta.sin_cos();
                vertices.push(Vec3::new(sin_phi * cos_theta, cos_phi, sin_phi * sin_theta) * radius);
            }
        }

        let bottom = vertices.len() as u32;
        vertices.push(Vec3::NEG_Y * radius);

        let ring_start = |ring: u32| 1 + (ring - 1) * segments;

        for seg in 0..segments {
            let next = (seg + 1) % segments;
            triangles.push([0, ring_start(1) + next, ring_start(1) + seg]);
        }

        for ring in 1..rings - 1 {
            let curr = ring_start(ring);
            let below = ring_start(ring + 1);
            for seg in 0..segments {
                let next = (seg + 1) % segments;
                triangles.push([curr + seg, curr + next, below + seg]);
                triangles.push([curr + next, below + next, below + seg]);
            }
        }

        let last = ring_start(rings - 1);
        for seg in 0..segments {
            let next = (seg + 1) % segments;
            triangles.push([bottom, last + seg, last + next]);
        }

        let mut mesh = Self {
            vertices,
            triangles,
        };
        mesh.orient_outward();
        mesh
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Unique undirected edges, smaller index first.
    pub fn edges(&self) -> Vec<(u32, u32)> {
        let mut edges = BTreeSet::new();
        for tri in &self.triangles {
            for k in 0..3 {
                let (a, b) = (tri[k], tri[(k + 1) % 3]);
                edges.insert((a.min(b), a.max(b)));
            }
        }
        edges.into_iter().collect()
    }

    /// Mean of the hull vertices; cheap stand-in for the centre of mass.
    pub fn centroid(&self) -> Vec3 {
        if self.vertices.is_empty() {
            return Vec3::ZERO;
        }
        self.vertices.iter().copied().sum::<Vec3>() / self.vertices.len() as f32
    }

    pub fn volume(&self) -> f32 {
        let origin = self.centroid();
        self.triangles
            .iter()
            .map(|t| {
                let [a, b, c] = self.corners(t);
                (a - origin).dot((b - origin).cross(c - origin)) / 6.0
            })
            .sum::<f32>()
            .abs()
    }

    pub fn bounding_radius(&self) -> f32 {
        self.vertices
            .iter()
            .map(|v| v.length())
            .fold(0.0, f32::max)
    }

    /// Whether `point` lies inside the hull, allowing `tolerance` of slack.
    pub fn contains_point(&self, point: Vec3, tolerance: f32) -> bool {
        self.triangles.iter().all(|t| {
            let [a, b, c] = self.corners(t);
            let normal = (b - a).cross(c - a).normalize_or_zero();
            normal.dot(point - a) <= tolerance
        })
    }

    /// Flat-shaded triangle soup, three vertices per face.
    pub fn to_vertices(&self) -> Vec<Vertex> {
        let mut out = Vec::with_capacity(self.triangles.len() * 3);
        for tri in &self.triangles {
            let [a, b, c] = self.corners(tri);
            let normal = (b - a).cross(c - a).normalize_or_zero().to_array();
            for p in [a, b, c] {
                out.push(Vertex {
                    position: p.to_array(),
                    normal,
                });
            }
        }
        out
    }

    fn corners(&self, tri: &[u32; 3]) -> [Vec3; 3] {
        [
            self.vertices[tri[0] as usize],
            self.vertices[tri[1] as usize],
            self.vertices[tri[2] as usize],
        ]
    }

    fn orient_outward(&mut self) {
        let center = self.centroid();
        let vertices = &self.vertices;
        for tri in &mut self.triangles {
            let a = vertices[tri[0] as usize];
            let b = vertices[tri[1] as usize];
            let c = vertices[tri[2] as usize];
            let normal = (b - a).cross(c - a);
            if normal.dot(a - center) < 0.0 {
                tri.swap(1, 2);
            }
        }
    }
}

/// Rejects clouds that are empty, collinear or coplanar before they reach the
/// hull builder.
fn check_spans_volume(points: &[Vec3]) -> Result<(), GeometryError> {
    if points.len() < 4 {
        return Err(GeometryError::TooFewPoints(points.len()));
    }

    let a = points[0];
    let b = points
        .iter()
        .copied()
        .max_by(|p, q| a.distance_squared(*p).total_cmp(&a.distance_squared(*q)))
        .ok_or(GeometryError::Degenerate)?;
    let scale = a.distance(b);
    if scale < DEGENERATE_EPSILON {
        return Err(GeometryError::Degenerate);
    }
    let epsilon = DEGENERATE_EPSILON * scale.max(1.0);

    let axis = (b - a) / scale;
    let off_line = |p: Vec3| (p - a).reject_from_normalized(axis).length();
    let c = points
        .iter()
        .copied()
        .max_by(|p, q| off_line(*p).total_cmp(&off_line(*q)))
        .ok_or(GeometryError::Degenerate)?;
    if off_line(c) < epsilon {
        return Err(GeometryError::Degenerate);
    }

    let normal = (b - a).cross(c - a).normalize();
    let max_height = points
        .iter()
        .map(|p| normal.dot(*p - a).abs())
        .fold(0.0, f32::max);
    if max_height < epsilon {
        return Err(GeometryError::Degenerate);
    }

    Ok(())
}
