use glam::Vec3;

use super::Transform;

/// Plane `normal . x + constant = 0` with a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f32,
}

impl Plane {
    pub fn new(normal: Vec3, constant: f32) -> Self {
        Self { normal, constant }
    }

    pub fn from_normal_and_point(normal: Vec3, point: Vec3) -> Option<Self> {
        let normal = normal.try_normalize()?;
        Some(Self {
            normal,
            constant: -point.dot(normal),
        })
    }

    /// Plane through three points, wound counter-clockwise when seen from the
    /// normal side. `None` when the points are collinear.
    pub fn from_coplanar_points(a: Vec3, b: Vec3, c: Vec3) -> Option<Self> {
        let normal = (c - b).cross(a - b).try_normalize()?;
        Some(Self {
            normal,
            constant: -a.dot(normal),
        })
    }

    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.constant
    }

    pub fn coplanar_point(&self) -> Vec3 {
        self.normal * -self.constant
    }

    /// Expresses a world-space plane in the local frame of `transform`.
    pub fn to_local(&self, transform: &Transform) -> Self {
        let normal = transform.inverse_transform_direction(self.normal);
        let point = transform.inverse_transform_point(self.coplanar_point());
        Self {
            normal,
            constant: -point.dot(normal),
        }
    }
}
