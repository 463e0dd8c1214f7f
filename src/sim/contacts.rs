use glam::Vec3;

use super::object::ObjectId;
use super::world::ObjectWorld;
use crate::physics::{BodyHandle, ContactManifold, ContactPoint, PhysicsWorld};

/// Strongest penetrating contact of one manifold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    pub impulse: f32,
    pub point: Vec3,
    pub normal: Vec3,
}

/// One side of a manifold resolved to its object, flags read at scan time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactSide {
    pub object: ObjectId,
    pub breakable: bool,
    pub collided: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManifoldHit {
    pub sides: [Option<ContactSide>; 2],
    pub impact: Impact,
}

pub struct ContactScanner;

impl ContactScanner {
    /// Picks the penetrating point with the largest applied impulse. `None`
    /// when no point penetrates. Ties keep the first point.
    pub fn select_impact(points: &[ContactPoint]) -> Option<Impact> {
        let mut penetrating = false;
        let mut best = Impact {
            impulse: 0.0,
            point: Vec3::ZERO,
            normal: Vec3::ZERO,
        };

        for point in points.iter().filter(|p| p.distance < 0.0) {
            penetrating = true;
            if point.applied_impulse > best.impulse {
                best = Impact {
                    impulse: point.applied_impulse,
                    point: point.position_on_b,
                    normal: point.normal_on_b,
                };
            }
        }

        penetrating.then_some(best)
    }

    pub fn resolve_side<W: PhysicsWorld>(
        world: &ObjectWorld<W>,
        body: Option<BodyHandle>,
    ) -> Option<ContactSide> {
        let id = world.object_for_body(body?)?;
        let object = world.object(id)?;
        Some(ContactSide {
            object: id,
            breakable: object.breakable,
            collided: object.collided,
        })
    }

    /// Resolves a manifold to the objects involved and its impact, or `None`
    /// if it cannot cause a fracture this step.
    pub fn scan_manifold<W: PhysicsWorld>(
        world: &ObjectWorld<W>,
        manifold: &ContactManifold,
    ) -> Option<ManifoldHit> {
        let side0 = Self::resolve_side(world, manifold.body0);
        let side1 = Self::resolve_side(world, manifold.body1);

        if side0.is_none() && side1.is_none() {
            return None;
        }

        let breakable = |s: &Option<ContactSide>| s.is_some_and(|s| s.breakable);
        let collided = |s: &Option<ContactSide>| s.is_some_and(|s| s.collided);

        if (!breakable(&side0) && !breakable(&side1)) || (collided(&side0) && collided(&side1)) {
            return None;
        }

        let impact = Self::select_impact(&manifold.points)?;
        Some(ManifoldHit {
            sides: [side0, side1],
            impact,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(distance: f32, impulse: f32, x: f32) -> ContactPoint {
        ContactPoint {
            distance,
            applied_impulse: impulse,
            position_on_b: Vec3::new(x, 0.0, 0.0),
            normal_on_b: Vec3::Y,
        }
    }

    #[test]
    fn test_no_penetration_means_no_impact() {
        let points = [point(0.01, 900.0, 1.0), point(0.0, 900.0, 2.0)];
        assert_eq!(ContactScanner::select_impact(&points), None);
        assert_eq!(ContactScanner::select_impact(&[]), None);
    }

    #[test]
    fn test_largest_penetrating_impulse_wins() {
        let points = [
            point(-0.01, 120.0, 1.0),
            point(0.02, 5000.0, 2.0),
            point(-0.03, 310.0, 3.0),
            point(-0.02, 180.0, 4.0),
        ];
        let impact = ContactScanner::select_impact(&points).unwrap();

        assert_eq!(impact.impulse, 310.0);
        assert_eq!(impact.point.x, 3.0);
    }

    #[test]
    fn test_tie_keeps_first_point() {
        let points = [point(-0.01, 300.0, 1.0), point(-0.05, 300.0, 2.0)];
        let impact = ContactScanner::select_impact(&points).unwrap();
        assert_eq!(impact.point.x, 1.0);
    }

    #[test]
    fn test_penetrating_without_impulse_reports_zero() {
        let points = [point(-0.01, 0.0, 1.0)];
        let impact = ContactScanner::select_impact(&points).unwrap();
        assert_eq!(impact.impulse, 0.0);
    }
}
