//! View frustum for extent culling. Planes are extracted from a combined
//! view-projection matrix (Gribb/Hartmann) with inward-pointing normals, so a
//! point is inside when every plane's signed distance is non-negative.

use glam::{DMat4, DVec3, DVec4};

use crate::bounds::{Aabb, BoundingCylinder, Extent};

/// A plane in Hessian normal form: `normal . p + d = 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: DVec3,
    pub d: f64,
}

impl Plane {
    fn from_coefficients(v: DVec4) -> Self {
        let normal = DVec3::new(v.x, v.y, v.z);
        let len = normal.length();
        if len > 0.0 {
            Plane {
                normal: normal / len,
                d: v.w / len,
            }
        } else {
            Plane { normal, d: v.w }
        }
    }

    /// Signed distance from the plane; positive on the inside half-space.
    #[must_use]
    pub fn distance_to(&self, p: DVec3) -> f64 {
        self.normal.dot(p) + self.d
    }
}

/// The six planes of a view frustum, ordered left, right, bottom, top,
/// near, far.
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    planes: [Plane; 6],
}

impl Frustum {
    /// Extract the frustum from a combined view-projection matrix.
    #[must_use]
    pub fn from_view_projection(m: &DMat4) -> Self {
        let r0 = m.row(0);
        let r1 = m.row(1);
        let r2 = m.row(2);
        let r3 = m.row(3);
        Self {
            planes: [
                Plane::from_coefficients(r3 + r0), // left
                Plane::from_coefficients(r3 - r0), // right
                Plane::from_coefficients(r3 + r1), // bottom
                Plane::from_coefficients(r3 - r1), // top
                Plane::from_coefficients(r3 + r2), // near
                Plane::from_coefficients(r3 - r2), // far
            ],
        }
    }

    #[must_use]
    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    /// True if a sphere intersects or lies inside the frustum.
    #[must_use]
    pub fn intersects_sphere(&self, center: DVec3, radius: f64) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to(center) >= -radius)
    }

    /// True if the box intersects or lies inside the frustum. Uses the
    /// effective radius of the box along each plane normal, so it can report
    /// an intersection for a box slightly outside a corner.
    #[must_use]
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let center = aabb.center();
        let half = aabb.half_extents();
        self.planes.iter().all(|plane| {
            let effective_radius = half.x * plane.normal.x.abs()
                + half.y * plane.normal.y.abs()
                + half.z * plane.normal.z.abs();
            plane.distance_to(center) >= -effective_radius
        })
    }

    /// True if a bounding cylinder intersects the frustum. Tested through
    /// its bounding sphere.
    #[must_use]
    pub fn intersects_cylinder(&self, cylinder: &BoundingCylinder) -> bool {
        self.intersects_sphere(cylinder.center(), cylinder.diameter() * 0.5)
    }

    #[must_use]
    pub fn intersects_extent(&self, extent: &Extent) -> bool {
        match extent {
            Extent::Aabb(aabb) => self.intersects_aabb(aabb),
            Extent::Cylinder(cylinder) => self.intersects_cylinder(cylinder),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn look_down_neg_z() -> Frustum {
        // Eye at origin, looking down -Z, 90 degree fov, square aspect.
        let proj = DMat4::perspective_rh(std::f64::consts::FRAC_PI_2, 1.0, 0.1, 1000.0);
        let view = DMat4::look_at_rh(DVec3::ZERO, DVec3::new(0.0, 0.0, -1.0), DVec3::Y);
        Frustum::from_view_projection(&(proj * view))
    }

    #[test]
    fn test_sphere_in_front_is_visible() {
        let frustum = look_down_neg_z();
        assert!(frustum.intersects_sphere(DVec3::new(0.0, 0.0, -10.0), 1.0));
    }

    #[test]
    fn test_sphere_behind_eye_is_culled() {
        let frustum = look_down_neg_z();
        assert!(!frustum.intersects_sphere(DVec3::new(0.0, 0.0, 10.0), 1.0));
    }

    #[test]
    fn test_sphere_straddling_side_plane_is_visible() {
        let frustum = look_down_neg_z();
        // At z=-10 with 90 deg fov the right plane is at x=10.
        assert!(frustum.intersects_sphere(DVec3::new(10.5, 0.0, -10.0), 1.0));
        assert!(!frustum.intersects_sphere(DVec3::new(13.0, 0.0, -10.0), 1.0));
    }

    #[test]
    fn test_aabb_inside_and_outside() {
        let frustum = look_down_neg_z();
        let inside = Aabb::new(DVec3::new(-1.0, -1.0, -5.0), DVec3::new(1.0, 1.0, -3.0));
        assert!(frustum.intersects_aabb(&inside));
        let outside = Aabb::new(DVec3::new(50.0, 50.0, -5.0), DVec3::new(52.0, 52.0, -3.0));
        assert!(!frustum.intersects_aabb(&outside));
    }

    #[test]
    fn test_cylinder_uses_bounding_sphere() {
        let frustum = look_down_neg_z();
        let cylinder = BoundingCylinder {
            bottom: DVec3::new(0.0, -2.0, -20.0),
            top: DVec3::new(0.0, 2.0, -20.0),
            radius: 1.0,
        };
        assert!(frustum.intersects_cylinder(&cylinder));
    }
}
