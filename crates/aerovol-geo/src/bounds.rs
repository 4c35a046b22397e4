//! Bounding volumes for airspace extents: axis-aligned boxes in model
//! coordinates and bounding cylinders for vertically extruded shapes.

use glam::DVec3;

/// Axis-Aligned Bounding Box in f64 model space.
///
/// Invariant: min.x <= max.x, min.y <= max.y, min.z <= max.z.
/// The constructor enforces this by swapping components if needed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    /// Create an AABB from two corners. Automatically sorts components so
    /// that min <= max on every axis.
    #[must_use]
    pub fn new(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Smallest AABB enclosing every point. `None` for an empty slice.
    #[must_use]
    pub fn from_points(points: &[DVec3]) -> Option<Self> {
        let first = *points.first()?;
        let mut aabb = Aabb {
            min: first,
            max: first,
        };
        for p in &points[1..] {
            aabb.min = aabb.min.min(*p);
            aabb.max = aabb.max.max(*p);
        }
        Some(aabb)
    }

    /// Returns the smallest AABB enclosing both self and other.
    #[must_use]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[must_use]
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Length of the main diagonal.
    #[must_use]
    pub fn diameter(&self) -> f64 {
        (self.max - self.min).length()
    }

    #[must_use]
    pub fn contains_point(&self, p: DVec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    #[must_use]
    pub fn half_extents(&self) -> DVec3 {
        (self.max - self.min) * 0.5
    }
}

/// A bounding cylinder with arbitrary axis, the tight fit for vertically
/// extruded rotational shapes standing on a curved surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingCylinder {
    /// Center of the bottom disk.
    pub bottom: DVec3,
    /// Center of the top disk.
    pub top: DVec3,
    pub radius: f64,
}

impl BoundingCylinder {
    #[must_use]
    pub fn center(&self) -> DVec3 {
        (self.bottom + self.top) * 0.5
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        (self.top - self.bottom).length()
    }

    /// Diameter of the bounding sphere around the cylinder.
    #[must_use]
    pub fn diameter(&self) -> f64 {
        let half_height = self.height() * 0.5;
        2.0 * (half_height * half_height + self.radius * self.radius).sqrt()
    }

    /// Loosest AABB around the cylinder: a box around its bounding sphere.
    #[must_use]
    pub fn to_aabb(&self) -> Aabb {
        let r = self.diameter() * 0.5;
        let c = self.center();
        Aabb {
            min: c - DVec3::splat(r),
            max: c + DVec3::splat(r),
        }
    }
}

/// The bounding volume of a shape. Cylinder where the fit is meaningful,
/// AABB otherwise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Extent {
    Aabb(Aabb),
    Cylinder(BoundingCylinder),
}

impl Extent {
    #[must_use]
    pub fn center(&self) -> DVec3 {
        match self {
            Extent::Aabb(b) => b.center(),
            Extent::Cylinder(c) => c.center(),
        }
    }

    #[must_use]
    pub fn diameter(&self) -> f64 {
        match self {
            Extent::Aabb(b) => b.diameter(),
            Extent::Cylinder(c) => c.diameter(),
        }
    }

    /// Radius of a sphere around the extent's center containing the extent.
    #[must_use]
    pub fn bounding_sphere_radius(&self) -> f64 {
        self.diameter() * 0.5
    }

    /// Union of two extents. Mixed kinds are promoted to an AABB union.
    #[must_use]
    pub fn union(&self, other: &Extent) -> Extent {
        let a = match self {
            Extent::Aabb(b) => *b,
            Extent::Cylinder(c) => c.to_aabb(),
        };
        let b = match other {
            Extent::Aabb(b) => *b,
            Extent::Cylinder(c) => c.to_aabb(),
        };
        Extent::Aabb(a.union(&b))
    }
}
