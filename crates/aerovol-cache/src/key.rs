//! Structural cache keys. A key captures everything a generated mesh depends
//! on: the globe state, the owning shape kind, a label distinguishing the
//! buffers a shape produces, and the parameter list. Equality is deep over
//! the parameters; the hash is computed once at construction.

use std::hash::{DefaultHasher, Hash, Hasher};

use aerovol_geo::LatLon;
use aerovol_globe::GlobeStateToken;
use glam::DVec3;

/// The shape family a cache entry belongs to. Part of the key so that two
/// shape kinds with coincidentally equal parameter lists never collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Cylinder,
    PartialCylinder,
    EllipticalCylinder,
    Box,
    Polygon,
    Curtain,
    Orbit,
    Sphere,
    Cake,
    Track,
    Route,
}

/// One cache-key parameter. Floats compare and hash by bit pattern, so a
/// key is only ever equal to one built from bitwise-identical inputs.
#[derive(Clone, Debug)]
pub enum Param {
    Bool(bool),
    Int(i64),
    Float(f64),
    Location(LatLon),
    Point(DVec3),
    Floats(Vec<f64>),
    Locations(Vec<LatLon>),
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Param::Bool(a), Param::Bool(b)) => a == b,
            (Param::Int(a), Param::Int(b)) => a == b,
            (Param::Float(a), Param::Float(b)) => a.to_bits() == b.to_bits(),
            (Param::Location(a), Param::Location(b)) => {
                a.lat.to_bits() == b.lat.to_bits() && a.lon.to_bits() == b.lon.to_bits()
            }
            (Param::Point(a), Param::Point(b)) => {
                a.x.to_bits() == b.x.to_bits()
                    && a.y.to_bits() == b.y.to_bits()
                    && a.z.to_bits() == b.z.to_bits()
            }
            (Param::Floats(a), Param::Floats(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (Param::Locations(a), Param::Locations(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| {
                        x.lat.to_bits() == y.lat.to_bits() && x.lon.to_bits() == y.lon.to_bits()
                    })
            }
            _ => false,
        }
    }
}

impl Eq for Param {}

impl Hash for Param {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Param::Bool(v) => {
                state.write_u8(0);
                v.hash(state);
            }
            Param::Int(v) => {
                state.write_u8(1);
                v.hash(state);
            }
            Param::Float(v) => {
                state.write_u8(2);
                state.write_u64(v.to_bits());
            }
            Param::Location(v) => {
                state.write_u8(3);
                state.write_u64(v.lat.to_bits());
                state.write_u64(v.lon.to_bits());
            }
            Param::Point(v) => {
                state.write_u8(4);
                state.write_u64(v.x.to_bits());
                state.write_u64(v.y.to_bits());
                state.write_u64(v.z.to_bits());
            }
            Param::Floats(v) => {
                state.write_u8(5);
                state.write_usize(v.len());
                for x in v {
                    state.write_u64(x.to_bits());
                }
            }
            Param::Locations(v) => {
                state.write_u8(6);
                state.write_usize(v.len());
                for x in v {
                    state.write_u64(x.lat.to_bits());
                    state.write_u64(x.lon.to_bits());
                }
            }
        }
    }
}

impl From<bool> for Param {
    fn from(v: bool) -> Self {
        Param::Bool(v)
    }
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::Int(v)
    }
}

impl From<u32> for Param {
    fn from(v: u32) -> Self {
        Param::Int(i64::from(v))
    }
}

impl From<f64> for Param {
    fn from(v: f64) -> Self {
        Param::Float(v)
    }
}

impl From<LatLon> for Param {
    fn from(v: LatLon) -> Self {
        Param::Location(v)
    }
}

impl From<DVec3> for Param {
    fn from(v: DVec3) -> Self {
        Param::Point(v)
    }
}

impl From<Vec<f64>> for Param {
    fn from(v: Vec<f64>) -> Self {
        Param::Floats(v)
    }
}

impl From<&[LatLon]> for Param {
    fn from(v: &[LatLon]) -> Self {
        Param::Locations(v.to_vec())
    }
}

/// Immutable mesh-cache key. Resolution-only entries (index lists that do
/// not depend on the globe) are built with `globe_token: None`.
#[derive(Clone, Debug)]
pub struct CacheKey {
    kind: ShapeKind,
    label: &'static str,
    globe_token: Option<GlobeStateToken>,
    params: Vec<Param>,
    hash: u64,
}

impl CacheKey {
    #[must_use]
    pub fn new(
        kind: ShapeKind,
        label: &'static str,
        globe_token: Option<GlobeStateToken>,
        params: Vec<Param>,
    ) -> Self {
        let mut hasher = DefaultHasher::new();
        kind.hash(&mut hasher);
        label.hash(&mut hasher);
        globe_token.hash(&mut hasher);
        params.hash(&mut hasher);
        Self {
            kind,
            label,
            globe_token,
            params,
            hash: hasher.finish(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    #[must_use]
    pub fn globe_token(&self) -> Option<GlobeStateToken> {
        self.globe_token
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.kind == other.kind
            && self.label == other.label
            && self.globe_token == other.globe_token
            && self.params == other.params
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Memoized at construction.
        state.write_u64(self.hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(params: Vec<Param>) -> CacheKey {
        CacheKey::new(
            ShapeKind::Cylinder,
            "vertices",
            Some(GlobeStateToken(1)),
            params,
        )
    }

    #[test]
    fn test_equal_params_equal_keys() {
        let a = key(vec![Param::from(32u32), Param::from(1.5), Param::from(true)]);
        let b = key(vec![Param::from(32u32), Param::from(1.5), Param::from(true)]);
        assert_eq!(a, b);
        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn test_any_param_difference_breaks_equality() {
        let a = key(vec![Param::from(32u32), Param::from(1.5)]);
        let b = key(vec![Param::from(32u32), Param::from(1.5000001)]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_float_array_deep_equality() {
        let a = key(vec![Param::from(vec![100.0, 200.0])]);
        let b = key(vec![Param::from(vec![100.0, 200.0])]);
        let c = key(vec![Param::from(vec![100.0, 201.0])]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_location_list_deep_equality() {
        let ring: &[LatLon] = &[
            LatLon::from_degrees(0.0, 0.0),
            LatLon::from_degrees(1.0, 1.0),
        ];
        let a = key(vec![Param::from(ring)]);
        let b = key(vec![Param::from(ring)]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_globe_token_distinguishes_keys() {
        let a = CacheKey::new(ShapeKind::Cylinder, "vertices", Some(GlobeStateToken(1)), vec![]);
        let b = CacheKey::new(ShapeKind::Cylinder, "vertices", Some(GlobeStateToken(2)), vec![]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_kind_and_label_distinguish_keys() {
        let a = CacheKey::new(ShapeKind::Cylinder, "indices", None, vec![Param::from(8u32)]);
        let b = CacheKey::new(ShapeKind::Orbit, "indices", None, vec![Param::from(8u32)]);
        let c = CacheKey::new(ShapeKind::Cylinder, "outline", None, vec![Param::from(8u32)]);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_nan_floats_are_self_equal_by_bits() {
        let a = key(vec![Param::from(f64::NAN)]);
        let b = key(vec![Param::from(f64::NAN)]);
        assert_eq!(a, b, "bit-pattern equality makes NaN keys usable");
    }
}
