//! The globe abstraction: geographic-to-model coordinate conversion and
//! terrain elevation access. Generated meshes depend on the globe's state, so
//! every globe exposes an opaque state token; a token change invalidates any
//! geometry computed against the old state.

use aerovol_geo::LatLon;
use glam::DVec3;

use crate::sector::Sector;

/// Opaque fingerprint of a globe's terrain-relevant state. Two equal tokens
/// guarantee that elevation queries and coordinate conversion behave the
/// same.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GlobeStateToken(pub u64);

/// Coordinate conversion and elevation queries against one globe model.
pub trait Globe {
    /// Radius at the equator, meters.
    fn equatorial_radius(&self) -> f64;

    /// Terrain elevation above the reference surface, meters.
    fn elevation(&self, location: LatLon) -> f64;

    /// Minimum and maximum terrain elevation over the sector, meters.
    fn min_max_elevation(&self, sector: &Sector) -> (f64, f64);

    /// Model coordinates of a location at the given altitude above the
    /// reference surface.
    fn point_from(&self, location: LatLon, altitude: f64) -> DVec3;

    /// Geographic location under a model-coordinate point.
    fn location_from_point(&self, point: DVec3) -> LatLon;

    /// Unit surface normal at a location.
    fn surface_normal(&self, location: LatLon) -> DVec3;

    /// Current state token. Changes whenever elevations or the reference
    /// surface change.
    fn state_token(&self) -> GlobeStateToken;
}

/// Source of terrain elevations for a [`SphericalGlobe`].
pub trait ElevationModel {
    fn elevation_at(&self, location: LatLon) -> f64;

    /// Elevation range over a sector. The default scans the corners and
    /// center, which is exact for the flat and linear models used in tests;
    /// real models override with their tile metadata.
    fn min_max(&self, sector: &Sector) -> (f64, f64) {
        let samples = [
            LatLon::from_radians(sector.min_lat, sector.min_lon),
            LatLon::from_radians(sector.min_lat, sector.max_lon),
            LatLon::from_radians(sector.max_lat, sector.min_lon),
            LatLon::from_radians(sector.max_lat, sector.max_lon),
            LatLon::from_radians(
                (sector.min_lat + sector.max_lat) * 0.5,
                (sector.min_lon + sector.max_lon) * 0.5,
            ),
        ];
        let mut min = f64::MAX;
        let mut max = f64::MIN;
        for s in samples {
            let e = self.elevation_at(s);
            min = min.min(e);
            max = max.max(e);
        }
        (min, max)
    }
}

/// A constant-elevation model. Elevation zero gives a bare sphere.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConstantElevation(pub f64);

impl ElevationModel for ConstantElevation {
    fn elevation_at(&self, _location: LatLon) -> f64 {
        self.0
    }

    fn min_max(&self, _sector: &Sector) -> (f64, f64) {
        (self.0, self.0)
    }
}

/// A spherical globe over a pluggable elevation model. Model coordinates are
/// geocentric: +Z through the north pole, +X through (0, 0).
pub struct SphericalGlobe<E> {
    radius: f64,
    elevations: E,
    token: GlobeStateToken,
}

impl<E: ElevationModel> SphericalGlobe<E> {
    #[must_use]
    pub fn new(radius: f64, elevations: E, token: GlobeStateToken) -> Self {
        Self {
            radius,
            elevations,
            token,
        }
    }

    /// Earth-sized globe, bare sphere.
    #[must_use]
    pub fn earth() -> SphericalGlobe<ConstantElevation> {
        SphericalGlobe::new(6_371_000.0, ConstantElevation(0.0), GlobeStateToken(0))
    }

    /// Replace the elevation model, advancing the state token.
    pub fn set_elevations(&mut self, elevations: E) {
        self.elevations = elevations;
        self.token = GlobeStateToken(self.token.0.wrapping_add(1));
    }
}

impl<E: ElevationModel> Globe for SphericalGlobe<E> {
    fn equatorial_radius(&self) -> f64 {
        self.radius
    }

    fn elevation(&self, location: LatLon) -> f64 {
        self.elevations.elevation_at(location)
    }

    fn min_max_elevation(&self, sector: &Sector) -> (f64, f64) {
        self.elevations.min_max(sector)
    }

    fn point_from(&self, location: LatLon, altitude: f64) -> DVec3 {
        let r = self.radius + altitude;
        let cos_lat = location.lat.cos();
        DVec3::new(
            r * cos_lat * location.lon.cos(),
            r * cos_lat * location.lon.sin(),
            r * location.lat.sin(),
        )
    }

    fn location_from_point(&self, point: DVec3) -> LatLon {
        let len = point.length();
        if len == 0.0 {
            return LatLon::from_radians(0.0, 0.0);
        }
        LatLon::from_radians((point.z / len).clamp(-1.0, 1.0).asin(), point.y.atan2(point.x))
    }

    fn surface_normal(&self, location: LatLon) -> DVec3 {
        let cos_lat = location.lat.cos();
        DVec3::new(
            cos_lat * location.lon.cos(),
            cos_lat * location.lon.sin(),
            location.lat.sin(),
        )
    }

    fn state_token(&self) -> GlobeStateToken {
        self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_from_equator_prime_meridian() {
        let globe = SphericalGlobe::<ConstantElevation>::earth();
        let p = globe.point_from(LatLon::from_degrees(0.0, 0.0), 0.0);
        assert!((p.x - globe.equatorial_radius()).abs() < 1e-6);
        assert!(p.y.abs() < 1e-6 && p.z.abs() < 1e-6);
    }

    #[test]
    fn test_point_from_pole() {
        let globe = SphericalGlobe::<ConstantElevation>::earth();
        let p = globe.point_from(LatLon::from_degrees(90.0, 0.0), 100.0);
        assert!((p.z - (globe.equatorial_radius() + 100.0)).abs() < 1e-6);
    }

    #[test]
    fn test_location_point_round_trip() {
        let globe = SphericalGlobe::<ConstantElevation>::earth();
        let loc = LatLon::from_degrees(37.5, -122.25);
        let p = globe.point_from(loc, 1234.0);
        let back = globe.location_from_point(p);
        assert!((back.lat - loc.lat).abs() < 1e-12);
        assert!((back.lon - loc.lon).abs() < 1e-12);
    }

    #[test]
    fn test_surface_normal_is_radial_unit() {
        let globe = SphericalGlobe::<ConstantElevation>::earth();
        let loc = LatLon::from_degrees(45.0, 45.0);
        let n = globe.surface_normal(loc);
        assert!((n.length() - 1.0).abs() < 1e-12);
        let p = globe.point_from(loc, 0.0);
        assert!((n.dot(p.normalize()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_set_elevations_advances_token() {
        let mut globe =
            SphericalGlobe::new(1000.0, ConstantElevation(0.0), GlobeStateToken(7));
        let before = globe.state_token();
        globe.set_elevations(ConstantElevation(50.0));
        assert_ne!(globe.state_token(), before);
    }
}
