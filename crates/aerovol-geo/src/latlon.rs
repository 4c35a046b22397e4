//! Geographic locations and path math on the unit sphere. Distances are
//! angular (radians); callers scale by the globe radius where meters are
//! needed.

use serde::{Deserialize, Serialize};

use crate::Angle;

/// How a path between two locations is traced over the globe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathType {
    /// Shortest path on the sphere.
    GreatCircle,
    /// Constant-azimuth (loxodrome) path.
    RhumbLine,
}

/// A geographic location. Latitude and longitude in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    #[must_use]
    pub const fn from_radians(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    #[must_use]
    pub fn from_degrees(lat: f64, lon: f64) -> Self {
        Self {
            lat: lat.to_radians(),
            lon: lon.to_radians(),
        }
    }

    /// Angular great-circle distance to `that`, in radians.
    #[must_use]
    pub fn great_circle_distance(self, that: LatLon) -> f64 {
        let dlat = (that.lat - self.lat) * 0.5;
        let dlon = (that.lon - self.lon) * 0.5;
        let a = dlat.sin().powi(2) + self.lat.cos() * that.lat.cos() * dlon.sin().powi(2);
        2.0 * a.sqrt().min(1.0).asin()
    }

    /// Initial azimuth of the great circle from `self` to `that`, clockwise
    /// from north, normalized to [0, TAU). Zero when the locations coincide.
    #[must_use]
    pub fn great_circle_azimuth(self, that: LatLon) -> Angle {
        if self == that {
            return Angle::ZERO;
        }
        let dlon = that.lon - self.lon;
        let y = dlon.sin() * that.lat.cos();
        let x = self.lat.cos() * that.lat.sin() - self.lat.sin() * that.lat.cos() * dlon.cos();
        if x == 0.0 && y == 0.0 {
            return Angle::ZERO;
        }
        Angle::from_radians(y.atan2(x)).normalized_azimuth()
    }

    /// End location after following the great circle with the given initial
    /// azimuth for `distance` radians.
    #[must_use]
    pub fn great_circle_endpoint(self, azimuth: Angle, distance: f64) -> LatLon {
        if distance == 0.0 {
            return self;
        }
        let az = azimuth.radians();
        let lat = (self.lat.sin() * distance.cos()
            + self.lat.cos() * distance.sin() * az.cos())
        .clamp(-1.0, 1.0)
        .asin();
        let lon = self.lon
            + (az.sin() * distance.sin() * self.lat.cos())
                .atan2(distance.cos() - self.lat.sin() * lat.sin());
        LatLon {
            lat,
            lon: Angle::from_radians(lon).normalized_signed().radians(),
        }
    }

    /// Azimuth of the rhumb line from `self` to `that`.
    #[must_use]
    pub fn rhumb_azimuth(self, that: LatLon) -> Angle {
        if self == that {
            return Angle::ZERO;
        }
        let dlon = Angle::from_radians(that.lon - self.lon)
            .normalized_signed()
            .radians();
        let dpsi = mercator_latitude(that.lat) - mercator_latitude(self.lat);
        Angle::from_radians(dlon.atan2(dpsi)).normalized_azimuth()
    }

    /// Angular length of the rhumb line from `self` to `that`, in radians.
    #[must_use]
    pub fn rhumb_distance(self, that: LatLon) -> f64 {
        let dlat = that.lat - self.lat;
        let dlon = Angle::from_radians(that.lon - self.lon)
            .normalized_signed()
            .radians();
        let dpsi = mercator_latitude(that.lat) - mercator_latitude(self.lat);
        // East-west course: the stretch factor dlat/dpsi degenerates, use cos(lat).
        let q = if dpsi.abs() > 1e-12 {
            dlat / dpsi
        } else {
            self.lat.cos()
        };
        (dlat * dlat + q * q * dlon * dlon).sqrt()
    }

    /// End location after following a rhumb line for `distance` radians.
    #[must_use]
    pub fn rhumb_endpoint(self, azimuth: Angle, distance: f64) -> LatLon {
        if distance == 0.0 {
            return self;
        }
        let az = azimuth.radians();
        let dlat = distance * az.cos();
        let mut lat = self.lat + dlat;
        // Clamp at the poles; the rhumb spiral converges there.
        lat = lat.clamp(-std::f64::consts::FRAC_PI_2, std::f64::consts::FRAC_PI_2);
        let dpsi = mercator_latitude(lat) - mercator_latitude(self.lat);
        let q = if dpsi.abs() > 1e-12 {
            dlat / dpsi
        } else {
            self.lat.cos()
        };
        let dlon = distance * az.sin() / q;
        let lon = Angle::from_radians(self.lon + dlon)
            .normalized_signed()
            .radians();
        LatLon { lat, lon }
    }

    /// Point at fraction `amount` of the great circle between `a` and `b`.
    #[must_use]
    pub fn interpolate_great_circle(amount: f64, a: LatLon, b: LatLon) -> LatLon {
        let azimuth = a.great_circle_azimuth(b);
        let distance = a.great_circle_distance(b);
        a.great_circle_endpoint(azimuth, amount * distance)
    }

    /// Point at fraction `amount` of the rhumb line between `a` and `b`.
    #[must_use]
    pub fn interpolate_rhumb(amount: f64, a: LatLon, b: LatLon) -> LatLon {
        let azimuth = a.rhumb_azimuth(b);
        let distance = a.rhumb_distance(b);
        a.rhumb_endpoint(azimuth, amount * distance)
    }

    /// Point at fraction `amount` of the path of the given type.
    #[must_use]
    pub fn interpolate(path_type: PathType, amount: f64, a: LatLon, b: LatLon) -> LatLon {
        match path_type {
            PathType::GreatCircle => Self::interpolate_great_circle(amount, a, b),
            PathType::RhumbLine => Self::interpolate_rhumb(amount, a, b),
        }
    }

    /// Path azimuth from `self` to `that` for the given path type.
    #[must_use]
    pub fn path_azimuth(self, path_type: PathType, that: LatLon) -> Angle {
        match path_type {
            PathType::GreatCircle => self.great_circle_azimuth(that),
            PathType::RhumbLine => self.rhumb_azimuth(that),
        }
    }

    /// Path length from `self` to `that` for the given path type, in radians.
    #[must_use]
    pub fn path_distance(self, path_type: PathType, that: LatLon) -> f64 {
        match path_type {
            PathType::GreatCircle => self.great_circle_distance(that),
            PathType::RhumbLine => self.rhumb_distance(that),
        }
    }
}

/// Isometric (Mercator-stretched) latitude.
fn mercator_latitude(lat: f64) -> f64 {
    ((std::f64::consts::FRAC_PI_4 + lat * 0.5).tan()).ln()
}
