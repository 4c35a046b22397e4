//! Geographic bounding sectors. A sector never crosses the antimeridian;
//! location sets that do are covered by a pair of sectors split at it.

use std::f64::consts::PI;

use aerovol_geo::LatLon;

/// A latitude/longitude rectangle, radians, `min <= max` on both axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sector {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Sector {
    #[must_use]
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat: min_lat.min(max_lat),
            max_lat: min_lat.max(max_lat),
            min_lon: min_lon.min(max_lon),
            max_lon: min_lon.max(max_lon),
        }
    }

    /// Bounding sector(s) of a location set. Returns one sector normally,
    /// two when the set straddles the antimeridian, none for an empty set.
    ///
    /// Straddling is detected by a longitude span wider than PI in raw
    /// coordinates, the same heuristic the bounding math uses for paths that
    /// take the short way across the date line.
    #[must_use]
    pub fn from_locations(locations: &[LatLon]) -> Vec<Sector> {
        if locations.is_empty() {
            return Vec::new();
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lon = f64::MAX;
        let mut max_lon = f64::MIN;
        for loc in locations {
            min_lat = min_lat.min(loc.lat);
            max_lat = max_lat.max(loc.lat);
            min_lon = min_lon.min(loc.lon);
            max_lon = max_lon.max(loc.lon);
        }

        if max_lon - min_lon <= PI {
            return vec![Sector {
                min_lat,
                max_lat,
                min_lon,
                max_lon,
            }];
        }

        // Short way across the date line: split into a western and an
        // eastern sector bounded by the crossing locations.
        let mut west_max = -PI;
        let mut east_min = PI;
        for loc in locations {
            if loc.lon < 0.0 {
                west_max = west_max.max(loc.lon);
            } else {
                east_min = east_min.min(loc.lon);
            }
        }
        vec![
            Sector {
                min_lat,
                max_lat,
                min_lon: -PI,
                max_lon: west_max,
            },
            Sector {
                min_lat,
                max_lat,
                min_lon: east_min,
                max_lon: PI,
            },
        ]
    }

    #[must_use]
    pub fn contains(&self, location: LatLon) -> bool {
        location.lat >= self.min_lat
            && location.lat <= self.max_lat
            && location.lon >= self.min_lon
            && location.lon <= self.max_lon
    }

    #[must_use]
    pub fn union(&self, other: &Sector) -> Sector {
        Sector {
            min_lat: self.min_lat.min(other.min_lat),
            max_lat: self.max_lat.max(other.max_lat),
            min_lon: self.min_lon.min(other.min_lon),
            max_lon: self.max_lon.max(other.max_lon),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_locations_single_sector() {
        let locs = [
            LatLon::from_degrees(10.0, 20.0),
            LatLon::from_degrees(-5.0, 25.0),
            LatLon::from_degrees(2.0, 15.0),
        ];
        let sectors = Sector::from_locations(&locs);
        assert_eq!(sectors.len(), 1);
        let s = sectors[0];
        for loc in locs {
            assert!(s.contains(loc));
        }
    }

    #[test]
    fn test_from_locations_splits_at_antimeridian() {
        let locs = [
            LatLon::from_degrees(0.0, 179.0),
            LatLon::from_degrees(1.0, -178.0),
        ];
        let sectors = Sector::from_locations(&locs);
        assert_eq!(sectors.len(), 2, "date-line crossing set must split");
        assert!(sectors.iter().any(|s| s.contains(locs[0])));
        assert!(sectors.iter().any(|s| s.contains(locs[1])));
        // Neither half spans the whole globe.
        for s in &sectors {
            assert!(s.max_lon - s.min_lon < PI);
        }
    }

    #[test]
    fn test_from_locations_empty() {
        assert!(Sector::from_locations(&[]).is_empty());
    }

    #[test]
    fn test_union() {
        let a = Sector::new(0.0, 0.1, 0.0, 0.1);
        let b = Sector::new(-0.2, 0.05, 0.05, 0.3);
        let u = a.union(&b);
        assert_eq!(u.min_lat, -0.2);
        assert_eq!(u.max_lat, 0.1);
        assert_eq!(u.min_lon, 0.0);
        assert_eq!(u.max_lon, 0.3);
    }
}
