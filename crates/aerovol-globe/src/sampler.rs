//! Per-pass elevation memoization. Terrain-conforming generators query the
//! same locations repeatedly (wall columns and cap rings share columns); one
//! generation pass caches each distinct coordinate and is then discarded.

use aerovol_geo::LatLon;
use hashbrown::HashMap;

use crate::globe::Globe;

/// Memoizes `Globe::elevation` for the duration of one generation pass.
/// Keys are the exact bit patterns of the coordinates, so only locations that
/// are bitwise identical share a sample.
pub struct ElevationSampleCache<'a> {
    globe: &'a dyn Globe,
    samples: HashMap<(u64, u64), f64>,
}

impl<'a> ElevationSampleCache<'a> {
    #[must_use]
    pub fn new(globe: &'a dyn Globe) -> Self {
        Self {
            globe,
            samples: HashMap::new(),
        }
    }

    pub fn elevation(&mut self, location: LatLon) -> f64 {
        let key = (location.lat.to_bits(), location.lon.to_bits());
        *self
            .samples
            .entry(key)
            .or_insert_with(|| self.globe.elevation(location))
    }

    #[must_use]
    pub fn globe(&self) -> &'a dyn Globe {
        self.globe
    }

    /// Number of distinct locations sampled so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
