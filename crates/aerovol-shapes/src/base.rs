//! State shared by every airspace shape: the altitude band and its datums,
//! terrain-conformance flags, attributes, detail levels, and the per-globe
//! extent info cache.

use aerovol_geo::{Extent, LatLon};
use aerovol_globe::{Globe, GlobeStateToken, Sector};
use aerovol_lod::DetailLevels;
use glam::DVec3;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::attributes::ShapeAttributes;

/// What a shape's altitude is measured against. The datum and the
/// terrain-conformance flag of a surface are two views of the same state and
/// are kept consistent by the mutators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AltitudeDatum {
    /// Fixed altitude above the reference surface.
    AboveMeanSeaLevel,
    /// Altitude added to the terrain under each vertex; the surface drapes.
    AboveGroundLevel,
    /// Altitude added to the terrain at one reference location; the surface
    /// stays flat.
    AboveGroundReference,
}

impl AltitudeDatum {
    #[must_use]
    pub fn is_terrain_conforming(self) -> bool {
        !matches!(self, AltitudeDatum::AboveMeanSeaLevel)
    }
}

/// Cached per-globe-state derived data: the extent and the coarse point set
/// it was fitted from. Valid only for the vertical exaggeration it was
/// computed with.
#[derive(Clone, Debug)]
pub struct ShapeInfo {
    pub extent: Option<Extent>,
    pub minimal_geometry: Vec<DVec3>,
    pub vertical_exaggeration: f64,
}

/// Common airspace state. Owned by each shape; mutations that change the
/// defining geometry must call [`AirspaceBase::invalidate`].
pub struct AirspaceBase {
    altitudes: [f64; 2],
    datums: [AltitudeDatum; 2],
    terrain_conforming: [bool; 2],
    ground_reference: Option<LatLon>,
    attributes: ShapeAttributes,
    highlight_attributes: Option<ShapeAttributes>,
    highlighted: bool,
    visible: bool,
    detail_levels: DetailLevels,
    lod_enabled: bool,
    info: HashMap<GlobeStateToken, ShapeInfo>,
}

impl AirspaceBase {
    #[must_use]
    pub fn new() -> Self {
        Self {
            altitudes: [0.0, 1.0],
            datums: [AltitudeDatum::AboveMeanSeaLevel; 2],
            terrain_conforming: [false; 2],
            ground_reference: None,
            attributes: ShapeAttributes::default(),
            highlight_attributes: None,
            highlighted: false,
            visible: true,
            detail_levels: DetailLevels::default(),
            lod_enabled: true,
            info: HashMap::new(),
        }
    }

    #[must_use]
    pub fn altitudes(&self) -> [f64; 2] {
        self.altitudes
    }

    pub fn set_altitudes(&mut self, lower: f64, upper: f64) {
        self.altitudes = [lower, upper];
        self.invalidate();
    }

    #[must_use]
    pub fn altitude_datums(&self) -> [AltitudeDatum; 2] {
        self.datums
    }

    /// Set the datum of one surface (0 = lower, 1 = upper). Updates the
    /// paired terrain-conformance flag.
    pub fn set_altitude_datum(&mut self, surface: usize, datum: AltitudeDatum) {
        self.datums[surface] = datum;
        self.terrain_conforming[surface] = datum.is_terrain_conforming();
        self.invalidate();
    }

    #[must_use]
    pub fn terrain_conforming(&self) -> [bool; 2] {
        self.terrain_conforming
    }

    /// Set both conformance flags. Updates the paired datums: a conforming
    /// surface becomes above-ground-level, a fixed one above-mean-sea-level.
    pub fn set_terrain_conforming(&mut self, lower: bool, upper: bool) {
        self.terrain_conforming = [lower, upper];
        for (i, conforming) in [lower, upper].into_iter().enumerate() {
            self.datums[i] = if conforming {
                AltitudeDatum::AboveGroundLevel
            } else {
                AltitudeDatum::AboveMeanSeaLevel
            };
        }
        self.invalidate();
    }

    #[must_use]
    pub fn ground_reference(&self) -> Option<LatLon> {
        self.ground_reference
    }

    pub fn set_ground_reference(&mut self, location: Option<LatLon>) {
        self.ground_reference = location;
        self.invalidate();
    }

    /// Altitudes and conformance as the generators consume them. A surface
    /// referenced to the ground reference location gets that location's
    /// exaggerated elevation folded into its altitude and drops conformance;
    /// with no reference set it behaves as above-ground-level.
    #[must_use]
    pub fn effective_altitudes(
        &self,
        globe: &dyn Globe,
        vertical_exaggeration: f64,
    ) -> ([f64; 2], [bool; 2]) {
        let mut altitudes = self.altitudes;
        let mut conforming = self.terrain_conforming;
        for surface in 0..2 {
            if self.datums[surface] == AltitudeDatum::AboveGroundReference {
                if let Some(reference) = self.ground_reference {
                    altitudes[surface] += vertical_exaggeration * globe.elevation(reference);
                    conforming[surface] = false;
                }
            }
        }
        (altitudes, conforming)
    }

    /// A collapsed shape has coincident lower and upper surfaces; the
    /// generators skip the bottom cap and the walls.
    #[must_use]
    pub fn is_collapsed(&self, globe: &dyn Globe, vertical_exaggeration: f64) -> bool {
        let (altitudes, conforming) = self.effective_altitudes(globe, vertical_exaggeration);
        altitudes[0] == altitudes[1] && conforming[0] == conforming[1]
    }

    #[must_use]
    pub fn attributes(&self) -> &ShapeAttributes {
        &self.attributes
    }

    pub fn set_attributes(&mut self, attributes: ShapeAttributes) {
        // Visual only: cached geometry stays valid.
        self.attributes = attributes;
    }

    #[must_use]
    pub fn highlight_attributes(&self) -> Option<ShapeAttributes> {
        self.highlight_attributes
    }

    pub fn set_highlight_attributes(&mut self, attributes: Option<ShapeAttributes>) {
        self.highlight_attributes = attributes;
    }

    #[must_use]
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }

    /// Attributes in effect this frame.
    #[must_use]
    pub fn active_attributes(&self) -> ShapeAttributes {
        if self.highlighted {
            if let Some(highlight) = self.highlight_attributes {
                return highlight;
            }
        }
        self.attributes
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    #[must_use]
    pub fn detail_levels(&self) -> &DetailLevels {
        &self.detail_levels
    }

    pub fn set_detail_levels(&mut self, levels: DetailLevels) {
        self.detail_levels = levels;
    }

    #[must_use]
    pub fn is_lod_enabled(&self) -> bool {
        self.lod_enabled
    }

    pub fn set_lod_enabled(&mut self, enabled: bool) {
        self.lod_enabled = enabled;
    }

    /// Drop all cached per-globe info. Called by every geometry-defining
    /// mutation.
    pub fn invalidate(&mut self) {
        self.info.clear();
    }

    /// Cached info for a globe state, if still valid for this exaggeration.
    #[must_use]
    pub fn info(&self, token: GlobeStateToken, vertical_exaggeration: f64) -> Option<&ShapeInfo> {
        self.info
            .get(&token)
            .filter(|info| info.vertical_exaggeration.to_bits() == vertical_exaggeration.to_bits())
    }

    pub fn store_info(&mut self, token: GlobeStateToken, info: ShapeInfo) {
        self.info.insert(token, info);
    }
}

impl Default for AirspaceBase {
    fn default() -> Self {
        Self::new()
    }
}

/// Model points bounding a location set between two surfaces, including the
/// terrain extremes under conforming surfaces. The extent fitted over these
/// points stays valid as the camera moves, because it already covers the
/// lowest and highest terrain the draped surfaces can reach.
#[must_use]
pub fn extreme_points(
    globe: &dyn Globe,
    vertical_exaggeration: f64,
    locations: &[LatLon],
    altitudes: [f64; 2],
    conforming: [bool; 2],
) -> Vec<DVec3> {
    if locations.is_empty() {
        return Vec::new();
    }
    let mut min_elevation = 0.0f64;
    let mut max_elevation = 0.0f64;
    if conforming.iter().any(|&c| c) {
        let mut first = true;
        for sector in Sector::from_locations(locations) {
            let (lo, hi) = globe.min_max_elevation(&sector);
            if first {
                min_elevation = lo;
                max_elevation = hi;
                first = false;
            } else {
                min_elevation = min_elevation.min(lo);
                max_elevation = max_elevation.max(hi);
            }
        }
        min_elevation *= vertical_exaggeration;
        max_elevation *= vertical_exaggeration;
    }

    let mut points = Vec::new();
    for &location in locations {
        for surface in 0..2 {
            if conforming[surface] {
                points.push(globe.point_from(location, altitudes[surface] + min_elevation));
                points.push(globe.point_from(location, altitudes[surface] + max_elevation));
            } else {
                points.push(globe.point_from(location, altitudes[surface]));
            }
        }
    }
    points
}
