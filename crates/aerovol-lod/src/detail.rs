//! Detail levels. Each level pairs a screen-size threshold in pixels with
//! the resolution overrides applied while the shape projects smaller than
//! that threshold. Levels are kept sorted ascending by threshold; the
//! smallest threshold is the coarsest level.

/// Resolution overrides carried by a detail level. `None` leaves the
/// shape's own parameter in effect. Overrides apply to a single frame's
/// generation request and never modify the shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DetailParams {
    pub slices: Option<u32>,
    pub stacks: Option<u32>,
    pub loops: Option<u32>,
    pub pillars: Option<u32>,
    pub arc_slices: Option<u32>,
    pub length_slices: Option<u32>,
    pub subdivisions: Option<u32>,
    /// Coarsest levels drop terrain conformance entirely.
    pub disable_terrain_conformance: bool,
}

/// One level: a screen-size threshold and the overrides active below it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetailLevel {
    /// Threshold in pixels of projected extent diameter.
    pub screen_size: f64,
    pub params: DetailParams,
}

/// An ordered set of detail levels.
#[derive(Clone, Debug, Default)]
pub struct DetailLevels {
    levels: Vec<DetailLevel>,
}

impl DetailLevels {
    /// Build from any order; levels are sorted ascending by threshold.
    #[must_use]
    pub fn new(mut levels: Vec<DetailLevel>) -> Self {
        levels.sort_by(|a, b| a.screen_size.total_cmp(&b.screen_size));
        Self { levels }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn levels(&self) -> &[DetailLevel] {
        &self.levels
    }

    /// Select the level for a projected screen size: the first level, walking
    /// thresholds ascending, whose threshold exceeds the screen size. A shape
    /// projecting larger than every threshold gets the finest level. `None`
    /// only when the set is empty.
    #[must_use]
    pub fn select(&self, screen_size: f64) -> Option<&DetailLevel> {
        if self.levels.is_empty() {
            return None;
        }
        self.levels
            .iter()
            .find(|level| screen_size < level.screen_size)
            .or_else(|| self.levels.last())
    }
}

pub const DEFAULT_MIN_SCREEN_SIZE: f64 = 40.0;
pub const DEFAULT_MAX_SCREEN_SIZE: f64 = 700.0;

/// Evenly spaced thresholds between the default minimum and maximum screen
/// sizes, ascending. The standard ramp shapes build their level tables on.
#[must_use]
pub fn screen_size_ramp(count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    if count == 1 {
        return vec![DEFAULT_MAX_SCREEN_SIZE];
    }
    let step = (DEFAULT_MAX_SCREEN_SIZE - DEFAULT_MIN_SCREEN_SIZE) / (count - 1) as f64;
    (0..count)
        .map(|i| DEFAULT_MIN_SCREEN_SIZE + step * i as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels_with_slices(table: &[(f64, u32)]) -> DetailLevels {
        DetailLevels::new(
            table
                .iter()
                .map(|&(screen_size, slices)| DetailLevel {
                    screen_size,
                    params: DetailParams {
                        slices: Some(slices),
                        ..DetailParams::default()
                    },
                })
                .collect(),
        )
    }

    #[test]
    fn test_select_picks_first_threshold_above_screen_size() {
        let levels = levels_with_slices(&[(40.0, 8), (205.0, 20), (700.0, 32)]);
        assert_eq!(levels.select(10.0).unwrap().params.slices, Some(8));
        assert_eq!(levels.select(100.0).unwrap().params.slices, Some(20));
        assert_eq!(levels.select(500.0).unwrap().params.slices, Some(32));
    }

    #[test]
    fn test_select_above_all_thresholds_uses_finest() {
        let levels = levels_with_slices(&[(40.0, 8), (700.0, 32)]);
        assert_eq!(levels.select(5000.0).unwrap().params.slices, Some(32));
    }

    #[test]
    fn test_select_empty_is_none() {
        assert!(DetailLevels::default().select(100.0).is_none());
    }

    #[test]
    fn test_resolution_never_increases_with_distance() {
        let levels = levels_with_slices(&[
            (40.0, 8),
            (205.0, 14),
            (370.0, 20),
            (535.0, 26),
            (700.0, 32),
        ]);
        let mut last_slices = u32::MAX;
        // Growing distance shrinks the projected size.
        for screen_size in [1000.0, 600.0, 400.0, 300.0, 100.0, 10.0] {
            let slices = levels.select(screen_size).unwrap().params.slices.unwrap();
            assert!(
                slices <= last_slices,
                "resolution increased as the shape shrank: {slices} after {last_slices}"
            );
            last_slices = slices;
        }
    }

    #[test]
    fn test_constructor_sorts_ascending() {
        let levels = levels_with_slices(&[(700.0, 32), (40.0, 8), (370.0, 20)]);
        let thresholds: Vec<f64> = levels.levels().iter().map(|l| l.screen_size).collect();
        assert_eq!(thresholds, vec![40.0, 370.0, 700.0]);
    }

    #[test]
    fn test_ramp_is_even_and_ascending() {
        let ramp = screen_size_ramp(5);
        assert_eq!(ramp.len(), 5);
        assert_eq!(ramp[0], DEFAULT_MIN_SCREEN_SIZE);
        assert_eq!(ramp[4], DEFAULT_MAX_SCREEN_SIZE);
        for pair in ramp.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }
}
