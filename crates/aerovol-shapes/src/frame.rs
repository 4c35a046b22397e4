//! Per-frame inputs to extent computation, visibility, level-of-detail
//! selection and geometry generation. Built by the caller once per frame and
//! shared immutably; mutable session state lives in the geometry context.

use aerovol_geo::Frustum;
use aerovol_globe::{Globe, GlobeStateToken};
use aerovol_lod::View;

/// Immutable frame state.
pub struct FrameContext<'a> {
    pub globe: &'a dyn Globe,
    pub view: &'a dyn View,
    pub frustum: &'a Frustum,
    /// Multiplier applied to sampled terrain elevations.
    pub vertical_exaggeration: f64,
}

impl FrameContext<'_> {
    #[must_use]
    pub fn token(&self) -> GlobeStateToken {
        self.globe.state_token()
    }
}
