//! Adaptive level-of-detail for airspace shapes: screen-size thresholds,
//! per-level parameter overrides, and the projected screen-size computation
//! that drives selection.

pub mod detail;
pub mod view;

pub use detail::{
    DetailLevel, DetailLevels, DetailParams, screen_size_ramp, DEFAULT_MAX_SCREEN_SIZE,
    DEFAULT_MIN_SCREEN_SIZE,
};
pub use view::{projected_screen_size, PerspectiveView, View};
