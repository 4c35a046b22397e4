//! Visual attributes. Attribute changes never invalidate cached geometry;
//! they only alter how the cached buffers are drawn.

use serde::{Deserialize, Serialize};

/// How a shape is drawn: fill and outline toggles, colors, line width.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeAttributes {
    pub draw_fill: bool,
    pub draw_outline: bool,
    /// RGBA, linear, premultiplied by nothing.
    pub fill_color: [f32; 4],
    pub outline_color: [f32; 4],
    pub outline_width: f32,
}

impl Default for ShapeAttributes {
    fn default() -> Self {
        Self {
            draw_fill: true,
            draw_outline: false,
            fill_color: [1.0, 1.0, 1.0, 0.6],
            outline_color: [1.0, 1.0, 1.0, 1.0],
            outline_width: 1.0,
        }
    }
}
