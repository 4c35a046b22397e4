//! The renderer seam. Shapes emit draw calls describing which element
//! stream of which buffer to draw and with what attributes; the embedding
//! application owns the graphics API.

use aerovol_cache::{GeometryBuffer, StreamRole};
use glam::DVec3;

use crate::attributes::ShapeAttributes;

/// Uniform scale-and-translate applied by the renderer. Used by shapes that
/// cache a unit mesh and position it per draw (the sphere).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformTransform {
    pub translation: DVec3,
    pub scale: f64,
}

/// One indexed draw.
pub struct DrawCall<'a> {
    pub buffer: &'a GeometryBuffer,
    /// Index into `buffer.streams()`.
    pub stream: usize,
    /// Model-space origin the buffer's f32 positions are relative to.
    pub reference_center: DVec3,
    pub transform: Option<UniformTransform>,
    pub attributes: ShapeAttributes,
}

/// Sink for draw calls. The library never touches a graphics API; tests use
/// a recording implementation.
pub trait Renderer {
    fn draw(&mut self, call: &DrawCall<'_>);
}

/// Emit draw calls for every stream of a buffer, honoring the fill and
/// outline toggles.
pub fn draw_buffer(
    renderer: &mut dyn Renderer,
    buffer: &GeometryBuffer,
    reference_center: DVec3,
    transform: Option<UniformTransform>,
    attributes: ShapeAttributes,
) {
    for (stream, elements) in buffer.streams().iter().enumerate() {
        let enabled = match elements.role {
            StreamRole::Fill => attributes.draw_fill,
            StreamRole::Outline | StreamRole::CenterLine => attributes.draw_outline,
        };
        if !enabled {
            continue;
        }
        renderer.draw(&DrawCall {
            buffer,
            stream,
            reference_center,
            transform,
            attributes,
        });
    }
}
