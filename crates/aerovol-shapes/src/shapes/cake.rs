//! A stack of capped cylinders sharing a center, each layer with its own
//! radii and altitude band.

use aerovol_cache::{GeometryContext, ShapeKind};
use aerovol_geo::{Extent, LatLon};
use aerovol_lod::DetailLevels;
use glam::DVec3;

use crate::airspace::Airspace;
use crate::attributes::ShapeAttributes;
use crate::base::AirspaceBase;
use crate::frame::FrameContext;
use crate::render::Renderer;
use crate::shapes::CappedCylinder;

#[derive(Default)]
pub struct Cake {
    base: AirspaceBase,
    layers: Vec<CappedCylinder>,
}

impl Cake {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: AirspaceBase::new(),
            layers: Vec::new(),
        }
    }

    pub fn add_layer(&mut self, layer: CappedCylinder) {
        self.layers.push(layer);
        self.base.invalidate();
    }

    #[must_use]
    pub fn layers(&self) -> &[CappedCylinder] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut Vec<CappedCylinder> {
        self.base.invalidate();
        &mut self.layers
    }

    /// Forwarded to every layer; each keeps its own altitude band.
    pub fn set_attributes(&mut self, attributes: ShapeAttributes) {
        self.base.set_attributes(attributes);
        for layer in &mut self.layers {
            layer.base_mut().set_attributes(attributes);
        }
    }

    pub fn set_terrain_conforming(&mut self, lower: bool, upper: bool) {
        self.base.set_terrain_conforming(lower, upper);
        for layer in &mut self.layers {
            layer.base_mut().set_terrain_conforming(lower, upper);
        }
    }

    pub fn set_detail_levels(&mut self, levels: DetailLevels) {
        for layer in &mut self.layers {
            layer.base_mut().set_detail_levels(levels.clone());
        }
        self.base.set_detail_levels(levels);
    }
}

impl Airspace for Cake {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Cake
    }

    fn base(&self) -> &AirspaceBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AirspaceBase {
        &mut self.base
    }

    fn reference_location(&self) -> Option<LatLon> {
        self.layers.first().map(CappedCylinder::center)
    }

    fn compute_minimal_geometry(&mut self, frame: &FrameContext) -> Vec<DVec3> {
        let mut points = Vec::new();
        for layer in &mut self.layers {
            points.extend(layer.compute_minimal_geometry(frame));
        }
        points
    }

    fn compute_extent(&mut self, frame: &FrameContext) -> Option<Extent> {
        let mut union: Option<Extent> = None;
        for layer in &mut self.layers {
            if let Some(extent) = layer.extent(frame) {
                union = Some(match union {
                    Some(current) => current.union(&extent),
                    None => extent,
                });
            }
        }
        union
    }

    /// A container is visible only when its own extent intersects the
    /// frustum and at least one layer is visible too.
    fn is_airspace_visible(&mut self, frame: &FrameContext) -> bool {
        if !self.base.is_visible() {
            return false;
        }
        let parent_visible = match self.extent(frame) {
            Some(extent) => frame.frustum.intersects_extent(&extent),
            None => false,
        };
        parent_visible
            && self
                .layers
                .iter_mut()
                .any(|layer| layer.is_airspace_visible(frame))
    }

    fn render_geometry(
        &mut self,
        frame: &FrameContext,
        ctx: &mut GeometryContext,
        renderer: &mut dyn Renderer,
    ) {
        for layer in &mut self.layers {
            if layer.is_airspace_visible(frame) {
                layer.render_geometry(frame, ctx, renderer);
            }
        }
    }

    fn shift(&mut self, old_reference: LatLon, new_reference: LatLon) {
        for layer in &mut self.layers {
            layer.shift(old_reference, new_reference);
        }
    }
}

#[cfg(test)]
mod tests {
    use aerovol_cache::StreamRole;

    use super::*;
    use crate::test_util::{
        flat_globe, frame, overhead_frustum, overhead_view, seeded_context, RecordingRenderer,
    };

    fn cake() -> Cake {
        let center = LatLon::from_degrees(0.0, 0.0);
        let mut cake = Cake::new();
        for (radius, lower, upper) in [(10_000.0, 0.0, 1000.0), (6000.0, 1000.0, 2500.0)] {
            let mut layer = CappedCylinder::new(center, radius);
            layer.base_mut().set_altitudes(lower, upper);
            layer.base_mut().set_lod_enabled(false);
            cake.add_layer(layer);
        }
        cake
    }

    #[test]
    fn test_extent_unions_all_layers() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut cake = cake();
        let whole = cake.extent(&f).unwrap();
        for layer in &mut cake.layers_mut().iter_mut() {
            let layer_extent = layer.extent(&f).unwrap();
            assert!(
                whole.bounding_sphere_radius() + 1.0 >= layer_extent.bounding_sphere_radius(),
                "union covers each layer"
            );
        }
    }

    #[test]
    fn test_render_draws_every_layer() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut ctx = seeded_context();
        let mut renderer = RecordingRenderer::new();
        let mut cake = cake();
        cake.render_geometry(&f, &mut ctx, &mut renderer);
        // Each layer: wall plus two caps.
        assert_eq!(renderer.count_role(StreamRole::Fill), 6);
    }

    #[test]
    fn test_empty_cake_is_not_visible() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut cake = Cake::new();
        assert!(!cake.is_airspace_visible(&f));
    }

    #[test]
    fn test_hidden_layers_hide_the_container() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut cake = cake();
        assert!(cake.is_airspace_visible(&f));
        for layer in cake.layers_mut() {
            layer.base_mut().set_visible(false);
        }
        assert!(!cake.is_airspace_visible(&f));
    }
}
