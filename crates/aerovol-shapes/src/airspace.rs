//! The shape interface. One trait covers primitives and containers; the
//! provided methods implement the shared extent-cache, eye-distance,
//! visibility and detail-level pipeline so each shape only supplies its own
//! geometry.

use aerovol_cache::{Expiry, GeometryContext, ShapeKind};
use aerovol_geo::{Aabb, Extent, LatLon};
use aerovol_lod::{projected_screen_size, DetailLevel};
use glam::DVec3;

use crate::base::{AirspaceBase, ShapeInfo};
use crate::frame::FrameContext;
use crate::render::Renderer;

pub trait Airspace {
    fn kind(&self) -> ShapeKind;

    fn base(&self) -> &AirspaceBase;

    fn base_mut(&mut self) -> &mut AirspaceBase;

    /// Anchor location for relocation; `None` for shapes with no locations.
    fn reference_location(&self) -> Option<LatLon>;

    /// Coarse, resolution-independent point set bounding the shape. Used for
    /// extent fitting and eye distance, never for rendering. Empty when the
    /// shape has no geometry.
    fn compute_minimal_geometry(&mut self, frame: &FrameContext) -> Vec<DVec3>;

    /// Fit the bounding volume. The default wraps the minimal geometry in an
    /// axis-aligned box; rotational shapes override with a cylinder fit.
    fn compute_extent(&mut self, frame: &FrameContext) -> Option<Extent> {
        let points = self.compute_minimal_geometry(frame);
        Aabb::from_points(&points).map(Extent::Aabb)
    }

    /// Generate (or fetch from cache) and draw this frame's geometry.
    /// Generation failures degrade the shape rather than propagate.
    fn render_geometry(
        &mut self,
        frame: &FrameContext,
        ctx: &mut GeometryContext,
        renderer: &mut dyn Renderer,
    );

    /// Re-anchor all locations from one reference to another, preserving
    /// azimuth and arc distance to each.
    fn shift(&mut self, old_reference: LatLon, new_reference: LatLon);

    /// Bounding volume for the current globe state, through the info cache.
    fn extent(&mut self, frame: &FrameContext) -> Option<Extent> {
        self.ensure_info(frame);
        self.base()
            .info(frame.token(), frame.vertical_exaggeration)
            .and_then(|info| info.extent)
    }

    /// Distance from the eye to the nearest minimal-geometry point. Falls
    /// back to the extent center; zero when the shape has no geometry.
    fn eye_distance(&mut self, frame: &FrameContext) -> f64 {
        self.ensure_info(frame);
        let eye = frame.view.eye_point();
        let Some(info) = self.base().info(frame.token(), frame.vertical_exaggeration) else {
            return 0.0;
        };
        if info.minimal_geometry.is_empty() {
            return info
                .extent
                .map_or(0.0, |extent| (extent.center() - eye).length());
        }
        info.minimal_geometry
            .iter()
            .map(|p| (*p - eye).length())
            .fold(f64::MAX, f64::min)
    }

    /// True when the shape is enabled and its extent intersects the frustum.
    /// A shape with no extent is not visible.
    fn is_airspace_visible(&mut self, frame: &FrameContext) -> bool {
        if !self.base().is_visible() {
            return false;
        }
        match self.extent(frame) {
            Some(extent) => frame.frustum.intersects_extent(&extent),
            None => false,
        }
    }

    /// Detail level for this frame, from the projected screen size of the
    /// extent. `None` (shape defaults apply) when LOD is disabled, no levels
    /// are installed, or the extent is unresolvable.
    fn detail_level(&mut self, frame: &FrameContext) -> Option<DetailLevel> {
        if !self.base().is_lod_enabled() || self.base().detail_levels().is_empty() {
            return None;
        }
        let extent = self.extent(frame)?;
        let distance = self.eye_distance(frame);
        let screen_size = projected_screen_size(extent.diameter(), distance, frame.view);
        self.base().detail_levels().select(screen_size).copied()
    }

    /// Move the shape so its reference location lands on `location`.
    fn move_to(&mut self, location: LatLon) {
        if let Some(old) = self.reference_location() {
            self.shift(old, location);
            self.base_mut().invalidate();
        }
    }

    fn ensure_info(&mut self, frame: &FrameContext) {
        let token = frame.token();
        if self
            .base()
            .info(token, frame.vertical_exaggeration)
            .is_some()
        {
            return;
        }
        let minimal_geometry = self.compute_minimal_geometry(frame);
        let extent = self.compute_extent(frame);
        self.base_mut().store_info(
            token,
            ShapeInfo {
                extent,
                minimal_geometry,
                vertical_exaggeration: frame.vertical_exaggeration,
            },
        );
    }
}

/// Relocate one location, preserving its azimuth and arc distance from the
/// old reference relative to the new one.
#[must_use]
pub fn shift_location(old_reference: LatLon, new_reference: LatLon, location: LatLon) -> LatLon {
    let azimuth = old_reference.great_circle_azimuth(location);
    let distance = old_reference.great_circle_distance(location);
    new_reference.great_circle_endpoint(azimuth, distance)
}

/// Expiry for a freshly generated mesh: jittered when any surface conforms
/// to terrain, otherwise never.
pub(crate) fn expiry_for(ctx: &mut GeometryContext, conforming: [bool; 2]) -> Expiry {
    if conforming.iter().any(|&c| c) {
        let now = ctx.now();
        ctx.jitter.deadline(now)
    } else {
        Expiry::Never
    }
}
