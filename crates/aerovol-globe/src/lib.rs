//! The globe contract for airspace-volume generation: conversion between
//! geographic positions and model coordinates, terrain elevation queries, and
//! the per-pass elevation sample cache.

pub mod globe;
pub mod sampler;
pub mod sector;

pub use globe::{ConstantElevation, ElevationModel, Globe, GlobeStateToken, SphericalGlobe};
pub use sampler::ElevationSampleCache;
pub use sector::Sector;
