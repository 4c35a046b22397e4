//! Error types. Parameter errors reject a mutation and leave the shape
//! unchanged; generation errors are recovered by the owning shape, which
//! degrades to empty geometry.

use thiserror::Error;

/// Invalid argument to a shape mutator. The shape retains its prior state.
#[derive(Debug, Error, PartialEq)]
pub enum ParameterError {
    #[error("{name} must be non-negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("inner radius {inner} exceeds outer radius {outer}")]
    RadiusOrder { inner: f64, outer: f64 },

    #[error("{name} requires at least {min} locations, got {got}")]
    TooFewLocations {
        name: &'static str,
        min: usize,
        got: usize,
    },
}

/// Failure inside a geometry generator.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("tessellation failed: {0}")]
    Tessellation(String),

    #[error("degenerate geometry: {0}")]
    Degenerate(&'static str),
}
