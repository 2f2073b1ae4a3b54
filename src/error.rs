//! Error taxonomy: configuration and geometry errors are fatal and
//! reported before tracing starts; numerical degeneracy and scatter-budget
//! exhaustion are handled locally per-ray and never surface here (see
//! [`crate::diagnostics`]).
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required parameter: {0}")]
    MissingKey(&'static str),

    #[error("invalid value for '{key}': {value}")]
    InvalidValue { key: String, value: String },

    #[error("contradictory configuration: {0}")]
    Contradictory(String),
}

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("face {face}: normal is not unit-length (|n| = {length})")]
    NonUnitNormal { face: usize, length: f32 },

    #[error("face {face}: zero-area triangle")]
    ZeroAreaFace { face: usize },

    #[error("face {face}: vertex index {index} out of range")]
    IndexOutOfRange { face: usize, index: u32 },

    #[error("mismatched array lengths: {what} (faces={faces}, {what}={got})")]
    MismatchedLength {
        what: &'static str,
        faces: usize,
        got: usize,
    },
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("resource error: {0}")]
    Resource(String),
}
