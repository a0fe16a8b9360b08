//! Error types for the tileburst core.

use thiserror::Error;

/// Errors produced by tile, field, and renderer operations.
#[derive(Debug, Error)]
pub enum TileError {
    /// A value handed to a collection or constructor violated its contract
    /// (e.g. a tile whose sample origin is outside the field's region).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Source dimensions are not known yet, so the tile grid cannot be built.
    #[error("source dimensions are not available yet")]
    UninitializedSource,

    /// Width or height was zero (or overflowed) when creating a buffer or surface.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// Two buffers had incompatible dimensions for a copy.
    #[error("dimension mismatch: ({lhs_w}, {lhs_h}) vs ({rhs_w}, {rhs_h})")]
    DimensionMismatch {
        lhs_w: usize,
        lhs_h: usize,
        rhs_w: usize,
        rhs_h: usize,
    },

    /// A render mode name could not be parsed.
    #[error("unknown render mode: {0}")]
    UnknownMode(String),

    /// A frame source name is not registered.
    #[error("unknown source: {0}")]
    UnknownSource(String),

    /// A scenario description failed validation.
    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    /// Reading or writing an image failed.
    #[error("i/o error: {0}")]
    Io(String),
}
