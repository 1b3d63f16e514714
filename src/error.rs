use std::path::PathBuf;

use crate::level::FillMode;

/// Errors raised while validating or loading a level configuration.
///
/// All of these are fatal to level generation and are never retried.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{mode} mode needs a palette of at least {required} colors (empty included), got {actual}")]
    PaletteTooSmall {
        mode: FillMode,
        required: usize,
        actual: usize,
    },

    #[error("palette has {0} colors, at most 256 are addressable")]
    PaletteTooLarge(usize),

    #[error("grid must have at least one slice and one layer (got {n_slice}x{n_layer})")]
    EmptyDimensions { n_slice: usize, n_layer: usize },

    #[error("grid is {grid_slice}x{grid_layer} but the level expects {n_slice}x{n_layer}")]
    DimensionMismatch {
        n_slice: usize,
        n_layer: usize,
        grid_slice: usize,
        grid_layer: usize,
    },

    #[error("a ring needs at least {min} slices, got {n_slice}")]
    TooFewSlices { n_slice: usize, min: usize },

    #[error("ring radii must satisfy 0 <= core < outer (got core {core}, outer {outer})")]
    InvalidRadii { core: f32, outer: f32 },

    #[error("fill height {fill_height} exceeds layer count {n_layer}")]
    FillHeightTooLarge { fill_height: usize, n_layer: usize },

    #[error("empty probability denominator must be at least 1")]
    ZeroEmptyDenominator,

    #[error("failed to read level file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse level JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised by grid operations at the collaborator boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("cell ({slice}, {layer}) is outside the {n_slice}x{n_layer} grid")]
    OutOfRange {
        slice: usize,
        layer: usize,
        n_slice: usize,
        n_layer: usize,
    },

    #[error("slice {slice} is outside the grid ({n_slice} slices)")]
    SliceOutOfRange { slice: usize, n_slice: usize },

    #[error("grid snapshot has {cells} cells, a {n_slice}x{n_layer} grid needs {}", .n_slice * .n_layer)]
    CellCount {
        n_slice: usize,
        n_layer: usize,
        cells: usize,
    },

    #[error("the empty color cannot be placed")]
    EmptyColor,

    #[error("color {color} is not in the palette ({palette_len} colors)")]
    UnknownColor { color: u8, palette_len: usize },
}
