//! Ring Match - a radial match-3 grid engine
//!
//! Core modules:
//! - `grid`: Grid state, initial layout generation, matching and cascades
//! - `session`: Owner of a live grid, wired into collision/render collaborators
//! - `level`: Data-driven level configuration
//! - `palette`: Color ids and the level palette
//! - `geometry`: Polar layout of the ring grid for renderers and colliders

pub mod error;
pub mod geometry;
pub mod grid;
pub mod level;
pub mod palette;
pub mod session;

pub use error::{ConfigError, GridError};
pub use grid::{ChangeSet, Grid, GridGenerator, Landing, Match, MatchEngine, Position};
pub use level::{FillMode, LevelConfig};
pub use palette::{ColorId, Palette};
pub use session::{Session, Strike};

use glam::Vec2;

/// Engine configuration constants
pub mod consts {
    /// Smallest connected run that gets cleared
    pub const MIN_MATCH: usize = 3;

    /// Easy mode: draws spent looking for a color that touches exactly one run
    pub const EASY_MODE_ATTEMPTS: u32 = 15;

    /// Usable colors (excluding empty) needed by easy/normal generation
    pub const MIN_USABLE_COLORS_NORMAL: usize = 4;
    /// Usable colors (excluding empty) needed by hard generation
    pub const MIN_USABLE_COLORS_HARD: usize = 5;

    /// Fewer slices make the left and right neighbors coincide
    pub const MIN_SLICES: usize = 3;

    /// Level defaults
    pub const DEFAULT_SLICES: usize = 12;
    pub const DEFAULT_LAYERS: usize = 8;
    pub const DEFAULT_FILL_HEIGHT: usize = 4;
    pub const DEFAULT_EMPTY_DENOMINATOR: u32 = 3;
    pub const DEFAULT_SEED: u64 = 0x5EED_1234;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}
