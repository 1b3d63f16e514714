//! Level palette and color ids
//!
//! The grid only stores `ColorId`s. Index 0 is the reserved empty color; the
//! renderer maps every id back to an RGBA value through the `Palette`.

use std::fmt;

use glam::Vec4;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// Index into the level palette
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ColorId(pub u8);

impl ColorId {
    /// The empty sentinel; never takes part in a match
    pub const EMPTY: ColorId = ColorId(0);

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ColorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered list of RGBA colors, first entry = empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    colors: Vec<Vec4>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(vec![
            Vec4::new(0.0, 0.0, 0.0, 1.0), // empty (black)
            Vec4::new(0.90, 0.22, 0.21, 1.0),
            Vec4::new(0.26, 0.63, 0.28, 1.0),
            Vec4::new(0.12, 0.53, 0.90, 1.0),
            Vec4::new(0.99, 0.85, 0.21, 1.0),
            Vec4::new(0.56, 0.14, 0.67, 1.0),
        ])
    }
}

impl Palette {
    pub fn new(colors: Vec<Vec4>) -> Self {
        Self { colors }
    }

    /// Palette size, empty color included
    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Number of colors a block can take (empty excluded)
    pub fn usable_len(&self) -> usize {
        self.colors.len().saturating_sub(1)
    }

    pub fn rgba(&self, id: ColorId) -> Option<Vec4> {
        self.colors.get(id.index()).copied()
    }

    pub fn contains(&self, id: ColorId) -> bool {
        id.index() < self.colors.len()
    }

    /// All non-empty color ids in palette order
    pub fn usable(&self) -> impl Iterator<Item = ColorId> + '_ {
        (1..self.colors.len()).map(|i| ColorId(i as u8))
    }

    /// Uniform draw among the non-empty colors
    ///
    /// Callers must make sure the palette has at least one usable color.
    pub fn random_usable<R: Rng + ?Sized>(&self, rng: &mut R) -> ColorId {
        ColorId(rng.random_range(1..self.colors.len()) as u8)
    }

    /// Check that `id` is a placeable (non-empty, known) color
    pub fn check_placeable(&self, id: ColorId) -> Result<(), GridError> {
        if id.is_empty() {
            return Err(GridError::EmptyColor);
        }
        if !self.contains(id) {
            return Err(GridError::UnknownColor {
                color: id.0,
                palette_len: self.colors.len(),
            });
        }
        Ok(())
    }
}
