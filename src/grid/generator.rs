//! Initial layout generation
//!
//! Fills the grid bottom-up (layer 0 first), slice-ascending within a layer.
//! The adjacency policies depend on that order: when a cell is drawn, its
//! left neighbor and the cell below are already final, the right neighbor is
//! final only across the wrap seam (last slice), and the cell above is always
//! still empty.

use rand::Rng;

use super::state::{Grid, Position};
use crate::consts::{EASY_MODE_ATTEMPTS, MIN_SLICES};
use crate::error::ConfigError;
use crate::level::{FillMode, LevelConfig};
use crate::palette::{ColorId, Palette};

/// Per-color view of the already-drawn neighbors of one cell
struct NeighborTally {
    /// Sum of the running run-length estimates of same-colored neighbors
    count: Vec<u32>,
    /// Last neighbor seen with each color
    source: Vec<Option<Position>>,
}

impl NeighborTally {
    fn new(palette_len: usize) -> Self {
        Self {
            count: vec![0; palette_len],
            source: vec![None; palette_len],
        }
    }

    fn add(&mut self, color: ColorId, pos: Position, runs: u32) {
        self.count[color.index()] += runs;
        self.source[color.index()] = Some(pos);
    }

    #[inline]
    fn count(&self, color: ColorId) -> u32 {
        self.count[color.index()]
    }
}

/// Produces the starting color layout of a level
pub struct GridGenerator<'a, R: Rng> {
    rng: &'a mut R,
}

impl<'a, R: Rng> GridGenerator<'a, R> {
    pub fn new(rng: &'a mut R) -> Self {
        Self { rng }
    }

    /// Generate a grid from a validated level configuration
    pub fn generate_level(&mut self, config: &LevelConfig) -> Result<Grid, ConfigError> {
        config.validate()?;
        self.generate(
            config.n_slice,
            config.n_layer,
            &config.palette,
            config.fill_height,
            config.empty_probability_denominator,
            config.fill_mode,
        )
    }

    /// Fill layers `0..fill_height` under the given adjacency policy
    ///
    /// On the outermost filled layer every cell has a
    /// `1 / empty_denominator` chance to stay empty. Layers at or above
    /// `fill_height` are left empty.
    pub fn generate(
        &mut self,
        n_slice: usize,
        n_layer: usize,
        palette: &Palette,
        fill_height: usize,
        empty_denominator: u32,
        mode: FillMode,
    ) -> Result<Grid, ConfigError> {
        let required = mode.min_palette_len();
        if palette.len() < required {
            return Err(ConfigError::PaletteTooSmall {
                mode,
                required,
                actual: palette.len(),
            });
        }
        if palette.len() > u8::MAX as usize + 1 {
            return Err(ConfigError::PaletteTooLarge(palette.len()));
        }
        if n_slice == 0 || n_layer == 0 {
            return Err(ConfigError::EmptyDimensions { n_slice, n_layer });
        }
        if n_slice < MIN_SLICES {
            return Err(ConfigError::TooFewSlices {
                n_slice,
                min: MIN_SLICES,
            });
        }
        if fill_height > n_layer {
            return Err(ConfigError::FillHeightTooLarge {
                fill_height,
                n_layer,
            });
        }
        if empty_denominator == 0 {
            return Err(ConfigError::ZeroEmptyDenominator);
        }

        let mut grid = Grid::new(n_slice, n_layer);
        // Running run-length estimate per cell (easy/normal only)
        let mut runs = vec![0u32; n_slice * n_layer];
        let run_idx = |pos: Position| pos.slice * n_layer + pos.layer;

        for layer in 0..fill_height {
            for slice in 0..n_slice {
                let pos = Position::new(slice, layer);

                if layer + 1 == fill_height && self.rng.random_range(0..empty_denominator) == 0 {
                    continue;
                }

                let color = match mode {
                    FillMode::Hard => self.pick_hard(&grid, palette, pos),
                    FillMode::Easy | FillMode::Normal => {
                        let tally = Self::tally_neighbors(&grid, palette, &runs, pos, run_idx);
                        let color = if mode == FillMode::Easy {
                            self.pick_easy(palette, &tally)
                        } else {
                            self.pick_normal(palette, &tally)
                        };
                        runs[run_idx(pos)] = tally.count(color) + 1;
                        if let Some(source) = tally.source[color.index()] {
                            runs[run_idx(source)] += 1;
                        }
                        color
                    }
                };
                grid.set(pos, color);
            }
        }

        log::info!(
            "Generated {}x{} grid ({} mode, fill height {}): {} blocks",
            n_slice,
            n_layer,
            mode,
            fill_height,
            grid.filled()
        );
        Ok(grid)
    }

    /// Neighbors in fixed order: right, left, above, below
    fn neighbors(grid: &Grid, pos: Position) -> impl Iterator<Item = Position> {
        [
            Some(grid.right_of(pos)),
            Some(grid.left_of(pos)),
            grid.above(pos),
            grid.below(pos),
        ]
        .into_iter()
        .flatten()
    }

    fn tally_neighbors(
        grid: &Grid,
        palette: &Palette,
        runs: &[u32],
        pos: Position,
        run_idx: impl Fn(Position) -> usize,
    ) -> NeighborTally {
        let mut tally = NeighborTally::new(palette.len());
        for neighbor in Self::neighbors(grid, pos) {
            let color = grid.color(neighbor);
            if !color.is_empty() {
                tally.add(color, neighbor, runs[run_idx(neighbor)]);
            }
        }
        tally
    }

    /// Redraw while the color would touch a run of two or more
    fn pick_normal(&mut self, palette: &Palette, tally: &NeighborTally) -> ColorId {
        let mut color = palette.random_usable(&mut *self.rng);
        while tally.count(color) > 1 {
            color = palette.random_usable(&mut *self.rng);
        }
        color
    }

    /// Try a few draws for a color that extends exactly one single run
    fn pick_easy(&mut self, palette: &Palette, tally: &NeighborTally) -> ColorId {
        let mut color = palette.random_usable(&mut *self.rng);
        let mut attempts = 0;
        while tally.count(color) != 1 && attempts < EASY_MODE_ATTEMPTS {
            color = palette.random_usable(&mut *self.rng);
            attempts += 1;
        }
        if tally.count(color) == 1 {
            return color;
        }
        while tally.count(color) > 1 {
            color = palette.random_usable(&mut *self.rng);
        }
        color
    }

    /// Redraw until no already-drawn neighbor has the same color
    fn pick_hard(&mut self, grid: &Grid, palette: &Palette, pos: Position) -> ColorId {
        let forbidden: Vec<ColorId> = Self::neighbors(grid, pos)
            .map(|neighbor| grid.color(neighbor))
            .collect();
        let mut color = palette.random_usable(&mut *self.rng);
        while forbidden.contains(&color) {
            color = palette.random_usable(&mut *self.rng);
        }
        color
    }
}
