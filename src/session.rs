//! Live puzzle session
//!
//! A `Session` is handed to the collision and rendering collaborators at
//! construction. It owns the grid exclusively; every strike goes through
//! `&mut self`, so resolves never overlap.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::DEFAULT_SEED;
use crate::error::{ConfigError, GridError};
use crate::grid::{ChangeSet, Grid, GridGenerator, Landing, MatchEngine, Position};
use crate::level::LevelConfig;
use crate::palette::{ColorId, Palette};

/// What happened to a ball that struck a slice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strike {
    /// Ball became a block at `position`; `changes` lists every cell to redraw
    Placed {
        position: Position,
        changes: ChangeSet,
    },
    /// Column already reaches the rim
    Blocked,
    /// Column is empty, the ball hit the core
    Core,
}

pub struct Session {
    config: LevelConfig,
    seed: u64,
    rng: Pcg32,
    grid: Grid,
    engine: MatchEngine,
}

impl Session {
    /// Start a level using the configured seed (or a fixed default)
    pub fn new(config: LevelConfig) -> Result<Self, ConfigError> {
        let seed = config.seed.unwrap_or(DEFAULT_SEED);
        Self::with_seed(config, seed)
    }

    /// Start a level with an explicit generation seed
    pub fn with_seed(config: LevelConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let grid = GridGenerator::new(&mut rng).generate_level(&config)?;
        log::info!("Session started with seed: {}", seed);
        Ok(Self {
            config,
            seed,
            rng,
            grid,
            engine: MatchEngine::new(),
        })
    }

    /// Resume on an existing grid (e.g. a hand-built puzzle)
    pub fn from_grid(config: LevelConfig, grid: Grid) -> Result<Self, ConfigError> {
        config.validate()?;
        if grid.n_slice() != config.n_slice
            || grid.n_layer() != config.n_layer
            || grid.len() != config.n_slice * config.n_layer
        {
            return Err(ConfigError::DimensionMismatch {
                n_slice: config.n_slice,
                n_layer: config.n_layer,
                grid_slice: grid.n_slice(),
                grid_layer: grid.n_layer(),
            });
        }
        let seed = config.seed.unwrap_or(DEFAULT_SEED);
        Ok(Self {
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            grid,
            engine: MatchEngine::new(),
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn palette(&self) -> &Palette {
        &self.config.palette
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Where a ball entering `slice` would come to rest
    pub fn landing(&self, slice: usize) -> Result<Landing, GridError> {
        self.grid.landing(slice)
    }

    /// A ball of `color` reached `slice` from outside the ring
    pub fn strike(&mut self, slice: usize, color: ColorId) -> Result<Strike, GridError> {
        self.config.palette.check_placeable(color)?;
        match self.grid.landing(slice)? {
            Landing::Cell(position) => {
                let changes = self.place_and_resolve(position.slice, position.layer, color)?;
                Ok(Strike::Placed { position, changes })
            }
            Landing::Blocked => {
                log::debug!("Slice {} is full", slice);
                Ok(Strike::Blocked)
            }
            Landing::Core => {
                log::debug!("Slice {} is empty, core reached", slice);
                Ok(Strike::Core)
            }
        }
    }

    /// Write `color` at (`slice`, `layer`) and resolve the fallout
    ///
    /// The change set is relative to the grid before the write, so the new
    /// block shows up in it when it survives.
    pub fn place_and_resolve(
        &mut self,
        slice: usize,
        layer: usize,
        color: ColorId,
    ) -> Result<ChangeSet, GridError> {
        let position = Position::new(slice, layer);
        self.grid.check(position)?;
        self.config.palette.check_placeable(color)?;

        let before = self.grid.clone();
        self.grid.set(position, color);
        let mut changes = self.engine.resolve(&mut self.grid, position)?;
        changes.positions = self.grid.diff(&before);
        Ok(changes)
    }

    /// Color for the next spawned ball
    pub fn random_ball_color(&mut self) -> ColorId {
        self.config.palette.random_usable(&mut self.rng)
    }

    /// Uniform slice pick, for demos and soak tests
    pub fn random_slice(&mut self) -> usize {
        self.rng.random_range(0..self.grid.n_slice())
    }
}
