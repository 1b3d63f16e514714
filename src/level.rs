//! Level configuration
//!
//! Loaded once per session from JSON by the external level loader.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::palette::Palette;

/// Adjacency policy used when generating the initial layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum FillMode {
    /// Favor colors that extend an existing single-cell run
    Easy,
    /// Same-colored neighbors allowed, but never next to a run of two
    #[default]
    Normal,
    /// No two adjacent cells share a color
    Hard,
}

impl FillMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FillMode::Easy => "easy",
            FillMode::Normal => "normal",
            FillMode::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(FillMode::Easy),
            "normal" => Some(FillMode::Normal),
            "hard" => Some(FillMode::Hard),
            _ => None,
        }
    }

    /// Parse a mode name, falling back to `Normal` for anything unknown
    pub fn from_name(s: &str) -> Self {
        Self::from_str(s).unwrap_or_else(|| {
            log::warn!("Unknown fill mode {:?}, using normal", s);
            FillMode::Normal
        })
    }

    /// Palette size required by this mode, empty color included
    pub fn min_palette_len(&self) -> usize {
        match self {
            FillMode::Easy | FillMode::Normal => MIN_USABLE_COLORS_NORMAL + 1,
            FillMode::Hard => MIN_USABLE_COLORS_HARD + 1,
        }
    }
}

impl fmt::Display for FillMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for FillMode {
    fn from(s: String) -> Self {
        Self::from_name(&s)
    }
}

impl From<FillMode> for &'static str {
    fn from(mode: FillMode) -> Self {
        mode.as_str()
    }
}

/// Everything needed to build the starting grid of a level
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Angular wedges around the ring
    pub n_slice: usize,
    /// Concentric rings, 0 = innermost
    pub n_layer: usize,
    /// Colors, first entry = empty
    pub palette: Palette,
    /// Number of layers filled at generation
    pub fill_height: usize,
    /// Outermost filled layer: 1 in N chance for a cell to stay empty
    pub empty_probability_denominator: u32,
    pub fill_mode: FillMode,
    /// Generation seed (random seed when absent)
    pub seed: Option<u64>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            n_slice: DEFAULT_SLICES,
            n_layer: DEFAULT_LAYERS,
            palette: Palette::default(),
            fill_height: DEFAULT_FILL_HEIGHT,
            empty_probability_denominator: DEFAULT_EMPTY_DENOMINATOR,
            fill_mode: FillMode::Normal,
            seed: None,
        }
    }
}

impl LevelConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: LevelConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a level file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!(
            "Loaded level {} ({}x{}, {} mode)",
            path.display(),
            config.n_slice,
            config.n_layer,
            config.fill_mode
        );
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject configurations the generator cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_slice == 0 || self.n_layer == 0 {
            return Err(ConfigError::EmptyDimensions {
                n_slice: self.n_slice,
                n_layer: self.n_layer,
            });
        }
        if self.n_slice < MIN_SLICES {
            return Err(ConfigError::TooFewSlices {
                n_slice: self.n_slice,
                min: MIN_SLICES,
            });
        }
        if self.palette.len() > u8::MAX as usize + 1 {
            return Err(ConfigError::PaletteTooLarge(self.palette.len()));
        }
        let required = self.fill_mode.min_palette_len();
        if self.palette.len() < required {
            return Err(ConfigError::PaletteTooSmall {
                mode: self.fill_mode,
                required,
                actual: self.palette.len(),
            });
        }
        if self.fill_height > self.n_layer {
            return Err(ConfigError::FillHeightTooLarge {
                fill_height: self.fill_height,
                n_layer: self.n_layer,
            });
        }
        if self.empty_probability_denominator == 0 {
            return Err(ConfigError::ZeroEmptyDenominator);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_fill_mode_parsing() {
        assert_eq!(FillMode::from_str("Easy"), Some(FillMode::Easy));
        assert_eq!(FillMode::from_str(" HARD "), Some(FillMode::Hard));
        assert_eq!(FillMode::from_str("insane"), None);
        assert_eq!(FillMode::from_name("insane"), FillMode::Normal);
    }

    #[test]
    fn test_default_is_valid() {
        assert!(LevelConfig::default().validate().is_ok());
    }

    #[test]
    fn test_json_round_trip_with_unknown_mode() {
        let json = r#"{
            "n_slice": 6,
            "n_layer": 3,
            "fill_height": 2,
            "fill_mode": "nightmare"
        }"#;
        let config = LevelConfig::from_json(json).unwrap();
        assert_eq!(config.n_slice, 6);
        assert_eq!(config.fill_mode, FillMode::Normal);
        assert_eq!(config.palette, Palette::default());

        let back = LevelConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back.fill_mode, FillMode::Normal);
        assert_eq!(back.n_layer, 3);
    }

    #[test]
    fn test_palette_too_small_for_mode() {
        let mut config = LevelConfig {
            palette: Palette::new(vec![Vec4::ZERO; 5]),
            fill_mode: FillMode::Hard,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PaletteTooSmall {
                required: 6,
                actual: 5,
                ..
            })
        ));

        config.fill_mode = FillMode::Normal;
        assert!(config.validate().is_ok());

        config.palette = Palette::new(vec![Vec4::ZERO; 4]);
        config.fill_mode = FillMode::Easy;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PaletteTooSmall { required: 5, .. })
        ));
    }

    #[test]
    fn test_bad_dimensions() {
        let config = LevelConfig {
            fill_height: 9,
            n_layer: 8,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FillHeightTooLarge { .. })
        ));

        let config = LevelConfig {
            empty_probability_denominator: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroEmptyDenominator)));

        let config = LevelConfig {
            n_slice: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyDimensions { .. })));

        // Two slices would make every side neighbor count twice
        let config = LevelConfig {
            n_slice: 2,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooFewSlices { n_slice: 2, min: 3 })
        ));
        let config = LevelConfig {
            n_slice: 3,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_bundled_level() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/levels/hard.json");
        let config = LevelConfig::load(path).unwrap();
        assert_eq!(config.fill_mode, FillMode::Hard);
        assert_eq!(config.palette.len(), 6);
        assert_eq!(config.seed, Some(2024));
    }

    #[test]
    fn test_load_missing_file() {
        let err = LevelConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
