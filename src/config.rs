//! Tower tunables: speeds, sizes, thresholds, settling heuristic.

use crate::error::ConfigError;
use glam::Vec3;

/// Simulation tunables. Defaults match the classic stacking-game feel.
#[derive(Debug, Clone, PartialEq)]
pub struct TowerConfig {
    /// Horizontal speed of the active block (units per time unit).
    pub move_speed: f32,
    /// The active block turns around when its center reaches ±this value.
    pub boundary_width: f32,
    /// Downward speed set when a drop is triggered.
    pub drop_speed: f32,
    /// Overlap at or below this ends the game.
    pub min_block_size: f32,
    /// Overlap within this of the previous top size counts as perfect.
    pub perfect_threshold: f32,
    /// Base block size: x = width, y = height of every block, z = depth.
    pub block_size: Vec3,
    /// Time after a drop before the settling check starts polling.
    pub settle_grace: f32,
    /// Poll interval of the settling check once it has started.
    pub settle_interval: f32,
    /// A dropping block whose vertical speed is below this has landed.
    pub settle_speed: f32,
    /// Extra height above the contact plane at which new blocks spawn.
    pub spawn_clearance: f32,
    /// Swap the active axis after every successful placement.
    pub alternate_axis: bool,
    /// Number of palette entries block colors cycle through.
    pub palette_len: usize,
}

impl Default for TowerConfig {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            boundary_width: 4.0,
            drop_speed: 6.0,
            min_block_size: 0.5,
            perfect_threshold: 0.1,
            block_size: Vec3::new(3.0, 0.5, 3.0),
            settle_grace: 0.5,
            settle_interval: 0.1,
            settle_speed: 0.1,
            spawn_clearance: 0.0,
            alternate_axis: true,
            palette_len: 6,
        }
    }
}

impl TowerConfig {
    /// Height of every block layer.
    #[inline]
    pub fn block_height(&self) -> f32 {
        self.block_size.y
    }

    /// Reject tunables the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("move_speed", self.move_speed),
            ("boundary_width", self.boundary_width),
            ("drop_speed", self.drop_speed),
            ("block_size.x", self.block_size.x),
            ("block_size.y", self.block_size.y),
            ("block_size.z", self.block_size.z),
            ("settle_interval", self.settle_interval),
            ("settle_speed", self.settle_speed),
            ("perfect_threshold", self.perfect_threshold),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        let non_negative = [
            ("min_block_size", self.min_block_size),
            ("settle_grace", self.settle_grace),
            ("spawn_clearance", self.spawn_clearance),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Negative { name, value });
            }
        }
        let narrowest = self.block_size.x.min(self.block_size.z);
        if self.min_block_size >= narrowest {
            return Err(ConfigError::MinBlockTooLarge {
                min_block_size: self.min_block_size,
                narrowest,
            });
        }
        if self.palette_len == 0 {
            return Err(ConfigError::EmptyPalette);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(TowerConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_drop_speed() {
        let config = TowerConfig {
            drop_speed: 0.0,
            ..TowerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { name: "drop_speed", .. })
        ));
    }

    #[test]
    fn rejects_min_block_wider_than_base() {
        let config = TowerConfig {
            min_block_size: 3.0,
            ..TowerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::MinBlockTooLarge { .. })));
    }

    #[test]
    fn rejects_nan_and_negative_values() {
        let config = TowerConfig {
            move_speed: f32::NAN,
            ..TowerConfig::default()
        };
        assert!(config.validate().is_err());
        let config = TowerConfig {
            settle_grace: -0.1,
            ..TowerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Negative { name: "settle_grace", .. })
        ));
    }

    #[test]
    fn rejects_empty_palette() {
        let config = TowerConfig {
            palette_len: 0,
            ..TowerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyPalette)));
    }
}
