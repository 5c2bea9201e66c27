//! Error types for the tower core.

use crate::tower::Phase;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TowerError {
    #[error("{operation} is not valid while {phase:?}")]
    InvalidTransition {
        operation: &'static str,
        phase: Phase,
    },
    #[error("block registry is empty")]
    EmptyRegistry,
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be positive (got {value})")]
    NotPositive { name: &'static str, value: f32 },
    #[error("{name} must not be negative (got {value})")]
    Negative { name: &'static str, value: f32 },
    #[error("min block size {min_block_size} must be below the base footprint ({narrowest})")]
    MinBlockTooLarge { min_block_size: f32, narrowest: f32 },
    #[error("palette must have at least one color")]
    EmptyPalette,
}
