//! stacktui — stack-tower arcade core: slide, drop, trim, score.
//!
//! The simulation lives in [`tower`]; it talks to rendering, display, effects
//! and camera code only through the traits in [`host`].

pub mod config;
pub mod error;
pub mod geometry;
pub mod host;
pub mod registry;
pub mod scoring;
pub mod tower;

pub use config::TowerConfig;
pub use error::{ConfigError, TowerError};
pub use geometry::{Axis, Footprint, Slab};
pub use host::{BlockHandle, Camera, Display, Effects, Host, NullHost, Renderer, TickInput};
pub use registry::{Block, BlockId, BlockRegistry};
pub use tower::{ActiveBlock, Direction, Phase, Tower, TowerState};
