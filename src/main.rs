//! stacktui — stack the sliding blocks as high as you can, in the terminal.

mod app;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use glam::Vec3;
use stacktui::TowerConfig;
use std::path::PathBuf;

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|err| {
        tracing::warn!(%err, "theme not loaded, using defaults");
        let mut theme = theme::Theme::default();
        theme.apply_palette(args.palette);
        theme
    });
    let config = args.tower_config();
    config.validate().context("invalid tower settings")?;
    let mut app = App::new(args, config, theme)?;
    app.run()?;
    Ok(())
}

/// Log to a file; stdout belongs to the terminal UI.
fn init_logging(path: &std::path::Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stacktui=info".into()),
        )
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}

/// Stack-tower arcade game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "stacktui",
    version,
    about = "Stack sliding blocks into a tower. Whatever hangs over the edge is cut off.",
    long_about = "stacktui is a terminal take on the classic stacking arcade game.\n\n\
        A block slides back and forth above the tower. Drop it: the part that overlaps \
        the block below stays, the rest is cut away, and the next block is only as wide \
        as what survived. A perfect drop scores 100, any other 50. Miss entirely and the \
        game is over.\n\n\
        CONTROLS:\n  Space/Enter/Down  Drop    P  Pause    R  Restart (after game over)    Q/Esc  Quit"
)]
pub struct Args {
    /// Horizontal speed of the sliding block (units per second).
    #[arg(long, default_value = "3.0", value_name = "SPEED")]
    pub move_speed: f32,

    /// The block turns around at ±this distance from the tower axis.
    #[arg(long, default_value = "4.0", value_name = "UNITS")]
    pub boundary: f32,

    /// Fall speed once dropped (units per second).
    #[arg(long, default_value = "6.0", value_name = "SPEED")]
    pub drop_speed: f32,

    /// Width and depth of the base block.
    #[arg(long, default_value = "3.0", value_name = "UNITS")]
    pub block_width: f32,

    /// Height of each block layer.
    #[arg(long, default_value = "0.5", value_name = "UNITS")]
    pub block_height: f32,

    /// Overlap at or below this ends the game.
    #[arg(long, default_value = "0.5", value_name = "UNITS")]
    pub min_block: f32,

    /// Keep sliding on the X axis instead of alternating X and Z.
    #[arg(long)]
    pub no_alternate: bool,

    /// Drop new blocks from this high above the tower instead of right on top.
    #[arg(long, default_value = "0.0", value_name = "UNITS")]
    pub spawn_clearance: f32,

    /// Simulation ticks per second.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub tick_rate: f64,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Disable the flash on perfect placements.
    #[arg(long)]
    pub no_animation: bool,

    /// Write logs here (filter with RUST_LOG).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    fn tower_config(&self) -> TowerConfig {
        TowerConfig {
            move_speed: self.move_speed,
            boundary_width: self.boundary,
            drop_speed: self.drop_speed,
            min_block_size: self.min_block,
            block_size: Vec3::new(self.block_width, self.block_height, self.block_width),
            spawn_clearance: self.spawn_clearance,
            alternate_axis: !self.no_alternate,
            ..TowerConfig::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_args_build_default_tower() {
        let args = Args::parse_from(["stacktui"]);
        assert_eq!(args.tower_config(), TowerConfig::default());
    }

    #[test]
    fn flags_map_onto_config() {
        let args = Args::parse_from([
            "stacktui",
            "--no-alternate",
            "--block-width",
            "4",
            "--palette",
            "contrast",
        ]);
        let config = args.tower_config();
        assert!(!config.alternate_axis);
        assert_eq!(config.block_size, Vec3::new(4.0, 0.5, 4.0));
        assert_eq!(args.palette, Palette::HighContrast);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
