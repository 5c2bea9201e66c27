//! App: terminal init, main loop, key handling, and the scene the tower draws into.

use crate::input::{key_to_action, Action};
use crate::theme::Theme;
use crate::ui::{self, Flash, View};
use crate::Args;
use anyhow::{ensure, Result};
use crossterm::event::{self, Event, KeyEventKind};
use glam::Vec3;
use ratatui::DefaultTerminal;
use stacktui::{
    BlockHandle, Camera, Display, Effects, Footprint, Renderer, TickInput, Tower, TowerConfig,
};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Longest simulated step; a stalled terminal must not teleport the block.
const MAX_STEP_SECS: f32 = 0.1;
/// ~60 FPS redraw.
const FRAME: Duration = Duration::from_millis(16);

/// What the renderer knows about one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drawable {
    pub position: Vec3,
    pub footprint: Footprint,
    pub height: f32,
    pub color: usize,
}

/// Terminal-side state fed by the tower's collaborator calls.
#[derive(Debug, Default)]
pub struct Scene {
    next_handle: u64,
    pub blocks: BTreeMap<BlockHandle, Drawable>,
    pub score: u32,
    pub final_score: Option<u32>,
    pub camera_height: f32,
    /// Perfect placement not yet turned into a flash.
    pub pending_flash: Option<Vec3>,
}

impl Renderer for Scene {
    fn instantiate_block(
        &mut self,
        position: Vec3,
        footprint: Footprint,
        height: f32,
        color: usize,
    ) -> BlockHandle {
        let handle = BlockHandle(self.next_handle);
        self.next_handle += 1;
        self.blocks.insert(
            handle,
            Drawable {
                position,
                footprint,
                height,
                color,
            },
        );
        handle
    }

    fn destroy_block(&mut self, handle: BlockHandle) {
        self.blocks.remove(&handle);
    }

    fn set_footprint(&mut self, handle: BlockHandle, footprint: Footprint, position: Vec3) {
        if let Some(block) = self.blocks.get_mut(&handle) {
            block.footprint = footprint;
            block.position = position;
        }
    }
}

impl Display for Scene {
    fn on_score_changed(&mut self, score: u32) {
        self.score = score;
        self.final_score = None;
    }

    fn on_game_over(&mut self, final_score: u32) {
        self.final_score = Some(final_score);
    }
}

impl Effects for Scene {
    fn on_perfect_placement(&mut self, position: Vec3) {
        self.pending_flash = Some(position);
    }
}

impl Camera for Scene {
    fn on_tower_height_changed(&mut self, height: f32) {
        self.camera_height = height;
    }
}

pub struct App {
    args: Args,
    theme: Theme,
    tower: Tower,
    scene: Scene,
    paused: bool,
    /// Input gathered since the last simulation step.
    pending: TickInput,
    last_tick: Instant,
    flash: Flash,
}

impl App {
    pub fn new(args: Args, config: TowerConfig, theme: Theme) -> Result<Self> {
        ensure!(
            args.tick_rate.is_finite() && args.tick_rate > 0.0,
            "tick rate must be positive (got {})",
            args.tick_rate
        );
        let mut scene = Scene::default();
        let tower = Tower::new(config, &mut scene)?;
        Ok(Self {
            args,
            theme,
            tower,
            scene,
            paused: false,
            pending: TickInput::default(),
            last_tick: Instant::now(),
            flash: Flash::default(),
        })
    }

    /// Returns false when the player asked to quit.
    fn apply_action(&mut self, action: Action, now: Instant) -> bool {
        match action {
            Action::Quit => return false,
            Action::Pause if !self.tower.is_game_over() => {
                self.paused = !self.paused;
                // Time spent paused is not simulated.
                self.last_tick = now;
                debug!(paused = self.paused, "pause toggled");
            }
            Action::Drop if !self.paused => self.pending.drop_requested = true,
            Action::Restart => self.pending.restart_requested = true,
            Action::Pause | Action::Drop | Action::None => {}
        }
        true
    }

    fn simulate(&mut self, now: Instant) -> Result<()> {
        let tick_interval = Duration::from_secs_f64(1.0 / self.args.tick_rate);
        let elapsed = now.saturating_duration_since(self.last_tick);
        if self.paused || elapsed < tick_interval {
            return Ok(());
        }
        self.last_tick = now;
        let input = std::mem::take(&mut self.pending);
        let was_over = self.tower.is_game_over();
        // Never cap below one tick interval, or slow tick rates run slow motion.
        let max_step = MAX_STEP_SECS.max(tick_interval.as_secs_f32());
        self.tower
            .step(input, elapsed.as_secs_f32().min(max_step), &mut self.scene)?;
        if was_over && !self.tower.is_game_over() {
            self.flash = Flash::default();
        }
        if let Some(at) = self.scene.pending_flash.take() {
            if !self.args.no_animation {
                self.flash.start(at);
            }
        }
        Ok(())
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = ratatui::Terminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        info!(config = ?self.tower.config(), "game started");

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;
        info!(best = self.tower.state().best_score, "game closed");

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            terminal.draw(|f| {
                let view = View {
                    tower: &self.tower,
                    scene: &self.scene,
                    theme: &self.theme,
                    paused: self.paused,
                };
                ui::draw(f, &view, &mut self.flash, now);
            })?;

            let timeout = FRAME.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if !self.apply_action(key_to_action(key), Instant::now()) {
                            return Ok(());
                        }
                    }
                }
            }

            self.simulate(Instant::now())?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use stacktui::Phase;

    fn app() -> App {
        let args = Args::parse_from(["stacktui", "--no-alternate"]);
        let config = args.tower_config();
        App::new(args, config, Theme::default()).unwrap()
    }

    #[test]
    fn scene_tracks_base_and_active_block() {
        let app = app();
        assert_eq!(app.scene.blocks.len(), 2);
        assert_eq!(app.scene.score, 0);
        assert_eq!(app.scene.final_score, None);
    }

    #[test]
    fn paused_app_ignores_drops_and_does_not_simulate() {
        let mut app = app();
        let t0 = app.last_tick;
        assert!(app.apply_action(Action::Pause, t0));
        assert!(app.apply_action(Action::Drop, t0));
        assert!(!app.pending.drop_requested);
        app.simulate(t0 + Duration::from_secs(1)).unwrap();
        assert_eq!(app.tower.phase(), Phase::Moving);
        assert_eq!(app.last_tick, t0);
    }

    #[test]
    fn queued_drop_is_consumed_on_next_step() {
        let mut app = app();
        let t0 = app.last_tick;
        assert!(app.apply_action(Action::Drop, t0));
        app.simulate(t0 + Duration::from_millis(50)).unwrap();
        assert_eq!(app.tower.phase(), Phase::Dropping);
        assert!(!app.pending.drop_requested);
    }

    #[test]
    fn slow_tick_rate_simulates_the_full_interval() {
        let args = Args::parse_from(["stacktui", "--no-alternate", "--tick-rate", "5"]);
        let config = args.tower_config();
        let mut app = App::new(args, config, Theme::default()).unwrap();
        let t0 = app.last_tick;
        let start = app.tower.active().unwrap().slab.position.x;
        app.simulate(t0 + Duration::from_millis(200)).unwrap();
        let moved = app.tower.active().unwrap().slab.position.x - start;
        // 3 units/s for a full 0.2 s tick.
        assert!((moved - 0.6).abs() < 1e-4, "moved {moved}");
    }

    #[test]
    fn stalled_frame_is_capped_at_max_step() {
        let mut app = app();
        let t0 = app.last_tick;
        let start = app.tower.active().unwrap().slab.position.x;
        app.simulate(t0 + Duration::from_secs(2)).unwrap();
        let moved = app.tower.active().unwrap().slab.position.x - start;
        assert!((moved - 3.0 * MAX_STEP_SECS).abs() < 1e-4, "moved {moved}");
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut app = app();
        assert!(!app.apply_action(Action::Quit, Instant::now()));
    }

    #[test]
    fn scene_records_game_over_and_clears_on_score_reset() {
        let mut scene = Scene::default();
        scene.on_game_over(150);
        assert_eq!(scene.final_score, Some(150));
        scene.on_score_changed(0);
        assert_eq!(scene.final_score, None);
    }

    #[test]
    fn destroyed_blocks_leave_the_scene() {
        let mut scene = Scene::default();
        let h = scene.instantiate_block(Vec3::ZERO, Footprint::new(1.0, 1.0), 0.5, 0);
        scene.set_footprint(h, Footprint::new(0.5, 1.0), Vec3::X);
        assert_eq!(scene.blocks[&h].footprint.width, 0.5);
        assert_eq!(scene.blocks[&h].position, Vec3::X);
        scene.destroy_block(h);
        assert!(scene.blocks.is_empty());
    }
}
