//! Stack simulation: moving, dropping, settling, landing, game over.
//!
//! One [`Tower`] owns the session. It is advanced by [`Tower::tick`] (or
//! [`Tower::step`], which samples input first) from a single-threaded frame
//! loop. The settling check is a poll re-entered from `tick`, never a wait.

use crate::config::TowerConfig;
use crate::error::TowerError;
use crate::geometry::{self, Axis, Footprint, Slab};
use crate::host::{BlockHandle, Host, TickInput};
use crate::registry::{Block, BlockId, BlockRegistry};
use crate::scoring::{self, Outcome};
use glam::Vec3;
use tracing::{debug, info, warn};

/// Where the session is in the drop cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No active block yet; only seen while a tower is being built.
    Idle,
    /// Active block oscillates and waits for a drop.
    Moving,
    /// Falling; settling check not yet armed.
    Dropping,
    /// Falling or resting; settling check polls on a fixed interval.
    Settling,
    /// Overlap is being evaluated.
    Landed,
    /// Session over until restart.
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Positive,
    Negative,
}

impl Direction {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => -1.0,
        }
    }
}

/// The block under player control. Not part of the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveBlock {
    pub slab: Slab,
    pub handle: BlockHandle,
    pub color: usize,
    /// Downward speed; 0 while moving or once resting on the tower.
    pub vertical_speed: f32,
}

/// Session state. `reset` returns it to start values.
#[derive(Debug, Clone, PartialEq)]
pub struct TowerState {
    pub phase: Phase,
    pub axis: Axis,
    pub direction: Direction,
    /// Active-axis size of the last committed block.
    pub last_footprint: f32,
    pub score: u32,
    /// Next palette slot handed out.
    pub color_index: usize,
    pub game_over: bool,
    /// Successful placements this session.
    pub placements: u32,
    pub perfects: u32,
    /// Best score since the process started. Survives `reset`.
    pub best_score: u32,
    /// Time since the drop was triggered.
    drop_clock: f32,
    /// Drop-clock time of the next settling poll.
    next_poll: f32,
}

impl TowerState {
    fn new(last_footprint: f32) -> Self {
        Self {
            phase: Phase::Idle,
            axis: Axis::Horizontal,
            direction: Direction::Positive,
            last_footprint,
            score: 0,
            color_index: 0,
            game_over: false,
            placements: 0,
            perfects: 0,
            best_score: 0,
            drop_clock: 0.0,
            next_poll: 0.0,
        }
    }

    pub fn reset(&mut self, last_footprint: f32) {
        let best_score = self.best_score;
        *self = Self::new(last_footprint);
        self.best_score = best_score;
    }

    fn take_color(&mut self, palette_len: usize) -> usize {
        let color = self.color_index % palette_len;
        self.color_index = self.color_index.wrapping_add(1);
        color
    }
}

pub struct Tower {
    config: TowerConfig,
    state: TowerState,
    registry: BlockRegistry,
    active: Option<ActiveBlock>,
}

impl Tower {
    /// Build a tower: seed the base block and spawn the first active block.
    pub fn new(config: TowerConfig, host: &mut impl Host) -> Result<Self, TowerError> {
        config.validate()?;
        let mut state = TowerState::new(config.block_size.x);
        let base = Self::base_block(&config, &mut state, host);
        let registry = BlockRegistry::seeded(base, state.axis);
        let mut tower = Self {
            config,
            state,
            registry,
            active: None,
        };
        tower.spawn(host)?;
        Ok(tower)
    }

    fn base_block(config: &TowerConfig, state: &mut TowerState, host: &mut impl Host) -> Block {
        let footprint = Footprint::new(config.block_size.x, config.block_size.z);
        let position = Vec3::ZERO;
        let color = state.take_color(config.palette_len);
        let handle = host.instantiate_block(position, footprint, config.block_height(), color);
        Block {
            id: BlockId(0),
            handle,
            slab: Slab::new(position, footprint),
            height: config.block_height(),
            color,
        }
    }

    pub fn config(&self) -> &TowerConfig {
        &self.config
    }

    pub fn state(&self) -> &TowerState {
        &self.state
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn active(&self) -> Option<&ActiveBlock> {
        self.active.as_ref()
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.state.score
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.state.game_over
    }

    pub fn last_footprint_size(&self) -> f32 {
        self.registry.last_footprint_size()
    }

    /// Y of the top face of the tower.
    pub fn tower_height(&self) -> Result<f32, TowerError> {
        self.registry.next_spawn_height()
    }

    /// Sample one tick of input, then advance the simulation by `dt`.
    ///
    /// Drop requests outside `Moving` are dropped here, so a held or mashed key
    /// never reaches [`Tower::trigger_drop`] mid-fall.
    pub fn step(&mut self, input: TickInput, dt: f32, host: &mut impl Host) -> Result<(), TowerError> {
        match self.state.phase {
            Phase::GameOver if input.restart_requested => self.restart(host)?,
            Phase::Moving if input.drop_requested => self.trigger_drop()?,
            _ => {}
        }
        self.tick(dt, host)
    }

    /// Advance by `dt`. Non-positive or non-finite `dt` leaves state untouched.
    pub fn tick(&mut self, dt: f32, host: &mut impl Host) -> Result<(), TowerError> {
        if dt > 0.0 && dt.is_finite() {
            match self.state.phase {
                Phase::Moving => self.advance_horizontal(dt, host),
                Phase::Dropping | Phase::Settling => self.advance_drop(dt, host)?,
                Phase::Idle | Phase::Landed | Phase::GameOver => {}
            }
        }
        host.on_tower_height_changed(self.tower_height()?);
        Ok(())
    }

    /// Release the active block. Only valid while `Moving`.
    pub fn trigger_drop(&mut self) -> Result<(), TowerError> {
        let phase = self.state.phase;
        let Some(active) = self.active.as_mut().filter(|_| phase == Phase::Moving) else {
            warn!(?phase, "drop ignored outside of moving phase");
            return Err(TowerError::InvalidTransition {
                operation: "trigger_drop",
                phase,
            });
        };
        active.vertical_speed = self.config.drop_speed;
        self.state.phase = Phase::Dropping;
        self.state.drop_clock = 0.0;
        self.state.next_poll = self.config.settle_grace;
        debug!(
            axis = self.state.axis.label(),
            at = self.state.axis.component(active.slab.position),
            "drop triggered"
        );
        Ok(())
    }

    /// Throw the session away and start a fresh tower.
    pub fn restart(&mut self, host: &mut impl Host) -> Result<(), TowerError> {
        if self.state.phase != Phase::GameOver {
            warn!(phase = ?self.state.phase, "restart requested mid-game");
        }
        if let Some(active) = self.active.take() {
            host.destroy_block(active.handle);
        }
        for block in self.registry.drain() {
            host.destroy_block(block.handle);
        }
        self.state.reset(self.config.block_size.x);
        let base = Self::base_block(&self.config, &mut self.state, host);
        self.registry.reseed(base, self.state.axis);
        self.spawn(host)?;
        host.on_score_changed(self.state.score);
        info!(best = self.state.best_score, "tower restarted");
        Ok(())
    }

    fn advance_horizontal(&mut self, dt: f32, host: &mut impl Host) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let axis = self.state.axis;
        let bound = self.config.boundary_width;
        let mut at = axis.component(active.slab.position)
            + self.config.move_speed * self.state.direction.sign() * dt;
        if at >= bound {
            at = bound;
            self.state.direction = Direction::Negative;
        } else if at <= -bound {
            at = -bound;
            self.state.direction = Direction::Positive;
        }
        axis.set_component(&mut active.slab.position, at);
        host.set_footprint(active.handle, active.slab.footprint, active.slab.position);
    }

    fn advance_drop(&mut self, dt: f32, host: &mut impl Host) -> Result<(), TowerError> {
        let contact = self.registry.next_spawn_height()?;
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        self.state.drop_clock += dt;

        let y = active.slab.position.y - active.vertical_speed * dt;
        if y <= contact {
            active.slab.position.y = contact;
            active.vertical_speed = 0.0;
        } else {
            active.slab.position.y = y;
        }
        host.set_footprint(active.handle, active.slab.footprint, active.slab.position);

        if self.state.phase == Phase::Dropping && self.state.drop_clock >= self.config.settle_grace {
            self.state.phase = Phase::Settling;
        }
        if self.state.phase != Phase::Settling || self.state.drop_clock < self.state.next_poll {
            return Ok(());
        }
        // Skip every poll the step jumped over; a precision floor keeps it ahead of the clock.
        let interval = self.config.settle_interval;
        let missed = ((self.state.drop_clock - self.state.next_poll) / interval).floor() + 1.0;
        self.state.next_poll =
            (self.state.next_poll + missed * interval).max(self.state.drop_clock.next_up());
        if active.vertical_speed.abs() < self.config.settle_speed {
            self.state.phase = Phase::Landed;
            self.land(host)?;
        }
        Ok(())
    }

    /// Evaluate the landed block against the registry top.
    fn land(&mut self, host: &mut impl Host) -> Result<(), TowerError> {
        debug_assert_eq!(self.state.phase, Phase::Landed);
        debug_assert!(self.active.is_some(), "landed without an active block");
        let Some(mut active) = self.active.take() else {
            return Ok(());
        };
        let axis = self.state.axis;
        let top = self.registry.top()?;
        active.slab.position.y = top.top_face();
        let reference = top.slab.position;
        let previous_size = top.slab.footprint.along(axis);
        let overlap = geometry::overlap(&active.slab, &top.slab, axis);

        let outcome = scoring::judge(
            overlap,
            previous_size,
            self.config.min_block_size,
            self.config.perfect_threshold,
        );
        let Outcome::Placed { overlap, perfect } = outcome else {
            host.destroy_block(active.handle);
            self.state.phase = Phase::GameOver;
            self.state.game_over = true;
            self.state.best_score = self.state.best_score.max(self.state.score);
            info!(
                overlap,
                score = self.state.score,
                height = self.registry.len(),
                "game over"
            );
            host.on_game_over(self.state.score);
            return Ok(());
        };

        let mut slab = active.slab;
        geometry::resize(&mut slab, overlap, reference, axis);
        host.set_footprint(active.handle, slab.footprint, slab.position);

        self.state.score += outcome.points();
        self.state.placements += 1;
        self.state.best_score = self.state.best_score.max(self.state.score);
        if perfect {
            self.state.perfects += 1;
            host.on_perfect_placement(slab.position);
        }
        host.on_score_changed(self.state.score);
        debug!(axis = axis.label(), overlap, perfect, score = self.state.score, "block placed");

        let id = BlockId(self.registry.len() as u32);
        self.registry.append(
            Block {
                id,
                handle: active.handle,
                slab,
                height: self.config.block_height(),
                color: active.color,
            },
            axis,
        );
        self.state.last_footprint = self.registry.last_footprint_size();
        if self.config.alternate_axis {
            self.state.axis = axis.other();
        }
        self.spawn(host)
    }

    /// New active block above the top, inheriting its footprint.
    fn spawn(&mut self, host: &mut impl Host) -> Result<(), TowerError> {
        let top = self.registry.top()?;
        let footprint = top.slab.footprint;
        let mut position = top.slab.position;
        position.y = top.top_face() + self.config.spawn_clearance;
        self.state
            .axis
            .set_component(&mut position, -self.config.boundary_width);

        let color = self.state.take_color(self.config.palette_len);
        let handle = host.instantiate_block(position, footprint, self.config.block_height(), color);
        self.active = Some(ActiveBlock {
            slab: Slab::new(position, footprint),
            handle,
            color,
            vertical_speed: 0.0,
        });
        self.state.direction = Direction::Positive;
        self.state.drop_clock = 0.0;
        self.state.next_poll = 0.0;
        self.state.phase = Phase::Moving;
        Ok(())
    }
}
