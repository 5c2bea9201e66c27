//! Layout and drawing: tower side view, sidebar, pause and game-over overlays.

use crate::app::{Drawable, Scene};
use crate::theme::Theme;
use glam::Vec3;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use stacktui::{Axis, Tower};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

const SIDEBAR_WIDTH: u16 = 24;
/// Widest the tower view gets; wider terminals just get more margin.
const MAX_BOARD_COLS: u16 = 64;
/// Layers kept visible above the tower top.
const HEADROOM_LAYERS: f32 = 3.0;
/// Perfect-placement flash (TachyonFX fade from white).
const PERFECT_FLASH_MS: u32 = 350;

/// Everything `draw` reads.
pub struct View<'a> {
    pub tower: &'a Tower,
    pub scene: &'a Scene,
    pub theme: &'a Theme,
    pub paused: bool,
}

/// Running perfect-placement flash.
#[derive(Default)]
pub struct Flash {
    effect: Option<Effect>,
    process_time: Option<Instant>,
    /// World position of the perfect block, for the "PERFECT" label.
    at: Option<Vec3>,
}

impl Flash {
    pub fn start(&mut self, at: Vec3) {
        let effect = fx::fade_from(Color::White, Color::White, (PERFECT_FLASH_MS, Interpolation::QuadOut));
        self.effect = Some(effect);
        self.process_time = None;
        self.at = Some(at);
    }

    fn is_running(&self) -> bool {
        self.effect.is_some()
    }
}

/// World-to-screen mapping for the tower board.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Projection {
    board: Rect,
    axis: Axis,
    world_left: f32,
    cols_per_unit: f32,
    /// World y at the bottom row.
    floor: f32,
    units_per_row: f32,
}

impl Projection {
    fn new(board: Rect, tower: &Tower, camera_height: f32) -> Self {
        let config = tower.config();
        let widest = config.block_size.x.max(config.block_size.z);
        let half_span = config.boundary_width + widest * 0.5;
        let units_per_row = config.block_height();
        let visible = f32::from(board.height) * units_per_row;
        let headroom = (HEADROOM_LAYERS * units_per_row).max(config.spawn_clearance + units_per_row);
        let floor = (camera_height + headroom - visible).max(0.0);
        Self {
            board,
            axis: tower.state().axis,
            world_left: -half_span,
            cols_per_unit: f32::from(board.width) / (2.0 * half_span),
            floor,
            units_per_row,
        }
    }

    /// Columns `[start, end)` covered by a block, clipped to the board.
    fn columns(&self, block: &Drawable) -> (u16, u16) {
        let center = self.axis.component(block.position);
        let half = block.footprint.along(self.axis) * 0.5;
        let to_col = |x: f32| ((x - self.world_left) * self.cols_per_unit).round().clamp(0.0, f32::from(self.board.width));
        (to_col(center - half) as u16, to_col(center + half) as u16)
    }

    /// Screen row of a block whose bottom sits at world `y`, if visible.
    fn row(&self, y: f32) -> Option<u16> {
        let from_bottom = ((y - self.floor) / self.units_per_row).round();
        if from_bottom < 0.0 || from_bottom >= f32::from(self.board.height) {
            return None;
        }
        Some(self.board.y + self.board.height - 1 - from_bottom as u16)
    }

    /// Visible screen rows a block covers, bottom first.
    fn rows(&self, block: &Drawable) -> impl Iterator<Item = u16> + '_ {
        let layers = (block.height / self.units_per_row).round().max(1.0) as u16;
        let bottom = block.position.y;
        (0..layers).filter_map(move |layer| self.row(bottom + f32::from(layer) * self.units_per_row))
    }
}

/// Draw the game and, when a flash is running, process it over the board.
pub fn draw(frame: &mut Frame, view: &View, flash: &mut Flash, now: Instant) {
    let area = frame.area();
    let board_cols = area.width.saturating_sub(SIDEBAR_WIDTH + 2).min(MAX_BOARD_COLS);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(board_cols + 2),
            Constraint::Length(SIDEBAR_WIDTH),
            Constraint::Fill(1),
        ])
        .split(area);

    let board = draw_board(frame, view, chunks[1]);
    draw_sidebar(frame, view, chunks[2]);

    if flash.is_running() {
        apply_flash(frame, view, flash, board, now);
    }
    if let Some(final_score) = view.scene.final_score {
        draw_game_over(frame, view, area, final_score);
    } else if view.paused {
        draw_pause_overlay(frame, view, area);
    }
}

fn draw_board(frame: &mut Frame, view: &View, area: Rect) -> Rect {
    let theme = view.theme;
    let title = format!(" stacktui  | Height: {} ", view.tower.registry().len() - 1);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title, theme.title));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let buf = frame.buffer_mut();
    for y in inner.y..inner.y + inner.height {
        for x in inner.x..inner.x + inner.width {
            buf[(x, y)].set_symbol(" ").set_style(Style::default().bg(theme.bg));
        }
    }

    let projection = Projection::new(inner, view.tower, view.scene.camera_height);
    let active = view.tower.active().map(|a| a.handle);
    for (handle, drawable) in &view.scene.blocks {
        let (start, end) = projection.columns(drawable);
        let color = theme.block_color(drawable.color);
        // Top half-block on the active one so it reads as "in the air".
        let symbol = if Some(*handle) == active { "▀" } else { "█" };
        for ry in projection.rows(drawable) {
            for col in start..end {
                buf[(inner.x + col, ry)]
                    .set_symbol(symbol)
                    .set_style(Style::default().fg(color).bg(theme.bg));
            }
        }
    }
    inner
}

fn apply_flash(frame: &mut Frame, view: &View, flash: &mut Flash, board: Rect, now: Instant) {
    let delta = flash
        .process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    flash.process_time = Some(now);

    if let Some(effect) = flash.effect.as_mut() {
        frame.render_effect(effect, board, TfxDuration::from_millis(delta_ms));
    }
    if let Some(at) = flash.at {
        let projection = Projection::new(board, view.tower, view.scene.camera_height);
        if let Some(ry) = projection.row(at.y).and_then(|r| r.checked_sub(1)) {
            let label = " PERFECT ";
            let rx = board.x + board.width.saturating_sub(label.len() as u16) / 2;
            let style = Style::default()
                .fg(Color::Black)
                .bg(view.theme.title)
                .add_modifier(Modifier::BOLD);
            frame.buffer_mut().set_string(rx, ry.max(board.y), label, style);
        }
    }
    if flash.effect.as_ref().is_some_and(|e| e.done()) {
        *flash = Flash::default();
    }
}

fn draw_sidebar(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let state = view.tower.state();
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let stat = |label: &'static str, value: String| {
        Line::from(vec![Span::styled(label, title_style), Span::styled(value, fg_style)])
    };
    let lines = vec![
        stat("Score: ", state.score.to_string()),
        stat("Best: ", state.best_score.to_string()),
        stat("Placed: ", state.placements.to_string()),
        stat("Perfect: ", state.perfects.to_string()),
        Line::from(""),
        stat("Axis: ", state.axis.label().to_string()),
        stat("Width: ", format!("{:.2}", view.tower.last_footprint_size())),
        Line::from(""),
        Line::from(Span::styled("Space  drop", Style::default().fg(theme.inactive_fg))),
        Line::from(Span::styled("P      pause", Style::default().fg(theme.inactive_fg))),
        Line::from(Span::styled("Q      quit", Style::default().fg(theme.inactive_fg))),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg));
    Paragraph::new(lines).block(block).render(area, frame.buffer_mut());
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn draw_pause_overlay(frame: &mut Frame, view: &View, area: Rect) {
    let popup = centered(area, 28, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P — Resume    Q — Quit ",
            Style::default().fg(view.theme.main_fg),
        )),
    ];
    Clear.render(popup, frame.buffer_mut());
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(view.theme.div_line).bg(view.theme.bg)),
    );
    p.render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, view: &View, area: Rect, final_score: u32) {
    let popup = centered(area, 32, 10);
    let state = view.tower.state();
    let fg = Style::default().fg(view.theme.main_fg);
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", final_score), fg)),
        Line::from(Span::styled(format!(" Best: {} ", state.best_score), fg)),
        Line::from(Span::styled(
            format!(" Height: {}  Perfect: {} ", state.placements, state.perfects),
            fg,
        )),
    ];
    if final_score > 0 && final_score == state.best_score {
        lines.push(Line::from(Span::styled(
            " New record! ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(Span::styled(" R — Restart    Q — Quit ", fg)));
    Clear.render(popup, frame.buffer_mut());
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(view.theme.div_line).bg(view.theme.bg))
            .title(Span::styled(" stacktui ", view.theme.title)),
    );
    p.render(popup, frame.buffer_mut());
}

#[cfg(test)]
mod tests {
    use super::*;
    use stacktui::{Footprint, NullHost, TowerConfig};

    fn tower() -> Tower {
        let config = TowerConfig {
            alternate_axis: false,
            ..TowerConfig::default()
        };
        Tower::new(config, &mut NullHost::default()).unwrap()
    }

    fn drawable(x: f32, y: f32, width: f32) -> Drawable {
        Drawable {
            position: Vec3::new(x, y, 0.0),
            footprint: Footprint::new(width, 3.0),
            height: 0.5,
            color: 0,
        }
    }

    #[test]
    fn base_block_sits_on_bottom_row() {
        let tower = tower();
        let board = Rect::new(1, 1, 55, 20);
        let p = Projection::new(board, &tower, 0.5);
        assert_eq!(p.row(0.0), Some(20));
        assert_eq!(p.row(0.5), Some(19));
    }

    #[test]
    fn centered_block_maps_to_middle_columns() {
        let tower = tower();
        // Span is 2 * (4.0 + 1.5) = 11 units over 55 columns: 5 columns per unit.
        let board = Rect::new(0, 0, 55, 20);
        let p = Projection::new(board, &tower, 0.5);
        assert_eq!(p.columns(&drawable(0.0, 0.0, 3.0)), (20, 35));
        assert_eq!(p.columns(&drawable(-4.0, 0.0, 3.0)), (0, 15));
    }

    #[test]
    fn block_height_spans_rows() {
        let tower = tower();
        let board = Rect::new(1, 1, 55, 20);
        let p = Projection::new(board, &tower, 0.5);
        let rows: Vec<u16> = p.rows(&drawable(0.0, 0.0, 3.0)).collect();
        assert_eq!(rows, vec![20]);

        let tall = Drawable {
            height: 1.5,
            ..drawable(0.0, 0.0, 3.0)
        };
        let rows: Vec<u16> = p.rows(&tall).collect();
        assert_eq!(rows, vec![20, 19, 18]);
    }

    #[test]
    fn camera_scrolls_to_keep_top_visible() {
        let tower = tower();
        let board = Rect::new(0, 0, 55, 10);
        let p = Projection::new(board, &tower, 20.0);
        assert!(p.floor > 0.0);
        assert!(p.row(0.0).is_none());
        assert!(p.row(20.0).is_some());
    }
}
