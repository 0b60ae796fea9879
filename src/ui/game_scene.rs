//! Banana Runner game view.
//!
//! Draws the track top-down: lateral position runs left to right and
//! obstacles scroll from the spawn line at the top toward the runner near
//! the bottom. Uses a cell buffer for per-character color control and
//! stamps it row-by-row as Paragraph widgets.

use super::game_common::{
    centered_rect, render_hint_bar, render_result_card, sidebar_frame, split_runner_screen,
    tier_color,
};
use super::throbber::{spinner_char, waiting_message};
use crate::challenges::ExtraLifeChallenge;
use crate::config::RunnerConfig;
use crate::core::game_state::{GameSession, SessionMode};
use crate::progression::Tier;
use crate::runner::ObstacleShape;
use crate::scene::{AnimationCue, Scene, TrackScene};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

// ── Track rendering characters ──────────────────────────────────────
const EDGE_CHAR: char = '│';
const LANE_MARK: char = '┊';
const GROUND_CHAR: char = '·';

/// Extra world units shown beyond each lane edge.
const SHOULDER: f64 = 1.5;

/// Render the whole game screen.
pub fn render_game_scene(
    frame: &mut Frame,
    area: Rect,
    session: &GameSession,
    scene: &TrackScene,
    username: Option<&str>,
) {
    let border = tier_color(session.character);
    let layout = split_runner_screen(frame, area, " Banana Runner ", border);

    render_track(frame, layout.track, session, scene);

    match session.mode {
        SessionMode::Idle => render_center_prompt(
            frame,
            layout.track,
            "[ Press Space to Start ]",
            Color::White,
        ),
        SessionMode::Collided => {
            render_center_prompt(frame, layout.track, "💥 BONK! 💥", Color::Red)
        }
        SessionMode::MiniGameForExtraLife => {
            if let Some(challenge) = &session.active_challenge {
                render_puzzle(frame, layout.track, challenge, session.tick_count);
            }
        }
        SessionMode::GameOver => render_result_card(frame, layout.track, session),
        SessionMode::Running => {}
    }

    render_status_bar_content(frame, layout.hints, session);
    render_info_panel(frame, layout.sidebar, session, username);
}

#[derive(Clone, Copy)]
struct Cell {
    ch: char,
    fg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::Reset,
        }
    }
}

/// Column for a lateral coordinate, or `None` if off screen.
pub fn lane_to_col(x: f64, config: &RunnerConfig, width: u16) -> Option<u16> {
    if width == 0 {
        return None;
    }
    let half = config.lane_half_width + SHOULDER;
    let t = (x + half) / (2.0 * half);
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    Some(((t * (width - 1) as f64).round() as u16).min(width - 1))
}

/// Row for a forward distance. The spawn line is row 0, the despawn line
/// is the bottom row.
pub fn depth_to_row(z: f64, config: &RunnerConfig, height: u16) -> Option<u16> {
    if height == 0 {
        return None;
    }
    let span = config.spawn_distance - config.despawn_distance;
    if span <= 0.0 {
        return None;
    }
    let t = (config.spawn_distance - z) / span;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    Some(((t * (height - 1) as f64).round() as u16).min(height - 1))
}

fn runner_glyph(cue: AnimationCue, tick: u64) -> char {
    match cue {
        AnimationCue::Dance => '♪',
        AnimationCue::Jump => '▲',
        AnimationCue::Death => '✖',
        AnimationCue::Running => {
            if (tick / 8) % 2 == 0 {
                '◆'
            } else {
                '◇'
            }
        }
    }
}

fn obstacle_color(shape: ObstacleShape) -> Color {
    match shape {
        ObstacleShape::Cylinder => Color::Rgb(230, 140, 40),
        ObstacleShape::Block => Color::Rgb(150, 110, 70),
    }
}

fn render_track(frame: &mut Frame, area: Rect, session: &GameSession, scene: &TrackScene) {
    if area.height < 3 || area.width < 10 {
        return;
    }
    let config = &session.config;
    let width = area.width as usize;
    let height = area.height as usize;
    let mut buffer = vec![vec![Cell::default(); width]; height];

    // ── Ground and lane edges ─────────────────────────────────────────
    let scroll = if session.is_running() {
        (session.tick_count / 4) as usize
    } else {
        0
    };
    for (row, cells) in buffer.iter_mut().enumerate() {
        if (row + scroll) % 3 == 0 {
            for (col, cell) in cells.iter_mut().enumerate() {
                if col % 4 == 2 {
                    *cell = Cell {
                        ch: GROUND_CHAR,
                        fg: Color::Rgb(60, 70, 50),
                    };
                }
            }
        }
    }
    let edges = [
        lane_to_col(-config.lane_half_width, config, area.width),
        lane_to_col(config.lane_half_width, config, area.width),
    ];
    let center = lane_to_col(0.0, config, area.width);
    for cells in buffer.iter_mut() {
        for col in edges.iter().flatten() {
            cells[*col as usize] = Cell {
                ch: EDGE_CHAR,
                fg: Color::Gray,
            };
        }
        if let Some(col) = center {
            if cells[col as usize].ch == ' ' {
                cells[col as usize] = Cell {
                    ch: LANE_MARK,
                    fg: Color::Rgb(70, 70, 70),
                };
            }
        }
    }

    // ── Obstacles ─────────────────────────────────────────────────────
    for obstacle in &session.obstacles {
        let (Some(col), Some(row)) = (
            lane_to_col(obstacle.position.x, config, area.width),
            depth_to_row(obstacle.position.z, config, area.height),
        ) else {
            continue;
        };
        let glyph = obstacle.shape.glyph();
        let fg = obstacle_color(obstacle.shape);
        for c in [col.saturating_sub(1), col, (col + 1).min(area.width - 1)] {
            buffer[row as usize][c as usize] = Cell { ch: glyph, fg };
        }
    }

    // ── Runner ────────────────────────────────────────────────────────
    if let Some(player) = scene.player_position() {
        if let (Some(col), Some(row)) = (
            lane_to_col(player.x, config, area.width),
            depth_to_row(player.z, config, area.height),
        ) {
            buffer[row as usize][col as usize] = Cell {
                ch: runner_glyph(scene.animation(), session.tick_count),
                fg: tier_color(session.character),
            };
        }
    }

    // ── Score (top-right) ─────────────────────────────────────────────
    let score_text = format!("Score: {}", session.score);
    let start = width.saturating_sub(score_text.chars().count() + 1);
    for (i, ch) in score_text.chars().enumerate() {
        if start + i < width {
            buffer[0][start + i] = Cell {
                ch,
                fg: Color::White,
            };
        }
    }

    // ── Render buffer to terminal ─────────────────────────────────────
    for (row_idx, row_data) in buffer.iter().enumerate() {
        let mut spans: Vec<Span> = Vec::new();
        let mut current_fg = Color::Reset;
        let mut current_text = String::new();

        for &cell in row_data.iter() {
            if cell.fg != current_fg && !current_text.is_empty() {
                spans.push(Span::styled(
                    std::mem::take(&mut current_text),
                    Style::default().fg(current_fg),
                ));
            }
            current_fg = cell.fg;
            current_text.push(cell.ch);
        }
        if !current_text.is_empty() {
            spans.push(Span::styled(current_text, Style::default().fg(current_fg)));
        }

        let row_area = Rect::new(area.x, area.y + row_idx as u16, area.width, 1);
        frame.render_widget(Paragraph::new(Line::from(spans)), row_area);
    }
}

fn render_center_prompt(frame: &mut Frame, area: Rect, prompt: &str, color: Color) {
    if area.height < 5 || area.width < 20 {
        return;
    }
    let width = (prompt.chars().count() as u16 + 2).min(area.width);
    let prompt_area = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height / 2,
        width,
        1,
    );
    frame.render_widget(Clear, prompt_area);
    frame.render_widget(
        Paragraph::new(Span::styled(
            prompt.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        prompt_area,
    );
}

fn render_puzzle(frame: &mut Frame, area: Rect, challenge: &ExtraLifeChallenge, seed: u64) {
    let modal = centered_rect(area, 56, 12);
    frame.render_widget(Clear, modal);

    let block = Block::default()
        .title(" 🍌 Extra Life Puzzle ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(modal);
    frame.render_widget(block, modal);

    let mut lines = Vec::new();
    match (&challenge.puzzle, &challenge.load_error) {
        (None, Some(error)) => {
            lines.push(Line::from(Span::styled(
                format!("Could not load a puzzle: {}", error),
                Style::default().fg(Color::Red),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "[Esc] Skip",
                Style::default().fg(Color::DarkGray),
            )));
        }
        (None, None) => {
            lines.push(Line::from(Span::styled(
                format!("{} {}", spinner_char(), waiting_message(seed / 60)),
                Style::default().fg(Color::Yellow),
            )));
        }
        (Some(puzzle), _) => {
            let question = if puzzle.is_image() {
                format!("Open the puzzle image: {}", puzzle.question)
            } else {
                format!("What is ? in  {}", puzzle.question)
            };
            lines.push(Line::from(Span::styled(
                question,
                Style::default().fg(Color::White),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("Answer: ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("{}_", challenge.answer_input),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
            ]));
            lines.push(Line::from(Span::styled(
                format!(
                    "Attempts left: {}/{}",
                    challenge.attempts_remaining(),
                    challenge.max_attempts
                ),
                Style::default().fg(Color::Gray),
            )));
        }
    }
    if let Some(message) = &challenge.message {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::LightYellow),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        inner,
    );
}

fn render_status_bar_content(frame: &mut Frame, area: Rect, session: &GameSession) {
    match session.mode {
        SessionMode::Idle => render_hint_bar(
            frame,
            area,
            "Ready",
            Color::LightYellow,
            &[("[Space]", "Start"), ("[Esc]", "Home")],
        ),
        SessionMode::Running => render_hint_bar(
            frame,
            area,
            "Run!",
            Color::LightYellow,
            &[
                ("[←→/AD]", "Move"),
                ("[↑/W]", "Jump"),
                ("[S]", "Stop"),
                ("[Esc]", "Home"),
            ],
        ),
        SessionMode::Collided => {
            render_hint_bar(frame, area, "Ouch!", Color::Red, &[("[Esc]", "Home")])
        }
        SessionMode::MiniGameForExtraLife => render_hint_bar(
            frame,
            area,
            "Solve for an extra life",
            Color::Yellow,
            &[("[0-9 -]", "Type"), ("[Enter]", "Submit"), ("[Esc]", "Skip")],
        ),
        SessionMode::GameOver => render_hint_bar(
            frame,
            area,
            "Game over",
            Color::Red,
            &[("[R]", "Play again"), ("[Esc]", "Home")],
        ),
    }
}

fn next_unlock(high_score: u64) -> Option<Tier> {
    Tier::ALL.into_iter().find(|t| t.threshold() > high_score)
}

fn render_info_panel(frame: &mut Frame, area: Rect, session: &GameSession, username: Option<&str>) {
    let inner = sidebar_frame(frame, area, " Run ");
    let label = Style::default().fg(Color::DarkGray);

    let mut lines: Vec<Line> = vec![
        Line::from(vec![
            Span::styled("Player: ", label),
            Span::styled(
                username.unwrap_or("guest").to_string(),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(vec![
            Span::styled("Runner: ", label),
            Span::styled(
                session.character.name(),
                Style::default().fg(tier_color(session.character)),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(
                session.score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Best:  ", label),
            Span::styled(
                session.high_score.to_string(),
                Style::default().fg(Color::Cyan),
            ),
        ]),
        Line::from(vec![
            Span::styled("Lives used: ", label),
            Span::styled(
                session.extra_lives_used.to_string(),
                Style::default().fg(Color::White),
            ),
        ]),
    ];

    if let Some(tier) = next_unlock(session.high_score) {
        lines.push(Line::from(vec![
            Span::styled("Next: ", label),
            Span::styled(tier.name(), Style::default().fg(tier_color(tier))),
            Span::styled(format!(" at {}", tier.threshold()), label),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Log:",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )));
    for message in &session.messages {
        lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Gray),
        )));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_mapping_is_monotonic_and_centered() {
        let config = RunnerConfig::default();
        let left = lane_to_col(-config.lane_half_width, &config, 41).unwrap();
        let mid = lane_to_col(0.0, &config, 41).unwrap();
        let right = lane_to_col(config.lane_half_width, &config, 41).unwrap();
        assert!(left < mid && mid < right);
        assert_eq!(mid, 20);
        assert_eq!(lane_to_col(100.0, &config, 41), None);
    }

    #[test]
    fn test_depth_mapping_ends() {
        let config = RunnerConfig::default();
        assert_eq!(depth_to_row(config.spawn_distance, &config, 21), Some(0));
        assert_eq!(depth_to_row(config.despawn_distance, &config, 21), Some(20));
        let player_row = depth_to_row(0.0, &config, 21).unwrap();
        assert!(player_row > 10 && player_row < 20);
        assert_eq!(depth_to_row(config.spawn_distance + 1.0, &config, 21), None);
    }

    #[test]
    fn test_next_unlock() {
        assert_eq!(next_unlock(0), Some(Tier::Green));
        assert_eq!(next_unlock(120), Some(Tier::Red));
        assert_eq!(next_unlock(150), None);
    }
}
