//! Widgets shared by the runner screen and the menus.

use crate::core::game_state::GameSession;
use crate::progression::Tier;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Rows kept for the track before the hint bar gets space.
const TRACK_MIN_ROWS: u16 = 12;
const HINT_ROWS: u16 = 2;
const SIDEBAR_COLS: u16 = 26;

/// Regions of the runner screen.
///
/// ```text
/// ┌─ Banana Runner ─────────────────┬─ Run ───────┐
/// │ track                           │ sidebar     │
/// │ hints (status + keys)           │             │
/// └─────────────────────────────────┴─────────────┘
/// ```
pub struct RunnerAreas {
    pub track: Rect,
    pub hints: Rect,
    pub sidebar: Rect,
}

/// Clear `area`, draw the outer frame in the runner's color and split it.
pub fn split_runner_screen(frame: &mut Frame, area: Rect, title: &str, accent: Color) -> RunnerAreas {
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [left, sidebar] = split_pair(Direction::Horizontal, inner, Constraint::Min(20), SIDEBAR_COLS);
    let [track, hints] = split_pair(Direction::Vertical, left, Constraint::Min(TRACK_MIN_ROWS), HINT_ROWS);
    RunnerAreas {
        track,
        hints,
        sidebar,
    }
}

fn split_pair(direction: Direction, area: Rect, first: Constraint, second: u16) -> [Rect; 2] {
    let chunks = Layout::default()
        .direction(direction)
        .constraints([first, Constraint::Length(second)])
        .split(area);
    [chunks[0], chunks[1]]
}

/// One status line with the key hints under it.
pub fn render_hint_bar(frame: &mut Frame, area: Rect, status: &str, color: Color, keys: &[(&str, &str)]) {
    if area.height == 0 {
        return;
    }
    frame.render_widget(
        Paragraph::new(status.to_string())
            .style(Style::default().fg(color))
            .alignment(Alignment::Center),
        Rect { height: 1, ..area },
    );
    if area.height > 1 && !keys.is_empty() {
        frame.render_widget(
            Paragraph::new(key_hints(keys)).alignment(Alignment::Center),
            Rect {
                y: area.y + 1,
                height: 1,
                ..area
            },
        );
    }
}

/// `[Key] Action  [Key] Action`
pub fn key_hints(keys: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(keys.len() * 3);
    for (key, action) in keys {
        if !spans.is_empty() {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(key.to_string(), Style::default().fg(Color::White)));
        spans.push(Span::styled(
            format!(" {}", action),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

/// Card shown over the track once a run is over.
pub fn render_result_card(frame: &mut Frame, area: Rect, session: &GameSession) {
    let new_best = session.score > session.starting_high_score;
    let (title, color) = if new_best {
        ("NEW HIGH SCORE!", Color::Green)
    } else {
        ("GAME OVER", Color::Red)
    };

    let card = centered_rect(area, 44, 9);
    frame.render_widget(Clear, card);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    let inner = block.inner(card);
    frame.render_widget(block, card);

    let lines = vec![
        Line::from(Span::styled(
            title,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Final score: {}", session.score),
            Style::default().fg(Color::White),
        )),
        Line::from(Span::styled(
            format!(
                "Best: {}   Extra lives used: {}",
                session.high_score, session.extra_lives_used
            ),
            Style::default().fg(Color::Cyan),
        )),
        Line::from(""),
        key_hints(&[("[R]", "Play again"), ("[Esc]", "Home")]),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

/// Bordered sidebar titled `title`. Returns the area inside the border.
pub fn sidebar_frame(frame: &mut Frame, area: Rect, title: &str) -> Rect {
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

/// A `width` x `height` rect centered in `area`, shrunk to fit.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Terminal color for a runner tier.
pub fn tier_color(tier: Tier) -> Color {
    let (r, g, b) = tier.rgb();
    Color::Rgb(r, g, b)
}

/// Title line used at the top of the menu screens.
pub fn screen_title(text: &str) -> Paragraph<'static> {
    Paragraph::new(text.to_string())
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
}
