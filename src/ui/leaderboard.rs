//! Top scores table.

use super::game_common::{key_hints, screen_title, tier_color};
use super::throbber::spinner_char;
use crate::accounts::LeaderboardEntry;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub enum LeaderboardState {
    Loading,
    Loaded(Vec<LeaderboardEntry>),
    Failed(String),
}

pub struct LeaderboardScreen {
    pub state: LeaderboardState,
}

impl LeaderboardScreen {
    pub fn loading() -> Self {
        Self {
            state: LeaderboardState::Loading,
        }
    }

    pub fn draw(&self, f: &mut Frame, area: Rect, highlight: Option<&str>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(2)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Min(0),    // Table
                Constraint::Length(2), // Controls
            ])
            .split(area);

        f.render_widget(screen_title("🏆 Leaderboard 🏆"), chunks[0]);

        let lines = match &self.state {
            LeaderboardState::Loading => vec![Line::from(Span::styled(
                format!("{} Loading scores...", spinner_char()),
                Style::default().fg(Color::Yellow),
            ))],
            LeaderboardState::Failed(error) => vec![Line::from(Span::styled(
                format!("✗ {}", error),
                Style::default().fg(Color::Red),
            ))],
            LeaderboardState::Loaded(entries) if entries.is_empty() => {
                vec![Line::from("No scores yet. Go run!")]
            }
            LeaderboardState::Loaded(entries) => leaderboard_lines(entries, highlight),
        };

        let table = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        f.render_widget(table, chunks[1]);

        f.render_widget(
            Paragraph::new(key_hints(&[("[R]", "Refresh"), ("[Esc]", "Back")]))
                .alignment(Alignment::Center),
            chunks[2],
        );
    }
}

/// Plain-text rows, also used by the `leaderboard` command.
pub fn format_entry(rank: usize, entry: &LeaderboardEntry) -> String {
    format!(
        "{:>2}. {:<20} {:>6}  {:<6}  {}",
        rank,
        entry.username,
        entry.score,
        entry.character_color.name(),
        entry.date.format("%Y-%m-%d")
    )
}

fn leaderboard_lines(entries: &[LeaderboardEntry], highlight: Option<&str>) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        format!(
            "{:>2}  {:<20} {:>6}  {:<6}  {}",
            "#", "Player", "Score", "Runner", "Date"
        ),
        Style::default().fg(Color::Gray),
    ))];
    for (i, entry) in entries.iter().enumerate() {
        let mut style = Style::default().fg(tier_color(entry.character_color));
        if highlight == Some(entry.username.as_str()) {
            style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }
        lines.push(Line::from(Span::styled(format_entry(i + 1, entry), style)));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::Tier;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_format_entry() {
        let entry = LeaderboardEntry {
            username: "kong".to_string(),
            score: 142,
            character_color: Tier::Blue,
            date: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
        };
        let row = format_entry(1, &entry);
        assert!(row.starts_with(" 1. kong"));
        assert!(row.contains("142"));
        assert!(row.contains("Blue"));
        assert!(row.ends_with("2024-03-01"));
    }
}
