//! Home menu.

use super::game_common::{key_hints, screen_title, tier_color};
use crate::progression::Tier;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeAction {
    Play,
    Login,
    Register,
    Characters,
    Leaderboard,
    Logout,
    Quit,
}

impl HomeAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Play => "Play",
            Self::Login => "Login",
            Self::Register => "Register",
            Self::Characters => "Characters",
            Self::Leaderboard => "Leaderboard",
            Self::Logout => "Logout",
            Self::Quit => "Quit",
        }
    }
}

/// Menu entries for the current login state.
pub fn menu_items(authenticated: bool) -> Vec<HomeAction> {
    if authenticated {
        vec![
            HomeAction::Play,
            HomeAction::Characters,
            HomeAction::Leaderboard,
            HomeAction::Logout,
            HomeAction::Quit,
        ]
    } else {
        vec![
            HomeAction::Play,
            HomeAction::Login,
            HomeAction::Register,
            HomeAction::Characters,
            HomeAction::Leaderboard,
            HomeAction::Quit,
        ]
    }
}

/// What the home screen shows about the player.
pub struct HomeSummary<'a> {
    pub username: Option<&'a str>,
    pub high_score: u64,
    pub character: Tier,
    pub backend: &'static str,
}

pub struct HomeScreen {
    pub selected_index: usize,
    /// One-line notice (sync results, login errors).
    pub status: Option<String>,
}

impl HomeScreen {
    pub fn new() -> Self {
        Self {
            selected_index: 0,
            status: None,
        }
    }

    pub fn move_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn move_down(&mut self, item_count: usize) {
        if self.selected_index + 1 < item_count {
            self.selected_index += 1;
        }
    }

    pub fn selected(&self, items: &[HomeAction]) -> Option<HomeAction> {
        items.get(self.selected_index).copied()
    }

    pub fn draw(&self, f: &mut Frame, area: Rect, items: &[HomeAction], summary: &HomeSummary) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(2)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(4), // Player summary
                Constraint::Min(0),    // Menu
                Constraint::Length(2), // Status
                Constraint::Length(2), // Controls
            ])
            .split(area);

        f.render_widget(screen_title("🍌 BANANA RUNNER 🍌"), chunks[0]);

        let who = match summary.username {
            Some(name) => Span::styled(
                format!("Logged in as {}", name),
                Style::default().fg(Color::Green),
            ),
            None => Span::styled("Playing as guest", Style::default().fg(Color::Gray)),
        };
        let info = vec![
            Line::from(vec![
                who,
                Span::styled(
                    format!("  ({})", summary.backend),
                    Style::default().fg(Color::DarkGray),
                ),
            ]),
            Line::from(vec![
                Span::raw("High score: "),
                Span::styled(
                    summary.high_score.to_string(),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("   Runner: "),
                Span::styled(
                    summary.character.name(),
                    Style::default().fg(tier_color(summary.character)),
                ),
            ]),
        ];
        f.render_widget(Paragraph::new(info).alignment(Alignment::Center), chunks[1]);

        let lines: Vec<Line> = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                if i == self.selected_index {
                    Line::from(Span::styled(
                        format!("> {} <", item.label()),
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ))
                } else {
                    Line::from(Span::styled(
                        item.label(),
                        Style::default().fg(Color::White),
                    ))
                }
            })
            .collect();
        let menu = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .alignment(Alignment::Center);
        let menu_height = items.len() as u16 + 2;
        let menu_area = Rect {
            height: menu_height.min(chunks[2].height),
            ..chunks[2]
        };
        f.render_widget(menu, menu_area);

        if let Some(status) = &self.status {
            f.render_widget(
                Paragraph::new(status.as_str())
                    .style(Style::default().fg(Color::Yellow))
                    .alignment(Alignment::Center),
                chunks[3],
            );
        }

        f.render_widget(
            Paragraph::new(key_hints(&[
                ("[↑↓]", "Navigate"),
                ("[Enter]", "Select"),
                ("[Q]", "Quit"),
            ]))
            .alignment(Alignment::Center),
            chunks[4],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_depends_on_login() {
        let guest = menu_items(false);
        assert!(guest.contains(&HomeAction::Login));
        assert!(!guest.contains(&HomeAction::Logout));

        let member = menu_items(true);
        assert!(member.contains(&HomeAction::Logout));
        assert!(!member.contains(&HomeAction::Register));
        assert_eq!(member[0], HomeAction::Play);
    }

    #[test]
    fn test_navigation_clamped() {
        let items = menu_items(true);
        let mut screen = HomeScreen::new();
        screen.move_up();
        assert_eq!(screen.selected(&items), Some(HomeAction::Play));
        for _ in 0..20 {
            screen.move_down(items.len());
        }
        assert_eq!(screen.selected(&items), Some(HomeAction::Quit));
    }
}
