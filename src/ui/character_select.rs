use super::game_common::{key_hints, screen_title, tier_color};
use crate::progression::{CharacterOption, Tier};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub struct CharacterSelectScreen {
    pub selected_index: usize,
    pub error: Option<String>,
}

impl CharacterSelectScreen {
    pub fn new(current: Tier) -> Self {
        Self {
            selected_index: current.index(),
            error: None,
        }
    }

    pub fn move_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
        self.error = None;
    }

    pub fn move_down(&mut self) {
        if self.selected_index + 1 < Tier::ALL.len() {
            self.selected_index += 1;
        }
        self.error = None;
    }

    pub fn highlighted(&self) -> Tier {
        Tier::from_index(self.selected_index)
    }

    pub fn draw(
        &self,
        f: &mut Frame,
        area: Rect,
        options: &[CharacterOption],
        current: Tier,
        high_score: u64,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(2)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Min(0),    // List
                Constraint::Length(2), // Error
                Constraint::Length(2), // Controls
            ])
            .split(area);

        f.render_widget(screen_title("Choose Your Runner"), chunks[0]);

        let mut lines = vec![
            Line::from(Span::styled(
                format!("High score: {}", high_score),
                Style::default().fg(Color::Cyan),
            )),
            Line::from(""),
        ];
        for (i, option) in options.iter().enumerate() {
            let marker = if i == self.selected_index { "> " } else { "  " };
            let color = if option.unlocked {
                tier_color(option.tier)
            } else {
                Color::DarkGray
            };
            let mut style = Style::default().fg(color);
            if i == self.selected_index {
                style = style.add_modifier(Modifier::BOLD);
            }
            let status = if option.tier == current {
                "  [selected]".to_string()
            } else if option.unlocked {
                String::new()
            } else {
                format!("  🔒 score {} to unlock", option.score_required)
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{}● {:<7}", marker, option.tier.name()), style),
                Span::styled(status, Style::default().fg(Color::Gray)),
            ]));
        }

        let list = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        f.render_widget(list, chunks[1]);

        if let Some(error) = &self.error {
            f.render_widget(
                Paragraph::new(format!("✗ {}", error))
                    .style(Style::default().fg(Color::Red))
                    .alignment(Alignment::Center),
                chunks[2],
            );
        }

        f.render_widget(
            Paragraph::new(key_hints(&[
                ("[↑↓]", "Navigate"),
                ("[Enter]", "Select"),
                ("[Esc]", "Back"),
            ]))
            .alignment(Alignment::Center),
            chunks[3],
        );
    }
}
