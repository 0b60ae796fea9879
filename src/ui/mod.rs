pub mod auth_form;
pub mod character_select;
pub mod game_common;
pub mod game_scene;
pub mod home;
pub mod leaderboard;
mod throbber;

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Minimum terminal size the game view is laid out for.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 20;

/// Draw a "resize me" notice if the terminal is too small. Returns true if drawn.
pub fn draw_too_small(frame: &mut Frame, area: Rect) -> bool {
    if area.width >= MIN_WIDTH && area.height >= MIN_HEIGHT {
        return false;
    }
    let text = format!(
        "Terminal too small: {}x{}\nNeed at least {}x{}",
        area.width, area.height, MIN_WIDTH, MIN_HEIGHT
    );
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
    true
}
