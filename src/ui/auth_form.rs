//! Login and registration form.

use super::game_common::{key_hints, screen_title};
use crate::accounts::password::{validate_email, validate_password, validate_username};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Username,
    Email,
    Password,
}

impl AuthField {
    fn label(&self) -> &'static str {
        match self {
            Self::Username => "Username:",
            Self::Email => "Email:",
            Self::Password => "Password:",
        }
    }
}

pub struct AuthFormScreen {
    pub mode: AuthMode,
    pub username: String,
    pub email: String,
    pub password: String,
    pub focused: usize,
    pub validation_error: Option<String>,
    /// Set while the request is outstanding.
    pub busy: bool,
}

impl AuthFormScreen {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            username: String::new(),
            email: String::new(),
            password: String::new(),
            focused: 0,
            validation_error: None,
            busy: false,
        }
    }

    pub fn fields(&self) -> &'static [AuthField] {
        match self.mode {
            AuthMode::Login => &[AuthField::Username, AuthField::Password],
            AuthMode::Register => &[AuthField::Username, AuthField::Email, AuthField::Password],
        }
    }

    pub fn focused_field(&self) -> AuthField {
        let fields = self.fields();
        fields[self.focused.min(fields.len() - 1)]
    }

    fn value_mut(&mut self, field: AuthField) -> &mut String {
        match field {
            AuthField::Username => &mut self.username,
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
        }
    }

    fn value(&self, field: AuthField) -> &str {
        match field {
            AuthField::Username => &self.username,
            AuthField::Email => &self.email,
            AuthField::Password => &self.password,
        }
    }

    pub fn handle_char_input(&mut self, c: char) {
        if c.is_control() {
            return;
        }
        let field = self.focused_field();
        self.value_mut(field).push(c);
        self.validation_error = None;
    }

    pub fn handle_backspace(&mut self) {
        let field = self.focused_field();
        self.value_mut(field).pop();
        self.validation_error = None;
    }

    pub fn next_field(&mut self) {
        self.focused = (self.focused + 1) % self.fields().len();
    }

    pub fn prev_field(&mut self) {
        let len = self.fields().len();
        self.focused = (self.focused + len - 1) % len;
    }

    /// True if the focused field is the last one (Enter submits).
    pub fn on_last_field(&self) -> bool {
        self.focused + 1 >= self.fields().len()
    }

    /// Check the inputs the same way the account store does.
    pub fn validate(&mut self) -> bool {
        let result = match self.mode {
            AuthMode::Login => {
                if self.username.trim().is_empty() || self.password.is_empty() {
                    Err("Please enter username and password".to_string())
                } else {
                    Ok(())
                }
            }
            AuthMode::Register => validate_username(self.username.trim())
                .and_then(|_| validate_email(&self.email))
                .and_then(|_| validate_password(&self.password))
                .map_err(|e| e.to_string()),
        };
        self.validation_error = result.err();
        self.validation_error.is_none()
    }

    pub fn draw(&self, f: &mut Frame, area: Rect) {
        let field_count = self.fields().len() as u16;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(2)
            .constraints([
                Constraint::Length(3),               // Title
                Constraint::Length(1),               // Spacer
                Constraint::Length(field_count * 4), // Fields
                Constraint::Length(4),               // Rules
                Constraint::Length(2),               // Validation
                Constraint::Min(0),                  // Filler
                Constraint::Length(3),               // Controls
            ])
            .split(area);

        let title = match self.mode {
            AuthMode::Login => "Login",
            AuthMode::Register => "Create Account",
        };
        f.render_widget(screen_title(title), chunks[0]);

        let field_areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(4); field_count as usize])
            .split(chunks[2]);

        for (i, field) in self.fields().iter().enumerate() {
            let focused = i == self.focused;
            let value = self.value(*field);
            let shown = if *field == AuthField::Password {
                "*".repeat(value.chars().count())
            } else {
                value.to_string()
            };
            let text = if focused {
                format!("{}_", shown)
            } else {
                shown
            };
            let border = if focused { Color::Yellow } else { Color::DarkGray };
            let area = field_areas[i];

            f.render_widget(
                Paragraph::new(field.label()),
                Rect { height: 1, ..area },
            );
            let input = Paragraph::new(text)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(border)),
                )
                .style(Style::default().fg(Color::White));
            f.render_widget(
                input,
                Rect {
                    y: area.y + 1,
                    height: 3.min(area.height.saturating_sub(1)),
                    ..area
                },
            );
        }

        if self.mode == AuthMode::Register {
            let rules = vec![
                Line::from("• Username: 3-20 letters, numbers, hyphens, underscores"),
                Line::from("• Password: at least 6 characters"),
            ];
            f.render_widget(
                Paragraph::new(rules).style(Style::default().fg(Color::Gray)),
                chunks[3],
            );
        }

        let feedback = if self.busy {
            Line::from(Span::styled(
                format!("{} Contacting server...", super::throbber::spinner_char()),
                Style::default().fg(Color::Yellow),
            ))
        } else if let Some(error) = &self.validation_error {
            Line::from(Span::styled(
                format!("✗ {}", error),
                Style::default().fg(Color::Red),
            ))
        } else {
            Line::from("")
        };
        f.render_widget(Paragraph::new(feedback), chunks[4]);

        let submit = match self.mode {
            AuthMode::Login => "Login",
            AuthMode::Register => "Register",
        };
        f.render_widget(
            Paragraph::new(key_hints(&[
                ("[Tab]", "Next field"),
                ("[Enter]", submit),
                ("[Esc]", "Back"),
            ]))
            .alignment(Alignment::Center),
            chunks[6],
        );
    }
}
