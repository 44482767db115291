use ratatui::style::{Color, Modifier, Style};

/// Theme configuration for the outline view
#[derive(Clone, Debug)]
pub struct Theme {
    /// Background color for the outline
    pub background: Color,

    /// Foreground (text) color for the status bar
    pub status_bar_fg: Color,

    /// Background color for the status bar
    pub status_bar_bg: Color,

    /// Color for the current day in the status bar
    pub date_color: Color,

    /// Color for the save state while writes succeed
    pub saved_color: Color,

    /// Foreground color for the "offline" save state
    pub offline_fg: Color,

    /// Background color for the "offline" save state
    pub offline_bg: Color,

    /// Foreground color for active selection
    pub selection_fg: Color,

    /// Background color for active selection
    pub selection_bg: Color,

    /// Bullet color of unfocused items
    pub bullet_color: Color,

    /// Bullet color of the focused item
    pub focused_bullet_color: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Reset,
            status_bar_fg: Color::White,
            status_bar_bg: Color::Blue,
            date_color: Color::LightYellow,
            saved_color: Color::LightGreen,
            offline_fg: Color::White,
            offline_bg: Color::Red,
            selection_fg: Color::White,
            selection_bg: Color::LightBlue,
            bullet_color: Color::DarkGray,
            focused_bullet_color: Color::LightBlue,
        }
    }
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn background_style(&self) -> Style {
        Style::default().bg(self.background)
    }

    pub fn status_bar_style(&self) -> Style {
        Style::default()
            .fg(self.status_bar_fg)
            .bg(self.status_bar_bg)
    }

    pub fn date_style(&self) -> Style {
        Style::default()
            .fg(self.date_color)
            .add_modifier(Modifier::BOLD)
    }

    pub fn saved_style(&self) -> Style {
        Style::default().fg(self.saved_color)
    }

    pub fn offline_style(&self) -> Style {
        Style::default()
            .fg(self.offline_fg)
            .bg(self.offline_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Get the style for selected text
    pub fn selection_style(&self) -> Style {
        Style::default().fg(self.selection_fg).bg(self.selection_bg)
    }

    pub fn bullet_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.focused_bullet_color)
        } else {
            Style::default().fg(self.bullet_color)
        }
    }
}
