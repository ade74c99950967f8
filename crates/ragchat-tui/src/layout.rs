use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

/// The regions that make up the TUI layout.
#[derive(Debug, Clone, Copy)]
pub struct AppLayout {
    pub status_bar: Rect,
    pub chat_pane: Rect,
    pub input_pane: Rect,
}

impl AppLayout {
    /// Calculate layout regions from a `Rect` (terminal area).
    pub fn compute(area: Rect) -> Self {
        let status_height = 1u16;
        let input_height = 5u16;

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(status_height),
                Constraint::Min(3),
                Constraint::Length(input_height),
            ])
            .split(area);

        AppLayout {
            status_bar: vertical[0],
            chat_pane: vertical[1],
            input_pane: vertical[2],
        }
    }

    pub fn new(frame: &Frame) -> Self {
        Self::compute(frame.area())
    }

    /// Text rows inside the chat pane's border.
    pub fn chat_inner_height(&self) -> u16 {
        self.chat_pane.height.saturating_sub(2)
    }

    pub fn chat_inner_width(&self) -> u16 {
        self.chat_pane.width.saturating_sub(2)
    }

    pub fn input_inner(&self) -> (u16, u16) {
        (
            self.input_pane.width.saturating_sub(2),
            self.input_pane.height.saturating_sub(2),
        )
    }
}
