//! Turns → styled terminal lines.

use std::sync::Arc;

use chrono::Local;
use ragchat_core::{Role, Turn};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::widgets::{bullet, loading_dots, turn_bar};
use crate::wrap::wrap_words;

pub type StyledLines = Vec<Line<'static>>;

/// Rendering knobs that come from config and the pane size.
#[derive(Debug, Clone, Copy)]
pub struct TranscriptStyle<'a> {
    /// Inner width of the chat pane in columns.
    pub width: usize,
    pub show_timestamps: bool,
    pub ascii: bool,
    pub welcome: &'a [String],
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "Assistant",
    }
}

fn role_color(role: Role) -> Color {
    match role {
        Role::User => Color::LightCyan,
        Role::Assistant => Color::LightMagenta,
    }
}

/// Build the full transcript.  An empty log shows the welcome lines; a busy
/// session ends with a loading indicator.
pub fn render_transcript(turns: &[Arc<Turn>], busy: bool, style: TranscriptStyle<'_>) -> StyledLines {
    let mut out = StyledLines::new();

    if turns.is_empty() && !busy {
        out.push(Line::default());
        for (i, text) in style.welcome.iter().enumerate() {
            let s = if i == 0 {
                Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            out.push(Line::from(Span::styled(text.clone(), s)).centered());
        }
        return out;
    }

    for (i, turn) in turns.iter().enumerate() {
        if i > 0 {
            out.push(Line::default());
        }
        render_turn(turn, style, &mut out);
    }

    if busy {
        if !out.is_empty() {
            out.push(Line::default());
        }
        let bar = bar_span(Role::Assistant, style.ascii);
        out.push(label_line(Role::Assistant, style.ascii));
        out.push(Line::from(vec![
            bar,
            Span::styled(loading_dots(style.ascii), Style::default().fg(Color::LightMagenta)),
        ]));
    }
    out
}

fn bar_span(role: Role, ascii: bool) -> Span<'static> {
    Span::styled(turn_bar(ascii), Style::default().fg(role_color(role)))
}

fn label_line(role: Role, ascii: bool) -> Line<'static> {
    Line::from(vec![
        bar_span(role, ascii),
        Span::styled(
            role_label(role),
            Style::default().fg(role_color(role)).add_modifier(Modifier::BOLD),
        ),
    ])
}

fn render_turn(turn: &Turn, style: TranscriptStyle<'_>, out: &mut StyledLines) {
    let role = turn.role();
    let body_width = style.width.saturating_sub(2).max(10);

    out.push(label_line(role, style.ascii));
    for line in wrap_words(turn.text(), body_width) {
        out.push(Line::from(vec![bar_span(role, style.ascii), Span::raw(line)]));
    }

    if !turn.sources().is_empty() {
        out.push(Line::from(vec![
            bar_span(role, style.ascii),
            Span::styled("Sources:", Style::default().fg(Color::Gray)),
        ]));
        let marker = bullet(style.ascii);
        for src in turn.sources() {
            for (j, piece) in wrap_words(src, body_width.saturating_sub(4).max(10)).into_iter().enumerate() {
                let lead = if j == 0 { format!("  {marker}") } else { "    ".to_string() };
                out.push(Line::from(vec![
                    bar_span(role, style.ascii),
                    Span::styled(lead, Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        piece,
                        Style::default().fg(Color::LightBlue).add_modifier(Modifier::UNDERLINED),
                    ),
                ]));
            }
        }
    }

    if style.show_timestamps {
        let stamp = turn.created_at().with_timezone(&Local).format("%H:%M").to_string();
        out.push(Line::from(vec![
            bar_span(role, style.ascii),
            Span::styled(stamp, Style::default().fg(Color::DarkGray)),
        ]));
    }
}
