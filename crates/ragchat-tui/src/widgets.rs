// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::transcript::StyledLines;
use crate::wrap::wrap_content;

// ── Character sets ────────────────────────────────────────────────────────────

fn sep(ascii: bool) -> &'static str {
    if ascii { "|" } else { "│" }
}
fn busy_char(ascii: bool) -> &'static str {
    if ascii { "* " } else { "⠿ " }
}
fn border_type(ascii: bool) -> BorderType {
    if ascii { BorderType::Plain } else { BorderType::Rounded }
}
pub(crate) fn turn_bar(ascii: bool) -> &'static str {
    if ascii { "| " } else { "▌ " }
}
pub(crate) fn bullet(ascii: bool) -> &'static str {
    if ascii { "- " } else { "• " }
}
pub(crate) fn loading_dots(ascii: bool) -> &'static str {
    if ascii { ". . ." } else { "● ● ●" }
}

// ── Draw functions ────────────────────────────────────────────────────────────

/// Draw the status bar at the top.
pub fn draw_status(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    endpoint: &str,
    turns: usize,
    busy: bool,
    ascii: bool,
) {
    let busy_indicator = if busy { busy_char(ascii) } else { "  " };
    let separator = sep(ascii);

    let line = Line::from(vec![
        Span::styled(
            format!(" {busy_indicator}"),
            Style::default().fg(if busy { Color::Yellow } else { Color::DarkGray }),
        ),
        Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::LightCyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(separator, Style::default().fg(Color::DarkGray)),
        Span::styled(format!(" {endpoint} "), Style::default().fg(Color::Gray)),
        Span::styled(separator, Style::default().fg(Color::DarkGray)),
        Span::styled(format!(" msgs:{turns} "), Style::default().fg(Color::Green)),
        Span::styled(
            "  PgUp/PgDn:scroll  ^l:clear  ^c:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let para = Paragraph::new(line).style(Style::default().bg(Color::Black));
    frame.render_widget(para, area);
}

/// Draw the transcript pane.  `lines` are already wrapped to the pane width.
pub fn draw_chat(frame: &mut Frame, area: Rect, lines: &StyledLines, scroll_offset: u16, ascii: bool) {
    let block = pane_block("Chat", false, ascii);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visible: Vec<Line<'static>> = lines
        .iter()
        .skip(scroll_offset as usize)
        .take(inner.height as usize)
        .cloned()
        .collect();
    frame.render_widget(Paragraph::new(visible), inner);
}

/// Draw the draft box at the bottom.
///
/// The draft is wrapped to the pane width; `scroll_offset` is the first
/// visible wrapped row.  An empty draft shows a placeholder.
#[allow(clippy::too_many_arguments)]
pub fn draw_input(
    frame: &mut Frame,
    area: Rect,
    content: &str,
    cursor_pos: usize,
    scroll_offset: usize,
    busy: bool,
    can_send: bool,
    ascii: bool,
) {
    let title = if busy {
        "Sending…"
    } else {
        "Enter:send  Shift+Enter:newline"
    };

    let mut block = pane_block(title, true, ascii);
    if !busy && !can_send {
        block = block.border_style(Style::default().fg(Color::DarkGray));
    }
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    if content.is_empty() {
        let placeholder = Span::styled(
            "Ask me anything...",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        );
        frame.render_widget(Paragraph::new(Line::from(placeholder)), inner);
        frame.set_cursor_position((inner.x, inner.y));
        return;
    }

    let wrap = wrap_content(content, inner.width as usize, cursor_pos);
    let visible: Vec<Line<'static>> = wrap
        .lines
        .into_iter()
        .skip(scroll_offset)
        .take(inner.height as usize)
        .map(Line::from)
        .collect();
    frame.render_widget(Paragraph::new(visible), inner);

    if let Some(row) = wrap.cursor_row.checked_sub(scroll_offset) {
        if row < inner.height as usize {
            let col = (wrap.cursor_col as u16).min(inner.width.saturating_sub(1));
            frame.set_cursor_position((inner.x + col, inner.y + row as u16));
        }
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

pub(crate) fn pane_block(title: &str, focused: bool, ascii: bool) -> Block<'static> {
    let border_style = if focused {
        Style::default().fg(Color::LightBlue)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .title(Span::styled(
            format!(" {title} "),
            if focused {
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .fg(Color::LightBlue)
            } else {
                Style::default().fg(Color::Gray)
            },
        ))
        .borders(Borders::ALL)
        .border_type(border_type(ascii))
        .border_style(border_style)
}
