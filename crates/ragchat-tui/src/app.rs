// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Top-level TUI application state and event loop.

use std::sync::Arc;

use crossterm::event::{Event, EventStream, KeyEventKind, MouseEventKind};
use futures::StreamExt;
use ragchat_client::QueryDispatcher;
use ragchat_config::TuiConfig;
use ragchat_core::{
    spawn_dispatch, DispatchTicket, KeyOutcome, ScrollRequest, Session, Settlement, ViewportSync,
};
use ratatui::layout::Rect;
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;
use tracing::debug;

use crate::{
    keys::{map_key, Action},
    layout::AppLayout,
    transcript::{render_transcript, StyledLines, TranscriptStyle},
    widgets::{draw_chat, draw_input, draw_status},
    wrap::{adjust_scroll, wrap_content},
};

/// Options that come from the command line rather than the config file.
#[derive(Debug, Default, Clone)]
pub struct AppOptions {
    /// Submitted as the first question once the UI is up.
    pub initial_prompt: Option<String>,
}

pub struct App {
    tui: TuiConfig,
    session: Session,
    dispatcher: Arc<dyn QueryDispatcher>,
    settle_tx: mpsc::Sender<Settlement>,
    settle_rx: mpsc::Receiver<Settlement>,
    viewport: ViewportSync,
    initial_prompt: Option<String>,

    pub(crate) chat_lines: StyledLines,
    pub(crate) scroll_offset: u16,
    /// Follow the newest message.  Cleared by scrolling up, restored by
    /// reaching the bottom or submitting.
    pub(crate) auto_scroll: bool,
    pub(crate) chat_height: u16,
    chat_width: u16,

    input_scroll_offset: usize,
    input_inner: (u16, u16),
    input_pane: Rect,
}

impl App {
    pub fn new(tui: TuiConfig, dispatcher: Arc<dyn QueryDispatcher>, opts: AppOptions) -> Self {
        let (settle_tx, settle_rx) = mpsc::channel(16);
        Self {
            tui,
            session: Session::new(),
            dispatcher,
            settle_tx,
            settle_rx,
            viewport: ViewportSync::new(),
            initial_prompt: opts.initial_prompt,
            chat_lines: Vec::new(),
            scroll_offset: 0,
            auto_scroll: true,
            chat_height: 1,
            chat_width: 80,
            input_scroll_offset: 0,
            input_inner: (0, 0),
            input_pane: Rect::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run the TUI event loop.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> anyhow::Result<()> {
        if let Some(prompt) = self.initial_prompt.take() {
            self.session.on_draft_change(prompt);
            if let Some(ticket) = self.session.submit() {
                self.start_dispatch(ticket);
            }
        }

        let mut crossterm_events = EventStream::new();

        loop {
            if let Ok(size) = terminal.size() {
                self.apply_layout(AppLayout::compute(Rect::new(0, 0, size.width, size.height)));
            }
            self.refresh();

            let ascii = self.ascii();
            let snap = self.session.snapshot();
            let endpoint = self.dispatcher.target();
            terminal.draw(|frame| {
                let layout = AppLayout::new(frame);
                draw_status(
                    frame, layout.status_bar, &self.tui.title, &endpoint,
                    snap.log.len(), snap.busy, ascii,
                );
                draw_chat(frame, layout.chat_pane, &self.chat_lines, self.scroll_offset, ascii);
                draw_input(
                    frame, layout.input_pane,
                    self.session.draft().text(), self.session.draft().cursor(),
                    self.input_scroll_offset, snap.busy, snap.can_send(), ascii,
                );
            })?;

            tokio::select! {
                Some(settlement) = self.settle_rx.recv() => {
                    self.on_settlement(settlement);
                }
                maybe_event = crossterm_events.next() => match maybe_event {
                    Some(Ok(ev)) => {
                        if self.handle_term_event(ev) { break; }
                    }
                    Some(Err(e)) => {
                        tracing::warn!("terminal event error: {e}");
                    }
                    None => break,
                },
            }
        }

        Ok(())
    }

    fn apply_layout(&mut self, layout: AppLayout) {
        self.chat_height = layout.chat_inner_height().max(1);
        self.chat_width = layout.chat_inner_width().max(20);
        self.input_inner = layout.input_inner();
        self.input_pane = layout.input_pane;
    }

    pub(crate) fn ascii(&self) -> bool {
        if std::env::var("RAGCHAT_ASCII_BORDERS").as_deref() == Ok("1") {
            return true;
        }
        self.tui.ascii_borders
    }

    /// Rebuild the transcript lines, apply any viewport request and keep the
    /// draft cursor visible.
    pub(crate) fn refresh(&mut self) {
        let snap = self.session.snapshot();
        let width = if self.tui.wrap_width == 0 {
            self.chat_width
        } else {
            self.tui.wrap_width.min(self.chat_width)
        };
        let style = TranscriptStyle {
            width: width as usize,
            show_timestamps: self.tui.show_timestamps,
            ascii: self.ascii(),
            welcome: &self.tui.welcome,
        };
        self.chat_lines = render_transcript(&snap.log, snap.busy, style);

        if let Some(ScrollRequest::ToLatest) = self.viewport.observe_snapshot(&snap) {
            self.scroll_to_bottom();
        }
        self.clamp_scroll();
        self.adjust_input_scroll();
    }

    // ── Events ────────────────────────────────────────────────────────────────

    /// Returns true when the app should exit.
    pub(crate) fn handle_term_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(k) if k.kind == KeyEventKind::Press => match map_key(k) {
                Some(action) => self.dispatch(action),
                None => false,
            },
            Event::Mouse(mouse) => {
                let over_input = mouse.row >= self.input_pane.y
                    && mouse.row < self.input_pane.y + self.input_pane.height;
                match mouse.kind {
                    MouseEventKind::ScrollUp if over_input => {
                        self.input_scroll_offset = self.input_scroll_offset.saturating_sub(1);
                    }
                    MouseEventKind::ScrollDown if over_input => {
                        self.input_scroll_offset += 1;
                    }
                    MouseEventKind::ScrollUp => self.scroll_up(3),
                    MouseEventKind::ScrollDown => self.scroll_down(3),
                    _ => {}
                }
                false
            }
            Event::Paste(text) => {
                self.session.draft_mut().insert_str(&text);
                false
            }
            _ => false,
        }
    }

    pub(crate) fn dispatch(&mut self, action: Action) -> bool {
        match action {
            Action::Session(key, mods) => match self.session.on_key_down(key, mods) {
                KeyOutcome::Submitted(ticket) => self.start_dispatch(ticket),
                KeyOutcome::SubmitRejected => debug!("enter ignored"),
                KeyOutcome::DraftEdited | KeyOutcome::Ignored => {}
            },
            Action::ScrollUp => self.scroll_up(1),
            Action::ScrollDown => self.scroll_down(1),
            Action::ScrollPageUp => self.scroll_up(self.chat_height.saturating_sub(1).max(1)),
            Action::ScrollPageDown => self.scroll_down(self.chat_height.saturating_sub(1).max(1)),
            Action::ScrollTop => {
                self.scroll_offset = 0;
                self.auto_scroll = false;
            }
            Action::ScrollBottom => {
                self.auto_scroll = true;
                self.scroll_to_bottom();
            }
            Action::ClearDraft => self.session.draft_mut().clear(),
            Action::Quit => return true,
        }
        false
    }

    fn start_dispatch(&mut self, ticket: DispatchTicket) {
        self.auto_scroll = true;
        spawn_dispatch(self.dispatcher.clone(), ticket, self.settle_tx.clone());
    }

    pub(crate) fn on_settlement(&mut self, settlement: Settlement) {
        if !self.session.settle(settlement) {
            debug!("stale settlement dropped");
        }
    }

    // ── Scroll helpers ────────────────────────────────────────────────────────

    fn max_scroll(&self) -> u16 {
        u16::try_from(self.chat_lines.len())
            .unwrap_or(u16::MAX)
            .saturating_sub(self.chat_height)
    }

    pub(crate) fn scroll_up(&mut self, n: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(n);
        self.auto_scroll = false;
    }

    pub(crate) fn scroll_down(&mut self, n: u16) {
        let max = self.max_scroll();
        self.scroll_offset = self.scroll_offset.saturating_add(n).min(max);
        if self.scroll_offset >= max {
            self.auto_scroll = true;
        }
    }

    pub(crate) fn scroll_to_bottom(&mut self) {
        if self.auto_scroll {
            self.scroll_offset = self.max_scroll();
        }
    }

    fn clamp_scroll(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
    }

    fn adjust_input_scroll(&mut self) {
        let (w, h) = (self.input_inner.0 as usize, self.input_inner.1 as usize);
        if w == 0 || h == 0 {
            return;
        }
        let draft = self.session.draft();
        let wrap = wrap_content(draft.text(), w, draft.cursor());
        let max = wrap.lines.len().saturating_sub(h);
        self.input_scroll_offset = self.input_scroll_offset.min(max);
        adjust_scroll(wrap.cursor_row, h, &mut self.input_scroll_offset);
    }
}

// ── Test helpers ──────────────────────────────────────────────────────────────

#[cfg(test)]
impl App {
    /// A small app with a fixed 80×24 layout.
    pub fn for_testing(dispatcher: Arc<dyn QueryDispatcher>) -> Self {
        let mut app = Self::new(TuiConfig::default(), dispatcher, AppOptions::default());
        app.tui.show_timestamps = false;
        app.apply_layout(AppLayout::compute(Rect::new(0, 0, 80, 24)));
        app
    }

    pub fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.dispatch(Action::Session(ragchat_core::Key::Char(c), ragchat_core::Modifiers::NONE));
        }
    }

    pub async fn next_settlement(&mut self) {
        if let Some(s) = self.settle_rx.recv().await {
            self.on_settlement(s);
        }
    }
}
