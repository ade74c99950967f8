// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use ragchat_client::{Answer, DispatchError, QueryDispatcher};
use tracing::{debug, warn};

use crate::draft::DraftBuffer;
use crate::input::{Key, KeyOutcome, Modifiers};
use crate::turn::{ConversationLog, Role, Turn};

/// Shown in place of an answer whenever a dispatch fails.
pub const FALLBACK_MESSAGE: &str =
    "⚠️ Sorry, I encountered an error while processing your request. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    AwaitingResponse,
}

/// Handed out by a successful [`Session::submit`].  The driver passes
/// `query` to a dispatcher and reports back with a [`Settlement`] carrying
/// the same ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTicket {
    pub id: u64,
    pub query: String,
}

/// The result of one dispatch, addressed to the ticket that started it.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub ticket: u64,
    pub outcome: Result<Answer, DispatchError>,
}

impl Settlement {
    pub fn new(ticket: &DispatchTicket, outcome: Result<Answer, DispatchError>) -> Self {
        Self { ticket: ticket.id, outcome }
    }
}

/// How an inline [`Session::ask`] round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Nothing was submitted: busy or blank draft.
    Rejected,
    Answered,
    /// The fallback turn was committed.
    Failed,
}

impl RoundOutcome {
    /// Whether the round committed an assistant turn.
    pub fn settled(self) -> bool {
        self != RoundOutcome::Rejected
    }
}

/// Read-only view of the session for renderers.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub log: Vec<Arc<Turn>>,
    pub draft: String,
    pub busy: bool,
}

impl SessionSnapshot {
    pub fn can_send(&self) -> bool {
        !self.busy && !self.draft.trim().is_empty()
    }
}

/// One conversation: the transcript, the draft, and at most one question
/// in flight.
///
/// All mutation goes through the named transition methods.  The log is
/// only ever appended to, by [`submit`](Self::submit) (user turn) and
/// [`settle`](Self::settle) (assistant turn).
#[derive(Debug, Default)]
pub struct Session {
    log: ConversationLog,
    draft: DraftBuffer,
    pending: Option<u64>,
    next_ticket: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn draft(&self) -> &DraftBuffer {
        &self.draft
    }

    /// Direct access for cursor-level editing.  Edits are allowed while busy;
    /// only submission is gated.
    pub fn draft_mut(&mut self) -> &mut DraftBuffer {
        &mut self.draft
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.is_busy() {
            SessionPhase::AwaitingResponse
        } else {
            SessionPhase::Idle
        }
    }

    /// Whether Enter would submit right now.
    pub fn can_send(&self) -> bool {
        !self.is_busy() && !self.draft.is_blank()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            log: self.log.shared(),
            draft: self.draft.text().to_string(),
            busy: self.is_busy(),
        }
    }

    pub fn on_draft_change(&mut self, text: impl Into<String>) {
        self.draft.set(text);
    }

    /// Commit the draft as a user turn and enter `AwaitingResponse`.
    ///
    /// Returns `None`, leaving everything untouched, when busy or when the
    /// draft is blank.
    pub fn submit(&mut self) -> Option<DispatchTicket> {
        if self.is_busy() {
            debug!("submit rejected: request outstanding");
            return None;
        }
        if self.draft.is_blank() {
            debug!("submit rejected: blank draft");
            return None;
        }

        let query = self.draft.take();
        self.log.append(Turn::new(Role::User, query.clone(), Vec::new()));

        self.next_ticket += 1;
        let id = self.next_ticket;
        self.pending = Some(id);
        debug!(ticket = id, len = query.len(), turns = self.log.len(), "submitted");
        Some(DispatchTicket { id, query })
    }

    /// Alias of [`submit`](Self::submit) for renderers wired to a send button.
    pub fn on_submit(&mut self) -> Option<DispatchTicket> {
        self.submit()
    }

    /// Enter without Shift submits; Shift+Enter inserts a line break.  Other
    /// editing keys act on the draft at its cursor.
    pub fn on_key_down(&mut self, key: Key, mods: Modifiers) -> KeyOutcome {
        match key {
            Key::Enter if mods.shift => {
                self.draft.insert_newline();
                KeyOutcome::DraftEdited
            }
            Key::Enter => match self.submit() {
                Some(ticket) => KeyOutcome::Submitted(ticket),
                None => KeyOutcome::SubmitRejected,
            },
            Key::Char(_) if mods.ctrl || mods.alt => KeyOutcome::Ignored,
            Key::Char(c) => {
                self.draft.insert_char(c);
                KeyOutcome::DraftEdited
            }
            Key::Backspace => edited(self.draft.backspace()),
            Key::Delete => edited(self.draft.delete()),
            Key::Left => {
                self.draft.move_left();
                KeyOutcome::DraftEdited
            }
            Key::Right => {
                self.draft.move_right();
                KeyOutcome::DraftEdited
            }
            Key::Home => {
                self.draft.move_home();
                KeyOutcome::DraftEdited
            }
            Key::End => {
                self.draft.move_end();
                KeyOutcome::DraftEdited
            }
            Key::Other => KeyOutcome::Ignored,
        }
    }

    /// Apply the outcome of the outstanding dispatch.
    ///
    /// Appends exactly one assistant turn and returns to `Idle`.  A blank
    /// answer counts as a failure.  A settlement for any other ticket, or
    /// one arriving while idle, is dropped and `false` is returned.
    pub fn settle(&mut self, settlement: Settlement) -> bool {
        self.apply(settlement).is_some()
    }

    fn apply(&mut self, settlement: Settlement) -> Option<RoundOutcome> {
        match self.pending {
            Some(id) if id == settlement.ticket => {}
            pending => {
                warn!(
                    ticket = settlement.ticket,
                    ?pending,
                    "ignoring settlement for a request that is not outstanding"
                );
                return None;
            }
        }

        let ticket = settlement.ticket;
        let (turn, outcome) = match settlement.outcome {
            Ok(answer) if answer.text.trim().is_empty() => {
                warn!(ticket, "dispatcher returned a blank answer");
                (Turn::new(Role::Assistant, FALLBACK_MESSAGE, Vec::new()), RoundOutcome::Failed)
            }
            Ok(answer) => {
                debug!(ticket, sources = answer.sources.len(), "answered");
                (Turn::new(Role::Assistant, answer.text, answer.sources), RoundOutcome::Answered)
            }
            Err(e) => {
                warn!(ticket, "{e}");
                (Turn::new(Role::Assistant, FALLBACK_MESSAGE, Vec::new()), RoundOutcome::Failed)
            }
        };
        self.pending = None;
        self.log.append(turn);
        Some(outcome)
    }

    /// Submit the draft and wait for the dispatcher inline.
    ///
    /// For drivers without an event loop (headless mode, `ask`).
    pub async fn ask(&mut self, dispatcher: &dyn QueryDispatcher) -> RoundOutcome {
        let Some(ticket) = self.submit() else {
            return RoundOutcome::Rejected;
        };
        let outcome = dispatcher.dispatch(&ticket.query).await;
        self.apply(Settlement::new(&ticket, outcome))
            .unwrap_or(RoundOutcome::Rejected)
    }
}

fn edited(changed: bool) -> KeyOutcome {
    if changed {
        KeyOutcome::DraftEdited
    } else {
        KeyOutcome::Ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragchat_client::ScriptedDispatcher;

    fn roles_and_texts(s: &Session) -> Vec<(Role, String)> {
        s.log().iter().map(|t| (t.role(), t.text().to_string())).collect()
    }

    #[test]
    fn starts_idle_and_empty() {
        let s = Session::new();
        assert_eq!(s.phase(), SessionPhase::Idle);
        assert!(s.log().is_empty());
        assert!(s.draft().is_empty());
        assert!(!s.can_send());
    }

    #[test]
    fn scenario_a_successful_round() {
        let mut s = Session::new();
        s.on_draft_change("Hello");
        let ticket = s.submit().expect("ticket");
        assert_eq!(ticket.query, "Hello");
        assert_eq!(roles_and_texts(&s), vec![(Role::User, "Hello".into())]);
        assert!(s.is_busy());
        assert!(s.draft().is_empty());

        assert!(s.settle(Settlement::new(&ticket, Ok(Answer::text("Hi there")))));
        assert_eq!(
            roles_and_texts(&s),
            vec![(Role::User, "Hello".into()), (Role::Assistant, "Hi there".into())]
        );
        assert_eq!(s.phase(), SessionPhase::Idle);
    }

    #[test]
    fn scenario_b_failure_appends_fallback() {
        let mut s = Session::new();
        s.on_draft_change("Hello");
        let ticket = s.submit().unwrap();
        s.settle(Settlement::new(&ticket, Err(DispatchError::new("connection refused"))));
        assert_eq!(
            roles_and_texts(&s),
            vec![(Role::User, "Hello".into()), (Role::Assistant, FALLBACK_MESSAGE.into())]
        );
        assert!(!s.is_busy());
    }

    #[test]
    fn scenario_c_empty_draft_is_noop() {
        let mut s = Session::new();
        assert!(s.submit().is_none());
        s.on_draft_change("   \n ");
        assert!(s.submit().is_none());
        assert!(s.log().is_empty());
        assert!(!s.is_busy());
        assert_eq!(s.draft().text(), "   \n ");
    }

    #[test]
    fn scenario_d_submit_while_busy_is_rejected() {
        let mut s = Session::new();
        s.on_draft_change("Hello");
        let _ticket = s.submit().unwrap();
        s.on_draft_change("Again");
        assert!(s.submit().is_none());
        assert_eq!(s.log().len(), 1);
        assert_eq!(s.draft().text(), "Again");
        assert!(s.is_busy());
    }

    #[test]
    fn user_turn_keeps_untrimmed_text() {
        let mut s = Session::new();
        s.on_draft_change("  spaced  ");
        let t = s.submit().unwrap();
        assert_eq!(t.query, "  spaced  ");
        assert_eq!(s.log().last().unwrap().text(), "  spaced  ");
    }

    #[test]
    fn sources_are_carried_onto_the_turn() {
        let mut s = Session::new();
        s.on_draft_change("q");
        let t = s.submit().unwrap();
        s.settle(Settlement::new(&t, Ok(Answer::text("a").with_sources(["http://x"]))));
        assert_eq!(s.log().last().unwrap().sources(), ["http://x".to_string()]);
    }

    #[test]
    fn stale_or_unsolicited_settlement_is_ignored() {
        let mut s = Session::new();
        assert!(!s.settle(Settlement { ticket: 1, outcome: Ok(Answer::text("x")) }));
        assert!(s.log().is_empty());

        s.on_draft_change("q");
        let t = s.submit().unwrap();
        assert!(!s.settle(Settlement { ticket: t.id + 7, outcome: Ok(Answer::text("x")) }));
        assert_eq!(s.log().len(), 1);
        assert!(s.is_busy());

        assert!(s.settle(Settlement::new(&t, Ok(Answer::text("y")))));
        assert!(!s.settle(Settlement::new(&t, Ok(Answer::text("dup")))));
        assert_eq!(s.log().len(), 2);
    }

    #[test]
    fn tickets_are_unique_per_round() {
        let mut s = Session::new();
        s.on_draft_change("a");
        let t1 = s.submit().unwrap();
        s.settle(Settlement::new(&t1, Ok(Answer::text("1"))));
        s.on_draft_change("b");
        let t2 = s.submit().unwrap();
        assert_ne!(t1.id, t2.id);
    }

    #[test]
    fn enter_submits_and_shift_enter_inserts_newline() {
        let mut s = Session::new();
        s.on_draft_change("line one");
        assert_eq!(s.on_key_down(Key::Enter, Modifiers::SHIFT), KeyOutcome::DraftEdited);
        assert_eq!(s.draft().text(), "line one\n");
        assert!(s.log().is_empty());
        assert!(!s.is_busy());

        s.on_key_down(Key::Char('x'), Modifiers::NONE);
        match s.on_key_down(Key::Enter, Modifiers::NONE) {
            KeyOutcome::Submitted(t) => assert_eq!(t.query, "line one\nx"),
            other => panic!("expected submission, got {other:?}"),
        }
        assert!(s.is_busy());
    }

    #[test]
    fn enter_while_busy_is_rejected() {
        let mut s = Session::new();
        s.on_draft_change("a");
        s.submit().unwrap();
        s.on_draft_change("b");
        assert_eq!(s.on_key_down(Key::Enter, Modifiers::NONE), KeyOutcome::SubmitRejected);
        assert_eq!(s.draft().text(), "b");
    }

    #[test]
    fn shift_enter_while_busy_still_edits() {
        let mut s = Session::new();
        s.on_draft_change("a");
        s.submit().unwrap();
        s.on_key_down(Key::Enter, Modifiers::SHIFT);
        assert_eq!(s.draft().text(), "\n");
        assert_eq!(s.log().len(), 1);
    }

    #[test]
    fn ctrl_chars_do_not_edit() {
        let mut s = Session::new();
        assert_eq!(s.on_key_down(Key::Char('c'), Modifiers::CTRL), KeyOutcome::Ignored);
        assert!(s.draft().is_empty());
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut s = Session::new();
        s.on_draft_change("hi");
        let snap = s.snapshot();
        assert!(snap.can_send());
        s.submit().unwrap();
        let snap = s.snapshot();
        assert!(snap.busy);
        assert_eq!(snap.log.len(), 1);
        assert!(!snap.can_send());
    }

    #[test]
    fn blank_answer_becomes_fallback_and_returns_to_idle() {
        let mut s = Session::new();
        for blank in ["", "  \n "] {
            s.on_draft_change("Hello");
            let t = s.submit().unwrap();
            assert!(s.settle(Settlement::new(&t, Ok(Answer::text(blank)))));
            assert_eq!(s.log().last().unwrap().role(), Role::Assistant);
            assert_eq!(s.log().last().unwrap().text(), FALLBACK_MESSAGE);
            assert!(!s.is_busy());
        }
        assert_eq!(s.log().len(), 4);
    }

    #[tokio::test]
    async fn ask_reports_blank_answer_as_failed() {
        let d = ScriptedDispatcher::new(vec![Ok(Answer::text(" "))]);
        let mut s = Session::new();
        s.on_draft_change("q");
        assert_eq!(s.ask(&d).await, RoundOutcome::Failed);
        assert_eq!(s.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn ask_distinguishes_a_real_answer_that_matches_the_fallback_text() {
        let d = ScriptedDispatcher::new(vec![Ok(Answer::text(FALLBACK_MESSAGE))]);
        let mut s = Session::new();
        s.on_draft_change("q");
        assert_eq!(s.ask(&d).await, RoundOutcome::Answered);
    }

    #[tokio::test]
    async fn ask_runs_a_full_round() {
        let d = ScriptedDispatcher::new(vec![
            Ok(Answer::text("first")),
            Err(DispatchError::new("down")),
        ]);
        let mut s = Session::new();
        s.on_draft_change("one");
        assert_eq!(s.ask(&d).await, RoundOutcome::Answered);
        s.on_draft_change("two");
        assert_eq!(s.ask(&d).await, RoundOutcome::Failed);
        assert_eq!(s.ask(&d).await, RoundOutcome::Rejected, "blank draft is rejected");

        assert_eq!(s.log().len(), 4);
        assert_eq!(s.log().get(3).unwrap().text(), FALLBACK_MESSAGE);
        assert_eq!(d.call_count(), 2);
    }
}
