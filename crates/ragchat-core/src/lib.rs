// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Conversation session controller.
//!
//! [`Session`] owns the transcript ([`ConversationLog`]) and the unsent
//! [`DraftBuffer`], and allows at most one question in flight at a time.
//! Renderers read a [`SessionSnapshot`] and feed it through a
//! [`ViewportSync`] to learn when to scroll to the latest message.
mod draft;
mod input;
mod session;
mod task;
mod turn;
mod viewport;

pub use draft::DraftBuffer;
pub use input::{Key, KeyOutcome, Modifiers};
pub use session::{
    DispatchTicket, RoundOutcome, Session, SessionPhase, SessionSnapshot, Settlement,
    FALLBACK_MESSAGE,
};
pub use task::spawn_dispatch;
pub use turn::{ConversationLog, Role, Turn};
pub use viewport::{ScrollRequest, ViewportSync};
