//! Toolkit-neutral key events.  Renderers translate their own key types into
//! these before calling [`Session::on_key_down`](crate::Session::on_key_down).

use crate::DispatchTicket;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Char(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    /// Anything the session does not handle.
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self { shift: false, ctrl: false, alt: false };
    pub const SHIFT: Self = Self { shift: true, ctrl: false, alt: false };
    pub const CTRL: Self = Self { shift: false, ctrl: true, alt: false };
}

/// What a key press did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Enter committed the draft; the ticket must be dispatched.
    Submitted(DispatchTicket),
    /// Enter was pressed while busy or with a blank draft.
    SubmitRejected,
    DraftEdited,
    Ignored,
}
