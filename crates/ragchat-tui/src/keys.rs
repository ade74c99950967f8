use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ragchat_core::{Key, Modifiers};

/// All logical actions the TUI can perform, independent of key binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Forwarded to the session: editing keys and Enter / Shift+Enter.
    Session(Key, Modifiers),

    // Scrolling (transcript)
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,
    ScrollTop,
    ScrollBottom,

    ClearDraft,
    Quit,
}

/// Map a raw key event to an [`Action`].
pub fn map_key(event: KeyEvent) -> Option<Action> {
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    let alt = event.modifiers.contains(KeyModifiers::ALT);
    let shift = event.modifiers.contains(KeyModifiers::SHIFT);
    let mods = Modifiers { shift, ctrl, alt };
    let plain = !ctrl && !alt;

    let session = |key: Key| Some(Action::Session(key, mods));

    match event.code {
        // ── Global bindings ───────────────────────────────────────────────────
        KeyCode::Char('q') | KeyCode::Char('c') if ctrl => Some(Action::Quit),
        KeyCode::Char('l') if ctrl => Some(Action::ClearDraft),

        // ── Transcript ────────────────────────────────────────────────────────
        KeyCode::PageUp => Some(Action::ScrollPageUp),
        KeyCode::PageDown => Some(Action::ScrollPageDown),
        KeyCode::Up => Some(Action::ScrollUp),
        KeyCode::Down => Some(Action::ScrollDown),
        KeyCode::Home if ctrl => Some(Action::ScrollTop),
        KeyCode::End if ctrl => Some(Action::ScrollBottom),

        // ── Draft ─────────────────────────────────────────────────────────────
        // Some terminals deliver Shift+Enter as Ctrl+J / Alt+Enter.
        KeyCode::Char('j') if ctrl => Some(Action::Session(Key::Enter, Modifiers::SHIFT)),
        KeyCode::Enter if alt => Some(Action::Session(Key::Enter, Modifiers::SHIFT)),
        KeyCode::Enter => session(Key::Enter),
        KeyCode::Backspace => session(Key::Backspace),
        KeyCode::Delete => session(Key::Delete),
        KeyCode::Left => session(Key::Left),
        KeyCode::Right => session(Key::Right),
        KeyCode::Home => session(Key::Home),
        KeyCode::End => session(Key::End),
        // Printable characters, only when no ctrl/alt modifier
        KeyCode::Char(c) if plain => session(Key::Char(c)),

        _ => None,
    }
}

// ─── Unit tests ───────────────────────────────────────────────────────────────
