//! Input event types, decoupled from the terminal backend.
//!
//! Defines [`InputEvent`] (a timestamped [`EventKind`]), [`KeyEvent`] and
//! supporting types. Crossterm events are converted with [`from_crossterm`]
//! and `From` impls so the router never depends on crossterm directly.

use std::time::Duration;

use bitflags::bitflags;

use crate::geometry::{Point, Size};

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// Keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
    /// A key the toolkit has no name for.
    Other,
}

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

bitflags! {
    /// Modifier keys held during an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b001;
        const CTRL  = 0b010;
        const ALT   = 0b100;
    }
}

// ---------------------------------------------------------------------------
// KeyEvent
// ---------------------------------------------------------------------------

/// A key with the modifiers held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(code: Key, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// A key with no modifiers.
    pub fn plain(code: Key) -> Self {
        Self::new(code, Modifiers::empty())
    }

    /// Forward focus navigation.
    pub fn is_tab(&self) -> bool {
        self.code == Key::Tab && !self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Backward focus navigation: BackTab, or Tab with Shift.
    pub fn is_back_tab(&self) -> bool {
        self.code == Key::BackTab
            || (self.code == Key::Tab && self.modifiers.contains(Modifiers::SHIFT))
    }
}

// ---------------------------------------------------------------------------
// PointerButton
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

// ---------------------------------------------------------------------------
// InputEvent
// ---------------------------------------------------------------------------

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    PointerMove { position: Point },
    PointerDown { position: Point, button: PointerButton },
    PointerUp { position: Point, button: PointerButton },
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    /// Committed text (typed characters or a paste).
    TextInput(String),
    /// The window surface changed size.
    Resize(Size),
    /// The window lost input focus; any pointer capture is force-released.
    FocusLost,
}

impl EventKind {
    /// Pointer position for pointer events.
    pub fn position(&self) -> Option<Point> {
        match self {
            EventKind::PointerMove { position }
            | EventKind::PointerDown { position, .. }
            | EventKind::PointerUp { position, .. } => Some(*position),
            _ => None,
        }
    }

    pub fn is_pointer(&self) -> bool {
        self.position().is_some()
    }
}

/// A timestamped input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    /// Time since the input source started.
    pub timestamp: Duration,
    pub kind: EventKind,
}

impl InputEvent {
    pub fn new(timestamp: Duration, kind: EventKind) -> Self {
        Self { timestamp, kind }
    }
}

// ---------------------------------------------------------------------------
// From<crossterm> conversions
// ---------------------------------------------------------------------------

impl From<crossterm::event::KeyModifiers> for Modifiers {
    fn from(m: crossterm::event::KeyModifiers) -> Self {
        let mut out = Modifiers::empty();
        out.set(Modifiers::SHIFT, m.contains(crossterm::event::KeyModifiers::SHIFT));
        out.set(Modifiers::CTRL, m.contains(crossterm::event::KeyModifiers::CONTROL));
        out.set(Modifiers::ALT, m.contains(crossterm::event::KeyModifiers::ALT));
        out
    }
}

impl From<crossterm::event::KeyCode> for Key {
    fn from(code: crossterm::event::KeyCode) -> Self {
        use crossterm::event::KeyCode;
        match code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Escape,
            KeyCode::Tab => Key::Tab,
            KeyCode::BackTab => Key::BackTab,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::F(n) => Key::F(n),
            _ => Key::Other,
        }
    }
}

impl From<crossterm::event::KeyEvent> for KeyEvent {
    fn from(ct: crossterm::event::KeyEvent) -> Self {
        KeyEvent::new(ct.code.into(), ct.modifiers.into())
    }
}

impl From<crossterm::event::MouseButton> for PointerButton {
    fn from(b: crossterm::event::MouseButton) -> Self {
        match b {
            crossterm::event::MouseButton::Left => PointerButton::Left,
            crossterm::event::MouseButton::Right => PointerButton::Right,
            crossterm::event::MouseButton::Middle => PointerButton::Middle,
        }
    }
}

/// Translate one crossterm event. A printable key press yields a key-down
/// followed by the text it types; events with no counterpart yield nothing.
pub fn from_crossterm(event: crossterm::event::Event) -> Vec<EventKind> {
    use crossterm::event::{Event, KeyEventKind, MouseEventKind};
    match event {
        Event::Key(ke) => {
            let key = KeyEvent::from(ke);
            if ke.kind == KeyEventKind::Release {
                return vec![EventKind::KeyUp(key)];
            }
            let mut out = vec![EventKind::KeyDown(key)];
            if let Key::Char(c) = key.code {
                if !key.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT) {
                    out.push(EventKind::TextInput(c.to_string()));
                }
            }
            out
        }
        Event::Mouse(me) => {
            let position = Point::new(i32::from(me.column), i32::from(me.row));
            match me.kind {
                MouseEventKind::Down(b) => vec![EventKind::PointerDown {
                    position,
                    button: b.into(),
                }],
                MouseEventKind::Up(b) => vec![EventKind::PointerUp {
                    position,
                    button: b.into(),
                }],
                MouseEventKind::Drag(_) | MouseEventKind::Moved => {
                    vec![EventKind::PointerMove { position }]
                }
                _ => Vec::new(),
            }
        }
        Event::Resize(w, h) => vec![EventKind::Resize(Size::new(i32::from(w), i32::from(h)))],
        Event::FocusLost => vec![EventKind::FocusLost],
        Event::Paste(s) => vec![EventKind::TextInput(s)],
        Event::FocusGained => Vec::new(),
    }
}

// ===========================================================================
// Tests
// ===========================================================================
