#![forbid(unsafe_code)]

//! Input events the walkthrough reacts to.
//!
//! crossterm events are narrowed to keys, mouse activity and resizes. Keys
//! outside [`KeyCode`], key releases, pointer moves, horizontal wheel, paste
//! and focus changes never reach the model.

use bitflags::bitflags;
use crossterm::event as cte;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// New terminal size in cells.
    Resize { width: u16, height: u16 },
}

impl Event {
    /// Narrow a crossterm event. `None` when the walkthrough has no use for it.
    #[must_use]
    pub fn from_crossterm(event: cte::Event) -> Option<Self> {
        match event {
            cte::Event::Key(key) => KeyEvent::from_crossterm(key).map(Event::Key),
            cte::Event::Mouse(mouse) => MouseEvent::from_crossterm(mouse).map(Event::Mouse),
            cte::Event::Resize(width, height) => Some(Event::Resize { width, height }),
            cte::Event::Paste(_) | cte::Event::FocusGained | cte::Event::FocusLost => None,
        }
    }
}

/// Keys with a binding somewhere in the walkthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Home,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
}

impl KeyCode {
    fn from_crossterm(code: cte::KeyCode) -> Option<Self> {
        Some(match code {
            cte::KeyCode::Char(c) => Self::Char(c),
            cte::KeyCode::Enter => Self::Enter,
            cte::KeyCode::Home => Self::Home,
            cte::KeyCode::PageUp => Self::PageUp,
            cte::KeyCode::PageDown => Self::PageDown,
            cte::KeyCode::Up => Self::Up,
            cte::KeyCode::Down => Self::Down,
            cte::KeyCode::Left => Self::Left,
            cte::KeyCode::Right => Self::Right,
            _ => return None,
        })
    }
}

bitflags! {
    /// Held modifier keys.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const NONE  = 0b000;
        const SHIFT = 0b001;
        const ALT   = 0b010;
        const CTRL  = 0b100;
    }
}

impl Modifiers {
    fn from_crossterm(modifiers: cte::KeyModifiers) -> Self {
        let mut mapped = Self::NONE;
        mapped.set(Self::SHIFT, modifiers.contains(cte::KeyModifiers::SHIFT));
        mapped.set(Self::ALT, modifiers.contains(cte::KeyModifiers::ALT));
        mapped.set(Self::CTRL, modifiers.contains(cte::KeyModifiers::CONTROL));
        mapped
    }
}

/// A key press (or auto-repeat).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A press with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        self.code == KeyCode::Char(c)
    }

    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    fn from_crossterm(event: cte::KeyEvent) -> Option<Self> {
        if event.kind == cte::KeyEventKind::Release {
            return None;
        }
        Some(Self {
            code: KeyCode::from_crossterm(event.code)?,
            modifiers: Modifiers::from_crossterm(event.modifiers),
        })
    }
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl From<cte::MouseButton> for MouseButton {
    fn from(button: cte::MouseButton) -> Self {
        match button {
            cte::MouseButton::Left => Self::Left,
            cte::MouseButton::Right => Self::Right,
            cte::MouseButton::Middle => Self::Middle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Down(MouseButton),
    Up(MouseButton),
    /// Pointer moved with a button held.
    Drag(MouseButton),
    ScrollUp,
    ScrollDown,
}

/// A mouse event at a cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub x: u16,
    pub y: u16,
}

impl MouseEvent {
    #[must_use]
    pub const fn new(kind: MouseEventKind, x: u16, y: u16) -> Self {
        Self { kind, x, y }
    }

    fn from_crossterm(event: cte::MouseEvent) -> Option<Self> {
        let kind = match event.kind {
            cte::MouseEventKind::Down(b) => MouseEventKind::Down(b.into()),
            cte::MouseEventKind::Up(b) => MouseEventKind::Up(b.into()),
            cte::MouseEventKind::Drag(b) => MouseEventKind::Drag(b.into()),
            cte::MouseEventKind::ScrollUp => MouseEventKind::ScrollUp,
            cte::MouseEventKind::ScrollDown => MouseEventKind::ScrollDown,
            cte::MouseEventKind::Moved
            | cte::MouseEventKind::ScrollLeft
            | cte::MouseEventKind::ScrollRight => return None,
        };
        Some(Self::new(kind, event.column, event.row))
    }
}
