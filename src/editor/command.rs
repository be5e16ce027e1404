//! Queued editor input.
//!
//! Commands are plain data so they can be produced on another thread and
//! applied on the thread that owns the editor.

use super::input::{KeyEvent, KeyModifiers, MouseButton};

/// One unit of input for [`Editor::dispatch`](super::Editor::dispatch).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Key(KeyEvent),
    /// Insert text at the caret, replacing the selection.
    Text(String),
    MouseDown {
        button: MouseButton,
        x: i32,
        y: i32,
        modifiers: KeyModifiers,
    },
    MouseUp {
        button: MouseButton,
    },
    MouseMove {
        x: i32,
        y: i32,
    },
    DoubleClick {
        x: i32,
        y: i32,
    },
    /// Wheel movement in pixels; positive scrolls toward the start.
    Wheel {
        dy: i32,
    },
    Resize {
        width: i32,
        height: i32,
    },
}

impl From<KeyEvent> for Command {
    fn from(event: KeyEvent) -> Self {
        Self::Key(event)
    }
}
