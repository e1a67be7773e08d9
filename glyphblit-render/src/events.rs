//! Window events delivered by the windowing subsystem.
//!
//! The subsystem calls back on its own thread. Each notification is one
//! [`WindowEvent`] variant; [`dispatch`] routes it to the matching
//! [`WindowEventHandler`] method. Only position events feed the rendering
//! pipeline (they resolve the readiness gate). The rest are logged.

use glyphblit_core::{Point, Rect, Size, WindowHandle};
use log::{debug, warn};

/// A notification from the windowing subsystem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WindowEvent {
    /// Part of the window must be redrawn. `more` is set when further
    /// redraw requests for the same window are queued.
    Redraw { rect: Rect, more: bool },
    /// Window size, position and display bounds.
    Position { size: Size, pos: Point, bounds: Rect },
    /// Pointer moved or a button changed; `buttons` is a bit mask.
    Pointer { pos: Point, buttons: u8 },
    /// Keyboard input bytes.
    Keyboard { keys: Vec<u8> },
}

impl WindowEvent {
    /// Short name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Redraw { .. } => "redraw",
            Self::Position { .. } => "position",
            Self::Pointer { .. } => "pointer",
            Self::Keyboard { .. } => "keyboard",
        }
    }
}

/// Receiver for window events.
///
/// Methods take `&self`: handlers are shared with the windowing thread and
/// keep any state behind their own synchronisation.
pub trait WindowEventHandler {
    fn on_redraw(&self, window: WindowHandle, rect: &Rect, more: bool) {
        debug!("{window}: redraw {rect} more={more}");
    }

    fn on_position(&self, window: WindowHandle, size: Size, pos: Point, bounds: &Rect);

    fn on_pointer(&self, window: WindowHandle, pos: Point, buttons: u8) {
        debug!("{window}: pointer ({},{}) buttons={buttons:#04x}", pos.x, pos.y);
    }

    fn on_keyboard(&self, window: WindowHandle, keys: &[u8]) {
        warn!("{window}: unexpected keyboard input ({} bytes)", keys.len());
    }
}

/// Route `event` to the matching handler method.
pub fn dispatch<H>(handler: &H, window: WindowHandle, event: &WindowEvent)
where
    H: WindowEventHandler + ?Sized,
{
    match event {
        WindowEvent::Redraw { rect, more } => handler.on_redraw(window, rect, *more),
        WindowEvent::Position { size, pos, bounds } => {
            handler.on_position(window, *size, *pos, bounds)
        }
        WindowEvent::Pointer { pos, buttons } => handler.on_pointer(window, *pos, *buttons),
        WindowEvent::Keyboard { keys } => handler.on_keyboard(window, keys),
    }
}

// ===================================================================
// Tests
// ===================================================================
