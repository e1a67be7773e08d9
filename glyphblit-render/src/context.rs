//! Render context: per-window state shared by the event and render threads.
//!
//! A [`RenderContext`] owns the [`WindowReadinessGate`] for one window. The
//! windowing thread feeds it position events through
//! [`WindowEventHandler`]; the render thread blocks in
//! [`RenderContext::wait_until_ready`] until the first one arrives and then
//! reads the resolved [`DisplayGeometry`].
//!
//! ```text
//!  windowing thread                 render thread
//!  ────────────────                 ─────────────
//!  dispatch(Position) ──▶ gate.resolve()
//!                              │
//!                              └──▶ wait_until_ready() returns geometry
//! ```

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use glyphblit_core::{Point, Rect, Size, WindowHandle};
use log::{debug, info};

use crate::events::WindowEventHandler;

/// Window handle and pixel resolution learned from the first position event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayGeometry {
    pub window: WindowHandle,
    pub xres: i32,
    pub yres: i32,
}

impl DisplayGeometry {
    /// Resolution of a display whose bottom-right pixel is `bounds.pt2`.
    pub fn from_bounds(window: WindowHandle, bounds: &Rect) -> Self {
        Self {
            window,
            xres: bounds.pt2.x.saturating_add(1),
            yres: bounds.pt2.y.saturating_add(1),
        }
    }

    /// Full display as an inclusive rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(Point::new(0, 0), self.xres, self.yres)
    }
}

/// One-shot latch: unresolved until the first position event, then
/// resolved for good.
#[derive(Debug, Default)]
pub struct WindowReadinessGate {
    state: Mutex<Option<DisplayGeometry>>,
    ready: Condvar,
}

impl WindowReadinessGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `geometry` and wake all waiters.
    ///
    /// Returns `false` (and changes nothing) if the gate was already resolved.
    pub fn resolve(&self, geometry: DisplayGeometry) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.is_some() {
            return false;
        }
        *state = Some(geometry);
        drop(state);
        self.ready.notify_all();
        true
    }

    pub fn is_resolved(&self) -> bool {
        self.geometry().is_some()
    }

    /// Resolved geometry, without blocking.
    pub fn geometry(&self) -> Option<DisplayGeometry> {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until resolved.
    pub fn wait(&self) -> DisplayGeometry {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(geometry) = *state {
                return geometry;
            }
            state = self.ready.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Block until resolved or until `timeout` has elapsed.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<DisplayGeometry> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(geometry) = *state {
                return Some(geometry);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            state = self
                .ready
                .wait_timeout(state, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}

/// Per-window rendering state.
#[derive(Debug, Default)]
pub struct RenderContext {
    gate: WindowReadinessGate,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gate(&self) -> &WindowReadinessGate {
        &self.gate
    }

    /// Geometry if the window is ready.
    pub fn geometry(&self) -> Option<DisplayGeometry> {
        self.gate.geometry()
    }

    /// Handle of the window to draw into, once known.
    pub fn window(&self) -> Option<WindowHandle> {
        self.geometry().map(|g| g.window)
    }

    /// Block until the window is ready; `None` waits forever.
    pub fn wait_until_ready(&self, timeout: Option<Duration>) -> Option<DisplayGeometry> {
        match timeout {
            Some(timeout) => self.gate.wait_timeout(timeout),
            None => Some(self.gate.wait()),
        }
    }
}

impl WindowEventHandler for RenderContext {
    fn on_position(&self, window: WindowHandle, size: Size, pos: Point, bounds: &Rect) {
        debug!(
            "{window}: size=({},{}) pos=({},{}) bounds={bounds}",
            size.w, size.h, pos.x, pos.y
        );
        let geometry = DisplayGeometry::from_bounds(window, bounds);
        if self.gate.resolve(geometry) {
            info!("display ready: xres={} yres={}", geometry.xres, geometry.yres);
        }
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{dispatch, WindowEvent};
    use std::sync::Arc;
    use std::thread;

    fn position(bounds: Rect) -> WindowEvent {
        WindowEvent::Position {
            size: Size::new(bounds.width(), bounds.height()),
            pos: Point::new(0, 0),
            bounds,
        }
    }

    #[test]
    fn test_geometry_from_bounds() {
        let window = WindowHandle::new();
        let bounds = Rect::new(Point::new(0, 0), Point::new(319, 239));
        let g = DisplayGeometry::from_bounds(window, &bounds);
        assert_eq!((g.xres, g.yres), (320, 240));
        assert_eq!(g.bounds(), bounds);
    }

    #[test]
    fn test_first_position_wins() {
        let ctx = RenderContext::new();
        assert!(ctx.window().is_none());

        let first = WindowHandle::new();
        dispatch(&ctx, first, &position(Rect::new(Point::new(0, 0), Point::new(99, 49))));
        dispatch(
            &ctx,
            WindowHandle::new(),
            &position(Rect::new(Point::new(0, 0), Point::new(9, 9))),
        );

        let g = ctx.geometry().unwrap();
        assert_eq!(g.window, first);
        assert_eq!((g.xres, g.yres), (100, 50));
    }

    #[test]
    fn test_resolve_reports_first_only() {
        let gate = WindowReadinessGate::new();
        let g = DisplayGeometry { window: WindowHandle::new(), xres: 1, yres: 1 };
        assert!(!gate.is_resolved());
        assert!(gate.resolve(g));
        assert!(!gate.resolve(g));
        assert!(gate.is_resolved());
    }

    #[test]
    fn test_other_events_do_not_resolve() {
        let ctx = RenderContext::new();
        let window = WindowHandle::new();
        dispatch(&ctx, window, &WindowEvent::Redraw { rect: Rect::default(), more: false });
        dispatch(&ctx, window, &WindowEvent::Pointer { pos: Point::new(1, 2), buttons: 0 });
        assert!(ctx.geometry().is_none());
    }

    #[test]
    fn test_wait_timeout_expires() {
        let ctx = RenderContext::new();
        assert!(ctx.wait_until_ready(Some(Duration::from_millis(10))).is_none());
    }

    #[test]
    fn test_wait_released_by_event_thread() {
        let ctx = Arc::new(RenderContext::new());
        let window = WindowHandle::new();

        let events = {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                dispatch(
                    ctx.as_ref(),
                    window,
                    &position(Rect::new(Point::new(0, 0), Point::new(63, 31))),
                );
            })
        };

        let g = ctx.wait_until_ready(None).unwrap();
        events.join().unwrap();
        assert_eq!(g.window, window);
        assert_eq!((g.xres, g.yres), (64, 32));
    }

    #[test]
    fn test_context_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RenderContext>();
    }
}
