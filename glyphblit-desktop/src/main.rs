//! glyphblit demo: renders mixed Latin/CJK text into a software window.
//!
//! Runs the full `glyphblit-text` → `glyphblit-layout` → `glyphblit-render`
//! pipeline against a simulated windowing subsystem: an event thread
//! delivers redraw/position/pointer events, and the render thread waits
//! for the first position event before drawing.
//!
//! Usage: `glyphblit-desktop [config.json]`

mod state;

use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use glyphblit_core::{Point, Rect, Size, WindowHandle};
use glyphblit_render::{dispatch, RenderConfig, RenderContext, WindowEvent};
use log::{debug, error, info};

use state::{DemoError, DemoState};

const DISPLAY: Size = Size::new(480, 96);
const READY_TIMEOUT: Duration = Duration::from_secs(2);

fn load_config() -> Result<RenderConfig, DemoError> {
    match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {path}");
            let json = std::fs::read_to_string(&path)?;
            Ok(RenderConfig::from_json_str(&json)?)
        }
        None => Ok(RenderConfig::default()),
    }
}

/// Stand-in for the windowing subsystem's callback thread.
fn spawn_window_events(ctx: Arc<RenderContext>, window: WindowHandle) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let bounds = Rect::from_origin_size(Point::new(0, 0), DISPLAY.w, DISPLAY.h);
        let events = [
            WindowEvent::Redraw { rect: bounds, more: false },
            WindowEvent::Position { size: DISPLAY, pos: Point::new(0, 0), bounds },
            WindowEvent::Pointer { pos: Point::new(10, 10), buttons: 0 },
            // A second position event must not move the resolved window.
            WindowEvent::Position {
                size: Size::new(1, 1),
                pos: Point::new(0, 0),
                bounds: Rect::default(),
            },
        ];
        for event in &events {
            debug!("windowing thread: {} event", event.kind());
            dispatch(ctx.as_ref(), window, event);
        }
    })
}

fn run() -> Result<(), DemoError> {
    let config = load_config()?;
    let mut state = DemoState::new(config)?;
    state.load_demo_fonts();

    let window = WindowHandle::new();
    let events = spawn_window_events(Arc::clone(&state.ctx), window);

    let geometry = state.wait_for_display(READY_TIMEOUT)?;
    info!(
        "Window {} ready: {}x{}",
        geometry.window, geometry.xres, geometry.yres
    );

    let (fb, stats) = state.render_demo(&geometry)?;
    if events.join().is_err() {
        error!("windowing thread panicked");
    }

    let ink = state.engine.config().foreground_color;
    for row in fb.to_ascii(ink) {
        debug!("{row}");
    }
    info!(
        "Rendered {} glyphs, {} blanks, {} blit failures, {} blits total; cursor at ({},{})",
        stats.glyphs_drawn,
        stats.blank_advances,
        stats.blit_failures,
        fb.blit_count(),
        stats.cursor.x,
        stats.cursor.y
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    info!("Starting glyphblit demo...");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
