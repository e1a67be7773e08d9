//! Demo state. Owns the font sets, the render context and the engine.
//!
//! `DemoState` stands in for the application side of a windowed program:
//! the render context is shared with the (simulated) windowing thread,
//! while fonts and the layout engine stay on the render thread.

use std::sync::Arc;
use std::time::Duration;

use glyphblit_core::{FontId, Point};
use glyphblit_layout::{LayoutError, RenderStats, TextLayoutEngine};
use glyphblit_render::{ConfigError, DisplayGeometry, Framebuffer, RenderConfig, RenderContext};
use glyphblit_text::{BitmapFontSet, FontRegistry};
use log::{debug, info};
use thiserror::Error;

/// The string drawn by the demo, once per font set.
pub const DEMO_TEXT: &str = "诸葛高   皇甫杰   魑魅魍魉";

/// Placeholder font sets: (id, glyph width, glyph height, space width).
const DEMO_FONTS: [(u32, u16, u16, u16); 3] = [(1, 12, 12, 6), (2, 16, 16, 8), (3, 24, 24, 12)];

const LINE_GAP: i32 = 8;

#[derive(Error, Debug)]
pub enum DemoError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("No position event within {0:?}")]
    Timeout(Duration),
    #[error("Invalid display resolution {xres}x{yres}")]
    InvalidGeometry { xres: i32, yres: i32 },
}

pub struct DemoState {
    pub ctx: Arc<RenderContext>,
    pub fonts: FontRegistry,
    pub engine: TextLayoutEngine,
}

impl DemoState {
    pub fn new(config: RenderConfig) -> Result<Self, DemoError> {
        Ok(Self {
            ctx: Arc::new(RenderContext::new()),
            fonts: FontRegistry::new(),
            engine: TextLayoutEngine::new(config)?,
        })
    }

    /// Register the three placeholder font sets.
    pub fn load_demo_fonts(&mut self) {
        for (id, width, height, space) in DEMO_FONTS {
            self.fonts
                .register(FontId(id), BitmapFontSet::placeholder(width, height, space));
        }
        info!("{} font sets loaded", self.fonts.len());
    }

    /// Block until the windowing thread reports the display bounds.
    pub fn wait_for_display(&self, timeout: Duration) -> Result<DisplayGeometry, DemoError> {
        self.ctx
            .wait_until_ready(Some(timeout))
            .ok_or(DemoError::Timeout(timeout))
    }

    /// Draw the demo text once per font set into a fresh framebuffer.
    pub fn render_demo(
        &self,
        geometry: &DisplayGeometry,
    ) -> Result<(Framebuffer, RenderStats), DemoError> {
        let config = self.engine.config();
        let invalid = || DemoError::InvalidGeometry {
            xres: geometry.xres,
            yres: geometry.yres,
        };
        let width = u32::try_from(geometry.xres).map_err(|_| invalid())?;
        let height = u32::try_from(geometry.yres).map_err(|_| invalid())?;
        let mut fb = Framebuffer::new(geometry.window, width, height, config.pixel_depth);
        fb.clear(config.background_color);

        let lines: Vec<(FontId, &str)> = DEMO_FONTS
            .iter()
            .map(|&(id, ..)| (FontId(id), DEMO_TEXT))
            .collect();
        let advance = self.engine.measure(&self.fonts, DEMO_TEXT)?;
        debug!("{} measures {advance}px in {}", DEMO_TEXT, config.font_id);

        let stats = self.engine.render_lines(
            &self.ctx,
            &mut fb,
            &self.fonts,
            &lines,
            Point::new(0, 0),
            LINE_GAP,
        )?;
        Ok((fb, stats))
    }
}

// ===================================================================
// Tests
// ===================================================================
