//! Text layout: converts, decodes and blits a string glyph by glyph.
//!
//! The cursor starts at the caller's position and moves right by each
//! glyph's cell width, or by the font set's space width for codes with no
//! glyph. Cursor arithmetic saturates at the `i32` range, so x never
//! decreases along a run.

use glyphblit_core::{FontId, FontSetDescriptor, Point, Rect, WindowHandle};
use glyphblit_render::{
    BlitTarget, ConfigError, DisplayGeometry, GlyphBuffer, GlyphCell, GlyphRasterizer,
    RenderConfig, RenderContext, RenderError,
};
use glyphblit_text::{decode, ConversionError, EncodingConverter, FontSource};
use log::{debug, info, warn};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Text conversion failed: {0}")]
    Conversion(#[from] ConversionError),
    #[error("Glyph rendering failed: {0}")]
    Render(#[from] RenderError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Font set not found: {0}")]
    UnknownFont(FontId),
    #[error("Window position not known yet")]
    NotReady,
}

/// Outcome of one render call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Glyphs successfully blitted.
    pub glyphs_drawn: u32,
    /// Codes with no glyph, advanced by the space width.
    pub blank_advances: u32,
    /// Glyphs whose blit was rejected by the surface.
    pub blit_failures: u32,
    /// Cursor position after the last code.
    pub cursor: Point,
}

impl RenderStats {
    fn absorb(&mut self, other: &RenderStats) {
        self.glyphs_drawn += other.glyphs_drawn;
        self.blank_advances += other.blank_advances;
        self.blit_failures += other.blit_failures;
        self.cursor = other.cursor;
    }
}

/// One string drawn in one font set.
struct Run<'t> {
    font: FontId,
    text: &'t str,
    start: Point,
}

/// Lays out a string one glyph at a time, left to right on a fixed row.
///
/// Built once from a validated [`RenderConfig`]: the converter and the
/// depth-specific rasterizer are resolved up front and reused for every
/// call.
#[derive(Clone, Debug)]
pub struct TextLayoutEngine {
    config: RenderConfig,
    converter: EncodingConverter,
    rasterizer: GlyphRasterizer,
}

impl TextLayoutEngine {
    pub fn new(config: RenderConfig) -> Result<Self, LayoutError> {
        config.validate()?;
        let converter = EncodingConverter::new(&config.source_encoding, &config.target_encoding)?;
        let rasterizer = GlyphRasterizer::new(config.pixel_depth);
        info!(
            "layout engine: {} -> {}, {}, fg={:#x} bg={:#x}",
            converter.source_name(),
            converter.target_name(),
            config.pixel_depth,
            config.foreground_color,
            config.background_color
        );
        Ok(Self {
            config,
            converter,
            rasterizer,
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Draw `text` in the configured font set with the cursor at `start`.
    ///
    /// A scratch buffer sized for the font set is allocated for the call.
    pub fn render<S, F>(
        &self,
        ctx: &RenderContext,
        surface: &mut S,
        fonts: &F,
        text: &str,
        start: Point,
    ) -> Result<RenderStats, LayoutError>
    where
        S: BlitTarget + ?Sized,
        F: FontSource + ?Sized,
    {
        let window = ctx.window().ok_or(LayoutError::NotReady)?;
        let font = self.config.font_id;
        let descriptor = font_set(fonts, font)?;
        let mut buffer = GlyphBuffer::for_font_set(&descriptor, self.config.pixel_depth)?;
        self.draw(window, surface, fonts, &mut buffer, Run { font, text, start })
    }

    /// Like [`render`](Self::render), reusing a caller-owned buffer.
    pub fn render_with_buffer<S, F>(
        &self,
        ctx: &RenderContext,
        surface: &mut S,
        fonts: &F,
        buffer: &mut GlyphBuffer,
        text: &str,
        start: Point,
    ) -> Result<RenderStats, LayoutError>
    where
        S: BlitTarget + ?Sized,
        F: FontSource + ?Sized,
    {
        let window = ctx.window().ok_or(LayoutError::NotReady)?;
        let font = self.config.font_id;
        self.draw(window, surface, fonts, buffer, Run { font, text, start })
    }

    /// Draw each `(font, text)` line below the previous one.
    ///
    /// Line `n + 1` starts `max_height + line_gap` pixels below line `n`,
    /// using the max height of line `n`'s font set. One buffer, sized for
    /// the largest font set involved, serves every line.
    pub fn render_lines<S, F>(
        &self,
        ctx: &RenderContext,
        surface: &mut S,
        fonts: &F,
        lines: &[(FontId, &str)],
        origin: Point,
        line_gap: i32,
    ) -> Result<RenderStats, LayoutError>
    where
        S: BlitTarget + ?Sized,
        F: FontSource + ?Sized,
    {
        let window = ctx.window().ok_or(LayoutError::NotReady)?;
        let depth = self.config.pixel_depth;

        let mut descriptors = Vec::with_capacity(lines.len());
        let mut capacity = 0;
        for &(font, _) in lines {
            let descriptor = font_set(fonts, font)?;
            let cell = GlyphCell::new(
                u32::from(descriptor.max_width),
                u32::from(descriptor.max_height),
                depth,
            );
            capacity = capacity.max(cell.len());
            descriptors.push(descriptor);
        }
        let mut buffer = GlyphBuffer::with_capacity(capacity)?;

        let mut total = RenderStats {
            cursor: origin,
            ..RenderStats::default()
        };
        let mut y = origin.y;
        for (&(font, text), descriptor) in lines.iter().zip(&descriptors) {
            let start = Point::new(origin.x, y);
            let stats = self.draw(window, surface, fonts, &mut buffer, Run { font, text, start })?;
            total.absorb(&stats);
            y = y
                .saturating_add(i32::from(descriptor.max_height))
                .saturating_add(line_gap);
        }
        Ok(total)
    }

    /// Total cursor advance of `text` in the configured font set.
    pub fn measure<F>(&self, fonts: &F, text: &str) -> Result<i32, LayoutError>
    where
        F: FontSource + ?Sized,
    {
        let font = self.config.font_id;
        let descriptor = font_set(fonts, font)?;
        let encoded = self.converter.convert_to_fit(text.as_bytes())?;
        Ok(decode(&encoded)
            .map(|code| match fonts.glyph_bitmap(font, code) {
                Some(bitmap) => to_i32(bitmap.metrics.cell_width()),
                None => i32::from(descriptor.space_width),
            })
            .fold(0, i32::saturating_add))
    }

    /// Start position that centres `text` on the display.
    pub fn centered_origin<F>(
        &self,
        fonts: &F,
        text: &str,
        geometry: &DisplayGeometry,
    ) -> Result<Point, LayoutError>
    where
        F: FontSource + ?Sized,
    {
        let width = self.measure(fonts, text)?;
        let descriptor = font_set(fonts, self.config.font_id)?;
        Ok(Point::new(
            (geometry.xres - width) / 2,
            (geometry.yres - i32::from(descriptor.max_height)) / 2,
        ))
    }

    fn draw<S, F>(
        &self,
        window: WindowHandle,
        surface: &mut S,
        fonts: &F,
        buffer: &mut GlyphBuffer,
        run: Run<'_>,
    ) -> Result<RenderStats, LayoutError>
    where
        S: BlitTarget + ?Sized,
        F: FontSource + ?Sized,
    {
        let descriptor = font_set(fonts, run.font)?;
        let encoded = self.converter.convert_to_fit(run.text.as_bytes())?;
        let depth = self.config.pixel_depth;

        let mut stats = RenderStats {
            cursor: run.start,
            ..RenderStats::default()
        };
        let mut codes = decode(&encoded);
        for code in codes.by_ref() {
            let Some(bitmap) = fonts.glyph_bitmap(run.font, code) else {
                debug!("{code}: no glyph in {}, advancing {}", run.font, descriptor.space_width);
                stats.cursor.x = stats.cursor.x.saturating_add(i32::from(descriptor.space_width));
                stats.blank_advances += 1;
                continue;
            };

            let metrics = bitmap.metrics;
            let cell = GlyphCell::new(metrics.cell_width(), metrics.cell_height(), depth);
            buffer.fill_background(
                cell.height,
                cell.width,
                cell.stride,
                depth,
                self.config.background_color,
            )?;
            self.rasterizer
                .rasterize(buffer, &cell, bitmap, self.config.foreground_color)?;

            let (width, height) = (to_i32(cell.width), to_i32(cell.height));
            let dest = Rect::from_origin_size(stats.cursor, width, height);
            debug!("{code}: blit {dest} stride={}", cell.stride);
            match surface.blit(window, &dest, &[buffer.region(&cell)], stats.cursor, cell.stride) {
                Ok(()) => stats.glyphs_drawn += 1,
                Err(err) => {
                    warn!("{code}: {err}");
                    stats.blit_failures += 1;
                }
            }
            stats.cursor.x = stats.cursor.x.saturating_add(width);
        }

        debug!(
            "{}: {} bytes decoded ({:?}), {} drawn, {} blank, {} failed",
            run.font,
            codes.consumed(),
            codes.stop_reason(),
            stats.glyphs_drawn,
            stats.blank_advances,
            stats.blit_failures
        );
        Ok(stats)
    }
}

fn to_i32(extent: u32) -> i32 {
    i32::try_from(extent).unwrap_or(i32::MAX)
}

fn font_set<F>(fonts: &F, font: FontId) -> Result<FontSetDescriptor, LayoutError>
where
    F: FontSource + ?Sized,
{
    fonts.font_set(font).ok_or(LayoutError::UnknownFont(font))
}

// ===================================================================
// Tests
// ===================================================================
