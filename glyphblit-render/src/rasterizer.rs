//! Glyph rasterizer. Renders 1-bit glyph bitmaps into a [`GlyphBuffer`].
//!
//! There is one renderer per pixel depth. The depth is a process-wide
//! setting, so the renderer is picked once when the [`GlyphRasterizer`] is
//! built and then called for every glyph without re-dispatching.
//!
//! Each set bit of the source bitmap becomes a foreground pixel at
//! `(xoffset + col, yoffset + row)` inside the cell; clear bits leave the
//! background untouched. Bitmap rows that fall outside the cell are
//! clipped. Sub-byte pixels are packed most significant first.

use glyphblit_core::{GlyphBitmap, PixelDepth};

use crate::buffer::{GlyphBuffer, GlyphCell, RenderError};

/// Signature shared by the per-depth renderers.
type RenderFn = fn(&mut GlyphBuffer, &GlyphCell, &GlyphBitmap, u32);

/// Depth-specialised glyph renderer.
#[derive(Clone, Copy)]
pub struct GlyphRasterizer {
    depth: PixelDepth,
    render: RenderFn,
}

impl std::fmt::Debug for GlyphRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphRasterizer")
            .field("depth", &self.depth)
            .finish()
    }
}

impl GlyphRasterizer {
    pub fn new(depth: PixelDepth) -> Self {
        let render: RenderFn = match depth {
            PixelDepth::Bpp1 => render_packed::<1>,
            PixelDepth::Bpp2 => render_packed::<2>,
            PixelDepth::Bpp4 => render_packed::<4>,
            PixelDepth::Bpp8 => render_8bpp,
            PixelDepth::Bpp16 => render_16bpp,
            PixelDepth::Bpp24 => render_24bpp,
            PixelDepth::Bpp32 => render_32bpp,
        };
        Self { depth, render }
    }

    /// Select a renderer from a raw bits-per-pixel value.
    pub fn for_bits(bits: u8) -> Result<Self, RenderError> {
        PixelDepth::try_from(bits)
            .map(Self::new)
            .map_err(|_| RenderError::UnsupportedDepth(bits))
    }

    pub fn depth(&self) -> PixelDepth {
        self.depth
    }

    /// Render `bitmap` into the cell at the start of `buffer`.
    ///
    /// The buffer is expected to be background-filled already.
    pub fn rasterize(
        &self,
        buffer: &mut GlyphBuffer,
        cell: &GlyphCell,
        bitmap: &GlyphBitmap,
        color: u32,
    ) -> Result<(), RenderError> {
        cell.check_stride(self.depth)?;
        buffer.ensure_fits(cell)?;
        (self.render)(buffer, cell, bitmap, color);
        Ok(())
    }
}

/// Render one glyph at `depth`.
///
/// Convenience form that selects the renderer per call; the layout engine
/// keeps a [`GlyphRasterizer`] instead.
pub fn rasterize(
    buffer: &mut GlyphBuffer,
    height: u32,
    width: u32,
    stride: usize,
    bitmap: &GlyphBitmap,
    color: u32,
    depth: PixelDepth,
) -> Result<(), RenderError> {
    let cell = GlyphCell { height, width, stride };
    GlyphRasterizer::new(depth).rasterize(buffer, &cell, bitmap, color)
}

/// Visit every set source pixel that lands inside the cell, with its
/// destination coordinates.
fn for_each_set_pixel(cell: &GlyphCell, bitmap: &GlyphBitmap, mut f: impl FnMut(usize, usize)) {
    let m = bitmap.metrics;
    let (xoff, yoff) = (u32::from(m.xoffset), u32::from(m.yoffset));
    if xoff >= cell.width || yoff >= cell.height {
        return;
    }

    let rows = u32::from(m.height).min(cell.height - yoff) as usize;
    let cols = u32::from(m.width).min(cell.width - xoff) as usize;
    for row in 0..rows {
        for col in 0..cols {
            if bitmap.pixel(col, row) {
                f(xoff as usize + col, yoff as usize + row);
            }
        }
    }
}

fn render_packed<const BPP: usize>(
    buffer: &mut GlyphBuffer,
    cell: &GlyphCell,
    bitmap: &GlyphBitmap,
    color: u32,
) {
    let mask = (1u8 << BPP) - 1;
    let value = color as u8 & mask;
    let stride = cell.stride;
    let bytes = buffer.as_bytes_mut();

    for_each_set_pixel(cell, bitmap, |x, y| {
        let bit = x * BPP;
        let shift = 8 - BPP - bit % 8;
        let byte = &mut bytes[y * stride + bit / 8];
        *byte = (*byte & !(mask << shift)) | (value << shift);
    });
}

fn render_8bpp(buffer: &mut GlyphBuffer, cell: &GlyphCell, bitmap: &GlyphBitmap, color: u32) {
    let stride = cell.stride;
    let bytes = buffer.as_bytes_mut();
    for_each_set_pixel(cell, bitmap, |x, y| bytes[y * stride + x] = color as u8);
}

fn render_16bpp(buffer: &mut GlyphBuffer, cell: &GlyphCell, bitmap: &GlyphBitmap, color: u32) {
    let row_pixels = cell.stride / 2;
    let pixels = buffer.as_u16_mut();
    for_each_set_pixel(cell, bitmap, |x, y| pixels[y * row_pixels + x] = color as u16);
}

fn render_24bpp(buffer: &mut GlyphBuffer, cell: &GlyphCell, bitmap: &GlyphBitmap, color: u32) {
    let stride = cell.stride;
    let rgb = &color.to_le_bytes()[..3];
    let bytes = buffer.as_bytes_mut();
    for_each_set_pixel(cell, bitmap, |x, y| {
        let at = y * stride + x * 3;
        bytes[at..at + 3].copy_from_slice(rgb);
    });
}

fn render_32bpp(buffer: &mut GlyphBuffer, cell: &GlyphCell, bitmap: &GlyphBitmap, color: u32) {
    let row_pixels = cell.stride / 4;
    let pixels = buffer.as_u32_mut();
    for_each_set_pixel(cell, bitmap, |x, y| pixels[y * row_pixels + x] = color);
}

// ===================================================================
// Tests
// ===================================================================
