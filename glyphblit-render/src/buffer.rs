//! Glyph scratch buffer and background fill.
//!
//! A [`GlyphBuffer`] is sized once for the largest cell of a font set
//! (`max_height × stride(max_width)` bytes) and then reused for every
//! character: fill with the background, rasterize, blit, repeat.
//!
//! Storage is a `Vec<u32>` so that 16- and 32-bit pixel views obtained via
//! `bytemuck` are always aligned; the byte view exposes exactly
//! `capacity()` bytes. Multi-byte pixels are stored in native byte order.

use glyphblit_core::{FontSetDescriptor, PixelDepth};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("No renderer for {0} bits per pixel")]
    UnsupportedDepth(u8),
    #[error("Glyph region of {required} bytes exceeds buffer capacity {capacity}")]
    GlyphTooLarge { required: usize, capacity: usize },
    #[error("Stride {stride} too small for {width} pixels at {depth}")]
    InvalidStride {
        stride: usize,
        width: u32,
        depth: PixelDepth,
    },
    #[error("Failed to allocate {bytes} bytes for the glyph buffer")]
    Allocation { bytes: usize },
}

/// Geometry of one glyph cell inside a [`GlyphBuffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphCell {
    /// Rows in the cell.
    pub height: u32,
    /// Pixels per row.
    pub width: u32,
    /// Bytes per row.
    pub stride: usize,
}

impl GlyphCell {
    /// Cell for `width × height` pixels with the tightest stride for `depth`.
    pub fn new(width: u32, height: u32, depth: PixelDepth) -> Self {
        Self {
            height,
            width,
            stride: depth.stride(width),
        }
    }

    /// Bytes covered by the cell.
    pub fn len(&self) -> usize {
        self.height as usize * self.stride
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stride must hold `width` pixels, and whole pixels for depths ≥ 8.
    pub(crate) fn check_stride(&self, depth: PixelDepth) -> Result<(), RenderError> {
        let bytes_per_pixel = usize::from(depth.bits() / 8).max(1);
        if self.stride < depth.stride(self.width)
            || (!depth.is_packed() && self.stride % bytes_per_pixel != 0)
        {
            return Err(RenderError::InvalidStride {
                stride: self.stride,
                width: self.width,
                depth,
            });
        }
        Ok(())
    }
}

/// Reusable pixel scratch buffer for one glyph at a time.
#[derive(Clone, Debug)]
pub struct GlyphBuffer {
    words: Vec<u32>,
    capacity: usize,
}

impl GlyphBuffer {
    /// Allocate a zeroed buffer of `bytes` bytes.
    ///
    /// Uses fallible allocation: an allocator failure is reported as
    /// [`RenderError::Allocation`] instead of aborting.
    pub fn with_capacity(bytes: usize) -> Result<Self, RenderError> {
        let word_count = bytes.div_ceil(4);
        let mut words = Vec::new();
        words
            .try_reserve_exact(word_count)
            .map_err(|_| RenderError::Allocation { bytes })?;
        words.resize(word_count, 0);
        Ok(Self {
            words,
            capacity: bytes,
        })
    }

    /// Buffer large enough for any glyph of the described font set.
    pub fn for_font_set(
        descriptor: &FontSetDescriptor,
        depth: PixelDepth,
    ) -> Result<Self, RenderError> {
        let cell = GlyphCell::new(
            u32::from(descriptor.max_width),
            u32::from(descriptor.max_height),
            depth,
        );
        Self::with_capacity(cell.len())
    }

    /// Usable size in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Explicit capacity check, returning the region size in bytes.
    pub fn ensure_fits(&self, cell: &GlyphCell) -> Result<usize, RenderError> {
        let required = cell.len();
        if required > self.capacity {
            return Err(RenderError::GlyphTooLarge {
                required,
                capacity: self.capacity,
            });
        }
        Ok(required)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<u32, u8>(&self.words)[..self.capacity]
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut bytemuck::cast_slice_mut::<u32, u8>(&mut self.words)[..self.capacity]
    }

    /// The first `cell.len()` bytes: what a blit of this cell reads.
    pub fn region(&self, cell: &GlyphCell) -> &[u8] {
        let len = cell.len().min(self.capacity);
        &self.as_bytes()[..len]
    }

    pub(crate) fn as_u16_mut(&mut self) -> &mut [u16] {
        bytemuck::cast_slice_mut(&mut self.words)
    }

    pub(crate) fn as_u32_mut(&mut self) -> &mut [u32] {
        &mut self.words
    }

    /// Write `color` into every pixel of a `height × stride` region.
    ///
    /// Depths below 8 bits store one replicated byte per position (see
    /// [`pack_background`]); 8/16/32-bit depths store the color per pixel.
    /// 24-bit depth is not supported.
    pub fn fill_background(
        &mut self,
        height: u32,
        width: u32,
        stride: usize,
        depth: PixelDepth,
        color: u32,
    ) -> Result<(), RenderError> {
        if depth == PixelDepth::Bpp24 {
            return Err(RenderError::UnsupportedDepth(24));
        }

        let cell = GlyphCell { height, width, stride };
        cell.check_stride(depth)?;
        let required = self.ensure_fits(&cell)?;
        let (rows, cols) = (height as usize, width as usize);

        match depth {
            PixelDepth::Bpp1 | PixelDepth::Bpp2 | PixelDepth::Bpp4 => {
                let byte = pack_background(depth, color);
                self.as_bytes_mut()[..required].fill(byte);
            }
            PixelDepth::Bpp8 => {
                let bytes = self.as_bytes_mut();
                for row in 0..rows {
                    let start = row * stride;
                    bytes[start..start + cols].fill(color as u8);
                }
            }
            PixelDepth::Bpp16 => {
                let pixels = self.as_u16_mut();
                for row in 0..rows {
                    let start = row * stride / 2;
                    pixels[start..start + cols].fill(color as u16);
                }
            }
            PixelDepth::Bpp32 => {
                let pixels = self.as_u32_mut();
                for row in 0..rows {
                    let start = row * stride / 4;
                    pixels[start..start + cols].fill(color);
                }
            }
            PixelDepth::Bpp24 => unreachable!("rejected above"),
        }
        Ok(())
    }
}

/// Replicate a sub-byte pixel value across a whole byte.
///
/// 1-bit values are doubled into 2 bits, 2-bit values into a nibble and
/// the nibble into a byte, so `0b01` at 2 bpp packs to `0b0101_0101`.
/// Depths of 8 bits and more return the low byte of `color`.
pub fn pack_background(depth: PixelDepth, color: u32) -> u8 {
    if !depth.is_packed() {
        return color as u8;
    }

    let mut pixel = color as u8;
    if depth == PixelDepth::Bpp1 {
        pixel &= 0x01;
        pixel |= pixel << 1;
    }
    if depth.bits() <= 2 {
        pixel &= 0x03;
        pixel |= pixel << 2;
    }
    pixel &= 0x0f;
    pixel | pixel << 4
}

// ===================================================================
// Tests
// ===================================================================
