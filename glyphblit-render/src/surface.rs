//! Blit boundary: the windowing subsystem as seen by the layout engine.
//!
//! [`BlitTarget::blit`] copies a rectangular region of a source image into
//! a window. `origin` is where the source image's top-left pixel sits in
//! window coordinates; `dest` selects which part of it lands on screen.
//! The source is given as one buffer per color plane.
//!
//! [`Framebuffer`] is a software surface implementing the boundary: a
//! single window backed by a byte buffer at any supported depth. It is
//! the headless stand-in used by tests, benchmarks and the demo binary.

use glyphblit_core::{PixelDepth, Point, Rect, WindowHandle};
use log::debug;
use thiserror::Error;

/// `EBADF`: blit addressed to a window the surface doesn't own.
pub const EBADF: i32 = 9;
/// `EINVAL`: malformed source description.
pub const EINVAL: i32 = 22;

/// Failure reported by the windowing subsystem (negated errno style).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Blit failed with code {0}")]
pub struct BlitError(pub i32);

/// Destination of glyph blits.
pub trait BlitTarget {
    fn blit(
        &mut self,
        window: WindowHandle,
        dest: &Rect,
        planes: &[&[u8]],
        origin: Point,
        stride: usize,
    ) -> Result<(), BlitError>;
}

/// Read pixel `x` of row `row` (a row slice) at `depth`.
///
/// Sub-byte pixels are packed most significant first; 16- and 32-bit
/// pixels are native byte order, 24-bit pixels little endian.
pub fn read_pixel(row: &[u8], x: usize, depth: PixelDepth) -> u32 {
    match depth {
        PixelDepth::Bpp1 | PixelDepth::Bpp2 | PixelDepth::Bpp4 => {
            let bpp = usize::from(depth.bits());
            let bit = x * bpp;
            let shift = 8 - bpp - bit % 8;
            u32::from(row[bit / 8] >> shift) & depth.color_mask()
        }
        PixelDepth::Bpp8 => u32::from(row[x]),
        PixelDepth::Bpp16 => u32::from(u16::from_ne_bytes([row[2 * x], row[2 * x + 1]])),
        PixelDepth::Bpp24 => {
            let at = 3 * x;
            u32::from_le_bytes([row[at], row[at + 1], row[at + 2], 0])
        }
        PixelDepth::Bpp32 => {
            let at = 4 * x;
            u32::from_ne_bytes([row[at], row[at + 1], row[at + 2], row[at + 3]])
        }
    }
}

/// Write pixel `x` of a row slice at `depth`. Inverse of [`read_pixel`].
pub fn write_pixel(row: &mut [u8], x: usize, depth: PixelDepth, value: u32) {
    match depth {
        PixelDepth::Bpp1 | PixelDepth::Bpp2 | PixelDepth::Bpp4 => {
            let bpp = usize::from(depth.bits());
            let bit = x * bpp;
            let shift = 8 - bpp - bit % 8;
            let mask = depth.color_mask() as u8;
            let byte = &mut row[bit / 8];
            *byte = (*byte & !(mask << shift)) | ((value as u8 & mask) << shift);
        }
        PixelDepth::Bpp8 => row[x] = value as u8,
        PixelDepth::Bpp16 => row[2 * x..2 * x + 2].copy_from_slice(&(value as u16).to_ne_bytes()),
        PixelDepth::Bpp24 => row[3 * x..3 * x + 3].copy_from_slice(&value.to_le_bytes()[..3]),
        PixelDepth::Bpp32 => row[4 * x..4 * x + 4].copy_from_slice(&value.to_ne_bytes()),
    }
}

/// In-memory window surface.
#[derive(Clone, Debug)]
pub struct Framebuffer {
    window: WindowHandle,
    width: u32,
    height: u32,
    depth: PixelDepth,
    stride: usize,
    data: Vec<u8>,
    blits: u64,
}

impl Framebuffer {
    /// Zero-filled `width × height` surface for `window`.
    pub fn new(window: WindowHandle, width: u32, height: u32, depth: PixelDepth) -> Self {
        let stride = depth.stride(width);
        Self {
            window,
            width,
            height,
            depth,
            stride,
            data: vec![0; stride * height as usize],
            blits: 0,
        }
    }

    pub fn window(&self) -> WindowHandle {
        self.window
    }

    /// `(width, height)` in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn depth(&self) -> PixelDepth {
        self.depth
    }

    /// Number of successful blits so far.
    pub fn blit_count(&self) -> u64 {
        self.blits
    }

    /// Full surface bounds as an inclusive rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(Point::new(0, 0), self.width as i32, self.height as i32)
    }

    /// Paint every pixel with `color`.
    pub fn clear(&mut self, color: u32) {
        for y in 0..self.height as usize {
            let row = &mut self.data[y * self.stride..(y + 1) * self.stride];
            for x in 0..self.width as usize {
                write_pixel(row, x, self.depth, color);
            }
        }
    }

    /// Pixel value at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let row = &self.data[y as usize * self.stride..];
        Some(read_pixel(row, x as usize, self.depth))
    }

    /// Render rows as text: `'#'` where the pixel equals `ink`, `'.'` elsewhere.
    pub fn to_ascii(&self, ink: u32) -> Vec<String> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| if self.pixel(x, y) == Some(ink) { '#' } else { '.' })
                    .collect()
            })
            .collect()
    }
}

impl BlitTarget for Framebuffer {
    fn blit(
        &mut self,
        window: WindowHandle,
        dest: &Rect,
        planes: &[&[u8]],
        origin: Point,
        stride: usize,
    ) -> Result<(), BlitError> {
        if window != self.window {
            return Err(BlitError(-EBADF));
        }
        let [src] = planes else {
            return Err(BlitError(-EINVAL));
        };
        if dest.pt1.x < origin.x || dest.pt1.y < origin.y {
            return Err(BlitError(-EINVAL));
        }

        let clipped = dest.intersect(&self.bounds());
        if clipped.is_empty() {
            debug!("blit {dest} fully clipped");
            self.blits += 1;
            return Ok(());
        }

        // Last source byte the clipped region will touch must exist.
        let last_row = (clipped.pt2.y - origin.y) as usize;
        let last_col = (clipped.pt2.x - origin.x) as usize;
        let needed = last_row * stride + self.depth.stride(last_col as u32 + 1);
        if src.len() < needed {
            return Err(BlitError(-EINVAL));
        }

        for y in clipped.pt1.y..=clipped.pt2.y {
            let src_row = &src[(y - origin.y) as usize * stride..];
            let dst_start = y as usize * self.stride;
            let dst_row = &mut self.data[dst_start..dst_start + self.stride];
            for x in clipped.pt1.x..=clipped.pt2.x {
                let value = read_pixel(src_row, (x - origin.x) as usize, self.depth);
                write_pixel(dst_row, x as usize, self.depth, value);
            }
        }

        self.blits += 1;
        Ok(())
    }
}

// ===================================================================
// Tests
// ===================================================================
