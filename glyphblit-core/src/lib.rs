//! # glyphblit-core
//!
//! Shared data model for the glyphblit text pipeline: window geometry,
//! window/font handles, decoded character codes, glyph metrics and
//! bitmaps, font-set descriptors and pixel depths.
//!
//! Everything here is plain data. The crates built on top of it are:
//!
//! ```text
//!  glyphblit-text    encoding conversion, code-unit decoding, fonts
//!  glyphblit-render  glyph buffer, rasterizer, blit surface, context
//!  glyphblit-layout  TextLayoutEngine (cursor advance + blit loop)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unsupported bits per pixel: {0}")]
    UnsupportedBitsPerPixel(u8),
    #[error("Glyph bitmap too short: expected {expected} bytes, got {actual}")]
    BitmapLength { expected: usize, actual: usize },
}

// ── Geometry ────────────────────────────────────────────────────────

/// A position in window coordinates (pixels).
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A width/height pair (pixels).
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub w: i32,
    pub h: i32,
}

impl Size {
    pub const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }
}

/// Inclusive rectangle: `pt1` is the top-left pixel, `pt2` the bottom-right.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub pt1: Point,
    pub pt2: Point,
}

impl Rect {
    pub const fn new(pt1: Point, pt2: Point) -> Self {
        Self { pt1, pt2 }
    }

    /// Rectangle covering `width × height` pixels starting at `origin`.
    ///
    /// The far corner saturates at the `i32` range.
    pub fn from_origin_size(origin: Point, width: i32, height: i32) -> Self {
        Self {
            pt1: origin,
            pt2: Point::new(
                origin.x.saturating_add(width.saturating_sub(1)),
                origin.y.saturating_add(height.saturating_sub(1)),
            ),
        }
    }

    pub fn width(&self) -> i32 {
        self.pt2.x.saturating_sub(self.pt1.x).saturating_add(1)
    }

    pub fn height(&self) -> i32 {
        self.pt2.y.saturating_sub(self.pt1.y).saturating_add(1)
    }

    /// True if the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Intersection of two rectangles (may be empty).
    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect {
            pt1: Point::new(self.pt1.x.max(other.pt1.x), self.pt1.y.max(other.pt1.y)),
            pt2: Point::new(self.pt2.x.min(other.pt2.x), self.pt2.y.min(other.pt2.y)),
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{({},{}),({},{})}}",
            self.pt1.x, self.pt1.y, self.pt2.x, self.pt2.y
        )
    }
}

// ── Handles ─────────────────────────────────────────────────────────

/// Opaque handle naming a window owned by the windowing subsystem.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub Uuid);

impl WindowHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WindowHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one font set inside the font-asset collaborator.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(pub u32);

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font#{}", self.0)
    }
}

// ── Character codes ─────────────────────────────────────────────────

/// One decoded code unit of a mixed single/double-byte string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CharacterCode {
    /// A byte in `0x00..=0x7F`.
    Single(u8),
    /// `(lead << 8) | trail`, lead byte always ≥ 0x80.
    Double(u16),
}

impl CharacterCode {
    /// The code value used for glyph lookup.
    pub fn value(self) -> u16 {
        match self {
            Self::Single(b) => u16::from(b),
            Self::Double(v) => v,
        }
    }

    pub fn is_double(self) -> bool {
        matches!(self, Self::Double(_))
    }

    /// Number of source bytes this code occupied.
    pub fn byte_len(self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Double(_) => 2,
        }
    }
}

impl fmt::Display for CharacterCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(b) => write!(f, "{b:#04x}"),
            Self::Double(v) => write!(f, "{v:#06x}"),
        }
    }
}

// ── Glyphs ──────────────────────────────────────────────────────────

/// Placement of a glyph's visible bitmap within its cell.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct GlyphMetrics {
    pub width: u16,
    pub height: u16,
    pub xoffset: u16,
    pub yoffset: u16,
}

impl GlyphMetrics {
    pub const fn new(width: u16, height: u16, xoffset: u16, yoffset: u16) -> Self {
        Self { width, height, xoffset, yoffset }
    }

    /// Cell width including the leading x offset. This is also the cursor advance.
    pub fn cell_width(&self) -> u32 {
        u32::from(self.width) + u32::from(self.xoffset)
    }

    /// Cell height including the leading y offset.
    pub fn cell_height(&self) -> u32 {
        u32::from(self.height) + u32::from(self.yoffset)
    }

    /// Bytes per row of the 1-bit source bitmap.
    pub fn bitmap_stride(&self) -> usize {
        (usize::from(self.width) + 7) >> 3
    }
}

/// A pre-rendered glyph: 1 bit per pixel, MSB first, rows padded to bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphBitmap {
    pub metrics: GlyphMetrics,
    data: Vec<u8>,
}

impl GlyphBitmap {
    pub fn new(metrics: GlyphMetrics, data: Vec<u8>) -> Result<Self, CoreError> {
        let expected = metrics.bitmap_stride() * usize::from(metrics.height);
        if data.len() < expected {
            return Err(CoreError::BitmapLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { metrics, data })
    }

    /// Build a bitmap from rows of `'#'` (set) and any other char (clear).
    ///
    /// Handy for tests and hand-drawn glyphs; all rows take the width of
    /// the longest one.
    pub fn from_ascii_rows(rows: &[&str], xoffset: u16, yoffset: u16) -> Self {
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let metrics = GlyphMetrics::new(width as u16, rows.len() as u16, xoffset, yoffset);
        let stride = metrics.bitmap_stride();
        let mut data = vec![0u8; stride * rows.len()];
        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                if ch == '#' {
                    data[row * stride + col / 8] |= 0x80 >> (col % 8);
                }
            }
        }
        Self { metrics, data }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether the source pixel at (`col`, `row`) is set.
    pub fn pixel(&self, col: usize, row: usize) -> bool {
        if col >= usize::from(self.metrics.width) || row >= usize::from(self.metrics.height) {
            return false;
        }
        let byte = self.data[row * self.metrics.bitmap_stride() + col / 8];
        byte & (0x80 >> (col % 8)) != 0
    }
}

/// Metrics shared by every glyph of a font set.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct FontSetDescriptor {
    /// Widest glyph cell in the set (pixels).
    pub max_width: u16,
    /// Tallest glyph cell in the set (pixels).
    pub max_height: u16,
    /// Advance used for codes without a glyph.
    pub space_width: u16,
}

// ── Pixel depth ─────────────────────────────────────────────────────

/// Bits per pixel of the display surface.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum PixelDepth {
    Bpp1,
    Bpp2,
    Bpp4,
    Bpp8,
    Bpp16,
    Bpp24,
    Bpp32,
}

impl PixelDepth {
    pub const ALL: [PixelDepth; 7] = [
        Self::Bpp1,
        Self::Bpp2,
        Self::Bpp4,
        Self::Bpp8,
        Self::Bpp16,
        Self::Bpp24,
        Self::Bpp32,
    ];

    pub fn bits(self) -> u8 {
        match self {
            Self::Bpp1 => 1,
            Self::Bpp2 => 2,
            Self::Bpp4 => 4,
            Self::Bpp8 => 8,
            Self::Bpp16 => 16,
            Self::Bpp24 => 24,
            Self::Bpp32 => 32,
        }
    }

    /// Depths below 8 bits pack several pixels per byte.
    pub fn is_packed(self) -> bool {
        self.bits() < 8
    }

    /// Bytes per row for `width` pixels: `ceil(width * bpp / 8)`.
    pub fn stride(self, width: u32) -> usize {
        (width as usize * usize::from(self.bits()) + 7) >> 3
    }

    /// Mask selecting the meaningful bits of a color value.
    pub fn color_mask(self) -> u32 {
        match self {
            Self::Bpp32 => u32::MAX,
            other => (1u32 << other.bits()) - 1,
        }
    }
}

impl TryFrom<u8> for PixelDepth {
    type Error = CoreError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            1 => Ok(Self::Bpp1),
            2 => Ok(Self::Bpp2),
            4 => Ok(Self::Bpp4),
            8 => Ok(Self::Bpp8),
            16 => Ok(Self::Bpp16),
            24 => Ok(Self::Bpp24),
            32 => Ok(Self::Bpp32),
            other => Err(CoreError::UnsupportedBitsPerPixel(other)),
        }
    }
}

impl From<PixelDepth> for u8 {
    fn from(depth: PixelDepth) -> u8 {
        depth.bits()
    }
}

impl fmt::Display for PixelDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bpp", self.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_from_origin_size() {
        let rect = Rect::from_origin_size(Point::new(10, 20), 5, 7);
        assert_eq!(rect.pt2, Point::new(14, 26));
        assert_eq!(rect.width(), 5);
        assert_eq!(rect.height(), 7);
        assert!(!rect.is_empty());
    }

    #[test]
    fn test_rect_saturates_near_i32_max() {
        let rect = Rect::from_origin_size(Point::new(i32::MAX - 1, i32::MAX - 2), 5, 3);
        assert_eq!(rect.pt2, Point::new(i32::MAX, i32::MAX));
        assert_eq!(rect.width(), 2);
        assert_eq!(rect.height(), 3);

        let span = Rect::new(Point::new(i32::MIN, 0), Point::new(i32::MAX, 0));
        assert_eq!(span.width(), i32::MAX);
    }

    #[test]
    fn test_rect_intersect_disjoint_is_empty() {
        let a = Rect::from_origin_size(Point::new(0, 0), 4, 4);
        let b = Rect::from_origin_size(Point::new(10, 10), 4, 4);
        assert!(a.intersect(&b).is_empty());
    }

    #[test]
    fn test_character_code_values() {
        assert_eq!(CharacterCode::Single(0x41).value(), 0x41);
        assert_eq!(CharacterCode::Double(0x9E81).value(), 0x9E81);
        assert!(CharacterCode::Double(0xB0A1).is_double());
        assert_eq!(CharacterCode::Single(b'a').byte_len(), 1);
        assert_eq!(CharacterCode::Double(0xB0A1).byte_len(), 2);
        assert_eq!(CharacterCode::Double(0x9E81).to_string(), "0x9e81");
    }

    #[test]
    fn test_metrics_cell_size() {
        let m = GlyphMetrics::new(9, 12, 1, 3);
        assert_eq!(m.cell_width(), 10);
        assert_eq!(m.cell_height(), 15);
        assert_eq!(m.bitmap_stride(), 2);
    }

    #[test]
    fn test_bitmap_length_checked() {
        let m = GlyphMetrics::new(9, 2, 0, 0);
        assert_eq!(
            GlyphBitmap::new(m, vec![0; 3]),
            Err(CoreError::BitmapLength { expected: 4, actual: 3 })
        );
        assert!(GlyphBitmap::new(m, vec![0; 4]).is_ok());
    }

    #[test]
    fn test_bitmap_from_ascii_rows() {
        let glyph = GlyphBitmap::from_ascii_rows(&["#..#", ".##."], 1, 0);
        assert_eq!(glyph.metrics.width, 4);
        assert_eq!(glyph.metrics.height, 2);
        assert_eq!(glyph.data(), &[0b1001_0000, 0b0110_0000]);
        assert!(glyph.pixel(0, 0));
        assert!(!glyph.pixel(1, 0));
        assert!(glyph.pixel(2, 1));
        assert!(!glyph.pixel(7, 1));
    }

    #[test]
    fn test_pixel_depth_stride() {
        assert_eq!(PixelDepth::Bpp1.stride(9), 2);
        assert_eq!(PixelDepth::Bpp2.stride(5), 2);
        assert_eq!(PixelDepth::Bpp4.stride(3), 2);
        assert_eq!(PixelDepth::Bpp8.stride(3), 3);
        assert_eq!(PixelDepth::Bpp16.stride(3), 6);
        assert_eq!(PixelDepth::Bpp24.stride(3), 9);
        assert_eq!(PixelDepth::Bpp32.stride(3), 12);
    }

    #[test]
    fn test_pixel_depth_from_bits() {
        for depth in PixelDepth::ALL {
            assert_eq!(PixelDepth::try_from(depth.bits()), Ok(depth));
        }
        assert_eq!(
            PixelDepth::try_from(3),
            Err(CoreError::UnsupportedBitsPerPixel(3))
        );
    }

    #[test]
    fn test_pixel_depth_serde_as_integer() {
        let json = serde_json::to_string(&PixelDepth::Bpp16).unwrap();
        assert_eq!(json, "16");
        let depth: PixelDepth = serde_json::from_str("2").unwrap();
        assert_eq!(depth, PixelDepth::Bpp2);
        assert!(serde_json::from_str::<PixelDepth>("12").is_err());
    }

    #[test]
    fn test_color_mask() {
        assert_eq!(PixelDepth::Bpp1.color_mask(), 0x1);
        assert_eq!(PixelDepth::Bpp4.color_mask(), 0xF);
        assert_eq!(PixelDepth::Bpp24.color_mask(), 0xFF_FFFF);
        assert_eq!(PixelDepth::Bpp32.color_mask(), u32::MAX);
    }
}
