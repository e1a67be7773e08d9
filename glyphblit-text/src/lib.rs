//! # glyphblit-text
//!
//! Text front end of the glyphblit pipeline: converts Unicode strings into
//! a legacy double-byte codepage, splits the result into character codes,
//! and resolves codes to pre-rendered glyph bitmaps.
//!
//! ## Architecture
//!
//! ```text
//! "诸葛高 AB" (UTF-8)
//!     │
//!     ▼
//! EncodingConverter (encoding_rs)  ──► GB2312 bytes, NUL padded
//!     │
//!     ▼
//! CodeUnitDecoder                  ──► Double(0xD6EE) … Single(0x41)
//!     │
//!     ▼
//! FontSource::glyph_bitmap(font, code) ──► &GlyphBitmap
//! ```
//!
//! - **`encoding`** — label-based byte encoding conversion.
//! - **`decoder`** — mixed single/double-byte code-unit decoding.
//! - **`fonts`** — font-asset boundary and an in-memory bitmap font registry.

pub mod decoder;
pub mod encoding;
pub mod fonts;

// Re-exports for ergonomic use.
pub use decoder::{decode, CodeUnitDecoder, DecodeStop};
pub use encoding::{convert, ConversionError, EncodingConverter};
pub use fonts::{BitmapFontSet, FontRegistry, FontSource};
