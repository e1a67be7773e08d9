//! # glyphblit-layout
//!
//! Cursor-advance text layout: turns a Unicode string into a row of glyph
//! blits on a window surface.
//!
//! ```text
//!  text ──▶ EncodingConverter ──▶ CodeUnitDecoder ──▶ for each code:
//!                                                      FontSource lookup
//!                                                      fill + rasterize
//!                                                      BlitTarget.blit
//!                                                      cursor.x += advance
//! ```
//!
//! - [`engine`] — [`TextLayoutEngine`], its errors and per-call statistics.

pub mod engine;

pub use engine::{LayoutError, RenderStats, TextLayoutEngine};
