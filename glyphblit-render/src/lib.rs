//! # glyphblit-render
//!
//! Pixel-level half of the glyphblit pipeline: the per-glyph scratch
//! buffer, the depth-specialised rasterizer, the blit boundary with a
//! software framebuffer, and the per-window context that waits for the
//! display to come up.
//!
//! ## Architecture
//!
//! ```text
//!  GlyphBitmap (1 bpp, from the font source)
//!       │
//!       ▼
//!  GlyphBuffer.fill_background()     ◀─── background color, once per glyph
//!       │
//!       ▼
//!  GlyphRasterizer.rasterize()       ◀─── renderer picked once per depth
//!       │
//!       ▼
//!  BlitTarget.blit()                 ◀─── window surface (Framebuffer)
//! ```
//!
//! ## Crate modules
//!
//! - [`buffer`] — glyph scratch buffer and background fill
//! - [`rasterizer`] — per-depth glyph renderers
//! - [`surface`] — blit boundary and in-memory framebuffer
//! - [`events`] — window events and their handler trait
//! - [`context`] — readiness gate and per-window render context
//! - [`config`] — rendering configuration

pub mod buffer;
pub mod config;
pub mod context;
pub mod events;
pub mod rasterizer;
pub mod surface;

// Re-exports for convenience
pub use buffer::{pack_background, GlyphBuffer, GlyphCell, RenderError};
pub use config::{ConfigError, RenderConfig};
pub use context::{DisplayGeometry, RenderContext, WindowReadinessGate};
pub use events::{dispatch, WindowEvent, WindowEventHandler};
pub use rasterizer::{rasterize, GlyphRasterizer};
pub use surface::{BlitError, BlitTarget, Framebuffer};
