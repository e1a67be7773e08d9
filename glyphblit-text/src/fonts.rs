//! Font registry: the font-asset boundary and an in-memory implementation.
//!
//! The layout engine only sees the [`FontSource`] trait: one lookup for a
//! font set's shared metrics and one for a glyph bitmap keyed by character
//! code. [`FontRegistry`] implements it over a map of [`BitmapFontSet`]s.
//!
//! ## Architecture
//!
//! ```text
//! FontRegistry
//!   └── sets: HashMap<FontId, BitmapFontSet>
//!         ├── descriptor: FontSetDescriptor   (max cell, space width)
//!         ├── glyphs: HashMap<u16, GlyphBitmap>
//!         └── fallback: Option<GlyphBitmap>   (box glyph for unknown codes)
//! ```

use std::collections::HashMap;

use glyphblit_core::{CharacterCode, FontId, FontSetDescriptor, GlyphBitmap, GlyphMetrics};
use log::debug;

/// GB2312 ideographic (full-width) space.
const IDEOGRAPHIC_SPACE: u16 = 0xA1A1;

/// Font-asset collaborator as seen by the layout engine.
pub trait FontSource {
    /// Shared metrics of a font set, or `None` if the id is unknown.
    fn font_set(&self, font: FontId) -> Option<FontSetDescriptor>;

    /// Bitmap for `code`, or `None` if the code draws nothing (e.g. space).
    fn glyph_bitmap(&self, font: FontId, code: CharacterCode) -> Option<&GlyphBitmap>;
}

/// A fixed set of pre-rendered glyphs sharing one descriptor.
#[derive(Clone, Debug)]
pub struct BitmapFontSet {
    descriptor: FontSetDescriptor,
    glyphs: HashMap<u16, GlyphBitmap>,
    fallback: Option<GlyphBitmap>,
}

impl BitmapFontSet {
    /// Empty set; `max_width` / `max_height` grow as glyphs are inserted.
    pub fn new(space_width: u16) -> Self {
        Self {
            descriptor: FontSetDescriptor {
                max_width: 0,
                max_height: 0,
                space_width,
            },
            glyphs: HashMap::new(),
            fallback: None,
        }
    }

    /// A set that draws a hollow box for every visible code.
    ///
    /// Spaces and control codes stay blank. Stands in for real font data
    /// in demos and tests: every glyph has the same `width × height` box,
    /// drawn one pixel right of the cursor.
    pub fn placeholder(width: u16, height: u16, space_width: u16) -> Self {
        let mut set = Self::new(space_width);
        set.set_fallback(box_glyph(width, height));
        set
    }

    /// Add or replace the glyph for `code`.
    pub fn insert(&mut self, code: u16, bitmap: GlyphBitmap) -> Option<GlyphBitmap> {
        self.grow_to(&bitmap.metrics);
        self.glyphs.insert(code, bitmap)
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_glyph(mut self, code: u16, bitmap: GlyphBitmap) -> Self {
        self.insert(code, bitmap);
        self
    }

    /// Glyph returned for visible codes that have no entry of their own.
    pub fn set_fallback(&mut self, bitmap: GlyphBitmap) {
        self.grow_to(&bitmap.metrics);
        self.fallback = Some(bitmap);
    }

    pub fn descriptor(&self) -> FontSetDescriptor {
        self.descriptor
    }

    /// Number of explicitly inserted glyphs.
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Glyph for `code`, falling back to the box glyph for visible codes.
    pub fn glyph(&self, code: CharacterCode) -> Option<&GlyphBitmap> {
        let value = code.value();
        if let Some(glyph) = self.glyphs.get(&value) {
            return Some(glyph);
        }
        if is_blank(code) {
            return None;
        }
        self.fallback.as_ref()
    }

    fn grow_to(&mut self, metrics: &GlyphMetrics) {
        let width = u16::try_from(metrics.cell_width()).unwrap_or(u16::MAX);
        let height = u16::try_from(metrics.cell_height()).unwrap_or(u16::MAX);
        self.descriptor.max_width = self.descriptor.max_width.max(width);
        self.descriptor.max_height = self.descriptor.max_height.max(height);
    }
}

fn is_blank(code: CharacterCode) -> bool {
    match code {
        CharacterCode::Single(b) => b <= b' ' || b == 0x7F,
        CharacterCode::Double(v) => v == IDEOGRAPHIC_SPACE,
    }
}

fn box_glyph(width: u16, height: u16) -> GlyphBitmap {
    let (w, h) = (usize::from(width), usize::from(height));
    let rows: Vec<String> = (0..h)
        .map(|row| {
            (0..w)
                .map(|col| {
                    if row == 0 || row + 1 == h || col == 0 || col + 1 == w {
                        '#'
                    } else {
                        '.'
                    }
                })
                .collect()
        })
        .collect();
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    GlyphBitmap::from_ascii_rows(&rows, 1, 0)
}

/// In-memory font-asset collaborator.
#[derive(Clone, Debug, Default)]
pub struct FontRegistry {
    sets: HashMap<FontId, BitmapFontSet>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `set` under `id`, returning any set it replaces.
    pub fn register(&mut self, id: FontId, set: BitmapFontSet) -> Option<BitmapFontSet> {
        let desc = set.descriptor();
        debug!(
            "registered {id}: max {}x{}, space {}, {} glyphs",
            desc.max_width,
            desc.max_height,
            desc.space_width,
            set.glyph_count()
        );
        self.sets.insert(id, set)
    }

    pub fn get(&self, id: FontId) -> Option<&BitmapFontSet> {
        self.sets.get(&id)
    }

    /// Number of registered font sets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl FontSource for FontRegistry {
    fn font_set(&self, font: FontId) -> Option<FontSetDescriptor> {
        self.sets.get(&font).map(BitmapFontSet::descriptor)
    }

    fn glyph_bitmap(&self, font: FontId, code: CharacterCode) -> Option<&GlyphBitmap> {
        self.sets.get(&font)?.glyph(code)
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(width: usize, height: usize, xoffset: u16, yoffset: u16) -> GlyphBitmap {
        let row = "#".repeat(width);
        let rows: Vec<&str> = (0..height).map(|_| row.as_str()).collect();
        GlyphBitmap::from_ascii_rows(&rows, xoffset, yoffset)
    }

    #[test]
    fn test_empty_set_descriptor() {
        let set = BitmapFontSet::new(4);
        assert_eq!(
            set.descriptor(),
            FontSetDescriptor { max_width: 0, max_height: 0, space_width: 4 }
        );
        assert_eq!(set.glyph_count(), 0);
    }

    #[test]
    fn test_descriptor_grows_with_cells() {
        let set = BitmapFontSet::new(3)
            .with_glyph(0x41, glyph(5, 7, 1, 2))
            .with_glyph(0xB0A1, glyph(12, 6, 0, 0));
        let desc = set.descriptor();
        assert_eq!(desc.max_width, 12);
        assert_eq!(desc.max_height, 9);
        assert_eq!(set.glyph_count(), 2);
    }

    #[test]
    fn test_lookup_by_code_value() {
        let set = BitmapFontSet::new(3).with_glyph(0xB0A1, glyph(4, 4, 0, 0));
        assert!(set.glyph(CharacterCode::Double(0xB0A1)).is_some());
        assert!(set.glyph(CharacterCode::Double(0x9E81)).is_none());
        assert!(set.glyph(CharacterCode::Single(b'A')).is_none());
    }

    #[test]
    fn test_placeholder_blanks_spaces() {
        let set = BitmapFontSet::placeholder(8, 10, 4);
        assert!(set.glyph(CharacterCode::Single(b' ')).is_none());
        assert!(set.glyph(CharacterCode::Single(b'\t')).is_none());
        assert!(set.glyph(CharacterCode::Double(IDEOGRAPHIC_SPACE)).is_none());

        let g = set.glyph(CharacterCode::Double(0xD6EE)).unwrap();
        assert_eq!(g.metrics, GlyphMetrics::new(8, 10, 1, 0));
        assert!(g.pixel(0, 0));
        assert!(!g.pixel(3, 3));
        assert!(g.pixel(7, 9));
        assert_eq!(set.descriptor().max_width, 9);
        assert_eq!(set.descriptor().max_height, 10);
    }

    #[test]
    fn test_explicit_glyph_beats_fallback() {
        let mut set = BitmapFontSet::placeholder(8, 8, 4);
        set.insert(b' '.into(), glyph(2, 2, 0, 0));
        let g = set.glyph(CharacterCode::Single(b' ')).unwrap();
        assert_eq!(g.metrics.width, 2);
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = FontRegistry::new();
        assert!(registry.is_empty());
        registry.register(FontId(1), BitmapFontSet::placeholder(6, 6, 3));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.font_set(FontId(1)).unwrap().space_width, 3);
        assert!(registry.font_set(FontId(2)).is_none());
        assert!(registry
            .glyph_bitmap(FontId(1), CharacterCode::Single(b'A'))
            .is_some());
        assert!(registry
            .glyph_bitmap(FontId(2), CharacterCode::Single(b'A'))
            .is_none());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = FontRegistry::new();
        assert!(registry.register(FontId(1), BitmapFontSet::new(2)).is_none());
        let old = registry.register(FontId(1), BitmapFontSet::new(5));
        assert_eq!(old.unwrap().descriptor().space_width, 2);
        assert_eq!(registry.get(FontId(1)).unwrap().descriptor().space_width, 5);
    }
}
