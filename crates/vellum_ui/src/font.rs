//! Font metrics consumed by text layout and the draw list.
//!
//! Rasterization and atlas packing happen elsewhere. The host hands in a
//! [`FontAtlas`] describing where each glyph sits in one texture; this module
//! only measures text and looks glyphs up.

use std::collections::HashMap;
use vellum_core::Vec2;

/// Opaque texture handle, resolved by the host renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// Placement of one glyph.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Glyph {
    /// Horizontal pen advance.
    pub advance: f32,
    /// Quad offset from the pen position (top of the line).
    pub offset: Vec2,
    /// Quad size. Zero for whitespace.
    pub size: Vec2,
    /// Top-left UV in the atlas.
    pub uv_min: Vec2,
    /// Bottom-right UV in the atlas.
    pub uv_max: Vec2,
}

impl Glyph {
    /// Returns true if the glyph produces no quad.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }
}

/// A single font face at a single size.
#[derive(Debug, Clone)]
pub struct Font {
    /// Line height in pixels.
    pub size: f32,
    /// Distance from the top of the line to the baseline.
    pub ascent: f32,
    glyphs: HashMap<char, Glyph>,
    /// Used for characters missing from `glyphs`.
    fallback: Glyph,
}

impl Font {
    /// Creates a font without glyphs.
    #[must_use]
    pub fn new(size: f32, ascent: f32) -> Self {
        Self {
            size,
            ascent,
            glyphs: HashMap::new(),
            fallback: Glyph {
                advance: size * 0.5,
                ..Glyph::default()
            },
        }
    }

    /// Adds or replaces a glyph.
    pub fn insert_glyph(&mut self, c: char, glyph: Glyph) {
        self.glyphs.insert(c, glyph);
    }

    /// Sets the glyph drawn for unknown characters.
    pub fn set_fallback(&mut self, glyph: Glyph) {
        self.fallback = glyph;
    }

    /// Looks up a glyph, falling back for unknown characters.
    #[must_use]
    pub fn glyph(&self, c: char) -> &Glyph {
        self.glyphs.get(&c).unwrap_or(&self.fallback)
    }

    /// Number of known glyphs.
    #[must_use]
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Width of a single line, ignoring newlines.
    #[must_use]
    pub fn line_width(&self, text: &str) -> f32 {
        text.chars()
            .filter(|&c| c != '\n')
            .map(|c| self.glyph(c).advance)
            .sum()
    }

    /// Size of a block of text. Lines are separated by `'\n'`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn calc_text_size(&self, text: &str) -> Vec2 {
        if text.is_empty() {
            return Vec2::new(0.0, self.size);
        }
        let mut lines = 0usize;
        let mut width = 0.0_f32;
        for line in text.split('\n') {
            lines += 1;
            width = width.max(self.line_width(line));
        }
        Vec2::new(width, self.size * lines as f32)
    }

    /// Byte offset of the character boundary nearest to `x` pixels into `line`.
    #[must_use]
    pub fn offset_at_x(&self, line: &str, x: f32) -> usize {
        let mut pen = 0.0;
        for (index, c) in line.char_indices() {
            let advance = self.glyph(c).advance;
            if x < pen + advance * 0.5 {
                return index;
            }
            pen += advance;
        }
        line.len()
    }
}

/// Glyph data and the texture it lives in.
#[derive(Debug, Clone)]
pub struct FontAtlas {
    /// Atlas texture.
    pub texture: TextureId,
    /// UV of a fully white texel, used for untextured geometry.
    pub white_uv: Vec2,
    /// The font.
    pub font: Font,
}

impl FontAtlas {
    /// Creates an atlas description.
    #[must_use]
    pub fn new(texture: TextureId, white_uv: Vec2, font: Font) -> Self {
        Self {
            texture,
            white_uv,
            font,
        }
    }

    /// Fixed-width ASCII atlas laid out as a 16x6 grid of cells.
    ///
    /// Texel (0, 0) is assumed white. Useful for tests and headless hosts.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn monospace(texture: TextureId, advance: f32, line_height: f32) -> Self {
        const COLUMNS: u32 = 16;
        const ROWS: u32 = 6;
        let mut font = Font::new(line_height, line_height * 0.8);
        for code in 0x20u32..0x80 {
            let Some(c) = char::from_u32(code) else { continue };
            let cell = code - 0x20;
            let (col, row) = ((cell % COLUMNS) as f32, (cell / COLUMNS) as f32);
            let uv_min = Vec2::new(col / COLUMNS as f32, row / ROWS as f32);
            let uv_max = Vec2::new((col + 1.0) / COLUMNS as f32, (row + 1.0) / ROWS as f32);
            let size = if c == ' ' { Vec2::ZERO } else { Vec2::new(advance, line_height) };
            font.insert_glyph(
                c,
                Glyph {
                    advance,
                    offset: Vec2::ZERO,
                    size,
                    uv_min,
                    uv_max,
                },
            );
        }
        if let Some(question) = font.glyphs.get(&'?').copied() {
            font.set_fallback(question);
        }
        Self::new(texture, Vec2::ZERO, font)
    }
}
