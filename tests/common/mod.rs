//! Shared integration test helpers for glyphcache.
//!
//! Provides a scripted in-memory font backend and engine factories so no
//! test depends on the fonts installed on the machine.
//!
//! Rust integration tests use `mod common;` to bring in these helpers. The
//! `#![allow(dead_code)]` attribute suppresses warnings when only a subset
//! of helpers are used per file.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use glyphcache::{MemoryGraphicsContext, TextConfig, TextEngine, TextShapingBackend};
use glyphcache_fonts::{
    Direction, FontError, FontKey, FontStyle, RasterizedGlyph, ShapedGlyph, ShapedRun,
};

/// Advance of every scripted glyph in font pixels.
pub const ADVANCE: f32 = 8.0;
pub const ASCENT: f32 = 12.0;
pub const DESCENT: f32 = 4.0;

/// Character rendered as an image too large for any atlas page.
pub const OVERSIZED: char = '@';

/// Call counters shared by a font and every instance derived from it.
#[derive(Debug, Default)]
pub struct Calls {
    pub shape: Cell<usize>,
    pub rasterize: Cell<usize>,
}

impl Calls {
    pub fn shapes(&self) -> usize {
        self.shape.get()
    }

    pub fn rasterizations(&self) -> usize {
        self.rasterize.get()
    }
}

/// A font with one glyph per character, code equal to the code point.
///
/// Every glyph advances by [`ADVANCE`]; spaces have empty images.
pub struct ScriptedFont {
    key: FontKey,
    /// Characters this font displays; `None` displays everything
    coverage: Option<Rc<Vec<char>>>,
    calls: Rc<Calls>,
}

impl ScriptedFont {
    pub fn new(name: &str) -> Self {
        Self {
            key: FontKey::new(name, FontStyle::PLAIN, 16.0),
            coverage: None,
            calls: Rc::new(Calls::default()),
        }
    }

    /// Restrict the font to the characters of `chars`.
    pub fn covering(mut self, chars: &str) -> Self {
        self.coverage = Some(Rc::new(chars.chars().collect()));
        self
    }

    pub fn calls(&self) -> Rc<Calls> {
        Rc::clone(&self.calls)
    }

    pub fn into_backend(self) -> Rc<dyn TextShapingBackend> {
        Rc::new(self)
    }
}

impl TextShapingBackend for ScriptedFont {
    fn font_key(&self) -> &FontKey {
        &self.key
    }

    fn covers(&self, c: char) -> bool {
        match &self.coverage {
            Some(chars) => chars.contains(&c),
            None => true,
        }
    }

    fn shape(
        &self,
        text: &[char],
        start: usize,
        limit: usize,
        direction: Direction,
    ) -> Result<ShapedRun, FontError> {
        self.calls.shape.set(self.calls.shape.get() + 1);
        let mut glyphs: Vec<ShapedGlyph> = (start..limit)
            .map(|cluster| ShapedGlyph {
                glyph_id: text[cluster] as u32,
                cluster,
                x_advance: ADVANCE,
                x_offset: 0.0,
                y_offset: 0.0,
            })
            .collect();
        if direction.is_rtl() {
            glyphs.reverse();
        }
        Ok(ShapedRun {
            start,
            limit,
            direction,
            total_advance: ADVANCE * glyphs.len() as f32,
            glyphs,
            ascent: ASCENT,
            descent: DESCENT,
        })
    }

    fn rasterize_run(&self, run: &ShapedRun) -> Result<Vec<Option<RasterizedGlyph>>, FontError> {
        self.calls.rasterize.set(self.calls.rasterize.get() + 1);
        Ok(run
            .glyphs
            .iter()
            .map(|g| match char::from_u32(g.glyph_id) {
                Some(' ') => None,
                Some(OVERSIZED) => Some(solid_image(4096, 8)),
                _ => Some(solid_image(4, 6)),
            })
            .collect())
    }

    fn derive(&self, style: FontStyle) -> Rc<dyn TextShapingBackend> {
        Rc::new(ScriptedFont {
            key: FontKey::new(self.key.name.clone(), style, self.key.size()),
            coverage: self.coverage.clone(),
            calls: Rc::clone(&self.calls),
        })
    }
}

fn solid_image(width: u32, height: u32) -> RasterizedGlyph {
    RasterizedGlyph {
        width,
        height,
        bearing_x: 0,
        bearing_y: height as i32,
        pixels: vec![255; (width * height * 4) as usize],
        is_colored: false,
    }
}

/// An engine over one scripted font and a current in-memory resource.
pub fn memory_engine() -> (TextEngine<MemoryGraphicsContext>, Rc<Calls>) {
    memory_engine_with(TextConfig::default())
}

pub fn memory_engine_with(config: TextConfig) -> (TextEngine<MemoryGraphicsContext>, Rc<Calls>) {
    let font = ScriptedFont::new("Scripted");
    let calls = font.calls();
    let engine = TextEngine::new(config, vec![font.into_backend()], MemoryGraphicsContext::new())
        .expect("engine should build over a scripted font");
    (engine, calls)
}

/// String indices of an entry's glyphs, in stored order.
pub fn indices(entry: &glyphcache::Entry) -> Vec<usize> {
    entry.glyphs.iter().map(|glyph| glyph.string_index).collect()
}
