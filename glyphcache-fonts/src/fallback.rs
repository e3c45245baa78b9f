//! Font fallback resolution over a priority-ordered font list.

use std::rc::Rc;

use crate::backend::{FontStyle, TextShapingBackend};
use crate::error::FontError;

/// The font chosen for a run starting at some offset, and where it must stop.
#[derive(Clone)]
pub struct FontRun {
    /// Font instance already derived to the requested style
    pub font: Rc<dyn TextShapingBackend>,
    /// Exclusive end of the characters `font` should render
    pub limit: usize,
}

impl std::fmt::Debug for FontRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontRun")
            .field("font", self.font.font_key())
            .field("limit", &self.limit)
            .finish()
    }
}

/// Picks which registered font renders each stretch of a character array.
///
/// Fonts are held in their plain style and derived to the requested style
/// on every lookup. The first font is also the missing-glyph font.
pub struct FontFallbackResolver {
    fonts: Vec<Rc<dyn TextShapingBackend>>,
}

impl FontFallbackResolver {
    /// Create a resolver over `fonts` in priority order.
    pub fn new(fonts: Vec<Rc<dyn TextShapingBackend>>) -> Result<Self, FontError> {
        if fonts.is_empty() {
            return Err(FontError::NoFonts);
        }
        log::debug!("Font fallback chain has {} fonts", fonts.len());
        Ok(Self { fonts })
    }

    /// Registered fonts in priority order.
    pub fn fonts(&self) -> &[Rc<dyn TextShapingBackend>] {
        &self.fonts
    }

    /// The font used when nothing else can display a character.
    pub fn default_font(&self) -> &Rc<dyn TextShapingBackend> {
        &self.fonts[0]
    }

    /// Find the font that renders `text` from `start`, and the limit it renders up to.
    ///
    /// The first font able to display `text[start]` wins and the limit shrinks
    /// to the end of its displayable stretch. Fonts skipped along the way still
    /// shrink the limit to the first later character they can display, so a
    /// higher-priority font is never bypassed by a lower-priority one. When
    /// no font displays `text[start]`, the first font renders it with its
    /// missing-glyph image.
    pub fn lookup_font(&self, text: &[char], start: usize, limit: usize, style: FontStyle) -> FontRun {
        let mut limit = limit;

        for font in &self.fonts {
            match font.can_display_through(text, start, limit) {
                None => {
                    return FontRun {
                        font: font.derive(style),
                        limit,
                    };
                }
                Some(up_to) if up_to != start => {
                    return FontRun {
                        font: font.derive(style),
                        limit: up_to,
                    };
                }
                Some(_) => {
                    if let Some(from) = font.can_display_from(text, start, limit) {
                        limit = limit.min(from);
                    }
                }
            }
        }

        if let Some(&c) = text.get(start) {
            log::warn!(
                "No font can display '{}' (U+{:04X}), using missing glyph of {}",
                c,
                c as u32,
                self.default_font().font_key().name
            );
        }
        FontRun {
            font: self.default_font().derive(style),
            limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Direction, FontKey, RasterizedGlyph, ShapedRun};

    struct CoverageFont {
        key: FontKey,
        covered: Vec<char>,
    }

    impl CoverageFont {
        fn new(name: &str, covered: &str) -> Rc<dyn TextShapingBackend> {
            Rc::new(Self {
                key: FontKey::new(name, FontStyle::PLAIN, 16.0),
                covered: covered.chars().collect(),
            })
        }
    }

    impl TextShapingBackend for CoverageFont {
        fn font_key(&self) -> &FontKey {
            &self.key
        }

        fn covers(&self, c: char) -> bool {
            self.covered.contains(&c)
        }

        fn shape(
            &self,
            _text: &[char],
            start: usize,
            limit: usize,
            direction: Direction,
        ) -> Result<ShapedRun, FontError> {
            Ok(ShapedRun {
                start,
                limit,
                direction,
                glyphs: Vec::new(),
                ascent: 0.0,
                descent: 0.0,
                total_advance: 0.0,
            })
        }

        fn rasterize_run(&self, run: &ShapedRun) -> Result<Vec<Option<RasterizedGlyph>>, FontError> {
            Ok(vec![None; run.glyphs.len()])
        }

        fn derive(&self, style: FontStyle) -> Rc<dyn TextShapingBackend> {
            Rc::new(Self {
                key: FontKey::new(self.key.name.clone(), style, self.key.size()),
                covered: self.covered.clone(),
            })
        }
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_empty_font_list_is_rejected() {
        assert!(matches!(
            FontFallbackResolver::new(Vec::new()),
            Err(FontError::NoFonts)
        ));
    }

    #[test]
    fn test_primary_covers_everything() {
        let resolver = FontFallbackResolver::new(vec![CoverageFont::new("latin", "abc")]).unwrap();
        let text = chars("abc");
        let run = resolver.lookup_font(&text, 0, 3, FontStyle::PLAIN);
        assert_eq!(run.font.font_key().name, "latin");
        assert_eq!(run.limit, 3);
    }

    #[test]
    fn test_limit_shrinks_to_displayable_stretch() {
        let resolver = FontFallbackResolver::new(vec![
            CoverageFont::new("latin", "ab"),
            CoverageFont::new("hebrew", "\u{05D0}\u{05D1}"),
        ])
        .unwrap();
        let text = chars("ab\u{05D0}\u{05D1}");

        let first = resolver.lookup_font(&text, 0, 4, FontStyle::PLAIN);
        assert_eq!(first.font.font_key().name, "latin");
        assert_eq!(first.limit, 2);

        let second = resolver.lookup_font(&text, 2, 4, FontStyle::PLAIN);
        assert_eq!(second.font.font_key().name, "hebrew");
        assert_eq!(second.limit, 4);
    }

    #[test]
    fn test_skipped_font_caps_limit_of_later_font() {
        // "high" cannot display 'y' but can display 'x'; "low" covers both.
        // "low" must stop before 'x' so "high" gets to render it.
        let resolver = FontFallbackResolver::new(vec![
            CoverageFont::new("high", "x"),
            CoverageFont::new("low", "xy"),
        ])
        .unwrap();
        let text = chars("yyx");

        let run = resolver.lookup_font(&text, 0, 3, FontStyle::PLAIN);
        assert_eq!(run.font.font_key().name, "low");
        assert_eq!(run.limit, 2);

        let run = resolver.lookup_font(&text, 2, 3, FontStyle::PLAIN);
        assert_eq!(run.font.font_key().name, "high");
        assert_eq!(run.limit, 3);
    }

    #[test]
    fn test_undisplayable_falls_back_to_first_font_with_style() {
        let resolver = FontFallbackResolver::new(vec![
            CoverageFont::new("first", "a"),
            CoverageFont::new("second", "b"),
        ])
        .unwrap();
        let text = chars("??a");

        let run = resolver.lookup_font(&text, 0, 3, FontStyle::BOLD);
        assert_eq!(run.font.font_key().name, "first");
        assert_eq!(run.font.style(), FontStyle::BOLD);
        // The placeholder stretch ends where "first" can display again.
        assert_eq!(run.limit, 2);
    }

    #[test]
    fn test_derives_requested_style() {
        let resolver = FontFallbackResolver::new(vec![CoverageFont::new("latin", "a")]).unwrap();
        let text = chars("a");
        let style = FontStyle::BOLD | FontStyle::ITALIC;
        let run = resolver.lookup_font(&text, 0, 1, style);
        assert_eq!(run.font.style(), style);
    }
}
