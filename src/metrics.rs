//! String measurement and word wrapping on top of cached layouts.
//!
//! Every query lays the string out through the engine, so a query made
//! while the graphics resource is current also warms the cache for the
//! following draw.

use glyphcache_atlas::GraphicsResourceContext;

use crate::directive::format_prefix;
use crate::engine::TextEngine;
use crate::error::LayoutError;

impl<G: GraphicsResourceContext> TextEngine<G> {
    /// Total advance of `text` in layout units.
    pub fn string_width(&mut self, text: &str) -> Result<f32, LayoutError> {
        if text.is_empty() {
            return Ok(0.0);
        }
        Ok(self.layout(text)?.advance)
    }

    /// Line height of `text` in layout units.
    pub fn string_height(&mut self, text: &str) -> Result<f32, LayoutError> {
        if text.is_empty() {
            return Ok(0.0);
        }
        Ok(self.layout(text)?.height)
    }

    /// Distance from the top of the line box to the baseline of `text`.
    pub fn string_baseline(&mut self, text: &str) -> Result<f32, LayoutError> {
        if text.is_empty() {
            return Ok(0.0);
        }
        Ok(self.layout(text)?.ascent)
    }

    pub fn char_width(&mut self, c: char) -> Result<f32, LayoutError> {
        let mut buffer = [0u8; 4];
        self.string_width(c.encode_utf8(&mut buffer))
    }

    /// Char index in `text` where the part exceeding `width` begins.
    ///
    /// Glyph advances are summed in logical order. With `break_at_spaces`
    /// the cut moves back to the last space before it, and a newline always
    /// ends the fitting part. Returns the char length of `text` when all of
    /// it fits.
    pub fn size_string(&mut self, text: &str, width: f32, break_at_spaces: bool) -> Result<usize, LayoutError> {
        if text.is_empty() {
            return Ok(0);
        }
        let chars: Vec<char> = text.chars().collect();
        let entry = self.layout(text)?;
        let glyphs = &entry.glyphs;

        let mut space_at = None;
        let mut advance = 0.0;
        let mut index = 0;
        while index < glyphs.len() && advance <= width {
            if break_at_spaces {
                match chars.get(glyphs[index].string_index) {
                    Some(' ') => space_at = Some(index),
                    Some('\n') => {
                        space_at = Some(index);
                        break;
                    }
                    _ => {}
                }
            }
            let next = advance + glyphs[index].advance;
            if next > width {
                break;
            }
            advance = next;
            index += 1;
        }

        // Avoid splitting words
        if index < glyphs.len()
            && let Some(space) = space_at
            && space < index
        {
            index = space;
        }

        Ok(glyphs
            .get(index)
            .map(|glyph| glyph.string_index)
            .unwrap_or(chars.len()))
    }

    /// The longest prefix of `text` (or suffix, with `reverse`) that fits `width`.
    pub fn trim_string_to_width(&mut self, text: &str, width: f32, reverse: bool) -> Result<String, LayoutError> {
        if !reverse {
            let length = self.size_string(text, width, false)?;
            return Ok(text.chars().take(length).collect());
        }

        let reversed: String = text.chars().rev().collect();
        let length = self.size_string(&reversed, width, false)?;
        let mut kept: Vec<char> = reversed.chars().take(length).collect();
        kept.reverse();
        Ok(kept.into_iter().collect())
    }

    /// Greedy word wrap of formatted text into lines no wider than `width`.
    ///
    /// Each continuation line starts with the directives active where the
    /// previous line was cut. One space or newline is consumed at every
    /// break, and every line holds at least one character.
    pub fn wrap_formatted_string(&mut self, text: &str, width: f32) -> Result<Vec<String>, LayoutError> {
        let marker = self.config().directive_marker;
        let mut lines = Vec::new();
        let mut remaining: Vec<char> = text.chars().collect();

        while !remaining.is_empty() {
            let line_text: String = remaining.iter().collect();
            let mut end = self.size_string(&line_text, width, true)?;

            // Force progress when not even the first visible char fits
            if end < remaining.len() {
                let first_visible = self
                    .layout(&line_text)?
                    .glyphs
                    .first()
                    .map(|glyph| glyph.string_index + 1)
                    .unwrap_or(remaining.len());
                end = end.max(first_visible).min(remaining.len());
            }

            let line: String = remaining[..end].iter().collect();
            let separator = matches!(remaining.get(end), Some(' ') | Some('\n'));
            let rest = &remaining[(end + usize::from(separator)).min(remaining.len())..];
            if rest.is_empty() {
                lines.push(line);
                break;
            }

            let mut next: Vec<char> = format_prefix(&line, marker).chars().collect();
            next.extend_from_slice(rest);
            lines.push(line);
            remaining = next;
        }

        Ok(lines)
    }

    /// Directives needed to continue `text` with its formatting.
    pub fn format_prefix(&self, text: &str) -> String {
        format_prefix(text, self.config().directive_marker)
    }
}
