//! Font loading and fallback chain assembly.
//!
//! This module discovers font families through the system font database and
//! turns them into an ordered list of outline font backends:
//! - Configured primary family (with bold/italic/bold-italic faces when installed)
//! - Configured fallback families
//! - Built-in fallback chain for comprehensive Unicode coverage

mod fallbacks;
mod loader;
mod types;

use std::rc::Rc;

use anyhow::{Context, Result};
use fontdb::Database;
use glyphcache_config::TextConfig;

use crate::backend::TextShapingBackend;
use crate::error::FontError;
use crate::outline::{OutlineFont, RenderOptions};
use crate::text_shaper::ShapingOptions;

pub use fallbacks::FALLBACK_FAMILIES;
pub use types::{FontData, FontFaces};

/// The ordered set of loaded outline fonts.
///
/// Index 0 is the primary font; it is also the font that draws missing-glyph
/// placeholders when nothing in the chain covers a character.
#[derive(Debug)]
pub struct FontSet {
    fonts: Vec<Rc<OutlineFont>>,
}

impl FontSet {
    /// Discover fonts on the system and build the fallback chain.
    ///
    /// Families that are not installed are skipped.
    ///
    /// # Errors
    /// Fails if not a single family of the chain could be loaded.
    pub fn load(config: &TextConfig) -> Result<Self> {
        let mut font_db = Database::new();

        // Load system fonts
        font_db.load_system_fonts();
        log::info!("Loaded {} system fonts", font_db.len());

        let configured = config.font_family.iter().chain(&config.fallback_families).count();
        let mut faces = Vec::new();
        for (position, family_name) in Self::family_chain(config).into_iter().enumerate() {
            match loader::load_family(&font_db, family_name) {
                Some(family) => {
                    log::debug!(
                        "Added font family: {} ({} faces)",
                        family_name,
                        family.face_count()
                    );
                    faces.push(family);
                }
                None if position < configured => {
                    log::warn!("Font family '{}' not found, skipping", family_name);
                }
                None => {}
            }
        }
        log::info!("Loaded {} font families", faces.len());

        Self::from_faces(faces, config).context("No usable font family found on this system")
    }

    /// Build a set from raw font faces, one family per face, in priority order.
    pub fn from_fonts(fonts: Vec<FontData>, config: &TextConfig) -> Result<Self, FontError> {
        Self::from_faces(fonts.into_iter().map(FontFaces::regular_only).collect(), config)
    }

    /// Build a set from already grouped families, in priority order.
    pub fn from_faces(faces: Vec<FontFaces>, config: &TextConfig) -> Result<Self, FontError> {
        if faces.is_empty() {
            return Err(FontError::NoFonts);
        }
        let options = RenderOptions::from_config(config);
        let fonts = faces
            .into_iter()
            .map(|family| {
                Rc::new(OutlineFont::new(
                    family,
                    options.clone(),
                    ShapingOptions::default(),
                ))
            })
            .collect();
        Ok(Self { fonts })
    }

    /// Family names to try, in priority order, without duplicates.
    fn family_chain(config: &TextConfig) -> Vec<&str> {
        let mut chain: Vec<&str> = Vec::new();
        let names = config
            .font_family
            .iter()
            .chain(&config.fallback_families)
            .map(String::as_str)
            .chain(FALLBACK_FAMILIES.iter().copied());
        for name in names {
            if !chain.iter().any(|known| known.eq_ignore_ascii_case(name)) {
                chain.push(name);
            }
        }
        chain
    }

    pub fn fonts(&self) -> &[Rc<OutlineFont>] {
        &self.fonts
    }

    /// The fonts as shaping backends, ready for a fallback resolver.
    pub fn backends(&self) -> Vec<Rc<dyn TextShapingBackend>> {
        self.fonts
            .iter()
            .map(|font| Rc::clone(font) as Rc<dyn TextShapingBackend>)
            .collect()
    }

    /// Get number of font families loaded.
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}
