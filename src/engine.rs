//! The text engine: one owner for fonts, atlas, string cache and graphics
//! resource.
//!
//! Everything here runs on the thread that owns the graphics resource. A
//! [`TextEngine`] built over [`NoGraphicsContext`] never caches anything and
//! is suitable for metrics on any thread.

use std::rc::Rc;

use anyhow::{Context, Result};
use glyphcache_atlas::{GlyphAtlasCache, GraphicsResourceContext, NoGraphicsContext};
use glyphcache_config::TextConfig;
use glyphcache_fonts::{FontFallbackResolver, FontSet, FontStyle, TextShapingBackend};

use crate::entry::{Entry, Glyph};
use crate::error::LayoutError;
use crate::string_cache::{LayoutContext, StringLayoutCache};

pub struct TextEngine<G: GraphicsResourceContext = NoGraphicsContext> {
    config: TextConfig,
    fonts: FontFallbackResolver,
    atlas: GlyphAtlasCache,
    strings: StringLayoutCache,
    gfx: G,
}

impl<G: GraphicsResourceContext> std::fmt::Debug for TextEngine<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextEngine")
            .field("fonts", &self.fonts.fonts().len())
            .field("atlas", &self.atlas)
            .field("strings", &self.strings)
            .finish()
    }
}

impl TextEngine<NoGraphicsContext> {
    /// An engine for metrics only. Layouts are computed on every call.
    pub fn headless(
        config: TextConfig,
        fonts: Vec<Rc<dyn TextShapingBackend>>,
    ) -> Result<Self, LayoutError> {
        Self::new(config, fonts, NoGraphicsContext)
    }
}

impl<G: GraphicsResourceContext> TextEngine<G> {
    /// Build an engine over `fonts` in priority order and pre-warm digits.
    ///
    /// # Errors
    /// Fails if the configuration is invalid, `fonts` is empty, or the digit
    /// pre-warm cannot be shaped or packed.
    pub fn new(
        config: TextConfig,
        fonts: Vec<Rc<dyn TextShapingBackend>>,
        gfx: G,
    ) -> Result<Self, LayoutError> {
        config.validate()?;
        let mut engine = Self {
            fonts: FontFallbackResolver::new(fonts)?,
            atlas: GlyphAtlasCache::from_config(&config),
            strings: StringLayoutCache::new(&config),
            config,
            gfx,
        };
        let mut ctx = LayoutContext {
            fonts: &engine.fonts,
            atlas: &mut engine.atlas,
            gfx: &mut engine.gfx,
        };
        engine.strings.prewarm_digits(&mut ctx)?;
        Ok(engine)
    }

    /// Build an engine over the system fonts selected by `config`.
    pub fn from_system_fonts(config: TextConfig, gfx: G) -> Result<Self> {
        let font_set = FontSet::load(&config)?;
        log::info!("Text engine using {} fonts", font_set.len());
        Self::new(config, font_set.backends(), gfx).context("Failed to initialize text engine")
    }

    /// Layout of a borrowed string, cached while the resource is current.
    pub fn layout(&mut self, text: &str) -> Result<Rc<Entry>, LayoutError> {
        let mut ctx = LayoutContext {
            fonts: &self.fonts,
            atlas: &mut self.atlas,
            gfx: &mut self.gfx,
        };
        self.strings.layout(text, &mut ctx)
    }

    /// Layout of a shared string, cached while `text` is alive.
    pub fn layout_shared(&mut self, text: &Rc<str>) -> Result<Rc<Entry>, LayoutError> {
        let mut ctx = LayoutContext {
            fonts: &self.fonts,
            atlas: &mut self.atlas,
            gfx: &mut self.gfx,
        };
        self.strings.layout_shared(text, &mut ctx)
    }

    /// Drop every glyph image and string layout, then pre-warm digits again.
    ///
    /// The atlas goes first so no entry outlives the regions it points at.
    pub fn invalidate(&mut self) -> Result<(), LayoutError> {
        self.atlas.invalidate(&mut self.gfx);
        let mut ctx = LayoutContext {
            fonts: &self.fonts,
            atlas: &mut self.atlas,
            gfx: &mut self.gfx,
        };
        self.strings.invalidate(&mut ctx)
    }

    /// Switch to a new configuration.
    ///
    /// Invalidates everything when the change affects rendering and returns
    /// whether it did. Font-level settings (family, size, hinting, baseline)
    /// only reach fonts built after the change; pass them to
    /// [`TextEngine::replace_fonts`].
    pub fn apply_config(&mut self, config: TextConfig) -> Result<bool, LayoutError> {
        config.validate()?;
        let affects_rendering = self.config.affects_rendering(&config);
        let geometry_changed = self.atlas.page_size() != (config.atlas_page_width, config.atlas_page_height)
            || self.config.glyph_border != config.glyph_border;
        let capacity_changed = self.config.untracked_string_capacity != config.untracked_string_capacity;

        if geometry_changed {
            self.atlas.invalidate(&mut self.gfx);
            self.atlas = GlyphAtlasCache::from_config(&config);
        }
        if affects_rendering || capacity_changed {
            self.strings.reconfigure(&config);
        }
        self.config = config;

        if affects_rendering {
            log::info!("Text configuration changed, invalidating caches");
            self.invalidate()?;
        } else if capacity_changed {
            let mut ctx = LayoutContext {
                fonts: &self.fonts,
                atlas: &mut self.atlas,
                gfx: &mut self.gfx,
            };
            self.strings.prewarm_digits(&mut ctx)?;
        }
        Ok(affects_rendering)
    }

    /// Swap the font list and invalidate everything.
    pub fn replace_fonts(&mut self, fonts: Vec<Rc<dyn TextShapingBackend>>) -> Result<(), LayoutError> {
        self.fonts = FontFallbackResolver::new(fonts)?;
        self.invalidate()
    }

    /// Pre-warmed glyph of `digit` (0-9) in `style`.
    pub fn digit_glyph(&self, style: FontStyle, digit: usize) -> Option<&Glyph> {
        self.strings.digit_glyph(style, digit)
    }

    pub fn config(&self) -> &TextConfig {
        &self.config
    }

    pub fn fonts(&self) -> &FontFallbackResolver {
        &self.fonts
    }

    pub fn atlas(&self) -> &GlyphAtlasCache {
        &self.atlas
    }

    pub fn string_cache(&self) -> &StringLayoutCache {
        &self.strings
    }

    pub fn string_cache_mut(&mut self) -> &mut StringLayoutCache {
        &mut self.strings
    }

    pub fn graphics(&self) -> &G {
        &self.gfx
    }

    pub fn graphics_mut(&mut self) -> &mut G {
        &mut self.gfx
    }
}
