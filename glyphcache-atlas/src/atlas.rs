//! Glyph atlas: packs rasterized glyph images into texture pages.
//!
//! Every (font, glyph code) pair is rendered once and stored in a fixed
//! region of some page. Regions are never moved or freed individually; the
//! only way to reclaim space is [`GlyphAtlasCache::invalidate`], which drops
//! everything at once.

use std::collections::HashMap;

use glyphcache_config::TextConfig;
use glyphcache_fonts::{FontKey, RasterizedGlyph, ShapedRun, TextShapingBackend};

use crate::context::{GraphicsResourceContext, PageId, PixelRect};
use crate::error::AtlasError;
use crate::packer::ShelfPacker;

/// Where a glyph image lives inside the atlas.
///
/// Valid until the whole atlas is invalidated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphImageRegion {
    /// Texture page holding the image
    pub page: PageId,
    /// Image size in pixels
    pub width: u32,
    pub height: u32,
    /// Normalized texture coordinates of the top-left corner
    pub u1: f32,
    pub v1: f32,
    /// Normalized texture coordinates of the bottom-right corner
    pub u2: f32,
    pub v2: f32,
    /// Offset from the glyph origin to the left edge of the image, in pixels
    pub offset_x: i32,
    /// Offset from the glyph origin down to the top edge of the image, in pixels
    pub offset_y: i32,
    /// The image carries its own colors (emoji) instead of a coverage mask
    pub is_colored: bool,
}

impl GlyphImageRegion {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Combine a per-atlas font id with a font-specific glyph code.
///
/// The font id forms the upper 32 bits, so equal codes from different fonts
/// never collide.
pub fn glyph_key(font_id: u32, glyph_code: u32) -> u64 {
    ((font_id as u64) << 32) | glyph_code as u64
}

/// Packs glyph images into fixed-size texture pages and remembers where.
pub struct GlyphAtlasCache {
    packer: ShelfPacker,

    /// RGBA copy of the page currently being filled
    staging: Vec<u8>,

    /// Page currently being filled
    current_page: Option<PageId>,

    /// Every page allocated since the last invalidation
    pages: Vec<PageId>,

    /// Font id assigned to each font on first use
    font_ids: HashMap<FontKey, u32>,

    /// Region of every cached glyph, keyed by [`glyph_key`]
    regions: HashMap<u64, GlyphImageRegion>,
}

impl std::fmt::Debug for GlyphAtlasCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphAtlasCache")
            .field("page_size", &self.packer.page_size())
            .field("pages", &self.pages.len())
            .field("fonts", &self.font_ids.len())
            .field("glyphs", &self.regions.len())
            .finish()
    }
}

impl GlyphAtlasCache {
    pub fn new(page_width: u32, page_height: u32, border: u32) -> Self {
        Self {
            packer: ShelfPacker::new(page_width, page_height, border),
            staging: vec![0; (page_width as usize) * (page_height as usize) * 4],
            current_page: None,
            pages: Vec::new(),
            font_ids: HashMap::new(),
            regions: HashMap::new(),
        }
    }

    pub fn from_config(config: &TextConfig) -> Self {
        Self::new(
            config.atlas_page_width,
            config.atlas_page_height,
            config.glyph_border,
        )
    }

    /// Id of `font`, if any of its glyphs have been cached.
    pub fn font_id(&self, font: &FontKey) -> Option<u32> {
        self.font_ids.get(font).copied()
    }

    fn font_id_or_insert(&mut self, font: &FontKey) -> u32 {
        if let Some(&id) = self.font_ids.get(font) {
            return id;
        }
        let id = self.font_ids.len() as u32;
        self.font_ids.insert(font.clone(), id);
        log::debug!("Assigned atlas font id {} to {:?}", id, font);
        id
    }

    /// Region of an already cached glyph.
    pub fn lookup(&self, font: &FontKey, glyph_code: u32) -> Option<GlyphImageRegion> {
        let font_id = self.font_id(font)?;
        self.regions.get(&glyph_key(font_id, glyph_code)).copied()
    }

    /// Make sure every glyph code used by `run` has a region.
    ///
    /// If any code is new the whole run is rasterized once, so hinting and
    /// kerning context match the layout; codes already cached are skipped
    /// when the images are copied into pages. Each touched page gets one
    /// upload of its changed rectangle.
    ///
    /// # Errors
    /// Page allocation, upload and rasterization failures propagate
    /// unchanged. Regions placed before the failure stay valid.
    pub fn cache_glyphs(
        &mut self,
        font: &dyn TextShapingBackend,
        run: &ShapedRun,
        gfx: &mut dyn GraphicsResourceContext,
    ) -> Result<(), AtlasError> {
        if !gfx.is_resource_current() {
            return Err(AtlasError::ResourceNotCurrent);
        }

        let font_id = self.font_id_or_insert(font.font_key());
        let has_new = run
            .glyphs
            .iter()
            .any(|g| !self.regions.contains_key(&glyph_key(font_id, g.glyph_id)));
        if !has_new {
            return Ok(());
        }

        let images = font.rasterize_run(run)?;
        let mut dirty: Option<PixelRect> = None;

        for (glyph, image) in run.glyphs.iter().zip(images) {
            // Repeated codes in one run are only stored once
            let key = glyph_key(font_id, glyph.glyph_id);
            if self.regions.contains_key(&key) {
                continue;
            }
            let image = image.unwrap_or_else(RasterizedGlyph::empty);
            let region = match self.store(&image, gfx, &mut dirty) {
                Ok(region) => region,
                Err(e) => {
                    // Keep what was already packed on the current page visible
                    self.flush(gfx, dirty)?;
                    return Err(e);
                }
            };
            self.regions.insert(key, region);
        }

        self.flush(gfx, dirty)
    }

    /// Pack one image, starting a new page when needed.
    fn store(
        &mut self,
        image: &RasterizedGlyph,
        gfx: &mut dyn GraphicsResourceContext,
        dirty: &mut Option<PixelRect>,
    ) -> Result<GlyphImageRegion, AtlasError> {
        let (page_width, page_height) = self.packer.page_size();

        // Zero-area glyphs sit at the cursor without consuming space
        if image.is_empty() {
            let page = self.ensure_page(gfx, dirty)?;
            let (x, y) = self.packer.cursor();
            return Ok(self.region(page, PixelRect::new(x, y, 0, 0), image));
        }

        let slot = self
            .packer
            .place(image.width, image.height)
            .ok_or(AtlasError::GlyphTooLarge {
                width: image.width,
                height: image.height,
                page_width,
                page_height,
                border: self.packer.border(),
            })?;

        let page = if slot.new_page {
            self.flush(gfx, dirty.take())?;
            self.allocate_page(gfx)?
        } else {
            match self.current_page {
                Some(page) => page,
                None => self.allocate_page(gfx)?,
            }
        };

        let rect = PixelRect::new(slot.x, slot.y, image.width, image.height);
        self.blit(rect, &image.pixels);
        *dirty = Some(match dirty.take() {
            Some(area) => area.union(&rect),
            None => rect,
        });
        Ok(self.region(page, rect, image))
    }

    fn region(&self, page: PageId, rect: PixelRect, image: &RasterizedGlyph) -> GlyphImageRegion {
        let (page_width, page_height) = self.packer.page_size();
        let (pw, ph) = (page_width as f32, page_height as f32);
        GlyphImageRegion {
            page,
            width: rect.width,
            height: rect.height,
            u1: rect.x as f32 / pw,
            v1: rect.y as f32 / ph,
            u2: rect.right() as f32 / pw,
            v2: rect.bottom() as f32 / ph,
            offset_x: image.bearing_x,
            offset_y: -image.bearing_y,
            is_colored: image.is_colored,
        }
    }

    /// The page being filled, allocating the first one if needed.
    fn ensure_page(
        &mut self,
        gfx: &mut dyn GraphicsResourceContext,
        dirty: &mut Option<PixelRect>,
    ) -> Result<PageId, AtlasError> {
        if let Some(page) = self.current_page {
            return Ok(page);
        }
        self.flush(gfx, dirty.take())?;
        self.packer.start_page();
        self.allocate_page(gfx)
    }

    fn allocate_page(&mut self, gfx: &mut dyn GraphicsResourceContext) -> Result<PageId, AtlasError> {
        let (width, height) = self.packer.page_size();
        let page = match gfx.allocate_texture_page(width, height) {
            Ok(page) => page,
            Err(e) => {
                // Nothing is on the page the packer just started
                self.packer.reset();
                self.current_page = None;
                return Err(e);
            }
        };
        self.staging.fill(0);
        self.current_page = Some(page);
        self.pages.push(page);
        log::info!(
            "Allocated glyph atlas page {:?} ({}x{}, {} pages total)",
            page,
            width,
            height,
            self.pages.len()
        );
        Ok(page)
    }

    /// Copy tightly packed RGBA pixels into the staging image.
    fn blit(&mut self, rect: PixelRect, pixels: &[u8]) {
        let (page_width, _) = self.packer.page_size();
        let row_bytes = rect.width as usize * 4;
        let page_row_bytes = page_width as usize * 4;
        for (row, src) in pixels.chunks_exact(row_bytes).take(rect.height as usize).enumerate() {
            let start = (rect.y as usize + row) * page_row_bytes + rect.x as usize * 4;
            self.staging[start..start + row_bytes].copy_from_slice(src);
        }
    }

    /// Upload the changed part of the current page.
    fn flush(
        &mut self,
        gfx: &mut dyn GraphicsResourceContext,
        dirty: Option<PixelRect>,
    ) -> Result<(), AtlasError> {
        let (Some(rect), Some(page)) = (dirty, self.current_page) else {
            return Ok(());
        };
        if rect.is_empty() {
            return Ok(());
        }

        let (page_width, _) = self.packer.page_size();
        let page_row_bytes = page_width as usize * 4;
        let row_bytes = rect.width as usize * 4;
        let mut buffer = Vec::with_capacity(row_bytes * rect.height as usize);
        for row in rect.y..rect.bottom() {
            let start = row as usize * page_row_bytes + rect.x as usize * 4;
            buffer.extend_from_slice(&self.staging[start..start + row_bytes]);
        }
        gfx.upload_subregion(page, rect, &buffer)
    }

    /// Drop every region, font id and page.
    ///
    /// Pages are released through `gfx` only when it is current; otherwise
    /// they are just forgotten. The next glyph starts a fresh page.
    pub fn invalidate(&mut self, gfx: &mut dyn GraphicsResourceContext) {
        if gfx.is_resource_current() {
            for page in self.pages.drain(..) {
                gfx.release_page(page);
            }
        } else if !self.pages.is_empty() {
            log::debug!(
                "Graphics resource not current, forgetting {} atlas pages without release",
                self.pages.len()
            );
            self.pages.clear();
        }
        self.font_ids.clear();
        self.regions.clear();
        self.current_page = None;
        self.packer.reset();
        log::info!("Glyph atlas invalidated");
    }

    /// Number of pages allocated since the last invalidation.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Pages allocated since the last invalidation, oldest first.
    pub fn pages(&self) -> &[PageId] {
        &self.pages
    }

    /// Number of cached (font, glyph code) pairs.
    pub fn glyph_count(&self) -> usize {
        self.regions.len()
    }

    /// Number of fonts with an assigned id.
    pub fn font_count(&self) -> usize {
        self.font_ids.len()
    }

    /// Page width and height in pixels.
    pub fn page_size(&self) -> (u32, u32) {
        self.packer.page_size()
    }
}
