//! The graphics resource the atlas uploads glyph pages into.
//!
//! The atlas never talks to a GPU API directly. It allocates pages, uploads
//! dirty rectangles and releases pages through [`GraphicsResourceContext`],
//! and checks [`GraphicsResourceContext::is_resource_current`] before any of
//! that. Only the thread owning the resource sees it as current, which keeps
//! every mutation of the caches on that thread without any locking.

use std::collections::HashMap;

use crate::error::AtlasError;

/// Handle of one texture page owned by a graphics resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

/// A rectangle in page pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &PixelRect) -> PixelRect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        PixelRect {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    pub fn intersects(&self, other: &PixelRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// The capability the atlas needs from the rendering layer.
pub trait GraphicsResourceContext {
    /// True only on the thread that owns the graphics resource.
    fn is_resource_current(&self) -> bool;

    /// Allocate a new, fully transparent RGBA texture page.
    fn allocate_texture_page(&mut self, width: u32, height: u32) -> Result<PageId, AtlasError>;

    /// Copy tightly packed RGBA8 pixels into `rect` of `page`.
    fn upload_subregion(
        &mut self,
        page: PageId,
        rect: PixelRect,
        rgba: &[u8],
    ) -> Result<(), AtlasError>;

    /// Free a page. Regions on it must no longer be drawn.
    fn release_page(&mut self, page: PageId);
}

/// A context that is never current.
///
/// Useful for metrics-only callers: layouts computed through it are never
/// cached and never touch the atlas.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGraphicsContext;

impl GraphicsResourceContext for NoGraphicsContext {
    fn is_resource_current(&self) -> bool {
        false
    }

    fn allocate_texture_page(&mut self, _width: u32, _height: u32) -> Result<PageId, AtlasError> {
        Err(AtlasError::ResourceNotCurrent)
    }

    fn upload_subregion(
        &mut self,
        _page: PageId,
        _rect: PixelRect,
        _rgba: &[u8],
    ) -> Result<(), AtlasError> {
        Err(AtlasError::ResourceNotCurrent)
    }

    fn release_page(&mut self, _page: PageId) {}
}

/// A CPU-side texture page.
#[derive(Debug, Clone)]
pub struct MemoryPage {
    pub width: u32,
    pub height: u32,
    /// RGBA8 pixels, row-major
    pub pixels: Vec<u8>,
}

impl MemoryPage {
    /// RGBA value at (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y * self.width + x) * 4) as usize;
        let px = self.pixels.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// A graphics resource backed by plain memory.
///
/// Serves headless rendering and tests: pages are byte buffers, an optional
/// page limit simulates device exhaustion and the "current" flag can be
/// toggled to imitate calls from a thread that does not own the resource.
#[derive(Debug)]
pub struct MemoryGraphicsContext {
    pages: HashMap<PageId, MemoryPage>,
    next_id: u32,
    page_limit: Option<usize>,
    current: bool,
    uploads: usize,
    released: usize,
}

impl Default for MemoryGraphicsContext {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGraphicsContext {
    /// A current context with no page limit.
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            next_id: 1,
            page_limit: None,
            current: true,
            uploads: 0,
            released: 0,
        }
    }

    /// A current context that refuses to hold more than `limit` live pages.
    pub fn with_page_limit(limit: usize) -> Self {
        Self {
            page_limit: Some(limit),
            ..Self::new()
        }
    }

    pub fn set_current(&mut self, current: bool) {
        self.current = current;
    }

    pub fn page(&self, id: PageId) -> Option<&MemoryPage> {
        self.pages.get(&id)
    }

    /// Number of allocated and not yet released pages.
    pub fn live_pages(&self) -> usize {
        self.pages.len()
    }

    /// Number of successful `upload_subregion` calls.
    pub fn upload_count(&self) -> usize {
        self.uploads
    }

    /// Number of `release_page` calls that freed a page.
    pub fn released_count(&self) -> usize {
        self.released
    }
}

impl GraphicsResourceContext for MemoryGraphicsContext {
    fn is_resource_current(&self) -> bool {
        self.current
    }

    fn allocate_texture_page(&mut self, width: u32, height: u32) -> Result<PageId, AtlasError> {
        if !self.current {
            return Err(AtlasError::ResourceNotCurrent);
        }
        if let Some(limit) = self.page_limit
            && self.pages.len() >= limit
        {
            return Err(AtlasError::PageAllocation(format!(
                "page limit of {} reached",
                limit
            )));
        }

        let id = PageId(self.next_id);
        self.next_id += 1;
        self.pages.insert(
            id,
            MemoryPage {
                width,
                height,
                pixels: vec![0; (width as usize) * (height as usize) * 4],
            },
        );
        Ok(id)
    }

    fn upload_subregion(
        &mut self,
        page: PageId,
        rect: PixelRect,
        rgba: &[u8],
    ) -> Result<(), AtlasError> {
        if !self.current {
            return Err(AtlasError::ResourceNotCurrent);
        }
        let target = self.pages.get_mut(&page).ok_or_else(|| AtlasError::Upload {
            page,
            reason: "unknown page".to_string(),
        })?;
        if rect.right() > target.width || rect.bottom() > target.height {
            return Err(AtlasError::Upload {
                page,
                reason: format!("{:?} exceeds {}x{} page", rect, target.width, target.height),
            });
        }
        let row_bytes = rect.width as usize * 4;
        if rgba.len() != row_bytes * rect.height as usize {
            return Err(AtlasError::Upload {
                page,
                reason: format!("expected {} bytes, got {}", row_bytes * rect.height as usize, rgba.len()),
            });
        }

        let page_row_bytes = target.width as usize * 4;
        for (row, src) in rgba.chunks_exact(row_bytes.max(1)).enumerate() {
            let start = (rect.y as usize + row) * page_row_bytes + rect.x as usize * 4;
            target.pixels[start..start + row_bytes].copy_from_slice(src);
        }
        self.uploads += 1;
        Ok(())
    }

    fn release_page(&mut self, page: PageId) {
        if self.pages.remove(&page).is_some() {
            self.released += 1;
        }
    }
}
