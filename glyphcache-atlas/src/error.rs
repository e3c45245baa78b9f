//! Typed error types for glyphcache-atlas.
//!
//! Every failure here comes from static configuration or asset problems
//! (page sizes, font files, an exhausted graphics device). None of them is
//! retried.

use glyphcache_fonts::FontError;
use thiserror::Error;

use crate::context::PageId;

/// Failures raised while packing glyphs or talking to the graphics resource.
#[derive(Debug, Error)]
pub enum AtlasError {
    // -----------------------------------------------------------------------
    // Graphics resource
    // -----------------------------------------------------------------------
    /// A new texture page could not be allocated.
    #[error("Texture page allocation failed: {0}")]
    PageAllocation(String),

    /// Pixel data could not be copied into a texture page.
    #[error("Texture upload to page {page:?} failed: {reason}")]
    Upload {
        /// Page the upload targeted.
        page: PageId,
        /// Human-readable reason.
        reason: String,
    },

    /// Glyphs were packed while the graphics resource was not current.
    #[error("Graphics resource is not current on this thread")]
    ResourceNotCurrent,

    // -----------------------------------------------------------------------
    // Packing
    // -----------------------------------------------------------------------
    /// A glyph image does not fit on an empty page.
    #[error(
        "Glyph of {width}x{height} pixels does not fit a {page_width}x{page_height} page with a {border} pixel border"
    )]
    GlyphTooLarge {
        width: u32,
        height: u32,
        page_width: u32,
        page_height: u32,
        border: u32,
    },

    // -----------------------------------------------------------------------
    // Font backend
    // -----------------------------------------------------------------------
    /// The font backend failed to rasterize a run.
    #[error(transparent)]
    Font(#[from] FontError),
}
