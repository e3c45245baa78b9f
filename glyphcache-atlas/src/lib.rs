//! Glyph atlas packing and graphics resource abstraction for glyphcache.
//!
//! This crate provides:
//! - `GraphicsResourceContext`, the seam to whatever owns texture memory
//! - `ShelfPacker`, the line-by-line packing cursor for fixed-size pages
//! - `GlyphAtlasCache`, which rasterizes shaped runs once and hands out
//!   stable `GlyphImageRegion`s for every (font, glyph code) pair
//! - `NoGraphicsContext` and `MemoryGraphicsContext` for metrics-only and
//!   headless use

pub mod atlas;
pub mod context;
pub mod error;
pub mod packer;

// Re-export main types for convenience
pub use atlas::{GlyphAtlasCache, GlyphImageRegion, glyph_key};
pub use context::{
    GraphicsResourceContext, MemoryGraphicsContext, MemoryPage, NoGraphicsContext, PageId,
    PixelRect,
};
pub use error::AtlasError;
pub use packer::{ShelfPacker, Slot};
