//! String layout and glyph caching for real-time text rendering.
//!
//! `glyphcache` decides what to shape, what to cache and how to keep the
//! caches consistent. Given a string with inline color/style directives it
//! strips the directives, splits the text into bidi and style runs, picks a
//! font for every run through fallback resolution, shapes each run and packs
//! the glyph images into atlas pages. The result is an [`Entry`] that can be
//! drawn every frame with nothing but array lookups.
//!
//! # Crates
//!
//! - `glyphcache-config`: [`TextConfig`] and its YAML persistence
//! - `glyphcache-fonts`: the [`TextShapingBackend`] contract, fallback
//!   resolution and the outline font backend
//! - `glyphcache-atlas`: texture page packing and the
//!   [`GraphicsResourceContext`] seam
//! - this crate: directive parsing, run segmentation, the string cache and
//!   the [`TextEngine`] facade
//!
//! # Threading
//!
//! All caching happens on the thread that owns the graphics resource, gated
//! by [`GraphicsResourceContext::is_resource_current`]. There are no locks;
//! off-thread callers only ever get disposable entries.

pub mod directive;
pub mod engine;
pub mod entry;
pub mod error;
pub mod key;
pub mod metrics;
pub mod segment;
pub mod string_cache;

pub use directive::{DirectiveRun, RenderStyle, StrippedText, strip_directives};
pub use engine::TextEngine;
pub use entry::{Entry, Glyph};
pub use error::LayoutError;
pub use key::Key;
pub use segment::{RunSegmenter, StyleRun};
pub use string_cache::{LayoutContext, StringLayoutCache};

// Collaborator types callers need to build an engine
pub use glyphcache_atlas::{
    GlyphAtlasCache, GlyphImageRegion, GraphicsResourceContext, MemoryGraphicsContext,
    NoGraphicsContext, PageId,
};
pub use glyphcache_config::{BaselineMode, TextConfig};
pub use glyphcache_fonts::{Direction, FontStyle, TextShapingBackend};
