//! Typed error types for string layout.

use glyphcache_atlas::AtlasError;
use glyphcache_config::ConfigError;
use glyphcache_fonts::FontError;
use thiserror::Error;

/// Failures that abort laying out one string.
///
/// Strings cached before the failure stay valid and renderable.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A font backend failed to shape or rasterize a run.
    #[error(transparent)]
    Font(#[from] FontError),

    /// Glyph images could not be packed or uploaded.
    #[error(transparent)]
    Atlas(#[from] AtlasError),

    /// A new configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
