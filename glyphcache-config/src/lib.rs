//! Configuration system for the glyphcache text layout engine.
//!
//! This crate provides configuration loading, saving, validation and default
//! values for font selection, glyph atlas geometry and string caching.

pub mod config;
pub mod defaults;
pub mod error;

// Re-export main types for convenience
pub use config::{BaselineMode, TextConfig};
pub use error::ConfigError;
