//! Text engine configuration.
//!
//! `TextConfig` collects every setting that influences how strings are laid
//! out and how glyph images are packed. Any change to a style-affecting field
//! at runtime requires a full cache invalidation by the owner of the engine.

use crate::defaults;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Largest accepted atlas page edge in pixels.
const MAX_PAGE_EDGE: u32 = 8192;

/// How the ascent stored on each laid-out glyph is derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BaselineMode {
    /// Use the font's own ascender metric, scaled to the font size.
    #[default]
    FontAscent,
    /// Use the tallest top bearing among common printable ASCII characters.
    CommonChars,
    /// Use a fixed offset in font pixels (scaled like every other metric).
    Fixed(f32),
}

/// Configuration for fonts, atlas geometry and string caching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
    /// Primary font family; `None` picks the first available fallback family.
    #[serde(default)]
    pub font_family: Option<String>,

    /// Additional families searched after the primary, in priority order.
    #[serde(default = "defaults::fallback_families")]
    pub fallback_families: Vec<String>,

    /// Pixel size used for shaping and rasterization.
    #[serde(default = "defaults::font_size")]
    pub font_size: f32,

    /// Scale from atlas pixels to layout units.
    #[serde(default = "defaults::texture_scale")]
    pub texture_scale: f32,

    /// Render glyph masks with anti-aliased coverage.
    #[serde(default = "defaults::anti_alias")]
    pub anti_alias: bool,

    /// Apply font hinting while rasterizing.
    #[serde(default = "defaults::hinting")]
    pub hinting: bool,

    /// Baseline derivation for glyph ascent.
    #[serde(default)]
    pub baseline: BaselineMode,

    /// Width in pixels of every atlas texture page.
    #[serde(default = "defaults::atlas_page_width")]
    pub atlas_page_width: u32,

    /// Height in pixels of every atlas texture page.
    #[serde(default = "defaults::atlas_page_height")]
    pub atlas_page_height: u32,

    /// Transparent margin in pixels kept around every packed glyph.
    #[serde(default = "defaults::glyph_border")]
    pub glyph_border: u32,

    /// Character that introduces an inline color/style directive.
    #[serde(default = "defaults::directive_marker")]
    pub directive_marker: char,

    /// Number of borrowed strings whose cache keys are pinned by recency.
    #[serde(default = "defaults::untracked_string_capacity")]
    pub untracked_string_capacity: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font_family: None,
            fallback_families: defaults::fallback_families(),
            font_size: defaults::font_size(),
            texture_scale: defaults::texture_scale(),
            anti_alias: defaults::anti_alias(),
            hinting: defaults::hinting(),
            baseline: BaselineMode::default(),
            atlas_page_width: defaults::atlas_page_width(),
            atlas_page_height: defaults::atlas_page_height(),
            glyph_border: defaults::glyph_border(),
            directive_marker: defaults::directive_marker(),
            untracked_string_capacity: defaults::untracked_string_capacity(),
        }
    }
}

impl TextConfig {
    /// Parse and validate a configuration from a YAML string.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: TextConfig = serde_yaml_ng::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::info!("Loading text config from {:?}", path);
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Save configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml_ng::to_string(self)?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml)?;
        fs::rename(&temp_path, path)?;
        log::info!("Saved text config to {:?}", path);
        Ok(())
    }

    /// Check semantic constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.font_size.is_nan() || self.font_size <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "font_size must be positive, got {}",
                self.font_size
            )));
        }
        if self.texture_scale.is_nan() || self.texture_scale <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "texture_scale must be positive, got {}",
                self.texture_scale
            )));
        }
        for (name, edge) in [
            ("atlas_page_width", self.atlas_page_width),
            ("atlas_page_height", self.atlas_page_height),
        ] {
            if edge == 0 || edge > MAX_PAGE_EDGE {
                return Err(ConfigError::Validation(format!(
                    "{name} must be between 1 and {MAX_PAGE_EDGE}, got {edge}"
                )));
            }
        }
        if self.glyph_border.saturating_mul(2) >= self.atlas_page_width.min(self.atlas_page_height) {
            return Err(ConfigError::Validation(format!(
                "glyph_border {} leaves no room on a {}x{} page",
                self.glyph_border, self.atlas_page_width, self.atlas_page_height
            )));
        }
        if self.untracked_string_capacity == 0 {
            return Err(ConfigError::Validation(
                "untracked_string_capacity must be at least 1".to_string(),
            ));
        }
        if self.directive_marker.is_ascii_alphanumeric() {
            return Err(ConfigError::Validation(format!(
                "directive_marker '{}' collides with directive codes",
                self.directive_marker
            )));
        }
        Ok(())
    }

    /// True if switching from `self` to `other` changes rendered glyph images
    /// or glyph positions, and therefore requires a full invalidation.
    pub fn affects_rendering(&self, other: &TextConfig) -> bool {
        self.font_family != other.font_family
            || self.fallback_families != other.fallback_families
            || self.font_size != other.font_size
            || self.texture_scale != other.texture_scale
            || self.anti_alias != other.anti_alias
            || self.hinting != other.hinting
            || self.baseline != other.baseline
            || self.atlas_page_width != other.atlas_page_width
            || self.atlas_page_height != other.atlas_page_height
            || self.glyph_border != other.glyph_border
            || self.directive_marker != other.directive_marker
    }
}
