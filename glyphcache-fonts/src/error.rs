//! Typed error types for glyphcache-fonts.

use thiserror::Error;

/// Failures raised by font backends and fallback resolution.
///
/// Every variant stems from static configuration or asset problems; callers
/// never retry them.
#[derive(Debug, Error)]
pub enum FontError {
    /// A resolver was built from an empty font list.
    #[error("At least one font is required for text layout")]
    NoFonts,

    /// The font bytes could not be parsed as an OpenType face.
    #[error("Invalid font data for '{family}' (face {face_index})")]
    InvalidFontData {
        /// Family the data was loaded for.
        family: String,
        /// Face index inside the font file.
        face_index: u32,
    },

    /// The backend could not shape the requested character run.
    #[error("Shaping failed in font '{font}': {reason}")]
    Shaping {
        /// Family or face name of the failing font.
        font: String,
        /// Human-readable reason.
        reason: String,
    },
}
