//! Font data types and structures for font management.

use std::sync::Arc;
use swash::{CacheKey, FontRef};

use crate::backend::FontStyle;
use crate::error::FontError;

/// Stores font bytes together with the location of one face inside them.
///
/// The bytes are shared, so cloning is cheap and several faces of one
/// collection (.ttc) can point at the same buffer. Swash and rustybuzz views
/// are rebuilt on demand from the stored offset and cache key.
#[derive(Clone)]
pub struct FontData {
    /// Family name the face was loaded under
    pub name: String,
    /// Raw font data bytes (TTF/OTF/TTC)
    pub data: Arc<Vec<u8>>,
    /// Face index within the font data (0 for single-face fonts)
    pub face_index: u32,
    offset: u32,
    key: CacheKey,
}

impl std::fmt::Debug for FontData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontData")
            .field("name", &self.name)
            .field("face_index", &self.face_index)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl FontData {
    /// Create a new FontData from bytes using face index 0.
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Result<Self, FontError> {
        Self::new_with_index(name, Arc::new(data), 0)
    }

    /// Create a new FontData from shared bytes with a specific face index.
    ///
    /// # Errors
    /// Returns [`FontError::InvalidFontData`] if the bytes do not contain a
    /// parsable face at `face_index`.
    pub fn new_with_index(
        name: impl Into<String>,
        data: Arc<Vec<u8>>,
        face_index: u32,
    ) -> Result<Self, FontError> {
        let name = name.into();
        let parsed = FontRef::from_index(data.as_slice(), face_index as usize)
            .map(|font_ref| (font_ref.offset, font_ref.key));
        let Some((offset, key)) = parsed else {
            return Err(FontError::InvalidFontData {
                family: name,
                face_index,
            });
        };
        Ok(FontData {
            name,
            data,
            face_index,
            offset,
            key,
        })
    }

    /// Swash view of the face for charmap, metrics and rasterization.
    pub fn font_ref(&self) -> FontRef<'_> {
        FontRef {
            data: self.data.as_slice(),
            offset: self.offset,
            key: self.key,
        }
    }

    /// Rustybuzz view of the face for shaping.
    pub fn shaping_face(&self) -> Result<rustybuzz::Face<'_>, FontError> {
        rustybuzz::Face::from_slice(self.data.as_slice(), self.face_index).ok_or_else(|| {
            FontError::InvalidFontData {
                family: self.name.clone(),
                face_index: self.face_index,
            }
        })
    }

    /// True if the face maps `c` to a real glyph.
    pub fn has_glyph(&self, c: char) -> bool {
        self.font_ref().charmap().map(c) != 0
    }
}

/// A regular face plus the dedicated styled faces found for its family.
///
/// Styles without a dedicated face are synthesized from the regular face.
#[derive(Debug, Clone)]
pub struct FontFaces {
    pub regular: FontData,
    pub bold: Option<FontData>,
    pub italic: Option<FontData>,
    pub bold_italic: Option<FontData>,
}

impl FontFaces {
    /// Faces with only a regular member.
    pub fn regular_only(regular: FontData) -> Self {
        Self {
            regular,
            bold: None,
            italic: None,
            bold_italic: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.regular.name
    }

    /// The dedicated face for `style`, if one was loaded.
    pub fn styled(&self, style: FontStyle) -> Option<&FontData> {
        match style.table_index() {
            1 => self.bold.as_ref(),
            2 => self.italic.as_ref(),
            3 => self.bold_italic.as_ref(),
            _ => None,
        }
    }

    /// The face used to render `style`, and the style bits it must synthesize.
    pub fn face_for(&self, style: FontStyle) -> (&FontData, FontStyle) {
        match self.styled(style) {
            Some(face) => (face, FontStyle::PLAIN),
            None => (&self.regular, style),
        }
    }

    /// Number of loaded faces (1 to 4).
    pub fn face_count(&self) -> usize {
        1 + self.bold.is_some() as usize
            + self.italic.is_some() as usize
            + self.bold_italic.is_some() as usize
    }
}
