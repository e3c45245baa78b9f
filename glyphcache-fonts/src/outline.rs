//! Outline font backend: rustybuzz shaping and swash rasterization.

use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

use glyphcache_config::{BaselineMode, TextConfig};
use swash::scale::image::{Content, Image};
use swash::scale::{Render, ScaleContext, Source, StrikeWith};
use swash::zeno::{Angle, Format, Transform};

use crate::backend::{
    Direction, FontKey, FontStyle, RasterizedGlyph, ShapedRun, TextShapingBackend,
};
use crate::error::FontError;
use crate::font_manager::{FontData, FontFaces};
use crate::text_shaper::{ShapingOptions, TextShaper};

/// Characters whose tallest top edge defines the `CommonChars` baseline.
const COMMON_CHARS: &str = "!\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{}~";

/// Glyph image sources in order of preference.
///
/// Color sources come first so emoji fonts render as colored bitmaps.
/// Regular text fonts have no color data and fall through to Outline.
const SOURCES: &[Source] = &[
    Source::ColorBitmap(StrikeWith::BestFit),
    Source::ColorOutline(0),
    Source::Outline,
];

/// Stroke widening, in pixels per pixel of font size, for synthesized bold.
const SYNTHETIC_BOLD_STRENGTH: f32 = 1.0 / 24.0;

/// Slant applied to synthesized italic.
const SYNTHETIC_ITALIC_DEGREES: f32 = 12.0;

/// Rasterization settings shared by every face of an outline font.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Pixel size used for shaping and rasterization
    pub size: f32,
    pub anti_alias: bool,
    pub hinting: bool,
    pub baseline: BaselineMode,
}

impl RenderOptions {
    pub fn from_config(config: &TextConfig) -> Self {
        Self {
            size: config.font_size,
            anti_alias: config.anti_alias,
            hinting: config.hinting,
            baseline: config.baseline,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_config(&TextConfig::default())
    }
}

/// State shared by all style instances derived from one family.
struct Family {
    faces: FontFaces,
    shaper: TextShaper,
    options: RenderOptions,
    scale_context: RefCell<ScaleContext>,
    /// `CommonChars` ascent per style, computed on first use
    common_ascent: [OnceCell<f32>; 4],
}

/// A font family rendered from TrueType/OpenType outlines.
///
/// Cloning or deriving shares the loaded faces and the scaler context; only
/// the style differs between instances.
#[derive(Clone)]
pub struct OutlineFont {
    family: Rc<Family>,
    key: FontKey,
}

impl std::fmt::Debug for OutlineFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutlineFont")
            .field("key", &self.key)
            .field("faces", &self.family.faces.face_count())
            .finish()
    }
}

impl OutlineFont {
    /// Create the plain-style instance of a family.
    pub fn new(faces: FontFaces, options: RenderOptions, shaping: ShapingOptions) -> Self {
        let key = FontKey::new(faces.name(), FontStyle::PLAIN, options.size);
        Self {
            family: Rc::new(Family {
                faces,
                shaper: TextShaper::new(shaping),
                options,
                scale_context: RefCell::new(ScaleContext::new()),
                common_ascent: Default::default(),
            }),
            key,
        }
    }

    pub fn faces(&self) -> &FontFaces {
        &self.family.faces
    }

    pub fn options(&self) -> &RenderOptions {
        &self.family.options
    }

    /// Face rendering this instance's style, and the style bits to synthesize.
    fn face(&self) -> (&FontData, FontStyle) {
        self.family.faces.face_for(self.key.style)
    }

    /// Distance from the baseline to the top of the line, per the baseline mode.
    pub fn ascent(&self) -> f32 {
        match self.family.options.baseline {
            BaselineMode::FontAscent => self.line_metrics().0,
            BaselineMode::CommonChars => *self.family.common_ascent[self.key.style.table_index()]
                .get_or_init(|| self.measure_common_ascent()),
            BaselineMode::Fixed(offset) => offset,
        }
    }

    /// Distance from the baseline to the bottom of the line.
    pub fn descent(&self) -> f32 {
        self.line_metrics().1
    }

    /// Font ascent and descent at the configured size, both positive.
    fn line_metrics(&self) -> (f32, f32) {
        let (face, _) = self.face();
        let metrics = face.font_ref().metrics(&[]).scale(self.family.options.size);
        (metrics.ascent, metrics.descent.abs())
    }

    /// Tallest top edge among the common printable ASCII characters.
    fn measure_common_ascent(&self) -> f32 {
        let (face, synthetic) = self.face();
        let font_ref = face.font_ref();
        let charmap = font_ref.charmap();
        let mut context = self.family.scale_context.borrow_mut();
        let mut scaler = context
            .builder(font_ref)
            .size(self.family.options.size)
            .hint(self.family.options.hinting)
            .build();
        let render = self.renderer(synthetic);

        let top = COMMON_CHARS
            .chars()
            .map(|c| charmap.map(c))
            .filter(|&id| id != 0)
            .filter_map(|id| render.render(&mut scaler, id))
            .map(|image| image.placement.top)
            .max()
            .unwrap_or(0);
        log::debug!("Common-chars ascent of {} is {}px", self.key.name, top);
        top as f32
    }

    /// Renderer for glyph images of this instance.
    fn renderer(&self, synthetic: FontStyle) -> Render<'static> {
        let mut render = Render::new(SOURCES);
        // No anti-aliasing still renders an alpha mask; it is thresholded later
        render.format(Format::Alpha);
        if synthetic.contains(FontStyle::BOLD) {
            render.embolden(self.family.options.size * SYNTHETIC_BOLD_STRENGTH);
        }
        if synthetic.contains(FontStyle::ITALIC) {
            render.transform(Some(Transform::skew(
                Angle::from_degrees(SYNTHETIC_ITALIC_DEGREES),
                Angle::from_degrees(0.0),
            )));
        }
        render
    }

    /// Convert a swash image to an RGBA glyph image.
    fn to_rasterized(&self, image: Image) -> RasterizedGlyph {
        let (pixels, is_colored) = match image.content {
            Content::Color => (image.data, true),
            Content::Mask => {
                let anti_alias = self.family.options.anti_alias;
                let mut pixels = Vec::with_capacity(image.data.len() * 4);
                for &mask in &image.data {
                    // Without anti-aliasing, threshold the alpha to create crisp edges
                    let alpha = match (anti_alias, mask > 127) {
                        (true, _) => mask,
                        (false, true) => 255,
                        (false, false) => 0,
                    };
                    pixels.extend_from_slice(&[255, 255, 255, alpha]);
                }
                (pixels, false)
            }
            Content::SubpixelMask => (subpixel_mask_to_rgba(&image), false),
        };

        RasterizedGlyph {
            width: image.placement.width,
            height: image.placement.height,
            bearing_x: image.placement.left,
            bearing_y: image.placement.top,
            pixels,
            is_colored,
        }
    }
}

impl TextShapingBackend for OutlineFont {
    fn font_key(&self) -> &FontKey {
        &self.key
    }

    fn covers(&self, c: char) -> bool {
        self.face().0.has_glyph(c)
    }

    fn shape(
        &self,
        text: &[char],
        start: usize,
        limit: usize,
        direction: Direction,
    ) -> Result<ShapedRun, FontError> {
        if start > limit || limit > text.len() {
            return Err(FontError::Shaping {
                font: self.key.name.clone(),
                reason: format!("run {}..{} outside {} chars", start, limit, text.len()),
            });
        }

        let (face, _) = self.face();
        let shaping_face = face.shaping_face()?;
        let glyphs = self.family.shaper.shape(
            &shaping_face,
            text,
            start,
            limit,
            direction,
            self.family.options.size,
        );
        if glyphs.is_empty() && start < limit {
            return Err(FontError::Shaping {
                font: self.key.name.clone(),
                reason: format!("no glyphs for {} chars", limit - start),
            });
        }
        let total_advance = glyphs.iter().map(|g| g.x_advance).sum();
        log::debug!(
            "Shaped {} chars into {} glyphs with {}",
            limit.saturating_sub(start),
            glyphs.len(),
            self.key.name
        );

        Ok(ShapedRun {
            start,
            limit,
            direction,
            glyphs,
            ascent: self.ascent(),
            descent: self.descent(),
            total_advance,
        })
    }

    fn rasterize_run(&self, run: &ShapedRun) -> Result<Vec<Option<RasterizedGlyph>>, FontError> {
        let (face, synthetic) = self.face();
        let render = self.renderer(synthetic);
        let mut context = self.family.scale_context.borrow_mut();

        // Apply hinting based on config setting
        let mut scaler = context
            .builder(face.font_ref())
            .size(self.family.options.size)
            .hint(self.family.options.hinting)
            .build();

        let images = run
            .glyphs
            .iter()
            .map(|glyph| {
                let image = u16::try_from(glyph.glyph_id)
                    .ok()
                    .and_then(|id| render.render(&mut scaler, id));
                if image.is_none() {
                    log::warn!(
                        "Glyph {} of {} failed to rasterize",
                        glyph.glyph_id,
                        self.key.name
                    );
                }
                image.map(|image| self.to_rasterized(image))
            })
            .collect();
        Ok(images)
    }

    fn derive(&self, style: FontStyle) -> Rc<dyn TextShapingBackend> {
        Rc::new(OutlineFont {
            family: Rc::clone(&self.family),
            key: FontKey::new(self.key.name.clone(), style, self.family.options.size),
        })
    }
}

/// Convert a swash subpixel mask into an RGBA alpha mask.
/// Some swash builds emit 3 bytes/pixel (RGB), others 4 bytes/pixel (RGBA).
/// Alpha is derived from the luminance of RGB; the packed alpha is ignored
/// because some rasterizer builds leave it zeroed.
fn subpixel_mask_to_rgba(image: &Image) -> Vec<u8> {
    let width = image.placement.width as usize;
    let height = image.placement.height as usize;
    let stride = if width > 0 && height > 0 {
        image.data.len() / (width * height)
    } else {
        0
    };

    if stride != 3 && stride != 4 {
        // Treat as opaque white to avoid invisibility if the layout changes
        return vec![255; width * height * 4];
    }

    image
        .data
        .chunks_exact(stride)
        .flat_map(|chunk| {
            let (r, g, b) = (chunk[0] as u32, chunk[1] as u32, chunk[2] as u32);
            let alpha = ((r * 299 + g * 587 + b * 114) / 1000) as u8;
            [255, 255, 255, alpha]
        })
        .collect()
}
