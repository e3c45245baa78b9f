//! Default values for font, atlas and cache settings.

pub fn font_size() -> f32 {
    16.0
}

pub fn texture_scale() -> f32 {
    0.5 // Atlas pixels are drawn at half size in layout units
}

pub fn anti_alias() -> bool {
    true
}

pub fn hinting() -> bool {
    true
}

pub fn atlas_page_width() -> u32 {
    256
}

pub fn atlas_page_height() -> u32 {
    256
}

pub fn glyph_border() -> u32 {
    2 // One pixel against sampling bleed plus one for rasterizer overhang
}

pub fn directive_marker() -> char {
    '\u{00A7}'
}

pub fn untracked_string_capacity() -> usize {
    512
}

pub fn fallback_families() -> Vec<String> {
    Vec::new()
}
