//! Inline color and style directives.
//!
//! A directive is a marker character followed by one code character. Codes
//! are case-insensitive and come from [`DIRECTIVE_CODES`]: sixteen color
//! slots (`0`-`9`, `a`-`f`), then random (`k`), bold (`l`), strikethrough
//! (`m`), underline (`n`), italic (`o`) and reset (`r`). Directives are
//! removed from the text before shaping so contextual glyph forms survive;
//! their positions are kept as [`DirectiveRun`]s.

use bitflags::bitflags;
use glyphcache_fonts::FontStyle;

/// Every known directive code, indexed by its numeric value.
pub const DIRECTIVE_CODES: &str = "0123456789abcdefklmnor";

bitflags! {
    /// Decorations applied when drawing glyphs rather than when shaping them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RenderStyle: u8 {
        const UNDERLINE = 1;
        const STRIKETHROUGH = 2;
        /// Glyphs are swapped for random ones of equal width on every frame
        const RANDOM = 4;
    }
}

/// Decoded meaning of a directive code character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Color(u8),
    Random,
    Bold,
    Strikethrough,
    Underline,
    Italic,
    Reset,
    /// Not in the alphabet. Still stripped, but changes nothing.
    Unknown,
}

impl Directive {
    pub fn from_code(code: char) -> Self {
        let lower = code.to_ascii_lowercase();
        match DIRECTIVE_CODES.chars().position(|c| c == lower) {
            Some(index @ 0..=15) => Directive::Color(index as u8),
            Some(16) => Directive::Random,
            Some(17) => Directive::Bold,
            Some(18) => Directive::Strikethrough,
            Some(19) => Directive::Underline,
            Some(20) => Directive::Italic,
            Some(21) => Directive::Reset,
            _ => Directive::Unknown,
        }
    }

    pub fn is_color(self) -> bool {
        matches!(self, Directive::Color(_))
    }
}

/// Whether a color directive also clears bold, italic and render styles.
///
/// Legacy behavior kept for compatibility with existing formatted text.
pub fn color_resets_formatting() -> bool {
    true
}

/// One directive found in a string, with the state in effect after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectiveRun {
    /// Char index of the marker in the original string
    pub string_index: usize,
    /// Char index in the stripped string where the directive takes effect
    pub strip_index: usize,
    /// Color slot, `None` for the default color
    pub color: Option<u8>,
    pub font_style: FontStyle,
    pub render_style: RenderStyle,
}

/// Directive state while scanning a string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectiveState {
    pub color: Option<u8>,
    pub font_style: FontStyle,
    pub render_style: RenderStyle,
}

impl DirectiveState {
    /// Apply one directive.
    pub fn apply(&mut self, directive: Directive) {
        match directive {
            Directive::Color(slot) => {
                self.color = Some(slot);
                if color_resets_formatting() {
                    self.font_style = FontStyle::PLAIN;
                    self.render_style = RenderStyle::empty();
                }
            }
            Directive::Random => self.render_style |= RenderStyle::RANDOM,
            Directive::Bold => self.font_style |= FontStyle::BOLD,
            Directive::Strikethrough => self.render_style |= RenderStyle::STRIKETHROUGH,
            Directive::Underline => self.render_style |= RenderStyle::UNDERLINE,
            Directive::Italic => self.font_style |= FontStyle::ITALIC,
            Directive::Reset => *self = DirectiveState::default(),
            Directive::Unknown => {}
        }
    }
}

/// A string with its directives removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrippedText {
    /// Visible characters only
    pub chars: Vec<char>,
    /// Directives in string order
    pub directives: Vec<DirectiveRun>,
    /// Some directive asked for underline or strikethrough
    pub special_render: bool,
}

/// Remove every directive from `text`.
///
/// A marker in the last position has no code character and stays as
/// literal text. A marker followed by a character outside the alphabet is
/// still removed together with that character.
pub fn strip_directives(text: &str, marker: char) -> StrippedText {
    let source: Vec<char> = text.chars().collect();
    let mut stripped = StrippedText {
        chars: Vec::with_capacity(source.len()),
        ..StrippedText::default()
    };
    let mut state = DirectiveState::default();
    let mut index = 0;

    while index < source.len() {
        let c = source[index];
        if c != marker || index + 1 >= source.len() {
            stripped.chars.push(c);
            index += 1;
            continue;
        }

        let directive = Directive::from_code(source[index + 1]);
        state.apply(directive);
        if matches!(directive, Directive::Strikethrough | Directive::Underline) {
            stripped.special_render = true;
        }
        stripped.directives.push(DirectiveRun {
            string_index: index,
            strip_index: stripped.chars.len(),
            color: state.color,
            font_style: state.font_style,
            render_style: state.render_style,
        });
        index += 2;
    }

    stripped
}

/// The directives needed to continue `text` with the same formatting.
///
/// A color directive drops whatever was collected before it, following
/// [`color_resets_formatting`]; a reset drops everything. Unknown codes are
/// ignored.
pub fn format_prefix(text: &str, marker: char) -> String {
    let mut prefix = String::new();
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != marker {
            continue;
        }
        let Some(code) = chars.next() else {
            break;
        };
        match Directive::from_code(code) {
            Directive::Unknown => {}
            Directive::Reset => prefix.clear(),
            directive => {
                if directive.is_color() && color_resets_formatting() {
                    prefix.clear();
                }
                prefix.push(marker);
                prefix.push(code);
            }
        }
    }

    prefix
}
