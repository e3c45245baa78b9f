//! Per-string layout cache.
//!
//! On a miss a string is stripped of directives, split into runs, assigned
//! fonts, shaped and registered with the glyph atlas; the resulting
//! [`Entry`] is stored under a digit-insensitive [`Key`]. Strings differing
//! only in ASCII digits share one entry, since every digit is laid out as
//! `'0'` and the renderer swaps in the real digit glyph from the pre-warmed
//! digit table.
//!
//! Entries live as long as their key is referenced from outside the cache
//! map. Keys of strings passed to [`StringLayoutCache::layout_shared`] stay
//! alive while the caller holds the `Rc<str>`. Borrowed strings passed to
//! [`StringLayoutCache::layout`] cannot be watched, so their keys are
//! pinned by a bounded LRU instead. Dead keys are swept before every insert.
//!
//! Nothing is cached when the graphics resource is not current: such calls
//! get a fresh, unshared entry every time and never touch the atlas.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::rc::{Rc, Weak};

use glyphcache_atlas::{GlyphAtlasCache, GraphicsResourceContext};
use glyphcache_config::TextConfig;
use glyphcache_fonts::{FontFallbackResolver, FontRun, FontStyle, ShapedRun, TextShapingBackend};
use lru::LruCache;

use crate::directive::{DirectiveRun, RenderStyle, strip_directives};
use crate::entry::{Entry, Glyph};
use crate::error::LayoutError;
use crate::key::Key;
use crate::segment::{RunSegmenter, StyleRun};

/// Number of digit glyphs kept per style.
const DIGITS: usize = 10;

/// Shared strings tracked before dead ones are pruned on a hit.
const LIVE_HIGH_WATER: usize = 64;

/// The collaborators a layout needs, borrowed from their owner.
pub struct LayoutContext<'a> {
    pub fonts: &'a FontFallbackResolver,
    pub atlas: &'a mut GlyphAtlasCache,
    pub gfx: &'a mut dyn GraphicsResourceContext,
}

pub struct StringLayoutCache {
    marker: char,
    texture_scale: f32,
    segmenter: RunSegmenter,

    /// Durable entries. A key referenced only from here is dead.
    entries: HashMap<Rc<Key>, Rc<Entry>>,

    /// Shared caller strings, by address, and the key each one keeps alive
    live: HashMap<usize, (Weak<str>, Rc<Key>)>,

    /// Size of `live` that triggers the next prune
    live_limit: usize,

    /// Keys of recently laid-out borrowed strings
    untracked: LruCache<Rc<Key>, ()>,

    /// Reused for lookups so a hit allocates nothing
    scratch: Key,

    /// Keys of the digit pre-warm strings, pinned until invalidation
    digit_keys: Vec<Rc<Key>>,

    /// Digit glyphs per style table index
    digit_glyphs: [[Option<Glyph>; DIGITS]; 4],

    /// Digits are zeroed before layout once the digit table is filled
    digits_ready: bool,
}

impl std::fmt::Debug for StringLayoutCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StringLayoutCache")
            .field("entries", &self.entries.len())
            .field("live", &self.live.len())
            .field("untracked", &self.untracked.len())
            .field("digits_ready", &self.digits_ready)
            .finish()
    }
}

impl StringLayoutCache {
    pub fn new(config: &TextConfig) -> Self {
        Self {
            marker: config.directive_marker,
            texture_scale: config.texture_scale,
            segmenter: RunSegmenter::new(),
            entries: HashMap::new(),
            live: HashMap::new(),
            live_limit: LIVE_HIGH_WATER,
            untracked: LruCache::new(untracked_capacity(config)),
            scratch: Key::new(String::new(), config.directive_marker),
            digit_keys: Vec::new(),
            digit_glyphs: [[None; DIGITS]; 4],
            digits_ready: false,
        }
    }

    /// Adopt new settings. Drops every entry; the caller pre-warms again.
    pub fn reconfigure(&mut self, config: &TextConfig) {
        self.marker = config.directive_marker;
        self.texture_scale = config.texture_scale;
        self.scratch = Key::new(String::new(), config.directive_marker);
        self.untracked.resize(untracked_capacity(config));
        self.clear();
    }

    /// Layout of a borrowed string.
    ///
    /// The string's key stays cached while it is among the most recently
    /// used borrowed strings.
    pub fn layout(&mut self, text: &str, ctx: &mut LayoutContext<'_>) -> Result<Rc<Entry>, LayoutError> {
        if !ctx.gfx.is_resource_current() {
            return self.build(text, ctx, false).map(Rc::new);
        }
        let entry = self.cached_or_build(text, ctx)?;
        if let Some(key) = entry.key() {
            self.untracked.put(key, ());
        }
        Ok(entry)
    }

    /// Layout of a shared string.
    ///
    /// The string's key stays cached while any clone of `text` is alive.
    pub fn layout_shared(
        &mut self,
        text: &Rc<str>,
        ctx: &mut LayoutContext<'_>,
    ) -> Result<Rc<Entry>, LayoutError> {
        if !ctx.gfx.is_resource_current() {
            return self.build(text, ctx, false).map(Rc::new);
        }
        let entry = self.cached_or_build(text, ctx)?;
        if let Some(key) = entry.key() {
            let address = Rc::as_ptr(text).cast::<u8>() as usize;
            self.live.insert(address, (Rc::downgrade(text), key));
            // Hits never sweep
            if self.live.len() > self.live_limit {
                self.prune_live();
            }
        }
        Ok(entry)
    }

    /// Forget shared strings whose last clone was dropped.
    fn prune_live(&mut self) {
        self.live.retain(|_, (text, _)| text.strong_count() > 0);
        self.live_limit = (self.live.len() * 2).max(LIVE_HIGH_WATER);
    }

    fn cached_or_build(&mut self, text: &str, ctx: &mut LayoutContext<'_>) -> Result<Rc<Entry>, LayoutError> {
        self.scratch.set(text);
        let hit = self.entries.get(&self.scratch).cloned();
        self.scratch.clear();
        if let Some(entry) = hit {
            return Ok(entry);
        }

        let mut entry = self.build(text, ctx, true)?;
        self.sweep();

        let key = Rc::new(Key::new(text, self.marker));
        entry.key = Rc::downgrade(&key);
        let entry = Rc::new(entry);
        self.entries.insert(key, Rc::clone(&entry));
        log::debug!(
            "String cache miss for {:?}: {} glyphs, {} entries cached",
            text,
            entry.glyphs.len(),
            self.entries.len()
        );
        Ok(entry)
    }

    /// Lay out `text` from scratch. `current` enables atlas registration.
    fn build(&self, text: &str, ctx: &mut LayoutContext<'_>, current: bool) -> Result<Entry, LayoutError> {
        let mut stripped = strip_directives(text, self.marker);
        if self.digits_ready {
            for c in stripped.chars.iter_mut().filter(|c| c.is_ascii_digit()) {
                *c = '0';
            }
        }

        let mut glyphs = Vec::with_capacity(stripped.chars.len());
        let mut pen = 0.0;
        for run in self.segmenter.segment(&stripped.chars, &stripped.directives) {
            pen = self.layout_run(&stripped.chars, run, ctx, current, pen, &mut glyphs)?;
        }

        let ascent = plurality_ascent(&glyphs);
        let height = glyphs.iter().map(|g| g.height).fold(0.0, f32::max);

        glyphs.sort_by_key(|g| g.string_index);
        apply_directives(&mut glyphs, &stripped.directives);

        let sorted_glyphs = if current {
            let mut sorted = glyphs.clone();
            sorted.sort_by_key(|g| g.region.map(|region| region.page));
            sorted
        } else {
            Vec::new()
        };

        Ok(Entry {
            advance: pen * self.texture_scale,
            ascent,
            height,
            glyphs,
            sorted_glyphs,
            directives: stripped.directives,
            special_render: stripped.special_render,
            key: Weak::new(),
        })
    }

    /// Shape one style run and append its glyphs. Returns the new pen position.
    fn layout_run(
        &self,
        text: &[char],
        run: StyleRun,
        ctx: &mut LayoutContext<'_>,
        current: bool,
        mut pen: f32,
        glyphs: &mut Vec<Glyph>,
    ) -> Result<f32, LayoutError> {
        let mut shaped: Vec<(Rc<dyn TextShapingBackend>, ShapedRun)> = Vec::new();
        let mut start = run.start;
        while start < run.limit {
            let FontRun { font, limit } = ctx.fonts.lookup_font(text, start, run.limit, run.font_style);
            let limit = limit.clamp(start + 1, run.limit);
            let shaped_run = font.shape(text, start, limit, run.direction)?;
            if current {
                ctx.atlas.cache_glyphs(font.as_ref(), &shaped_run, &mut *ctx.gfx)?;
            }
            shaped.push((font, shaped_run));
            start = limit;
        }

        // Font runs inside a right-to-left run read right to left
        if run.direction.is_rtl() {
            shaped.reverse();
        }

        let scale = self.texture_scale;
        for (font, shaped_run) in &shaped {
            for g in &shaped_run.glyphs {
                let region = if current {
                    ctx.atlas.lookup(font.font_key(), g.glyph_id)
                } else {
                    None
                };
                glyphs.push(Glyph {
                    string_index: g.cluster,
                    region,
                    scale,
                    x: (pen + g.x_offset) * scale,
                    y: g.y_offset * scale,
                    advance: g.x_advance * scale,
                    ascent: shaped_run.ascent * scale,
                    height: shaped_run.line_height() * scale,
                    color: None,
                    font_style: run.font_style,
                    render_style: RenderStyle::empty(),
                });
                pen += g.x_advance;
            }
        }
        Ok(pen)
    }

    /// Fill the digit table, laying out `"0123456789"` in every style.
    pub fn prewarm_digits(&mut self, ctx: &mut LayoutContext<'_>) -> Result<(), LayoutError> {
        self.digits_ready = false;
        let m = self.marker;
        let sources = [
            "0123456789".to_string(),
            format!("{m}l0123456789"),
            format!("{m}o0123456789"),
            format!("{m}l{m}o0123456789"),
        ];

        let current = ctx.gfx.is_resource_current();
        let mut table = [[None; DIGITS]; 4];
        let mut keys = Vec::with_capacity(sources.len());
        for (slot, source) in table.iter_mut().zip(&sources) {
            let entry = if current {
                self.cached_or_build(source, ctx)?
            } else {
                Rc::new(self.build(source, ctx, false)?)
            };
            if let Some(key) = entry.key() {
                keys.push(key);
            }

            let prefix = source.chars().count() - DIGITS;
            for glyph in &entry.glyphs {
                if let Some(digit) = glyph.string_index.checked_sub(prefix)
                    && digit < DIGITS
                    && slot[digit].is_none()
                {
                    slot[digit] = Some(*glyph);
                }
            }
        }

        self.digit_glyphs = table;
        self.digit_keys = keys;
        self.digits_ready = true;
        log::debug!("Digit glyphs pre-warmed (resource current: {})", current);
        Ok(())
    }

    /// Pre-warmed glyph of `digit` (0-9) in `style`.
    pub fn digit_glyph(&self, style: FontStyle, digit: usize) -> Option<&Glyph> {
        self.digit_glyphs
            .get(style.table_index())?
            .get(digit)?
            .as_ref()
    }

    /// True once the digit table is filled and digits are laid out as `'0'`.
    pub fn digits_ready(&self) -> bool {
        self.digits_ready
    }

    /// Drop every entry and pre-warm the digit table again.
    ///
    /// Call after the glyph atlas was invalidated, since entries refer to
    /// its regions.
    pub fn invalidate(&mut self, ctx: &mut LayoutContext<'_>) -> Result<(), LayoutError> {
        self.clear();
        log::info!("String layout cache invalidated");
        self.prewarm_digits(ctx)
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.live.clear();
        self.live_limit = LIVE_HIGH_WATER;
        self.untracked.clear();
        self.digit_keys.clear();
        self.digit_glyphs = [[None; DIGITS]; 4];
        self.digits_ready = false;
    }

    /// Release keys no caller can reach any more and evict their entries.
    ///
    /// Returns the number of evicted entries.
    pub fn sweep(&mut self) -> usize {
        self.prune_live();
        let before = self.entries.len();
        self.entries.retain(|key, _| Rc::strong_count(key) > 1);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            log::debug!("Evicted {} unreferenced string layouts", evicted);
        }
        evicted
    }

    /// Number of cached entries, including ones a sweep would evict.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of shared strings currently tracked, dead ones included.
    pub fn live_strings(&self) -> usize {
        self.live.len()
    }

    /// Cached entry for `text`, without laying it out.
    pub fn get(&mut self, text: &str) -> Option<Rc<Entry>> {
        self.scratch.set(text);
        let hit = self.entries.get(&self.scratch).cloned();
        self.scratch.clear();
        hit
    }
}

fn untracked_capacity(config: &TextConfig) -> NonZeroUsize {
    NonZeroUsize::new(config.untracked_string_capacity).unwrap_or(NonZeroUsize::MIN)
}

/// The ascent most glyphs share; ties go to the first one seen.
fn plurality_ascent(glyphs: &[Glyph]) -> f32 {
    let mut counts: Vec<(f32, usize)> = Vec::new();
    for glyph in glyphs {
        match counts.iter_mut().find(|(ascent, _)| *ascent == glyph.ascent) {
            Some((_, count)) => *count += 1,
            None => counts.push((glyph.ascent, 1)),
        }
    }

    let mut best = (0.0, 0);
    for (ascent, count) in counts {
        if count > best.1 {
            best = (ascent, count);
        }
    }
    best.0
}

/// Stamp directive state on glyphs sorted by stripped index, and move each
/// index back into the original string.
fn apply_directives(glyphs: &mut [Glyph], directives: &[DirectiveRun]) {
    let mut next = 0;
    let mut active: Option<&DirectiveRun> = None;
    for glyph in glyphs.iter_mut() {
        while let Some(directive) = directives.get(next)
            && glyph.string_index >= directive.strip_index
        {
            active = Some(directive);
            next += 1;
        }
        if let Some(directive) = active {
            glyph.color = directive.color;
            glyph.font_style = directive.font_style;
            glyph.render_style = directive.render_style;
        }
        // Every directive passed so far occupied two chars of the original
        glyph.string_index += 2 * next;
    }
}
