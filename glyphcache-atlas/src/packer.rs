//! Shelf packing cursor for fixed-size texture pages.
//!
//! Glyphs are placed left to right along the current line, separated by a
//! transparent border. A glyph that would overflow the line starts a new
//! line below the tallest glyph of the current one; a glyph that would
//! overflow the page starts a new page at its top-left corner. Placed
//! glyphs never move.

/// Where the next glyph goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub x: u32,
    pub y: u32,
    /// The glyph is the first one of a page the caller must allocate
    pub new_page: bool,
}

#[derive(Debug, Clone)]
pub struct ShelfPacker {
    page_width: u32,
    page_height: u32,
    border: u32,
    x: u32,
    y: u32,
    line_height: u32,
    has_page: bool,
}

impl ShelfPacker {
    pub fn new(page_width: u32, page_height: u32, border: u32) -> Self {
        Self {
            page_width,
            page_height,
            border,
            x: border,
            y: border,
            line_height: 0,
            has_page: false,
        }
    }

    pub fn page_size(&self) -> (u32, u32) {
        (self.page_width, self.page_height)
    }

    pub fn border(&self) -> u32 {
        self.border
    }

    /// True once a page has been started and not reset since.
    pub fn has_page(&self) -> bool {
        self.has_page
    }

    /// Current cursor position on the page.
    pub fn cursor(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    /// True if a `width` x `height` glyph fits on an empty page.
    pub fn fits_page(&self, width: u32, height: u32) -> bool {
        let margin = self.border.saturating_mul(2);
        width.saturating_add(margin) <= self.page_width
            && height.saturating_add(margin) <= self.page_height
    }

    /// Reserve space for a `width` x `height` glyph.
    ///
    /// Returns `None` if the glyph cannot fit even on an empty page.
    pub fn place(&mut self, width: u32, height: u32) -> Option<Slot> {
        if !self.fits_page(width, height) {
            return None;
        }

        // If the current line is full, advance to the next line
        if self.x + width + self.border > self.page_width {
            self.x = self.border;
            self.y += self.line_height + self.border;
            self.line_height = 0;
        }

        // If the page is full (or none exists yet), continue on a new page
        let new_page = !self.has_page || self.y + height + self.border > self.page_height;
        if new_page {
            self.start_page();
        }

        let slot = Slot {
            x: self.x,
            y: self.y,
            new_page,
        };

        // The tallest glyph on this line determines the vertical advance
        self.line_height = self.line_height.max(height);
        self.x += width + self.border;
        Some(slot)
    }

    /// Move the cursor to the origin of a fresh page.
    pub fn start_page(&mut self) {
        self.x = self.border;
        self.y = self.border;
        self.line_height = 0;
        self.has_page = true;
    }

    /// Forget the current page; the next placement starts a new one.
    pub fn reset(&mut self) {
        self.x = self.border;
        self.y = self.border;
        self.line_height = 0;
        self.has_page = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_first_placement_starts_page_at_border() {
        let mut packer = ShelfPacker::new(64, 64, 2);
        let slot = packer.place(10, 12).unwrap();
        assert_eq!(
            slot,
            Slot {
                x: 2,
                y: 2,
                new_page: true
            }
        );
        let next = packer.place(10, 5).unwrap();
        assert_eq!((next.x, next.y, next.new_page), (14, 2, false));
    }

    #[test]
    fn test_line_wrap_uses_tallest_glyph() {
        let mut packer = ShelfPacker::new(32, 64, 2);
        packer.place(10, 8).unwrap();
        packer.place(10, 14).unwrap();
        // 26 + 10 + 2 > 32 wraps below the 14px glyph
        let slot = packer.place(10, 4).unwrap();
        assert_eq!((slot.x, slot.y, slot.new_page), (2, 18, false));
    }

    #[test]
    fn test_page_overflow_starts_new_page() {
        let mut packer = ShelfPacker::new(16, 16, 1);
        packer.place(14, 8).unwrap();
        let slot = packer.place(14, 8).unwrap();
        assert!(slot.new_page);
        assert_eq!((slot.x, slot.y), (1, 1));
    }

    #[test]
    fn test_too_large_glyph_is_rejected() {
        let mut packer = ShelfPacker::new(16, 16, 2);
        assert!(packer.place(13, 4).is_none());
        assert!(packer.place(12, 12).is_some());
    }

    #[test]
    fn test_reset_forces_new_page() {
        let mut packer = ShelfPacker::new(64, 64, 2);
        packer.place(4, 4).unwrap();
        packer.reset();
        assert!(!packer.has_page());
        assert!(packer.place(4, 4).unwrap().new_page);
    }

    #[test]
    fn test_regions_with_border_never_overlap() {
        let (width, height, border) = (128, 128, 2);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut packer = ShelfPacker::new(width, height, border);
            let mut pages: Vec<Vec<(u32, u32, u32, u32)>> = Vec::new();

            for _ in 0..300 {
                let (w, h) = (rng.gen_range(1..=30), rng.gen_range(1..=30));
                let slot = packer.place(w, h).unwrap();
                if slot.new_page {
                    pages.push(Vec::new());
                }
                // Region plus its right and bottom border stays on the page
                assert!(slot.x >= border && slot.y >= border);
                assert!(slot.x + w + border <= width);
                assert!(slot.y + h + border <= height);
                pages.last_mut().unwrap().push((slot.x, slot.y, w + border, h + border));
            }

            for page in &pages {
                for (i, a) in page.iter().enumerate() {
                    for b in &page[i + 1..] {
                        let overlap = a.0 < b.0 + b.2
                            && b.0 < a.0 + a.2
                            && a.1 < b.1 + b.3
                            && b.1 < a.1 + a.3;
                        assert!(!overlap, "seed {}: {:?} overlaps {:?}", seed, a, b);
                    }
                }
            }
        }
    }
}
