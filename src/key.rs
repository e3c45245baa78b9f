//! Digit-insensitive string cache key.

use std::hash::{Hash, Hasher};

/// A cached string, compared so that ASCII digits are interchangeable.
///
/// Two keys are equal when their strings have the same length and differ
/// only in ASCII digits at the same positions. A digit right after the
/// directive marker is a directive code, not text, and must match exactly:
/// strings differing only in color codes get separate entries.
#[derive(Debug, Clone)]
pub struct Key {
    text: String,
    marker: char,
}

impl Key {
    pub fn new(text: impl Into<String>, marker: char) -> Self {
        Self {
            text: text.into(),
            marker,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn marker(&self) -> char {
        self.marker
    }

    /// Reuse this key's buffer for `text`, without allocating when it fits.
    pub(crate) fn set(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }

    /// Release the copied text, keeping the buffer.
    pub(crate) fn clear(&mut self) {
        self.text.clear();
    }
}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut after_marker = false;
        let mut length = 0usize;
        for c in self.text.chars() {
            let normalized = if c.is_ascii_digit() && !after_marker { '0' } else { c };
            state.write_u32(normalized as u32);
            after_marker = c == self.marker;
            length += 1;
        }
        state.write_usize(length);
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        if self.marker != other.marker {
            return false;
        }
        let mut ours = self.text.chars();
        let mut theirs = other.text.chars();
        let mut after_marker = false;
        loop {
            match (ours.next(), theirs.next()) {
                (None, None) => return true,
                (Some(a), Some(b)) => {
                    if a != b && (after_marker || !a.is_ascii_digit() || !b.is_ascii_digit()) {
                        return false;
                    }
                    after_marker = a == self.marker;
                }
                _ => return false,
            }
        }
    }
}

impl Eq for Key {}
