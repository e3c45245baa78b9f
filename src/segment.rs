//! Splitting stripped text into direction- and style-homogeneous runs.
//!
//! Bidi analysis runs only when the text contains right-to-left characters.
//! Each direction run is then split wherever the directive font style
//! changes. Runs come out in left-to-right visual order, so the caller can
//! lay them out by simply advancing the pen.

use std::ops::Range;

use glyphcache_fonts::{Direction, FontStyle};
use unicode_bidi::{BidiClass, BidiInfo, bidi_class};

use crate::directive::DirectiveRun;

/// A maximal stretch of stripped text with one direction and one font style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleRun {
    /// First char index in the stripped text
    pub start: usize,
    /// Exclusive end char index in the stripped text
    pub limit: usize,
    pub direction: Direction,
    pub font_style: FontStyle,
}

impl StyleRun {
    pub fn len(&self) -> usize {
        self.limit - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.limit
    }
}

/// True if `text` has any character forcing full bidi analysis.
pub fn requires_bidi(text: &[char]) -> bool {
    text.iter().any(|&c| {
        matches!(
            bidi_class(c),
            BidiClass::R
                | BidiClass::AL
                | BidiClass::AN
                | BidiClass::RLE
                | BidiClass::RLO
                | BidiClass::RLI
        )
    })
}

/// Direction runs of `text` in visual order, as char ranges.
pub fn direction_runs(text: &[char]) -> Vec<(Range<usize>, Direction)> {
    if text.is_empty() {
        return Vec::new();
    }
    if !requires_bidi(text) {
        return vec![(0..text.len(), Direction::LeftToRight)];
    }

    let source: String = text.iter().collect();
    let char_starts: Vec<usize> = source.char_indices().map(|(offset, _)| offset).collect();
    let to_char = |byte: usize| char_starts.partition_point(|&start| start < byte);

    let info = BidiInfo::new(&source, None);
    let mut runs = Vec::new();
    for paragraph in &info.paragraphs {
        let (levels, level_runs) = info.visual_runs(paragraph, paragraph.range.clone());
        for run in level_runs {
            if run.is_empty() {
                continue;
            }
            let direction = if levels[run.start].is_rtl() {
                Direction::RightToLeft
            } else {
                Direction::LeftToRight
            };
            runs.push((to_char(run.start)..to_char(run.end), direction));
        }
    }

    // Entirely right-to-left text is shaped as one run
    if runs.iter().all(|(_, direction)| direction.is_rtl()) {
        return vec![(0..text.len(), Direction::RightToLeft)];
    }
    runs
}

/// Splits stripped text into [`StyleRun`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSegmenter;

impl RunSegmenter {
    pub fn new() -> Self {
        Self
    }

    /// All style runs of `text`, in visual order.
    ///
    /// `directives` must be in string order, as produced by
    /// [`strip_directives`](crate::directive::strip_directives).
    pub fn segment(&self, text: &[char], directives: &[DirectiveRun]) -> Vec<StyleRun> {
        let mut runs = Vec::new();
        for (range, direction) in direction_runs(text) {
            let first = runs.len();
            split_styles(range, direction, directives, &mut runs);
            // Style runs inside a right-to-left run read right to left
            if direction.is_rtl() {
                runs[first..].reverse();
            }
        }
        runs
    }
}

/// Split `range` at every change of directive font style, in logical order.
fn split_styles(
    range: Range<usize>,
    direction: Direction,
    directives: &[DirectiveRun],
    out: &mut Vec<StyleRun>,
) {
    let mut start = range.start;
    let limit = range.end;

    // The last directive taking effect at or before `start` sets the initial style
    let mut next = directives.partition_point(|d| d.strip_index <= start);
    let mut font_style = next
        .checked_sub(1)
        .map(|i| directives[i].font_style)
        .unwrap_or(FontStyle::PLAIN);

    while start < limit {
        let mut end = limit;
        let mut next_style = font_style;
        while let Some(directive) = directives.get(next) {
            if directive.strip_index >= limit {
                break;
            }
            // Consecutive directives at one position: the last one wins
            let last = directives[next..]
                .iter()
                .take_while(|d| d.strip_index == directive.strip_index)
                .count()
                + next
                - 1;
            next = last + 1;
            if directives[last].font_style != font_style {
                end = directive.strip_index;
                next_style = directives[last].font_style;
                break;
            }
        }

        if start < end {
            out.push(StyleRun {
                start,
                limit: end,
                direction,
                font_style,
            });
        }
        start = end;
        font_style = next_style;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::strip_directives;

    const MARKER: char = '\u{00A7}';

    fn segment(text: &str) -> Vec<StyleRun> {
        let stripped = strip_directives(text, MARKER);
        RunSegmenter::new().segment(&stripped.chars, &stripped.directives)
    }

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    #[test]
    fn test_ltr_text_skips_bidi() {
        assert!(!requires_bidi(&chars("Hello, world 123")));
        assert_eq!(
            direction_runs(&chars("Hello")),
            vec![(0..5, Direction::LeftToRight)]
        );
    }

    #[test]
    fn test_empty_text_has_no_runs() {
        assert!(direction_runs(&[]).is_empty());
        assert!(segment("").is_empty());
        assert!(segment("\u{00A7}l").is_empty());
    }

    #[test]
    fn test_hebrew_requires_bidi() {
        assert!(requires_bidi(&chars("abc \u{05D0}\u{05D1}")));
        assert!(requires_bidi(&chars("\u{0627}")));
    }

    #[test]
    fn test_pure_rtl_is_one_run() {
        let text = chars("\u{05E9}\u{05DC}\u{05D5}\u{05DD} \u{05E2}\u{05D5}\u{05DC}\u{05DD}");
        assert_eq!(
            direction_runs(&text),
            vec![(0..text.len(), Direction::RightToLeft)]
        );
    }

    #[test]
    fn test_mixed_runs_cover_text_once() {
        let text = chars("abc \u{05D0}\u{05D1}\u{05D2} def");
        let runs = direction_runs(&text);
        assert!(runs.len() >= 3);
        assert!(runs.iter().any(|(_, d)| d.is_rtl()));
        assert!(runs.iter().any(|(_, d)| !d.is_rtl()));

        let mut covered = vec![0; text.len()];
        for (range, _) in &runs {
            for i in range.clone() {
                covered[i] += 1;
            }
        }
        assert!(covered.iter().all(|&n| n == 1));

        // Hebrew letters land in a right-to-left run
        let hebrew = runs
            .iter()
            .find(|(range, _)| range.contains(&4))
            .map(|(_, direction)| *direction);
        assert_eq!(hebrew, Some(Direction::RightToLeft));
    }

    #[test]
    fn test_multibyte_chars_map_to_char_indices() {
        // Two-byte Hebrew letters followed by Latin text
        let text = chars("\u{05D0}\u{05D1} xyz");
        let runs = direction_runs(&text);
        let end = runs.iter().map(|(range, _)| range.end).max();
        assert_eq!(end, Some(text.len()));
    }

    #[test]
    fn test_plain_text_is_one_style_run() {
        assert_eq!(
            segment("Hello"),
            vec![StyleRun {
                start: 0,
                limit: 5,
                direction: Direction::LeftToRight,
                font_style: FontStyle::PLAIN,
            }]
        );
    }

    #[test]
    fn test_style_change_splits_run() {
        let runs = segment("ab\u{00A7}lcd\u{00A7}oef");
        let spans: Vec<_> = runs.iter().map(|r| (r.start, r.limit, r.font_style)).collect();
        assert_eq!(
            spans,
            vec![
                (0, 2, FontStyle::PLAIN),
                (2, 4, FontStyle::BOLD),
                (4, 6, FontStyle::BOLD | FontStyle::ITALIC),
            ]
        );
    }

    #[test]
    fn test_color_only_change_does_not_split() {
        let runs = segment("ab\u{00A7}ccd\u{00A7}9ef");
        assert_eq!(runs.len(), 1);
        assert_eq!((runs[0].start, runs[0].limit), (0, 6));
    }

    #[test]
    fn test_leading_directive_sets_style() {
        let runs = segment("\u{00A7}lHi");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].font_style, FontStyle::BOLD);
        assert_eq!((runs[0].start, runs[0].limit), (0, 2));
    }

    #[test]
    fn test_consecutive_directives_last_wins() {
        // Bold then color at the same position: color resets to plain
        let runs = segment("a\u{00A7}l\u{00A7}cb");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].font_style, FontStyle::PLAIN);
    }

    #[test]
    fn test_rtl_style_runs_are_visually_ordered() {
        let runs = segment("\u{05D0}\u{05D1}\u{00A7}l\u{05D2}\u{05D3}");
        assert_eq!(runs.len(), 2);
        // The bold tail of the logical text is drawn first
        assert_eq!((runs[0].start, runs[0].font_style), (2, FontStyle::BOLD));
        assert_eq!((runs[1].start, runs[1].font_style), (0, FontStyle::PLAIN));
        assert!(runs.iter().all(|r| r.direction.is_rtl()));
    }
}
