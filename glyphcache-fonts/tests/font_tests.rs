//! Integration tests for glyphcache-fonts crate.

use std::rc::Rc;
use std::sync::Arc;

use glyphcache_config::{BaselineMode, TextConfig};
use glyphcache_fonts::{
    Direction, FALLBACK_FAMILIES, FontData, FontError, FontFaces, FontSet, FontStyle,
    OutlineFont, ShapingOptions, TextShaper, TextShapingBackend,
};

/// Fonts installed on this machine, `None` when there are none.
fn system_fonts(config: &TextConfig) -> Option<FontSet> {
    match FontSet::load(config) {
        Ok(set) => Some(set),
        Err(e) => {
            eprintln!("Skipping: no system fonts ({:#})", e);
            None
        }
    }
}

/// First loaded font displaying every char of `text`.
fn font_covering(set: &FontSet, text: &[char]) -> Option<Rc<OutlineFont>> {
    let font = set
        .fonts()
        .iter()
        .find(|font| text.iter().all(|&c| font.covers(c)))
        .cloned();
    if font.is_none() {
        eprintln!("Skipping: no installed font covers {:?}", text);
    }
    font
}

#[test]
fn test_font_data_invalid_bytes() {
    let font_data = FontData::new("Broken", vec![0u8; 100]);
    assert!(
        matches!(font_data, Err(FontError::InvalidFontData { ref family, face_index: 0 }) if family == "Broken"),
        "Should reject invalid font data"
    );
}

#[test]
fn test_font_data_empty_bytes() {
    let font_data = FontData::new("Empty", Vec::new());
    assert!(font_data.is_err(), "Should reject empty data");
}

#[test]
fn test_font_data_bad_face_index() {
    let font_data = FontData::new_with_index("Broken", Arc::new(vec![0u8; 16]), 3);
    match font_data {
        Err(FontError::InvalidFontData { face_index, .. }) => assert_eq!(face_index, 3),
        other => panic!("expected InvalidFontData, got {:?}", other),
    }
}

#[test]
fn test_from_fonts_requires_at_least_one() {
    let result = FontSet::from_fonts(Vec::new(), &TextConfig::default());
    assert!(matches!(result, Err(FontError::NoFonts)));
}

#[test]
fn test_from_faces_requires_at_least_one() {
    let faces: Vec<FontFaces> = Vec::new();
    assert!(FontSet::from_faces(faces, &TextConfig::default()).is_err());
}

#[test]
fn test_fallback_families_not_empty() {
    assert!(!FALLBACK_FAMILIES.is_empty());
    assert!(FALLBACK_FAMILIES.iter().all(|name| !name.trim().is_empty()));
}

#[test]
fn test_fallback_families_have_no_duplicates() {
    for (i, name) in FALLBACK_FAMILIES.iter().enumerate() {
        assert!(
            !FALLBACK_FAMILIES[i + 1..].contains(name),
            "{} listed twice",
            name
        );
    }
}

#[test]
fn test_fallback_families_cover_rtl_scripts() {
    assert!(FALLBACK_FAMILIES.iter().any(|name| name.contains("Hebrew")));
    assert!(FALLBACK_FAMILIES.iter().any(|name| name.contains("Arabic")));
}

#[test]
fn test_shaper_keeps_options() {
    let options = ShapingOptions {
        enable_ligatures: false,
        language: Some("he".to_string()),
        ..ShapingOptions::default()
    };
    let shaper = TextShaper::new(options.clone());
    assert_eq!(shaper.options(), &options);
}

#[test]
fn test_style_bits_combine() {
    let style = FontStyle::BOLD | FontStyle::ITALIC;
    assert!(style.contains(FontStyle::BOLD));
    assert!(style.contains(FontStyle::ITALIC));
    assert_eq!(style.table_index(), 3);
    assert_eq!(FontStyle::default(), FontStyle::PLAIN);
}

// ---------------------------------------------------------------------------
// Outline backend with installed fonts
// ---------------------------------------------------------------------------

#[test]
fn test_outline_clusters_are_absolute_char_indices() {
    let Some(set) = system_fonts(&TextConfig::default()) else {
        return;
    };
    // Multi-byte chars before and inside the run
    let text: Vec<char> = "\u{2192} \u{00F1}and\u{00FA}".chars().collect();
    let Some(font) = font_covering(&set, &text[2..]) else {
        return;
    };

    let run = font.shape(&text, 2, text.len(), Direction::LeftToRight).unwrap();
    assert_eq!((run.start, run.limit), (2, 7));
    let mut clusters: Vec<usize> = run.glyphs.iter().map(|g| g.cluster).collect();
    clusters.dedup();
    assert_eq!(clusters, vec![2, 3, 4, 5, 6]);
    assert!(run.total_advance > 0.0);
}

#[test]
fn test_outline_rtl_run_is_in_visual_order() {
    let Some(set) = system_fonts(&TextConfig::default()) else {
        return;
    };
    let text: Vec<char> = "\u{05E9}\u{05DC}\u{05D5}\u{05DD}".chars().collect();
    let Some(font) = font_covering(&set, &text) else {
        return;
    };

    let run = font.shape(&text, 0, text.len(), Direction::RightToLeft).unwrap();
    let clusters: Vec<usize> = run.glyphs.iter().map(|g| g.cluster).collect();
    assert_eq!(clusters.first(), Some(&3));
    assert_eq!(clusters.last(), Some(&0));
    assert!(clusters.windows(2).all(|pair| pair[0] >= pair[1]));
}

#[test]
fn test_outline_rasterizes_whole_run() {
    let Some(set) = system_fonts(&TextConfig::default()) else {
        return;
    };
    let text: Vec<char> = "Hello".chars().collect();
    let Some(font) = font_covering(&set, &text) else {
        return;
    };

    let run = font.shape(&text, 0, text.len(), Direction::LeftToRight).unwrap();
    let images = font.rasterize_run(&run).unwrap();
    assert_eq!(images.len(), run.glyphs.len());

    let first = images[0].as_ref().expect("'H' should rasterize");
    assert!(first.width > 0 && first.height > 0);
    for image in images.iter().flatten() {
        assert_eq!(image.pixels.len(), (image.width * image.height * 4) as usize);
    }
}

#[test]
fn test_outline_fixed_baseline() {
    let config = TextConfig {
        baseline: BaselineMode::Fixed(9.5),
        ..TextConfig::default()
    };
    let Some(set) = system_fonts(&config) else {
        return;
    };
    let font = &set.fonts()[0];
    assert_eq!(font.ascent(), 9.5);

    let text = ['A'];
    let run = font.shape(&text, 0, 1, Direction::LeftToRight).unwrap();
    assert_eq!(run.ascent, 9.5);
    // Derived styles share the baseline mode
    let bold = font.derive(FontStyle::BOLD);
    assert_eq!(bold.shape(&text, 0, 1, Direction::LeftToRight).unwrap().ascent, 9.5);
}

#[test]
fn test_outline_measured_baselines() {
    for baseline in [BaselineMode::FontAscent, BaselineMode::CommonChars] {
        let config = TextConfig {
            baseline,
            ..TextConfig::default()
        };
        let Some(set) = system_fonts(&config) else {
            return;
        };
        let Some(font) = font_covering(&set, &['A']) else {
            return;
        };
        let ascent = font.ascent();
        assert!(
            ascent > 0.0 && ascent < config.font_size * 2.0,
            "{:?} ascent {}",
            baseline,
            ascent
        );
        assert!(font.descent() >= 0.0);
    }
}

#[test]
fn test_outline_rejects_run_outside_text() {
    let Some(set) = system_fonts(&TextConfig::default()) else {
        return;
    };
    let font = &set.fonts()[0];
    let text: Vec<char> = "abc".chars().collect();

    match font.shape(&text, 1, 5, Direction::LeftToRight) {
        Err(FontError::Shaping { font: name, .. }) => assert_eq!(name, font.font_key().name),
        other => panic!("expected Shaping error, got {:?}", other.map(|run| run.glyphs.len())),
    }
    assert!(matches!(
        font.shape(&text, 2, 1, Direction::LeftToRight),
        Err(FontError::Shaping { .. })
    ));
    // An empty run is not an error
    let empty = font.shape(&text, 1, 1, Direction::LeftToRight).unwrap();
    assert!(empty.glyphs.is_empty());
}
