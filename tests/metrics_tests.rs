//! Integration tests for string measurement and wrapping.

mod common;

use common::memory_engine;

#[test]
fn test_string_width_height_baseline() {
    let (mut engine, _) = memory_engine();
    assert_eq!(engine.string_width("Hello").unwrap(), 20.0);
    assert_eq!(engine.string_height("Hello").unwrap(), 8.0);
    assert_eq!(engine.string_baseline("Hello").unwrap(), 6.0);
    assert_eq!(engine.char_width('a').unwrap(), 4.0);
}

#[test]
fn test_empty_string_measures_zero() {
    let (mut engine, _) = memory_engine();
    let cached = engine.string_cache().len();
    assert_eq!(engine.string_width("").unwrap(), 0.0);
    assert_eq!(engine.string_height("").unwrap(), 0.0);
    assert_eq!(engine.string_baseline("").unwrap(), 0.0);
    assert_eq!(engine.size_string("", 10.0, true).unwrap(), 0);
    assert_eq!(engine.string_cache().len(), cached);
}

#[test]
fn test_directives_have_no_width() {
    let (mut engine, _) = memory_engine();
    assert_eq!(
        engine.string_width("\u{00A7}lHe\u{00A7}cllo").unwrap(),
        engine.string_width("Hello").unwrap()
    );
}

#[test]
fn test_size_string_breaks_at_space() {
    let (mut engine, _) = memory_engine();
    // Seven 4-unit glyphs fit in 30 units, the word break is at index 5
    assert_eq!(engine.size_string("hello world", 30.0, false).unwrap(), 7);
    assert_eq!(engine.size_string("hello world", 30.0, true).unwrap(), 5);
    assert_eq!(engine.size_string("hi", 100.0, true).unwrap(), 2);
}

#[test]
fn test_size_string_stops_at_newline() {
    let (mut engine, _) = memory_engine();
    assert_eq!(engine.size_string("ab\ncd", 100.0, true).unwrap(), 2);
}

#[test]
fn test_size_string_counts_directive_chars() {
    let (mut engine, _) = memory_engine();
    // Two glyphs fit; the cut lands on the original index of the third
    assert_eq!(engine.size_string("\u{00A7}labc", 8.0, false).unwrap(), 4);
}

#[test]
fn test_trim_string_to_width() {
    let (mut engine, _) = memory_engine();
    assert_eq!(engine.trim_string_to_width("abcdef", 10.0, false).unwrap(), "ab");
    assert_eq!(engine.trim_string_to_width("abcdef", 10.0, true).unwrap(), "ef");
    assert_eq!(engine.trim_string_to_width("abc", 100.0, false).unwrap(), "abc");
}

#[test]
fn test_wrap_carries_formatting() {
    let (mut engine, _) = memory_engine();
    let lines = engine
        .wrap_formatted_string("\u{00A7}lhello world", 30.0)
        .unwrap();
    assert_eq!(lines, vec!["\u{00A7}lhello", "\u{00A7}lworld"]);
}

#[test]
fn test_wrap_consumes_newline() {
    let (mut engine, _) = memory_engine();
    let lines = engine.wrap_formatted_string("ab\ncd", 100.0).unwrap();
    assert_eq!(lines, vec!["ab", "cd"]);
}

#[test]
fn test_wrap_always_makes_progress() {
    let (mut engine, _) = memory_engine();
    let lines = engine.wrap_formatted_string("abc", 1.0).unwrap();
    assert_eq!(lines, vec!["a", "b", "c"]);
}

#[test]
fn test_wrap_directive_only_string() {
    let (mut engine, _) = memory_engine();
    let lines = engine.wrap_formatted_string("\u{00A7}l", 10.0).unwrap();
    assert_eq!(lines, vec!["\u{00A7}l"]);
}

#[test]
fn test_format_prefix_follows_color_rule() {
    let (engine, _) = memory_engine();
    assert_eq!(
        engine.format_prefix("\u{00A7}lbold\u{00A7}ered"),
        "\u{00A7}e"
    );
    assert_eq!(engine.format_prefix("\u{00A7}ered\u{00A7}n"), "\u{00A7}e\u{00A7}n");
}
