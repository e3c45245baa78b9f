//! Font fallback chain configuration.
//!
//! Defines the priority order of fallback fonts for comprehensive Unicode coverage.

/// Fallback font families in priority order.
///
/// These families are appended after the configured primary and fallback
/// families. The order is designed to provide:
/// 1. Proportional UI fonts for Latin, Greek and Cyrillic
/// 2. Right-to-left scripts (Hebrew, Arabic)
/// 3. CJK support (Japanese, Simplified/Traditional Chinese, Korean)
/// 4. Symbol fonts
/// 5. Color emoji
/// 6. General Unicode coverage
pub const FALLBACK_FAMILIES: &[&str] = &[
    // Proportional UI fonts
    "DejaVu Sans",
    "Noto Sans",
    "Liberation Sans",
    "Segoe UI",
    "Helvetica Neue",
    "Arial",
    // Right-to-left scripts
    "Noto Sans Hebrew",
    "Noto Sans Arabic",
    "Arial Hebrew",
    "Geeza Pro",
    "Tahoma",
    // CJK fonts
    "Noto Sans CJK JP",
    "Noto Sans CJK SC",
    "Noto Sans CJK TC",
    "Noto Sans CJK KR",
    "Hiragino Sans",
    "PingFang SC",
    "Microsoft YaHei",
    "Malgun Gothic",
    // Monochrome symbol fonts (before emoji to prefer outline rendering)
    "Noto Sans Symbols",
    "Noto Sans Symbols 2",
    "Apple Symbols",
    "Segoe UI Symbol",
    "Symbola",
    // Color emoji fonts
    "Noto Color Emoji",
    "Apple Color Emoji",
    "Segoe UI Emoji",
    // General fallbacks
    "Arial Unicode MS",
    "Unifont",
];
