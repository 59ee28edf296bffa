// src/scraper/text.rs

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalizes scraped text so downstream matching and the CSV stay sane:
/// non-breaking spaces become ordinary spaces, accents are decomposed and
/// their combining marks dropped, whitespace runs collapse to one space,
/// ends trimmed.
///
/// Without the accent step, "é" next to a line break merges adjacent words
/// once the whitespace is collapsed.
pub fn normalize_text(raw: &str) -> String {
    let spaced = raw.replace('\u{a0}', " ");

    let mut out = String::with_capacity(spaced.len());
    let mut prev_space = false;
    for ch in spaced.nfd().filter(|c| !is_combining_mark(*c)) {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }

    out.trim().to_string()
}

/// Normalized text of everything before `marker`, or of the whole input
/// when the marker is absent.
pub fn normalize_before(raw: &str, marker: &str) -> String {
    match raw.find(marker) {
        Some(idx) => normalize_text(&raw[..idx]),
        None => normalize_text(raw),
    }
}
