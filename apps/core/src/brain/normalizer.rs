//! Text normalization shared by training and inference.
//!
//! Lowercases, strips URLs and everything outside the Latin alphabet, and
//! collapses whitespace. The classifier only ever sees text that went
//! through [`normalize`].

use regex::Regex;
use std::sync::LazyLock;

// NOTE: expect() is acceptable here: the patterns are constants
static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http\S+").expect("Invalid regex: url pattern"));
static NON_ALPHA_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z\s]").expect("Invalid regex: non-alpha pattern"));
static WHITESPACE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex: whitespace pattern"));

/// Normalizes raw user text for the classifier.
///
/// The result contains only `a-z` and single spaces, with no leading or
/// trailing whitespace. Applying it twice gives the same result as applying
/// it once.
pub fn normalize(raw: &str) -> String {
    let mut current = clean_pass(&raw.to_lowercase());
    // Stripping characters can join fragments into a new url-like token
    // ("h-ttpfoo" -> "httpfoo"); repeat until stable.
    loop {
        let next = clean_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_pass(lowered: &str) -> String {
    let text = URL_PATTERN.replace_all(lowered, "");
    let text = NON_ALPHA_PATTERN.replace_all(&text, "");
    let text = WHITESPACE_PATTERN.replace_all(&text, " ");
    text.trim().to_string()
}
