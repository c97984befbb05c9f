//! Live-version fallback policy.
//!
//! A primary attempt that fails with the tool's generic "no match" code is
//! retried once with live-performance markers ("live", "ao vivo") removed
//! from the title, since live versions are often missing from the source
//! while the studio version is not.

use once_cell::sync::Lazy;
use regex::Regex;

use super::NOT_FOUND_EXIT_CODE;

/// `(Live)`, `[Ao Vivo]`, `(Live at Wembley 1986)`.
static BRACKETED_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*[(\[{]\s*(?:ao\s+vivo|live)\b[^)\]}]*[)\]}]")
        .expect("bracketed marker regex should compile")
});

/// `- Live`, `– Ao Vivo Em São Paulo`: the marker and everything after it.
static DASH_SUFFIX_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*[-–—]\s*(?:ao\s+vivo|live)\b.*$")
        .expect("dash suffix marker regex should compile")
});

/// Any remaining whole-word marker with an optional leading separator.
static STANDALONE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*[-–—:/]?\s*\b(?:ao\s+vivo|live)\b")
        .expect("standalone marker regex should compile")
});

static EMPTY_BRACKETS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[(\[{]\s*[)\]}]").expect("empty brackets regex should compile")
});

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex should compile"));

fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Case-insensitive substring check for "live" or "ao vivo".
pub fn contains_live_marker(title: &str) -> bool {
    let lower = title.to_lowercase();
    lower.contains("live") || lower.contains("ao vivo")
}

/// Removes whole-word live markers together with their brackets or
/// separators, collapses whitespace and trims. Returns the title unchanged
/// (whitespace-collapsed) when nothing would remain.
pub fn strip_live_markers(title: &str) -> String {
    let cleaned = BRACKETED_MARKER.replace_all(title, "");
    let cleaned = DASH_SUFFIX_MARKER.replace_all(&cleaned, "");
    let cleaned = STANDALONE_MARKER.replace_all(&cleaned, "");
    let cleaned = EMPTY_BRACKETS.replace_all(&cleaned, "");
    let cleaned = collapse_whitespace(&cleaned);
    let cleaned = cleaned
        .trim_matches(|c: char| {
            c.is_whitespace() || matches!(c, '-' | '–' | '—' | ':' | '/' | ',')
        })
        .to_string();
    if cleaned.is_empty() {
        collapse_whitespace(title)
    } else {
        cleaned
    }
}

/// Outcome of the fallback policy for one failed primary attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackDecision {
    /// Record the primary failure.
    NoRetry,
    /// Try once more with this title.
    RetryWithTitle(String),
}

/// Recommends a retry only when the primary attempt exited with
/// [`NOT_FOUND_EXIT_CODE`], the title carries a live marker, and stripping
/// the markers leaves a non-empty title different from the original.
pub fn decide(exit_code: Option<i32>, title: &str) -> FallbackDecision {
    if exit_code != Some(NOT_FOUND_EXIT_CODE) || !contains_live_marker(title) {
        return FallbackDecision::NoRetry;
    }
    let stripped = strip_live_markers(title);
    if stripped.is_empty() || stripped == collapse_whitespace(title) {
        return FallbackDecision::NoRetry;
    }
    FallbackDecision::RetryWithTitle(stripped)
}
