use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

static TRAILING_WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+\n").unwrap());
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Normalize extracted text: drop horizontal whitespace hanging before a
/// newline, collapse runs of 3+ newlines to a single blank line, trim.
/// Idempotent, so per-page output can be cleaned again after combining.
pub fn clean(text: &str) -> String {
    let text = TRAILING_WS_RE.replace_all(text, "\n");
    let text = BLANK_RUN_RE.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Concatenated text of every descendant text node: each fragment trimmed,
/// empty fragments dropped, the rest joined by `sep`.
pub fn joined_text(el: ElementRef<'_>, sep: &str) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

// ── Tests ──
