//! Fixed tokens, selectors and defaults shared across the pipeline stages.
//!
//! Everything selector- or separator-shaped lives here so that tests can
//! build synthetic fixtures against the same values the runners use.

/// Separator line between Q&A pairs in per-page and combined corpus files.
pub const QA_SEPARATOR: &str = "---------------------------";

/// Separator line used by the link-segregation outputs.
pub const LINKS_SEPARATOR: &str = "--------------";

/// Origin prepended to site-relative hrefs found in answers.
pub const SITE_ORIGIN: &str = "https://www.sutd.edu.sg";

/// The unique element wrapping the FAQ accordion widget.
pub const ACCORDION_SELECTOR: &str = "section#accordion";

/// Accordion headings acting as questions.
pub const QUESTION_SELECTOR: &str = "h6";

/// Class marking a prose block; the nearest following one answers a heading.
pub const ANSWER_CLASS: &str = "richText";

/// Boilerplate removed outright before content extraction.
pub const REMOVE_SELECTORS: &[&str] = &[
    "header", "nav", "footer", "script", "style", "noscript", "form", "svg",
];

/// Candidate content containers, in priority order for tie-breaking.
pub const CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    "div[id*='content']",
    "div[class*='content']",
    "section",
];

/// Filename suffix for per-page FAQ outputs; the combiner globs on this.
pub const FAQ_SUFFIX: &str = "_faq.txt";

/// Filename suffix for per-page content outputs.
pub const CONTENT_SUFFIX: &str = "_content.txt";

pub const DEFAULT_USER_AGENT: &str = "SUTD-Student-Project-MLops";

pub const DEFAULT_SEED_FILE: &str = "data/seed_urls.txt";
pub const DEFAULT_RAW_DIR: &str = "data/raw";
pub const DEFAULT_FETCH_META: &str = "data/raw/metadata.csv";
pub const DEFAULT_PROCESSED_DIR: &str = "data/processed";
pub const DEFAULT_ARCHIVE_DIR: &str = "data/archive";
pub const DEFAULT_PAGES_RAW_DIR: &str = "data/raw/pages";
pub const DEFAULT_PAGES_OUT_DIR: &str = "data/processed/pages";
pub const DEFAULT_PAGES_META: &str = "data/processed/pages/metadata.csv";
pub const DEFAULT_PAGES_URL_MAP: &str = "data/raw/pages/metadata.csv";
pub const DEFAULT_COMBINED_NAME: &str = "sutd_undergrad_faq_all.txt";
