//! Shared accordion traversal for the FAQ and link stages.
//!
//! Both stages pair each accordion heading with the nearest *following*
//! rich-text block in whole-document order, so the walk lives here and the
//! stages differ only in how they filter and serialize the entries.

pub mod content;
pub mod faq;
pub mod links;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use scraper::{ElementRef, Html, Selector};

use crate::config;
use crate::text;

static ACCORDION_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(config::ACCORDION_SELECTOR).unwrap());
static QUESTION_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(config::QUESTION_SELECTOR).unwrap());
static HREF_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// One heading and the answer block it bound to.
pub struct AccordionEntry {
    /// Heading text, fragments joined by single spaces. May be empty.
    pub question: String,
    /// Answer text, fragments joined by newlines. May be empty.
    pub answer: String,
    /// Hrefs inside the answer, site-relative ones made absolute.
    pub links: Vec<String>,
}

/// Walk the FAQ accordion of a parsed page.
///
/// Missing container yields an empty vec, never an error. Headings without
/// any following rich-text block are skipped; adjacent headings with no
/// block between them both bind the same downstream block. The answer scan
/// runs over the whole document, so a block after the accordion closes can
/// still answer the last heading.
pub fn accordion_entries(doc: &Html) -> Vec<AccordionEntry> {
    let Some(accordion) = doc.select(&ACCORDION_SEL).next() else {
        return Vec::new();
    };

    // Document-order element list; answer pairing is a forward linear scan
    // from each heading's position.
    let elements: Vec<ElementRef> = doc
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .collect();

    let mut entries = Vec::new();
    for heading in accordion.select(&QUESTION_SEL) {
        let Some(start) = elements.iter().position(|el| el.id() == heading.id()) else {
            continue;
        };
        let Some(answer_el) = elements[start + 1..]
            .iter()
            .copied()
            .find(|el| is_answer_block(*el))
        else {
            continue;
        };

        let links = answer_el
            .select(&HREF_SEL)
            .filter_map(|a| a.value().attr("href"))
            .map(absolutize)
            .collect();

        entries.push(AccordionEntry {
            question: text::joined_text(heading, " "),
            answer: text::joined_text(answer_el, "\n"),
            links,
        });
    }
    entries
}

fn is_answer_block(el: ElementRef<'_>) -> bool {
    el.value().name() == "div" && el.value().classes().any(|c| c == config::ANSWER_CLASS)
}

/// Site-relative hrefs get the fixed origin prefixed; every other form
/// (absolute, mailto:, javascript:, empty) passes through untouched.
pub fn absolutize(href: &str) -> String {
    if href.starts_with('/') {
        format!("{}{}", config::SITE_ORIGIN, href)
    } else {
        href.to_string()
    }
}

/// Raw HTML on disk may carry stray bytes from badly-labeled pages; read it
/// lossily rather than failing the batch item.
pub fn read_to_string_lossy(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// All `*.html` files in `dir`, sorted by filename.
pub fn html_files_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "html"))
        .collect();
    files.sort();
    Ok(files)
}

// ── Tests ──
