//! Main-content extraction for arbitrary pages.
//!
//! Boilerplate subtrees are discarded outright, then the element with the
//! most visible text among a fixed list of likely containers wins. Pages
//! that match nothing fall back to the body, so a structurally odd page
//! yields best-effort text instead of an error.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use scraper::{ElementRef, Html, Selector};

use crate::config::{self, CONTENT_SUFFIX};
use crate::csvio::{self, ContentRecord, FetchRecord};
use crate::text;

use super::{html_files_sorted, read_to_string_lossy};

static REMOVE_SELS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    config::REMOVE_SELECTORS
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});
static CONTENT_SELS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    config::CONTENT_SELECTORS
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});
static BODY_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());

pub struct ContentOptions {
    pub raw_dir: PathBuf,
    pub out_dir: PathBuf,
    pub meta: PathBuf,
    pub url_map: PathBuf,
}

/// Extract the primary text of a page: strip boilerplate, pick the densest
/// container, join descendant text with paragraph breaks, normalize.
pub fn extract_main_text(html: &str) -> String {
    let mut doc = Html::parse_document(html);
    strip_boilerplate(&mut doc);
    let container = best_text_container(&doc);
    text::clean(&text::joined_text(container, "\n"))
}

/// Detach every subtree matching the boilerplate selector set. No salvage:
/// content nested inside a removed element goes with it.
fn strip_boilerplate(doc: &mut Html) {
    for sel in REMOVE_SELS.iter() {
        let ids: Vec<_> = doc.select(sel).map(|el| el.id()).collect();
        for id in ids {
            if let Some(mut node) = doc.tree.get_mut(id) {
                node.detach();
            }
        }
    }
}

/// Candidates come from the fixed selector list in order; the one with the
/// longest visible text wins, ties keeping collection order (stable sort).
/// No candidate → body, or the whole document if there is no body.
fn best_text_container(doc: &Html) -> ElementRef<'_> {
    let mut candidates: Vec<(usize, ElementRef)> = Vec::new();
    for sel in CONTENT_SELS.iter() {
        for el in doc.select(sel) {
            let len = text::joined_text(el, " ").chars().count();
            if len > 0 {
                candidates.push((len, el));
            }
        }
    }
    candidates.sort_by(|a, b| b.0.cmp(&a.0));
    if let Some(&(_, el)) = candidates.first() {
        return el;
    }
    doc.select(&BODY_SEL)
        .next()
        .unwrap_or_else(|| doc.root_element())
}

/// Map raw filename -> source URL from the fetch metadata log, if present.
/// Rows from failed fetches (empty raw_path) are skipped; duplicate
/// filenames across runs keep the last row, matching slug overwrites.
fn load_url_map(path: &Path) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    if !path.exists() {
        return Ok(map);
    }
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    for row in reader.deserialize::<FetchRecord>() {
        let Ok(row) = row else { continue };
        if row.raw_path.is_empty() || row.url.is_empty() {
            continue;
        }
        if let Some(name) = Path::new(&row.raw_path).file_name() {
            map.insert(name.to_string_lossy().into_owned(), row.url);
        }
    }
    Ok(map)
}

/// `content` subcommand: one cleaned text file per raw page plus a metadata
/// row linking it back to the source URL where the fetch log knows it.
pub fn run(opts: &ContentOptions) -> Result<()> {
    fs::create_dir_all(&opts.out_dir)
        .with_context(|| format!("creating {}", opts.out_dir.display()))?;

    let file_to_url = load_url_map(&opts.url_map)?;

    let html_files = html_files_sorted(&opts.raw_dir)?;
    if html_files.is_empty() {
        bail!(
            "No .html files found in {}. Did you run fetch with --out {}?",
            opts.raw_dir.display(),
            opts.raw_dir.display()
        );
    }

    let mut rows: Vec<ContentRecord> = Vec::with_capacity(html_files.len());
    for path in &html_files {
        let html = read_to_string_lossy(path)?;
        let extracted = extract_main_text(&html);

        let raw_file = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        let stem = path.file_stem().unwrap_or_default().to_string_lossy();
        let out_name = format!("{stem}{CONTENT_SUFFIX}");
        let out_path = opts.out_dir.join(&out_name);
        fs::write(&out_path, &extracted)
            .with_context(|| format!("writing {}", out_path.display()))?;

        let chars = extracted.chars().count();
        println!("{raw_file} -> {out_name} | chars={chars}");

        rows.push(ContentRecord {
            source_url: file_to_url.get(&raw_file).cloned().unwrap_or_default(),
            raw_file,
            out_file: out_name,
            chars,
        });
    }

    csvio::append_rows(&opts.meta, &rows)?;
    println!(
        "Done. Cleaned content written to {} and metadata to {}",
        opts.out_dir.display(),
        opts.meta.display()
    );
    Ok(())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_densest_container_and_drops_boilerplate() {
        let html = std::fs::read_to_string("tests/fixtures/content_page.html").unwrap();
        let extracted = extract_main_text(&html);
        assert_eq!(
            extracted,
            "Undergraduate Admissions\n\
             First paragraph about applying to the university.\n\
             Second paragraph with scholarship details and deadlines."
        );
    }

    #[test]
    fn boilerplate_subtrees_are_gone() {
        let html = std::fs::read_to_string("tests/fixtures/content_page.html").unwrap();
        let extracted = extract_main_text(&html);
        for gone in ["Home", "Footer boilerplate", "tracking", "color: #333"] {
            assert!(!extracted.contains(gone), "found {gone:?}");
        }
    }

    #[test]
    fn boilerplate_nested_in_content_is_removed() {
        let extracted = extract_main_text(
            "<main><p>keep this</p><script>var x = 1;</script></main>",
        );
        assert_eq!(extracted, "keep this");
    }

    #[test]
    fn longest_text_wins() {
        let extracted = extract_main_text(
            "<body>\
             <div class=\"content\">short</div>\
             <div class=\"main-content\">a much longer run of body text</div>\
             </body>",
        );
        assert_eq!(extracted, "a much longer run of body text");
    }

    #[test]
    fn ties_keep_selector_order() {
        // main and section carry equal-length text; main is queried first.
        let extracted = extract_main_text(
            "<body><section>bbbb</section><main>aaaa</main></body>",
        );
        assert_eq!(extracted, "aaaa");
    }

    #[test]
    fn falls_back_to_body_without_candidates() {
        let extracted =
            extract_main_text("<html><body><p>just a paragraph</p></body></html>");
        assert_eq!(extracted, "just a paragraph");
    }

    #[test]
    fn malformed_html_degrades_gracefully() {
        let extracted = extract_main_text("<main><p>unclosed <b>but readable");
        assert_eq!(extracted, "unclosed\nbut readable");
    }

    #[test]
    fn empty_input_yields_empty_text() {
        assert_eq!(extract_main_text(""), "");
    }
}
