use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use scraper::Html;

use crate::config::LINKS_SEPARATOR;
use crate::csvio::{self, LinkRecord};

use super::{accordion_entries, html_files_sorted, read_to_string_lossy};

const NO_LINKS_FILE: &str = "faq_no_links.txt";
const WITH_LINKS_FILE: &str = "faq_with_links.txt";
const LINKS_CSV_FILE: &str = "faq_links_to_visit.csv";

pub struct LinksOptions {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub archive_dir: PathBuf,
}

/// Answers from one page partitioned by hyperlink presence. Every matched
/// answer lands in exactly one of the two entry lists; `records` carries one
/// row per href found in a with-links answer.
#[derive(Default)]
pub struct Segregated {
    pub no_links: Vec<String>,
    pub with_links: Vec<String>,
    pub records: Vec<LinkRecord>,
}

impl Segregated {
    fn extend(&mut self, other: Segregated) {
        self.no_links.extend(other.no_links);
        self.with_links.extend(other.with_links);
        self.records.extend(other.records);
    }
}

/// Segregate one page's accordion answers. Unlike FAQ extraction, empty
/// questions or answers are kept here; classification only looks at hrefs.
pub fn segregate(html: &str, source_file: &str) -> Segregated {
    let doc = Html::parse_document(html);
    let mut out = Segregated::default();

    for entry in accordion_entries(&doc) {
        let block = format!("{}\n{}\n\n{}\n", LINKS_SEPARATOR, entry.question, entry.answer);
        if entry.links.is_empty() {
            out.no_links.push(block);
        } else {
            out.with_links.push(block);
            for link in &entry.links {
                out.records.push(LinkRecord {
                    question: entry.question.clone(),
                    link: link.clone(),
                    source_file: source_file.to_string(),
                });
            }
        }
    }
    out
}

/// `links` subcommand: split the corpus into immediately-usable entries and
/// link-bearing ones, and record every link for the follow-up crawl.
pub fn run(opts: &LinksOptions) -> Result<()> {
    fs::create_dir_all(&opts.processed_dir)
        .with_context(|| format!("creating {}", opts.processed_dir.display()))?;
    fs::create_dir_all(&opts.archive_dir)
        .with_context(|| format!("creating {}", opts.archive_dir.display()))?;

    let html_files = html_files_sorted(&opts.raw_dir)?;
    if html_files.is_empty() {
        bail!(
            "No .html files found in {}. Did you run fetch first?",
            opts.raw_dir.display()
        );
    }

    let mut all = Segregated::default();
    for path in &html_files {
        let html = read_to_string_lossy(path)?;
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        all.extend(segregate(&html, &name));
    }

    let no_links_path = opts.processed_dir.join(NO_LINKS_FILE);
    fs::write(&no_links_path, all.no_links.concat())
        .with_context(|| format!("writing {}", no_links_path.display()))?;

    let with_links_path = opts.archive_dir.join(WITH_LINKS_FILE);
    fs::write(&with_links_path, all.with_links.concat())
        .with_context(|| format!("writing {}", with_links_path.display()))?;

    csvio::append_rows(&opts.archive_dir.join(LINKS_CSV_FILE), &all.records)?;

    println!("No-link Q&A: {}", all.no_links.len());
    println!("With-link Q&A: {}", all.with_links.len());
    println!("Links extracted: {}", all.records.len());
    Ok(())
}

// ── Tests ──
