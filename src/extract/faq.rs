use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use scraper::Html;

use crate::config::{FAQ_SUFFIX, QA_SEPARATOR};
use crate::text;

use super::{accordion_entries, html_files_sorted, read_to_string_lossy};

/// A normalized question/answer pair; both sides are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

pub struct FaqOptions {
    pub raw_dir: PathBuf,
    pub out_dir: PathBuf,
    pub combine: bool,
    pub combined_name: String,
    pub archive_dir: PathBuf,
}

/// Extract ordered Q&A pairs from one page. Pairs where either side
/// normalizes to empty are dropped; duplicates are kept.
pub fn extract_faq(html: &str) -> Vec<QaPair> {
    let doc = Html::parse_document(html);
    accordion_entries(&doc)
        .into_iter()
        .filter_map(|entry| {
            let question = text::clean(&entry.question);
            let answer = text::clean(&entry.answer);
            if question.is_empty() || answer.is_empty() {
                return None;
            }
            Some(QaPair { question, answer })
        })
        .collect()
}

/// Serialize pairs as separator / question / blank / answer / blank blocks.
/// Zero pairs render as an empty string; the per-page file is still written.
pub fn render_qa_txt(pairs: &[QaPair]) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(pairs.len() * 5);
    for pair in pairs {
        parts.push(QA_SEPARATOR);
        parts.push(&pair.question);
        parts.push("");
        parts.push(&pair.answer);
        parts.push("");
    }
    parts.join("\n").trim_end().to_string()
}

fn faq_files_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .map(|n| n.to_string_lossy().ends_with(FAQ_SUFFIX))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Concatenate every per-page FAQ file (sorted by filename, blank line
/// between files) into one corpus file inside the same directory.
pub fn combine_faq_files(processed_dir: &Path, combined_name: &str) -> Result<PathBuf> {
    let files = faq_files_sorted(processed_dir)?;
    if files.is_empty() {
        bail!(
            "No *{} files found in {}. Run extraction first.",
            FAQ_SUFFIX,
            processed_dir.display()
        );
    }
    let texts = files
        .iter()
        .map(|f| read_to_string_lossy(f))
        .collect::<Result<Vec<_>>>()?;
    let combined_path = processed_dir.join(combined_name);
    fs::write(&combined_path, texts.join("\n\n"))
        .with_context(|| format!("writing {}", combined_path.display()))?;
    Ok(combined_path)
}

/// Count separator lines in the combined corpus; must equal the total number
/// of pairs the contributing pages produced.
pub fn count_questions(combined_path: &Path) -> Result<usize> {
    Ok(read_to_string_lossy(combined_path)?.matches(QA_SEPARATOR).count())
}

/// Move per-page FAQ files into the archive after combining. Returns the
/// number moved.
pub fn archive_faq_files(processed_dir: &Path, archive_dir: &Path) -> Result<usize> {
    fs::create_dir_all(archive_dir)
        .with_context(|| format!("creating {}", archive_dir.display()))?;
    let mut moved = 0;
    for file in faq_files_sorted(processed_dir)? {
        let Some(name) = file.file_name() else { continue };
        fs::rename(&file, archive_dir.join(name))
            .with_context(|| format!("archiving {}", file.display()))?;
        moved += 1;
    }
    Ok(moved)
}

/// `faq` subcommand: per-page extraction, then optionally combine, verify
/// the separator count, and archive the per-page files.
pub fn run(opts: &FaqOptions) -> Result<()> {
    fs::create_dir_all(&opts.out_dir)
        .with_context(|| format!("creating {}", opts.out_dir.display()))?;

    let html_files = html_files_sorted(&opts.raw_dir)?;
    if html_files.is_empty() {
        bail!(
            "No .html files found in {}. Did you run fetch first?",
            opts.raw_dir.display()
        );
    }

    let mut total = 0usize;
    for path in &html_files {
        let html = read_to_string_lossy(path)?;
        let pairs = extract_faq(&html);

        let stem = path.file_stem().unwrap_or_default().to_string_lossy();
        let out_name = format!("{stem}{FAQ_SUFFIX}");
        let out_path = opts.out_dir.join(&out_name);
        fs::write(&out_path, render_qa_txt(&pairs))
            .with_context(|| format!("writing {}", out_path.display()))?;

        total += pairs.len();
        println!(
            "{} -> {} | extracted {} Q&A",
            path.file_name().unwrap_or_default().to_string_lossy(),
            out_name,
            pairs.len()
        );
    }
    println!(
        "Done. Extracted {} total Q&A pairs from {} pages.",
        total,
        html_files.len()
    );

    if opts.combine {
        let combined = combine_faq_files(&opts.out_dir, &opts.combined_name)?;
        println!("Combined corpus written to {}", combined.display());
        println!("Number of questions: {}", count_questions(&combined)?);

        let moved = archive_faq_files(&opts.out_dir, &opts.archive_dir)?;
        println!(
            "Moved {} per-page FAQ files to {}",
            moved,
            opts.archive_dir.display()
        );
    }
    Ok(())
}

// ── Tests ──
