//! Append-mode CSV logs shared by the pipeline stages.
//!
//! Each log keeps one header row, written when the file is first created;
//! later runs append rows, so logs accumulate across runs.

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One row per attempted URL in the fetch metadata log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchRecord {
    pub url: String,
    /// Path of the stored raw HTML file; empty when the fetch failed.
    pub raw_path: String,
    /// Final HTTP status as a string, or `EXCEPTION` for transport errors.
    pub status: String,
    /// ISO-8601 UTC timestamp taken just before the first attempt.
    pub retrieved_at: String,
    pub bytes: usize,
    pub error: String,
}

/// One row per hyperlink found inside an answer block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRecord {
    pub question: String,
    pub link: String,
    pub source_file: String,
}

/// One row per page processed by the content extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    pub source_url: String,
    pub raw_file: String,
    pub out_file: String,
    pub chars: usize,
}

/// Append `rows` to the CSV at `path`, creating parent directories and
/// writing the header row only if the file does not exist yet.
pub fn append_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let write_header = !path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(write_header)
        .from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_csv(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "faq_scraper_csvio_{}_{}.csv",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn header_written_once_across_appends() {
        let path = temp_csv("header");
        let row = LinkRecord {
            question: "Q?".into(),
            link: "https://example.com".into(),
            source_file: "a.html".into(),
        };
        append_rows(&path, std::slice::from_ref(&row)).unwrap();
        append_rows(&path, std::slice::from_ref(&row)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let headers: Vec<_> = content
            .lines()
            .filter(|l| *l == "question,link,source_file")
            .collect();
        assert_eq!(headers.len(), 1);
        assert_eq!(content.lines().count(), 3);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn fetch_records_round_trip_by_header_name() {
        let path = temp_csv("fetch");
        let row = FetchRecord {
            url: "https://www.sutd.edu.sg/faq".into(),
            raw_path: "data/raw/faq.html".into(),
            status: "200".into(),
            retrieved_at: "2024-01-01T00:00:00+00:00".into(),
            bytes: 123,
            error: String::new(),
        };
        append_rows(&path, &[row]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let parsed: Vec<FetchRecord> = reader.deserialize().map(Result::unwrap).collect();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].status, "200");
        assert_eq!(parsed[0].bytes, 123);
        std::fs::remove_file(&path).unwrap();
    }
}
