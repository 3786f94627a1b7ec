use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use reqwest::blocking::Client;
use tracing::warn;
use url::Url;

use crate::csvio::{self, FetchRecord};

/// Seconds multiplied by the failed-attempt index for the linear backoff.
const BACKOFF_SECS: f64 = 1.5;

pub struct FetchOptions {
    pub seed: PathBuf,
    pub out_dir: PathBuf,
    pub meta: PathBuf,
    pub delay: f64,
    pub timeout: u64,
    pub retries: u32,
    pub user_agent: String,
}

/// Final result of one URL's retry loop.
pub struct FetchOutcome {
    pub body: Option<String>,
    /// Last HTTP status as a string, or `EXCEPTION` after a transport error.
    pub status: String,
    pub error: Option<String>,
}

/// Retry loop over an injected attempt: `retries` extra tries after the
/// first, success only on exact HTTP 200, linear backoff `base * k` after
/// the k-th failed attempt. The sleep is injected too so tests can pin the
/// schedule without waiting.
pub fn fetch_with_retry<A, S>(
    mut attempt: A,
    retries: u32,
    backoff: Duration,
    mut sleep: S,
) -> FetchOutcome
where
    A: FnMut() -> Result<(u16, String), String>,
    S: FnMut(Duration),
{
    let mut status = String::new();
    let mut last_err = None;

    for try_ix in 0..=retries {
        match attempt() {
            Ok((code, body)) => {
                status = code.to_string();
                if code == 200 {
                    return FetchOutcome {
                        body: Some(body),
                        status,
                        error: None,
                    };
                }
                last_err = Some(format!("HTTP_{code}"));
            }
            Err(e) => {
                status = "EXCEPTION".to_string();
                last_err = Some(e);
            }
        }
        if try_ix < retries {
            sleep(backoff.mul_f64((try_ix + 1) as f64));
        }
    }

    FetchOutcome {
        body: None,
        status,
        error: last_err,
    }
}

/// One blocking GET; transport errors become the `Err` string.
fn http_attempt(client: &Client, url: &str) -> Result<(u16, String), String> {
    let resp = client.get(url).send().map_err(|e| e.to_string())?;
    let status = resp.status().as_u16();
    let charset = header_charset(&resp);
    let bytes = resp.bytes().map_err(|e| e.to_string())?;
    Ok((status, crate::encoding::decode_body(&bytes, charset.as_deref())))
}

fn header_charset(resp: &reqwest::blocking::Response) -> Option<String> {
    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)?
        .to_str()
        .ok()?;
    content_type.split(';').find_map(|part| {
        let part = part.trim();
        if part.len() > 8 && part[..8].eq_ignore_ascii_case("charset=") {
            Some(part[8..].trim_matches('"').to_string())
        } else {
            None
        }
    })
}

/// Stable filename-ish slug for a URL: path with `/`→`_` (or `root` for the
/// bare origin), then the query with `=`/`&`→`_` appended if present. The
/// fragment never participates, so paginated URLs stay distinct while
/// anchored ones collapse.
pub fn slugify(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        // Not a parseable absolute URL; flatten it wholesale.
        return url.replace(['/', ':', '?', '=', '&', '#'], "_");
    };
    let path = parsed.path().trim_matches('/').replace('/', "_");
    let path = if path.is_empty() { "root".to_string() } else { path };
    match parsed.query() {
        Some(q) if !q.is_empty() => format!("{}_{}", path, q.replace(['=', '&'], "_")),
        _ => path,
    }
}

fn parse_seed_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

pub fn read_seed_urls(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading seed file {}", path.display()))?;
    Ok(parse_seed_lines(&contents))
}

/// `fetch` subcommand: one sequential pass over the seed list, politeness
/// delay between requests, raw HTML by slug, one metadata row per URL.
pub fn run(opts: &FetchOptions) -> Result<()> {
    fs::create_dir_all(&opts.out_dir)
        .with_context(|| format!("creating {}", opts.out_dir.display()))?;

    let urls = read_seed_urls(&opts.seed)?;
    if urls.is_empty() {
        bail!("No URLs found in {}", opts.seed.display());
    }

    let client = Client::builder()
        .user_agent(&opts.user_agent)
        .timeout(Duration::from_secs(opts.timeout))
        .build()?;

    let total = urls.len();
    let mut results: Vec<FetchRecord> = Vec::with_capacity(total);

    for (i, url) in urls.iter().enumerate() {
        println!("[{}/{}] Fetching: {}", i + 1, total, url);

        let retrieved_at = Utc::now().to_rfc3339();
        let outcome = fetch_with_retry(
            || http_attempt(&client, url),
            opts.retries,
            Duration::from_secs_f64(BACKOFF_SECS),
            thread::sleep,
        );

        match outcome.body {
            Some(html) => {
                let raw_path = opts.out_dir.join(format!("{}.html", slugify(url)));
                fs::write(&raw_path, &html)
                    .with_context(|| format!("writing {}", raw_path.display()))?;
                results.push(FetchRecord {
                    url: url.clone(),
                    raw_path: raw_path.display().to_string(),
                    status: outcome.status,
                    retrieved_at,
                    bytes: html.len(),
                    error: String::new(),
                });
            }
            None => {
                let error = outcome.error.unwrap_or_else(|| "UNKNOWN_ERROR".to_string());
                warn!("Fetch failed for {}: {}", url, error);
                results.push(FetchRecord {
                    url: url.clone(),
                    raw_path: String::new(),
                    status: outcome.status,
                    retrieved_at,
                    bytes: 0,
                    error,
                });
            }
        }

        // Politeness delay between requests, not after the last one.
        if i + 1 < total {
            thread::sleep(Duration::from_secs_f64(opts.delay));
        }
    }

    csvio::append_rows(&opts.meta, &results)?;
    println!(
        "Done. HTML saved to {} and metadata written to {}",
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
    fn retry_twice_then_succeed() {
        let mut calls = 0u32;
        let mut sleeps: Vec<Duration> = Vec::new();
        let outcome = fetch_with_retry(
            || {
                calls += 1;
                if calls <= 2 {
                    Err("connection reset".to_string())
                } else {
                    Ok((200, "ok".to_string()))
                }
            },
            2,
            Duration::from_millis(1500),
            |d| sleeps.push(d),
        );
        assert_eq!(outcome.body.as_deref(), Some("ok"));
        assert_eq!(outcome.status, "200");
        assert!(outcome.error.is_none());
        // exactly two backoff sleeps, linear: base*1 then base*2
        assert_eq!(
            sleeps,
            vec![Duration::from_millis(1500), Duration::from_millis(3000)]
        );
    }

    #[test]
    fn non_200_exhausts_all_retries() {
        let mut calls = 0u32;
        let mut sleeps = 0u32;
        let outcome = fetch_with_retry(
            || {
                calls += 1;
                Ok((503, String::new()))
            },
            2,
            Duration::from_secs(1),
            |_| sleeps += 1,
        );
        assert_eq!(calls, 3);
        assert_eq!(sleeps, 2);
        assert!(outcome.body.is_none());
        assert_eq!(outcome.status, "503");
        assert_eq!(outcome.error.as_deref(), Some("HTTP_503"));
    }

    #[test]
    fn immediate_success_never_sleeps() {
        let mut sleeps = 0u32;
        let outcome = fetch_with_retry(
            || Ok((200, "body".to_string())),
            2,
            Duration::from_secs(1),
            |_| sleeps += 1,
        );
        assert_eq!(sleeps, 0);
        assert_eq!(outcome.body.as_deref(), Some("body"));
    }

    #[test]
    fn status_reflects_last_attempt() {
        let mut calls = 0u32;
        let outcome = fetch_with_retry(
            || {
                calls += 1;
                if calls == 1 {
                    Err("timeout".to_string())
                } else {
                    Ok((404, String::new()))
                }
            },
            1,
            Duration::from_secs(1),
            |_| {},
        );
        assert_eq!(outcome.status, "404");
        assert_eq!(outcome.error.as_deref(), Some("HTTP_404"));
    }

    #[test]
    fn slugify_keeps_path_and_query() {
        assert_eq!(
            slugify("https://www.sutd.edu.sg/admissions/undergraduate/faq/?paged=2&tab=all"),
            "admissions_undergraduate_faq_paged_2_tab_all"
        );
    }

    #[test]
    fn slugify_ignores_fragment() {
        assert_eq!(
            slugify("https://www.sutd.edu.sg/admissions/faq#section-3"),
            slugify("https://www.sutd.edu.sg/admissions/faq")
        );
    }

    #[test]
    fn slugify_bare_origin_is_root() {
        assert_eq!(slugify("https://www.sutd.edu.sg/"), "root");
        assert_eq!(slugify("https://www.sutd.edu.sg"), "root");
    }

    #[test]
    fn slugify_is_deterministic() {
        let url = "https://www.sutd.edu.sg/faq/?paged=1";
        assert_eq!(slugify(url), slugify(url));
    }

    #[test]
    fn seed_lines_skip_blanks_and_comments() {
        let seeds = parse_seed_lines(
            "https://a.example/one\n\n# comment\n  https://a.example/two  \n#https://a.example/three\n",
        );
        assert_eq!(seeds, vec!["https://a.example/one", "https://a.example/two"]);
    }
}
