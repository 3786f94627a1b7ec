mod config;
mod csvio;
mod encoding;
mod extract;
mod fetch;
mod text;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use extract::content::ContentOptions;
use extract::faq::FaqOptions;
use extract::links::LinksOptions;
use fetch::FetchOptions;

#[derive(Parser)]
#[command(name = "faq_scraper", about = "Fetch SUTD FAQ pages and build a text corpus")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch raw HTML from the seed URL list
    Fetch {
        /// Path to the newline-delimited seed file
        #[arg(long, default_value = config::DEFAULT_SEED_FILE)]
        seed: PathBuf,
        /// Output directory for raw HTML
        #[arg(long, default_value = config::DEFAULT_RAW_DIR)]
        out: PathBuf,
        /// Fetch metadata CSV path
        #[arg(long, default_value = config::DEFAULT_FETCH_META)]
        meta: PathBuf,
        /// Delay (seconds) between requests
        #[arg(long, default_value_t = 2.0)]
        delay: f64,
        /// Request timeout (seconds)
        #[arg(long, default_value_t = 20)]
        timeout: u64,
        /// Retries after a failed attempt
        #[arg(long, default_value_t = 2)]
        retries: u32,
        /// User-Agent string
        #[arg(long, default_value = config::DEFAULT_USER_AGENT)]
        user_agent: String,
    },
    /// Extract FAQ Q&A pairs from raw HTML into per-page text files
    Faq {
        /// Directory containing raw .html files
        #[arg(long, default_value = config::DEFAULT_RAW_DIR)]
        raw: PathBuf,
        /// Directory for extracted FAQ .txt files
        #[arg(long, default_value = config::DEFAULT_PROCESSED_DIR)]
        out: PathBuf,
        /// Combine per-page outputs into a single corpus, then archive them
        #[arg(long)]
        combine: bool,
        /// Filename for the combined corpus (written into --out)
        #[arg(long, default_value = config::DEFAULT_COMBINED_NAME)]
        combined_name: String,
        /// Directory the per-page files are moved to after combining
        #[arg(long, default_value = config::DEFAULT_ARCHIVE_DIR)]
        archive: PathBuf,
    },
    /// Extract main page content from raw HTML into per-page text files
    Content {
        /// Directory of raw .html files
        #[arg(long, default_value = config::DEFAULT_PAGES_RAW_DIR)]
        raw: PathBuf,
        /// Directory for cleaned .txt files
        #[arg(long, default_value = config::DEFAULT_PAGES_OUT_DIR)]
        out: PathBuf,
        /// Content metadata CSV output path
        #[arg(long, default_value = config::DEFAULT_PAGES_META)]
        meta: PathBuf,
        /// Fetch metadata CSV used to map raw files back to source URLs
        #[arg(long, default_value = config::DEFAULT_PAGES_URL_MAP)]
        url_map: PathBuf,
    },
    /// Split FAQ answers by hyperlink presence and record links to crawl
    Links {
        /// Directory containing raw .html files
        #[arg(long, default_value = config::DEFAULT_RAW_DIR)]
        raw: PathBuf,
        /// Directory for the usable (no-link) corpus
        #[arg(long, default_value = config::DEFAULT_PROCESSED_DIR)]
        processed: PathBuf,
        /// Directory for archived entries and the link CSV
        #[arg(long, default_value = config::DEFAULT_ARCHIVE_DIR)]
        archive: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Fetch {
            seed,
            out,
            meta,
            delay,
            timeout,
            retries,
            user_agent,
        } => fetch::run(&FetchOptions {
            seed,
            out_dir: out,
            meta,
            delay,
            timeout,
            retries,
            user_agent,
        }),
        Commands::Faq {
            raw,
            out,
            combine,
            combined_name,
            archive,
        } => extract::faq::run(&FaqOptions {
            raw_dir: raw,
            out_dir: out,
            combine,
            combined_name,
            archive_dir: archive,
        }),
        Commands::Content {
            raw,
            out,
            meta,
            url_map,
        } => extract::content::run(&ContentOptions {
            raw_dir: raw,
            out_dir: out,
            meta,
            url_map,
        }),
        Commands::Links {
            raw,
            processed,
            archive,
        } => extract::links::run(&LinksOptions {
            raw_dir: raw,
            processed_dir: processed,
            archive_dir: archive,
        }),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}
