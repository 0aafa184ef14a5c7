use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_INDEX_URL: &str = "https://docs.aws.amazon.com/IAM/latest/UserGuide/reference_policies_actions-resources-contextkeys.html";

#[derive(Parser, Debug)]
#[command(
    name = "iam-actions",
    version,
    about = "Extract per-action IAM permission records from the service authorization reference"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the services linked from the reference index page.
    Index(IndexArgs),
    /// Fetch every service page and write one JSON document per service.
    Scrape(ScrapeArgs),
    /// Extract a single saved service page.
    Extract(ExtractArgs),
    /// Summarize the most recent scrape run.
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct IndexArgs {
    /// Index page URL, `file://` URL or local path.
    #[arg(long, default_value = DEFAULT_INDEX_URL)]
    pub index_url: String,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

#[derive(Args, Debug, Clone)]
pub struct ScrapeArgs {
    #[arg(long, default_value = DEFAULT_INDEX_URL)]
    pub index_url: String,

    #[arg(long, default_value = "services")]
    pub output_dir: PathBuf,

    /// Only scrape services with this exact index name. Repeatable.
    #[arg(long = "service")]
    pub services: Vec<String>,

    #[arg(long)]
    pub limit: Option<usize>,

    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long)]
    pub input: PathBuf,

    /// Human-readable service name; defaults to the input file stem.
    #[arg(long)]
    pub service_name: Option<String>,

    #[arg(long, default_value = "services")]
    pub output_dir: PathBuf,

    /// Print the document instead of writing it.
    #[arg(long, default_value_t = false)]
    pub stdout: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "services")]
    pub output_dir: PathBuf,
}
