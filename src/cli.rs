use crate::client::DEFAULT_API_BASE_URL;
use crate::downloader::DEFAULT_CHUNK_SIZE;
use crate::lister::DEFAULT_MAX_PAGES;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "List the files of a report and download the last one", long_about = None)]
pub struct Cli {
    /// The ID of the profile to use
    pub profile_id: i64,

    /// The ID of the report to list files for
    pub report_id: i64,

    /// OAuth 2.0 access token for the reporting API
    #[arg(long, env = "DFAREPORTING_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    /// Base URL of the reporting API
    #[arg(long, env = "DFAREPORTING_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Directory the downloaded file is written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Bytes requested per download chunk
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, value_parser = clap::value_parser!(u64).range(1..))]
    pub chunk_size: u64,

    /// Maximum number of list pages to request
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES as u64, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_pages: u64,

    /// Write every listed file to this CSV file (optional)
    #[arg(short, long, default_value = None)]
    pub manifest: Option<PathBuf>,
}
