use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFile {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub report_id: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub format: FileFormat,
    #[serde(default)]
    pub status: FileStatus,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub last_modified_time: Option<String>,
    #[serde(default)]
    pub date_range: Option<DateRange>,
    #[serde(default)]
    pub urls: Option<FileUrls>,
}

impl ReportFile {
    /// Display name, or an empty string when the service omitted it.
    pub fn file_name_or_empty(&self) -> &str {
        self.file_name.as_deref().unwrap_or("")
    }

    pub fn browser_url(&self) -> Option<&str> {
        self.urls.as_ref()?.browser_url.as_deref()
    }
}

/// Period the file's data covers, as `YYYY-MM-DD` strings.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUrls {
    #[serde(default)]
    pub browser_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum FileFormat {
    #[serde(rename = "CSV")]
    Csv,
    #[serde(rename = "XML")]
    Xml,
    #[default]
    #[serde(other)]
    Other,
}

impl FileFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Xml | FileFormat::Other => "xml",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileFormat::Csv => "CSV",
            FileFormat::Xml => "XML",
            FileFormat::Other => "OTHER",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileStatus {
    ReportAvailable,
    Processing,
    Queued,
    Failed,
    Cancelled,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileStatus::ReportAvailable => "REPORT_AVAILABLE",
            FileStatus::Processing => "PROCESSING",
            FileStatus::Queued => "QUEUED",
            FileStatus::Failed => "FAILED",
            FileStatus::Cancelled => "CANCELLED",
            FileStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// One response of the paged file list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default)]
    pub items: Vec<ReportFile>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl Page {
    /// Token to request the following page with. Ignored once a page comes
    /// back empty.
    pub fn continuation(&self) -> Option<&str> {
        if self.items.is_empty() {
            return None;
        }
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub files: Vec<ReportFile>,
    pub last_seen: Option<ReportFile>,
    pub pages_fetched: usize,
    pub truncated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkProgress {
    pub bytes_written: u64,
    pub total: Option<u64>,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadOutcome {
    Downloaded {
        file_id: String,
        path: PathBuf,
        bytes: u64,
        chunks: usize,
    },
    NotAvailable {
        file_id: String,
        status: FileStatus,
    },
}

#[derive(Debug, Default)]
pub struct WorkflowReport {
    pub listing: Option<Listing>,
    pub download: Option<DownloadOutcome>,
    pub authorization_failed: bool,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    }))
}
