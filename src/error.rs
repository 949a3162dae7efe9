use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("The credentials have been revoked or expired, please re-run the application to re-authorize")]
    AuthorizationRevoked,

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Download failed: {0}")]
    DownloadError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl ReportError {
    /// The only failure the workflow recovers from.
    pub fn is_authorization_revoked(&self) -> bool {
        matches!(self, ReportError::AuthorizationRevoked)
    }
}
