use crate::error::ReportError;
use crate::types::{ChunkProgress, Page};
use futures::StreamExt;
use log::{debug, info};
use reqwest::header::{CONTENT_RANGE, RANGE};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

pub const DEFAULT_API_BASE_URL: &str = "https://dfareporting.googleapis.com/dfareporting/v4";

/// Handle to the reporting service. Built once in `main` and passed down.
#[derive(Clone)]
pub struct ReportingClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl ReportingClient {
    pub fn new(base_url: &str, access_token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        }
    }

    /// GET /userprofiles/{profileId}/reports/{reportId}/files
    pub async fn list_report_files(
        &self,
        profile_id: i64,
        report_id: i64,
        page_token: Option<&str>,
    ) -> Result<Page, ReportError> {
        let url = format!(
            "{}/userprofiles/{}/reports/{}/files",
            self.base_url, profile_id, report_id
        );
        info!("Listing report files: {} (page token: {:?})", url, page_token);

        let mut req = self.client.get(&url).bearer_auth(&self.access_token);
        if let Some(token) = page_token {
            req = req.query(&[("pageToken", token)]);
        }

        let resp = check_response(req.send().await?).await?;
        resp.json::<Page>()
            .await
            .map_err(|e| ReportError::ParseError(e.to_string()))
    }

    /// Prepares a ranged download of `/reports/{reportId}/files/{fileId}?alt=media`
    /// into `writer`. Nothing is requested until the first `next_chunk`.
    pub fn media_download<W>(
        &self,
        report_id: &str,
        file_id: &str,
        writer: W,
        chunk_size: u64,
    ) -> MediaDownload<W>
    where
        W: AsyncWrite + Unpin,
    {
        MediaDownload {
            client: self.client.clone(),
            url: format!("{}/reports/{}/files/{}", self.base_url, report_id, file_id),
            access_token: self.access_token.clone(),
            writer,
            chunk_size: chunk_size.max(1),
            offset: 0,
            total: None,
            done: false,
            chunks_fetched: 0,
        }
    }
}

/// Copies a remote object into a writer one `Range` request at a time.
pub struct MediaDownload<W> {
    client: reqwest::Client,
    url: String,
    access_token: String,
    writer: W,
    chunk_size: u64,
    offset: u64,
    total: Option<u64>,
    done: bool,
    chunks_fetched: usize,
}

impl<W> MediaDownload<W>
where
    W: AsyncWrite + Unpin,
{
    pub async fn next_chunk(&mut self) -> Result<ChunkProgress, ReportError> {
        if self.done {
            return Ok(self.progress());
        }

        let end = self.offset.saturating_add(self.chunk_size - 1);
        debug!("Requesting bytes {}-{} of {}", self.offset, end, self.url);

        let resp = self
            .client
            .get(&self.url)
            .query(&[("alt", "media")])
            .bearer_auth(&self.access_token)
            .header(RANGE, format!("bytes={}-{}", self.offset, end))
            .send()
            .await?;
        self.chunks_fetched += 1;

        match resp.status() {
            StatusCode::PARTIAL_CONTENT => {
                let range = resp
                    .headers()
                    .get(CONTENT_RANGE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(parse_content_range);
                let total = match range {
                    Some((start, _)) if start != self.offset => {
                        return Err(ReportError::DownloadError(format!(
                            "server returned bytes from offset {} but {} was requested",
                            start, self.offset
                        )));
                    }
                    Some((_, total)) => total,
                    None => None,
                };
                let received = self.write_body(resp).await?;
                if received == 0 {
                    return Err(ReportError::DownloadError(format!(
                        "server returned an empty chunk at offset {}",
                        self.offset
                    )));
                }
                self.offset += received;
                self.total = total;
                self.done = match total {
                    Some(total) => self.offset >= total,
                    None => received < self.chunk_size,
                };
            }
            StatusCode::OK => {
                // Range ignored; the whole object is in this response.
                let received = self.write_body(resp).await?;
                self.offset += received;
                self.total = Some(self.offset);
                self.done = true;
            }
            // Nothing left past `offset`: an empty object, or an unknown-length
            // one whose size is a multiple of the chunk size.
            StatusCode::RANGE_NOT_SATISFIABLE if self.offset == 0 || self.total.is_none() => {
                self.total = Some(self.offset);
                self.done = true;
            }
            _ => {
                check_response(resp).await?;
                return Err(ReportError::DownloadError(format!(
                    "unexpected response while downloading {}",
                    self.url
                )));
            }
        }

        if self.done {
            self.writer.flush().await?;
        }
        Ok(self.progress())
    }

    pub fn chunks_fetched(&self) -> usize {
        self.chunks_fetched
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn progress(&self) -> ChunkProgress {
        ChunkProgress {
            bytes_written: self.offset,
            total: self.total,
            done: self.done,
        }
    }

    async fn write_body(&mut self, resp: Response) -> Result<u64, ReportError> {
        let mut received: u64 = 0;
        let mut stream = resp.bytes_stream();
        while let Some(piece) = stream.next().await {
            let piece = piece.map_err(|e| ReportError::DownloadError(e.to_string()))?;
            self.writer.write_all(&piece).await?;
            received += piece.len() as u64;
        }
        Ok(received)
    }
}

/// Start offset and total length from `Content-Range: bytes a-b/total`. The
/// total is `None` when the server sends `*`.
fn parse_content_range(value: &str) -> Option<(u64, Option<u64>)> {
    let (range, total) = value.trim().strip_prefix("bytes ")?.split_once('/')?;
    let start = range.split_once('-')?.0.trim().parse().ok()?;
    Some((start, total.trim().parse().ok()))
}

/// Maps 401 to `AuthorizationRevoked` and other failures to `ReportError::Api`.
async fn check_response(resp: Response) -> Result<Response, ReportError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ReportError::AuthorizationRevoked);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body,
    };
    Err(ReportError::Api {
        status: status.as_u16(),
        message,
    })
}
