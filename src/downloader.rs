use crate::client::ReportingClient;
use crate::error::ReportError;
use crate::types::{DownloadOutcome, FileStatus, ReportFile};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, error};
use std::path::{Path, PathBuf};
use tokio::fs::File;

pub const DEFAULT_CHUNK_SIZE: u64 = 32 * 1024 * 1024;

pub struct Downloader {
    client: ReportingClient,
    output_dir: PathBuf,
    chunk_size: u64,
}

impl Downloader {
    pub fn new(client: ReportingClient, output_dir: PathBuf, chunk_size: u64) -> Self {
        Self {
            client,
            output_dir,
            chunk_size,
        }
    }

    /// Downloads `file` if the service reports it as available. Any other
    /// status leaves the filesystem untouched and issues no request.
    pub async fn download(&self, file: &ReportFile) -> Result<DownloadOutcome, ReportError> {
        if file.status != FileStatus::ReportAvailable {
            info!("Skipping file {}: status is {}", file.id, file.status);
            return Ok(DownloadOutcome::NotAvailable {
                file_id: file.id.clone(),
                status: file.status,
            });
        }

        let output_path = self.output_dir.join(generate_file_name(file));
        info!("Starting download: file {} -> {}", file.id, output_path.display());

        let pb = self.create_progress_bar(&output_path);
        let result = self.copy_chunks(file, &output_path, &pb).await;

        match result {
            Ok((bytes, chunks)) => {
                pb.finish();
                let path = tokio::fs::canonicalize(&output_path).await?;
                Ok(DownloadOutcome::Downloaded {
                    file_id: file.id.clone(),
                    path,
                    bytes,
                    chunks,
                })
            }
            Err(e) => {
                error!("Download failed for file {}: {}", file.id, e);
                pb.finish_with_message("Download failed");
                Err(e)
            }
        }
    }

    async fn copy_chunks(
        &self,
        file: &ReportFile,
        output_path: &Path,
        pb: &ProgressBar,
    ) -> Result<(u64, usize), ReportError> {
        let out = File::create(output_path).await?;
        let mut media = self
            .client
            .media_download(&file.report_id, &file.id, out, self.chunk_size);

        loop {
            let progress = media.next_chunk().await?;
            if let Some(total) = progress.total {
                pb.set_length(total);
            }
            pb.set_position(progress.bytes_written);
            if progress.done {
                let chunks = media.chunks_fetched();
                media.into_writer().sync_all().await?;
                return Ok((progress.bytes_written, chunks));
            }
        }
    }

    fn create_progress_bar(&self, output_path: &Path) -> ProgressBar {
        let pb = ProgressBar::new(0);
        pb.set_style(ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"));
        pb.set_message(output_path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string());
        pb
    }
}

/// `<fileName or id>.<csv|xml>`
pub fn generate_file_name(file: &ReportFile) -> String {
    let stem = match file.file_name.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => file.id.as_str(),
    };
    format!("{}.{}", stem, file.format.extension())
}
