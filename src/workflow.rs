use crate::client::ReportingClient;
use crate::downloader::Downloader;
use crate::error::ReportError;
use crate::lister::ReportFileLister;
use crate::manifest::write_manifest;
use crate::types::{DownloadOutcome, ReportFile, WorkflowReport};
use colored::*;
use log::{error, info};
use std::path::PathBuf;

pub struct WorkflowOptions {
    pub profile_id: i64,
    pub report_id: i64,
    pub output_dir: PathBuf,
    pub chunk_size: u64,
    pub max_pages: usize,
    pub manifest: Option<PathBuf>,
}

/// Lists the report's files, then downloads the last one seen if it is
/// available. Revoked credentials are reported and end the phase they hit;
/// any other error is returned.
pub async fn run(client: &ReportingClient, opts: &WorkflowOptions) -> Result<WorkflowReport, ReportError> {
    let mut report = WorkflowReport::default();

    let lister = ReportFileLister::new(client, opts.profile_id, opts.report_id, opts.max_pages);
    let listed = lister.collect_all(print_file).await;
    let last_seen = match recover_auth(listed, &mut report)? {
        Some(listing) => {
            if listing.truncated {
                println!(
                    "{}",
                    format!("Listing stopped after {} pages; more files may exist", listing.pages_fetched)
                        .yellow()
                );
            }
            if let Some(path) = &opts.manifest {
                write_manifest(&listing.files, path).await?;
                info!("Wrote manifest of {} files to {}", listing.files.len(), path.display());
            }
            let last = listing.last_seen.clone();
            report.listing = Some(listing);
            last
        }
        None => None,
    };

    let Some(file) = last_seen else {
        if !report.authorization_failed {
            println!("{}", "No report files found".yellow());
        }
        return Ok(report);
    };
    println!("Last file ID seen: {}", file.id);

    let downloader = Downloader::new(client.clone(), opts.output_dir.clone(), opts.chunk_size);
    let outcome = recover_auth(downloader.download(&file).await, &mut report)?;
    match &outcome {
        Some(DownloadOutcome::Downloaded { file_id, path, .. }) => {
            println!("File {} downloaded to {}", file_id.green(), path.display());
        }
        Some(DownloadOutcome::NotAvailable { file_id, status }) => {
            println!(
                "{}",
                format!("File {} is not available for download (status {})", file_id, status).yellow()
            );
        }
        None => {}
    }
    report.download = outcome;

    Ok(report)
}

fn print_file(file: &ReportFile) {
    println!(
        "Report file with ID {} and file name \"{}\" has status {}.",
        file.id,
        file.file_name_or_empty(),
        file.status
    );
}

/// Turns `AuthorizationRevoked` into a printed advisory and `Ok(None)`.
fn recover_auth<T>(result: Result<T, ReportError>, report: &mut WorkflowReport) -> Result<Option<T>, ReportError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_authorization_revoked() => {
            error!("Authorization failed: {}", e);
            println!("{}", e.to_string().red());
            report.authorization_failed = true;
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
