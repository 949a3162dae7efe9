mod cli;
mod client;
mod downloader;
mod error;
mod lister;
mod manifest;
mod types;
mod workflow;

use anyhow::Context;
use cli::Cli;
use clap::Parser;
use colored::*;
use log::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    info!("Starting report file lister");

    let cli = Cli::parse();
    info!(
        "CLI arguments parsed: profile_id={} report_id={} chunk_size={}",
        cli.profile_id, cli.report_id, cli.chunk_size
    );

    let client = client::ReportingClient::new(&cli.api_base_url, &cli.access_token);
    let opts = workflow::WorkflowOptions {
        profile_id: cli.profile_id,
        report_id: cli.report_id,
        output_dir: cli.output_dir,
        chunk_size: cli.chunk_size,
        max_pages: usize::try_from(cli.max_pages).unwrap_or(usize::MAX),
        manifest: cli.manifest,
    };

    match workflow::run(&client, &opts).await {
        Ok(report) => {
            info!(
                "Finished: listed={} downloaded={} authorization_failed={}",
                report.listing.as_ref().map_or(0, |l| l.files.len()),
                matches!(report.download, Some(types::DownloadOutcome::Downloaded { .. })),
                report.authorization_failed
            );
            Ok(())
        }
        Err(e) => {
            error!("Report workflow failed: {}", e);
            eprintln!("{}", "Report workflow failed".red());
            Err(e).with_context(|| format!("report {} in profile {}", opts.report_id, opts.profile_id))
        }
    }
}
