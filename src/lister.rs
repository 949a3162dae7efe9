use crate::client::ReportingClient;
use crate::error::ReportError;
use crate::types::{Listing, ReportFile};
use log::{info, warn};
use std::collections::VecDeque;

pub const DEFAULT_MAX_PAGES: usize = 10_000;

enum Cursor {
    Start,
    Next(String),
    Exhausted,
}

/// Walks the paged file list of one report, one item at a time.
///
/// Pages are requested lazily as the buffer drains. Pagination stops on the
/// first empty page, on a missing or blank continuation token, or after
/// `max_pages` requests, whichever comes first. The sequence cannot be
/// restarted.
pub struct ReportFileLister<'a> {
    client: &'a ReportingClient,
    profile_id: i64,
    report_id: i64,
    max_pages: usize,
    cursor: Cursor,
    buffer: VecDeque<ReportFile>,
    pages_fetched: usize,
    truncated: bool,
}

impl<'a> ReportFileLister<'a> {
    pub fn new(client: &'a ReportingClient, profile_id: i64, report_id: i64, max_pages: usize) -> Self {
        Self {
            client,
            profile_id,
            report_id,
            max_pages,
            cursor: Cursor::Start,
            buffer: VecDeque::new(),
            pages_fetched: 0,
            truncated: false,
        }
    }

    pub async fn next(&mut self) -> Result<Option<ReportFile>, ReportError> {
        loop {
            if let Some(file) = self.buffer.pop_front() {
                return Ok(Some(file));
            }

            let token = match std::mem::replace(&mut self.cursor, Cursor::Exhausted) {
                Cursor::Exhausted => return Ok(None),
                Cursor::Start => None,
                Cursor::Next(token) => Some(token),
            };

            if self.pages_fetched >= self.max_pages {
                warn!(
                    "Stopping after {} pages for report {}; more files may exist",
                    self.pages_fetched, self.report_id
                );
                self.truncated = true;
                return Ok(None);
            }

            let page = self
                .client
                .list_report_files(self.profile_id, self.report_id, token.as_deref())
                .await?;
            self.pages_fetched += 1;
            info!(
                "Fetched page {} with {} files",
                self.pages_fetched,
                page.items.len()
            );

            if let Some(next) = page.continuation() {
                self.cursor = Cursor::Next(next.to_string());
            }
            self.buffer.extend(page.items);
        }
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Drains the sequence, calling `on_file` for each item in order.
    pub async fn collect_all<F>(mut self, mut on_file: F) -> Result<Listing, ReportError>
    where
        F: FnMut(&ReportFile),
    {
        let mut listing = Listing::default();
        while let Some(file) = self.next().await? {
            on_file(&file);
            listing.last_seen = Some(file.clone());
            listing.files.push(file);
        }
        listing.pages_fetched = self.pages_fetched();
        listing.truncated = self.truncated;
        Ok(listing)
    }
}
