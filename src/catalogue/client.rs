//! Catalogue search and paging.
//!
//! [`CatalogueClient::search`] walks a hub's result pages, `page_size`
//! entries at a time, and feeds every product not yet present locally into a
//! [`DownloadQueue`]. Paging stops after a short page, an empty page, or once
//! more than the requested `limit` of titles has been collected. An HTTP or decoding
//! failure aborts the walk; what was collected and enqueued before the
//! failure stays valid and is returned together with the error.

use super::dedup::LocalIndex;
use super::page::{Page, PageQuery};
use crate::downloader::DownloadQueue;
use crate::error::{Error, Result};
use crate::hub::Hub;
use crate::product::ProductRecord;

use reqwest::header::{HeaderValue, ACCEPT};
use reqwest_middleware::ClientWithMiddleware;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Entries requested per page.
pub const PAGE_SIZE: usize = 100;

/// Ordering used when a request does not specify one.
pub const DEFAULT_ORDER_BY: &str = "IngestionDate desc";

/// Parameters of a catalogue search.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Hub-specific filter expression, passed through untouched.
    pub filter: String,
    /// Hub-specific ordering clause.
    pub order_by: String,
    /// Where products land. `None` only lists the matching titles.
    pub destination: Option<PathBuf>,
    /// Maximum number of titles to collect.
    pub limit: Option<usize>,
}

impl SearchRequest {
    /// Creates a listing-only request for `filter`.
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            order_by: DEFAULT_ORDER_BY.to_string(),
            destination: None,
            limit: None,
        }
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = order_by.into();
        self
    }

    /// Download matching products into `destination`.
    pub fn destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Stops the search once the title count exceeds `limit`, so at most
    /// `limit + 1` titles come back.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// What a search saw and did.
#[derive(Debug, Default)]
pub struct SearchOutcome {
    /// Every title seen, downloaded or skipped, in server order.
    pub titles: Vec<String>,
    /// Records handed to the download queue.
    pub enqueued: usize,
    /// Records skipped as already present in the destination.
    pub skipped: usize,
    /// Result pages fetched successfully.
    pub pages: usize,
    /// Total reported by the hub on the first page, if the dialect has one.
    pub total_reported: Option<u64>,
    /// The failure that aborted paging, if any.
    pub error: Option<Error>,
}

impl SearchOutcome {
    /// `true` when paging ran to a normal end.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Turns an aborted outcome into its error, dropping partial results.
    pub fn into_result(self) -> Result<Vec<String>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.titles),
        }
    }

    fn limit_exceeded(&self, limit: Option<usize>) -> bool {
        limit.is_some_and(|limit| self.titles.len() > limit)
    }
}

/// Pages through one hub's catalogue.
#[derive(Debug, Clone)]
pub struct CatalogueClient {
    client: ClientWithMiddleware,
    hub: Arc<Hub>,
    page_size: usize,
}

impl CatalogueClient {
    pub fn new(client: ClientWithMiddleware, hub: Arc<Hub>) -> Self {
        Self {
            client,
            hub,
            page_size: PAGE_SIZE,
        }
    }

    /// Overrides the number of entries requested per page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }

    /// Fetches and decodes the page starting at `skip`.
    pub async fn fetch_page(&self, request: &SearchRequest, skip: usize) -> Result<Page> {
        let dialect = self.hub.dialect();
        let url = dialect.search_url(
            self.hub.base_url(),
            PageQuery {
                filter: &request.filter,
                order_by: &request.order_by,
                skip,
                page_size: self.page_size,
            },
        )?;

        if skip == 0 {
            info!("Running query {}", url);
        } else {
            debug!("Requesting page {} ({})", skip / self.page_size + 1, url);
        }

        let start = Instant::now();
        let res = self
            .client
            .get(url)
            .basic_auth(self.hub.username(), Some(self.hub.password()))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(Error::Search { status, body });
        }

        let body = res.bytes().await?;
        let page = dialect.decode_page(&body)?;
        debug!(
            "Page at {} returned {} products in {}msec",
            skip,
            page.len(),
            start.elapsed().as_millis()
        );
        Ok(page)
    }

    /// Runs `request` to completion, enqueueing new products into `queue`.
    pub async fn search(&self, request: &SearchRequest, queue: &DownloadQueue) -> SearchOutcome {
        let mut outcome = SearchOutcome::default();
        let mut skip = 0;

        while !outcome.limit_exceeded(request.limit) {
            let page = match self.fetch_page(request, skip).await {
                Ok(page) => page,
                Err(e) => {
                    error!("Search on {} aborted at offset {}: {}", self.hub.id(), skip, e);
                    outcome.error = Some(e);
                    break;
                }
            };
            outcome.pages += 1;

            if outcome.pages == 1 {
                outcome.total_reported = page.total_reported;
                if let Some(total) = page.total_reported {
                    info!("Hub {} reports {} matching products", self.hub.id(), total);
                }
            }

            let page_len = page.len();
            if page_len == 0 {
                break;
            }

            let index = match &request.destination {
                Some(dir) => match LocalIndex::scan(dir).await {
                    Ok(index) => index,
                    Err(e) => {
                        error!("Cannot list {}: {}", dir.display(), e);
                        outcome.error = Some(e);
                        break;
                    }
                },
                None => LocalIndex::default(),
            };

            let mut skipped = 0;
            for entry in page.entries {
                if outcome.limit_exceeded(request.limit) {
                    break;
                }
                match &request.destination {
                    Some(_) if index.contains(&entry.title) => skipped += 1,
                    Some(dir) => {
                        queue.enqueue(ProductRecord::new(
                            entry.id,
                            entry.title.clone(),
                            dir.clone(),
                            self.hub.clone(),
                        ));
                        outcome.enqueued += 1;
                    }
                    None => info!(" ** {}", entry.title),
                }
                outcome.titles.push(entry.title);
            }

            if skipped > 0 {
                info!("Skipped {} products as already downloaded", skipped);
            }
            outcome.skipped += skipped;

            if page_len < self.page_size {
                break;
            }
            skip += self.page_size;
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = SearchRequest::new("platformname:Sentinel-3")
            .order_by("beginposition asc")
            .destination("out")
            .limit(10);

        assert_eq!(request.filter, "platformname:Sentinel-3");
        assert_eq!(request.order_by, "beginposition asc");
        assert_eq!(request.destination, Some(PathBuf::from("out")));
        assert_eq!(request.limit, Some(10));
    }

    #[test]
    fn test_request_defaults_to_listing() {
        let request = SearchRequest::new("*");
        assert_eq!(request.order_by, DEFAULT_ORDER_BY);
        assert!(request.destination.is_none());
        assert!(request.limit.is_none());
    }

    #[test]
    fn test_outcome_limit() {
        let outcome = SearchOutcome {
            titles: vec!["a".into(), "b".into()],
            ..SearchOutcome::default()
        };
        assert!(outcome.limit_exceeded(Some(1)));
        assert!(!outcome.limit_exceeded(Some(2)));
        assert!(!outcome.limit_exceeded(None));
        assert_eq!(outcome.into_result().unwrap().len(), 2);
    }
}
