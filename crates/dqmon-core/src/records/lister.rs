use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::{info, warn};

use crate::api::{BackendClient, FetchError, QuarantineRecord, QuarantineResponse};
use crate::records::filters::{RecordFilters, RecordQuery};

/// Where record pages come from.
///
/// Implemented by [`BackendClient`]; tests substitute in-memory sources.
pub trait RecordSource: Send + Sync + 'static {
    fn fetch_records(
        &self,
        query: &RecordQuery,
    ) -> impl Future<Output = Result<QuarantineResponse, FetchError>> + Send;

    fn fetch_record(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<QuarantineRecord, FetchError>> + Send;
}

impl RecordSource for BackendClient {
    async fn fetch_records(&self, query: &RecordQuery) -> Result<QuarantineResponse, FetchError> {
        BackendClient::fetch_records(self, query).await
    }

    async fn fetch_record(&self, id: &str) -> Result<QuarantineRecord, FetchError> {
        BackendClient::fetch_record(self, id).await
    }
}

/// Observable state of a [`RecordLister`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListerState {
    /// True while at least one page request is outstanding.
    pub loading: bool,
    /// Failure of the most recent request, if it failed.
    pub last_error: Option<FetchError>,
    /// Page produced by the most recent request (the empty page on failure).
    pub last_result: Option<QuarantineResponse>,
}

#[derive(Debug, Default)]
struct Inner {
    view: ListerState,
    in_flight: usize,
    /// Sequence number of the request whose outcome is in `view`.
    applied_seq: u64,
}

/// Fetches pages of quarantined records.
///
/// A pass-through: no caching, no bounds checks. Page requests never fail;
/// a failed request yields the empty page and is logged.
pub struct RecordLister<S: RecordSource = BackendClient> {
    source: S,
    inner: Mutex<Inner>,
    next_seq: AtomicU64,
}

impl<S: RecordSource> RecordLister<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            inner: Mutex::new(Inner::default()),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Fetch one page of records.
    ///
    /// `page` is 1-based. Sentinel "all" filters have already been resolved
    /// to `None` in [`RecordFilters`] and are not sent. Every call issues a
    /// new request.
    pub async fn fetch_page(
        &self,
        page: u32,
        page_size: u32,
        filters: &RecordFilters,
    ) -> QuarantineResponse {
        let query = RecordQuery::new(page, page_size, filters.clone());
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = InFlight::enter(&self.inner);

        info!(
            event = "core.record_lister.fetch_started",
            page = page,
            page_size = page_size,
            topic = ?query.filters.topic,
            error_type = ?query.filters.error_type,
        );

        let (response, error) = match self.source.fetch_records(&query).await {
            Ok(response) => {
                if response.items.len() > response.page_size as usize {
                    warn!(
                        event = "core.record_lister.oversized_page",
                        items = response.items.len(),
                        page_size = response.page_size,
                    );
                }
                info!(
                    event = "core.record_lister.fetch_completed",
                    page = response.page,
                    items = response.items.len(),
                    total = response.total,
                );
                (response, None)
            }
            Err(e) => {
                warn!(
                    event = "core.record_lister.fetch_failed",
                    page = page,
                    page_size = page_size,
                    error_kind = e.kind(),
                    error = %e,
                    "Showing empty page instead"
                );
                (QuarantineResponse::empty(page, page_size), Some(e))
            }
        };

        let mut inner = lock(&self.inner);
        if seq > inner.applied_seq {
            inner.applied_seq = seq;
            inner.view.last_result = Some(response.clone());
            inner.view.last_error = error;
        } else {
            info!(
                event = "core.record_lister.stale_response_ignored",
                seq = seq,
                applied_seq = inner.applied_seq,
            );
        }

        response
    }

    /// Fetch a single record by id.
    ///
    /// Unlike page listings this propagates failures: a detail lookup for a
    /// missing id is an answer the caller needs to see.
    pub async fn fetch_record(&self, id: &str) -> Result<QuarantineRecord, FetchError> {
        info!(event = "core.record_lister.record_fetch_started", id = id);
        match self.source.fetch_record(id).await {
            Ok(record) => {
                info!(event = "core.record_lister.record_fetch_completed", id = id);
                Ok(record)
            }
            Err(e) => {
                warn!(
                    event = "core.record_lister.record_fetch_failed",
                    id = id,
                    error_kind = e.kind(),
                    error = %e,
                );
                Err(e)
            }
        }
    }

    /// Snapshot of loading/error/result state.
    pub fn state(&self) -> ListerState {
        lock(&self.inner).view.clone()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|e| {
        warn!(event = "core.record_lister.lock_poisoned");
        e.into_inner()
    })
}

/// Keeps `loading` accurate even when a fetch future is dropped mid-request.
struct InFlight<'a> {
    inner: &'a Mutex<Inner>,
}

impl<'a> InFlight<'a> {
    fn enter(inner: &'a Mutex<Inner>) -> Self {
        let mut guard = lock(inner);
        guard.in_flight += 1;
        guard.view.loading = true;
        Self { inner }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut guard = lock(self.inner);
        guard.in_flight = guard.in_flight.saturating_sub(1);
        guard.view.loading = guard.in_flight > 0;
    }
}
