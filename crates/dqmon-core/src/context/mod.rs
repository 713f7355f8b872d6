//! Explicitly constructed dashboard context.
//!
//! A [`DashboardContext`] owns the validated configuration, the backend
//! client and a shutdown token. Pages (CLI commands) obtain their pollers,
//! listers and feeds from it; [`DashboardContext::shutdown`] stops every
//! component created here.

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api::{BackendClient, SystemMetrics};
use crate::config::DqmonConfig;
use crate::errors::{DqmonError, DqmonResult};
use crate::events;
use crate::live::{FeedError, LiveLogFeed, LogSource, SimulatedLogSource};
use crate::metrics::MetricsPoller;
use crate::records::RecordLister;

pub struct DashboardContext {
    config: DqmonConfig,
    client: BackendClient,
    shutdown: CancellationToken,
}

impl DashboardContext {
    /// Validate `config` and build the backend client.
    pub fn new(config: DqmonConfig) -> DqmonResult<Self> {
        config.validate().map_err(boxed)?;
        let client = BackendClient::from_config(&config.backend).map_err(boxed)?;

        events::log_dashboard_ready(&config, client.base_url());
        Ok(Self {
            config,
            client,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &DqmonConfig {
        &self.config
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    /// A poller whose snapshot starts zeroed.
    pub fn metrics_poller(&self) -> MetricsPoller {
        MetricsPoller::with_shutdown(
            self.client.clone(),
            SystemMetrics::default(),
            self.shutdown.clone(),
        )
    }

    pub fn record_lister(&self) -> RecordLister {
        RecordLister::new(self.client.clone())
    }

    /// A feed over the simulated stream, sized and tuned from `[live]` config.
    pub fn live_feed(&self) -> Result<LiveLogFeed, FeedError> {
        let source = SimulatedLogSource::new(self.config.live.error_probability());
        self.live_feed_with(source)
    }

    /// A feed over any source, sized from `[live]` config.
    pub fn live_feed_with<S: LogSource>(&self, source: S) -> Result<LiveLogFeed<S>, FeedError> {
        LiveLogFeed::with_shutdown(source, self.config.live.capacity(), self.shutdown.clone())
    }

    /// Stop every poller and feed created from this context.
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            info!(event = "core.context.shutdown");
            self.shutdown.cancel();
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Token cancelled by [`shutdown`](Self::shutdown).
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}

impl Drop for DashboardContext {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn boxed<E: DqmonError>(error: E) -> Box<dyn DqmonError> {
    Box::new(error)
}
