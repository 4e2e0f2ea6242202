use std::sync::Arc;

use crate::api::rate_limit::{InMemoryRateLimitStore, RateLimitStore, RateLimiter};
use crate::config::Config;
use crate::llm::Summarizer;
use crate::mail::Mailer;
use crate::services::{DeliveryService, SummaryService};
use crate::transcript::UploadStager;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub summaries: SummaryService,
    pub delivery: DeliveryService,
    pub stager: UploadStager,
    /// Shared by every route.
    pub limiter: RateLimiter,
}

impl AppState {
    pub fn new(config: Config, summarizer: Arc<dyn Summarizer>, mailer: Arc<dyn Mailer>) -> Self {
        Self::with_rate_limit_store(
            config,
            summarizer,
            mailer,
            Arc::new(InMemoryRateLimitStore::new()),
        )
    }

    pub fn with_rate_limit_store(
        config: Config,
        summarizer: Arc<dyn Summarizer>,
        mailer: Arc<dyn Mailer>,
        store: Arc<dyn RateLimitStore>,
    ) -> Self {
        let stager = UploadStager::new(config.upload.dir.clone(), config.upload.max_file_bytes);
        let limiter = RateLimiter::new(&config.rate_limit, store);

        Self {
            config: Arc::new(config),
            summaries: SummaryService::new(summarizer),
            delivery: DeliveryService::new(mailer),
            stager,
            limiter,
        }
    }
}
