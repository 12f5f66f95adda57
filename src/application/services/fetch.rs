//! Fetch service: source URL expansion and retrieval

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::infrastructure::traits::{FetchOutcome, Retriever};

pub struct FetchService {
    retriever: Arc<dyn Retriever>,
    settings: Arc<Settings>,
}

impl FetchService {
    pub fn new(retriever: Arc<dyn Retriever>, settings: Arc<Settings>) -> Self {
        Self {
            retriever,
            settings,
        }
    }

    /// Expand the baseline URL template for archive numbers `from..=to`.
    pub fn baseline_urls(&self, from: u32, to: u32) -> ApplicationResult<Vec<String>> {
        if from == 0 || from > to {
            return Err(ApplicationError::InvalidRange { from, to });
        }
        let fetch = &self.settings.fetch;
        let year = format!("{:02}", fetch.baseline_year);
        Ok((from..=to)
            .map(|index| {
                fetch
                    .baseline_url
                    .replace("{year}", &year)
                    .replace("{index}", &format!("{index:04}"))
            })
            .collect())
    }

    /// Retrieve `sources` into `dest` (default: the configured cache dir).
    #[instrument(level = "debug", skip(self, sources), fields(count = sources.len()))]
    pub fn fetch(
        &self,
        sources: &[String],
        dest: Option<&Path>,
        concurrency_limit: Option<usize>,
    ) -> Vec<FetchOutcome> {
        let dest = dest.unwrap_or(self.settings.fetch.cache_dir.as_path());
        let limit = concurrency_limit
            .unwrap_or(self.settings.fetch.concurrency_limit)
            .max(1);
        debug!("fetch: dest={}, limit={}", dest.display(), limit);
        self.retriever.fetch_all(sources, dest, limit)
    }
}
