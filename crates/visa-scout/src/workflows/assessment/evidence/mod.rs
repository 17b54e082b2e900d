//! Evidence gathering from a company's own web pages.
//!
//! No search engine is queried. The collector guesses a handful of pages under
//! the company domain and keeps keyword-anchored excerpts from the ones that
//! answer.

mod fetcher;
mod page;

pub use fetcher::{FetchError, HttpPageFetcher, PageFetcher};

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use super::domain::Evidence;

pub(crate) const CANDIDATE_PATHS: [&str; 3] = ["careers", "jobs", "about"];
pub(crate) const MAX_SEARCH_INTENTS: usize = 2;

/// Probes guessed company URLs for visa-related wording.
pub struct EvidenceCollector {
    fetcher: Arc<dyn PageFetcher>,
    probe_interval: Duration,
}

impl EvidenceCollector {
    pub fn new(fetcher: Arc<dyn PageFetcher>, probe_interval: Duration) -> Self {
        Self {
            fetcher,
            probe_interval,
        }
    }

    /// Intent strings describing what each probe round is looking for.
    pub fn search_intents(company_name: &str) -> [String; 4] {
        [
            format!("{company_name} OPT CPT international students"),
            format!("{company_name} visa sponsorship policy"),
            format!("{company_name} careers international students"),
            format!("{company_name} E-Verify"),
        ]
    }

    /// Collect evidence for a company. Unreachable candidates contribute nothing.
    ///
    /// Each acted-on intent probes every candidate path, and rounds are paced by
    /// the configured interval. Without a domain there is nothing to probe.
    pub async fn collect(&self, company_name: &str, domain: Option<&str>) -> Vec<Evidence> {
        let mut collected = Vec::new();
        let Some(domain) = domain.filter(|domain| !domain.is_empty()) else {
            debug!(company = company_name, "no company domain; skipping evidence probes");
            return collected;
        };

        let intents = Self::search_intents(company_name);
        let rounds = intents.len().min(MAX_SEARCH_INTENTS);
        for (round, intent) in intents.iter().take(rounds).enumerate() {
            for path in CANDIDATE_PATHS {
                let url = format!("https://{domain}/{path}");
                if let Some(evidence) = self.probe(&url, intent).await {
                    collected.push(evidence);
                }
            }

            // Pause between rounds only.
            if round + 1 < rounds && !self.probe_interval.is_zero() {
                tokio::time::sleep(self.probe_interval).await;
            }
        }

        collected
    }

    async fn probe(&self, url: &str, intent: &str) -> Option<Evidence> {
        match self.fetcher.fetch(url).await {
            Ok(html) => page::analyze_page(url, &html, Utc::now()),
            Err(err) => {
                debug!(%url, intent, error = %err, "evidence candidate unavailable");
                None
            }
        }
    }
}
