use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use url::Url;

use super::domain::{AssessmentResult, Listing, NewAssessment};
use super::evidence::{EvidenceCollector, HttpPageFetcher};
use super::restrictions::RestrictionDetector;
use super::scoring::{
    resolve_backend, EvidenceThreshold, ScoringBackend, ScoringInput, ScoringStrategy,
};
use super::signals::extract_signals;
use crate::config::{AssessmentConfig, HttpConfig};

/// Orchestrates evidence, restrictions, signals, and scoring for one listing.
pub struct AssessmentEngine {
    collector: EvidenceCollector,
    detector: RestrictionDetector,
    scorer: Arc<dyn ScoringBackend>,
    threshold: EvidenceThreshold,
}

impl AssessmentEngine {
    pub fn new(
        collector: EvidenceCollector,
        scorer: Arc<dyn ScoringBackend>,
        threshold: EvidenceThreshold,
    ) -> Self {
        Self {
            collector,
            detector: RestrictionDetector::new(),
            scorer,
            threshold,
        }
    }

    /// Build the HTTP-backed engine, resolving the scoring strategy once.
    pub fn from_config(
        assessment: &AssessmentConfig,
        http: &HttpConfig,
    ) -> Result<Self, reqwest::Error> {
        let fetcher = Arc::new(HttpPageFetcher::new(http)?);
        let collector = EvidenceCollector::new(fetcher, assessment.probe_interval);
        let scorer = resolve_backend(assessment, http)?;
        Ok(Self::new(
            collector,
            scorer,
            EvidenceThreshold::new(assessment.evidence_threshold),
        ))
    }

    pub fn strategy(&self) -> ScoringStrategy {
        self.scorer.strategy()
    }

    /// Run the full pipeline. Each step completes before the next begins.
    pub async fn assess(&self, listing: &Listing) -> NewAssessment {
        info!(
            listing_id = %listing.id,
            company = %listing.company_name,
            title = %listing.title,
            "assessing listing"
        );

        let domain = company_domain(&listing.apply_url);
        let evidence = self
            .collector
            .collect(&listing.company_name, domain.as_deref())
            .await;
        let restriction = self.detector.detect(&listing.description);
        let signals = extract_signals(
            &listing.description,
            listing.requirements.as_deref().unwrap_or_default(),
            &evidence,
            restriction.as_ref(),
        );

        let input = ScoringInput {
            company_name: &listing.company_name,
            job_title: &listing.title,
            location: &listing.location,
            job_description: &listing.description,
            evidence: &evidence,
            signals: &signals,
            restriction: restriction.as_ref(),
        };
        let verdict = self.scorer.score(&input).await;

        // Clamp strictly before the band is derived, whichever strategy answered.
        let confidence = self.threshold.apply(verdict.confidence.min(100), &evidence);

        let result = AssessmentResult::new(
            verdict.category,
            confidence,
            verdict.reasons_short,
            verdict.reasons_long,
            evidence,
            signals,
            verdict.model_version,
            Utc::now(),
        );

        info!(
            listing_id = %listing.id,
            category = %result.category(),
            confidence = result.confidence(),
            band = result.band().label(),
            strategy = ?verdict.strategy,
            "assessment complete"
        );

        NewAssessment {
            listing_id: listing.id,
            result,
        }
    }
}

/// Company domain guessed from the apply URL host, minus a leading `www.`.
pub fn company_domain(apply_url: &str) -> Option<String> {
    let parsed = Url::parse(apply_url.trim()).ok()?;
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        return None;
    }

    Some(match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
