//! Scoring strategies and the invariants shared by all of them.

mod model;
mod prompt;
mod rule_based;

pub use model::{ModelScorer, ResponseParseError};
pub use rule_based::{RuleBasedScorer, RULE_BASED_MODEL_VERSION};

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use super::domain::{Evidence, Restriction, SignalBuckets, VisaCategory};
use super::provider::{AnthropicClient, OpenAiClient, TextGenerator};
use crate::config::{AssessmentConfig, HttpConfig};

/// Everything a strategy may look at when scoring one listing.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub company_name: &'a str,
    pub job_title: &'a str,
    pub location: &'a str,
    pub job_description: &'a str,
    pub evidence: &'a [Evidence],
    pub signals: &'a SignalBuckets,
    pub restriction: Option<&'a Restriction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    RuleBased,
    ExternalModel,
}

/// Raw strategy output, before the evidence threshold and band are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub category: VisaCategory,
    pub confidence: u8,
    pub reasons_short: String,
    pub reasons_long: String,
    pub model_version: String,
    pub strategy: ScoringStrategy,
}

/// A scoring strategy. Implementations never fail; the external-model backend
/// degrades to the deterministic table on any error.
#[async_trait]
pub trait ScoringBackend: Send + Sync {
    fn strategy(&self) -> ScoringStrategy;

    async fn score(&self, input: &ScoringInput<'_>) -> Verdict;
}

/// Confidence ceiling that applies whenever no external evidence was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvidenceThreshold(u8);

impl EvidenceThreshold {
    pub const DEFAULT: Self = Self(60);

    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn apply(self, confidence: u8, evidence: &[Evidence]) -> u8 {
        if confidence > self.0 && evidence.is_empty() {
            self.0
        } else {
            confidence
        }
    }
}

impl Default for EvidenceThreshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Pick the scoring backend once at startup from the configured credentials.
pub fn resolve_backend(
    assessment: &AssessmentConfig,
    http: &HttpConfig,
) -> Result<Arc<dyn ScoringBackend>, reqwest::Error> {
    let threshold = EvidenceThreshold::new(assessment.evidence_threshold);

    let generator: Option<Arc<dyn TextGenerator>> =
        if let Some(key) = assessment.anthropic_api_key.as_deref() {
            Some(Arc::new(AnthropicClient::new(
                key,
                &assessment.model,
                assessment.max_tokens,
                http.request_timeout,
            )?))
        } else if let Some(key) = assessment.openai_api_key.as_deref() {
            Some(Arc::new(OpenAiClient::new(
                key,
                &assessment.openai_model,
                assessment.max_tokens,
                http.request_timeout,
            )?))
        } else {
            None
        };

    Ok(match generator {
        Some(generator) => {
            info!(
                provider = generator.provider(),
                model = generator.model(),
                "external-model scoring enabled"
            );
            Arc::new(ModelScorer::new(generator, threshold))
        }
        None => {
            info!("no provider credential configured; using rule-based scoring");
            Arc::new(RuleBasedScorer::new())
        }
    })
}
