//! Visa-friendliness assessment of job and volunteer listings.
//!
//! Evidence collection, restriction detection, and signal extraction feed a
//! scoring backend chosen once at startup. Results are appended to storage and
//! never rewritten; human overrides sit beside the automated judgment.

pub mod domain;
pub mod engine;
pub mod evidence;
pub mod overrides;
pub mod provider;
pub mod repository;
pub(crate) mod restrictions;
pub mod router;
pub mod scoring;
pub mod service;
pub(crate) mod signals;

#[cfg(test)]
mod tests;

pub use domain::{
    AssessmentResult, ConfidenceBand, Evidence, Listing, ListingId, NewAssessment, Polarity,
    Relevance, Restriction, RestrictionKind, Signal, SignalBuckets, VisaCategory,
};
pub use engine::{company_domain, AssessmentEngine};
pub use evidence::{EvidenceCollector, FetchError, HttpPageFetcher, PageFetcher};
pub use overrides::{OverrideError, OverrideRequest, MIN_NOTE_CHARS};
pub use provider::{AnthropicClient, OpenAiClient, ProviderError, TextGenerator};
pub use repository::{
    AssessmentId, AssessmentRecord, AssessmentRepository, AssessmentView, ListingSource,
    RepositoryError,
};
pub use restrictions::RestrictionDetector;
pub use router::{assessment_router, AssessRequest};
pub use scoring::{
    EvidenceThreshold, ModelScorer, RuleBasedScorer, ScoringBackend, ScoringInput,
    ScoringStrategy, Verdict,
};
pub use service::{AssessmentService, AssessmentServiceError, BatchSummary};
pub use signals::extract_signals;
