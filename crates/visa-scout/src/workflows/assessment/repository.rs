use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    AssessmentResult, ConfidenceBand, Evidence, Listing, ListingId, NewAssessment, SignalBuckets,
    VisaCategory,
};

/// Storage-assigned identifier of one assessment row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssessmentId(pub u64);

/// Persisted assessment row. The automated result is never rewritten; human
/// corrections live in the separate override fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentRecord {
    pub id: AssessmentId,
    pub listing_id: ListingId,
    pub result: AssessmentResult,
    pub created_at: DateTime<Utc>,
    pub override_category: Option<VisaCategory>,
    pub override_note: Option<String>,
}

impl AssessmentRecord {
    pub fn from_new(id: AssessmentId, assessment: NewAssessment, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            listing_id: assessment.listing_id,
            result: assessment.result,
            created_at,
            override_category: None,
            override_note: None,
        }
    }

    /// Human override when present, otherwise the automated category.
    pub fn effective_category(&self) -> VisaCategory {
        self.override_category
            .unwrap_or_else(|| self.result.category())
    }

    pub fn view(&self) -> AssessmentView {
        AssessmentView {
            id: self.id,
            listing_id: self.listing_id,
            visa_category: self.result.category(),
            confidence_score_0_100: self.result.confidence(),
            confidence_band: self.result.band(),
            reasons_short: self.result.reasons_short().to_string(),
            reasons_long: self.result.reasons_long().to_string(),
            evidence_links: self.result.evidence().to_vec(),
            signals: self.result.signals().clone(),
            model_version: self.result.model_version().to_string(),
            assessed_at_utc: self.result.assessed_at(),
            created_at: self.created_at,
            human_override_category: self.override_category,
            human_override_note: self.override_note.clone(),
            effective_category: self.effective_category(),
        }
    }
}

/// Serialized shape of an assessment row for API and CLI output.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentView {
    pub id: AssessmentId,
    pub listing_id: ListingId,
    pub visa_category: VisaCategory,
    pub confidence_score_0_100: u8,
    pub confidence_band: ConfidenceBand,
    pub reasons_short: String,
    pub reasons_long: String,
    pub evidence_links: Vec<Evidence>,
    pub signals: SignalBuckets,
    pub model_version: String,
    pub assessed_at_utc: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub human_override_category: Option<VisaCategory>,
    pub human_override_note: Option<String>,
    pub effective_category: VisaCategory,
}

/// Append-only assessment storage keyed by listing and creation time.
pub trait AssessmentRepository: Send + Sync {
    /// Persist one assessment as a single atomic write and return the stored row.
    fn append(&self, assessment: NewAssessment) -> Result<AssessmentRecord, RepositoryError>;
    /// Most recently created row for the listing.
    fn latest(&self, listing_id: ListingId) -> Result<Option<AssessmentRecord>, RepositoryError>;
    /// All rows for the listing, oldest first.
    fn history(&self, listing_id: ListingId) -> Result<Vec<AssessmentRecord>, RepositoryError>;
    /// Set only the override fields of exactly one existing row.
    fn apply_override(
        &self,
        id: AssessmentId,
        category: VisaCategory,
        note: String,
    ) -> Result<AssessmentRecord, RepositoryError>;
}

/// Read access to listings supplied by the ingestion collaborator.
pub trait ListingSource: Send + Sync {
    fn fetch(&self, id: ListingId) -> Result<Option<Listing>, RepositoryError>;
    fn listing_ids(&self) -> Result<Vec<ListingId>, RepositoryError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
