use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{ListingId, VisaCategory};
use super::repository::{AssessmentRecord, AssessmentRepository, RepositoryError};

pub const MIN_NOTE_CHARS: usize = 10;

/// Human correction submitted for a listing's current assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRequest {
    pub category: VisaCategory,
    pub note: String,
}

impl OverrideRequest {
    pub fn validate(&self) -> Result<(), OverrideError> {
        let length = self.note.chars().count();
        if length < MIN_NOTE_CHARS {
            return Err(OverrideError::NoteTooShort(length));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OverrideError {
    #[error("override note must be at least {MIN_NOTE_CHARS} characters (got {0})")]
    NoteTooShort(usize),
    #[error("no assessment found for listing {0}")]
    NoAssessment(ListingId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Attaches overrides to the latest assessment without touching its scores.
pub struct OverrideHandler<R> {
    repository: Arc<R>,
}

impl<R> OverrideHandler<R>
where
    R: AssessmentRepository,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn apply(
        &self,
        listing_id: ListingId,
        request: OverrideRequest,
    ) -> Result<AssessmentRecord, OverrideError> {
        request.validate()?;

        let latest = self
            .repository
            .latest(listing_id)?
            .ok_or(OverrideError::NoAssessment(listing_id))?;

        let updated = self
            .repository
            .apply_override(latest.id, request.category, request.note)
            .map_err(|err| match err {
                RepositoryError::NotFound => OverrideError::NoAssessment(listing_id),
                other => OverrideError::Repository(other),
            })?;

        info!(
            %listing_id,
            assessment_id = updated.id.0,
            automated = %updated.result.category(),
            override_category = %request.category,
            "assessment overridden"
        );

        Ok(updated)
    }
}
