use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use super::domain::ListingId;
use super::engine::AssessmentEngine;
use super::overrides::{OverrideError, OverrideHandler, OverrideRequest};
use super::repository::{AssessmentRecord, AssessmentRepository, ListingSource, RepositoryError};

/// Service composing listing lookup, the assessment engine, and storage.
pub struct AssessmentService<L, R> {
    listings: Arc<L>,
    repository: Arc<R>,
    engine: AssessmentEngine,
    overrides: OverrideHandler<R>,
}

/// Outcome counts for one sequential batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub assessed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl<L, R> AssessmentService<L, R>
where
    L: ListingSource + 'static,
    R: AssessmentRepository + 'static,
{
    pub fn new(
        listings: Arc<L>,
        repository: Arc<R>,
        engine: AssessmentEngine,
    ) -> Self {
        let overrides = OverrideHandler::new(repository.clone());
        Self {
            listings,
            repository,
            engine,
            overrides,
        }
    }

    pub fn engine(&self) -> &AssessmentEngine {
        &self.engine
    }

    /// Assess one listing and append the result as a new row.
    pub async fn assess_listing(
        &self,
        listing_id: ListingId,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let listing = self
            .listings
            .fetch(listing_id)?
            .ok_or(AssessmentServiceError::ListingNotFound(listing_id))?;

        let assessment = self.engine.assess(&listing).await;
        let stored = self.repository.append(assessment)?;
        Ok(stored)
    }

    /// Assess listings one at a time. A failing listing never aborts the run.
    pub async fn assess_batch(&self, listing_ids: &[ListingId]) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for &listing_id in listing_ids {
            match self.assess_listing(listing_id).await {
                Ok(record) => {
                    summary.assessed += 1;
                    info!(%listing_id, assessment_id = record.id.0, "assessment stored");
                }
                Err(AssessmentServiceError::ListingNotFound(_)) => {
                    summary.skipped += 1;
                    warn!(%listing_id, "listing not found; skipping");
                }
                Err(err) => {
                    summary.failed += 1;
                    error!(%listing_id, error = %err, "assessment failed");
                }
            }
        }

        info!(
            assessed = summary.assessed,
            skipped = summary.skipped,
            failed = summary.failed,
            "assessment batch finished"
        );
        summary
    }

    /// Every listing with no assessment yet.
    pub fn unassessed(&self) -> Result<Vec<ListingId>, AssessmentServiceError> {
        let mut pending = Vec::new();
        for listing_id in self.listings.listing_ids()? {
            if self.repository.latest(listing_id)?.is_none() {
                pending.push(listing_id);
            }
        }
        Ok(pending)
    }

    pub async fn assess_unassessed(&self) -> Result<BatchSummary, AssessmentServiceError> {
        let pending = self.unassessed()?;
        Ok(self.assess_batch(&pending).await)
    }

    pub fn override_assessment(
        &self,
        listing_id: ListingId,
        request: OverrideRequest,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        Ok(self.overrides.apply(listing_id, request)?)
    }

    /// The most recently created assessment for the listing.
    pub fn current(
        &self,
        listing_id: ListingId,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        self.repository
            .latest(listing_id)?
            .ok_or(AssessmentServiceError::AssessmentNotFound(listing_id))
    }

    pub fn history(
        &self,
        listing_id: ListingId,
    ) -> Result<Vec<AssessmentRecord>, AssessmentServiceError> {
        Ok(self.repository.history(listing_id)?)
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error("listing {0} not found")]
    ListingNotFound(ListingId),
    #[error("no assessment found for listing {0}")]
    AssessmentNotFound(ListingId),
    #[error(transparent)]
    Override(#[from] OverrideError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
