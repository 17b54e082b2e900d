use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use visa_scout::workflows::assessment::{
    AssessmentId, AssessmentRecord, AssessmentRepository, Listing, ListingId, ListingSource,
    NewAssessment, RepositoryError, VisaCategory,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryListingStore {
    listings: Arc<Mutex<BTreeMap<ListingId, Listing>>>,
}

impl InMemoryListingStore {
    pub(crate) fn with_listings(listings: impl IntoIterator<Item = Listing>) -> Self {
        let store = Self::default();
        for listing in listings {
            store.insert(listing);
        }
        store
    }

    pub(crate) fn insert(&self, listing: Listing) {
        let mut guard = self.listings.lock().expect("listing mutex poisoned");
        guard.insert(listing.id, listing);
    }
}

impl ListingSource for InMemoryListingStore {
    fn fetch(&self, id: ListingId) -> Result<Option<Listing>, RepositoryError> {
        let guard = self.listings.lock().expect("listing mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn listing_ids(&self) -> Result<Vec<ListingId>, RepositoryError> {
        let guard = self.listings.lock().expect("listing mutex poisoned");
        Ok(guard.keys().copied().collect())
    }
}

/// Append-only rows; ids increase with insertion order.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAssessmentStore {
    records: Arc<Mutex<Vec<AssessmentRecord>>>,
}

impl InMemoryAssessmentStore {
    pub(crate) fn records(&self) -> Vec<AssessmentRecord> {
        self.records
            .lock()
            .expect("assessment mutex poisoned")
            .clone()
    }
}

impl AssessmentRepository for InMemoryAssessmentStore {
    fn append(&self, assessment: NewAssessment) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("assessment mutex poisoned");
        let id = AssessmentId(guard.len() as u64 + 1);
        let record = AssessmentRecord::from_new(id, assessment, Utc::now());
        guard.push(record.clone());
        Ok(record)
    }

    fn latest(&self, listing_id: ListingId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("assessment mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| record.listing_id == listing_id)
            .max_by_key(|record| (record.created_at, record.id))
            .cloned())
    }

    fn history(&self, listing_id: ListingId) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("assessment mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| record.listing_id == listing_id)
            .cloned()
            .collect())
    }

    fn apply_override(
        &self,
        id: AssessmentId,
        category: VisaCategory,
        note: String,
    ) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("assessment mutex poisoned");
        let record = guard
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(RepositoryError::NotFound)?;
        record.override_category = Some(category);
        record.override_note = Some(note);
        Ok(record.clone())
    }
}
