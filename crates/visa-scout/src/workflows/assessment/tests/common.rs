use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::workflows::assessment::domain::{
    Evidence, Listing, ListingId, NewAssessment, Relevance, SignalBuckets, VisaCategory,
};
use crate::workflows::assessment::evidence::{EvidenceCollector, FetchError, PageFetcher};
use crate::workflows::assessment::provider::{ProviderError, TextGenerator};
use crate::workflows::assessment::repository::{
    AssessmentId, AssessmentRecord, AssessmentRepository, ListingSource, RepositoryError,
};
use crate::workflows::assessment::scoring::{
    EvidenceThreshold, ModelScorer, RuleBasedScorer, ScoringBackend, ScoringInput,
};
use crate::workflows::assessment::{AssessmentEngine, AssessmentService};

pub(super) const EVIDENCE_PAGE: &str = "<html><head><title>Careers at Acme</title></head>\
<body><p>We hire F-1 students on OPT and CPT every summer.</p></body></html>";

pub(super) fn listing(id: i64, description: &str) -> Listing {
    Listing {
        id: ListingId(id),
        company_name: "Acme Robotics".to_string(),
        title: "Software Intern".to_string(),
        description: description.to_string(),
        location: "Boston, MA".to_string(),
        apply_url: "not a url".to_string(),
        requirements: None,
    }
}

pub(super) fn listing_with_site(id: i64, description: &str) -> Listing {
    Listing {
        apply_url: "https://www.acme.test/jobs/42".to_string(),
        ..listing(id, description)
    }
}

pub(super) fn evidence(relevance: Relevance) -> Evidence {
    Evidence {
        url: "https://acme.test/careers".to_string(),
        title: "Careers".to_string(),
        excerpt: "OPT and CPT students welcome".to_string(),
        captured_at: Utc::now(),
        relevance,
    }
}

pub(super) fn scoring_input<'a>(
    description: &'a str,
    evidence: &'a [Evidence],
    signals: &'a SignalBuckets,
) -> ScoringInput<'a> {
    ScoringInput {
        company_name: "Acme Robotics",
        job_title: "Software Intern",
        location: "Boston, MA",
        job_description: description,
        evidence,
        signals,
        restriction: None,
    }
}

/// Serves canned pages keyed by URL and records every request.
#[derive(Default)]
pub(super) struct StubFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub(super) fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub(super) fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("fetcher mutex poisoned").clone()
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.requests
            .lock()
            .expect("fetcher mutex poisoned")
            .push(url.to_string());
        self.pages.get(url).cloned().ok_or(FetchError::Status(404))
    }
}

/// Replies with a fixed completion, or fails when none is configured.
pub(super) struct StubGenerator {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
    pub(super) fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn failing() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("generator mutex poisoned").clone()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    fn provider(&self) -> &'static str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-model-1"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts
            .lock()
            .expect("generator mutex poisoned")
            .push(prompt.to_string());
        self.reply.clone().ok_or(ProviderError::EmptyResponse)
    }
}

pub(super) fn model_reply(category: &str, confidence: u8) -> String {
    format!(
        "Here is my assessment:\n{{\"category\": \"{category}\", \"confidence_score\": {confidence}, \
         \"reasons_short\": \"Provider summary\", \"reasons_long\": \"Provider detail\"}}"
    )
}

pub(super) fn collector(fetcher: Arc<StubFetcher>) -> EvidenceCollector {
    EvidenceCollector::new(fetcher, Duration::ZERO)
}

pub(super) fn rule_engine(fetcher: Arc<StubFetcher>) -> AssessmentEngine {
    AssessmentEngine::new(
        collector(fetcher),
        Arc::new(RuleBasedScorer::new()),
        EvidenceThreshold::DEFAULT,
    )
}

pub(super) fn model_engine(
    fetcher: Arc<StubFetcher>,
    generator: Arc<StubGenerator>,
) -> AssessmentEngine {
    let scorer: Arc<dyn ScoringBackend> =
        Arc::new(ModelScorer::new(generator, EvidenceThreshold::DEFAULT));
    AssessmentEngine::new(collector(fetcher), scorer, EvidenceThreshold::DEFAULT)
}

#[derive(Default)]
pub(super) struct MemoryListings {
    listings: Mutex<BTreeMap<ListingId, Listing>>,
}

impl MemoryListings {
    pub(super) fn with(listings: impl IntoIterator<Item = Listing>) -> Self {
        let store = Self::default();
        {
            let mut guard = store.listings.lock().expect("listing mutex poisoned");
            for listing in listings {
                guard.insert(listing.id, listing);
            }
        }
        store
    }
}

impl ListingSource for MemoryListings {
    fn fetch(&self, id: ListingId) -> Result<Option<Listing>, RepositoryError> {
        let guard = self.listings.lock().expect("listing mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn listing_ids(&self) -> Result<Vec<ListingId>, RepositoryError> {
        let guard = self.listings.lock().expect("listing mutex poisoned");
        Ok(guard.keys().copied().collect())
    }
}

#[derive(Default)]
pub(super) struct MemoryAssessments {
    pub(super) rows: Mutex<Vec<AssessmentRecord>>,
}

impl MemoryAssessments {
    pub(super) fn rows(&self) -> Vec<AssessmentRecord> {
        self.rows.lock().expect("assessment mutex poisoned").clone()
    }
}

impl AssessmentRepository for MemoryAssessments {
    fn append(&self, assessment: NewAssessment) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.rows.lock().expect("assessment mutex poisoned");
        let id = AssessmentId(guard.len() as u64 + 1);
        let record = AssessmentRecord::from_new(id, assessment, Utc::now());
        guard.push(record.clone());
        Ok(record)
    }

    fn latest(&self, listing_id: ListingId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = self.rows.lock().expect("assessment mutex poisoned");
        Ok(guard
            .iter()
            .rev()
            .find(|row| row.listing_id == listing_id)
            .cloned())
    }

    fn history(&self, listing_id: ListingId) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = self.rows.lock().expect("assessment mutex poisoned");
        Ok(guard
            .iter()
            .filter(|row| row.listing_id == listing_id)
            .cloned()
            .collect())
    }

    fn apply_override(
        &self,
        id: AssessmentId,
        category: VisaCategory,
        note: String,
    ) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.rows.lock().expect("assessment mutex poisoned");
        let row = guard
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(RepositoryError::NotFound)?;
        row.override_category = Some(category);
        row.override_note = Some(note);
        Ok(row.clone())
    }
}

pub(super) struct UnavailableAssessments;

impl AssessmentRepository for UnavailableAssessments {
    fn append(&self, _assessment: NewAssessment) -> Result<AssessmentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn latest(&self, _listing_id: ListingId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn history(&self, _listing_id: ListingId) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn apply_override(
        &self,
        _id: AssessmentId,
        _category: VisaCategory,
        _note: String,
    ) -> Result<AssessmentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) type MemoryService = AssessmentService<MemoryListings, MemoryAssessments>;

pub(super) fn build_service(
    listings: impl IntoIterator<Item = Listing>,
) -> (Arc<MemoryService>, Arc<MemoryAssessments>) {
    let repository = Arc::new(MemoryAssessments::default());
    let service = Arc::new(AssessmentService::new(
        Arc::new(MemoryListings::with(listings)),
        repository.clone(),
        rule_engine(Arc::new(StubFetcher::default())),
    ));
    (service, repository)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
