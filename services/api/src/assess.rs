use crate::infra::{InMemoryAssessmentStore, InMemoryListingStore};
use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use visa_scout::config::AppConfig;
use visa_scout::error::AppError;
use visa_scout::telemetry;
use visa_scout::workflows::assessment::{AssessmentEngine, AssessmentService, ListingId};
use visa_scout::workflows::listings::ListingCsvImporter;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// CSV file with id,company_name,title,description,location,apply_url,requirements
    #[arg(long)]
    pub(crate) listings: PathBuf,
}

pub(crate) async fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let listings = ListingCsvImporter::from_path(&args.listings)?;
    let ids: Vec<ListingId> = listings.iter().map(|listing| listing.id).collect();
    info!(count = ids.len(), path = %args.listings.display(), "listings loaded");

    let repository = Arc::new(InMemoryAssessmentStore::default());
    let service = AssessmentService::new(
        Arc::new(InMemoryListingStore::with_listings(listings)),
        repository.clone(),
        AssessmentEngine::from_config(&config.assessment, &config.http)?,
    );

    let summary = service.assess_batch(&ids).await;

    let mut stdout = std::io::stdout().lock();
    for record in repository.records() {
        let line = serde_json::to_string(&record.view())
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        writeln!(stdout, "{line}")?;
    }

    info!(
        assessed = summary.assessed,
        skipped = summary.skipped,
        failed = summary.failed,
        "assessment run finished"
    );
    Ok(())
}
