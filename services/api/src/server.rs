use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryAssessmentStore, InMemoryListingStore};
use crate::routes::with_assessment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use visa_scout::config::AppConfig;
use visa_scout::error::AppError;
use visa_scout::telemetry;
use visa_scout::workflows::assessment::{AssessmentEngine, AssessmentService};
use visa_scout::workflows::listings::ListingCsvImporter;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let listings = InMemoryListingStore::default();
    if let Some(path) = args.listings.take() {
        let imported = ListingCsvImporter::from_path(&path)?;
        info!(count = imported.len(), path = %path.display(), "listing store seeded");
        for listing in imported {
            listings.insert(listing);
        }
    }

    let engine = AssessmentEngine::from_config(&config.assessment, &config.http)?;
    let strategy = engine.strategy();
    let assessment_service = Arc::new(AssessmentService::new(
        Arc::new(listings),
        Arc::new(InMemoryAssessmentStore::default()),
        engine,
    ));

    let app = with_assessment_routes(assessment_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, ?strategy, "visa assessment service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
