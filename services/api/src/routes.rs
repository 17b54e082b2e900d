use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use visa_scout::workflows::assessment::{
    assessment_router, AssessmentRepository, AssessmentService, ListingSource,
};

pub(crate) fn with_assessment_routes<L, R>(service: Arc<AssessmentService<L, R>>) -> axum::Router
where
    L: ListingSource + 'static,
    R: AssessmentRepository + 'static,
{
    assessment_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{InMemoryAssessmentStore, InMemoryListingStore};
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tower::ServiceExt;
    use visa_scout::workflows::assessment::{
        AssessmentEngine, EvidenceCollector, EvidenceThreshold, HttpPageFetcher, Listing,
        ListingId, RuleBasedScorer,
    };

    fn service(
        listings: InMemoryListingStore,
    ) -> Arc<AssessmentService<InMemoryListingStore, InMemoryAssessmentStore>> {
        let fetcher = HttpPageFetcher::new(&Default::default()).expect("client builds");
        let engine = AssessmentEngine::new(
            EvidenceCollector::new(Arc::new(fetcher), Duration::ZERO),
            Arc::new(RuleBasedScorer::new()),
            EvidenceThreshold::DEFAULT,
        );
        Arc::new(AssessmentService::new(
            Arc::new(listings),
            Arc::new(InMemoryAssessmentStore::default()),
            engine,
        ))
    }

    fn listing(id: i64) -> Listing {
        Listing {
            id: ListingId(id),
            company_name: "Acme".to_string(),
            title: "Intern".to_string(),
            description: "US citizens only".to_string(),
            location: "Boston".to_string(),
            apply_url: String::new(),
            requirements: None,
        }
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(recorder.handle()),
        };

        let response = readiness_endpoint(Extension(state.clone()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.readiness.store(true, Ordering::Release);
        let response = readiness_endpoint(Extension(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn assessment_routes_are_mounted_with_operational_routes() {
        let store = InMemoryListingStore::default();
        store.insert(listing(1));
        let service = service(store);
        service
            .assess_listing(ListingId(1))
            .await
            .expect("assessment stored");
        let router = with_assessment_routes(service);

        let response = router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(
                Request::get("/api/v1/listings/1/assessment")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn empty_store_has_no_latest_and_rejects_override() {
        let store = InMemoryAssessmentStore::default();
        assert!(store.latest(ListingId(1)).expect("lookup").is_none());
        assert!(matches!(
            store.apply_override(
                visa_scout::workflows::assessment::AssessmentId(3),
                visa_scout::workflows::assessment::VisaCategory::High,
                "note text here".to_string(),
            ),
            Err(visa_scout::workflows::assessment::RepositoryError::NotFound)
        ));
    }
}
