use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::domain::ListingId;
use super::overrides::{OverrideError, OverrideRequest};
use super::repository::{AssessmentRepository, ListingSource};
use super::service::{AssessmentService, AssessmentServiceError};

/// Body of a batch assessment trigger.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssessRequest {
    #[serde(default)]
    pub listing_ids: Option<Vec<ListingId>>,
    #[serde(default)]
    pub assess_all_unassessed: bool,
}

/// Router builder exposing assessment, override, and lookup endpoints.
pub fn assessment_router<L, R>(service: Arc<AssessmentService<L, R>>) -> Router
where
    L: ListingSource + 'static,
    R: AssessmentRepository + 'static,
{
    Router::new()
        .route("/api/v1/admin/assess", post(assess_handler::<L, R>))
        .route(
            "/api/v1/admin/override/:listing_id",
            post(override_handler::<L, R>),
        )
        .route(
            "/api/v1/listings/:listing_id/assessment",
            get(current_handler::<L, R>),
        )
        .with_state(service)
}

pub(crate) async fn assess_handler<L, R>(
    State(service): State<Arc<AssessmentService<L, R>>>,
    Json(request): Json<AssessRequest>,
) -> Response
where
    L: ListingSource + 'static,
    R: AssessmentRepository + 'static,
{
    let listing_ids = if request.assess_all_unassessed {
        match service.unassessed() {
            Ok(ids) => ids,
            Err(err) => return internal_error(err),
        }
    } else {
        request.listing_ids.unwrap_or_default()
    };

    if listing_ids.is_empty() {
        return (
            StatusCode::OK,
            Json(json!({ "message": "No listings to assess" })),
        )
            .into_response();
    }

    let listing_count = listing_ids.len();
    let background = service.clone();
    tokio::spawn(async move {
        let summary = background.assess_batch(&listing_ids).await;
        info!(?summary, "background assessment batch complete");
    });

    (
        StatusCode::ACCEPTED,
        Json(json!({
            "message": format!("Assessment started for {listing_count} listings"),
            "listing_count": listing_count,
        })),
    )
        .into_response()
}

pub(crate) async fn override_handler<L, R>(
    State(service): State<Arc<AssessmentService<L, R>>>,
    Path(listing_id): Path<i64>,
    payload: Result<Json<OverrideRequest>, JsonRejection>,
) -> Response
where
    L: ListingSource + 'static,
    R: AssessmentRepository + 'static,
{
    let listing_id = ListingId(listing_id);
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return unprocessable(rejection.body_text()),
    };
    if let Err(err) = request.validate() {
        return unprocessable(err);
    }

    match service.override_assessment(listing_id, request) {
        Ok(record) => (
            StatusCode::OK,
            Json(json!({
                "message": "Assessment overridden successfully",
                "listing_id": listing_id,
                "override_category": record.override_category,
            })),
        )
            .into_response(),
        Err(AssessmentServiceError::Override(err @ OverrideError::NoAssessment(_))) => {
            not_found(err)
        }
        Err(AssessmentServiceError::Override(err @ OverrideError::NoteTooShort(_))) => {
            unprocessable(err)
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn current_handler<L, R>(
    State(service): State<Arc<AssessmentService<L, R>>>,
    Path(listing_id): Path<i64>,
) -> Response
where
    L: ListingSource + 'static,
    R: AssessmentRepository + 'static,
{
    match service.current(ListingId(listing_id)) {
        Ok(record) => (StatusCode::OK, Json(record.view())).into_response(),
        Err(err @ AssessmentServiceError::AssessmentNotFound(_)) => not_found(err),
        Err(other) => internal_error(other),
    }
}

fn not_found(err: impl std::fmt::Display) -> Response {
    error_response(StatusCode::NOT_FOUND, err)
}

fn unprocessable(err: impl std::fmt::Display) -> Response {
    error_response(StatusCode::UNPROCESSABLE_ENTITY, err)
}

fn internal_error(err: impl std::fmt::Display) -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, err)
}

fn error_response(status: StatusCode, err: impl std::fmt::Display) -> Response {
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
