use super::common::*;
use crate::workflows::assessment::domain::{ListingId, VisaCategory};
use crate::workflows::assessment::overrides::{OverrideError, OverrideRequest};
use crate::workflows::assessment::service::AssessmentServiceError;

fn request(note: &str) -> OverrideRequest {
    OverrideRequest {
        category: VisaCategory::High,
        note: note.to_string(),
    }
}

#[test]
fn override_without_assessment_is_not_found() {
    let (service, _) = build_service([listing(1, "Friendly team")]);

    match service.override_assessment(ListingId(1), request("Confirmed with recruiter")) {
        Err(AssessmentServiceError::Override(OverrideError::NoAssessment(id))) => {
            assert_eq!(id, ListingId(1))
        }
        other => panic!("expected missing assessment, got {other:?}"),
    }
}

#[test]
fn nine_character_note_is_rejected() {
    assert!(matches!(
        request("too short").validate(),
        Err(OverrideError::NoteTooShort(9))
    ));
    assert!(request("long enough").validate().is_ok());
    assert!(request("überprüfen").validate().is_ok());
}

#[tokio::test]
async fn override_preserves_automated_judgment() {
    let (service, repository) = build_service([listing(1, "US citizens only")]);
    let original = service.assess_listing(ListingId(1)).await.expect("assessed");

    let updated = service
        .override_assessment(ListingId(1), request("Recruiter confirmed OPT hires"))
        .expect("override applied");

    assert_eq!(updated.id, original.id);
    assert_eq!(updated.result, original.result);
    assert_eq!(updated.result.category(), VisaCategory::Low);
    assert_eq!(updated.override_category, Some(VisaCategory::High));
    assert_eq!(updated.effective_category(), VisaCategory::High);

    let stored = repository.rows();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].result.confidence(), original.result.confidence());
    assert_eq!(
        stored[0].override_note.as_deref(),
        Some("Recruiter confirmed OPT hires")
    );
}

#[tokio::test]
async fn override_targets_latest_row_only() {
    let (service, repository) = build_service([listing(1, "Friendly team")]);
    service.assess_listing(ListingId(1)).await.expect("first");
    let latest = service.assess_listing(ListingId(1)).await.expect("second");

    service
        .override_assessment(ListingId(1), request("Manual review done"))
        .expect("override applied");

    let rows = repository.rows();
    assert!(rows[0].override_category.is_none());
    assert_eq!(rows[1].id, latest.id);
    assert_eq!(rows[1].override_category, Some(VisaCategory::High));
}
