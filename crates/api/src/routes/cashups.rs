//! Cash-up submission routes: bound evidence upload, submit-for-review,
//! and reviewer notes.

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use super::{audit_service, error_response, read_workbook_part};
use crate::{AppState, middleware::AuthUser};

/// Creates the cash-up routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cashups/{id}/audit-report", post(upload_bound_evidence))
        .route("/cashups/submit-for-review", post(submit_for_review))
        .route("/cashups/{id}/notes", post(add_note))
}

/// Request body for submit-for-review.
#[derive(Debug, Deserialize)]
pub struct SubmitForReviewRequest {
    /// Submission to transition.
    pub submission_id: Uuid,
}

/// Request body for a reviewer note.
#[derive(Debug, Deserialize)]
pub struct AddNoteRequest {
    /// Note text.
    pub note: String,
}

/// POST `/cashups/{id}/audit-report`
/// Attach an evidence workbook to a submission and reconcile immediately.
async fn upload_bound_evidence(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(submission_id): Path<Uuid>,
    multipart: Multipart,
) -> impl IntoResponse {
    let upload = match read_workbook_part(multipart).await {
        Ok(upload) => upload,
        Err(response) => return response,
    };

    let service = audit_service(&state);
    match service
        .attach_bound_evidence(
            &auth.actor(),
            submission_id,
            &upload.filename,
            &upload.content_type,
            upload.bytes,
            Utc::now(),
        )
        .await
    {
        Ok(outcome) => {
            info!(
                submission_id = %submission_id,
                balanced = outcome.balanced,
                action = ?outcome.action,
                "Bound evidence processed"
            );
            (StatusCode::OK, Json(outcome)).into_response()
        }
        Err(e) => {
            error!(submission_id = %submission_id, error = %e, "Bound evidence upload failed");
            error_response(&e)
        }
    }
}

/// POST `/cashups/submit-for-review`
/// Owner submits a cash-up; deferred evidence reconciles here.
async fn submit_for_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SubmitForReviewRequest>,
) -> impl IntoResponse {
    let service = audit_service(&state);
    match service
        .submit_for_review(&auth.actor(), payload.submission_id, Utc::now())
        .await
    {
        Ok(outcome) => {
            info!(
                submission_id = %outcome.submission_id,
                status = %outcome.status,
                is_late = outcome.is_late_submission,
                "Submission submitted for review"
            );
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "message": "Cash-up submitted for review",
                    "status": outcome.status,
                    "is_late_submission": outcome.is_late_submission,
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(submission_id = %payload.submission_id, error = %e, "Submit for review failed");
            error_response(&e)
        }
    }
}

/// POST `/cashups/{id}/notes`
/// Reviewer appends a note; status is unchanged.
async fn add_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(submission_id): Path<Uuid>,
    Json(payload): Json<AddNoteRequest>,
) -> impl IntoResponse {
    let service = audit_service(&state);
    match service
        .add_review_note(&auth.actor(), submission_id, &payload.note, Utc::now())
        .await
    {
        Ok(note) => {
            info!(submission_id = %submission_id, "Review note added");
            (StatusCode::OK, Json(json!({ "success": true, "note": note }))).into_response()
        }
        Err(e) => {
            error!(submission_id = %submission_id, error = %e, "Adding review note failed");
            error_response(&e)
        }
    }
}
