//! API route definitions.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Multipart,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{AppState, middleware::auth::auth_middleware};
use tillbook_core::audit::AuditService;
use tillbook_core::identity::IdentityError;
use tillbook_db::{
    AuditReportRepository, NotificationRepository, SubmissionRepository, UserRepository,
};

pub mod audit_reports;
pub mod cashups;
pub mod health;

/// The orchestrator wired to the database-backed repositories.
pub(crate) type DbAuditService =
    AuditService<SubmissionRepository, AuditReportRepository, UserRepository, NotificationRepository>;

/// Builds the orchestrator for one request.
pub(crate) fn audit_service(state: &AppState) -> DbAuditService {
    let db = (*state.db).clone();
    AuditService::new(
        Arc::clone(&state.storage),
        Arc::new(SubmissionRepository::new(db.clone())),
        Arc::new(AuditReportRepository::new(db.clone())),
        Arc::new(UserRepository::new(db.clone())),
        Arc::new(NotificationRepository::new(db)),
        state.lateness,
    )
}

/// One uploaded workbook from a multipart request.
pub(crate) struct WorkbookUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Reads the single file part out of a multipart body.
pub(crate) async fn read_workbook_part(
    mut multipart: Multipart,
) -> Result<WorkbookUpload, Response> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "VALIDATION_ERROR",
                "message": format!("malformed multipart body: {e}")
            })),
        )
            .into_response()
    })? {
        let Some(filename) = field.file_name().map(ToString::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "VALIDATION_ERROR",
                        "message": format!("failed to read file part: {e}")
                    })),
                )
                    .into_response()
            })?
            .to_vec();

        return Ok(WorkbookUpload {
            filename,
            content_type,
            bytes,
        });
    }

    Err((
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "VALIDATION_ERROR",
            "message": "multipart request must contain one spreadsheet file"
        })),
    )
        .into_response())
}

/// Maps an orchestrator error to the wire response.
pub(crate) fn error_response(err: &tillbook_core::audit::AuditError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    // Ambiguous-identity responses carry the candidate count for the caller.
    let body = match err {
        tillbook_core::audit::AuditError::Identity(IdentityError::AmbiguousOrNoIdentity {
            detected,
            matches,
        }) => json!({
            "error": err.error_code(),
            "message": err.to_string(),
            "detected": detected,
            "matches": matches,
        }),
        _ => json!({
            "error": err.error_code(),
            "message": err.to_string(),
        }),
    };

    (status, Json(body)).into_response()
}

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(cashups::routes())
        .merge(audit_reports::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new().merge(health::routes()).merge(protected_routes)
}
