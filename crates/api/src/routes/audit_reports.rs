//! Standalone audit report routes.

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::Utc;
use tracing::{error, info};

use super::{audit_service, error_response, read_workbook_part};
use crate::{AppState, middleware::AuthUser};

/// Creates the standalone audit report routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/audit-reports", post(upload_standalone))
}

/// POST `/audit-reports`
/// Upload evidence not bound to a submission; the owner is resolved from
/// the employee name printed in the workbook and reconciliation is
/// deferred until their next submit-for-review.
async fn upload_standalone(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> impl IntoResponse {
    let upload = match read_workbook_part(multipart).await {
        Ok(upload) => upload,
        Err(response) => return response,
    };

    let service = audit_service(&state);
    match service
        .upload_standalone(
            &auth.actor(),
            &upload.filename,
            &upload.content_type,
            upload.bytes,
            Utc::now(),
        )
        .await
    {
        Ok(outcome) => {
            info!(
                user_id = %outcome.detected.user_id,
                date_key = %outcome.audit.date_key,
                "Standalone evidence stored"
            );
            (StatusCode::OK, Json(outcome)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Standalone evidence upload failed");
            error_response(&e)
        }
    }
}
