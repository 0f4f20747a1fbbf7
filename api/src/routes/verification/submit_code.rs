use actix_web::{web, HttpRequest, HttpResponse};
use tracing::warn;
use validator::Validate;

use crate::dto::{SubmitCodeRequest, SubmitCodeResponse};
use crate::handlers::ApiError;
use crate::state::AppState;
use pv_shared::types::ApiResponse;

use super::existing_session;

/// Handler for POST /api/v1/phone-verification/submit-code
///
/// Confirms the code against the session's live challenge. A verified
/// phone whose user record could not be updated still succeeds, with
/// `record_update_warning` set.
pub async fn submit_code(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<SubmitCodeRequest>,
) -> Result<HttpResponse, ApiError> {
    let session = existing_session(&req, &state).await?;
    let _guard = session.try_begin().ok_or(ApiError::SessionBusy)?;

    request.validate()?;

    let result = session.orchestrator.submit_code(&request.code).await?;

    if result.record_update_warning.is_some() {
        warn!(
            session_id = %session.id,
            event = "record_update_pending",
            "Phone verified; user record update needs a retry"
        );
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(SubmitCodeResponse {
        verified: result.verified,
        channel: result.channel,
        record_update_warning: result.record_update_warning,
    })))
}
