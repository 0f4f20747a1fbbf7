use actix_web::{web, HttpRequest, HttpResponse};

use crate::handlers::ApiError;
use crate::state::AppState;

use super::existing_session;

/// Handler for POST /api/v1/phone-verification/retry-record-update
pub async fn retry_record_update(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let session = existing_session(&req, &state).await?;
    let _guard = session.try_begin().ok_or(ApiError::SessionBusy)?;

    session.orchestrator.retry_record_update().await?;

    Ok(HttpResponse::NoContent().finish())
}
