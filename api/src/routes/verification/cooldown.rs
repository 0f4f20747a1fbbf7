use actix_web::{web, HttpRequest, HttpResponse};

use crate::dto::CooldownResponse;
use crate::handlers::ApiError;
use crate::state::AppState;
use pv_shared::types::ApiResponse;

use super::existing_session;

/// Handler for GET /api/v1/phone-verification/cooldown
pub async fn cooldown(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let session = existing_session(&req, &state).await?;
    let remaining_seconds = session.orchestrator.remaining_cooldown().await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(CooldownResponse { remaining_seconds })))
}
