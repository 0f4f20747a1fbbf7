use actix_web::{web, HttpRequest, HttpResponse};

use crate::handlers::ApiError;
use crate::state::AppState;
use pv_shared::types::ApiResponse;

use super::existing_session;

/// Handler for GET /api/v1/phone-verification/status
pub async fn status(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let session = existing_session(&req, &state).await?;
    let snapshot = session.orchestrator.snapshot().await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(snapshot)))
}
