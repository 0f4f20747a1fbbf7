use actix_web::{web, HttpRequest, HttpResponse};

use crate::state::AppState;

use super::session_id;

/// Handler for POST /api/v1/phone-verification/cancel
///
/// Always answers 204. Cancelling does not wait for a request of the same
/// session that is still talking to a channel; that request ends with
/// `CANCELLED` instead.
pub async fn cancel(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if let Some(id) = session_id(&req, &state) {
        if let Some(session) = state.sessions.get(&id).await {
            session.orchestrator.cancel().await;
        }
    }
    HttpResponse::NoContent().finish()
}
