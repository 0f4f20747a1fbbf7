use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use tracing::{info, warn};
use validator::Validate;

use crate::dto::{RequestCodeRequest, RequestCodeResponse};
use crate::handlers::ApiError;
use crate::state::{AppState, VerificationSession};
use pv_shared::types::ApiResponse;
use pv_shared::utils::phone::mask_phone_number;

use super::{attach_session_header, bearer_token, session_id};

/// Handler for POST /api/v1/phone-verification/request-code
///
/// Sends a verification code to the given phone number, creating the
/// verification session when the request does not name one.
///
/// # Request Body
///
/// ```json
/// {
///     "phone": "010 000 0000",
///     "anti_automation_token": "03AGdBq27..."
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "success": true,
///     "data": {
///         "session_id": "550e8400-e29b-41d4-a716-446655440000",
///         "channel_used": "primary",
///         "phone_masked": "+20****0000",
///         "resend_after": 300,
///         "expires_at": "2025-08-14T10:10:00Z"
///     },
///     "timestamp": "2025-08-14T10:00:00Z"
/// }
/// ```
///
/// The session id is also returned in the session header, on errors too.
pub async fn request_code(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<RequestCodeRequest>,
) -> HttpResponse {
    let request = request.into_inner();

    let existing = match session_id(&req, &state) {
        Some(id) => state.sessions.get(&id).await,
        None => None,
    };
    let session = match existing {
        Some(session) => session,
        None => state.sessions.create(bearer_token(&req)).await,
    };

    let mut response = match handle(&session, &request).await {
        Ok(data) => HttpResponse::Ok().json(ApiResponse::success(data)),
        Err(err) => err.error_response(),
    };
    attach_session_header(&mut response, &state, session.id);
    response
}

async fn handle(
    session: &VerificationSession,
    request: &RequestCodeRequest,
) -> Result<RequestCodeResponse, ApiError> {
    let _guard = session.try_begin().ok_or(ApiError::SessionBusy)?;

    request.validate().map_err(|e| {
        warn!(
            session_id = %session.id,
            "Validation failed for request-code request"
        );
        ApiError::from(e)
    })?;

    info!(
        session_id = %session.id,
        phone = %mask_phone_number(&request.phone),
        "Processing request-code"
    );

    session
        .anti_automation
        .supply(request.anti_automation_token.as_deref());

    let result = session.orchestrator.request_code(&request.phone).await?;

    let resend_after = session.orchestrator.remaining_cooldown().await;

    Ok(RequestCodeResponse {
        session_id: session.id.to_string(),
        channel_used: result.channel_used,
        phone_masked: result.phone.masked(),
        resend_after,
        expires_at: result.expires_at,
    })
}
