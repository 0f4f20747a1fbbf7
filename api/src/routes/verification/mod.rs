//! Phone verification route handlers
//!
//! Every endpoint works on the session named by the session header.
//! `request-code` creates the session when the header is absent.

pub mod cancel;
pub mod cooldown;
pub mod request_code;
pub mod retry_record_update;
pub mod status;
pub mod submit_code;

pub use cancel::cancel;
pub use cooldown::cooldown;
pub use request_code::request_code;
pub use retry_record_update::retry_record_update;
pub use status::status;
pub use submit_code::submit_code;

use actix_web::http::header::{self, HeaderName, HeaderValue};
use actix_web::{HttpRequest, HttpResponse};
use std::sync::Arc;
use uuid::Uuid;

use crate::handlers::ApiError;
use crate::state::{AppState, VerificationSession};

/// Session id carried by the request, if well-formed
pub(crate) fn session_id(req: &HttpRequest, state: &AppState) -> Option<Uuid> {
    req.headers()
        .get(state.session_header.as_str())
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
}

/// The session named by the request; it must exist
pub(crate) async fn existing_session(
    req: &HttpRequest,
    state: &AppState,
) -> Result<Arc<VerificationSession>, ApiError> {
    let id = session_id(req, state).ok_or(ApiError::SessionNotFound)?;
    state
        .sessions
        .get(&id)
        .await
        .ok_or(ApiError::SessionNotFound)
}

/// Bearer credentials of the caller, forwarded to the account backend
pub(crate) fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

pub(crate) fn attach_session_header(response: &mut HttpResponse, state: &AppState, id: Uuid) {
    let name = HeaderName::try_from(state.session_header.as_str());
    let value = HeaderValue::from_str(&id.to_string());
    if let (Ok(name), Ok(value)) = (name, value) {
        response.headers_mut().insert(name, value);
    }
}
