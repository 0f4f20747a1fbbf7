//! CORS middleware configuration for cross-origin requests.
//!
//! Browsers must be able to send the session header and read it back, along
//! with `Retry-After` on cooldown responses.

use actix_cors::Cors;
use actix_web::http::{header, Method};

use pv_shared::config::CorsConfig;

/// Creates a CORS middleware instance from configuration.
///
/// A `*` entry in `allowed_origins` allows any origin; otherwise only the
/// listed origins are accepted.
pub fn create_cors(config: &CorsConfig, session_header: &str) -> Cors {
    let session_header = header::HeaderName::try_from(session_header.to_ascii_lowercase())
        .unwrap_or_else(|_| header::HeaderName::from_static("x-verification-session"));

    let cors = if config.allows_any_origin() {
        tracing::info!("Configuring permissive CORS");
        Cors::default().allow_any_origin()
    } else {
        tracing::info!(origins = ?config.allowed_origins, "Configuring CORS allow-list");
        config
            .allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            session_header.clone(),
        ])
        .expose_headers(vec![session_header, header::RETRY_AFTER])
        .max_age(config.max_age)
}
