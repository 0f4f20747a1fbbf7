//! Application factory
//!
//! Builds the Actix-web application around a shared [`AppState`].

use actix_web::{web, App, HttpResponse};
use tracing_actix_web::TracingLogger;

use pv_shared::config::CorsConfig;
use pv_shared::errors::{error_codes, ErrorResponse};
use pv_shared::types::HealthResponse;

use crate::middleware::cors::create_cors;
use crate::routes::verification;
use crate::state::AppState;

/// Create and configure the application with all dependencies
pub fn create_app(
    app_state: web::Data<AppState>,
    cors: &CorsConfig,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let cors = create_cors(cors, &app_state.session_header);

    App::new()
        // Add application state
        .app_data(app_state)
        .app_data(web::JsonConfig::default().error_handler(|err, _req| {
            let response = HttpResponse::BadRequest()
                .json(ErrorResponse::new(error_codes::BAD_REQUEST, err.to_string()));
            actix_web::error::InternalError::from_response(err, response).into()
        }))
        // Request spans first, then CORS
        .wrap(cors)
        .wrap(TracingLogger::default())
        // Health check endpoint
        .route("/health", web::get().to(health_check))
        // API v1 routes
        .service(
            web::scope("/api/v1").service(
                web::scope("/phone-verification")
                    .route("/request-code", web::post().to(verification::request_code))
                    .route("/submit-code", web::post().to(verification::submit_code))
                    .route("/cancel", web::post().to(verification::cancel))
                    .route("/cooldown", web::get().to(verification::cooldown))
                    .route("/status", web::get().to(verification::status))
                    .route(
                        "/retry-record-update",
                        web::post().to(verification::retry_record_update),
                    ),
            ),
        )
        // Default 404 handler
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse::healthy(
        "phone-verification-api",
        env!("CARGO_PKG_VERSION"),
    ))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
