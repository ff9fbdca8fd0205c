// src/api/routes.rs
use actix_web::web;
use super::handlers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health_check))
            .route("/config", web::get().to(handlers::client_config))
            .route("/analyze-aura", web::post().to(handlers::analyze_aura))
            .route("/checkout", web::post().to(handlers::create_checkout))
            .route("/debug-gemini", web::get().to(handlers::debug_gemini))
    );
}
