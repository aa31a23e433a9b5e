//! HTTP boundary for the statutory declaration pipeline.
//!
//! Routes are registered relative to the `/api` scope.

pub mod handlers;
pub mod payload;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/health")
            .route(web::get().to(handlers::health))
            .default_service(web::route().to(handlers::get_only)),
    )
    .service(
        web::resource("/webhook")
            .route(web::post().to(handlers::webhook))
            .default_service(web::route().to(handlers::post_only)),
    )
    .service(
        web::resource("/webhook/html")
            .route(web::post().to(handlers::webhook_html))
            .default_service(web::route().to(handlers::post_only)),
    )
    .service(
        web::resource("/generate-pdf")
            .route(web::post().to(handlers::generate_pdf))
            .default_service(web::route().to(handlers::post_only)),
    )
    .service(
        web::resource("/pdf-filler")
            .route(web::post().to(handlers::pdf_filler))
            .default_service(web::route().to(handlers::post_only)),
    );
}
