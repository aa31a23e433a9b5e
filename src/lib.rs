use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod declaration;
pub mod error;
pub mod generators;
pub mod rendering;
pub mod state;
pub mod webhook;

pub use crate::config::AppConfig;
pub use crate::error::ApiError;
pub use crate::state::AppState;

use crate::declaration::MissingFieldsError;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
    /// Names of the required fields that were empty, in validation order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_fields: Option<Vec<String>>,
    /// One explanation per missing field, with the accepted alias keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            missing_fields: None,
            details: None,
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }

    pub fn missing_fields(missing: &MissingFieldsError) -> Self {
        Self {
            missing_fields: Some(missing.field_names().into_iter().map(String::from).collect()),
            details: Some(missing.details().iter().map(ToString::to_string).collect()),
            ..Self::new("ValidationError", &missing.to_string())
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::webhook::handlers::health,
        crate::webhook::handlers::webhook,
        crate::webhook::handlers::webhook_html,
        crate::webhook::handlers::generate_pdf,
        crate::webhook::handlers::pdf_filler
    ),
    components(
        schemas(
            declaration::DeclarationRecord,
            declaration::Purchaser,
            webhook::handlers::HealthResponse,
            webhook::handlers::GeneratePdfRequest,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Statutory Declaration", description = "Statutory declaration webhook and PDF endpoints.")
    )
)]
pub struct ApiDoc;

fn cors(config: &AppConfig) -> Cors {
    let cors = if config.cors_origins.is_empty() {
        Cors::default().allow_any_origin()
    } else {
        config
            .cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .expose_headers(vec![
            "content-disposition",
            "x-pdf-available",
            "x-renderer",
            "x-environment",
        ])
        .max_age(3600)
}

pub async fn run() -> std::io::Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::other(e)
    })?;
    let addr = config
        .server
        .socket_addr()
        .map_err(std::io::Error::other)?;

    let app_state = match AppState::from_config(config.clone()) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!("Failed to build HTTP client: {}", e);
            return Err(std::io::Error::other(e));
        }
    };

    let prometheus = PrometheusMetricsBuilder::new("statutory_declaration_server")
        .endpoint("/metrics")
        .build()
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    log::info!(
        "Starting server at http://{} ({}, PDF renderer: {})",
        addr,
        app_state.environment_label(),
        app_state.renderer_kind()
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(cors(&config))
            .app_data(app_state.clone())
            .service(web::scope("/api").configure(webhook::config))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind(addr)?
    .run()
    .await
}
