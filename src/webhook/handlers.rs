use actix_web::http::header::{self, HeaderValue};
use actix_web::{web, HttpRequest, HttpResponse, HttpResponseBuilder, Responder};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::payload::{read_payload, take_key};
use crate::config::OutputFormat;
use crate::declaration::{normalize, DeclarationRecord, RawPayload};
use crate::error::ApiError;
use crate::generators::statutory_declaration::with_notice;
use crate::generators::GeneratedDocument;
use crate::rendering::render_with_timeout;
use crate::{AppState, ErrorResponse};

pub const PDF_AVAILABLE_HEADER: &str = "X-PDF-Available";
pub const RENDERER_HEADER: &str = "X-Renderer";
pub const ENVIRONMENT_HEADER: &str = "X-Environment";

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub environment: String,
    pub renderer: String,
    pub message: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FormatQuery {
    /// `pdf` or `html`; overrides the `Accept` header.
    pub format: Option<String>,
}

/// Body accepted by `/generate-pdf`.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePdfRequest {
    #[schema(value_type = Object)]
    pub extracted_data: serde_json::Value,
}

/// Output format: explicit `?format=`, then `Accept: application/pdf`, then the default.
fn requested_format(req: &HttpRequest, query: &FormatQuery, default: OutputFormat) -> OutputFormat {
    if let Some(format) = query.format.as_deref().and_then(OutputFormat::parse) {
        return format;
    }

    let accept = req
        .headers()
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if accept.contains("application/pdf") {
        OutputFormat::Pdf
    } else if accept.contains("text/html") {
        OutputFormat::Html
    } else {
        default
    }
}

/// Normalize and validate, then fill the template.
fn prepare_document(
    state: &AppState,
    raw: &RawPayload,
    request_id: &Uuid,
) -> Result<GeneratedDocument, ApiError> {
    let record = normalize(raw);

    match state.generator.generate(&record) {
        Ok(document) => {
            log::info!("[{}] Validation passed for {} purchaser(s)", request_id, record.purchasers.len());
            Ok(document)
        }
        Err(e) => {
            let error = ApiError::from(e);
            log::warn!("[{}] {}", request_id, error);
            Err(error)
        }
    }
}

fn with_common_headers(builder: &mut HttpResponseBuilder, state: &AppState, pdf: bool) {
    builder
        .insert_header((PDF_AVAILABLE_HEADER, if pdf { "true" } else { "false" }))
        .insert_header((RENDERER_HEADER, state.renderer_kind().as_str()))
        .insert_header((ENVIRONMENT_HEADER, state.environment_label()));
}

fn html_response(state: &AppState, html: String) -> HttpResponse {
    let mut builder = HttpResponse::Ok();
    with_common_headers(&mut builder, state, false);
    builder.content_type("text/html; charset=utf-8").body(html)
}

fn pdf_response(state: &AppState, document: &GeneratedDocument, pdf: Vec<u8>) -> HttpResponse {
    let mut builder = HttpResponse::Ok();
    with_common_headers(&mut builder, state, true);
    if let Ok(disposition) =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", document.filename))
    {
        builder.insert_header((header::CONTENT_DISPOSITION, disposition));
    }
    builder.content_type("application/pdf").body(pdf)
}

/// Render strictly: any renderer failure becomes the response.
async fn render_pdf(
    state: &AppState,
    document: &GeneratedDocument,
    request_id: &Uuid,
) -> Result<HttpResponse, ApiError> {
    log::info!("[{}] Rendering PDF with {} renderer", request_id, state.renderer_kind());

    match render_with_timeout(
        state.renderer.as_ref(),
        &document.html,
        &state.page_options,
        state.render_timeout(),
    )
    .await
    {
        Ok(pdf) => {
            log::info!("[{}] PDF generated ({} bytes)", request_id, pdf.len());
            Ok(pdf_response(state, document, pdf))
        }
        Err(e) => {
            log::error!("[{}] PDF generation failed: {}", request_id, e);
            Err(e.into())
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Statutory Declaration",
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        environment: state.environment_label().to_string(),
        renderer: state.renderer_kind().to_string(),
        message: "Statutory declaration webhook is running".to_string(),
    })
}

#[utoipa::path(
    context_path = "/api",
    tag = "Statutory Declaration",
    post,
    path = "/webhook",
    params(FormatQuery),
    request_body(content = DeclarationRecord, description = "Declaration payload; aliased keys and a `data` or `payload` wrapper are accepted"),
    responses(
        (status = 200, description = "PDF document, or HTML when PDF rendering is unavailable"),
        (status = 400, description = "Payload absent, malformed, or missing required fields", body = ErrorResponse),
        (status = 405, description = "Method not allowed", body = ErrorResponse)
    )
)]
pub async fn webhook(
    req: HttpRequest,
    payload: web::Payload,
    query: web::Query<FormatQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4();
    log::info!("[{}] Webhook received", request_id);

    let raw = read_payload(&req, payload).await?;
    let document = prepare_document(&state, &raw, &request_id)?;

    if requested_format(&req, &query, state.default_output()) == OutputFormat::Html {
        return Ok(html_response(&state, document.html));
    }

    match render_pdf(&state, &document, &request_id).await {
        Ok(response) => Ok(response),
        Err(e) => {
            log::warn!("[{}] Falling back to HTML output", request_id);
            let html = with_notice(
                &document.html,
                "PDF generation unavailable",
                &format!("{}. The document is returned as HTML instead; use your browser's print function to save it as PDF.", e),
            );
            Ok(html_response(&state, html))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Statutory Declaration",
    post,
    path = "/webhook/html",
    request_body(content = DeclarationRecord, description = "Declaration payload; aliased keys and a `data` or `payload` wrapper are accepted"),
    responses(
        (status = 200, description = "Filled HTML document", body = String, content_type = "text/html"),
        (status = 400, description = "Payload absent, malformed, or missing required fields", body = ErrorResponse),
        (status = 405, description = "Method not allowed", body = ErrorResponse)
    )
)]
pub async fn webhook_html(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4();
    log::info!("[{}] HTML webhook received", request_id);

    let raw = read_payload(&req, payload).await?;
    let document = prepare_document(&state, &raw, &request_id)?;

    Ok(html_response(&state, document.html))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Statutory Declaration",
    post,
    path = "/generate-pdf",
    request_body = GeneratePdfRequest,
    responses(
        (status = 200, description = "PDF document (application/pdf)"),
        (status = 400, description = "Missing extractedData or required fields", body = ErrorResponse),
        (status = 408, description = "PDF rendering timed out", body = ErrorResponse),
        (status = 500, description = "PDF rendering failed", body = ErrorResponse)
    )
)]
pub async fn generate_pdf(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4();
    log::info!("[{}] PDF generation requested", request_id);

    let body = read_payload(&req, payload).await?;
    let raw = take_key(body, "extractedData")?;
    let document = prepare_document(&state, &raw, &request_id)?;

    render_pdf(&state, &document, &request_id).await
}

#[utoipa::path(
    context_path = "/api",
    tag = "Statutory Declaration",
    post,
    path = "/pdf-filler",
    request_body(content = DeclarationRecord, description = "Form fields using the canonical names"),
    responses(
        (status = 200, description = "PDF document (application/pdf)"),
        (status = 400, description = "Missing required fields", body = ErrorResponse),
        (status = 408, description = "PDF rendering timed out", body = ErrorResponse),
        (status = 500, description = "PDF rendering failed", body = ErrorResponse)
    )
)]
pub async fn pdf_filler(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4();
    log::info!("[{}] PDF filler requested", request_id);

    let raw = read_payload(&req, payload).await?;
    let document = prepare_document(&state, &raw, &request_id)?;

    render_pdf(&state, &document, &request_id).await
}

pub async fn post_only() -> Result<HttpResponse, ApiError> {
    Err(ApiError::MethodNotAllowed { allow: "POST" })
}

pub async fn get_only() -> Result<HttpResponse, ApiError> {
    Err(ApiError::MethodNotAllowed { allow: "GET" })
}
