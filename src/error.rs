//! Boundary error type: every handler failure ends up here and is turned into
//! an [`ErrorResponse`] JSON body.

use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::declaration::MissingFieldsError;
use crate::generators::GeneratorError;
use crate::rendering::RenderError;
use crate::webhook::payload::PayloadError;
use crate::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    MissingFields(#[from] MissingFieldsError),

    #[error("PDF generation timed out")]
    RenderTimeout,

    #[error("PDF generation failed: {0}")]
    Render(RenderError),

    #[error("Method Not Allowed")]
    MethodNotAllowed { allow: &'static str },
}

impl From<GeneratorError> for ApiError {
    fn from(error: GeneratorError) -> Self {
        match error {
            GeneratorError::MissingFields(missing) => Self::MissingFields(missing),
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(error: RenderError) -> Self {
        if error.is_timeout() {
            Self::RenderTimeout
        } else {
            Self::Render(error)
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Payload(PayloadError::TooLarge(_)) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Payload(_) | ApiError::MissingFields(_) => StatusCode::BAD_REQUEST,
            ApiError::RenderTimeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Payload(_) => ErrorResponse::bad_request(&self.to_string()),
            ApiError::MissingFields(missing) => ErrorResponse::missing_fields(missing),
            ApiError::RenderTimeout => ErrorResponse::new("RequestTimeout", &self.to_string()),
            ApiError::Render(_) => ErrorResponse::internal_error(&self.to_string()),
            ApiError::MethodNotAllowed { .. } => {
                ErrorResponse::new("MethodNotAllowed", &self.to_string())
            }
        };

        let mut response = HttpResponse::build(self.status_code());
        if let ApiError::MethodNotAllowed { allow } = self {
            response.insert_header((header::ALLOW, *allow));
        }
        response.json(body)
    }
}
