//! Request body extraction: JSON or `multipart/form-data` into a [`RawPayload`].

use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{web, HttpRequest};
use futures_util::StreamExt;
use serde_json::{Map, Value};

use crate::declaration::RawPayload;

/// Upper bound on an accepted request body.
pub const MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

/// Multipart fields whose text is parsed as JSON when possible.
const JSON_FIELDS: &[&str] = &["purchasers", "purchaser", "data", "payload", "extractedData"];

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("payload absent")]
    Empty,
    #[error("Malformed JSON body: {0}")]
    MalformedJson(String),
    #[error("Multipart field error: {0}")]
    Multipart(String),
    #[error("Invalid UTF-8 data in field '{0}'")]
    Utf8(String),
    #[error("Failed to read request body: {0}")]
    Io(String),
    #[error("Payload exceeds {0} bytes")]
    TooLarge(usize),
    #[error("Request body is missing '{0}'")]
    MissingKey(&'static str),
}

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
}

/// Read the body as a payload value. An empty body, or a body that is JSON
/// `null`, is reported as [`PayloadError::Empty`].
pub async fn read_payload(req: &HttpRequest, payload: web::Payload) -> Result<RawPayload, PayloadError> {
    let value = if is_multipart(req) {
        parse_multipart(Multipart::new(req.headers(), payload)).await?
    } else {
        parse_json(&read_body(payload).await?)?
    };

    if value.is_null() {
        return Err(PayloadError::Empty);
    }
    Ok(value)
}

async fn read_body(mut payload: web::Payload) -> Result<Vec<u8>, PayloadError> {
    let mut body = Vec::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| PayloadError::Io(e.to_string()))?;
        if body.len() + chunk.len() > MAX_PAYLOAD_BYTES {
            return Err(PayloadError::TooLarge(MAX_PAYLOAD_BYTES));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

pub fn parse_json(body: &[u8]) -> Result<RawPayload, PayloadError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(PayloadError::Empty);
    }
    serde_json::from_slice(body).map_err(|e| PayloadError::MalformedJson(e.to_string()))
}

/// Collect text fields into a JSON object. File parts are ignored.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<RawPayload, PayloadError> {
    let mut fields = Map::new();
    let mut total = 0usize;

    while let Some(item) = multipart.next().await {
        let mut field = item.map_err(|e| PayloadError::Multipart(e.to_string()))?;
        let content_disposition = field
            .content_disposition()
            .ok_or_else(|| PayloadError::Multipart("Content disposition not found".to_string()))?;
        let name = content_disposition
            .get_name()
            .ok_or_else(|| PayloadError::Multipart("Field name not found".to_string()))?
            .to_string();
        let is_file = content_disposition.get_filename().is_some();

        let mut buffer = Vec::new();
        while let Some(chunk) = field.next().await {
            let data_chunk = chunk.map_err(|e| PayloadError::Io(e.to_string()))?;
            total += data_chunk.len();
            if total > MAX_PAYLOAD_BYTES {
                return Err(PayloadError::TooLarge(MAX_PAYLOAD_BYTES));
            }
            buffer.extend_from_slice(&data_chunk);
        }

        if is_file {
            log::debug!("Skipping file part '{}' in multipart payload", name);
            continue;
        }

        let text = String::from_utf8(buffer).map_err(|_| PayloadError::Utf8(name.clone()))?;
        fields.insert(name.clone(), field_value(&name, text));
    }

    if fields.is_empty() {
        return Err(PayloadError::Empty);
    }
    Ok(Value::Object(fields))
}

fn field_value(name: &str, text: String) -> Value {
    if JSON_FIELDS.contains(&name) {
        if let Ok(parsed @ (Value::Array(_) | Value::Object(_))) = serde_json::from_str::<Value>(&text) {
            return parsed;
        }
    }
    Value::String(text)
}

/// Take `key` out of a JSON object body, treating `null` as absent.
pub fn take_key(payload: RawPayload, key: &'static str) -> Result<RawPayload, PayloadError> {
    match payload {
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Null) | None => Err(PayloadError::MissingKey(key)),
            Some(value) => Ok(value),
        },
        _ => Err(PayloadError::MissingKey(key)),
    }
}
