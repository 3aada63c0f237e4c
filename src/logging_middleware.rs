// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode
//!
//! Credentials never reach the log: JSON fields such as `password` or
//! `token` are masked, and multipart or binary bodies are summarised by
//! size instead of being buffered into the log line.

use axum::body::to_bytes;
use axum::{
    body::Body,
    extract::Request,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode, Uri},
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use tracing::{debug, enabled, Level};

const REDACTED: &str = "[redacted]";

/// Keys whose values are masked wherever they appear in a JSON body
const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "token",
    "id_token",
    "idToken",
    "access_token",
    "refresh_token",
    "private_key",
    "client_secret",
];

/// Masks sensitive fields in place, recursing through objects and arrays
pub fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if SENSITIVE_KEYS.contains(&key.as_str()) {
                    *field = Value::String(REDACTED.to_string());
                } else {
                    redact(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

/// Renders a URI for the log with sensitive query values masked
///
/// The admin feed takes its bearer token as `?token=` because browsers can't
/// set headers on a websocket handshake.
pub fn redact_uri(uri: &Uri) -> String {
    let Some(query) = uri.query() else {
        return uri.to_string();
    };

    let masked: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if SENSITIVE_KEYS.contains(&key) => format!("{}={}", key, REDACTED),
            _ => pair.to_string(),
        })
        .collect();
    format!("{}?{}", uri.path(), masked.join("&"))
}

/// Renders a body for the log, or `None` when it should only be counted
fn loggable_body(headers: &HeaderMap, bytes: &[u8]) -> Option<String> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if content_type.starts_with("multipart/") || content_type.starts_with("image/") {
        return None;
    }

    let text = std::str::from_utf8(bytes).ok()?;
    match serde_json::from_str::<Value>(text) {
        Ok(mut json) => {
            redact(&mut json);
            Some(serde_json::to_string_pretty(&json).unwrap_or_else(|_| REDACTED.to_string()))
        }
        // Non-JSON text can't be masked field by field
        Err(_) if content_type.starts_with("application/json") => Some(REDACTED.to_string()),
        Err(_) => Some(text.to_string()),
    }
}

/// Middleware to log request and response bodies in debug mode
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    if !enabled!(Level::DEBUG) {
        return Ok(next.run(request).await);
    }

    // Uploads stream straight through
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/"));
    if is_multipart {
        debug!(method = %request.method(), uri = %redact_uri(request.uri()), "📥 Request (multipart body not logged)");
        return Ok(next.run(request).await);
    }

    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() {
        match loggable_body(&parts.headers, &bytes) {
            Some(request_body) => debug!(
                method = %parts.method,
                uri = %redact_uri(&parts.uri),
                request_body = %request_body,
                "📥 Request"
            ),
            None => debug!(method = %parts.method, uri = %redact_uri(&parts.uri), bytes = bytes.len(), "📥 Request"),
        }
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    // Photos and websocket upgrades are not buffered
    let is_binary = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("image/"));
    if is_binary || response.status() == StatusCode::SWITCHING_PROTOCOLS {
        debug!(status = %response.status(), "📤 Response");
        return Ok(response);
    }

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() {
        match loggable_body(&parts.headers, &bytes) {
            Some(response_body) => debug!(
                status = %parts.status,
                response_body = %response_body,
                "📤 Response"
            ),
            None => debug!(status = %parts.status, bytes = bytes.len(), "📤 Response"),
        }
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    #[test]
    fn test_redact_masks_nested_secrets() {
        let mut body = json!({
            "email": "a@church.org",
            "password": "secret1",
            "session": { "token": "abc.def.ghi", "expires_at": "2030-01-01" },
            "items": [{ "id_token": "xyz" }]
        });
        redact(&mut body);

        assert_eq!(body["email"], "a@church.org");
        assert_eq!(body["password"], REDACTED);
        assert_eq!(body["session"]["token"], REDACTED);
        assert_eq!(body["session"]["expires_at"], "2030-01-01");
        assert_eq!(body["items"][0]["id_token"], REDACTED);
    }

    #[test]
    fn test_redact_uri_masks_query_tokens() {
        let uri: Uri = "/ws/admin/requests?token=abc.def.ghi".parse().unwrap();
        assert_eq!(redact_uri(&uri), "/ws/admin/requests?token=[redacted]");

        let uri: Uri = "/api/events?page=2&access_token=xyz&limit=10".parse().unwrap();
        let logged = redact_uri(&uri);
        assert!(!logged.contains("xyz"));
        assert_eq!(logged, "/api/events?page=2&access_token=[redacted]&limit=10");

        let uri: Uri = "/api/events".parse().unwrap();
        assert_eq!(redact_uri(&uri), "/api/events");
    }

    #[test]
    fn test_loggable_body_skips_uploads_and_masks_json() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("image/jpeg"));
        assert_eq!(loggable_body(&headers, b"\xff\xd8\xff"), None);

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let logged = loggable_body(&headers, br#"{"password":"secret1"}"#).unwrap();
        assert!(!logged.contains("secret1"));

        let broken = loggable_body(&headers, b"password=secret1").unwrap();
        assert_eq!(broken, REDACTED);
    }
}
