use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::Response,
};
use bytes::Bytes;

use crate::core::error::{AppError, Result};

/// `Content-Disposition` value for a download; non-ASCII names are carried
/// in the RFC 5987 `filename*` parameter.
pub fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    if fallback == file_name {
        format!("attachment; filename=\"{}\"", file_name)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            urlencoding::encode(file_name)
        )
    }
}

/// Builds a download response carrying type, length and disposition headers
pub fn attachment_response(
    body: Bytes,
    content_type: &str,
    file_name: &str,
    extra_headers: &[(&'static str, String)],
) -> Result<Response> {
    let length = body.len();
    let mut response = Response::new(Body::from(body));
    let headers: &mut HeaderMap = response.headers_mut();

    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&content_disposition(file_name))
            .map_err(|e| AppError::Internal(format!("Invalid file name header: {}", e)))?,
    );

    for (name, value) in extra_headers {
        let value = HeaderValue::from_str(value)
            .map_err(|e| AppError::Internal(format!("Invalid header '{}': {}", name, e)))?;
        headers.insert(HeaderName::from_static(name), value);
    }

    Ok(response)
}
