use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id for one request, exposed as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Attach a correlation id to the request and echo it on the response.
///
/// A caller-supplied `x-request-id` is kept when it is short, printable
/// ASCII; anything else is replaced with a fresh v4 UUID.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let supplied = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|s| !s.is_empty() && s.len() <= 64 && s.chars().all(|c| c.is_ascii_graphic()));

    let request_id = match supplied {
        Some(id) => id.to_string(),
        None => Uuid::new_v4().to_string(),
    };

    // Both branches yield valid header bytes
    let value =
        HeaderValue::from_str(&request_id).unwrap_or_else(|_| HeaderValue::from_static("-"));

    req.headers_mut().insert(REQUEST_ID_HEADER, value.clone());
    req.extensions_mut().insert(RequestId(request_id));

    let mut response = next.run(req).await;
    response.headers_mut().insert(REQUEST_ID_HEADER, value);
    response
}
