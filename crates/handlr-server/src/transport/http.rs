//! axum adapter: `axum::extract::Request` in, `axum::response::Response` out.
//!
//! Routing is axum's; this layer only converts types and enforces the body
//! size limit before the dispatch core sees the request.

use std::sync::Arc;

use axum::body::{to_bytes, Body, Bytes};
use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use http_body_util::LengthLimitError;

use handlr_core::error::HandlrError;
use handlr_core::http::{HttpRequest, HttpResponse, RequestContext};

use crate::dispatch::HttpHandlerBase;

pub async fn serve(handler: Arc<HttpHandlerBase>, max_body_bytes: usize, req: Request) -> Response {
    let (parts, body) = req.into_parts();

    let bytes = match read_body(body, max_body_bytes).await {
        Ok(b) => b,
        Err(e) => {
            tracing::debug!(handler = handler.handler_name(), error = %e, "request body rejected");
            return into_response(HttpResponse::from_error(&e));
        }
    };

    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    let mut request = HttpRequest::new(parts.method.as_str(), target).with_body(bytes);
    for (name, value) in parts.headers.iter() {
        match value.to_str() {
            Ok(v) => request.push_header(name.as_str(), v),
            Err(_) => tracing::trace!(header = %name, "skipping non-ascii header value"),
        }
    }

    let response = handler
        .handle_request(Arc::new(request), RequestContext::new())
        .await;
    into_response(response)
}

/// Buffer the body up to `limit` bytes. Over the limit is 413; any other body
/// error (client abort, broken framing) is 400.
pub async fn read_body(body: Body, limit: usize) -> Result<Bytes, HandlrError> {
    to_bytes(body, limit).await.map_err(|e| {
        if is_length_limit(&e) {
            HandlrError::PayloadTooLarge
        } else {
            HandlrError::BadRequest(format!("failed to read request body: {e}"))
        }
    })
}

fn is_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

pub fn into_response(resp: HttpResponse) -> Response {
    let status = StatusCode::from_u16(resp.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut out = (status, resp.body).into_response();
    for (k, v) in resp.headers {
        match (HeaderName::try_from(k), HeaderValue::try_from(v)) {
            (Ok(name), Ok(value)) => {
                out.headers_mut().insert(name, value);
            }
            _ => tracing::warn!("dropping invalid response header"),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn body_over_limit_is_payload_too_large() {
        let err = read_body(Body::from("x".repeat(100)), 10).await.unwrap_err();
        assert_eq!(err.status_code(), 413);
    }

    #[tokio::test]
    async fn aborted_body_is_bad_request() {
        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "client went away")),
        ];
        let body = Body::from_stream(futures_util::stream::iter(chunks));

        let err = read_body(body, 1024).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn body_within_limit_is_buffered() {
        let bytes = read_body(Body::from("hello"), 5).await.unwrap();
        assert_eq!(&bytes[..], b"hello");
    }
}
