//! Builds the `RequestContext` for every inbound request.
//!
//! - `X-Request-Id` is taken from the request, or generated (UUID v4)
//! - `X-Forwarded-For` is taken from the request, or falls back to the
//!   peer address
//!
//! The context is stored in request extensions for handlers, and the
//! request id is echoed on the response.

use axum::{
    extract::{ConnectInfo, Request},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use common::RequestContext;
use std::net::SocketAddr;

const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
const FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Middleware that attaches a [`RequestContext`] to the request.
pub async fn request_context_middleware(mut request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ctx = context_from_headers(request.headers(), peer);

    let request_id = HeaderValue::from_str(&ctx.request_id).ok();
    request.extensions_mut().insert(ctx);

    let mut response = next.run(request).await;
    if let Some(value) = request_id {
        response.headers_mut().insert(REQUEST_ID, value);
    }
    response
}

/// Derive the call context from inbound headers and the peer address.
pub fn context_from_headers(headers: &HeaderMap, peer: Option<SocketAddr>) -> RequestContext {
    let request_id = header_str(headers, &REQUEST_ID)
        .map(str::to_string)
        .unwrap_or_else(|| RequestContext::generated().request_id);

    let forwarded_for = header_str(headers, &FORWARDED_FOR)
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_default();

    RequestContext::new(request_id, forwarded_for)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
