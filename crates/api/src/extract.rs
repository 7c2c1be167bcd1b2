//! Request extractors shared by handlers.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use greenview_core::diagnostics::RequestOrigin;

/// Placeholder when the caller cannot be identified.
const UNKNOWN: &str = "unknown";

/// Caller IP and user agent, stamped onto diagnostic log entries written
/// while serving the request.
///
/// The IP is taken from `X-Forwarded-For` (first hop), then `X-Real-IP`,
/// then the socket peer address.
#[derive(Debug, Clone)]
pub struct CallerOrigin(pub RequestOrigin);

impl<S: Send + Sync> FromRequestParts<S> for CallerOrigin {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        let client_ip = forwarded_ip(&parts.headers)
            .or(peer)
            .unwrap_or_else(|| UNKNOWN.to_string());
        let user_agent = header_str(&parts.headers, USER_AGENT.as_str())
            .unwrap_or(UNKNOWN)
            .to_string();

        Ok(Self(RequestOrigin::new(client_ip, user_agent)))
    }
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    header_str(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .or_else(|| header_str(headers, "x-real-ip"))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
