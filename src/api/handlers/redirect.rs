//! Handler for short URL redirect.

use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use metrics::counter;
use std::net::SocketAddr;

use crate::api::dto::link::RedirectQuery;
use crate::domain::click_event::ClickEvent;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;
use crate::utils::extract_domain::extract_domain_from_headers;

/// Redirects a short code to its destination URL.
///
/// # Endpoint
///
/// `GET /{code}?password=...`
///
/// # Request Flow
///
/// 1. Scope the `Host` header to a link domain (default domain when absent)
/// 2. Resolve through [`crate::application::services::ResolutionEngine`],
///    which counts the click atomically
/// 3. Hand a click event to the click queue (never blocks)
/// 4. Return `302 Found`
///
/// # Errors
///
/// - 404 Not Found for unknown or deactivated links
/// - 410 Gone for expired or exhausted links
/// - 401 Unauthorized with `WWW-Authenticate: Password` when the link is
///   password protected and the password is absent or wrong
/// - 503 Service Unavailable when the link store fails
pub async fn redirect_handler(
    Path(code): Path<String>,
    Query(query): Query<RedirectQuery>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Response, AppError> {
    let domain = extract_domain_from_headers(&headers)
        .ok()
        .and_then(|host| state.domains.scope(&host));

    let resolution = match state
        .resolver
        .resolve(domain.as_deref(), &code, query.password.as_deref())
        .await
    {
        Ok(resolution) => resolution,
        Err(e) => {
            counter!("redirects_total", "outcome" => e.outcome()).increment(1);
            return Err(e.into());
        }
    };
    counter!("redirects_total", "outcome" => "granted").increment(1);

    let ip = client_ip(&headers, Some(addr.ip()), state.behind_proxy);
    state.click_recorder.record(ClickEvent::new(
        resolution.link.id,
        domain,
        code,
        ip.map(|ip| ip.to_string()),
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
        headers.get(header::REFERER).and_then(|v| v.to_str().ok()),
    ));

    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, resolution.destination_url),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
    )
        .into_response())
}
