//! Handlers for link management endpoints (create, list, inspect, delete).

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::link::{
    CreateLinkRequest, DomainQuery, LinkDetailsResponse, LinkListResponse, LinkResponse,
};
use crate::api::dto::pagination::PaginationParams;
use crate::api::middleware::auth::Owner;
use crate::domain::entities::LinkKey;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /links`
///
/// A Bearer token is optional; when present the link belongs to the token's
/// owner and shows up in `GET /links`.
///
/// # Request Body
///
/// ```json
/// {
///   "destinationUrl": "https://example.com/landing",
///   "customAlias": "promo",          // optional
///   "password": "open-sesame",       // optional
///   "expiresAt": "2027-01-01T00:00:00Z",
///   "maxClicks": 100,
///   "isOneTime": false,
///   "domain": "go.example.com"       // optional, default domain otherwise
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request for invalid input or a taken alias (`alias_conflict`)
/// - 401 Unauthorized for an invalid token
/// - 503 Service Unavailable when no free code was found or the store fails
pub async fn create_link_handler(
    State(state): State<AppState>,
    owner: Option<Owner>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_link(owner.map(|o| o.id), payload.into())
        .await?;

    let short_url = state.link_service.short_url(&link);

    Ok((
        StatusCode::CREATED,
        Json(LinkResponse::from_link(&link, short_url)),
    ))
}

/// Lists the caller's links, newest first.
///
/// # Endpoint
///
/// `GET /links?page=1&pageSize=20`
pub async fn list_links_handler(
    State(state): State<AppState>,
    owner: Owner,
    Query(params): Query<PaginationParams>,
) -> Result<Json<LinkListResponse>, AppError> {
    let (page, page_size) = params
        .validate()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let (links, total) = state
        .link_service
        .list_links(&owner.id, page, page_size)
        .await?;

    let items = links
        .iter()
        .map(|link| LinkResponse::from_link(link, state.link_service.short_url(link)))
        .collect();

    Ok(Json(LinkListResponse {
        page,
        page_size,
        total,
        items,
    }))
}

/// Returns one of the caller's links with its click summary.
///
/// # Endpoint
///
/// `GET /links/{code}?domain=go.example.com`
///
/// # Errors
///
/// Returns 404 Not Found if the link does not exist or belongs to someone else.
pub async fn get_link_handler(
    Path(code): Path<String>,
    Query(query): Query<DomainQuery>,
    State(state): State<AppState>,
    owner: Owner,
) -> Result<Json<LinkDetailsResponse>, AppError> {
    let key = LinkKey::new(state.link_service.scope_domain(query.domain.as_deref()), code);

    let (link, summary) = state.link_service.get_link(&owner.id, &key).await?;
    let short_url = state.link_service.short_url(&link);

    Ok(Json(LinkDetailsResponse {
        link: LinkResponse::from_link(&link, short_url),
        clicks: summary.into(),
    }))
}

/// Soft-deletes one of the caller's links.
///
/// # Endpoint
///
/// `DELETE /links/{code}?domain=go.example.com`
///
/// # Behavior
///
/// - The record is kept with `active = false`; redirects return 404 afterwards
/// - The code becomes free for new links
/// - Deleting an already inactive link succeeds again
///
/// # Errors
///
/// Returns 404 Not Found if the link does not exist or belongs to someone else.
pub async fn delete_link_handler(
    Path(code): Path<String>,
    Query(query): Query<DomainQuery>,
    State(state): State<AppState>,
    owner: Owner,
) -> Result<StatusCode, AppError> {
    let key = LinkKey::new(state.link_service.scope_domain(query.domain.as_deref()), code);

    state.link_service.deactivate_link(&owner.id, &key).await?;

    Ok(StatusCode::NO_CONTENT)
}
