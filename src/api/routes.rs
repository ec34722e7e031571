//! Link management route configuration.
//!
//! Callers are identified by [`crate::api::middleware::auth`]; handlers that
//! need an owner reject anonymous requests themselves.

use crate::api::handlers::{
    create_link_handler, delete_link_handler, get_link_handler, list_links_handler,
};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Link management routes.
///
/// # Endpoints
///
/// - `POST   /links`          - Create a short link (token optional)
/// - `GET    /links`          - List the caller's links (paginated)
/// - `GET    /links/{code}`   - One of the caller's links with click summary
/// - `DELETE /links/{code}`   - Soft-delete one of the caller's links
pub fn link_routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links_handler).post(create_link_handler))
        .route(
            "/links/{code}",
            get(get_link_handler).delete(delete_link_handler),
        )
}
