//! Sandbox host: a local stand-in for the content site's REST API.
//!
//! Serves the registered post types, taxonomies and the user directory
//! under `/wp-json/wp/v2` with the same shapes and status codes the real
//! host uses, backed by [`Database`].

mod handlers;
pub mod middleware;

use axum::{
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;

pub use middleware::CurrentUser;

/// Path the REST root is mounted at.
pub const REST_ROOT: &str = "/wp-json";

pub fn create_router(db: Database) -> Router {
    let api = Router::new()
        // Directory
        .route("/users", get(handlers::list_users))
        .route("/users/", get(handlers::list_users))
        .route("/users/me", get(handlers::current_user))
        .route("/users/{id}", get(handlers::get_user))
        // Post types and taxonomies, by REST base
        .route(
            "/{resource}",
            get(handlers::list_entries).post(handlers::create_entry),
        )
        .route(
            "/{resource}/",
            get(handlers::list_entries).post(handlers::create_entry),
        )
        .route(
            "/{resource}/{id}",
            get(handlers::get_entry).post(handlers::update_entry),
        );

    Router::new()
        .nest("/wp-json/wp/v2", api)
        .route("/health", get(handlers::health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(from_fn_with_state(db.clone(), middleware::auth_middleware)),
        )
        .with_state(db)
}
