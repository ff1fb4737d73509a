//! Request authentication for the sandbox host.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::db::{Database, UserRecord};

/// The directory user a request is authenticated as, if any.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<UserRecord>);

/// Resolves `Authorization: Bearer <token>` to a directory user.
///
/// Requests without the header pass through anonymously. A header naming no
/// known user is rejected outright, the way the host rejects bad
/// application passwords.
pub async fn auth_middleware(
    State(db): State<Database>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);

    let user = match header {
        None => None,
        Some(value) => {
            let Some(token) = value.strip_prefix("Bearer ") else {
                tracing::warn!("Unsupported Authorization scheme");
                return unauthorized("Only bearer tokens are accepted by the sandbox.");
            };
            match db.user_by_token(token.trim()) {
                Ok(Some(user)) => Some(user),
                Ok(None) => {
                    tracing::warn!("Unknown bearer token");
                    return unauthorized("The provided token is invalid.");
                }
                Err(e) => {
                    tracing::error!("Token lookup failed: {}", e);
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            }
        }
    };

    request.extensions_mut().insert(CurrentUser(user));
    next.run(request).await
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "code": "invalid_token",
            "message": message,
            "data": {"status": 401}
        })),
    )
        .into_response()
}
