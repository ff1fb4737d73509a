use std::collections::{BTreeMap, HashMap};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::CurrentUser;
use crate::db::{Database, NewPost, NewTerm, PostPatch, PostRecord, TermRecord, UserRecord};
use crate::models::fields;
use crate::models::{AvatarSize, PostStatus};
use crate::registry::{registry, ContentSchema};

type ApiError = (StatusCode, Json<Value>);
type ApiResult<T> = Result<T, ApiError>;

// ============================================================
// Error Handling
// ============================================================

/// A REST error body: `{"code", "message", "data": {"status"}}`.
fn rest_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(json!({
            "code": code,
            "message": message.into(),
            "data": {"status": status.as_u16()}
        })),
    )
}

/// Log a store error and return a sanitized response to the client.
fn internal_error(e: impl std::fmt::Display) -> ApiError {
    tracing::error!("Internal error: {}", e);
    rest_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "Internal server error",
    )
}

fn no_route() -> ApiError {
    rest_error(
        StatusCode::NOT_FOUND,
        "rest_no_route",
        "No route was found matching the URL and request method.",
    )
}

fn require_user(user: Option<UserRecord>, action: &str) -> ApiResult<UserRecord> {
    user.ok_or_else(|| {
        rest_error(
            StatusCode::UNAUTHORIZED,
            &format!("rest_cannot_{action}"),
            format!("Sorry, you are not allowed to {action} this resource."),
        )
    })
}

fn schema_for(rest_base: &str) -> ApiResult<&'static ContentSchema> {
    registry()
        .by_rest_base(rest_base)
        .filter(|s| s.is_post_type() || s.is_taxonomy())
        .ok_or_else(no_route)
}

// ============================================================
// Presentation
// ============================================================

fn entity_link(schema: &ContentSchema, id: u64) -> String {
    match schema.rewrite_slug {
        Some(slug) => format!("/{}/{}/", slug, id),
        None => format!("/?p={}", id),
    }
}

fn post_json(schema: &ContentSchema, post: &PostRecord) -> Value {
    // The host sends an empty array, not an object, when no fields are set.
    let acf = if post.acf.is_empty() {
        json!([])
    } else {
        Value::Object(post.acf.clone())
    };
    let mut body = json!({
        "id": post.id,
        "date": post.created_at.to_rfc3339(),
        "modified": post.updated_at.to_rfc3339(),
        "type": post.post_type,
        "status": post.status,
        "link": entity_link(schema, post.id),
        "title": {"rendered": post.title},
        "content": {"rendered": post.content},
        "author": post.author.unwrap_or(0),
        "acf": acf,
    });
    if let Some(taxonomy) = registry().taxonomy_for(schema.resource) {
        let terms = post.terms.get(taxonomy.rest_base).cloned().unwrap_or_default();
        body[taxonomy.rest_base] = json!(terms);
    }
    body
}

fn term_json(schema: &ContentSchema, term: &TermRecord) -> Value {
    json!({
        "id": term.id,
        "count": term.count,
        "description": term.description,
        "link": entity_link(schema, term.id),
        "name": term.name,
        "slug": term.slug,
        "taxonomy": term.taxonomy,
        "parent": term.parent,
    })
}

fn user_json(user: &UserRecord) -> Value {
    let avatar_urls: Map<String, Value> = AvatarSize::ALL
        .iter()
        .map(|size| {
            let px = size.pixels();
            (
                px.to_string(),
                Value::String(format!(
                    "https://secure.gravatar.com/avatar/?s={}&d=mm&r=g",
                    px
                )),
            )
        })
        .collect();
    json!({
        "id": user.id,
        "name": user.name,
        "slug": user.slug,
        "link": format!("/author/{}/", user.slug),
        "avatar_urls": avatar_urls,
    })
}

// ============================================================
// Request bodies
// ============================================================

/// `title` and `content` may be plain strings or `{"raw": ...}` objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextField {
    Plain(String),
    Raw { raw: String },
}

impl TextField {
    fn into_string(self) -> String {
        match self {
            Self::Plain(s) | Self::Raw { raw: s } => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PostBody {
    title: Option<TextField>,
    content: Option<TextField>,
    status: Option<String>,
    acf: Option<Value>,
    /// Taxonomy term assignments, keyed by taxonomy REST base.
    #[serde(flatten)]
    rest: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct TermBody {
    name: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default, deserialize_with = "fields::opt_id")]
    parent: Option<u64>,
}

const STATUSES: &[&str] = &["publish", "draft", "pending", "private"];

fn check_status(status: Option<String>) -> ApiResult<Option<String>> {
    match status {
        Some(s) if !STATUSES.contains(&s.as_str()) => Err(rest_error(
            StatusCode::BAD_REQUEST,
            "rest_invalid_param",
            format!("Invalid parameter(s): status ({} is not a valid status)", s),
        )),
        other => Ok(other),
    }
}

fn acf_changes(acf: Option<Value>) -> ApiResult<Option<Map<String, Value>>> {
    match acf {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(Value::Array(items)) if items.is_empty() => Ok(None),
        Some(_) => Err(rest_error(
            StatusCode::BAD_REQUEST,
            "rest_invalid_param",
            "Invalid parameter(s): acf",
        )),
    }
}

/// Term assignments in the body for the post type's taxonomy. Each id must
/// name an existing term.
fn term_changes(
    db: &Database,
    schema: &ContentSchema,
    rest: &BTreeMap<String, Value>,
) -> ApiResult<BTreeMap<String, Vec<u64>>> {
    let mut terms = BTreeMap::new();
    let Some(taxonomy) = registry().taxonomy_for(schema.resource) else {
        return Ok(terms);
    };
    let Some(value) = rest.get(taxonomy.rest_base) else {
        return Ok(terms);
    };

    let ids = fields::id_list(value.clone()).map_err(|e| {
        rest_error(StatusCode::BAD_REQUEST, "rest_invalid_param", e.to_string())
    })?;
    for id in &ids {
        if db
            .get_term(taxonomy.rest_base, *id)
            .map_err(internal_error)?
            .is_none()
        {
            return Err(rest_error(
                StatusCode::BAD_REQUEST,
                "rest_invalid_term_id",
                "Invalid term ID.",
            ));
        }
    }
    terms.insert(taxonomy.rest_base.to_string(), ids);
    Ok(terms)
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

// ============================================================
// Users
// ============================================================

pub async fn list_users(State(db): State<Database>) -> ApiResult<Json<Vec<Value>>> {
    let users = db.list_users().map_err(internal_error)?;
    Ok(Json(users.iter().map(user_json).collect()))
}

pub async fn get_user(
    State(db): State<Database>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Value>> {
    db.get_user(id)
        .map_err(internal_error)?
        .map(|user| Json(user_json(&user)))
        .ok_or_else(|| rest_error(StatusCode::NOT_FOUND, "rest_user_invalid_id", "Invalid user ID."))
}

pub async fn current_user(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<Value>> {
    user.map(|user| Json(user_json(&user))).ok_or_else(|| {
        rest_error(
            StatusCode::UNAUTHORIZED,
            "rest_not_logged_in",
            "You are not currently logged in.",
        )
    })
}

// ============================================================
// Posts and terms
// ============================================================

pub async fn list_entries(
    State(db): State<Database>,
    Path(resource): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<Value>>> {
    let schema = schema_for(&resource)?;

    if schema.is_taxonomy() {
        let parent = params.get("parent").and_then(|p| p.trim().parse().ok());
        let terms = db
            .list_terms(schema.rest_base, parent)
            .map_err(internal_error)?;
        return Ok(Json(terms.iter().map(|t| term_json(schema, t)).collect()));
    }

    // `?<taxonomy>=<id>`; for a comma-separated list the first id is used.
    let term = registry()
        .taxonomy_for(schema.resource)
        .and_then(|taxonomy| {
            let raw = params.get(taxonomy.rest_base)?;
            let id = raw.split(',').next()?.trim().parse::<u64>().ok()?;
            Some((taxonomy.rest_base, id))
        });
    let posts = db
        .list_posts(schema.rest_base, term)
        .map_err(internal_error)?;
    Ok(Json(posts.iter().map(|p| post_json(schema, p)).collect()))
}

pub async fn get_entry(
    State(db): State<Database>,
    Path((resource, id)): Path<(String, u64)>,
) -> ApiResult<Json<Value>> {
    let schema = schema_for(&resource)?;

    if schema.is_taxonomy() {
        return db
            .get_term(schema.rest_base, id)
            .map_err(internal_error)?
            .map(|t| Json(term_json(schema, &t)))
            .ok_or_else(|| rest_error(StatusCode::NOT_FOUND, "rest_term_invalid", "Term does not exist."));
    }

    db.get_post(schema.rest_base, id)
        .map_err(internal_error)?
        .map(|p| Json(post_json(schema, &p)))
        .ok_or_else(|| rest_error(StatusCode::NOT_FOUND, "rest_post_invalid_id", "Invalid post ID."))
}

pub async fn create_entry(
    State(db): State<Database>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(resource): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let schema = schema_for(&resource)?;
    let user = require_user(user, "create")?;

    if schema.is_taxonomy() {
        let body: TermBody = serde_json::from_value(body).map_err(|e| {
            rest_error(StatusCode::BAD_REQUEST, "rest_invalid_param", e.to_string())
        })?;
        let name = body.name.filter(|n| !n.trim().is_empty()).ok_or_else(|| {
            rest_error(
                StatusCode::BAD_REQUEST,
                "rest_missing_callback_param",
                "Missing parameter(s): name",
            )
        })?;
        let parent = body.parent.unwrap_or(0);
        if parent != 0
            && db
                .get_term(schema.rest_base, parent)
                .map_err(internal_error)?
                .is_none()
        {
            return Err(rest_error(
                StatusCode::BAD_REQUEST,
                "rest_term_invalid",
                "Parent term does not exist.",
            ));
        }

        let term = db
            .create_term(
                schema.rest_base,
                NewTerm {
                    name,
                    description: body.description,
                    parent,
                },
            )
            .map_err(internal_error)?;
        tracing::info!(taxonomy = schema.rest_base, id = term.id, "created term");
        return Ok((StatusCode::CREATED, Json(term_json(schema, &term))));
    }

    let body: PostBody = serde_json::from_value(body)
        .map_err(|e| rest_error(StatusCode::BAD_REQUEST, "rest_invalid_param", e.to_string()))?;
    let status = check_status(body.status)?
        .unwrap_or_else(|| PostStatus::Draft.as_str().to_string());
    let terms = term_changes(&db, schema, &body.rest)?;

    let post = db
        .create_post(
            schema.rest_base,
            NewPost {
                title: body.title.map(TextField::into_string).unwrap_or_default(),
                content: body.content.map(TextField::into_string).unwrap_or_default(),
                status,
                acf: acf_changes(body.acf)?.unwrap_or_default(),
                author: Some(user.id),
                terms,
            },
        )
        .map_err(internal_error)?;
    tracing::info!(post_type = schema.rest_base, id = post.id, "created post");
    Ok((StatusCode::CREATED, Json(post_json(schema, &post))))
}

pub async fn update_entry(
    State(db): State<Database>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((resource, id)): Path<(String, u64)>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    let schema = schema_for(&resource)?;
    require_user(user, "edit")?;

    if schema.is_taxonomy() {
        // Terms are never edited through this host.
        return Err(no_route());
    }

    let body: PostBody = serde_json::from_value(body)
        .map_err(|e| rest_error(StatusCode::BAD_REQUEST, "rest_invalid_param", e.to_string()))?;
    let patch = PostPatch {
        title: body.title.map(TextField::into_string),
        content: body.content.map(TextField::into_string),
        status: check_status(body.status)?,
        acf: acf_changes(body.acf)?,
        terms: term_changes(&db, schema, &body.rest)?,
    };

    db.update_post(schema.rest_base, id, patch)
        .map_err(internal_error)?
        .map(|p| Json(post_json(schema, &p)))
        .ok_or_else(|| rest_error(StatusCode::NOT_FOUND, "rest_post_invalid_id", "Invalid post ID."))
}
