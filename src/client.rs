//! HTTP client for the host's REST API.
//!
//! All reads and writes go through the host's generic contract under the
//! `wp/v2` namespace:
//!
//! - `GET  /<rest-base>/` with an optional `parent` or taxonomy filter
//! - `GET  /<rest-base>/<id>`
//! - `POST /<rest-base>/` to create, `POST /<rest-base>/<id>` to update
//!
//! Collections are assumed to arrive whole in one response. Failures are
//! returned as [`ClientError`]; nothing is retried.

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::config::Config;
use crate::models::*;
use crate::registry::ResourceType;

/// Default URL of a local sandbox host.
pub const DEFAULT_URL: &str = "http://localhost:17020/wp-json";

/// REST namespace of the host's content API.
const NAMESPACE: &str = "wp/v2";

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: credentials missing or rejected")]
    Unauthorized,

    #[error("Server error: {0}")]
    Server(String),

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Turns a 404 into `None`, keeping every other error.
pub trait Found<T> {
    fn found(self) -> Result<Option<T>, ClientError>;
}

impl<T> Found<T> for Result<T, ClientError> {
    fn found(self) -> Result<Option<T>, ClientError> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Credentials presented to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// Username and application password (HTTP Basic).
    AppPassword { user: String, password: String },
    /// Bearer token, as issued by token plugins and the sandbox host.
    Token(String),
}

/// A collection filter understood by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Taxonomy terms whose parent is the given term.
    Parent(TermId),
    /// Posts carrying the given term of `taxonomy`.
    Term { taxonomy: ResourceType, id: TermId },
}

impl Filter {
    fn query_pair(&self) -> (&'static str, String) {
        match self {
            Self::Parent(id) => ("parent", id.to_string()),
            Self::Term { taxonomy, id } => (taxonomy.rest_base(), id.to_string()),
        }
    }
}

/// HTTP client for the host's REST API.
#[derive(Debug, Clone)]
pub struct CentralClient {
    base_url: String,
    auth: Option<Auth>,
    client: Client,
}

impl CentralClient {
    /// Create with explicit configuration. `base_url` is the REST root,
    /// e.g. `https://example.com/wp-json`.
    pub fn new(base_url: impl Into<String>, auth: Option<Auth>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            client: Client::new(),
        }
    }

    /// Create from loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.base_url(), config.auth())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request with optional auth header.
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}/{}", self.base_url, NAMESPACE, path);
        let req = self.client.request(method, &url);
        match &self.auth {
            Some(Auth::AppPassword { user, password }) => req.basic_auth(user, Some(password)),
            Some(Auth::Token(token)) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Handle response, converting HTTP errors to ClientError.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = response.text().await.unwrap_or_default();
            match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
                StatusCode::BAD_REQUEST => Err(ClientError::BadRequest(body)),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::Unauthorized),
                _ => Err(ClientError::Server(format!("{}: {}", status, body))),
            }
        }
    }

    // ============================================================
    // Generic Operations
    // ============================================================

    /// Fetch one entity by id.
    pub async fn fetch_one<T: DeserializeOwned>(
        &self,
        resource: ResourceType,
        id: u64,
    ) -> Result<T, ClientError> {
        tracing::debug!(%resource, id, "fetch");
        let response = self
            .request(Method::GET, &format!("{}/{}", resource.rest_base(), id))
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Fetch a whole collection, optionally filtered.
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        resource: ResourceType,
        filter: Option<Filter>,
    ) -> Result<Vec<T>, ClientError> {
        tracing::debug!(%resource, ?filter, "fetch collection");
        let mut req = self.request(Method::GET, &format!("{}/", resource.rest_base()));
        if let Some(filter) = filter {
            req = req.query(&[filter.query_pair()]);
        }
        let response = req.send().await?;
        self.handle_response(response).await
    }

    /// Create an entity.
    pub async fn create<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        resource: ResourceType,
        body: &B,
    ) -> Result<T, ClientError> {
        tracing::debug!(%resource, "create");
        let response = self
            .request(Method::POST, &format!("{}/", resource.rest_base()))
            .json(body)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Update an entity with a partial body.
    pub async fn update<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        resource: ResourceType,
        id: u64,
        body: &B,
    ) -> Result<T, ClientError> {
        tracing::debug!(%resource, id, "update");
        let response = self
            .request(Method::POST, &format!("{}/{}", resource.rest_base(), id))
            .json(body)
            .send()
            .await?;
        self.handle_response(response).await
    }

    // ============================================================
    // Project Operations
    // ============================================================

    pub async fn get_project(&self, id: PostId) -> Result<Project, ClientError> {
        self.fetch_one(ResourceType::Project, id).await
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
        self.fetch_all(ResourceType::Project, None).await
    }

    pub async fn create_project(&self, input: &CreateProjectInput) -> Result<Project, ClientError> {
        self.create(ResourceType::Project, input).await
    }

    pub async fn update_project(
        &self,
        id: PostId,
        input: &UpdateProjectInput,
    ) -> Result<Project, ClientError> {
        self.update(ResourceType::Project, id, input).await
    }

    // ============================================================
    // Todo-Category Operations
    // ============================================================

    pub async fn get_todo_category(&self, id: TermId) -> Result<Category, ClientError> {
        self.fetch_one(ResourceType::TodoCategory, id).await
    }

    /// Todo-categories directly under `parent`: a project's todo lists when
    /// `parent` is its root list.
    pub async fn list_todo_categories(&self, parent: TermId) -> Result<Vec<Category>, ClientError> {
        self.fetch_all(ResourceType::TodoCategory, Some(Filter::Parent(parent)))
            .await
    }

    pub async fn create_todo_category(
        &self,
        input: &CreateCategoryInput,
    ) -> Result<Category, ClientError> {
        self.create(ResourceType::TodoCategory, input).await
    }

    // ============================================================
    // Todo Operations
    // ============================================================

    pub async fn get_todo(&self, id: PostId) -> Result<Todo, ClientError> {
        self.fetch_one(ResourceType::Todo, id).await
    }

    pub async fn list_todos(&self) -> Result<Vec<Todo>, ClientError> {
        self.fetch_all(ResourceType::Todo, None).await
    }

    /// Todos filed under one todo list.
    pub async fn list_todos_in(&self, list: TermId) -> Result<Vec<Todo>, ClientError> {
        let filter = Filter::Term {
            taxonomy: ResourceType::TodoCategory,
            id: list,
        };
        self.fetch_all(ResourceType::Todo, Some(filter)).await
    }

    pub async fn create_todo(&self, input: &CreateTodoInput) -> Result<Todo, ClientError> {
        self.create(ResourceType::Todo, input).await
    }

    pub async fn update_todo(&self, id: PostId, input: &UpdateTodoInput) -> Result<Todo, ClientError> {
        self.update(ResourceType::Todo, id, input).await
    }

    // ============================================================
    // Message Operations
    // ============================================================

    pub async fn get_message(&self, id: PostId) -> Result<Message, ClientError> {
        self.fetch_one(ResourceType::Message, id).await
    }

    pub async fn list_messages(&self) -> Result<Vec<Message>, ClientError> {
        self.fetch_all(ResourceType::Message, None).await
    }

    pub async fn create_message(&self, input: &CreateMessageInput) -> Result<Message, ClientError> {
        self.create(ResourceType::Message, input).await
    }

    pub async fn update_message(
        &self,
        id: PostId,
        input: &UpdateMessageInput,
    ) -> Result<Message, ClientError> {
        self.update(ResourceType::Message, id, input).await
    }

    pub async fn list_message_categories(&self) -> Result<Vec<Category>, ClientError> {
        self.fetch_all(ResourceType::MessageCategory, None).await
    }

    // ============================================================
    // User Directory
    // ============================================================

    pub async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        self.fetch_all(ResourceType::User, None).await
    }

    /// The user the credentials belong to.
    pub async fn current_user(&self) -> Result<User, ClientError> {
        let response = self.request(Method::GET, "users/me").send().await?;
        self.handle_response(response).await
    }
}
