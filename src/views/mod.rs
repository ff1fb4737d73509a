//! Cross-entity assembly of page view models.
//!
//! Each page is anchored to a root entity taken from the page context. The
//! assembler fetches the root, then each dependent collection in a fixed
//! order (every fetch is awaited before the next is issued), and joins the
//! flat results in memory by their foreign-key fields.
//!
//! # Page states
//!
//! - [`Page::Ready`]: every fetch resolved.
//! - [`Page::Redirect`]: the root entity is absent (no id in the page
//!   context, or the host answered 404). The page moves to the default
//!   project listing; this is never reported as an error.
//! - [`Page::Loading`]: a fetch failed. The failure is logged and the page
//!   stays loading. There is no retry, timeout or user-facing error.

pub mod board;
pub mod home;
pub mod join;
pub mod list;
pub mod lists;
pub mod message;
pub mod project;
mod route;
pub mod todo;

pub use board::BoardView;
pub use home::{HomeView, ProjectCard};
pub use list::{TodoListView, TodoRow};
pub use lists::{ListSummary, ListsView};
pub use message::MessageView;
pub use project::ProjectView;
pub use route::*;
pub use todo::TodoView;

use std::future::Future;

use serde::Serialize;

use crate::client::{CentralClient, ClientError};
use crate::registry::{registry, ResourceType};

/// Where a page goes when its root entity cannot be resolved.
pub fn default_listing() -> String {
    registry().archive_link(ResourceType::Project)
}

/// Outcome of one assembler run.
#[derive(Debug, Clone)]
pub enum Resolved<T> {
    View(T),
    /// The root entity does not exist.
    Missing,
}

/// State of a mounted page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "view", rename_all = "snake_case")]
pub enum Page<T> {
    Loading,
    Ready(T),
    Redirect(String),
}

impl<T> Page<T> {
    /// Run an assembler and settle the page state.
    pub async fn mount<F>(assemble: F) -> Self
    where
        F: Future<Output = Result<Resolved<T>, ClientError>>,
    {
        match assemble.await {
            Ok(Resolved::View(view)) => Page::Ready(view),
            Ok(Resolved::Missing) => {
                let to = default_listing();
                tracing::info!(%to, "root entity not found, redirecting");
                Page::Redirect(to)
            }
            Err(e) => {
                tracing::warn!("View stalled while loading: {}", e);
                Page::Loading
            }
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Page::Ready(view) => Some(view),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Page::Loading)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Page<U> {
        match self {
            Page::Loading => Page::Loading,
            Page::Ready(view) => Page::Ready(f(view)),
            Page::Redirect(to) => Page::Redirect(to),
        }
    }
}

/// Any assembled page.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum Screen {
    Home(HomeView),
    Project(ProjectView),
    Lists(ListsView),
    List(TodoListView),
    Todo(TodoView),
    Board(BoardView),
    Message(MessageView),
}

/// Mount the page a route points at.
pub async fn open(client: &CentralClient, route: &Route) -> Page<Screen> {
    match *route {
        Route::Home => Page::mount(home::assemble(client)).await.map(Screen::Home),
        Route::Project(id) => Page::mount(project::assemble(client, id))
            .await
            .map(Screen::Project),
        Route::Lists(id) => Page::mount(lists::assemble(client, id))
            .await
            .map(Screen::Lists),
        Route::List(id) => Page::mount(list::assemble(client, id))
            .await
            .map(Screen::List),
        Route::Todo(id) => Page::mount(todo::assemble(client, id))
            .await
            .map(Screen::Todo),
        Route::Board(id) => Page::mount(board::assemble(client, id))
            .await
            .map(Screen::Board),
        Route::Message(id) => Page::mount(message::assemble(client, id))
            .await
            .map(Screen::Message),
    }
}

/// A project reference shown on todo and message pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRef {
    pub id: u64,
    pub title: String,
    pub link: String,
}

impl From<&crate::models::Project> for ProjectRef {
    fn from(project: &crate::models::Project) -> Self {
        Self {
            id: project.id,
            title: project.name().to_string(),
            link: project.link.clone(),
        }
    }
}
