use serde::Serialize;

use super::{join, ProjectRef, Resolved};
use crate::client::{CentralClient, ClientError, Found};
use crate::models::*;

/// A single todo with its project and list links.
#[derive(Debug, Clone, Serialize)]
pub struct TodoView {
    pub todo: Todo,
    pub project: Option<ProjectRef>,
    pub list_link: Option<String>,
    pub assignee: Option<Member>,
    pub people: Vec<Member>,
}

/// Fetch order: user directory, the todo, its project, its list.
///
/// A project or list that has since disappeared leaves the matching field
/// empty; only a missing todo redirects.
pub async fn assemble(
    client: &CentralClient,
    todo_id: PostId,
) -> Result<Resolved<TodoView>, ClientError> {
    let users = client.list_users().await?;
    let Some(todo) = client.get_todo(todo_id).await.found()? else {
        return Ok(Resolved::Missing);
    };

    let project = match todo.project() {
        Some(id) => client.get_project(id).await.found()?,
        None => None,
    };
    let list = match todo.list() {
        Some(id) => client.get_todo_category(id).await.found()?,
        None => None,
    };

    Ok(Resolved::View(TodoView {
        project: project.as_ref().map(ProjectRef::from),
        list_link: list.map(|l| l.link),
        assignee: join::member(todo.assignee(), &users, AvatarSize::Small),
        people: users
            .iter()
            .map(|user| Member::from_user(user, AvatarSize::Small))
            .collect(),
        todo,
    }))
}
