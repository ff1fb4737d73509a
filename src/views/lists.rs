use serde::Serialize;

use super::{join, Resolved};
use crate::client::{CentralClient, ClientError, Found};
use crate::models::*;

/// All todo lists of a project.
#[derive(Debug, Clone, Serialize)]
pub struct ListsView {
    pub project: Project,
    pub lists: Vec<ListSummary>,
    /// Members, offered as assignees when adding todos.
    pub members: Vec<Member>,
}

/// One todo list with the project's open and done todo counts in it.
#[derive(Debug, Clone, Serialize)]
pub struct ListSummary {
    pub list: Category,
    pub open: usize,
    pub done: usize,
}

/// Fetch order: project, its todo lists, todos, user directory.
///
/// A missing project id (no `?project=` in the page URL) or an unknown
/// project resolves to [`Resolved::Missing`].
pub async fn assemble(
    client: &CentralClient,
    project_id: Option<PostId>,
) -> Result<Resolved<ListsView>, ClientError> {
    let Some(project_id) = project_id else {
        return Ok(Resolved::Missing);
    };
    let Some(project) = client.get_project(project_id).await.found()? else {
        return Ok(Resolved::Missing);
    };

    let categories = match project.root_list() {
        Some(root) => client.list_todo_categories(root).await?,
        None => Vec::new(),
    };
    let lists = join::lists_of(&project, categories);
    let todos = client.list_todos().await?;
    let users = client.list_users().await?;

    let lists = lists
        .into_iter()
        .map(|list| {
            let (open, done) = join::progress(project.id, list.id, &todos);
            ListSummary { list, open, done }
        })
        .collect();

    Ok(Resolved::View(ListsView {
        members: join::members(project.members(), &users, AvatarSize::Small),
        lists,
        project,
    }))
}
