use serde::Serialize;

use super::{join, Resolved};
use crate::client::{CentralClient, ClientError, Found};
use crate::models::*;

/// One todo list with its todos.
#[derive(Debug, Clone, Serialize)]
pub struct TodoListView {
    pub list: Category,
    /// The project whose root list is this list's parent, if any.
    pub project: Option<Project>,
    pub todos: Vec<TodoRow>,
    /// The user directory, offered as assignees.
    pub people: Vec<Member>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TodoRow {
    pub todo: Todo,
    pub assignee: Option<Member>,
}

impl TodoListView {
    pub fn open(&self) -> impl Iterator<Item = &TodoRow> {
        self.todos.iter().filter(|row| !row.todo.is_done())
    }

    pub fn done(&self) -> impl Iterator<Item = &TodoRow> {
        self.todos.iter().filter(|row| row.todo.is_done())
    }
}

/// Fetch order: the list, all projects (to find the owner), the list's todos,
/// user directory.
pub async fn assemble(
    client: &CentralClient,
    list_id: TermId,
) -> Result<Resolved<TodoListView>, ClientError> {
    let Some(list) = client.get_todo_category(list_id).await.found()? else {
        return Ok(Resolved::Missing);
    };
    let projects = client.list_projects().await?;
    let project = join::owner_of(&list, &projects).cloned();
    let todos = client.list_todos_in(list.id).await?;
    let users = client.list_users().await?;

    let todos = todos
        .into_iter()
        .map(|todo| TodoRow {
            assignee: join::member(todo.assignee(), &users, AvatarSize::Small),
            todo,
        })
        .collect();
    let people = users
        .iter()
        .map(|user| Member::from_user(user, AvatarSize::Small))
        .collect();

    Ok(Resolved::View(TodoListView {
        list,
        project,
        todos,
        people,
    }))
}
