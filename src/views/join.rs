//! Equality joins over fetched collections.
//!
//! Collections are small, so every join is a linear scan-and-filter.

use crate::models::*;

/// Resolve member ids against the user directory, keeping member order.
/// Ids missing from the directory are skipped.
pub fn members(ids: &[UserId], users: &[User], size: AvatarSize) -> Vec<Member> {
    ids.iter()
        .filter_map(|id| users.iter().find(|u| u.id == *id))
        .map(|user| Member::from_user(user, size))
        .collect()
}

/// Look up one user in the directory.
pub fn member(id: Option<UserId>, users: &[User], size: AvatarSize) -> Option<Member> {
    let id = id?;
    users
        .iter()
        .find(|u| u.id == id)
        .map(|user| Member::from_user(user, size))
}

/// Projects the user is a member of.
pub fn projects_for_member(projects: Vec<Project>, user: UserId) -> Vec<Project> {
    projects.into_iter().filter(|p| p.is_member(user)).collect()
}

/// Todo lists of a project: the todo-categories whose parent is its root list.
/// A project without a root list has no lists.
pub fn lists_of(project: &Project, categories: Vec<Category>) -> Vec<Category> {
    match project.root_list() {
        Some(root) => categories
            .into_iter()
            .filter(|c| c.is_child_of(root))
            .collect(),
        None => Vec::new(),
    }
}

/// The project owning a todo list: the first whose root list is the list's parent.
pub fn owner_of<'a>(list: &Category, projects: &'a [Project]) -> Option<&'a Project> {
    let parent = list.parent?;
    projects.iter().find(|p| p.root_list() == Some(parent))
}

/// Messages posted to a project's board.
pub fn messages_of(project: PostId, messages: Vec<Message>) -> Vec<Message> {
    messages
        .into_iter()
        .filter(|m| m.project() == Some(project))
        .collect()
}

/// Todos of one project filed under one list, split into (open, done) counts.
pub fn progress(project: PostId, list: TermId, todos: &[Todo]) -> (usize, usize) {
    todos
        .iter()
        .filter(|t| t.project() == Some(project) && t.is_in_list(list))
        .fold((0, 0), |(open, done), t| {
            if t.is_done() {
                (open, done + 1)
            } else {
                (open + 1, done)
            }
        })
}
