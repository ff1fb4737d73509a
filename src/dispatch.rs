//! Form submission: validate, send one create or update, then re-assemble
//! the page the change shows up on.
//!
//! Nothing is updated optimistically. The refreshed page comes from the host,
//! the same way a first mount does. A blank required field blocks the
//! submission before any request is issued. A failed request returns the
//! error; no rollback is attempted for earlier steps of a multi-step flow.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::client::{CentralClient, ClientError};
use crate::models::*;
use crate::views::{self, Page, Resolved};

const SUCCESS: &str = "Success !!";

/// Errors raised while submitting a form.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Please fill the {field} field")]
    Invalid { field: &'static str },

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl DispatchError {
    /// The inline notification for a blocked submission, if this is one.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Self::Invalid { .. } => Some(Notice::error(self.to_string())),
            Self::Client(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// A short notification shown after a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: Option<String>,
    pub message: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            title: Some(SUCCESS.to_string()),
            message: message.into(),
            kind: NoticeKind::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            title: None,
            message: message.into(),
            kind: NoticeKind::Error,
        }
    }
}

/// A successful submission: what the host returned, and the refreshed page.
#[derive(Debug, Clone, Serialize)]
pub struct Submitted<E, V> {
    pub entity: E,
    pub notice: Notice,
    pub view: Page<V>,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectForm {
    pub name: String,
    pub description: String,
    pub members: Vec<UserId>,
}

#[derive(Debug, Clone, Default)]
pub struct TodoListForm {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct TodoForm {
    pub title: String,
    pub notes: String,
    pub due_on: Option<NaiveDate>,
    pub assignee: Option<UserId>,
    pub done: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MessageForm {
    pub title: String,
    pub body: String,
    pub category: Option<TermId>,
}

fn require(field: &'static str, value: &str) -> Result<(), DispatchError> {
    if value.trim().is_empty() {
        tracing::debug!(field, "blocked submission with blank field");
        return Err(DispatchError::Invalid { field });
    }
    Ok(())
}

async fn missing<V>() -> Result<Resolved<V>, ClientError> {
    Ok(Resolved::Missing)
}

/// Sends form submissions to the host.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: CentralClient,
}

impl Dispatcher {
    pub fn new(client: CentralClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &CentralClient {
        &self.client
    }

    /// Create a project and its root todo list, then refresh the home page.
    pub async fn create_project(
        &self,
        form: &ProjectForm,
    ) -> Result<Submitted<Project, views::HomeView>, DispatchError> {
        require("project name", &form.name)?;

        let root = self
            .client
            .create_todo_category(&CreateCategoryInput {
                name: form.name.clone(),
                description: None,
                parent: None,
            })
            .await?;

        let project = self
            .client
            .create_project(&CreateProjectInput {
                title: form.name.clone(),
                status: PostStatus::Publish,
                content: form.description.clone(),
                acf: ProjectFieldsInput {
                    members: Some(form.members.clone()),
                    project_parent_category: Some(root.id),
                },
            })
            .await?;
        tracing::info!(project = project.id, root = root.id, "created project");

        Ok(Submitted {
            entity: project,
            notice: Notice::success("New Project created successfully"),
            view: Page::mount(views::home::assemble(&self.client)).await,
        })
    }

    pub async fn update_project(
        &self,
        id: PostId,
        form: &ProjectForm,
    ) -> Result<Submitted<Project, views::ProjectView>, DispatchError> {
        require("project name", &form.name)?;

        let project = self
            .client
            .update_project(
                id,
                &UpdateProjectInput {
                    title: Some(form.name.clone()),
                    content: Some(form.description.clone()),
                    acf: Some(ProjectFieldsInput {
                        members: Some(form.members.clone()),
                        project_parent_category: None,
                    }),
                },
            )
            .await?;

        Ok(Submitted {
            notice: Notice::success("Project updated successfully"),
            view: Page::mount(views::project::assemble(&self.client, project.id)).await,
            entity: project,
        })
    }

    /// Create a todo list under the project's root list.
    pub async fn create_todo_list(
        &self,
        project: PostId,
        form: &TodoListForm,
    ) -> Result<Submitted<Category, views::ListsView>, DispatchError> {
        require("todo list title", &form.name)?;

        let owner = self.client.get_project(project).await?;
        let Some(root) = owner.root_list() else {
            return Err(DispatchError::Invalid { field: "project" });
        };

        let list = self
            .client
            .create_todo_category(&CreateCategoryInput {
                name: form.name.clone(),
                description: Some(form.description.clone()),
                parent: Some(root),
            })
            .await?;
        tracing::info!(list = list.id, project, "created todo list");

        Ok(Submitted {
            entity: list,
            notice: Notice::success("New Todo List created successfully"),
            view: Page::mount(views::lists::assemble(&self.client, Some(project))).await,
        })
    }

    pub async fn create_todo(
        &self,
        project: PostId,
        list: TermId,
        form: &TodoForm,
    ) -> Result<Submitted<Todo, views::TodoListView>, DispatchError> {
        require("todo title", &form.title)?;

        let todo = self
            .client
            .create_todo(&CreateTodoInput {
                title: form.title.clone(),
                status: PostStatus::Publish,
                content: form.notes.clone(),
                acf: TodoFieldsInput {
                    project_id: Some(project),
                    done: Some(form.done),
                    due_on: form.due_on,
                    assigned_to: form.assignee,
                },
                list,
            })
            .await?;

        Ok(Submitted {
            entity: todo,
            notice: Notice::success("New Todo created successfully"),
            view: Page::mount(views::list::assemble(&self.client, list)).await,
        })
    }

    /// Set a todo's completion flag. Only `acf.task_complete` is sent.
    pub async fn toggle_todo(
        &self,
        id: PostId,
        done: bool,
    ) -> Result<Submitted<Todo, views::TodoListView>, DispatchError> {
        let todo = self
            .client
            .update_todo(
                id,
                &UpdateTodoInput {
                    acf: Some(TodoFieldsInput::completion(done)),
                    ..Default::default()
                },
            )
            .await?;

        let view = match todo.list() {
            Some(list) => Page::mount(views::list::assemble(&self.client, list)).await,
            None => Page::mount(missing()).await,
        };

        Ok(Submitted {
            entity: todo,
            notice: Notice::success("Todo updated successfully"),
            view,
        })
    }

    pub async fn update_todo(
        &self,
        id: PostId,
        form: &TodoForm,
    ) -> Result<Submitted<Todo, views::TodoView>, DispatchError> {
        require("todo title", &form.title)?;

        let todo = self
            .client
            .update_todo(
                id,
                &UpdateTodoInput {
                    title: Some(form.title.clone()),
                    status: Some(PostStatus::Publish),
                    content: Some(form.notes.clone()),
                    acf: Some(TodoFieldsInput {
                        done: Some(form.done),
                        due_on: form.due_on,
                        assigned_to: form.assignee,
                        ..Default::default()
                    }),
                },
            )
            .await?;

        Ok(Submitted {
            notice: Notice::success("Todo Updated Successfully"),
            view: Page::mount(views::todo::assemble(&self.client, todo.id)).await,
            entity: todo,
        })
    }

    pub async fn create_message(
        &self,
        project: PostId,
        form: &MessageForm,
    ) -> Result<Submitted<Message, views::BoardView>, DispatchError> {
        require("message title", &form.title)?;

        let message = self
            .client
            .create_message(&CreateMessageInput {
                title: form.title.clone(),
                status: PostStatus::Publish,
                content: form.body.clone(),
                acf: MessageFieldsInput {
                    project: Some(project),
                },
                category: form.category,
            })
            .await?;

        Ok(Submitted {
            entity: message,
            notice: Notice::success("New Message created successfully"),
            view: Page::mount(views::board::assemble(&self.client, Some(project))).await,
        })
    }

    pub async fn update_message(
        &self,
        id: PostId,
        form: &MessageForm,
    ) -> Result<Submitted<Message, views::MessageView>, DispatchError> {
        require("message title", &form.title)?;

        let message = self
            .client
            .update_message(
                id,
                &UpdateMessageInput {
                    title: Some(form.title.clone()),
                    status: Some(PostStatus::Publish),
                    content: Some(form.body.clone()),
                },
            )
            .await?;

        Ok(Submitted {
            notice: Notice::success("Message Updated Successfully"),
            view: Page::mount(views::message::assemble(&self.client, message.id)).await,
            entity: message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline() -> Dispatcher {
        // Nothing listens here; validation must fail before any request.
        Dispatcher::new(CentralClient::new("http://127.0.0.1:9/wp-json", None))
    }

    #[tokio::test]
    async fn blank_project_name_is_blocked() {
        let err = offline()
            .create_project(&ProjectForm {
                name: "   ".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Invalid { field: "project name" }));
        let notice = err.notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "Please fill the project name field");
    }

    #[tokio::test]
    async fn blank_todo_title_is_blocked() {
        let err = offline()
            .create_todo(7, 15, &TodoForm::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Invalid { field: "todo title" }));
    }

    #[tokio::test]
    async fn blank_message_title_is_blocked_on_edit() {
        let err = offline()
            .update_message(9, &MessageForm::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Invalid { field: "message title" }));
    }

    #[tokio::test]
    async fn transport_failure_has_no_notice() {
        let err = offline().toggle_todo(40, true).await.unwrap_err();
        assert!(matches!(err, DispatchError::Client(ClientError::Http(_))));
        assert!(err.notice().is_none());
    }

    #[test]
    fn success_notice_carries_title() {
        let notice = Notice::success("Todo updated successfully");
        assert_eq!(notice.title.as_deref(), Some("Success !!"));
        assert_eq!(notice.kind, NoticeKind::Success);
    }
}
