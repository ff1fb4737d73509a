mod common;

use common::Sandbox;
use serde_json::json;
use wisdm_central::dispatch::*;
use wisdm_central::models::*;
use wisdm_central::views::Page;

const TODO: &str = "wdm-central-to-do";

fn project_form(name: &str) -> ProjectForm {
    ProjectForm {
        name: name.to_string(),
        ..Default::default()
    }
}

mod projects {
    use super::*;

    #[tokio::test]
    async fn create_adds_root_list_named_after_project() {
        let sandbox = Sandbox::start().await;
        let dispatcher = Dispatcher::new(sandbox.client_for(&sandbox.asha));

        let submitted = dispatcher
            .create_project(&ProjectForm {
                name: "Diwali".to_string(),
                description: "Festival prep".to_string(),
                members: vec![sandbox.asha.id, sandbox.ravi.id],
            })
            .await
            .expect("Failed to create project");

        let project = submitted.entity;
        let root = project.root_list().expect("root list");
        let root = dispatcher
            .client()
            .get_todo_category(root)
            .await
            .expect("root list exists");
        assert_eq!(root.name, "Diwali");
        assert!(root.is_root());
        assert_eq!(project.members(), &[sandbox.asha.id, sandbox.ravi.id]);
        assert_eq!(submitted.notice, Notice::success("New Project created successfully"));

        let Page::Ready(home) = submitted.view else {
            panic!("home did not refresh");
        };
        assert_eq!(home.projects.len(), 1);
        assert_eq!(home.projects[0].project.id, project.id);
        assert_eq!(home.projects[0].members.len(), 2);
    }

    #[tokio::test]
    async fn update_keeps_root_list() {
        let sandbox = Sandbox::start().await;
        let dispatcher = Dispatcher::new(sandbox.client_for(&sandbox.asha));
        let project = dispatcher
            .create_project(&project_form("Diwali"))
            .await
            .unwrap()
            .entity;

        let submitted = dispatcher
            .update_project(
                project.id,
                &ProjectForm {
                    name: "Diwali 2024".to_string(),
                    description: "Lights".to_string(),
                    members: vec![sandbox.ravi.id],
                },
            )
            .await
            .expect("Failed to update project");

        assert_eq!(submitted.entity.name(), "Diwali 2024");
        assert_eq!(submitted.entity.root_list(), project.root_list());
        let Page::Ready(view) = submitted.view else {
            panic!("project did not refresh");
        };
        assert_eq!(view.project.description(), "Lights");
        assert_eq!(view.members.len(), 1);
    }

    #[tokio::test]
    async fn blank_name_issues_no_request() {
        let sandbox = Sandbox::start().await;
        let dispatcher = Dispatcher::new(sandbox.client_for(&sandbox.asha));

        let err = dispatcher.create_project(&project_form("")).await.unwrap_err();

        assert!(matches!(err, DispatchError::Invalid { field: "project name" }));
        assert!(sandbox.db.list_posts("wdm-central-project", None).unwrap().is_empty());
        assert!(sandbox
            .db
            .list_terms("wisdm-central-todo-category", None)
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn anonymous_create_fails_without_notice() {
        let sandbox = Sandbox::start().await;
        let dispatcher = Dispatcher::new(sandbox.anonymous());

        let err = dispatcher
            .create_project(&project_form("Diwali"))
            .await
            .unwrap_err();
        assert!(err.notice().is_none());
    }
}

mod todos {
    use super::*;

    #[tokio::test]
    async fn toggle_round_trips_completion_flag() {
        let sandbox = Sandbox::start().await;
        let dispatcher = Dispatcher::new(sandbox.client_for(&sandbox.asha));
        let project = dispatcher
            .create_project(&project_form("Diwali"))
            .await
            .unwrap()
            .entity;
        let list = dispatcher
            .create_todo_list(
                project.id,
                &TodoListForm {
                    name: "Cleaning".to_string(),
                    description: String::new(),
                },
            )
            .await
            .unwrap()
            .entity;
        let todo = dispatcher
            .create_todo(
                project.id,
                list.id,
                &TodoForm {
                    title: "Sweep".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .entity;

        let stored = |db: &wisdm_central::db::Database| {
            db.get_post(TODO, todo.id).unwrap().unwrap().acf["task_complete"].clone()
        };
        assert_eq!(stored(&sandbox.db), json!([]));

        for (done, expected) in [(true, json!(["Done"])), (false, json!([])), (true, json!(["Done"]))] {
            let submitted = dispatcher.toggle_todo(todo.id, done).await.unwrap();
            assert_eq!(submitted.entity.is_done(), done);
            assert_eq!(stored(&sandbox.db), expected);

            let Page::Ready(view) = submitted.view else {
                panic!("list did not refresh");
            };
            assert_eq!(view.done().count(), usize::from(done));
        }

        let stored_todo = sandbox.db.get_post(TODO, todo.id).unwrap().unwrap();
        assert_eq!(stored_todo.title, "Sweep");
        assert_eq!(stored_todo.acf["project_id"], json!(project.id));
    }

    #[tokio::test]
    async fn list_needs_a_project_with_root() {
        let sandbox = Sandbox::start().await;
        let client = sandbox.client_for(&sandbox.asha);
        let dispatcher = Dispatcher::new(client.clone());
        let bare = client
            .create_project(&wisdm_central::models::CreateProjectInput {
                title: "Bare".to_string(),
                status: wisdm_central::models::PostStatus::Publish,
                content: String::new(),
                acf: Default::default(),
            })
            .await
            .unwrap();

        let err = dispatcher
            .create_todo_list(
                bare.id,
                &TodoListForm {
                    name: "Cleaning".to_string(),
                    description: String::new(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Invalid { field: "project" }));
    }

    #[tokio::test]
    async fn edit_updates_title_and_fields() {
        let sandbox = Sandbox::start().await;
        let dispatcher = Dispatcher::new(sandbox.client_for(&sandbox.asha));
        let project = dispatcher
            .create_project(&project_form("Diwali"))
            .await
            .unwrap()
            .entity;
        let list = dispatcher
            .create_todo_list(
                project.id,
                &TodoListForm {
                    name: "Cleaning".to_string(),
                    description: String::new(),
                },
            )
            .await
            .unwrap()
            .entity;
        let todo = dispatcher
            .create_todo(
                project.id,
                list.id,
                &TodoForm {
                    title: "Sweep".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .entity;

        let submitted = dispatcher
            .update_todo(
                todo.id,
                &TodoForm {
                    title: "Sweep the porch".to_string(),
                    notes: "and the steps".to_string(),
                    due_on: None,
                    assignee: Some(sandbox.ravi.id),
                    done: false,
                },
            )
            .await
            .unwrap();

        assert_eq!(submitted.notice.message, "Todo Updated Successfully");
        let Page::Ready(view) = submitted.view else {
            panic!("todo did not refresh");
        };
        assert_eq!(view.todo.title(), "Sweep the porch");
        assert_eq!(view.assignee.map(|m| m.id), Some(sandbox.ravi.id));
        assert!(!view.todo.is_done());
        assert_eq!(view.project.map(|p| p.id), Some(project.id));
    }

    #[tokio::test]
    async fn edit_form_sets_completion() {
        let sandbox = Sandbox::start().await;
        let dispatcher = Dispatcher::new(sandbox.client_for(&sandbox.asha));
        let project = dispatcher
            .create_project(&project_form("Diwali"))
            .await
            .unwrap()
            .entity;
        let list = dispatcher
            .create_todo_list(
                project.id,
                &TodoListForm {
                    name: "Cleaning".to_string(),
                    description: String::new(),
                },
            )
            .await
            .unwrap()
            .entity;
        let todo = dispatcher
            .create_todo(
                project.id,
                list.id,
                &TodoForm {
                    title: "Sweep".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .entity;

        let submitted = dispatcher
            .update_todo(
                todo.id,
                &TodoForm {
                    title: "Sweep".to_string(),
                    done: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(submitted.entity.is_done());
        let stored = sandbox.db.get_post(TODO, todo.id).unwrap().unwrap();
        assert_eq!(stored.acf["task_complete"], json!(["Done"]));
        assert_eq!(stored.acf["project_id"], json!(project.id));
    }

    #[tokio::test]
    async fn edit_publishes_a_draft_todo() {
        let sandbox = Sandbox::start().await;
        let client = sandbox.client_for(&sandbox.asha);
        let dispatcher = Dispatcher::new(client.clone());
        let project = dispatcher
            .create_project(&project_form("Diwali"))
            .await
            .unwrap()
            .entity;
        let list = dispatcher
            .create_todo_list(
                project.id,
                &TodoListForm {
                    name: "Cleaning".to_string(),
                    description: String::new(),
                },
            )
            .await
            .unwrap()
            .entity;
        let draft = client
            .create_todo(&CreateTodoInput {
                title: "Mop".to_string(),
                status: PostStatus::Draft,
                content: String::new(),
                acf: TodoFieldsInput {
                    project_id: Some(project.id),
                    ..Default::default()
                },
                list: list.id,
            })
            .await
            .unwrap();
        assert!(client.list_todos_in(list.id).await.unwrap().is_empty());

        dispatcher
            .update_todo(
                draft.id,
                &TodoForm {
                    title: "Mop".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let stored = sandbox.db.get_post(TODO, draft.id).unwrap().unwrap();
        assert_eq!(stored.status, "publish");
        let listed: Vec<u64> = client
            .list_todos_in(list.id)
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(listed, vec![draft.id]);
    }

    #[tokio::test]
    async fn blank_todo_title_is_blocked() {
        let sandbox = Sandbox::start().await;
        let dispatcher = Dispatcher::new(sandbox.client_for(&sandbox.asha));

        let err = dispatcher
            .update_todo(1, &TodoForm::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.notice().map(|n| n.message),
            Some("Please fill the todo title field".to_string())
        );
    }
}

mod messages {
    use super::*;

    #[tokio::test]
    async fn edit_publishes_a_draft_message() {
        let sandbox = Sandbox::start().await;
        let client = sandbox.client_for(&sandbox.asha);
        let dispatcher = Dispatcher::new(client.clone());
        let project = dispatcher
            .create_project(&project_form("Diwali"))
            .await
            .unwrap()
            .entity;
        let draft = client
            .create_message(&CreateMessageInput {
                title: "Standup".to_string(),
                status: PostStatus::Draft,
                content: String::new(),
                acf: MessageFieldsInput {
                    project: Some(project.id),
                },
                category: None,
            })
            .await
            .unwrap();

        let submitted = dispatcher
            .update_message(
                draft.id,
                &MessageForm {
                    title: "Standup".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(submitted.entity.status, "publish");
        let board = client.list_messages().await.unwrap();
        assert_eq!(board.iter().filter(|m| m.id == draft.id).count(), 1);
    }

    #[tokio::test]
    async fn edit_refreshes_message_page() {
        let sandbox = Sandbox::start().await;
        let dispatcher = Dispatcher::new(sandbox.client_for(&sandbox.asha));
        let project = dispatcher
            .create_project(&project_form("Diwali"))
            .await
            .unwrap()
            .entity;
        let message = dispatcher
            .create_message(
                project.id,
                &MessageForm {
                    title: "Standup".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .entity;

        let submitted = dispatcher
            .update_message(
                message.id,
                &MessageForm {
                    title: "Standup at 9".to_string(),
                    body: "In the hall".to_string(),
                    category: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(submitted.notice, Notice::success("Message Updated Successfully"));
        let Page::Ready(view) = submitted.view else {
            panic!("message did not refresh");
        };
        assert_eq!(view.message.title(), "Standup at 9");
        assert_eq!(view.message.content.rendered, "In the hall");
        assert_eq!(view.message.project(), Some(project.id));
    }
}
