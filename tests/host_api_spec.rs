use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use wisdm_central::api::create_router;
use wisdm_central::db::Database;

const ROOT: &str = "/wp-json/wp/v2";

fn setup() -> TestServer {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    db.create_user("Asha").expect("Failed to create user");
    db.create_user("Ravi").expect("Failed to create user");
    let app = create_router(db);
    TestServer::new(app).expect("Failed to create test server")
}

async fn create_list(server: &TestServer, name: &str, parent: u64) -> Value {
    server
        .post(&format!("{ROOT}/wisdm-central-todo-category/"))
        .authorization_bearer("asha")
        .json(&json!({"name": name, "description": "", "parent": parent}))
        .await
        .json::<Value>()
}

mod auth {
    use super::*;

    #[tokio::test]
    async fn anonymous_reads_are_allowed() {
        let server = setup();
        server.get(&format!("{ROOT}/wdm-central-project/")).await.assert_status_ok();
    }

    #[tokio::test]
    async fn anonymous_writes_are_rejected() {
        let server = setup();
        let response = server
            .post(&format!("{ROOT}/wdm-central-project/"))
            .json(&json!({"title": "Diwali", "status": "publish"}))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["code"], "rest_cannot_create");
    }

    #[tokio::test]
    async fn unknown_token_is_rejected() {
        let server = setup();
        let response = server
            .get(&format!("{ROOT}/users/me"))
            .authorization_bearer("mallory")
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn me_resolves_the_token() {
        let server = setup();
        let me = server
            .get(&format!("{ROOT}/users/me"))
            .authorization_bearer("ravi")
            .await
            .json::<Value>();
        assert_eq!(me["name"], "Ravi");
        assert_eq!(me["slug"], "ravi");
        assert!(me["avatar_urls"]["24"].is_string());
        assert!(me["avatar_urls"]["96"].is_string());
    }

    #[tokio::test]
    async fn me_without_token_is_not_logged_in() {
        let server = setup();
        let response = server.get(&format!("{ROOT}/users/me")).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["code"], "rest_not_logged_in");
    }
}

mod posts {
    use super::*;

    #[tokio::test]
    async fn create_returns_created_entity() {
        let server = setup();
        let response = server
            .post(&format!("{ROOT}/wdm-central-project/"))
            .authorization_bearer("asha")
            .json(&json!({
                "title": "Diwali",
                "status": "publish",
                "content": "Festival prep",
                "acf": {"members": [1, 2], "project_parent_category": 4}
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let project = response.json::<Value>();
        assert_eq!(project["title"]["rendered"], "Diwali");
        assert_eq!(project["content"]["rendered"], "Festival prep");
        assert_eq!(project["acf"]["members"], json!([1, 2]));
        assert_eq!(project["type"], "wdm-central-project");
        let id = project["id"].as_u64().unwrap();
        assert_eq!(project["link"], format!("/projects/{}/", id));
    }

    #[tokio::test]
    async fn missing_post_is_404() {
        let server = setup();
        let response = server.get(&format!("{ROOT}/wdm-central-to-do/999")).await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["code"], "rest_post_invalid_id");
    }

    #[tokio::test]
    async fn unknown_rest_base_is_404() {
        let server = setup();
        let response = server.get(&format!("{ROOT}/pages/")).await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["code"], "rest_no_route");
    }

    #[tokio::test]
    async fn post_without_fields_has_empty_acf_array() {
        let server = setup();
        let message = server
            .post(&format!("{ROOT}/wdm-central-message/"))
            .authorization_bearer("asha")
            .json(&json!({"title": "Standup", "status": "publish"}))
            .await
            .json::<Value>();
        assert_eq!(message["acf"], json!([]));
        assert_eq!(message["wisdm-central-message-category"], json!([]));
    }

    #[tokio::test]
    async fn post_without_status_is_a_hidden_draft() {
        let server = setup();
        let project = server
            .post(&format!("{ROOT}/wdm-central-project/"))
            .authorization_bearer("asha")
            .json(&json!({"title": "Diwali"}))
            .await
            .json::<Value>();
        assert_eq!(project["status"], "draft");

        let listed = server
            .get(&format!("{ROOT}/wdm-central-project/"))
            .await
            .json::<Vec<Value>>();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn invalid_status_is_rejected() {
        let server = setup();
        let response = server
            .post(&format!("{ROOT}/wdm-central-project/"))
            .authorization_bearer("asha")
            .json(&json!({"title": "Diwali", "status": "archived"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_merges_acf() {
        let server = setup();
        let list = create_list(&server, "Cleaning", 0).await;
        let todo = server
            .post(&format!("{ROOT}/wdm-central-to-do/"))
            .authorization_bearer("asha")
            .json(&json!({
                "title": "Sweep",
                "status": "publish",
                "acf": {"project_id": 7, "task_complete": []},
                "wisdm-central-todo-category": list["id"]
            }))
            .await
            .json::<Value>();

        let updated = server
            .post(&format!("{ROOT}/wdm-central-to-do/{}", todo["id"]))
            .authorization_bearer("asha")
            .json(&json!({"acf": {"task_complete": ["Done"]}}))
            .await
            .json::<Value>();

        assert_eq!(updated["title"]["rendered"], "Sweep");
        assert_eq!(updated["acf"]["task_complete"], json!(["Done"]));
        assert_eq!(updated["acf"]["project_id"], json!(7));
        assert_eq!(updated["wisdm-central-todo-category"], json!([list["id"]]));
    }

    #[tokio::test]
    async fn unknown_term_is_rejected() {
        let server = setup();
        let response = server
            .post(&format!("{ROOT}/wdm-central-to-do/"))
            .authorization_bearer("asha")
            .json(&json!({"title": "Sweep", "status": "publish", "wisdm-central-todo-category": [42]}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["code"], "rest_invalid_term_id");
    }

    #[tokio::test]
    async fn collection_filters_by_term() {
        let server = setup();
        let cleaning = create_list(&server, "Cleaning", 0).await;
        let shopping = create_list(&server, "Shopping", 0).await;
        for (title, list) in [("Sweep", &cleaning), ("Sweets", &shopping)] {
            server
                .post(&format!("{ROOT}/wdm-central-to-do/"))
                .authorization_bearer("asha")
                .json(&json!({"title": title, "status": "publish", "wisdm-central-todo-category": [list["id"]]}))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let todos = server
            .get(&format!("{ROOT}/wdm-central-to-do/"))
            .add_query_param("wisdm-central-todo-category", &cleaning["id"])
            .await
            .json::<Vec<Value>>();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0]["title"]["rendered"], "Sweep");
    }
}

mod terms {
    use super::*;

    #[tokio::test]
    async fn children_by_parent() {
        let server = setup();
        let root = create_list(&server, "Diwali", 0).await;
        let root_id = root["id"].as_u64().unwrap();
        create_list(&server, "Cleaning", root_id).await;
        create_list(&server, "Shopping", root_id).await;
        create_list(&server, "Holi", 0).await;

        let children = server
            .get(&format!("{ROOT}/wisdm-central-todo-category/"))
            .add_query_param("parent", root_id)
            .await
            .json::<Vec<Value>>();

        let names: Vec<&str> = children.iter().map(|c| c["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Cleaning", "Shopping"]);
        assert!(children.iter().all(|c| c["parent"] == json!(root_id)));
    }

    #[tokio::test]
    async fn missing_parent_is_rejected() {
        let server = setup();
        let response = server
            .post(&format!("{ROOT}/wisdm-central-todo-category/"))
            .authorization_bearer("asha")
            .json(&json!({"name": "Orphan", "parent": 77}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["code"], "rest_term_invalid");
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let server = setup();
        let response = server
            .post(&format!("{ROOT}/wisdm-central-todo-category/"))
            .authorization_bearer("asha")
            .json(&json!({"name": " "}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn term_link_uses_rewrite_slug() {
        let server = setup();
        let list = create_list(&server, "Cleaning", 0).await;
        let id = list["id"].as_u64().unwrap();
        let fetched = server
            .get(&format!("{ROOT}/wisdm-central-todo-category/{}", id))
            .await
            .json::<Value>();
        assert_eq!(fetched["link"], format!("/todo-lists/{}/", id));
        assert_eq!(fetched["taxonomy"], "wisdm-central-todo-category");
    }
}

mod users {
    use super::*;

    #[tokio::test]
    async fn lists_directory() {
        let server = setup();
        let users = server.get(&format!("{ROOT}/users/")).await.json::<Vec<Value>>();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0]["name"], "Asha");
    }

    #[tokio::test]
    async fn unknown_user_is_404() {
        let server = setup();
        server
            .get(&format!("{ROOT}/users/99"))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
