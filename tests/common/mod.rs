#![allow(dead_code)]

use wisdm_central::api::{create_router, REST_ROOT};
use wisdm_central::client::{Auth, CentralClient};
use wisdm_central::db::{Database, UserRecord};

/// A sandbox host on a loopback port, with two directory users.
pub struct Sandbox {
    pub db: Database,
    pub url: String,
    pub asha: UserRecord,
    pub ravi: UserRecord,
}

impl Sandbox {
    pub async fn start() -> Self {
        let db = Database::open_memory().expect("Failed to create database");
        db.migrate().expect("Failed to migrate");
        let asha = db.create_user("Asha").expect("Failed to create user");
        let ravi = db.create_user("Ravi").expect("Failed to create user");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("No local address");
        let app = create_router(db.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server failed");
        });

        Self {
            db,
            url: format!("http://{}{}", addr, REST_ROOT),
            asha,
            ravi,
        }
    }

    /// A client signed in as `user`.
    pub fn client_for(&self, user: &UserRecord) -> CentralClient {
        CentralClient::new(&self.url, Some(Auth::Token(user.token.clone())))
    }

    pub fn anonymous(&self) -> CentralClient {
        CentralClient::new(&self.url, None)
    }
}
