#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use tutorhub::config::AppConfig;
use tutorhub::database::MemoryStore;
use tutorhub::services::accounts;
use tutorhub::{app, AppState};

pub const PASSWORD: &str = "correct-horse";

/// The full router over a fresh in-memory store. Requests go through
/// `oneshot`, so no port or database is needed.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Value,
    pub text: String,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let mut config = AppConfig::development();
        config.api.enable_request_logging = false;

        let state = AppState::new(store.clone(), config);
        Self {
            router: app(state),
            store,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        Ok(TestResponse {
            status,
            location,
            body,
            text,
        })
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Result<TestResponse> {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn register_student(&self, username: &str) -> Result<TestResponse> {
        self.post(
            "/register",
            None,
            json!({ "username": username, "password": PASSWORD, "role": "student" }),
        )
        .await
    }

    /// Registers a tutor account and returns its tutor id.
    pub async fn register_tutor(&self, username: &str, name: &str, subject: &str) -> Result<i64> {
        let res = self
            .post(
                "/register",
                None,
                json!({
                    "username": username,
                    "password": PASSWORD,
                    "role": "tutor",
                    "name": name,
                    "subject": subject,
                    "contact_email": format!("{}@example.com", username),
                }),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "tutor signup failed: {}", res.text);
        res.data()["tutor"]["id"].as_i64().context("tutor id")
    }

    pub async fn login(&self, username: &str) -> Result<String> {
        let res = self
            .post("/login", None, json!({ "username": username, "password": PASSWORD }))
            .await?;
        anyhow::ensure!(res.status == StatusCode::OK, "login failed: {}", res.text);
        res.data()["token"]
            .as_str()
            .map(str::to_string)
            .context("token in login response")
    }

    pub async fn admin_token(&self) -> Result<String> {
        accounts::ensure_admin(self.store.as_ref(), "root", PASSWORD).await?;
        self.login("root").await
    }

    /// Admin-created tutor; returns its id.
    pub async fn create_tutor(&self, admin: &str, name: &str, subject: &str) -> Result<i64> {
        let res = self
            .post(
                "/adminaccess",
                Some(admin),
                json!({
                    "name": name,
                    "subject": subject,
                    "contact_email": format!("{}@example.com", name.to_lowercase()),
                }),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "tutor creation failed: {}", res.text);
        res.data()["tutor"]["id"].as_i64().context("tutor id")
    }

    /// Student request for `tutor_id`; returns the request id.
    pub async fn request_tutor(&self, student: &str, tutor_id: i64) -> Result<i64> {
        let res = self
            .post(
                &format!("/request/{}", tutor_id),
                Some(student),
                json!({
                    "message": "Could you help with algebra?",
                    "contact_email": "student@example.com",
                    "preferred_date": "2024-05-01T16:00:00Z",
                }),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "request failed: {}", res.text);
        res.data()["request"]["id"].as_i64().context("request id")
    }
}
