#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{Body, Bytes},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use cohort_tools_api::app;
use cohort_tools_api::config::AppConfig;
use cohort_tools_api::database::{MemoryStore, Storage};
use cohort_tools_api::state::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";

/// In-process application over a fresh in-memory store
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::for_testing(TEST_SECRET))
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let (router, state) = build(config, store.clone());

        Self { router, state, store }
    }

    /// Application over an arbitrary storage backend; `store` stays empty
    pub fn with_storage(storage: Arc<dyn Storage>) -> Self {
        let (router, state) = build(AppConfig::for_testing(TEST_SECRET), storage);

        Self {
            router,
            state,
            store: Arc::new(MemoryStore::new()),
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
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

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> Result<TestResponse> {
        let (status, _, bytes) = self.send_raw(request).await?;

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .with_context(|| format!("response body is not JSON: {:?}", bytes))?
        };

        Ok(TestResponse { status, body })
    }

    /// Status, content type and undecoded body, for non-JSON answers
    pub async fn send_raw(
        &self,
        request: Request<Body>,
    ) -> Result<(StatusCode, Option<String>, Bytes)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;

        Ok((status, content_type, bytes))
    }

    pub async fn get(&self, uri: &str) -> Result<TestResponse> {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Result<TestResponse> {
        self.send(Method::POST, uri, Some(body), None).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> Result<TestResponse> {
        self.send(Method::PUT, uri, Some(body), None).await
    }

    pub async fn delete(&self, uri: &str) -> Result<TestResponse> {
        self.send(Method::DELETE, uri, None, None).await
    }

    /// Sign up and log in, returning the session token
    pub async fn login_as(&self, email: &str, password: &str, name: &str) -> Result<String> {
        let signup = self
            .post(
                "/auth/signup",
                json!({ "email": email, "password": password, "name": name }),
            )
            .await?;
        anyhow::ensure!(signup.status == StatusCode::CREATED, "signup failed: {:?}", signup.body);

        self.login_as_existing(email, password).await
    }

    pub async fn login_as_existing(&self, email: &str, password: &str) -> Result<String> {
        let login = self
            .post("/auth/login", json!({ "email": email, "password": password }))
            .await?;
        anyhow::ensure!(login.status == StatusCode::OK, "login failed: {:?}", login.body);

        login.body["authToken"]
            .as_str()
            .map(str::to_string)
            .context("login response has no authToken")
    }

    pub async fn create_cohort(&self, fields: Value) -> Result<Value> {
        let response = self.post("/api/cohorts", fields).await?;
        anyhow::ensure!(
            response.status == StatusCode::CREATED,
            "cohort create failed: {:?}",
            response.body
        );
        Ok(response.body)
    }

    pub async fn create_student(&self, fields: Value) -> Result<Value> {
        let response = self.post("/api/students", fields).await?;
        anyhow::ensure!(
            response.status == StatusCode::CREATED,
            "student create failed: {:?}",
            response.body
        );
        Ok(response.body)
    }
}

fn build(config: AppConfig, storage: Arc<dyn Storage>) -> (Router, AppState) {
    let state = AppState::new(config, storage).expect("test state builds");
    (app(state.clone()), state)
}

pub fn id_of(record: &Value) -> &str {
    record["_id"].as_str().expect("record has an _id")
}
