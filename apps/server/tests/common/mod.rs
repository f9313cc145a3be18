#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use cybersentinel_server::{api::app_router, build_state, config::Config, AppState};
use rand::{rngs::OsRng, RngCore};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    _dir: TempDir,
}

pub fn test_config(dir: &TempDir) -> Config {
    let mut secret = vec![0u8; 32];
    OsRng.fill_bytes(&mut secret);
    Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        db_path: dir.path().join("test.db").to_string_lossy().into_owned(),
        cors_allow: vec!["*".to_string()],
        request_timeout: Duration::from_secs(30),
        jwt_secret: secret,
        access_token_ttl: Duration::from_secs(30 * 60),
        refresh_token_ttl: Duration::from_secs(7 * 24 * 60 * 60),
        scheduler_interval: Duration::from_secs(60),
        scheduler_enabled: false,
        asm_queue: "asm_triggers".to_string(),
        vs_queue: "vs_scans".to_string(),
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let state = build_state(&config).await.unwrap();
        let router = app_router(state.clone(), &config);
        Self {
            router,
            state,
            _dir: dir,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn signup(&self, email: &str, role: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/auth/signup",
                None,
                Some(json!({
                    "company_name": "Acme",
                    "full_name": "Test User",
                    "email": email,
                    "password": "correct-horse",
                    "role": role,
                    "country": "US"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);
        body["user_id"].as_str().unwrap().to_string()
    }

    pub async fn login(&self, email: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({ "email": email, "password": "correct-horse" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body
    }

    /// Signs up a user and returns an access token for it.
    pub async fn access_token(&self, email: &str, role: &str) -> String {
        self.signup(email, role).await;
        self.login(email).await["access_token"]
            .as_str()
            .unwrap()
            .to_string()
    }
}
