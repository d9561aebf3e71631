#![allow(dead_code)]

mod mailer;

pub use mailer::RecordingMailer;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt; // for `oneshot`

use iwo_api::{
    app::build_app,
    auth::{
        repo::{InMemoryUserRepo, UserRepo},
        repo_types::Verification,
    },
    config::AppConfig,
    news::repo::InMemoryNewsRepo,
    state::AppState,
};

pub struct TestApp {
    pub router: Router,
    pub users: Arc<InMemoryUserRepo>,
    pub news: Arc<InMemoryNewsRepo>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_mailer(RecordingMailer::new())
    }

    pub fn with_mailer(mailer: RecordingMailer) -> Self {
        let users = Arc::new(InMemoryUserRepo::new());
        let news = Arc::new(InMemoryNewsRepo::new());
        let mailer = Arc::new(mailer);
        let state = AppState::from_parts(
            Arc::new(AppConfig::fake()),
            users.clone(),
            news.clone(),
            mailer.clone(),
        );
        let router = build_app(state).expect("router builds");
        Self {
            router,
            users,
            news,
            mailer,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(json) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();

        let res = self.router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    /// Signs up, redeems the mailed code and logs in. Returns (user id, access token).
    pub async fn verified_login(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> (String, String) {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/signup",
                Some(serde_json::json!({"email": email, "password": password, "name": name})),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::ACCEPTED, "{body}");

        let code = self.mailer.last_to(email).await.expect("mail sent").code;
        let (status, _) = self
            .send(Method::GET, &format!("/api/auth/verify/{code}"), None, None)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/login",
                Some(serde_json::json!({"email": email, "password": password})),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        (
            body["user"]["id"].as_str().unwrap().to_string(),
            body["accessToken"].as_str().unwrap().to_string(),
        )
    }

    pub async fn is_verified(&self, email: &str) -> Option<bool> {
        self.users
            .find_by_email(email)
            .await
            .unwrap()
            .map(|u| u.verification == Verification::Verified)
    }
}
