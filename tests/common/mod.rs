#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use storefront::api::AppState;
use storefront::config::Config;
use storefront::models::NewUser;
use storefront::services::email::{MailError, Mailer, OutgoingEmail};

/// Captures outgoing mail so tests can read tokens out of the links.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

impl RecordingMailer {
    pub fn sent_to(&self, to: &str) -> Vec<OutgoingEmail> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.to == to)
            .cloned()
            .collect()
    }

    /// Waits for the background send, then extracts the token following
    /// `marker` in the most recent matching message.
    pub async fn wait_for_token(&self, to: &str, marker: &str) -> String {
        for _ in 0..500 {
            let found = self
                .sent_to(to)
                .into_iter()
                .rev()
                .find_map(|email| extract_token(&email.html, marker));
            if let Some(token) = found {
                return token;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("no email to {to} containing {marker}");
    }
}

fn extract_token(html: &str, marker: &str) -> Option<String> {
    let start = html.find(marker)? + marker.len();
    let token: String = html[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    (!token.is_empty()).then_some(token)
}

pub const VERIFY_MARKER: &str = "/auth/verify/";
pub const RESET_MARKER: &str = "/auth/reset-password/";

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub mailer: Arc<RecordingMailer>,
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.auth.secret_key = "integration-test-secret".to_string();
    config.auth.app_url = "http://testserver".to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

pub async fn spawn_app() -> TestApp {
    let mailer = Arc::new(RecordingMailer::default());
    let state =
        storefront::api::create_app_state_with_mailer(test_config(), mailer.clone(), None)
            .await
            .expect("Failed to create app state");
    let router = storefront::api::router(state.clone());

    TestApp {
        router,
        state,
        mailer,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub async fn call(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        json: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let body = match json {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.call(builder.body(body).unwrap()).await
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/auth/register",
            None,
            Some(serde_json::json!({
                "username": username,
                "email": email,
                "password": password,
            })),
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        let form = format!("username={username}&password={password}&grant_type=password");
        let request = Request::builder()
            .method(Method::POST)
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .unwrap();
        self.call(request).await
    }

    /// Registers, follows the emailed verification link and logs in.
    pub async fn verified_user(&self, username: &str, email: &str, password: &str) -> String {
        let response = self.register(username, email, password).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

        let token = self.mailer.wait_for_token(email, VERIFY_MARKER).await;
        let verified = self.get(&format!("/auth/verify/{token}"), None).await;
        assert_eq!(verified.status, StatusCode::OK);

        self.access_token(username, password).await
    }

    pub async fn admin(&self, username: &str, email: &str, password: &str) -> String {
        self.state
            .auth_service()
            .create_admin(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .await
            .unwrap();

        self.access_token(username, password).await
    }

    pub async fn access_token(&self, username: &str, password: &str) -> String {
        let response = self.login(username, password).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["access_token"].as_str().unwrap().to_string()
    }
}
