//! Common test utilities and fixtures
//!
//! Provides an in-process stand-in for the Horizon backend's auth routes and
//! helpers to point an `AuthService` at it with a throwaway cookie jar.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;

use horizon_core::auth::{AuthService, CookieJar, CredentialStore};
use horizon_core::ApiClient;

/// Password every seeded account starts with
pub const PASSWORD: &str = "secret123";

/// Current password that makes the stub fail with a 500
pub const EXPLODING_PASSWORD: &str = "explode";

#[derive(Clone)]
struct StubUser {
    id: i64,
    username: String,
    email: String,
    role: &'static str,
    password: String,
}

impl StubUser {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "username": self.username,
            "email": self.email,
            "role": self.role,
            "avatar": format!("https://boring-avatars-api.vercel.app/api/avatar?size=40&variant=beam&name={}", self.username),
            "created_at": "Tue, 14 Oct 2025 10:30:00 GMT",
        })
    }
}

#[derive(Default)]
struct StubState {
    users: Vec<StubUser>,
    /// token → user id
    tokens: HashMap<String, i64>,
    issued: u32,
    /// The real backend sends no token back from the admin reset
    admin_reset_issues_token: bool,
}

impl StubState {
    fn issue_token(&mut self, user_id: i64) -> String {
        self.issued += 1;
        let token = format!("tok{}", self.issued);
        self.tokens.insert(token.clone(), user_id);
        token
    }

    fn bearer_user(&self, headers: &HeaderMap) -> Option<StubUser> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let token = value.strip_prefix("Bearer ")?;
        let id = self.tokens.get(token)?;
        self.users.iter().find(|u| u.id == *id).cloned()
    }
}

type Shared = Arc<Mutex<StubState>>;
type Reply = (StatusCode, Json<Value>);

fn reject(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "message": message })))
}

fn field<'a>(body: &'a Value, name: &str) -> &'a str {
    body.get(name).and_then(Value::as_str).unwrap_or_default()
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let mut state = state.lock().unwrap();
    let user = state
        .users
        .iter()
        .find(|u| u.username == field(&body, "username") && u.password == field(&body, "password"))
        .cloned();

    match user {
        Some(user) => {
            let token = state.issue_token(user.id);
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Login successful",
                    "access_token": token,
                    "refresh_token": format!("refresh-{}", token),
                    "user": user.to_json(),
                })),
            )
        }
        None => reject(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let mut state = state.lock().unwrap();
    let username = field(&body, "username").to_string();

    if state.users.iter().any(|u| u.username == username) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "message": "Oops! Registration failed.",
                "errors": { "username": "Username already exists" },
            })),
        );
    }

    let user = StubUser {
        id: 100 + state.users.len() as i64,
        username,
        email: field(&body, "email").to_string(),
        role: "member",
        password: field(&body, "password").to_string(),
    };
    state.users.push(user.clone());
    let token = state.issue_token(user.id);

    (
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "access_token": token,
            "refresh_token": format!("refresh-{}", token),
            "user": user.to_json(),
        })),
    )
}

async fn update_password(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = state.lock().unwrap();
    let Some(user) = state.bearer_user(&headers) else {
        return reject(StatusCode::UNAUTHORIZED, "Missing or invalid token");
    };

    let current = field(&body, "current_password");
    if current == EXPLODING_PASSWORD {
        return reject(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update password");
    }
    if current != user.password {
        return reject(StatusCode::BAD_REQUEST, "Current password is incorrect");
    }

    let new_password = field(&body, "new_password").to_string();
    if let Some(stored) = state.users.iter_mut().find(|u| u.id == user.id) {
        stored.password = new_password;
    }
    let token = state.issue_token(user.id);

    (
        StatusCode::OK,
        Json(json!({
            "message": "Password updated successfully",
            "access_token": token,
            "refresh_token": format!("refresh-{}", token),
            "user": user.to_json(),
        })),
    )
}

async fn admin_update_password(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = state.lock().unwrap();
    let Some(caller) = state.bearer_user(&headers) else {
        return reject(StatusCode::UNAUTHORIZED, "Missing or invalid token");
    };
    if caller.role != "admin" {
        return reject(StatusCode::FORBIDDEN, "Admin access required");
    }

    let user_id = body.get("user_id").and_then(Value::as_i64).unwrap_or_default();
    let new_password = field(&body, "new_password").to_string();
    let Some(target) = state.users.iter_mut().find(|u| u.id == user_id) else {
        return reject(StatusCode::NOT_FOUND, "User not found");
    };
    target.password = new_password;
    let target = target.clone();

    let mut reply = json!({
        "message": "Password updated successfully",
        "user": target.to_json(),
    });
    if state.admin_reset_issues_token {
        reply["access_token"] = Value::String(state.issue_token(target.id));
    }
    (StatusCode::OK, Json(reply))
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let state = state.lock().unwrap();
    match state.bearer_user(&headers) {
        Some(user) => (StatusCode::OK, Json(user.to_json())),
        None => reject(StatusCode::UNAUTHORIZED, "Missing or invalid token"),
    }
}

/// Handle on a running stub backend
pub struct StubBackend {
    pub base_url: String,
    state: Shared,
}

impl StubBackend {
    /// Start a backend seeded with `alice` (id 1, member), `root` (id 2,
    /// admin) and `bob` (id 42, member), all using [`PASSWORD`].
    pub async fn start() -> Self {
        let seed = |id, username: &str, role| StubUser {
            id,
            username: username.to_string(),
            email: format!("{}@horizon.test", username),
            role,
            password: PASSWORD.to_string(),
        };
        let state: Shared = Arc::new(Mutex::new(StubState {
            users: vec![
                seed(1, "alice", "member"),
                seed(2, "root", "admin"),
                seed(42, "bob", "member"),
            ],
            ..Default::default()
        }));

        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/auth/update-password", post(update_password))
            .route("/api/admin/update-password", post(admin_update_password))
            .route("/api/auth/me", get(me))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub backend");
        let addr = listener.local_addr().expect("Stub backend has no address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Stub backend crashed");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn password_of(&self, username: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.password.clone())
    }

    pub fn set_email(&self, username: &str, email: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(user) = state.users.iter_mut().find(|u| u.username == username) {
            user.email = email.to_string();
        }
    }

    /// Make the admin endpoint issue a fresh token for the affected user
    pub fn issue_tokens_on_admin_reset(&self) {
        self.state.lock().unwrap().admin_reset_issues_token = true;
    }

    /// Add an account directly, bypassing registration checks
    pub fn add_user(&self, id: i64, username: &str, role: &'static str) {
        let mut state = self.state.lock().unwrap();
        state.users.push(StubUser {
            id,
            username: username.to_string(),
            email: format!("{}@horizon.test", username),
            role,
            password: PASSWORD.to_string(),
        });
    }

    /// Rename the account with `id` on the server side only
    pub fn rename_user(&self, id: i64, username: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(user) = state.users.iter_mut().find(|u| u.id == id) {
            user.username = username.to_string();
        }
    }
}

/// Creates a temporary directory for the cookie jar
pub fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Auth service talking to `base_url` with a jar inside `dir`
pub fn auth_service(base_url: &str, dir: &TempDir) -> AuthService {
    let api = ApiClient::new(base_url).expect("Failed to build API client");
    let jar = CookieJar::open(dir.path().join("cookies.json"));
    AuthService::new(api, CredentialStore::new(jar, false))
}

/// Base URL of a port nothing listens on
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind throwaway listener");
    let addr = listener.local_addr().expect("Throwaway listener has no address");
    drop(listener);
    format!("http://{}", addr)
}

/// Base URL of a server that answers every request with `200 OK` and then
/// hangs up halfway through the body
pub async fn truncated_body_base_url() -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind truncating server");
    let addr = listener.local_addr().expect("Truncating server has no address");
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 200\r\n\r\n{\"id\": 1,")
                .await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{}", addr)
}
