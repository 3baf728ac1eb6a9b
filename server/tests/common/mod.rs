//! Shared helpers: start the server on a random port and act as browser users.

#![allow(dead_code)]

use std::path::PathBuf;

use reqwest::header::{COOKIE, LOCATION, SET_COOKIE};
use reqwest::{Client, Response, StatusCode};
use tokio::net::TcpListener;

use mini_server::db::Store;
use mini_server::state::AppState;

pub const TEST_SECRET: &[u8] = b"test-session-secret-0123456789ab";

pub struct TestServer {
    pub base_url: String,
    pub store: Store,
    pub uploads_dir: PathBuf,
}

/// Start the server on a random port with a fresh temp data directory.
pub async fn start_test_server() -> TestServer {
    start_test_server_with(false).await
}

pub async fn start_test_server_with(require_owner_for_post_edit: bool) -> TestServer {
    let tmp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = Store::open(tmp_dir.path()).expect("Failed to init DB");
    let uploads_dir = tmp_dir.path().join("uploads");

    let state = AppState {
        store: store.clone(),
        session_secret: TEST_SECRET.to_vec(),
        session_ttl_secs: 3600,
        uploads_dir: uploads_dir.clone(),
        require_owner_for_post_edit,
    };

    let app = mini_server::routes::build_router(state, 10 * 1024 * 1024);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
        // Keep tmp_dir alive so the data directory isn't deleted
        let _keep = tmp_dir;
    });

    TestServer {
        base_url: format!("http://{}", addr),
        store,
        uploads_dir,
    }
}

/// HTTP client that does not follow redirects, so tests can see them.
pub fn client() -> Client {
    Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// A registered user: the raw session token and the user id it carries.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub token: String,
    pub user_id: String,
}

impl TestUser {
    pub fn cookie(&self) -> String {
        format!("token={}", self.token)
    }
}

/// Pull the session token out of a response's Set-Cookie header.
pub fn session_token(resp: &Response) -> Option<String> {
    resp.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter_map(|v| v.strip_prefix("token="))
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn location(resp: &Response) -> String {
    resp.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub async fn register_raw(server: &TestServer, email: &str, username: &str, password: &str) -> Response {
    client()
        .post(format!("{}/register", server.base_url))
        .form(&[
            ("name", username),
            ("email", email),
            ("username", username),
            ("password", password),
            ("age", "30"),
        ])
        .send()
        .await
        .unwrap()
}

/// Register a user and return its session.
pub async fn register(server: &TestServer, email: &str, username: &str) -> TestUser {
    let resp = register_raw(server, email, username, "password123").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER, "Registration failed for {}", email);
    assert_eq!(location(&resp), "/profile");

    let token = session_token(&resp).expect("Registration should set a session cookie");
    let claims = mini_server::auth::jwt::validate_session_token(TEST_SECRET, &token).unwrap();
    TestUser {
        token,
        user_id: claims.sub,
    }
}

pub async fn login_raw(server: &TestServer, email: &str, password: &str) -> Response {
    client()
        .post(format!("{}/login", server.base_url))
        .form(&[("email", email), ("password", password)])
        .send()
        .await
        .unwrap()
}

pub async fn get(server: &TestServer, user: Option<&TestUser>, path: &str) -> Response {
    let mut req = client().get(format!("{}{}", server.base_url, path));
    if let Some(user) = user {
        req = req.header(COOKIE, user.cookie());
    }
    req.send().await.unwrap()
}

pub async fn post_form(
    server: &TestServer,
    user: Option<&TestUser>,
    path: &str,
    form: &[(&str, &str)],
) -> Response {
    let mut req = client()
        .post(format!("{}{}", server.base_url, path))
        .form(form);
    if let Some(user) = user {
        req = req.header(COOKIE, user.cookie());
    }
    req.send().await.unwrap()
}

/// Create a text-only post and return the redirect response.
pub async fn create_post(server: &TestServer, user: &TestUser, content: &str) -> Response {
    let form = reqwest::multipart::Form::new().text("content", content.to_string());
    client()
        .post(format!("{}/post", server.base_url))
        .header(COOKIE, user.cookie())
        .multipart(form)
        .send()
        .await
        .unwrap()
}

/// GET /all-posts as JSON.
pub async fn all_posts(server: &TestServer) -> Vec<serde_json::Value> {
    let resp = get(server, None, "/all-posts").await;
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.unwrap()
}
