//! Integration tests for registration, login, logout, and session handling.

mod common;

use common::*;
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::StatusCode;

#[tokio::test]
async fn test_health_check() {
    let server = start_test_server().await;

    let resp = get(&server, None, "/health").await;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_public_pages_render() {
    let server = start_test_server().await;

    let index = get(&server, None, "/").await;
    assert_eq!(index.status(), StatusCode::OK);
    assert!(index.text().await.unwrap().contains(r#"action="/register""#));

    let login = get(&server, None, "/login").await;
    assert_eq!(login.status(), StatusCode::OK);
    assert!(login.text().await.unwrap().contains(r#"action="/login""#));
}

#[tokio::test]
async fn test_register_then_login_grants_profile() {
    let server = start_test_server().await;
    let registered = register(&server, "a@x.com", "alice").await;

    // The registration session already works
    let resp = get(&server, Some(&registered), "/profile").await;
    assert_eq!(resp.status(), StatusCode::OK);

    // A fresh login with the same credentials yields a working session
    let resp = login_raw(&server, "a@x.com", "password123").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/feed");
    let token = session_token(&resp).expect("Login should set a session cookie");

    let user = TestUser {
        token,
        user_id: registered.user_id.clone(),
    };
    let resp = get(&server, Some(&user), "/profile").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("@alice"));
    assert!(body.contains("a@x.com"));
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let server = start_test_server().await;
    register(&server, "a@x.com", "alice").await;

    let resp = register_raw(&server, "a@x.com", "impostor", "other-password").await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert!(session_token(&resp).is_none());

    let count = server
        .store
        .call(|conn| {
            mini_server::accounts::store::count_users_with_email(conn, "a@x.com")
                .map_err(mini_server::error::AppError::from)
        })
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_register_requires_email_and_password() {
    let server = start_test_server().await;

    let resp = register_raw(&server, "", "nobody", "pw").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = register_raw(&server, "n@x.com", "nobody", "").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_with_missing_fields_is_bad_request() {
    let server = start_test_server().await;

    for form in [
        vec![("username", "x"), ("password", "pw")],
        vec![("username", "x"), ("email", "x@x.com")],
    ] {
        let resp = client()
            .post(format!("{}/register", server.base_url))
            .form(&form)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{:?}", form);
        assert!(session_token(&resp).is_none());
    }

    // Login without an email is an unknown account, not a malformed form
    let resp = client()
        .post(format!("{}/login", server.base_url))
        .form(&[("password", "pw")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized_without_cookie() {
    let server = start_test_server().await;
    register(&server, "a@x.com", "alice").await;

    let resp = login_raw(&server, "a@x.com", "not-the-password").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().get(SET_COOKIE).is_none());
    assert!(resp.text().await.unwrap().contains("Invalid email or password"));
}

#[tokio::test]
async fn test_login_unknown_email_not_found() {
    let server = start_test_server().await;

    let resp = login_raw(&server, "ghost@x.com", "whatever").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(session_token(&resp).is_none());
}

#[tokio::test]
async fn test_protected_routes_redirect_to_login() {
    let server = start_test_server().await;

    for path in ["/profile", "/feed", "/edit/some-id", "/comment/edit/some-id"] {
        let resp = get(&server, None, path).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "GET {}", path);
        assert_eq!(location(&resp), "/login", "GET {}", path);
    }

    for path in [
        "/like/some-id",
        "/feed/comment/some-id",
        "/comment/edit/some-id",
        "/comment/delete/some-id",
        "/update/some-id",
        "/delete/some-id",
        "/feed/delete/some-id",
    ] {
        let resp = post_form(&server, None, path, &[("content", "x")]).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "POST {}", path);
        assert_eq!(location(&resp), "/login", "POST {}", path);
    }

    let resp = client()
        .post(format!("{}/post", server.base_url))
        .multipart(reqwest::multipart::Form::new().text("content", "hi"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn test_invalid_tokens_redirect_to_login() {
    let server = start_test_server().await;
    let user = register(&server, "a@x.com", "alice").await;

    let forged = mini_server::auth::jwt::issue_session_token(
        b"some-other-secret-some-other-sec",
        &user.user_id,
        "a@x.com",
        3600,
    )
    .unwrap();
    let expired = mini_server::auth::jwt::issue_session_token(
        TEST_SECRET,
        &user.user_id,
        "a@x.com",
        -3600,
    )
    .unwrap();

    for cookie in [
        "token=garbage".to_string(),
        "token=".to_string(),
        format!("token={}", forged),
        format!("token={}", expired),
    ] {
        let resp = client()
            .get(format!("{}/profile", server.base_url))
            .header(COOKIE, &cookie)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "cookie {}", cookie);
        assert_eq!(location(&resp), "/login");
    }
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let server = start_test_server().await;
    let user = register(&server, "a@x.com", "alice").await;

    let resp = get(&server, Some(&user), "/logout").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");

    let set_cookie = resp
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("token=;"), "{}", set_cookie);
    assert!(set_cookie.contains("Max-Age=0"), "{}", set_cookie);
}
