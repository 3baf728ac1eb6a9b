use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;

use crate::accounts::store::{self, NewUser};
use crate::auth::jwt;
use crate::auth::middleware::{Session, LOGIN_PATH, SESSION_COOKIE};
use crate::auth::password;
use crate::db::models::User;
use crate::error::AppError;
use crate::posts::store as posts;
use crate::state::AppState;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Free-form from the HTML number input; empty means not given
    #[serde(default)]
    pub age: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

fn parse_age(raw: &str) -> Result<Option<i64>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i64>()
        .map(Some)
        .map_err(|_| AppError::BadRequest("Age must be a number".to_string()))
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token)).path("/").build()
}

fn issue_cookie(state: &AppState, user: &User) -> Result<Cookie<'static>, AppError> {
    let token = jwt::issue_session_token(
        &state.session_secret,
        &user.id,
        &user.email,
        state.session_ttl_secs,
    )
    .map_err(|e| AppError::Internal(format!("JWT: {}", e)))?;
    Ok(session_cookie(token))
}

/// Check credentials: NotFound when no account has this email,
/// Unauthorized when the password does not match.
pub async fn authenticate(state: &AppState, email: &str, password: &str) -> Result<User, AppError> {
    let lookup = email.to_string();
    let user = state
        .store
        .call(move |conn| Ok::<_, AppError>(store::find_user_by_email(conn, &lookup)?))
        .await?
        .ok_or(AppError::NotFound("User not found"))?;

    let matches =
        password::verify_password_blocking(password.to_string(), user.password.clone()).await?;
    if !matches {
        return Err(AppError::Unauthorized("Invalid email or password"));
    }
    Ok(user)
}

/// GET / — registration page.
pub async fn index() -> Html<String> {
    Html(views::index_page())
}

/// GET /login
pub async fn login_form() -> Html<String> {
    Html(views::login_page(None))
}

/// POST /register
/// Create a user and start a session. Fails with 409 if the email is taken.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    let email = form.email.trim().to_string();
    if email.is_empty() || form.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }
    let age = parse_age(&form.age)?;

    // Fail fast before paying for a bcrypt hash
    let lookup = email.clone();
    let taken = state
        .store
        .call(move |conn| Ok::<_, AppError>(store::find_user_by_email(conn, &lookup)?.is_some()))
        .await?;
    if taken {
        return Err(AppError::Conflict("User already exists"));
    }

    let hash = password::hash_password_blocking(form.password).await?;

    let new_user = NewUser {
        name: form.name,
        email: email.clone(),
        username: form.username,
        password: hash,
        age,
    };
    // Re-check under the same lock as the insert so two concurrent
    // registrations cannot both pass.
    let user = state
        .store
        .call(move |conn| {
            if store::count_users_with_email(conn, &new_user.email)? > 0 {
                return Err(AppError::Conflict("User already exists"));
            }
            Ok(store::insert_user(conn, new_user)?)
        })
        .await?;

    tracing::info!("User registered: {} ({})", user.username, user.id);

    let cookie = issue_cookie(&state, &user)?;
    Ok((jar.add(cookie), Redirect::to("/profile")))
}

/// POST /login
/// 404 for an unknown email; 401 re-renders the login page without a cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let email = form.email.trim().to_string();

    match authenticate(&state, &email, &form.password).await {
        Ok(user) => {
            tracing::info!("User logged in: {}", user.id);
            let cookie = issue_cookie(&state, &user)?;
            Ok((jar.add(cookie), Redirect::to("/feed")).into_response())
        }
        Err(AppError::Unauthorized(msg)) => {
            tracing::info!("Failed login for {}", email);
            Ok((StatusCode::UNAUTHORIZED, Html(views::login_page(Some(msg)))).into_response())
        }
        Err(e) => Err(e),
    }
}

/// GET /logout — clear the session cookie.
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Redirect::to(LOGIN_PATH),
    )
}

/// GET /profile — the acting user and their posts, newest first.
pub async fn profile(
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let user_id = session.user_id().to_string();

    let (user, posts) = state
        .store
        .call(move |conn| {
            let user = store::find_user_by_id(conn, &user_id)?
                .ok_or(AppError::NotFound("User not found"))?;
            let owned = posts::posts_for_user(conn, &user.id)?;
            let posts = posts::resolve_posts(conn, owned)?;
            Ok::<_, AppError>((user, posts))
        })
        .await?;

    Ok(Html(views::profile_page(&user, &posts)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_age() {
        assert_eq!(parse_age("").unwrap(), None);
        assert_eq!(parse_age(" 42 ").unwrap(), Some(42));
        assert!(matches!(parse_age("old"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_session_cookie_is_site_wide() {
        let cookie = session_cookie("abc".to_string());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.path(), Some("/"));
    }
}
