use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::accounts::routes as accounts;
use crate::auth::middleware::SessionKey;
use crate::comments::routes as comments;
use crate::posts::routes as posts;
use crate::state::AppState;
use crate::uploads::UPLOADS_URL_PREFIX;

/// Inject the session key into request extensions so the Session extractor can find it.
async fn inject_session_key(
    axum::extract::State(state): axum::extract::State<AppState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: middleware::Next,
) -> axum::response::Response {
    req.extensions_mut()
        .insert(SessionKey(state.session_secret.clone()));
    next.run(req).await
}

/// Build the full axum Router with all routes and middleware.
/// `max_body_bytes` bounds every request body, photo uploads included.
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    // Public pages and account actions
    let account_routes = Router::new()
        .route("/", get(accounts::index))
        .route("/login", get(accounts::login_form).post(accounts::login))
        .route("/register", post(accounts::register))
        .route("/logout", get(accounts::logout))
        .route("/profile", get(accounts::profile));

    // Posts (Session extractor redirects to /login without a valid cookie)
    let post_routes = Router::new()
        .route("/feed", get(posts::feed))
        .route("/post", post(posts::create_post))
        .route("/like/{id}", post(posts::like_post))
        .route("/edit/{id}", get(posts::edit_post_form))
        .route("/update/{id}", post(posts::update_post))
        .route("/delete/{id}", post(posts::delete_post))
        .route("/feed/delete/{id}", post(posts::delete_post_from_feed))
        .route("/all-posts", get(posts::all_posts));

    let comment_routes = Router::new()
        .route("/feed/comment/{id}", post(comments::add_comment))
        .route(
            "/comment/edit/{id}",
            get(comments::edit_comment_form).post(comments::edit_comment),
        )
        .route("/comment/delete/{id}", post(comments::delete_comment));

    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(account_routes)
        .merge(post_routes)
        .merge(comment_routes)
        .merge(health)
        .nest_service(UPLOADS_URL_PREFIX, ServeDir::new(&state.uploads_dir))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            inject_session_key,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Basic health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
