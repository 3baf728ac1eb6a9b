use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form,
};
use serde::Deserialize;

use crate::auth::guard::ensure_owner;
use crate::auth::middleware::Session;
use crate::comments::store;
use crate::error::AppError;
use crate::posts::store as posts;
use crate::state::AppState;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct NewCommentForm {
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct EditCommentForm {
    #[serde(default)]
    pub content: String,
}

/// POST /feed/comment/{id} — append a comment to a post.
pub async fn add_comment(
    State(state): State<AppState>,
    session: Session,
    Path(post_id): Path<String>,
    Form(form): Form<NewCommentForm>,
) -> Result<Redirect, AppError> {
    let user_id = session.user_id().to_string();

    state
        .store
        .call(move |conn| {
            posts::find_post(conn, &post_id)?.ok_or(AppError::NotFound("Post not found"))?;
            store::insert_comment(conn, &post_id, &user_id, &form.comment)?;
            Ok::<_, AppError>(())
        })
        .await?;

    Ok(Redirect::to("/feed"))
}

/// GET /comment/edit/{id} — edit form, only for the comment's author.
pub async fn edit_comment_form(
    State(state): State<AppState>,
    session: Session,
    Path(comment_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let comment = state
        .store
        .call(move |conn| Ok::<_, AppError>(store::find_comment(conn, &comment_id)?))
        .await?
        .ok_or(AppError::NotFound("Comment not found."))?;

    ensure_owner(session.user_id(), &comment.user_id, "Unauthorized")?;
    Ok(Html(views::edit_comment_page(&comment)))
}

/// POST /comment/edit/{id} — replace the content of one's own comment.
pub async fn edit_comment(
    State(state): State<AppState>,
    session: Session,
    Path(comment_id): Path<String>,
    Form(form): Form<EditCommentForm>,
) -> Result<Redirect, AppError> {
    let user_id = session.user_id().to_string();

    state
        .store
        .call(move |conn| {
            let comment = store::find_comment(conn, &comment_id)?
                .ok_or(AppError::NotFound("Comment not found."))?;
            ensure_owner(&user_id, &comment.user_id, "Unauthorized")?;
            store::update_comment(conn, &comment.id, &form.content)?;
            Ok::<_, AppError>(())
        })
        .await?;

    Ok(Redirect::to("/feed"))
}

/// POST /comment/delete/{id}
/// Removing a comment that does not exist is a silent no-op; removing
/// someone else's comment is forbidden.
pub async fn delete_comment(
    State(state): State<AppState>,
    session: Session,
    Path(comment_id): Path<String>,
) -> Result<Redirect, AppError> {
    let user_id = session.user_id().to_string();

    state
        .store
        .call(move |conn| {
            let Some(comment) = store::find_comment(conn, &comment_id)? else {
                tracing::debug!("Comment {} already gone", comment_id);
                return Ok(());
            };
            ensure_owner(&user_id, &comment.user_id, "Unauthorized")?;
            store::delete_comment(conn, &comment.id)?;
            Ok::<_, AppError>(())
        })
        .await?;

    Ok(Redirect::to("/feed"))
}
