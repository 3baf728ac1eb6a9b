use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap},
    response::{Html, Redirect},
    Form, Json,
};
use serde::Deserialize;

use crate::auth::guard::ensure_owner;
use crate::auth::middleware::Session;
use crate::db::models::PostView;
use crate::error::AppError;
use crate::posts::store;
use crate::state::AppState;
use crate::uploads::{self, IncomingFile};
use crate::views;

#[derive(Debug, Deserialize)]
pub struct UpdatePostForm {
    #[serde(default)]
    pub content: String,
}

/// Fields of a post submission after the multipart body has been read.
#[derive(Debug, Default)]
struct NewPostForm {
    content: String,
    photo: Option<IncomingFile>,
}

fn bad_upload(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid upload: {}", e))
}

async fn read_post_form(mut multipart: Multipart) -> Result<NewPostForm, AppError> {
    let mut form = NewPostForm::default();

    while let Some(field) = multipart.next_field().await.map_err(bad_upload)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("content") => form.content = field.text().await.map_err(bad_upload)?,
            Some("photo") => {
                // Browsers send an unnamed empty part when no file was chosen
                let original_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(bad_upload)?;
                if original_name.is_empty() {
                    continue;
                }
                if form.photo.is_some() {
                    return Err(AppError::BadRequest("Only one photo per post".to_string()));
                }
                form.photo = Some(IncomingFile {
                    original_name,
                    data: data.to_vec(),
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

/// POST /post (multipart: content, photo)
/// Store the photo if any, then persist the post and link it to its owner.
pub async fn create_post(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let form = read_post_form(multipart).await?;
    if form.content.trim().is_empty() && form.photo.is_none() {
        return Err(AppError::BadRequest(
            "A post needs content or a photo".to_string(),
        ));
    }

    let stored = match &form.photo {
        Some(file) => Some(uploads::save_upload(&state.uploads_dir, file).await?),
        None => None,
    };

    let user_id = session.user_id().to_string();
    let content = form.content;
    let photo_ref = stored.as_ref().map(|(reference, _)| reference.clone());

    let result = state
        .store
        .call(move |conn| {
            Ok::<_, AppError>(store::create_post(
                conn,
                &user_id,
                &content,
                photo_ref.as_deref(),
            )?)
        })
        .await;

    match result {
        Ok(post) => {
            tracing::info!("Post created: {} by {}", post.id, post.user_id);
            Ok(Redirect::to("/profile"))
        }
        Err(e) => {
            if let Some((_, path)) = &stored {
                uploads::discard_upload(path).await;
            }
            Err(e)
        }
    }
}

/// POST /like/{id}
/// Add the acting user to the post's likes. Liking again changes nothing.
pub async fn like_post(
    State(state): State<AppState>,
    session: Session,
    Path(post_id): Path<String>,
    headers: HeaderMap,
) -> Result<Redirect, AppError> {
    let user_id = session.user_id().to_string();

    state
        .store
        .call(move |conn| {
            store::find_post(conn, &post_id)?.ok_or(AppError::NotFound("Post not found"))?;
            store::add_like(conn, &post_id, &user_id)?;
            Ok::<_, AppError>(())
        })
        .await?;

    Ok(Redirect::to(&back_target(&headers)))
}

/// Where to send the browser after a like: the referring page when it is on
/// this site, otherwise the feed.
fn back_target(headers: &HeaderMap) -> String {
    let Some(referer) = headers.get(header::REFERER).and_then(|v| v.to_str().ok()) else {
        return "/feed".to_string();
    };

    if referer.starts_with('/') && !referer.starts_with("//") {
        return referer.to_string();
    }

    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());
    let rest = referer
        .strip_prefix("http://")
        .or_else(|| referer.strip_prefix("https://"));
    if let (Some(host), Some(rest)) = (host, rest) {
        let (authority, path) = rest.split_at(rest.find('/').unwrap_or(rest.len()));
        if authority.eq_ignore_ascii_case(host) {
            return if path.is_empty() { "/".to_string() } else { path.to_string() };
        }
    }

    tracing::debug!("Ignoring off-site referer {}", referer);
    "/feed".to_string()
}

/// Owner check for post edits, applied only when configured.
fn check_edit_permission(state: &AppState, session: &Session, owner_id: &str) -> Result<(), AppError> {
    if state.require_owner_for_post_edit {
        return ensure_owner(session.user_id(), owner_id, "Unauthorized to edit this post.");
    }
    if session.user_id() != owner_id {
        tracing::warn!(
            "User {} is editing a post owned by {}",
            session.user_id(),
            owner_id
        );
    }
    Ok(())
}

/// GET /edit/{id}
pub async fn edit_post_form(
    State(state): State<AppState>,
    session: Session,
    Path(post_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let post = state
        .store
        .call(move |conn| Ok::<_, AppError>(store::find_post(conn, &post_id)?))
        .await?
        .ok_or(AppError::NotFound("Post not found"))?;

    check_edit_permission(&state, &session, &post.user_id)?;
    Ok(Html(views::edit_post_page(&post)))
}

/// POST /update/{id} (form: content)
pub async fn update_post(
    State(state): State<AppState>,
    session: Session,
    Path(post_id): Path<String>,
    Form(form): Form<UpdatePostForm>,
) -> Result<Redirect, AppError> {
    let lookup = post_id.clone();
    let post = state
        .store
        .call(move |conn| Ok::<_, AppError>(store::find_post(conn, &lookup)?))
        .await?
        .ok_or(AppError::NotFound("Post not found"))?;

    check_edit_permission(&state, &session, &post.user_id)?;

    let content = form.content;
    state
        .store
        .call(move |conn| {
            if !store::update_content(conn, &post_id, &content)? {
                return Err(AppError::NotFound("Post not found"));
            }
            Ok(())
        })
        .await?;

    Ok(Redirect::to("/profile"))
}

/// Delete a post owned by the acting user: existence first, then ownership,
/// then the post and its entry in the owner's list together.
async fn remove_post(state: &AppState, session: &Session, post_id: String) -> Result<(), AppError> {
    let user_id = session.user_id().to_string();

    state
        .store
        .call(move |conn| {
            let post =
                store::find_post(conn, &post_id)?.ok_or(AppError::NotFound("Post not found."))?;
            ensure_owner(&user_id, &post.user_id, "Unauthorized to delete this post.")?;
            store::delete_post(conn, &post.id, &user_id)?;
            tracing::info!("Post deleted: {} by {}", post.id, user_id);
            Ok(())
        })
        .await
}

/// POST /delete/{id} — delete from the profile page.
pub async fn delete_post(
    State(state): State<AppState>,
    session: Session,
    Path(post_id): Path<String>,
) -> Result<Redirect, AppError> {
    remove_post(&state, &session, post_id).await?;
    Ok(Redirect::to("/profile"))
}

/// POST /feed/delete/{id} — delete from the feed.
pub async fn delete_post_from_feed(
    State(state): State<AppState>,
    session: Session,
    Path(post_id): Path<String>,
) -> Result<Redirect, AppError> {
    remove_post(&state, &session, post_id).await?;
    Ok(Redirect::to("/feed"))
}

/// GET /feed — every post with owners and commenters resolved.
pub async fn feed(
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let posts = state
        .store
        .call(|conn| {
            let posts = store::list_posts(conn)?;
            Ok::<_, AppError>(store::resolve_posts(conn, posts)?)
        })
        .await?;

    tracing::debug!("Feed rendered with {} posts", posts.len());
    Ok(Html(views::feed_page(session.user_id(), &posts)))
}

/// GET /all-posts — every post as JSON, owner resolved. No auth.
pub async fn all_posts(State(state): State<AppState>) -> Result<Json<Vec<PostView>>, AppError> {
    let posts = state
        .store
        .call(|conn| {
            let posts = store::list_posts(conn)?;
            Ok::<_, AppError>(store::resolve_posts(conn, posts)?)
        })
        .await?;
    Ok(Json(posts))
}
