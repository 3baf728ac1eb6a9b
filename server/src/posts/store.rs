//! Post documents: content, owner, like set, and embedded comments.
//!
//! Creating and deleting a post also touches the owner's post list. Both
//! happen inside one SQLite transaction so the two never disagree.

use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::accounts::store as accounts;
use crate::comments::store::comments_for_post;
use crate::db::models::{Post, PostView, UserSummary};
use crate::db::timestamp;

const POST_COLUMNS: &str = "p.id, p.user_id, p.content, p.photo, p.created_at";

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        user_id: row.get(1)?,
        content: row.get(2)?,
        photo: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Persist a post and append it to its owner's post list.
pub fn create_post(
    conn: &mut Connection,
    user_id: &str,
    content: &str,
    photo: Option<&str>,
) -> rusqlite::Result<Post> {
    let post = Post {
        id: Uuid::now_v7().to_string(),
        user_id: user_id.to_string(),
        content: content.to_string(),
        photo: photo.map(str::to_string),
        created_at: timestamp(),
    };

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO posts (id, user_id, content, photo, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![post.id, post.user_id, post.content, post.photo, post.created_at],
    )?;
    accounts::push_post(&tx, user_id, &post.id)?;
    tx.commit()?;

    Ok(post)
}

pub fn find_post(conn: &Connection, post_id: &str) -> rusqlite::Result<Option<Post>> {
    conn.query_row(
        &format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.id = ?1"),
        [post_id],
        post_from_row,
    )
    .optional()
}

/// Replace a post's content. Returns whether the post existed.
pub fn update_content(conn: &Connection, post_id: &str, content: &str) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE posts SET content = ?2 WHERE id = ?1",
        rusqlite::params![post_id, content],
    )?;
    Ok(changed > 0)
}

/// Delete a post (likes and comments go with it) and remove it from the
/// owner's post list.
pub fn delete_post(conn: &mut Connection, post_id: &str, owner_id: &str) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    accounts::pull_post(&tx, owner_id, post_id)?;
    tx.execute("DELETE FROM posts WHERE id = ?1", [post_id])?;
    tx.commit()
}

/// Add `user_id` to the post's likes. Returns false when it was already there.
pub fn add_like(conn: &Connection, post_id: &str, user_id: &str) -> rusqlite::Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO post_likes (post_id, user_id, liked_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![post_id, user_id, timestamp()],
    )?;
    Ok(inserted > 0)
}

/// Liking user ids, in like order.
pub fn likes(conn: &Connection, post_id: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT user_id FROM post_likes WHERE post_id = ?1 ORDER BY rowid ASC")?;
    let ids = stmt
        .query_map([post_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(ids)
}

/// Every post, in store order (insertion).
pub fn list_posts(conn: &Connection) -> rusqlite::Result<Vec<Post>> {
    let mut stmt = conn.prepare(&format!("SELECT {POST_COLUMNS} FROM posts p ORDER BY p.rowid ASC"))?;
    let posts = stmt
        .query_map([], post_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(posts)
}

/// Posts in the user's post list, newest first.
pub fn posts_for_user(conn: &Connection, user_id: &str) -> rusqlite::Result<Vec<Post>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {POST_COLUMNS} FROM user_posts up
         INNER JOIN posts p ON p.id = up.post_id
         WHERE up.user_id = ?1
         ORDER BY p.created_at DESC, up.position DESC"
    ))?;
    let posts = stmt
        .query_map([user_id], post_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(posts)
}

/// Resolve owner, likes, and comments (with commenter usernames) for each post.
pub fn resolve_posts(conn: &Connection, posts: Vec<Post>) -> rusqlite::Result<Vec<PostView>> {
    let mut views = Vec::with_capacity(posts.len());
    for post in posts {
        let owner = accounts::find_user_by_id(conn, &post.user_id)?;
        views.push(PostView {
            likes: likes(conn, &post.id)?,
            comments: comments_for_post(conn, &post.id)?,
            user: owner.as_ref().map(UserSummary::from),
            id: post.id,
            content: post.content,
            photo: post.photo,
            created_at: post.created_at,
        });
    }
    Ok(views)
}
