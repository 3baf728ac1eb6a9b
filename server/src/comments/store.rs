//! Comments embedded in a post, addressable by their own id.

use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::models::{Comment, CommentView};
use crate::db::timestamp;

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        post_id: row.get(1)?,
        user_id: row.get(2)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Append a comment to a post. The caller has already checked the post exists.
pub fn insert_comment(
    conn: &Connection,
    post_id: &str,
    user_id: &str,
    content: &str,
) -> rusqlite::Result<Comment> {
    let comment = Comment {
        id: Uuid::now_v7().to_string(),
        post_id: post_id.to_string(),
        user_id: user_id.to_string(),
        content: content.to_string(),
        created_at: timestamp(),
    };

    conn.execute(
        "INSERT INTO comments (id, post_id, user_id, content, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            comment.id,
            comment.post_id,
            comment.user_id,
            comment.content,
            comment.created_at
        ],
    )?;

    Ok(comment)
}

pub fn find_comment(conn: &Connection, comment_id: &str) -> rusqlite::Result<Option<Comment>> {
    conn.query_row(
        "SELECT id, post_id, user_id, content, created_at FROM comments WHERE id = ?1",
        [comment_id],
        comment_from_row,
    )
    .optional()
}

pub fn update_comment(conn: &Connection, comment_id: &str, content: &str) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE comments SET content = ?2 WHERE id = ?1",
        rusqlite::params![comment_id, content],
    )?;
    Ok(changed > 0)
}

/// Remove a comment by id. Returns whether anything was removed.
pub fn delete_comment(conn: &Connection, comment_id: &str) -> rusqlite::Result<bool> {
    let changed = conn.execute("DELETE FROM comments WHERE id = ?1", [comment_id])?;
    Ok(changed > 0)
}

/// Comments on a post in insertion order, with each author's username.
pub fn comments_for_post(conn: &Connection, post_id: &str) -> rusqlite::Result<Vec<CommentView>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.post_id, c.user_id, c.content, c.created_at, COALESCE(u.username, '')
         FROM comments c LEFT JOIN users u ON u.id = c.user_id
         WHERE c.post_id = ?1
         ORDER BY c.rowid ASC",
    )?;

    let comments = stmt
        .query_map([post_id], |row| {
            Ok(CommentView {
                comment: comment_from_row(row)?,
                username: row.get(5)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(comments)
}
