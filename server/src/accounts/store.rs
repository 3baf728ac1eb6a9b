//! User records and each user's ordered list of owned posts.

use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::models::User;
use crate::db::timestamp;

/// Fields collected at registration. `password` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub age: Option<i64>,
}

const USER_COLUMNS: &str = "id, name, email, username, password, age, created_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        username: row.get(3)?,
        password: row.get(4)?,
        age: row.get(5)?,
        created_at: row.get(6)?,
    })
}

pub fn insert_user(conn: &Connection, new_user: NewUser) -> rusqlite::Result<User> {
    let user = User {
        id: Uuid::now_v7().to_string(),
        name: new_user.name,
        email: new_user.email,
        username: new_user.username,
        password: new_user.password,
        age: new_user.age,
        created_at: timestamp(),
    };

    conn.execute(
        "INSERT INTO users (id, name, email, username, password, age, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            user.id,
            user.name,
            user.email,
            user.username,
            user.password,
            user.age,
            user.created_at
        ],
    )?;

    Ok(user)
}

/// First user registered with `email`. Email uniqueness is only enforced by
/// registration checking here first.
pub fn find_user_by_email(conn: &Connection, email: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1 ORDER BY rowid LIMIT 1"),
        [email],
        user_from_row,
    )
    .optional()
}

pub fn find_user_by_id(conn: &Connection, user_id: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        [user_id],
        user_from_row,
    )
    .optional()
}

/// Accounts registered under `email`. Registration refuses to add a second one.
pub fn count_users_with_email(conn: &Connection, email: &str) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM users WHERE email = ?1",
        [email],
        |row| row.get(0),
    )
}

/// Append a post to the end of the user's post list.
pub fn push_post(conn: &Connection, user_id: &str, post_id: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO user_posts (user_id, post_id, position)
         VALUES (?1, ?2, (SELECT COALESCE(MAX(position), 0) + 1 FROM user_posts WHERE user_id = ?1))",
        rusqlite::params![user_id, post_id],
    )?;
    Ok(())
}

/// Remove a post from the user's post list. Absent entries are ignored.
pub fn pull_post(conn: &Connection, user_id: &str, post_id: &str) -> rusqlite::Result<()> {
    conn.execute(
        "DELETE FROM user_posts WHERE user_id = ?1 AND post_id = ?2",
        rusqlite::params![user_id, post_id],
    )?;
    Ok(())
}

/// Ids in the user's post list, in insertion order.
pub fn post_ids(conn: &Connection, user_id: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT post_id FROM user_posts WHERE user_id = ?1 ORDER BY position ASC")?;
    let ids = stmt
        .query_map([user_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(ids)
}
