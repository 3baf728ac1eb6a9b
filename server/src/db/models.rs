//! Row types for the users/posts schema, plus the resolved shapes the
//! views and the JSON endpoint render.

use serde::Serialize;

/// User record in the users table
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub username: String,
    /// bcrypt hash, never serialized
    pub password: String,
    pub age: Option<i64>,
    pub created_at: String,
}

/// Public projection of a user, safe to embed in responses.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub username: String,
    pub age: Option<i64>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            age: user.age,
        }
    }
}

/// Post record in the posts table
#[derive(Debug, Clone)]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub photo: Option<String>,
    pub created_at: String,
}

/// Comment record, embedded in a post
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: String,
}

/// Comment with its author's username resolved.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub username: String,
}

/// Post with owner, likes and comments resolved.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: String,
    pub content: String,
    pub photo: Option<String>,
    pub created_at: String,
    /// None when the owner row is gone
    pub user: Option<UserSummary>,
    /// Ids of liking users, in like order
    pub likes: Vec<String>,
    pub comments: Vec<CommentView>,
}
