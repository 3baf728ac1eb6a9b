//! Server-rendered HTML pages.

use crate::db::models::{Comment, Post, PostView, User};

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #18181b; color: #e4e4e7; margin: 0; padding: 2rem; }}
        main {{ max-width: 640px; margin: 0 auto; }}
        nav a {{ color: #a1a1aa; margin-right: 1rem; }}
        .card {{ background: #27272a; border-radius: 8px; padding: 1rem; margin: 1rem 0; }}
        .muted {{ color: #a1a1aa; font-size: 0.85rem; }}
        .error {{ color: #f87171; }}
        input, textarea {{ width: 100%; box-sizing: border-box; margin: 0.25rem 0; padding: 0.5rem; background: #18181b; color: #e4e4e7; border: 1px solid #3f3f46; border-radius: 4px; }}
        button {{ background: #2563eb; color: #fff; border: 0; border-radius: 4px; padding: 0.4rem 1rem; cursor: pointer; }}
        img {{ max-width: 100%; border-radius: 6px; }}
        form.inline {{ display: inline; }}
    </style>
</head>
<body>
<main>
{body}
</main>
</body>
</html>"#,
        title = html_escape(title),
        body = body,
    )
}

fn nav() -> &'static str {
    r#"<nav><a href="/feed">Feed</a><a href="/profile">Profile</a><a href="/logout">Log out</a></nav>"#
}

/// GET / — registration form.
pub fn index_page() -> String {
    layout(
        "Create account",
        r#"<h1>Create account</h1>
<form method="post" action="/register">
    <input name="name" placeholder="Name">
    <input name="username" placeholder="Username">
    <input name="email" type="email" placeholder="Email" required>
    <input name="age" type="number" placeholder="Age">
    <input name="password" type="password" placeholder="Password" required>
    <button type="submit">Register</button>
</form>
<p class="muted">Already registered? <a href="/login">Log in</a></p>"#,
    )
}

/// GET /login — login form, with an optional error line.
pub fn login_page(error: Option<&str>) -> String {
    let error = error
        .map(|e| format!(r#"<p class="error">{}</p>"#, html_escape(e)))
        .unwrap_or_default();
    layout(
        "Log in",
        &format!(
            r#"<h1>Log in</h1>
{error}
<form method="post" action="/login">
    <input name="email" type="email" placeholder="Email" required>
    <input name="password" type="password" placeholder="Password" required>
    <button type="submit">Log in</button>
</form>
<p class="muted">No account? <a href="/">Register</a></p>"#
        ),
    )
}

/// Render one post card. `delete_action` is the form target for the owner's
/// delete button, which differs between feed and profile.
fn post_card(post: &PostView, viewer_id: &str, delete_action: &str) -> String {
    let (author, owner_id) = match &post.user {
        Some(user) => (user.username.as_str(), user.id.as_str()),
        None => ("unknown", ""),
    };
    let id = html_escape(&post.id);

    let photo = post
        .photo
        .as_deref()
        .map(|p| format!(r#"<img src="{}" alt="">"#, html_escape(p)))
        .unwrap_or_default();

    let owner_controls = if owner_id == viewer_id {
        format!(
            r#"<a href="/edit/{id}">Edit</a>
<form class="inline" method="post" action="{action}/{id}"><button type="submit">Delete</button></form>"#,
            action = delete_action,
        )
    } else {
        String::new()
    };

    let comments: String = post
        .comments
        .iter()
        .map(|c| {
            let controls = if c.comment.user_id == viewer_id {
                let cid = html_escape(&c.comment.id);
                format!(
                    r#" <a href="/comment/edit/{cid}">Edit</a>
<form class="inline" method="post" action="/comment/delete/{cid}"><button type="submit">Delete</button></form>"#
                )
            } else {
                String::new()
            };
            format!(
                r#"<li><strong>{}</strong> {}{}</li>"#,
                html_escape(&c.username),
                html_escape(&c.comment.content),
                controls
            )
        })
        .collect();

    format!(
        r#"<div class="card">
<p class="muted">@{author} · {created}</p>
<p>{content}</p>
{photo}
<form class="inline" method="post" action="/like/{id}"><button type="submit">Like ({likes})</button></form>
{owner_controls}
<ul>{comments}</ul>
<form method="post" action="/feed/comment/{id}">
    <input name="comment" placeholder="Write a comment">
    <button type="submit">Comment</button>
</form>
</div>"#,
        author = html_escape(author),
        created = html_escape(&post.created_at),
        content = html_escape(&post.content),
        likes = post.likes.len(),
    )
}

/// GET /profile — the acting user's details, post form, and posts.
pub fn profile_page(user: &User, posts: &[PostView]) -> String {
    let cards: String = posts
        .iter()
        .map(|p| post_card(p, &user.id, "/delete"))
        .collect();
    layout(
        "Profile",
        &format!(
            r#"{nav}
<h1>Hello, {name}</h1>
<p class="muted">@{username} · {email}</p>
<form method="post" action="/post" enctype="multipart/form-data">
    <textarea name="content" placeholder="What's on your mind?"></textarea>
    <input type="file" name="photo">
    <button type="submit">Post</button>
</form>
<h2>Your posts</h2>
{cards}"#,
            nav = nav(),
            name = html_escape(&user.name),
            username = html_escape(&user.username),
            email = html_escape(&user.email),
        ),
    )
}

/// GET /feed — every post.
pub fn feed_page(viewer_id: &str, posts: &[PostView]) -> String {
    let cards: String = if posts.is_empty() {
        r#"<p class="muted">No posts yet.</p>"#.to_string()
    } else {
        posts
            .iter()
            .map(|p| post_card(p, viewer_id, "/feed/delete"))
            .collect()
    };
    layout("Feed", &format!("{}\n<h1>Feed</h1>\n{}", nav(), cards))
}

/// GET /edit/{id}
pub fn edit_post_page(post: &Post) -> String {
    layout(
        "Edit post",
        &format!(
            r#"{nav}
<h1>Edit post</h1>
<form method="post" action="/update/{id}">
    <textarea name="content">{content}</textarea>
    <button type="submit">Save</button>
</form>"#,
            nav = nav(),
            id = html_escape(&post.id),
            content = html_escape(&post.content),
        ),
    )
}

/// GET /comment/edit/{id}
pub fn edit_comment_page(comment: &Comment) -> String {
    layout(
        "Edit comment",
        &format!(
            r#"{nav}
<h1>Edit comment</h1>
<form method="post" action="/comment/edit/{id}">
    <input name="content" value="{content}">
    <button type="submit">Save</button>
</form>"#,
            nav = nav(),
            id = html_escape(&comment.id),
            content = html_escape(&comment.content),
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{CommentView, UserSummary};

    fn summary(id: &str, username: &str) -> UserSummary {
        UserSummary {
            id: id.to_string(),
            name: username.to_string(),
            email: format!("{}@x.com", username),
            username: username.to_string(),
            age: None,
        }
    }

    fn sample_post() -> PostView {
        PostView {
            id: "p1".to_string(),
            content: "<script>alert(1)</script>".to_string(),
            photo: Some("/uploads/1-ab.png".to_string()),
            created_at: "2024-01-01T00:00:00.000000Z".to_string(),
            user: Some(summary("u1", "alice")),
            likes: vec!["u2".to_string()],
            comments: vec![CommentView {
                comment: Comment {
                    id: "c1".to_string(),
                    post_id: "p1".to_string(),
                    user_id: "u2".to_string(),
                    content: "nice".to_string(),
                    created_at: "2024-01-01T00:00:01.000000Z".to_string(),
                },
                username: "bob".to_string(),
            }],
        }
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_feed_escapes_content() {
        let html = feed_page("u3", &[sample_post()]);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Like (1)"));
        assert!(html.contains(r#"src="/uploads/1-ab.png""#));
    }

    #[test]
    fn test_owner_controls_only_for_owner() {
        let html = feed_page("u1", &[sample_post()]);
        assert!(html.contains(r#"action="/feed/delete/p1""#));
        assert!(!html.contains("/comment/edit/c1"));

        let html = feed_page("u2", &[sample_post()]);
        assert!(!html.contains(r#"action="/feed/delete/p1""#));
        assert!(html.contains("/comment/edit/c1"));
    }

    #[test]
    fn test_empty_feed() {
        assert!(feed_page("u1", &[]).contains("No posts yet."));
    }

    #[test]
    fn test_login_error_shown() {
        assert!(login_page(Some("Invalid password")).contains("Invalid password"));
        assert!(!login_page(None).contains(r#"class="error""#));
    }
}
