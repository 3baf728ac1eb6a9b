use std::path::PathBuf;

use crate::db::Store;

/// Shared application state passed to all handlers via axum State extractor.
#[derive(Clone)]
pub struct AppState {
    /// Users/posts store, opened once at startup
    pub store: Store,
    /// Session token signing key
    pub session_secret: Vec<u8>,
    /// Lifetime of issued session tokens
    pub session_ttl_secs: i64,
    /// Where uploaded photos are written
    pub uploads_dir: PathBuf,
    /// Apply the owner check to post edits as well as deletes
    pub require_owner_for_post_edit: bool,
}
