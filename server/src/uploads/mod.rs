//! Photo uploads attached to posts.
//!
//! Files land in the configured uploads directory and are served back under
//! `/uploads/`. Names are `{unix_millis}-{random hex}{.ext}`: the timestamp
//! keeps files in upload order and the random part prevents collisions
//! between uploads in the same millisecond.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::Rng;

/// URL prefix uploaded files are served under.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// A file received in the `photo` field of a post submission.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub original_name: String,
    pub data: Vec<u8>,
}

/// Extension of the client-supplied file name, including the dot, or an
/// empty string. Only the final path component is considered.
fn extension_of(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e))
        .unwrap_or_default()
}

/// Generate the stored file name for an upload.
pub fn generate_file_name(original_name: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let token: [u8; 8] = rand::rng().random();
    format!("{}-{}{}", millis, hex::encode(token), extension_of(original_name))
}

/// Write an upload into `uploads_dir` and return the reference path stored
/// on the post (`/uploads/{file}`) along with the file's location on disk.
pub async fn save_upload(
    uploads_dir: &Path,
    file: &IncomingFile,
) -> Result<(String, PathBuf), std::io::Error> {
    tokio::fs::create_dir_all(uploads_dir).await?;

    let file_name = generate_file_name(&file.original_name);
    let path = uploads_dir.join(&file_name);
    tokio::fs::write(&path, &file.data).await?;

    tracing::debug!("Stored upload {} ({} bytes)", path.display(), file.data.len());
    Ok((format!("{}/{}", UPLOADS_URL_PREFIX, file_name), path))
}

/// Remove an upload whose post could not be saved.
pub async fn discard_upload(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!("Failed to remove orphaned upload {}: {}", path.display(), e);
    }
}
