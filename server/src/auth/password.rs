use crate::error::AppError;

/// bcrypt work factor. Fixed so stored hashes stay comparable across restarts.
pub const BCRYPT_COST: u32 = 10;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, BCRYPT_COST)
}

/// Compare a plaintext password against a stored bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, hash)
}

/// `hash_password` on the blocking pool; bcrypt is deliberately slow.
pub async fn hash_password_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await?
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// `verify_password` on the blocking pool.
pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await?
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}
