use std::path::Path;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;

use crate::auth::middleware::SessionClaims;

/// Default session lifetime: 7 days.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Load or generate the session signing key (256-bit random secret).
/// Key is stored as raw bytes in data_dir/session_secret.
pub fn load_or_generate_session_secret(
    data_dir: impl AsRef<Path>,
) -> Result<Vec<u8>, std::io::Error> {
    let data_dir = data_dir.as_ref();
    std::fs::create_dir_all(data_dir)?;
    let key_path = data_dir.join("session_secret");

    if key_path.exists() {
        let key = std::fs::read(&key_path)?;
        if key.len() == 32 {
            tracing::info!("Session signing key loaded from {}", key_path.display());
            return Ok(key);
        }
        tracing::warn!("Session key file has wrong size ({}), regenerating", key.len());
    }

    let key: [u8; 32] = rand::rng().random();
    std::fs::write(&key_path, key)?;
    tracing::info!("Session signing key generated at {}", key_path.display());
    Ok(key.to_vec())
}

/// Issue a session token for a user.
/// Claims: sub=user_id, email, iat, exp
pub fn issue_session_token(
    secret: &[u8],
    user_id: &str,
    email: &str,
    ttl_secs: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        iat: now,
        exp: now + ttl_secs,
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(secret),
    )
}

/// Validate a session token (signature and expiry) and return its claims.
pub fn validate_session_token(
    secret: &[u8],
    token: &str,
) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    let token_data = decode::<SessionClaims>(token, &DecodingKey::from_secret(secret), &validation)?;
    Ok(token_data.claims)
}
