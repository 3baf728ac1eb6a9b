//! Credentials, session tokens, and ownership checks.

pub mod guard;
pub mod jwt;
pub mod middleware;
pub mod password;
