use crate::error::AppError;

/// Check that the acting user owns the resource.
///
/// Call only after the resource has been loaded: a missing resource must be
/// reported as NotFound before ownership is evaluated.
pub fn ensure_owner(
    acting_user_id: &str,
    owner_id: &str,
    message: &'static str,
) -> Result<(), AppError> {
    if acting_user_id == owner_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(message))
    }
}
