//! Ownership rules applied on top of an authenticated identity.
//!
//! Reading is open to any authenticated caller. Mutating an image, a comment or a
//! user profile is reserved to the identity recorded as its owner.

use tracing::warn;
use uuid::Uuid;

use super::extractors::AuthUser;
use crate::error::AppError;

/// A persisted resource with a recorded owner.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

/// Fails with `Forbidden` unless `who` owns `resource`.
pub fn ensure_owner<R: Owned>(who: &AuthUser, resource: &R) -> Result<(), AppError> {
    ensure_self(who, resource.owner_id())
}

/// Fails with `Forbidden` unless `who` is the user `user_id`.
pub fn ensure_self(who: &AuthUser, user_id: Uuid) -> Result<(), AppError> {
    if who.id == user_id {
        Ok(())
    } else {
        warn!(caller = %who.id, owner = %user_id, "ownership check failed");
        Err(AppError::Forbidden)
    }
}
