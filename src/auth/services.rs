use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    password::{hash_password, verify_password},
    repo::UserStore,
    repo_types::{NewUser, User},
};
use crate::error::AppError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trims the address and checks its shape. Case is kept as given.
pub(crate) fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim();
    if !is_valid_email(email) {
        return Err(AppError::validation("Invalid email"));
    }
    Ok(email.to_string())
}

/// Any non-empty password is accepted; it is stored only as a salted hash.
pub(crate) fn validate_new_password(password: &str) -> Result<(), AppError> {
    if password.is_empty() {
        return Err(AppError::validation("Password is required"));
    }
    Ok(())
}

pub(crate) fn required(field: &str, value: &str) -> Result<String, AppError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(v.to_string())
}

pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Creates an account after checking the email is free.
pub async fn register_user(store: &dyn UserStore, new: NewUser) -> Result<User, AppError> {
    if store.find_by_email(&new.email).await?.is_some() {
        warn!(email = %new.email, "email already registered");
        return Err(AppError::conflict("User with this email already exists."));
    }

    // a concurrent registration can still win the unique index
    match store.create(new).await? {
        Some(user) => {
            info!(user_id = %user.user_id, "user registered");
            Ok(user)
        }
        None => Err(AppError::conflict("User with this email already exists.")),
    }
}

/// Resolves credentials to a user. Unknown email and wrong password are indistinguishable.
pub async fn authenticate(
    store: &dyn UserStore,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let Some(user) = store.find_by_email(email).await? else {
        warn!("login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash) {
        warn!(user_id = %user.user_id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    Ok(user)
}

/// Replaces the password hash once the old password has been re-verified.
pub async fn change_password(
    store: &dyn UserStore,
    user_id: Uuid,
    old_password: &str,
    new_password: &str,
) -> Result<(), AppError> {
    let user = store
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    if !verify_password(old_password, &user.password_hash) {
        warn!(user_id = %user_id, "password change with wrong old password");
        return Err(AppError::validation("Old password is incorrect."));
    }
    validate_new_password(new_password)?;

    let hash = hash_password(new_password)?;
    store.update_password_hash(user_id, &hash).await?;
    info!(user_id = %user_id, "password changed");
    Ok(())
}
