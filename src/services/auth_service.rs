//! Domain service for back-office user accounts.
//!
//! Handles saving with validation, the first-admin bootstrap, authentication,
//! remember-me tokens and password resets.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::db::UserFilter;
use crate::models::user::UbiquoUser;
use crate::models::validation::ValidationErrors;

/// Errors specific to account operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Result of [`AuthService::create_first_admin`].
#[derive(Debug)]
pub enum FirstAdminOutcome {
    /// The superadmin was persisted.
    Created(UbiquoUser),
    /// Production mode, or accounts already exist.
    Refused,
    /// The supplied login/password did not pass validation.
    Invalid(ValidationErrors),
}

impl FirstAdminOutcome {
    #[must_use]
    pub const fn user(&self) -> Option<&UbiquoUser> {
        match self {
            Self::Created(user) => Some(user),
            Self::Refused | Self::Invalid(_) => None,
        }
    }
}

/// Domain service trait for accounts.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Validates and persists `user`, digesting a supplied password first.
    /// On success `user` is replaced by the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] with every failed rule, including
    /// case-insensitive `login`/`email` collisions.
    async fn save_user(&self, user: &mut UbiquoUser) -> Result<(), AuthError>;

    /// Creates the initial superadmin. Only allowed outside production and
    /// while no account exists.
    async fn create_first_admin(
        &self,
        login: &str,
        password: &str,
    ) -> Result<FirstAdminOutcome, AuthError>;

    /// Returns the account for `login` if the password matches and the
    /// account is active. Every failure looks the same to the caller.
    async fn authenticate(
        &self,
        login: &str,
        password: &str,
    ) -> Result<Option<UbiquoUser>, AuthError>;

    async fn get_user(&self, id: i32) -> Result<UbiquoUser, AuthError>;

    async fn get_user_by_login(&self, login: &str) -> Result<UbiquoUser, AuthError>;

    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<UbiquoUser>, AuthError>;

    /// Keeps the session alive for the configured remember time.
    async fn remember_me(&self, user: &mut UbiquoUser) -> Result<(), AuthError>;

    async fn remember_me_for(
        &self,
        user: &mut UbiquoUser,
        duration: Duration,
    ) -> Result<(), AuthError>;

    async fn remember_me_until(
        &self,
        user: &mut UbiquoUser,
        until: DateTime<Utc>,
    ) -> Result<(), AuthError>;

    /// Drops the remember token immediately.
    async fn forget_me(&self, user: &mut UbiquoUser) -> Result<(), AuthError>;

    /// Account holding `token`, as long as that token has not expired.
    async fn find_by_remember_token(&self, token: &str)
    -> Result<Option<UbiquoUser>, AuthError>;

    /// Sets a fresh random password and returns it in plaintext so it can be
    /// delivered to the owner. The returned value must not be logged.
    async fn reset_password(&self, user: &mut UbiquoUser) -> Result<String, AuthError>;
}
