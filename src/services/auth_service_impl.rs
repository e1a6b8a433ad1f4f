//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::task;
use tracing::{debug, info, warn};

use crate::config::{Config, Environment};
use crate::db::repositories::user::unique_violation;
use crate::db::{Store, UniqueField, UserFilter};
use crate::models::user::UbiquoUser;
use crate::models::validation::ValidationErrors;
use crate::services::auth_service::{AuthError, AuthService, FirstAdminOutcome};
use crate::services::crypto::{PasswordDigest, generate_password};

const FIRST_ADMIN_EMAIL: &str = "foo@bar.com";
const FIRST_ADMIN_NAME: &str = "Super";
const FIRST_ADMIN_SURNAME: &str = "Admin";

pub struct SeaOrmAuthService {
    store: Store,
    digest: PasswordDigest,
    environment: Environment,
    locale: String,
    remember_time: Duration,
}

impl SeaOrmAuthService {
    pub fn new(store: Store, config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            store,
            digest: PasswordDigest::new(&config.authentication)?,
            environment: config.general.environment,
            locale: config.general.locale.clone(),
            remember_time: config.authentication.remember_time(),
        })
    }

    /// Argon2 is CPU-bound, so digests run off the async workers.
    async fn with_digest<T, F>(&self, f: F) -> Result<T, AuthError>
    where
        F: FnOnce(&PasswordDigest) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let digest = self.digest.clone();
        task::spawn_blocking(move || f(&digest))
            .await
            .map_err(|e| AuthError::Internal(format!("Password digest task panicked: {e}")))?
            .map_err(AuthError::from)
    }

    /// Writes an already validated and digested user. A unique-index
    /// violation means another writer took the login or email after the
    /// pre-check, and is reported as the same validation error.
    async fn persist(&self, pending: &UbiquoUser) -> Result<UbiquoUser, AuthError> {
        match self.store.save_user(pending).await {
            Ok(saved) => Ok(saved),
            Err(err) => match unique_violation(&err) {
                Some(field) => {
                    let mut errors = ValidationErrors::new();
                    errors.add(field.as_str(), "has already been taken");
                    Err(AuthError::Validation(errors))
                }
                None => Err(err.into()),
            },
        }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn save_user(&self, user: &mut UbiquoUser) -> Result<(), AuthError> {
        let mut errors = user.validate();

        for (field, value) in [
            (UniqueField::Login, &user.login),
            (UniqueField::Email, &user.email),
        ] {
            if !value.trim().is_empty()
                && self
                    .store
                    .is_user_field_taken(field, value, user.id)
                    .await?
            {
                errors.add(field.as_str(), "has already been taken");
            }
        }

        if !errors.is_empty() {
            debug!(login = %user.login, "User failed validation: {errors}");
            return Err(AuthError::Validation(errors));
        }

        let pending = user.clone();
        let pending = self
            .with_digest(move |digest| {
                let mut pending = pending;
                pending.encrypt_password(digest, Utc::now())?;
                Ok(pending)
            })
            .await?;

        let saved = self.persist(&pending).await?;

        if user.is_new_record() {
            info!(id = ?saved.id, login = %saved.login, "Created user");
        } else {
            debug!(id = ?saved.id, login = %saved.login, "Updated user");
        }
        *user = saved;
        Ok(())
    }

    async fn create_first_admin(
        &self,
        login: &str,
        password: &str,
    ) -> Result<FirstAdminOutcome, AuthError> {
        if self.environment.is_production() {
            warn!("Refusing to create first admin in production");
            return Ok(FirstAdminOutcome::Refused);
        }

        if self.store.count_users().await? > 0 {
            warn!("Refusing to create first admin: users already exist");
            return Ok(FirstAdminOutcome::Refused);
        }

        let mut user = UbiquoUser {
            login: login.to_string(),
            email: FIRST_ADMIN_EMAIL.to_string(),
            name: FIRST_ADMIN_NAME.to_string(),
            surname: FIRST_ADMIN_SURNAME.to_string(),
            is_active: true,
            is_admin: true,
            locale: Some(self.locale.clone()),
            ..UbiquoUser::default()
        };
        user.set_password(password);

        match self.save_user(&mut user).await {
            Ok(()) => {}
            Err(AuthError::Validation(errors)) => return Ok(FirstAdminOutcome::Invalid(errors)),
            Err(e) => return Err(e),
        }

        user.is_superadmin = true;
        self.save_user(&mut user).await?;

        info!(login = %user.login, "First admin created");
        Ok(FirstAdminOutcome::Created(user))
    }

    async fn authenticate(
        &self,
        login: &str,
        password: &str,
    ) -> Result<Option<UbiquoUser>, AuthError> {
        let Some(user) = self.store.get_user_by_login(login).await? else {
            debug!("Authentication failed");
            return Ok(None);
        };

        let password = password.to_string();
        let (user, matches) = self
            .with_digest(move |digest| {
                let matches = user.authenticated(digest, &password)?;
                Ok((user, matches))
            })
            .await?;

        if matches && user.is_active {
            debug!(login = %user.login, "Authenticated user");
            Ok(Some(user))
        } else {
            debug!("Authentication failed");
            Ok(None)
        }
    }

    async fn get_user(&self, id: i32) -> Result<UbiquoUser, AuthError> {
        self.store
            .get_user(id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn get_user_by_login(&self, login: &str) -> Result<UbiquoUser, AuthError> {
        self.store
            .get_user_by_login(login)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<UbiquoUser>, AuthError> {
        Ok(self.store.list_users(filter).await?)
    }

    async fn remember_me(&self, user: &mut UbiquoUser) -> Result<(), AuthError> {
        self.remember_me_for(user, self.remember_time).await
    }

    async fn remember_me_for(
        &self,
        user: &mut UbiquoUser,
        duration: Duration,
    ) -> Result<(), AuthError> {
        let Some(until) = Utc::now().checked_add_signed(duration) else {
            let mut errors = ValidationErrors::new();
            errors.add("remember_token_expires_at", "is out of range");
            return Err(AuthError::Validation(errors));
        };
        self.remember_me_until(user, until).await
    }

    async fn remember_me_until(
        &self,
        user: &mut UbiquoUser,
        until: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let pending = user.clone();
        let mut pending = self
            .with_digest(move |digest| {
                let mut pending = pending;
                pending.assign_remember_token(digest, until)?;
                Ok(pending)
            })
            .await?;

        self.save_user(&mut pending).await?;
        *user = pending;
        Ok(())
    }

    async fn forget_me(&self, user: &mut UbiquoUser) -> Result<(), AuthError> {
        let mut pending = user.clone();
        pending.clear_remember_token();
        self.save_user(&mut pending).await?;
        *user = pending;
        Ok(())
    }

    async fn find_by_remember_token(
        &self,
        token: &str,
    ) -> Result<Option<UbiquoUser>, AuthError> {
        let user = self.store.get_user_by_remember_token(token).await?;
        Ok(user.filter(|u| u.remember_token_active(Utc::now())))
    }

    async fn reset_password(&self, user: &mut UbiquoUser) -> Result<String, AuthError> {
        let password = generate_password(&mut rand::rng());

        let mut pending = user.clone();
        pending.set_password(password.clone());
        self.save_user(&mut pending).await?;
        *user = pending;

        info!(login = %user.login, "Password reset");
        Ok(password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> SeaOrmAuthService {
        let mut config = Config::default();
        config.authentication.argon2_memory_cost_kib = 64;
        config.authentication.argon2_time_cost = 1;
        let store = Store::new("sqlite::memory:").await.unwrap();
        SeaOrmAuthService::new(store, &config).unwrap()
    }

    async fn saved_alice(service: &SeaOrmAuthService) -> UbiquoUser {
        let mut user = UbiquoUser {
            login: "alice".to_string(),
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            surname: "Liddell".to_string(),
            is_active: true,
            ..UbiquoUser::default()
        };
        user.set_password("wonderland");
        service.save_user(&mut user).await.unwrap();
        user
    }

    #[tokio::test]
    async fn test_persist_maps_unique_index_violation_to_validation_error() {
        let service = service().await;
        let alice = saved_alice(&service).await;

        // Same login in another case, as if written after the uniqueness check ran.
        let mut late = alice.clone();
        late.id = None;
        late.login = "ALICE".to_string();
        late.email = "late@example.com".to_string();

        let Err(AuthError::Validation(errors)) = service.persist(&late).await else {
            panic!("expected a validation error");
        };
        assert_eq!(errors.on("login"), vec!["has already been taken"]);
        assert!(errors.on("email").is_empty());

        late.login = "late".to_string();
        late.email = "Alice@Example.com".to_string();
        let Err(AuthError::Validation(errors)) = service.persist(&late).await else {
            panic!("expected a validation error");
        };
        assert_eq!(errors.on("email"), vec!["has already been taken"]);
        assert_eq!(service.store.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_remember_me_for_rejects_overflowing_duration() {
        let service = service().await;
        let mut user = saved_alice(&service).await;

        let Err(AuthError::Validation(errors)) = service
            .remember_me_for(&mut user, Duration::days(365 * 300_000))
            .await
        else {
            panic!("expected a validation error");
        };
        assert_eq!(
            errors.on("remember_token_expires_at"),
            vec!["is out of range"]
        );
        assert!(user.remember_token.is_none());

        let stored = service.get_user_by_login("alice").await.unwrap();
        assert!(stored.remember_token.is_none());
    }
}
