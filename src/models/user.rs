use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use super::validation::ValidationErrors;
use crate::entities::ubiquo_users;
use crate::services::crypto::{PasswordDigest, make_salt};

const LOGIN_LENGTH: (usize, usize) = (3, 40);
const PASSWORD_LENGTH: (usize, usize) = (4, 40);

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^([a-z0-9#_.-]+)@([a-z0-9-]+)\.([a-z.]+)$").expect("Invalid regex")
    })
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Back-office user account.
///
/// `password` and `password_confirmation` are never persisted; they only feed
/// validation and the [`UbiquoUser::encrypt_password`] hook on save.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct UbiquoUser {
    /// `None` until the record has been inserted.
    pub id: Option<i32>,
    pub login: String,
    pub email: String,
    pub name: String,
    pub surname: String,

    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    #[serde(default, skip_serializing)]
    pub password_confirmation: Option<String>,

    #[serde(skip)]
    pub crypted_password: Option<String>,
    #[serde(skip)]
    pub salt: Option<String>,
    #[serde(skip)]
    pub remember_token: Option<String>,
    pub remember_token_expires_at: Option<DateTime<Utc>>,

    pub is_admin: bool,
    pub is_active: bool,
    pub is_superadmin: bool,
    #[serde(default)]
    pub role_ids: Vec<i32>,
    pub locale: Option<String>,
    pub photo_file_name: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl fmt::Debug for UbiquoUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UbiquoUser")
            .field("id", &self.id)
            .field("login", &self.login)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("surname", &self.surname)
            .field("is_admin", &self.is_admin)
            .field("is_active", &self.is_active)
            .field("is_superadmin", &self.is_superadmin)
            .field("role_ids", &self.role_ids)
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

impl UbiquoUser {
    pub fn from_model(model: ubiquo_users::Model, role_ids: Vec<i32>) -> Self {
        Self {
            id: Some(model.id),
            login: model.login,
            email: model.email,
            name: model.name,
            surname: model.surname,
            password: None,
            password_confirmation: None,
            crypted_password: model.crypted_password,
            salt: model.salt,
            remember_token: model.remember_token,
            remember_token_expires_at: model.remember_token_expires_at,
            is_admin: model.is_admin,
            is_active: model.is_active,
            is_superadmin: model.is_superadmin,
            role_ids,
            locale: model.locale,
            photo_file_name: model.photo_file_name,
            created_at: Some(model.created_at),
            updated_at: Some(model.updated_at),
        }
    }

    #[must_use]
    pub const fn is_new_record(&self) -> bool {
        self.id.is_none()
    }

    /// Sets the plaintext password and its confirmation to the same value.
    pub fn set_password(&mut self, password: impl Into<String>) {
        let password = password.into();
        self.password_confirmation = Some(password.clone());
        self.password = Some(password);
    }

    /// A password is only demanded when no digest exists yet or a new one
    /// was supplied, so profile edits can skip it.
    #[must_use]
    pub fn password_required(&self) -> bool {
        is_blank(self.crypted_password.as_deref()) || !is_blank(self.password.as_deref())
    }

    /// Field rules that need no storage access. Uniqueness of `login` and
    /// `email` is checked against the store when saving.
    #[must_use]
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if is_blank(Some(self.name.as_str())) {
            errors.add("name", "can't be blank");
        }
        if is_blank(Some(self.surname.as_str())) {
            errors.add("surname", "can't be blank");
        }

        if self.password_required() {
            if is_blank(self.password_confirmation.as_deref()) {
                errors.add("password_confirmation", "can't be blank");
            }
            validate_password(
                &mut errors,
                self.password.as_deref(),
                self.password_confirmation.as_deref(),
            );
        }

        if is_blank(Some(self.login.as_str())) {
            errors.add("login", "can't be blank");
        }
        validate_length(&mut errors, "login", &self.login, LOGIN_LENGTH);

        if is_blank(Some(self.email.as_str())) {
            errors.add("email", "can't be blank");
        }
        if !email_regex().is_match(&self.email) {
            errors.add("email", "is invalid");
        }

        errors
    }

    /// Digests `data` with this record's salt.
    pub fn encrypt(&self, digest: &PasswordDigest, data: &str) -> Result<String> {
        digest.encrypt(data, self.salt.as_deref().unwrap_or_default())
    }

    pub fn authenticated(&self, digest: &PasswordDigest, password: &str) -> Result<bool> {
        let Some(crypted) = self.crypted_password.as_deref() else {
            return Ok(false);
        };
        digest.verify(password, self.salt.as_deref().unwrap_or_default(), crypted)
    }

    /// Pre-save hook: derives the salt for new records and refreshes the
    /// digest whenever a plaintext password is present.
    pub fn encrypt_password(&mut self, digest: &PasswordDigest, now: DateTime<Utc>) -> Result<()> {
        let Some(password) = self.password.as_deref().filter(|p| !p.trim().is_empty()) else {
            return Ok(());
        };

        if self.is_new_record() {
            self.salt = Some(make_salt(&self.login, now));
        }
        let crypted = self.encrypt(digest, password)?;
        self.crypted_password = Some(crypted);
        Ok(())
    }

    /// True while a remember token is set and has not yet expired at `now`.
    #[must_use]
    pub fn remember_token_active(&self, now: DateTime<Utc>) -> bool {
        self.remember_token_expires_at
            .is_some_and(|expires_at| now < expires_at)
    }

    pub fn assign_remember_token(
        &mut self,
        digest: &PasswordDigest,
        until: DateTime<Utc>,
    ) -> Result<()> {
        let token = self.encrypt(
            digest,
            &format!("--{}--", until.to_rfc3339_opts(SecondsFormat::Secs, true)),
        )?;
        self.remember_token_expires_at = Some(until);
        self.remember_token = Some(token);
        Ok(())
    }

    pub fn clear_remember_token(&mut self) {
        self.remember_token_expires_at = None;
        self.remember_token = None;
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}, {}", self.surname, self.name)
    }
}

fn validate_length(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    (min, max): (usize, usize),
) {
    let len = value.chars().count();
    if len < min {
        errors.add(field, format!("is too short (minimum is {min} characters)"));
    } else if len > max {
        errors.add(field, format!("is too long (maximum is {max} characters)"));
    }
}

fn validate_password(
    errors: &mut ValidationErrors,
    password: Option<&str>,
    confirmation: Option<&str>,
) {
    let Some(password) = password.filter(|p| !p.trim().is_empty()) else {
        errors.add("password", "can't be blank");
        return;
    };

    validate_length(errors, "password", password, PASSWORD_LENGTH);

    if confirmation.is_some_and(|c| c != password) {
        errors.add("password", "doesn't match confirmation");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::crypto::test_digest;
    use chrono::{Duration, TimeZone};

    fn valid_user() -> UbiquoUser {
        let mut user = UbiquoUser {
            login: "alice".to_string(),
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            surname: "Liddell".to_string(),
            is_active: true,
            ..UbiquoUser::default()
        };
        user.set_password("wonderland");
        user
    }

    #[test]
    fn test_valid_user_has_no_errors() {
        assert!(valid_user().validate().is_empty());
    }

    #[test]
    fn test_required_fields() {
        let user = UbiquoUser::default();
        let errors = user.validate();
        assert_eq!(errors.on("name"), vec!["can't be blank"]);
        assert_eq!(errors.on("surname"), vec!["can't be blank"]);
        assert!(errors.on("login").contains(&"can't be blank"));
        assert!(errors.on("email").contains(&"can't be blank"));
        assert_eq!(errors.on("password"), vec!["can't be blank"]);
        assert_eq!(errors.on("password_confirmation"), vec!["can't be blank"]);
    }

    #[test]
    fn test_login_length() {
        let mut user = valid_user();
        user.login = "ab".to_string();
        assert_eq!(
            user.validate().on("login"),
            vec!["is too short (minimum is 3 characters)"]
        );

        user.login = "a".repeat(41);
        assert_eq!(
            user.validate().on("login"),
            vec!["is too long (maximum is 40 characters)"]
        );

        user.login = "a".repeat(40);
        assert!(user.validate().is_empty());
    }

    #[test]
    fn test_email_format() {
        let mut user = valid_user();
        for ok in ["A.B-c#d_e@Host-1.CO.uk", "x@y.z"] {
            user.email = ok.to_string();
            assert!(user.validate().on("email").is_empty(), "{ok}");
        }
        for bad in ["plain", "a@b", "a@b.c0m", "a b@c.d", "a@b_c.com", "a@b.com\n"] {
            user.email = bad.to_string();
            assert_eq!(user.validate().on("email"), vec!["is invalid"], "{bad:?}");
        }
    }

    #[test]
    fn test_password_rules() {
        let mut user = valid_user();
        user.set_password("abc");
        assert_eq!(
            user.validate().on("password"),
            vec!["is too short (minimum is 4 characters)"]
        );

        user.set_password("a".repeat(41));
        assert_eq!(
            user.validate().on("password"),
            vec!["is too long (maximum is 40 characters)"]
        );

        user.password = Some("secret".to_string());
        user.password_confirmation = Some("different".to_string());
        assert_eq!(
            user.validate().on("password"),
            vec!["doesn't match confirmation"]
        );
    }

    #[test]
    fn test_password_optional_once_digest_exists() {
        let mut user = valid_user();
        user.password = None;
        user.password_confirmation = None;
        assert!(user.password_required());

        user.crypted_password = Some("digest".to_string());
        assert!(!user.password_required());
        assert!(user.validate().is_empty());

        user.password = Some("newpass".to_string());
        assert!(user.password_required());
        assert_eq!(
            user.validate().on("password_confirmation"),
            vec!["can't be blank"]
        );
    }

    #[test]
    fn test_encrypt_password_hook() {
        let digest = test_digest();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut user = valid_user();

        user.encrypt_password(&digest, now).unwrap();
        let salt = user.salt.clone().unwrap();
        assert_eq!(salt, make_salt("alice", now));
        assert_eq!(
            user.crypted_password.as_deref(),
            Some(digest.encrypt("wonderland", &salt).unwrap().as_str())
        );
        assert!(user.authenticated(&digest, "wonderland").unwrap());
        assert!(!user.authenticated(&digest, "wrong").unwrap());
    }

    #[test]
    fn test_encrypt_password_keeps_salt_on_existing_record() {
        let digest = test_digest();
        let now = Utc::now();
        let mut user = valid_user();
        user.encrypt_password(&digest, now).unwrap();
        let salt = user.salt.clone();

        user.id = Some(1);
        user.set_password("another");
        user.encrypt_password(&digest, now + Duration::seconds(5)).unwrap();
        assert_eq!(user.salt, salt);
        assert!(user.authenticated(&digest, "another").unwrap());
    }

    #[test]
    fn test_encrypt_password_skips_blank_password() {
        let digest = test_digest();
        let mut user = valid_user();
        user.id = Some(1);
        user.crypted_password = Some("kept".to_string());
        user.salt = Some("kept-salt".to_string());
        user.password = Some("   ".to_string());

        user.encrypt_password(&digest, Utc::now()).unwrap();
        assert_eq!(user.crypted_password.as_deref(), Some("kept"));
        assert_eq!(user.salt.as_deref(), Some("kept-salt"));
    }

    #[test]
    fn test_user_without_digest_never_authenticates() {
        let digest = test_digest();
        assert!(!valid_user().authenticated(&digest, "wonderland").unwrap());
    }

    #[test]
    fn test_remember_token_lifecycle() {
        let digest = test_digest();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut user = valid_user();
        user.salt = Some("salt".to_string());
        assert!(!user.remember_token_active(now));

        let until = now + Duration::hours(1);
        user.assign_remember_token(&digest, until).unwrap();
        assert_eq!(user.remember_token_expires_at, Some(until));
        assert_eq!(
            user.remember_token.as_deref(),
            Some(
                digest
                    .encrypt("--2024-05-01T13:00:00Z--", "salt")
                    .unwrap()
                    .as_str()
            )
        );
        assert!(user.remember_token_active(now));
        assert!(!user.remember_token_active(until));
        assert!(!user.remember_token_active(until + Duration::seconds(1)));

        user.clear_remember_token();
        assert!(user.remember_token.is_none());
        assert!(!user.remember_token_active(now));
    }

    #[test]
    fn test_full_name() {
        assert_eq!(valid_user().full_name(), "Liddell, Alice");
    }

    #[test]
    fn test_debug_hides_credentials() {
        let mut user = valid_user();
        user.crypted_password = Some("digest-value".to_string());
        let debug = format!("{user:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("wonderland"));
        assert!(!debug.contains("digest-value"));
    }
}
