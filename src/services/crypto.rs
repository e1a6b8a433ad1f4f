//! Credential digests, salts and generated passwords.
//!
//! Digests keep the `encrypt(password, salt)` shape: the input is always
//! `--{salt}--{password}--`, so the same pair yields the same digest. The
//! digest itself is Argon2id keyed by the SHA-256 of the salt, hex encoded.

use anyhow::Result;
use argon2::{Algorithm, Argon2, Params, Version};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::config::AuthenticationConfig;

/// Raw digest length in bytes (hex output is twice as long).
const DIGEST_LEN: usize = 32;

/// Random bytes behind a generated password (base64 encoded to 8 chars).
const GENERATED_PASSWORD_BYTES: usize = 6;

#[derive(Debug, Clone)]
pub struct PasswordDigest {
    params: Params,
}

impl PasswordDigest {
    pub fn new(config: &AuthenticationConfig) -> Result<Self> {
        let params = Params::new(
            config.argon2_memory_cost_kib,
            config.argon2_time_cost,
            config.argon2_parallelism,
            Some(DIGEST_LEN),
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

        Ok(Self { params })
    }

    /// Deterministic digest of `password` under `salt`.
    pub fn encrypt(&self, password: &str, salt: &str) -> Result<String> {
        let input = format!("--{salt}--{password}--");
        let key = Sha256::digest(salt.as_bytes());

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        let mut out = [0u8; DIGEST_LEN];
        argon2
            .hash_password_into(input.as_bytes(), &key, &mut out)
            .map_err(|e| anyhow::anyhow!("Failed to digest password: {e}"))?;

        Ok(hex::encode(out))
    }

    /// Checks `password` against a stored digest without short-circuiting on
    /// the first differing byte.
    pub fn verify(&self, password: &str, salt: &str, expected: &str) -> Result<bool> {
        let actual = self.encrypt(password, salt)?;
        Ok(actual.as_bytes().ct_eq(expected.as_bytes()).into())
    }
}

/// Per-record salt, derived once when a record is first saved.
#[must_use]
pub fn make_salt(login: &str, now: DateTime<Utc>) -> String {
    let seed = format!(
        "--{}--{login}--",
        now.to_rfc3339_opts(SecondsFormat::Nanos, true)
    );
    hex::encode(Sha256::digest(seed.as_bytes()))
}

/// Printable random password handed out by a reset.
pub fn generate_password<R: Rng>(rng: &mut R) -> String {
    let bytes: [u8; GENERATED_PASSWORD_BYTES] = rng.random();
    STANDARD.encode(bytes)
}

#[cfg(test)]
pub(crate) fn test_digest() -> PasswordDigest {
    let config = AuthenticationConfig {
        argon2_memory_cost_kib: 64,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
        ..AuthenticationConfig::default()
    };
    PasswordDigest::new(&config).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn encrypt_is_deterministic() {
        let digest = test_digest();
        let a = digest.encrypt("secret", "salt-1").unwrap();
        let b = digest.encrypt("secret", "salt-1").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), DIGEST_LEN * 2);
    }

    #[test]
    fn encrypt_depends_on_password_and_salt() {
        let digest = test_digest();
        let base = digest.encrypt("secret", "salt-1").unwrap();
        assert_ne!(base, digest.encrypt("secret2", "salt-1").unwrap());
        assert_ne!(base, digest.encrypt("secret", "salt-2").unwrap());
    }

    #[test]
    fn encrypt_accepts_empty_salt() {
        let digest = test_digest();
        assert!(digest.encrypt("secret", "").is_ok());
    }

    #[test]
    fn verify_matches_only_the_right_password() {
        let digest = test_digest();
        let stored = digest.encrypt("hunter2", "abc").unwrap();
        assert!(digest.verify("hunter2", "abc", &stored).unwrap());
        assert!(!digest.verify("hunter3", "abc", &stored).unwrap());
        assert!(!digest.verify("hunter2", "abc", "short").unwrap());
    }

    #[test]
    fn salt_depends_on_login_and_time() {
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 1).unwrap();
        assert_eq!(make_salt("admin", t1), make_salt("admin", t1));
        assert_ne!(make_salt("admin", t1), make_salt("admin", t2));
        assert_ne!(make_salt("admin", t1), make_salt("other", t1));
        assert_eq!(make_salt("admin", t1).len(), 64);
    }

    #[test]
    fn generated_passwords_are_printable() {
        let mut rng = rand::rng();
        let password = generate_password(&mut rng);
        assert_eq!(password.len(), 8);
        assert!(password.chars().all(|c| c.is_ascii_graphic()));
        assert_ne!(password, generate_password(&mut rng));
    }
}
