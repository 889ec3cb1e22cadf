use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use error_stack::{Report, Result, ResultExt};
use thiserror::Error;

use crate::util::Sensitive;

#[derive(Debug, Error)]
#[error("Failed to process password")]
pub struct PasswordError;

/// Hashes a password into a PHC string. Argon2 is CPU heavy so it
/// runs on the blocking thread pool.
#[tracing::instrument(skip_all, name = "password.hash")]
pub async fn hash(password: Sensitive<String>) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_blocking(password.as_str()))
        .await
        .change_context(PasswordError)?
}

// Default argon2id parameters, so checking it costs as much as a real hash.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

#[tracing::instrument(skip_all, name = "password.verify")]
pub async fn verify(password: Sensitive<String>, hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_blocking(password.as_str(), &hash))
        .await
        .change_context(PasswordError)?
}

/// Spends the same time as [`verify`] on a password that has no
/// account behind it.
#[tracing::instrument(skip_all, name = "password.verify_dummy")]
pub async fn verify_dummy(password: Sensitive<String>) -> Result<(), PasswordError> {
    verify(password, DUMMY_HASH.to_string()).await.map(|_| ())
}

pub fn hash_blocking(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|v| v.to_string())
        .map_err(|e| Report::new(PasswordError).attach_printable(e.to_string()))
}

pub fn verify_blocking(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| Report::new(PasswordError).attach_printable(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(..) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(Report::new(PasswordError).attach_printable(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_blocking("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_blocking("correct horse battery", &hash).unwrap());
        assert!(!verify_blocking("wrong horse battery", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(verify_blocking("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_dummy_hash_never_matches() {
        assert!(!verify_blocking("", DUMMY_HASH).unwrap());
        assert!(!verify_blocking("correct horse battery", DUMMY_HASH).unwrap());
    }

    #[tokio::test]
    async fn test_verify_dummy() {
        verify_dummy(Sensitive::new("graceful".into())).await.unwrap();
    }

    #[tokio::test]
    async fn test_async_wrappers() {
        let hash = hash(Sensitive::new("correct horse battery".into()))
            .await
            .unwrap();
        let matched = verify(Sensitive::new("correct horse battery".into()), hash)
            .await
            .unwrap();
        assert!(matched);
    }
}
