use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use std::num::NonZeroU32;

use crate::core::error::{AppError, Result};

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// PBKDF2-HMAC-SHA256 password hashes in the form
/// `pbkdf2-sha256$<iterations>$<salt>$<hash>`
#[derive(Clone)]
pub struct PasswordHasher {
    iterations: NonZeroU32,
    rng: SystemRandom,
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Result<Self> {
        let iterations = NonZeroU32::new(iterations).ok_or_else(|| {
            AppError::Internal("Password hash iterations must be positive".to_string())
        })?;

        Ok(Self {
            iterations,
            rng: SystemRandom::new(),
        })
    }

    fn hash_blocking(&self, password: &str) -> Result<String> {
        let mut salt = [0u8; SALT_LEN];
        self.rng
            .fill(&mut salt)
            .map_err(|_| AppError::Internal("Failed to generate salt".to_string()))?;

        let mut hash = [0u8; HASH_LEN];
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            self.iterations,
            &salt,
            password.as_bytes(),
            &mut hash,
        );

        Ok(format!(
            "{}${}${}${}",
            SCHEME,
            self.iterations,
            STANDARD_NO_PAD.encode(salt),
            STANDARD_NO_PAD.encode(hash)
        ))
    }

    fn verify_blocking(password: &str, stored: &str) -> bool {
        let mut parts = stored.split('$');
        let (Some(SCHEME), Some(iterations), Some(salt), Some(hash), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return false;
        };

        let Some(iterations) = iterations.parse().ok().and_then(NonZeroU32::new) else {
            return false;
        };
        let (Ok(salt), Ok(hash)) = (STANDARD_NO_PAD.decode(salt), STANDARD_NO_PAD.decode(hash))
        else {
            return false;
        };

        pbkdf2::verify(
            pbkdf2::PBKDF2_HMAC_SHA256,
            iterations,
            &salt,
            password.as_bytes(),
            &hash,
        )
        .is_ok()
    }

    pub async fn hash(&self, password: &str) -> Result<String> {
        let hasher = self.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash_blocking(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
    }

    /// Constant-time check of `password` against a stored hash. Malformed
    /// hashes never match.
    pub async fn verify(&self, password: &str, stored: &str) -> Result<bool> {
        let password = password.to_string();
        let stored = stored.to_string();
        tokio::task::spawn_blocking(move || Self::verify_blocking(&password, &stored))
            .await
            .map_err(|e| AppError::Internal(format!("Hash verification task failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hasher = PasswordHasher::new(1_000).unwrap();
        let stored = hasher.hash("correct horse").await.unwrap();

        assert!(stored.starts_with("pbkdf2-sha256$1000$"));
        assert!(hasher.verify("correct horse", &stored).await.unwrap());
        assert!(!hasher.verify("wrong horse", &stored).await.unwrap());
    }

    #[tokio::test]
    async fn test_salts_differ() {
        let hasher = PasswordHasher::new(1_000).unwrap();
        let a = hasher.hash("same").await.unwrap();
        let b = hasher.hash("same").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_malformed_hash_never_matches() {
        let hasher = PasswordHasher::new(1_000).unwrap();
        for stored in ["", "plain", "pbkdf2-sha256$0$AA$AA", "md5$1$AA$AA"] {
            assert!(!hasher.verify("x", stored).await.unwrap());
        }
        assert!(PasswordHasher::new(0).is_err());
    }
}
