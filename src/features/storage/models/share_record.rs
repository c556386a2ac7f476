use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Persisted grant for public, bounded access to one object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRecord {
    pub key: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_limit: Option<u32>,
    #[serde(default)]
    pub downloads: u32,
    /// Hex SHA-256 of the share password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// Lifecycle of a share; `Expired` and `Exhausted` are terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareState {
    Active,
    Expired,
    Exhausted,
}

impl ShareRecord {
    pub fn new(
        key: String,
        expires_at: DateTime<Utc>,
        download_limit: Option<u32>,
        password: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            key,
            expires_at,
            download_limit,
            downloads: 0,
            password_hash: password.filter(|p| !p.is_empty()).map(hash_password),
            created_at: now,
        }
    }

    pub fn state(&self, now: DateTime<Utc>) -> ShareState {
        if now > self.expires_at {
            ShareState::Expired
        } else if self
            .download_limit
            .is_some_and(|limit| self.downloads >= limit)
        {
            ShareState::Exhausted
        } else {
            ShareState::Active
        }
    }

    pub fn is_protected(&self) -> bool {
        self.password_hash.is_some()
    }

    pub fn password_matches(&self, supplied: Option<&str>) -> bool {
        match (&self.password_hash, supplied) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(expected), Some(supplied)) => {
                let supplied = hash_password(supplied);
                expected.as_bytes().ct_eq(supplied.as_bytes()).into()
            }
        }
    }
}

fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}
