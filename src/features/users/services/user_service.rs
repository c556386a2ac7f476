use chrono::Utc;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::users::models::{EmailIndex, UserAccount, UserSettings};
use crate::modules::storage::DocumentStore;

fn user_key(user_id: &str) -> String {
    format!("users/{}.json", user_id)
}

fn email_key(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    format!("emails/{}.json", hex::encode(digest))
}

/// User documents and the email index
pub struct UserService {
    docs: Arc<DocumentStore>,
}

impl UserService {
    pub fn new(docs: Arc<DocumentStore>) -> Self {
        Self { docs }
    }

    pub async fn create(
        &self,
        email: &str,
        name: Option<String>,
        password_hash: String,
    ) -> Result<UserAccount> {
        let index_key = email_key(email);
        let _guard = self.docs.lock(&index_key).await;

        if self.docs.read::<EmailIndex>(&index_key).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let now = Utc::now();
        let user = UserAccount {
            user_id: Uuid::new_v4().to_string(),
            email: email.trim().to_lowercase(),
            name,
            password_hash,
            providers: Vec::new(),
            settings: UserSettings::default(),
            created_at: now,
            updated_at: now,
        };

        self.docs.write(&user_key(&user.user_id), &user).await?;
        self.docs
            .write(
                &index_key,
                &EmailIndex {
                    user_id: user.user_id.clone(),
                },
            )
            .await?;

        tracing::info!("Registered user {}", user.user_id);
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
        let Some(index) = self.docs.read::<EmailIndex>(&email_key(email)).await? else {
            return Ok(None);
        };
        self.docs.read(&user_key(&index.user_id)).await
    }

    pub async fn get(&self, user_id: &str) -> Result<UserAccount> {
        self.docs
            .read(&user_key(user_id))
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Applies `apply` to the stored document under the user's lock, with
    /// `updated_at` already bumped. Nothing is written when `apply` fails.
    pub async fn update<R>(
        &self,
        user_id: &str,
        apply: impl FnOnce(&mut UserAccount) -> Result<R>,
    ) -> Result<R> {
        let key = user_key(user_id);
        let _guard = self.docs.lock(&key).await;

        let mut user: UserAccount = self
            .docs
            .read(&key)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        user.updated_at = Utc::now();
        let outcome = apply(&mut user)?;
        self.docs.write(&key, &user).await?;

        Ok(outcome)
    }
}
