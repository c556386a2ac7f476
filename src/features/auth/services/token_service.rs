use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::collections::HashSet;

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AuthenticatedUser, TokenClaims, TokenKind, TokenPair};

/// Issues and verifies HS256 access and refresh tokens
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        // Expiry is checked by hand so that `exp == now` is already invalid
        // and no leeway applies.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            access_ttl_secs: config.access_token_ttl.as_secs() as i64,
            refresh_ttl_secs: config.refresh_token_ttl.as_secs() as i64,
        }
    }

    pub fn issue_at(
        &self,
        user_id: &str,
        email: &str,
        kind: Option<TokenKind>,
        now: i64,
    ) -> Result<String> {
        let ttl = match kind {
            Some(TokenKind::Refresh) => self.refresh_ttl_secs,
            None => self.access_ttl_secs,
        };
        let claims = TokenClaims {
            user_id: user_id.to_string(),
            email: email.to_string(),
            iat: now,
            exp: now + ttl,
            kind,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    pub fn issue_pair_at(&self, user_id: &str, email: &str, now: i64) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_at(user_id, email, None, now)?,
            refresh_token: self.issue_at(user_id, email, Some(TokenKind::Refresh), now)?,
        })
    }

    pub fn issue_pair(&self, user_id: &str, email: &str) -> Result<TokenPair> {
        self.issue_pair_at(user_id, email, Utc::now().timestamp())
    }

    /// Checks the signature, then requires `exp` to be strictly after `now`
    pub fn verify_at(&self, token: &str, now: i64) -> Result<TokenClaims> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                AppError::Unauthorized("Invalid token".to_string())
            })?;

        if data.claims.exp <= now {
            return Err(AppError::Unauthorized("Token expired".to_string()));
        }

        Ok(data.claims)
    }

    pub fn verify(&self, token: &str) -> Result<TokenClaims> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Resolves the caller of an access token. Refresh tokens are refused.
    pub fn authenticate(&self, token: &str) -> Result<AuthenticatedUser> {
        let claims = self.verify(token)?;
        if claims.is_refresh() {
            return Err(AppError::Unauthorized(
                "Refresh token cannot be used for API access".to_string(),
            ));
        }

        Ok(AuthenticatedUser {
            user_id: claims.user_id,
            email: claims.email,
        })
    }

    /// Exchanges a refresh token for a new pair. The presented token is not
    /// revoked.
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let claims = self.verify(refresh_token)?;
        if !claims.is_refresh() {
            return Err(AppError::Unauthorized("Invalid refresh token".to_string()));
        }

        self.issue_pair(&claims.user_id, &claims.email)
    }
}
