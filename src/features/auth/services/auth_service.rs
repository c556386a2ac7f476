use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{
    AuthResponseDto, AuthUserDto, LoginRequestDto, RefreshTokenRequestDto,
    RefreshTokenResponseDto, RegisterRequestDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::{PasswordHasher, TokenService};
use crate::features::users::models::UserAccount;
use crate::features::users::services::UserService;

/// Service for account operations (register, login, refresh)
pub struct AuthService {
    users: Arc<UserService>,
    tokens: Arc<TokenService>,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(users: Arc<UserService>, tokens: Arc<TokenService>, hasher: PasswordHasher) -> Self {
        Self {
            users,
            tokens,
            hasher,
        }
    }

    fn session(&self, user: &UserAccount) -> Result<AuthResponseDto> {
        let pair = self.tokens.issue_pair(&user.user_id, &user.email)?;
        Ok(AuthResponseDto {
            success: true,
            token: pair.access_token,
            refresh_token: pair.refresh_token,
            user: user.into(),
        })
    }

    pub async fn register(&self, dto: RegisterRequestDto) -> Result<AuthResponseDto> {
        let password_hash = self.hasher.hash(&dto.password).await?;
        let user = self
            .users
            .create(&dto.email, dto.name, password_hash)
            .await?;

        self.session(&user)
    }

    pub async fn login(&self, dto: LoginRequestDto) -> Result<AuthResponseDto> {
        let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

        let user = self.users.find_by_email(&dto.email).await?.ok_or_else(invalid)?;
        if !self.hasher.verify(&dto.password, &user.password_hash).await? {
            tracing::debug!("Failed login for user {}", user.user_id);
            return Err(invalid());
        }

        self.session(&user)
    }

    pub async fn refresh_token(
        &self,
        dto: RefreshTokenRequestDto,
    ) -> Result<RefreshTokenResponseDto> {
        let pair = self.tokens.refresh(&dto.refresh_token)?;
        Ok(RefreshTokenResponseDto {
            token: pair.access_token,
            refresh_token: pair.refresh_token,
        })
    }

    pub async fn get_current_user(&self, user: &AuthenticatedUser) -> Result<AuthUserDto> {
        let account = self.users.get(&user.user_id).await?;
        Ok((&account).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AuthConfig;
    use crate::modules::storage::{DocumentStore, MemoryObjectStore};
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;
    use std::time::Duration;

    fn service() -> AuthService {
        let docs = Arc::new(DocumentStore::new(Arc::new(MemoryObjectStore::new())));
        let tokens = TokenService::new(&AuthConfig {
            jwt_secret: "secret".to_string(),
            access_token_ttl: Duration::from_secs(3600),
            refresh_token_ttl: Duration::from_secs(14 * 24 * 3600),
            password_hash_iterations: 1_000,
        });
        AuthService::new(
            Arc::new(UserService::new(docs)),
            Arc::new(tokens),
            PasswordHasher::new(1_000).unwrap(),
        )
    }

    fn register_dto(email: &str) -> RegisterRequestDto {
        RegisterRequestDto {
            email: email.to_string(),
            password: "password123".to_string(),
            name: Some("Tester".to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let auth = service();
        let email: String = SafeEmail().fake();

        let registered = auth.register(register_dto(&email)).await.unwrap();
        assert!(registered.success);
        assert_eq!(registered.user.name.as_deref(), Some("Tester"));

        let session = auth
            .login(LoginRequestDto {
                email: email.to_uppercase(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(session.user.user_id, registered.user.user_id);

        let refreshed = auth
            .refresh_token(RefreshTokenRequestDto {
                refresh_token: session.refresh_token,
            })
            .await
            .unwrap();
        let user = auth.tokens.authenticate(&refreshed.token).unwrap();
        let me = auth.get_current_user(&user).await.unwrap();
        assert_eq!(me, registered.user);
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let auth = service();
        let email: String = SafeEmail().fake();
        auth.register(register_dto(&email)).await.unwrap();

        let err = auth.register(register_dto(&email)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_bad_credentials_are_indistinguishable() {
        let auth = service();
        let email: String = SafeEmail().fake();
        auth.register(register_dto(&email)).await.unwrap();

        for (email, password) in [(email.as_str(), "wrong-password"), ("nobody@example.com", "password123")] {
            let err = auth
                .login(LoginRequestDto {
                    email: email.to_string(),
                    password: password.to_string(),
                })
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "Unauthorized: Invalid credentials");
        }
    }
}
