use reqwest::{Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{
    AuthResponseDto, AuthUserDto, LoginRequestDto, RefreshTokenRequestDto,
    RefreshTokenResponseDto, RegisterRequestDto,
};
use crate::features::auth::model::TokenPair;
use crate::shared::types::ErrorResponse;

/// Maps a gateway error response back onto [`AppError`]
async fn into_error(response: Response) -> AppError {
    let status = response.status();
    let message = response
        .json::<ErrorResponse>()
        .await
        .map(|e| e.error)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown error").to_string());

    match status {
        StatusCode::BAD_REQUEST => AppError::BadRequest(message),
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        StatusCode::FORBIDDEN => AppError::Forbidden(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::CONFLICT => AppError::Conflict(message),
        StatusCode::GONE => AppError::ShareExpired(message),
        StatusCode::UNPROCESSABLE_ENTITY => AppError::ArchiveEmpty(message),
        StatusCode::BAD_GATEWAY => AppError::ProviderUnavailable(message),
        _ => AppError::Internal(format!("HTTP {}: {}", status.as_u16(), message)),
    }
}

async fn checked(response: Response) -> Result<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(into_error(response).await)
    }
}

/// Client-side session against the gateway.
///
/// Holds the token pair, attaches the access token to every call and, on a
/// 401, refreshes once and replays the request. A failed refresh ends the
/// session.
pub struct SessionClient {
    base_url: String,
    http: reqwest::Client,
    tokens: RwLock<Option<TokenPair>>,
}

impl SessionClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            tokens: RwLock::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn tokens(&self) -> Option<TokenPair> {
        self.tokens.read().await.clone()
    }

    pub async fn set_tokens(&self, tokens: Option<TokenPair>) {
        *self.tokens.write().await = tokens;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.tokens.read().await.is_some()
    }

    async fn start_session<B: Serialize>(&self, path: &str, body: &B) -> Result<AuthUserDto> {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Gateway unreachable: {}", e)))?;

        let session: AuthResponseDto = checked(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Invalid auth response: {}", e)))?;

        self.set_tokens(Some(TokenPair {
            access_token: session.token,
            refresh_token: session.refresh_token,
        }))
        .await;
        Ok(session.user)
    }

    pub async fn register(&self, dto: &RegisterRequestDto) -> Result<AuthUserDto> {
        self.start_session("/auth/register", dto).await
    }

    pub async fn login(&self, dto: &LoginRequestDto) -> Result<AuthUserDto> {
        self.start_session("/auth/login", dto).await
    }

    /// Ends the session locally. The gateway call is a courtesy; tokens are
    /// dropped even if it fails.
    pub async fn logout(&self) {
        if let Err(e) = self.http.post(self.url("/auth/logout")).send().await {
            tracing::debug!("Logout request failed: {}", e);
        }
        self.set_tokens(None).await;
    }

    async fn try_refresh(&self) -> Option<TokenPair> {
        let refresh_token = self.tokens.read().await.as_ref()?.refresh_token.clone();

        let response = self
            .http
            .post(self.url("/auth/refresh"))
            .json(&RefreshTokenRequestDto { refresh_token })
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }

        let refreshed: RefreshTokenResponseDto = response.json().await.ok()?;
        let pair = TokenPair {
            access_token: refreshed.token,
            refresh_token: refreshed.refresh_token,
        };
        self.set_tokens(Some(pair.clone())).await;
        Some(pair)
    }

    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        body: Option<&serde_json::Value>,
        access_token: &str,
    ) -> Result<Response> {
        let mut request = self
            .http
            .request(method.clone(), self.url(path))
            .bearer_auth(access_token);
        if let Some(body) = body {
            request = request.json(body);
        }

        request
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Gateway unreachable: {}", e)))
    }

    /// Sends an authenticated request, refreshing the session at most once
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Response> {
        let access_token = self
            .tokens
            .read()
            .await
            .as_ref()
            .map(|t| t.access_token.clone())
            .ok_or_else(|| AppError::Unauthorized("Not logged in".to_string()))?;

        let response = self.dispatch(&method, path, body, &access_token).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return checked(response).await;
        }

        let Some(pair) = self.try_refresh().await else {
            tracing::info!("Session refresh failed, logging out");
            self.set_tokens(None).await;
            return Err(AppError::Unauthorized("Session expired".to_string()));
        };

        let retried = self.dispatch(&method, path, body, &pair.access_token).await?;
        checked(retried).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(Method::GET, path, None)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Invalid response body: {}", e)))
    }

    pub async fn put_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let body = serde_json::to_value(body)
            .map_err(|e| AppError::Internal(format!("Failed to encode request: {}", e)))?;

        self.send(Method::PUT, path, Some(&body))
            .await?
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Invalid response body: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::dtos::ConfigResponseDto;
    use crate::shared::test_helpers::spawn_gateway;
    use chrono::Utc;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    fn register_dto() -> RegisterRequestDto {
        RegisterRequestDto {
            email: SafeEmail().fake(),
            password: "password123".to_string(),
            name: None,
        }
    }

    #[tokio::test]
    async fn test_register_login_logout() {
        let gateway = spawn_gateway().await;
        let session = SessionClient::new(&gateway.base_url).unwrap();
        let dto = register_dto();

        let user = session.register(&dto).await.unwrap();
        assert!(session.is_authenticated().await);

        session.logout().await;
        assert!(!session.is_authenticated().await);
        assert!(matches!(
            session.get_json::<ConfigResponseDto>("/config").await,
            Err(AppError::Unauthorized(_))
        ));

        let again = session
            .login(&LoginRequestDto {
                email: dto.email.clone(),
                password: dto.password.clone(),
            })
            .await
            .unwrap();
        assert_eq!(again, user);

        let err = session.register(&dto).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_expired_access_token_is_refreshed_once() {
        let gateway = spawn_gateway().await;
        let session = SessionClient::new(&gateway.base_url).unwrap();
        let user = session.register(&register_dto()).await.unwrap();

        let stale = gateway
            .tokens
            .issue_at(&user.user_id, &user.email, None, Utc::now().timestamp() - 7_200)
            .unwrap();
        let refresh_token = session.tokens().await.unwrap().refresh_token;
        session
            .set_tokens(Some(TokenPair {
                access_token: stale.clone(),
                refresh_token,
            }))
            .await;

        let config: ConfigResponseDto = session.get_json("/config").await.unwrap();
        assert!(config.providers.is_empty());

        let current = session.tokens().await.unwrap();
        assert_ne!(current.access_token, stale);
    }

    #[tokio::test]
    async fn test_failed_refresh_ends_session() {
        let gateway = spawn_gateway().await;
        let session = SessionClient::new(&gateway.base_url).unwrap();
        let user = session.register(&register_dto()).await.unwrap();

        let past = Utc::now().timestamp() - 30 * 24 * 3600;
        let pair = gateway
            .tokens
            .issue_pair_at(&user.user_id, &user.email, past)
            .unwrap();
        session.set_tokens(Some(pair)).await;

        let err = session
            .get_json::<ConfigResponseDto>("/config")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized: Session expired");
        assert!(!session.is_authenticated().await);
    }
}
