use crate::core::error::Result;
use crate::core::extractor::ValidJson;
use crate::features::auth::dtos::{
    AuthResponseDto, AuthUserDto, LoginRequestDto, RefreshTokenRequestDto,
    RefreshTokenResponseDto, RegisterRequestDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::AuthService;
use crate::shared::types::{ErrorResponse, SuccessResponse};
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

/// Register a new user
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequestDto,
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponseDto),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(service): State<Arc<AuthService>>,
    ValidJson(dto): ValidJson<RegisterRequestDto>,
) -> Result<(StatusCode, Json<AuthResponseDto>)> {
    let auth_response = service.register(dto).await?;
    Ok((StatusCode::CREATED, Json(auth_response)))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful", body = AuthResponseDto),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    ValidJson(dto): ValidJson<LoginRequestDto>,
) -> Result<Json<AuthResponseDto>> {
    Ok(Json(service.login(dto).await?))
}

/// Get current authenticated user info
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = AuthUserDto),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(
    user: AuthenticatedUser,
    State(service): State<Arc<AuthService>>,
) -> Result<Json<AuthUserDto>> {
    Ok(Json(service.get_current_user(&user).await?))
}

/// Exchange a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshTokenRequestDto,
    responses(
        (status = 200, description = "Token refreshed successfully", body = RefreshTokenResponseDto),
        (status = 401, description = "Invalid or expired refresh token", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    State(service): State<Arc<AuthService>>,
    ValidJson(dto): ValidJson<RefreshTokenRequestDto>,
) -> Result<Json<RefreshTokenResponseDto>> {
    Ok(Json(service.refresh_token(dto).await?))
}

/// Logout
///
/// Tokens are stateless; clients drop them.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = SuccessResponse)
    ),
    tag = "auth"
)]
pub async fn logout() -> Json<SuccessResponse> {
    Json(SuccessResponse::ok())
}
