//! `/auth` routes and the bearer-token extractor.

use crate::{
    api::{AppState, extract::JsonBody},
    core::{
        credentials::{self, NewUser},
        token::Claims,
    },
    entities::{Role, user},
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::{header, request::Parts},
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Claims of a verified `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(Error::Unauthorized)?;

        let (scheme, token) = value.split_once(' ').ok_or(Error::Unauthorized)?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(Error::Unauthorized);
        }

        state.tokens.verify(token.trim()).map(Self)
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: String,
    pub name: String,
}

/// Login form. A `role` field may be sent but is ignored; the stored role
/// is what goes into the token.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user_id: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub username: String,
    pub role: Role,
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub username: String,
    pub role: Role,
    pub name: String,
    pub is_active: bool,
}

fn token_response(state: &AppState, account: &user::Model) -> Result<Json<TokenResponse>> {
    let access_token = state.tokens.issue(&account.username, account.role)?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
        user_id: account.id.to_string(),
        role: account.role,
    }))
}

/// Looks the token's subject up again so deleted or deactivated accounts
/// stop working before their tokens expire.
async fn current_account(state: &AppState, claims: &Claims) -> Result<user::Model> {
    match credentials::get_user_by_username(&state.db, &claims.sub).await? {
        Some(account) if account.is_active => Ok(account),
        _ => Err(Error::Unauthorized),
    }
}

/// `POST /auth/register`
pub async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<Json<TokenResponse>> {
    let role: Role = request.role.parse()?;
    let account = credentials::register(
        &state.db,
        NewUser {
            username: request.username,
            password: request.password,
            role,
            name: request.name,
        },
    )
    .await?;

    token_response(&state, &account)
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let account =
        credentials::verify_credentials(&state.db, &request.username, &request.password).await?;
    info!("User {} logged in", account.id);
    token_response(&state, &account)
}

/// `GET /auth/validate`
pub async fn validate(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ValidateResponse>> {
    let account = current_account(&state, &claims).await?;
    Ok(Json(ValidateResponse {
        valid: true,
        username: account.username,
        role: account.role,
        user_id: account.id,
    }))
}

/// `GET /auth/me`
pub async fn me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ProfileResponse>> {
    let account = current_account(&state, &claims).await?;
    Ok(Json(ProfileResponse {
        username: account.username,
        role: account.role,
        name: account.name,
        is_active: account.is_active,
    }))
}
