// handlers/protected/tokens.rs - token refresh and revocation

use axum::{extract::State, Extension};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::auth::{issue_token, TokenKind};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

/// POST /token/refresh/ - Mint a new access token from a refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<AccessToken> {
    let issued = issue_token(current.user.id, TokenKind::Access, &state.config.security)?;
    Ok(ApiResponse::success(AccessToken {
        access_token: issued.token,
        token_type: "bearer",
        expires_in: state.config.security.access_token_expires,
    }))
}

/// DELETE /access/revoke/ - Denylist the presented access token
pub async fn revoke_access(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Value> {
    state.denylist.revoke(&current.claims).await?;
    info!("User {} revoked access token {}", current.user.id, current.claims.jti);
    Ok(ApiResponse::message("Access token revoked"))
}

/// DELETE /refresh/revoke/ - Denylist the presented refresh token
pub async fn revoke_refresh(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Value> {
    state.denylist.revoke(&current.claims).await?;
    info!("User {} revoked refresh token {}", current.user.id, current.claims.jti);
    Ok(ApiResponse::message("Refresh token revoked"))
}
