use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::auth::{decode_token, Claims, TokenKind};
use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller, inserted into request extensions by the token middleware
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user: User,
    pub claims: Claims,
}

/// Requires a valid, unrevoked access token for an active user
pub async fn require_access_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let request = authenticate(&state, request, TokenKind::Access).await?;
    Ok(next.run(request).await)
}

/// Requires a valid, unrevoked refresh token for an active user
pub async fn require_refresh_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let request = authenticate(&state, request, TokenKind::Refresh).await?;
    Ok(next.run(request).await)
}

async fn authenticate(state: &AppState, mut request: Request, kind: TokenKind) -> Result<Request, ApiError> {
    let token = extract_bearer_token(request.headers()).map_err(|reason| {
        warn!("Rejected {} token: {}", kind.as_str(), reason);
        ApiError::credentials()
    })?;

    let claims = decode_token(token, kind, &state.config.security)?;

    if state.denylist.is_revoked(claims.jti).await? {
        warn!("Rejected revoked {} token {}", kind.as_str(), claims.jti);
        return Err(ApiError::credentials());
    }

    let user_id = claims.user_id()?;
    let user = state.users().auth_user_by_user_id(user_id).await?.ok_or_else(|| {
        warn!("Token subject {} is missing or inactive", user_id);
        ApiError::credentials()
    })?;

    request.extensions_mut().insert(CurrentUser { user, claims });
    Ok(request)
}

/// Extract the token from `Authorization: Bearer <token>`
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or("missing Authorization header")?
        .to_str()
        .map_err(|_| "Authorization header is not valid ASCII")?;

    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .ok_or("Authorization header must use the Bearer scheme")?
        .trim();

    if token.is_empty() {
        return Err("empty bearer token");
    }
    Ok(token)
}
