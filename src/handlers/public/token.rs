// handlers/public/token.rs - POST /token/ handler

use axum::extract::State;
use tracing::{info, warn};

use crate::api::schemas::UserLogin;
use crate::api::ValidatedJson;
use crate::auth::{issue_token_pair, TokenPair};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /token/ - Exchange username and password for an access/refresh pair
///
/// ```json
/// { "success": true, "data": { "access_token": "...", "refresh_token": "...", "token_type": "bearer", "expires_in": 900 } }
/// ```
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<UserLogin>,
) -> ApiResult<TokenPair> {
    let user = state
        .users()
        .auth_user(&input.username, &input.password)
        .await?
        .ok_or_else(|| {
            warn!("Failed login for username {}", input.username);
            ApiError::bad_request("Incorrect username or password")
        })?;

    let pair = issue_token_pair(user.id, &state.config.security)?;
    info!("User {} logged in", user.id);
    Ok(ApiResponse::success(pair))
}
