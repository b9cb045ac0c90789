// handlers/public/users.rs - POST /users/ handler

use axum::extract::State;

use crate::api::schemas::UserCreate;
use crate::api::ValidatedJson;
use crate::database::models::UserView;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /users/ - Register a new, active account
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<UserCreate>,
) -> ApiResult<UserView> {
    let user = state
        .users()
        .create_user(input, state.config.security.bcrypt_cost)
        .await?;
    Ok(ApiResponse::created(user.into()))
}
