// handlers/protected/users.rs - account listing and profile

use axum::{extract::State, Extension};

use crate::api::{Page, PageRequest};
use crate::database::models::UserView;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

/// GET /users/ - Paginated list of accounts
pub async fn list_users(State(state): State<AppState>, page: PageRequest) -> Result<Page<UserView>, ApiError> {
    let (users, total) = state.users().get_users(page.pagination).await?;
    Ok(page.page(users, total).map(UserView::from))
}

/// GET /users/me - The account the access token belongs to
pub async fn me(Extension(current): Extension<CurrentUser>) -> ApiResult<UserView> {
    Ok(ApiResponse::success(current.user.into()))
}
