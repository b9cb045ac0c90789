// handlers/protected/active_templates.rs - /active-templates/* handlers

use axum::extract::{Path, State};
use serde_json::Value;

use crate::api::schemas::{ActiveTemplateCreate, ActiveTemplateUpdate};
use crate::api::{Page, PageRequest, ValidatedJson};
use crate::database::models::{ActiveTemplatePageItem, ActiveTemplateView};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /active-templates/ - Paginated assignments, newest first
pub async fn list_active_templates(
    State(state): State<AppState>,
    page: PageRequest,
) -> Result<Page<ActiveTemplatePageItem>, ApiError> {
    let (rows, total) = state.active_templates().list_active_templates(page.pagination).await?;
    Ok(page.page(rows, total).map(ActiveTemplatePageItem::from))
}

/// POST /active-templates/ - Assign a template to a user
pub async fn create_active_template(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<ActiveTemplateCreate>,
) -> ApiResult<ActiveTemplateView> {
    let row = state.active_templates().create_active_template(input).await?;
    Ok(ApiResponse::created(row.into()))
}

/// GET /active-templates/:user_id
pub async fn get_active_template(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<ActiveTemplateView> {
    let user_id = parse_user_id(&user_id)?;
    let row = state.active_templates().get_active_template(user_id).await?;
    Ok(ApiResponse::success(row.into()))
}

/// PUT /active-templates/:user_id - Point the user at another template
pub async fn update_active_template(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ValidatedJson(input): ValidatedJson<ActiveTemplateUpdate>,
) -> ApiResult<ActiveTemplateView> {
    let user_id = parse_user_id(&user_id)?;
    let row = state.active_templates().update_active_template(user_id, input).await?;
    Ok(ApiResponse::success(row.into()))
}

/// DELETE /active-templates/:user_id
pub async fn delete_active_template(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Value> {
    let user_id = parse_user_id(&user_id)?;
    state.active_templates().delete_active_template(user_id).await?;
    Ok(ApiResponse::message("Active template removed"))
}

fn parse_user_id(raw: &str) -> Result<i32, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid user_id '{}': must be an integer", raw)))
}
