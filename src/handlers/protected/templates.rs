// handlers/protected/templates.rs - /templates/* handlers
//
// Every operation is scoped to the caller: a template owned by someone else
// is reported as not found.

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::api::schemas::{TemplateCreate, TemplateListQuery, TemplateUpdate};
use crate::api::{ApiQuery, Page, PageRequest, ValidatedJson};
use crate::database::models::Template;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

/// GET /templates/ - Live templates, newest first
///
/// Filters: `channel_id`, `account_id`, `division_id` (exact) and `search`
/// (case-insensitive match on `template_name`).
pub async fn list_templates(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiQuery(filter): ApiQuery<TemplateListQuery>,
    page: PageRequest,
) -> Result<Page<Template>, ApiError> {
    let (templates, total) = state
        .templates()
        .list_templates(current.user.id, &filter, page.pagination)
        .await?;
    Ok(page.page(templates, total))
}

/// POST /templates/ - Create a template with a client-chosen id
pub async fn create_template(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(input): ValidatedJson<TemplateCreate>,
) -> ApiResult<Template> {
    let template = state.templates().create_template(current.user.id, input).await?;
    Ok(ApiResponse::created(template))
}

/// GET /templates/:id
pub async fn get_template(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Template> {
    let template = state.templates().get_template(current.user.id, &id).await?;
    Ok(ApiResponse::success(template))
}

/// PUT /templates/:id - Change only the fields present in the body
pub async fn update_template(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<TemplateUpdate>,
) -> ApiResult<Template> {
    let template = state.templates().update_template(current.user.id, &id, input).await?;
    Ok(ApiResponse::success(template))
}

/// DELETE /templates/:id - Soft delete; also unassigns the template
pub async fn delete_template(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Template> {
    let template = state.templates().delete_template(current.user.id, &id).await?;
    Ok(ApiResponse::success(template))
}

/// POST /templates/:id/restore - Undo a soft delete
pub async fn restore_template(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Template> {
    let template = state.templates().restore_template(current.user.id, &id).await?;
    Ok(ApiResponse::success(template))
}
