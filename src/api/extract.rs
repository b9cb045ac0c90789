use async_trait::async_trait;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::{request::Parts, StatusCode, Uri},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use super::pagination::{Page, PageParams, Pagination};
use crate::error::ApiError;
use crate::state::AppState;

/// JSON body that has been deserialized and passed `Validate`.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonSyntaxError(e) => ApiError::invalid_json(e.body_text()),
            JsonRejection::JsonDataError(e) => ApiError::invalid_field("body", e.body_text()),
            JsonRejection::MissingJsonContentType(e) => ApiError::bad_request(e.body_text()),
            other if other.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                ApiError::PayloadTooLarge(other.body_text())
            }
            other => ApiError::bad_request(other.body_text()),
        }
    }
}

/// `Query` whose rejection renders as a 422 envelope.
#[derive(Debug, Clone)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| ApiError::invalid_field("query", rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Resolved `page`/`size` plus the request URI for building links.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub pagination: Pagination,
    pub uri: Uri,
}

impl PageRequest {
    pub fn page<T>(&self, items: Vec<T>, total: i64) -> Page<T> {
        Page::new(items, total, self.pagination).with_links(&self.uri)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for PageRequest {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let ApiQuery(params) = ApiQuery::<PageParams>::from_request_parts(parts, state).await?;
        let pagination = Pagination::resolve(params, &state.config.pagination)?;
        Ok(Self {
            pagination,
            uri: parts.uri.clone(),
        })
    }
}
