use axum::{
    http::Uri,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::PaginationConfig;
use crate::error::ApiError;

/// Raw `?page=&size=` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

/// Validated page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub size: u32,
}

impl Pagination {
    pub fn resolve(params: PageParams, config: &PaginationConfig) -> Result<Self, ApiError> {
        let page = params.page.unwrap_or(1);
        if page < 1 {
            return Err(ApiError::invalid_field("page", "must be greater than or equal to 1"));
        }

        let size = params.size.unwrap_or(config.default_size as i64);
        if size < 1 || size > config.max_size as i64 {
            return Err(ApiError::invalid_field(
                "size",
                format!("must be between 1 and {}", config.max_size),
            ));
        }

        let page = u32::try_from(page).map_err(|_| ApiError::invalid_field("page", "out of range"))?;
        Ok(Self { page, size: size as u32 })
    }

    pub fn limit(&self) -> i64 {
        self.size as i64
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.size as i64
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PageLinks {
    pub first: Option<String>,
    pub last: Option<String>,
    #[serde(rename = "self")]
    pub current: Option<String>,
    pub next: Option<String>,
    pub prev: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub page: u32,
    pub size: u32,
    pub pages: u32,
}

/// One page of results plus the navigation links rendered with it.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
    pub links: PageLinks,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: Pagination) -> Self {
        let total = total.max(0);
        let size = pagination.size.max(1) as i64;
        let pages = ((total + size - 1) / size) as u32;
        Self {
            items,
            meta: PageMeta {
                total,
                page: pagination.page,
                size: pagination.size,
                pages,
            },
            links: PageLinks::default(),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
            links: self.links,
        }
    }

    /// Fill `links` from the request URI, keeping every query parameter
    /// other than `page` and `size`.
    pub fn with_links(mut self, uri: &Uri) -> Self {
        let path = uri.path();
        let kept: Vec<(String, String)> = url::form_urlencoded::parse(uri.query().unwrap_or("").as_bytes())
            .filter(|(key, _)| key != "page" && key != "size")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        let size = self.meta.size;
        let link = |page: u32| -> String {
            let mut query = url::form_urlencoded::Serializer::new(String::new());
            for (key, value) in &kept {
                query.append_pair(key, value);
            }
            query.append_pair("page", &page.to_string());
            query.append_pair("size", &size.to_string());
            format!("{}?{}", path, query.finish())
        };

        let page = self.meta.page;
        let last = self.meta.pages.max(1);
        self.links = PageLinks {
            first: Some(link(1)),
            last: Some(link(last)),
            current: Some(link(page)),
            next: (page < self.meta.pages).then(|| link(page + 1)),
            prev: (page > 1).then(|| link(page - 1)),
        };
        self
    }
}

impl<T: Serialize> IntoResponse for Page<T> {
    fn into_response(self) -> Response {
        Json(json!({
            "success": true,
            "data": self.items,
            "meta": self.meta,
            "links": self.links,
        }))
        .into_response()
    }
}
