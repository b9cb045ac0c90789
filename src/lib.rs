pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Build the full HTTP application around `state`.
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        .merge(public_routes())
        .merge(access_routes(state.clone()))
        .merge(refresh_routes(state.clone()))
        .fallback(|| async { ApiError::not_found("Resource not found") })
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes))
        .layer(cors_layer(&state.config));

    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/token/", post(public::login))
        .route("/users/", post(public::create_user))
}

fn access_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::{active_templates, templates, tokens, users};
    use middleware::require_access_token;

    Router::new()
        .route("/access/revoke/", delete(tokens::revoke_access))
        .route("/users/", get(users::list_users))
        .route("/users/me", get(users::me))
        .route(
            "/templates/",
            get(templates::list_templates).post(templates::create_template),
        )
        .route(
            "/templates/:id",
            get(templates::get_template)
                .put(templates::update_template)
                .delete(templates::delete_template),
        )
        .route("/templates/:id/restore", post(templates::restore_template))
        .route(
            "/active-templates/",
            get(active_templates::list_active_templates).post(active_templates::create_active_template),
        )
        .route(
            "/active-templates/:user_id",
            get(active_templates::get_active_template)
                .put(active_templates::update_active_template)
                .delete(active_templates::delete_active_template),
        )
        .route_layer(from_fn_with_state(state, require_access_token))
}

fn refresh_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::tokens;
    use middleware::require_refresh_token;

    Router::new()
        .route("/token/refresh/", post(tokens::refresh))
        .route("/refresh/revoke/", delete(tokens::revoke_refresh))
        .route_layer(from_fn_with_state(state, require_refresh_token))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = &config.security.cors_origins;
    let allow_origin = if origins.iter().any(|o| o == "*") {
        // credentials cannot be combined with a literal wildcard
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        }))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-requested-with"),
            HeaderName::from_static("x-requested-by"),
        ])
        .allow_credentials(true)
}
