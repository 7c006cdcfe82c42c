use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method, Uri},
    routing::get,
    Router,
};
use songbook_db::AppState;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

pub mod api;
pub mod config;
pub mod error;

use config::ServerConfig;
use error::ApiError;

pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Assemble both route surfaces and the middleware stack.
pub fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let basic_routes = Router::new()
        .route(
            "/songs",
            get(api::basic::list_songs).post(api::songs::create_song),
        )
        .route(
            "/songs/{id}",
            get(api::songs::get_song)
                .put(api::basic::update_song)
                .delete(api::basic::delete_song),
        );

    let versioned_routes = Router::new()
        .route(
            "/songs",
            get(api::songs::list_songs).post(api::songs::create_song),
        )
        .route(
            "/songs/{id}",
            get(api::songs::get_song)
                .put(api::songs::update_song)
                .delete(api::songs::delete_song),
        )
        .route("/stats", get(api::stats::get_stats))
        .route("/health", get(api::health::health));

    let prefix = config.api_prefix.clone();
    let unknown_route = move |method: Method, uri: Uri| {
        let available = api::available_endpoints(&prefix);
        async move {
            ApiError::UnknownRoute {
                method: method.to_string(),
                path: uri.path().to_string(),
                available,
            }
        }
    };

    let api_version = HeaderValue::from_str(&state.version)
        .unwrap_or_else(|_| HeaderValue::from_static("unknown"));

    Router::new()
        .route("/", get(api::health::welcome))
        .merge(basic_routes)
        .nest(&config.api_prefix, versioned_routes)
        .fallback(unknown_route)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-api-version"),
            api_version,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

/// Explicit origin list from `CORS_ORIGINS`, or same-origin only.
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let origins: Vec<HeaderValue> = if config.cors_origins.is_empty() {
        let origin = format!("http://{}", config.bind_addr());
        tracing::debug!(%origin, "CORS_ORIGINS not set, allowing same origin only");
        HeaderValue::from_str(&origin).into_iter().collect()
    } else {
        config
            .cors_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect()
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(methods)
        .allow_headers(Any)
        .expose_headers(Any)
}
