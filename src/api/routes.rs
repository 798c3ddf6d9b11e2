use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::storage::RecordStore;

use super::handlers::{
    create_url, delete_url, get_stats, get_url, health_check, missing_short_code, update_url,
    AppState,
};

pub fn create_api_router(store: RecordStore, config: &ApiConfig) -> Router {
    let state = Arc::new(AppState { store });

    let resource_routes = Router::new()
        .route("/shorten", post(create_url))
        .route(
            "/shorten/",
            get(missing_short_code)
                .put(missing_short_code)
                .delete(missing_short_code),
        )
        .route(
            "/shorten/{short_code}",
            get(get_url).put(update_url).delete(delete_url),
        )
        .route("/shorten/{short_code}/stats", get(get_stats))
        .with_state(state);

    let router = Router::new().route("/health", get(health_check));
    let router = if config.prefix.is_empty() {
        router.merge(resource_routes)
    } else {
        router.nest(&config.prefix, resource_routes)
    };

    router
        .layer(cors_layer(&config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{origin}'");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
