use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    AppState,
    config::Config,
    middleware::{auth_middleware, log_errors},
    routes,
};

pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new().route("/login", post(routes::auth::login));

    // Every route past login runs the full token + plan check.
    let protected_routes = Router::new()
        .route("/verify-access", get(routes::auth::verify_access))
        .route("/account", get(routes::account::account))
        .route("/account-data", get(routes::account::account_data))
        .route(
            "/place-option-trade",
            post(routes::trade::place_option_trade),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api = Router::new().merge(public_routes).merge(protected_routes);
    let base_uri = state.config.api_base_uri.clone();
    let router = if base_uri.is_empty() {
        Router::new().merge(api)
    } else {
        Router::new().nest(&base_uri, api)
    };

    router
        .route("/", get(routes::auth::root))
        .layer(axum::middleware::from_fn(log_errors))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .with_state(state)
}

/// Only the configured frontend origin may call the API cross-origin.
pub fn cors_layer(config: &Config) -> CorsLayer {
    match HeaderValue::from_str(&config.cors_origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request()),
        Err(_) => {
            tracing::warn!(origin = %config.cors_origin, "Invalid CORS origin, cross-origin requests disabled");
            CorsLayer::new()
        }
    }
}
