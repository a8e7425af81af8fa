use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
    Router,
};
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_user_auth,
    security_headers_middleware, trace_id, RateLimiterState, UserAuth,
};
use crate::routes::{
    admin, admin_users, auth, expenses, health, notifications, projects, receipts, requests,
    valley_requests,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    /// Signing and verification keys, parsed once at startup.
    pub jwt: Arc<JwtConfig>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

pub fn create_app(config: Config, pool: PgPool) -> Result<Router, JwtError> {
    let config = Arc::new(config);

    let jwt = Arc::new(UserAuth::create_jwt_config(&config.jwt)?);

    let rate_limiter = RateLimiterState::new(config.security.rate_limit_per_minute).map(Arc::new);

    let state = AppState {
        pool,
        config: config.clone(),
        jwt,
        rate_limiter,
    };

    let cors = if config.security.cors_origins.is_empty() {
        // Development: allow any origin
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Bearer JWT required. Auth runs first, then rate limiting keyed by user.
    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth::me))
        // Travel requests
        .route(
            "/api/requests",
            get(requests::list_requests).post(requests::create_request),
        )
        .route(
            "/api/requests/:id",
            get(requests::get_request)
                .patch(requests::update_status)
                .delete(requests::delete_request),
        )
        .route(
            "/api/requests/:id/expenses",
            patch(requests::submit_expenses),
        )
        // In-valley requests
        .route(
            "/api/valley-requests",
            get(valley_requests::list_requests).post(valley_requests::create_request),
        )
        .route(
            "/api/valley-requests/:id",
            get(valley_requests::get_request)
                .patch(valley_requests::update_status)
                .delete(valley_requests::delete_request),
        )
        // Expense items and receipts
        .route(
            "/api/expenses",
            get(expenses::list_travel_expenses).post(expenses::add_travel_expense),
        )
        .route(
            "/api/valley-expenses",
            get(expenses::list_valley_expenses).post(expenses::add_valley_expense),
        )
        .route("/api/receipts", get(receipts::list_receipts))
        .route("/api/receipts/upload", post(receipts::upload_receipt))
        // Projects and budgets
        .route(
            "/api/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/api/budgets",
            get(projects::list_budgets).post(projects::create_budget),
        )
        // Notifications
        .route("/api/notifications", get(notifications::list_notifications))
        .route(
            "/api/notifications/read-all",
            post(notifications::mark_all_read),
        )
        .route(
            "/api/notifications/:id/read",
            patch(notifications::mark_read),
        )
        // Admin; the AdminUser extractor enforces the role
        .nest("/api/admin/users", admin_users::router())
        .route("/api/admin/stats", get(admin::get_admin_stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/api/auth/login", post(auth::login))
        .route("/metrics", get(metrics_handler));

    Ok(Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TEST_PRIVATE_KEY, TEST_PUBLIC_KEY};
    use sqlx::postgres::PgPoolOptions;

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_app_parses_keys_up_front() {
        let config = Config::load_for_test(&[]).unwrap();
        let result = create_app(config, lazy_pool());
        assert!(matches!(result, Err(JwtError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_create_app_with_valid_keys() {
        let config = Config::load_for_test(&[
            ("jwt.private_key", TEST_PRIVATE_KEY),
            ("jwt.public_key", TEST_PUBLIC_KEY),
        ])
        .unwrap();
        assert!(create_app(config, lazy_pool()).is_ok());
    }
}
