pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod state;
pub mod utils;
pub mod validation;

use axum::{
    http::{HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Assembles the full application router: public pages, the gated
/// dashboard/admin surfaces, and the shared middleware stack. The session
/// gate is layered over everything and filters by path prefix itself.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::home::home))
        .route("/403", get(handlers::home::forbidden))
        .route("/listings", get(handlers::listings::list_listings))
        .route("/listings/{id}", get(handlers::listings::get_listing))
        .route("/blog", get(handlers::blog::list_posts))
        .route("/blog/{slug}", get(handlers::blog::get_post))
        .route("/contact", post(handlers::contact::submit_contact))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/session", post(handlers::auth::refresh_session))
        .route("/api/auth/me", get(handlers::auth::me));

    let dashboard_routes = Router::new()
        .route("/dashboard", get(handlers::dashboard::overview))
        .route(
            "/dashboard/listings",
            get(handlers::dashboard::my_listings).post(handlers::dashboard::create_listing),
        )
        .route(
            "/dashboard/listings/{id}",
            put(handlers::dashboard::update_listing).delete(handlers::dashboard::delete_listing),
        )
        .route(
            "/dashboard/posts",
            get(handlers::dashboard::my_posts).post(handlers::dashboard::create_post),
        )
        .route(
            "/dashboard/posts/{id}",
            put(handlers::dashboard::update_post).delete(handlers::dashboard::delete_post),
        );

    let admin_routes = Router::new()
        .route(
            "/admin/users",
            get(handlers::admin::users::list_users).post(handlers::admin::users::create_user),
        )
        .route(
            "/admin/users/{id}",
            put(handlers::admin::users::update_user).delete(handlers::admin::users::delete_user),
        )
        .route("/admin/pending", get(handlers::admin::content::pending_content))
        .route(
            "/admin/listings/{id}/approve",
            put(handlers::admin::content::approve_listing),
        )
        .route(
            "/admin/posts/{id}/approve",
            put(handlers::admin::content::approve_post),
        )
        .route(
            "/admin/activities",
            get(handlers::admin::activities::list_activities),
        );

    let cors_origins: Vec<HeaderValue> = state
        .config
        .cors_allow_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    Router::new()
        .merge(public_routes)
        .merge(dashboard_routes)
        .merge(admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(AllowOrigin::list(cors_origins))
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PUT,
                            Method::DELETE,
                            Method::OPTIONS,
                        ])
                        .allow_headers(Any),
                )
                .layer(axum_middleware::from_fn(middleware::request_id))
                .layer(axum_middleware::from_fn(middleware::log_error_responses))
                .layer(axum_middleware::from_fn_with_state(
                    state.clone(),
                    middleware::session_gate,
                )),
        )
        .with_state(state)
}
