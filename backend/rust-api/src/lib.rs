use axum::{
    http::{header, HeaderName, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;

pub use config::Config;
pub use services::AppState;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    // The browser client is served from another origin.
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(middlewares::trace::TRACE_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(middlewares::trace::TRACE_ID_HEADER)])
        .allow_origin(tower_http::cors::Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/api/v1", api_routes())
        .with_state(app_state)
        .layer(middleware::from_fn(
            middlewares::trace::trace_context_middleware,
        ))
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/progress", get(handlers::progress::get_progress))
        .nest("/progress", progress_routes())
        .route("/sessions", post(handlers::sessions::create_session))
        .nest("/sessions", sessions_routes())
        .route("/questions", get(handlers::questions::get_question))
        .route("/tables/{table}", get(handlers::questions::get_table))
        .route("/challenges", get(handlers::questions::list_challenges))
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
        .route(
            "/preferences",
            get(handlers::preferences::get_preferences)
                .put(handlers::preferences::update_preferences),
        )
}

fn progress_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/attempts", post(handlers::progress::record_attempt))
        .route("/badges", post(handlers::progress::add_badge))
        .route("/difficulty", put(handlers::progress::set_difficulty))
        .route("/reset", post(handlers::progress::reset_progress))
}

fn sessions_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/{id}",
            get(handlers::sessions::get_session).delete(handlers::sessions::abandon_session),
        )
        .route("/{id}/start", post(handlers::sessions::start_session))
        .route("/{id}/answers", post(handlers::sessions::submit_answer))
        .route("/{id}/flips", post(handlers::sessions::flip_card))
        .route("/{id}/tick", post(handlers::sessions::tick_session))
        .route("/{id}/stream", get(handlers::sse::session_stream))
}
