use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod auth;
mod config;
mod db;
mod dto;
mod error;
mod handlers;
mod models;
mod services;

use auth::rate_limit::RateLimiter;
use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub rate_limiter: RateLimiter,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fittrack_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env());

    let db = db::create_pool(&config.database_url).await;

    sqlx::migrate!("./migrations").run(&db).await?;
    tracing::info!("Database migrations applied");

    let rate_limiter = RateLimiter::new(config.auth_rate_limit());
    auth::rate_limit::spawn_cleanup_worker(rate_limiter.clone());

    let state = AppState {
        db,
        config: config.clone(),
        rate_limiter,
    };

    let app = app_router(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    // Connect info feeds the per-IP auth rate limiter.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn app_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_auth,
        ));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .merge(auth_routes);

    let protected_routes = Router::new()
        .route("/api/me", get(handlers::auth::me))
        .route("/api/auth/logout", post(handlers::auth::logout))
        // Workout log
        .route(
            "/api/workouts",
            get(handlers::workouts::list_workouts).post(handlers::workouts::create_workout),
        )
        .route(
            "/api/workouts/:id",
            get(handlers::workouts::get_workout)
                .put(handlers::workouts::update_workout)
                .delete(handlers::workouts::delete_workout),
        )
        // Reference data
        .route("/api/workout-types", get(handlers::catalog::list_workout_types))
        .route("/api/exercises", get(handlers::catalog::list_exercises))
        // Custom workout plans
        .route(
            "/api/custom-workouts",
            get(handlers::custom_workouts::list_custom_workouts)
                .post(handlers::custom_workouts::create_custom_workout),
        )
        .route(
            "/api/custom-workouts/:id",
            get(handlers::custom_workouts::get_custom_workout)
                .delete(handlers::custom_workouts::delete_custom_workout),
        )
        // Schedule
        .route(
            "/api/schedule",
            get(handlers::schedule::list_schedule).post(handlers::schedule::create_schedule),
        )
        .route(
            "/api/schedule/:id",
            patch(handlers::schedule::update_completion).delete(handlers::schedule::delete_schedule),
        )
        // Stats
        .route("/api/stats", get(handlers::stats::get_stats))
        // route_layer: unmatched paths fall through to a 404, not a 401.
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let allowed_origins: Vec<HeaderValue> = state
        .config
        .cors_origins()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(hv) => Some(hv),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
