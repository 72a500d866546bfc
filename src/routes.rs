use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::config::Config;
use crate::handlers;
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz));

    let protected_routes = Router::new()
        // Habits
        .route(
            "/api/habits",
            get(handlers::habits::list_habits).post(handlers::habits::create_habit),
        )
        .route(
            "/api/habits/:id",
            get(handlers::habits::get_habit)
                .put(handlers::habits::update_habit)
                .delete(handlers::habits::delete_habit),
        )
        .route(
            "/api/habits/date/:date",
            get(handlers::habits::list_habits_for_date),
        )
        // Completions & streaks
        .route(
            "/api/habits/:id/complete",
            post(handlers::completions::complete_habit),
        )
        .route(
            "/api/habits/:id/completions",
            get(handlers::completions::list_habit_completions),
        )
        .route(
            "/api/habits/:id/streak",
            get(handlers::completions::get_streak),
        )
        .route(
            "/api/completions/:id",
            delete(handlers::completions::delete_completion),
        )
        .route(
            "/api/completions/date/:date",
            get(handlers::completions::list_completions_on_date),
        )
        // Moods
        .route(
            "/api/moods",
            get(handlers::moods::list_moods).post(handlers::moods::upsert_mood),
        )
        .route("/api/moods/range", get(handlers::moods::list_moods_in_range))
        .route(
            "/api/moods/statistics",
            get(handlers::moods::get_mood_statistics),
        )
        .route(
            "/api/moods/date/:date",
            get(handlers::moods::get_mood_by_date),
        )
        .route(
            "/api/moods/month/:year/:month",
            get(handlers::moods::list_moods_by_month),
        )
        .route(
            "/api/moods/:id",
            get(handlers::moods::get_mood)
                .put(handlers::moods::update_mood)
                .delete(handlers::moods::delete_mood),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let cors = cors_layer(&state.config);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = std::iter::once(&config.frontend_url)
        .chain(config.cors_extra_origins.iter())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(hv) => Some(hv),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}
