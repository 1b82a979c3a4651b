//! Router assembly: `/api` endpoints, static SPA shell, and HTTP layers

use std::path::Path;
use std::time::Instant;

use axum::Router;
use axum::extract::{MatchedPath, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// All JSON endpoints, relative to `/api`
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/check-milestone/{project_id}", get(handlers::check_milestone))
        .route(
            "/projects",
            get(handlers::list_projects).post(handlers::save_project),
        )
        .route("/projects/{id}", get(handlers::get_project))
        .route("/projects/owner/{address}", get(handlers::projects_by_owner))
        .route("/projects/search/{query}", get(handlers::search_projects))
        .route("/stakes", post(handlers::save_stake))
        .route("/stakes/project/{id}", get(handlers::stakes_by_project))
        .route("/stakes/user/{address}", get(handlers::stakes_by_user))
        .route("/withdrawals", post(handlers::save_withdrawal))
        .route("/withdrawals/user/{address}", get(handlers::withdrawals_by_user))
        .route("/withdrawals/project/{id}", get(handlers::withdrawals_by_project))
        .route("/stats", get(handlers::platform_stats))
        .route("/stats/user/{address}", get(handlers::user_stats))
        .route("/activity/recent", get(handlers::recent_activity))
        .route_layer(middleware::from_fn(track_metrics))
        .fallback(handlers::api_not_found)
        .with_state(state)
}

/// Full application: API under `/api`, everything else served from `static_dir`
/// with `index.html` as the SPA fallback
pub fn app(state: AppState, static_dir: &Path) -> Router {
    let spa = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .nest("/api", api_router(state))
        .fallback_service(spa)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let response = next.run(req).await;

    monitoring::record_http_request(
        &method,
        &route,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}
