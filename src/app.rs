use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/tasks/:task_id/toggle", post(handlers::toggle_form))
        .route("/api/progress", get(handlers::get_progress).post(handlers::toggle))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/schedule", get(handlers::get_schedule))
        .route("/api/settings/start-date", get(handlers::get_start_date))
        .route("/sw.js", get(handlers::service_worker))
        .route("/manifest.json", get(handlers::manifest))
        .with_state(state)
}
