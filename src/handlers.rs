use crate::errors::AppError;
use crate::models::{
    StartDateResponse, StatsResponse, TaskCompletionRecord, ToggleRequest, ToggleResponse,
    START_DATE_KEY,
};
use crate::progress;
use crate::schedule::Schedule;
use crate::state::{AppState, Session};
use crate::stats::build_stats;
use crate::ui::{render_index, MANIFEST_JSON, SERVICE_WORKER_JS};
use axum::{
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse, Redirect},
    Json,
};
use chrono::{Local, Utc};
use tracing::error;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let mut session = state.session.lock().await;

    if let Err(err) = progress::ensure_start_date(&mut session.store, Utc::now()).await {
        error!("failed to record start date: {err}");
    }
    session.reload(&state.schedule);

    let stats = build_stats(&session.view);
    let today = Local::now().date_naive();
    Html(render_index(
        &state.schedule,
        &session.view,
        &stats,
        state.schedule.active_day_id(today),
    ))
}

pub async fn toggle(
    State(state): State<AppState>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, AppError> {
    let task_id = payload.task_id.trim();
    if task_id.is_empty() || !state.schedule.contains_task(task_id) {
        return Err(AppError::bad_request(format!("unknown task id '{task_id}'")));
    }

    let mut session = state.session.lock().await;
    let stats = apply_toggle(&mut session, task_id, payload.completed).await;

    Ok(Json(ToggleResponse {
        task_id: task_id.to_string(),
        completed: payload.completed,
        stats,
    }))
}

pub async fn toggle_form(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Redirect, AppError> {
    let mut session = state.session.lock().await;
    let Some(completed) = session.view.flip(&task_id) else {
        return Err(AppError::bad_request(format!("unknown task id '{task_id}'")));
    };
    // The view already holds the flipped value.
    apply_toggle(&mut session, &task_id, completed).await;
    Ok(Redirect::to("/"))
}

pub async fn get_progress(State(state): State<AppState>) -> Json<Vec<TaskCompletionRecord>> {
    let session = state.session.lock().await;
    Json(session.store.get_all_completions())
}

pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let session = state.session.lock().await;
    Json(build_stats(&session.view))
}

pub async fn get_schedule(State(state): State<AppState>) -> Json<Schedule> {
    Json(state.schedule.as_ref().clone())
}

pub async fn get_start_date(State(state): State<AppState>) -> Json<StartDateResponse> {
    let session = state.session.lock().await;
    Json(StartDateResponse {
        start_date: session
            .store
            .get_setting(START_DATE_KEY)
            .map(|setting| setting.value),
    })
}

pub async fn service_worker() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        SERVICE_WORKER_JS,
    )
}

pub async fn manifest() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/manifest+json")], MANIFEST_JSON)
}

/// Updates the view, persists the change and recomputes stats. Persistence
/// failures are logged; the toggle still shows on the page.
async fn apply_toggle(session: &mut Session, task_id: &str, completed: bool) -> StatsResponse {
    session.view.set_completed(task_id, completed);
    if let Err(err) = progress::toggle(&mut session.store, task_id, completed, Utc::now()).await {
        error!(task_id, "failed to save progress: {err}");
    }
    build_stats(&session.view)
}
