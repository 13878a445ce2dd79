use super::AppState;
use crate::cycle::CycleOptions;
use crate::diagnostics::health;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct TriggerQuery {
    #[serde(default)]
    dry_run: bool,
}

fn cycle_options(state: &AppState, query: &TriggerQuery) -> CycleOptions {
    CycleOptions {
        mode: state.config.rewrite.mode,
        language: state.config.rewrite.language.clone(),
        dry_run: query.dry_run,
    }
}

fn busy_response() -> Response {
    (
        StatusCode::CONFLICT,
        Json(serde_json::json!({"error": "a cycle is already in flight"})),
    )
        .into_response()
}

/// GET /health — process liveness and last-cycle snapshot.
pub(super) async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "runtime": health::snapshot_json(),
    }))
}

/// POST /cycle — trigger a sweep over every configured target.
pub(super) async fn handle_run_all(
    State(state): State<AppState>,
    Query(query): Query<TriggerQuery>,
) -> Response {
    let Some(slot) = state.guard.try_acquire() else {
        return busy_response();
    };

    let options = cycle_options(&state, &query);
    tracing::info!(dry_run = options.dry_run, "cycle triggered via gateway");
    let report = state.driver.run_cycle(&state.config.targets, &options).await;
    health::record_cycle(&report);
    drop(slot);

    (StatusCode::OK, Json(report)).into_response()
}

/// POST /cycle/{id} — trigger a cycle for a single target.
pub(super) async fn handle_run_target(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<TriggerQuery>,
) -> Response {
    let Some(target) = state.config.targets.iter().find(|t| t.id == id).cloned() else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": format!("no configured target with id {id}")})),
        )
            .into_response();
    };

    let Some(slot) = state.guard.try_acquire() else {
        return busy_response();
    };

    let options = cycle_options(&state, &query);
    tracing::info!(target_id = id, dry_run = options.dry_run, "single-target cycle triggered via gateway");
    let report = state.driver.run_cycle(&[target], &options).await;
    health::record_cycle(&report);
    drop(slot);

    (StatusCode::OK, Json(report)).into_response()
}
