//! Readiness check against the configured storage backend.

use crate::state::{AppState, Storage};
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};
use database::postgres::check_health;

/// Reports `"connected"` after a Postgres ping, or `"in_memory"` for the in-memory store.
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "database",
        Box::pin(async {
            match &state.storage {
                Storage::InMemory(_) => Ok("in_memory"),
                Storage::Postgres(db) => check_health(db)
                    .await
                    .map(|_| "connected")
                    .map_err(|e| e.to_string()),
            }
        }),
    )];

    run_health_checks(checks).await.into_response()
}
