//! Liveness and statistics handlers.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::db::UserRepository;
use crate::file::FileRepository;
use crate::web::dto::{StatsResponse, StatusResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET /status - Report store liveness.
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let db = sqlx::query("SELECT 1")
        .execute(state.db.pool())
        .await
        .is_ok();

    // The session store is in-process; reachable whenever we are
    Json(StatusResponse { sessions: true, db })
}

/// GET /stats - Report user and file counts.
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, ApiError> {
    let users = UserRepository::new(state.db.pool()).count().await?;
    let files = FileRepository::new(state.db.pool()).count().await?;

    Ok(Json(StatsResponse { users, files }))
}
