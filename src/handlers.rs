use crate::config::Config;
use crate::errors::AppError;
use crate::matchmaking::MatchmakingService;
use crate::match_storage::MatchStorage;
use crate::webhook_models::MatchmakingResponse;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Application configuration.
    pub config: Config,
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-match-api",
            "version": "0.1.0"
        })),
    )
}

/// One active match from the requesting user's point of view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    /// The other participant of the pair.
    pub matched_user_id: String,
    pub score: i32,
    pub matched_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveMatchesResponse {
    pub user_id: String,
    pub total: usize,
    pub matches: Vec<MatchView>,
}

/// GET /api/v1/users/:user_id/matches
///
/// Returns the user's current active matches, best score first. Canonical
/// pair rows are unfolded so the caller always sees the counterpart id.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `user_id` - The user whose active matches to list.
pub async fn get_matches(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ActiveMatchesResponse>, AppError> {
    tracing::info!("GET /users/{}/matches", user_id);

    let storage = MatchStorage::new(state.db.clone());
    let records = storage.fetch_active_matches(&user_id).await?;

    let matches: Vec<MatchView> = records
        .iter()
        .map(|r| MatchView {
            matched_user_id: r.counterpart(&user_id).to_string(),
            score: r.score,
            matched_at: r.created_at,
        })
        .collect();

    Ok(Json(ActiveMatchesResponse {
        total: matches.len(),
        user_id,
        matches,
    }))
}

/// POST /api/v1/matchmaking/:user_id
///
/// Manually triggered rebuild for a user whose profile is already in the
/// store. Same path as the webhook rebuild, minus the trigger payload: the
/// stored profile is fetched and the match set replaced atomically.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `user_id` - The user whose match set to rebuild.
pub async fn rebuild_matches(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<(StatusCode, Json<MatchmakingResponse>), AppError> {
    tracing::info!("POST /matchmaking/{}", user_id);

    if user_id.trim().is_empty() {
        return Err(AppError::BadRequest("User id required".to_string()));
    }

    let storage = MatchStorage::new(state.db.clone());
    let requester = storage
        .fetch_profile(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No profile found for user {}", user_id)))?;

    let service = MatchmakingService::new(state.db.clone());
    let matches_written = service.rebuild(&user_id, &requester).await?;

    Ok((
        StatusCode::OK,
        Json(MatchmakingResponse::rebuilt(matches_written)),
    ))
}
