use crate::errors::AppError;
use crate::handlers::AppState;
use crate::matchmaking::MatchmakingService;
use crate::webhook_models::{MatchmakingResponse, ProfileChangeEvent};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;

/// Profile-change webhook
///
/// Receives profile created/updated events from the dispatcher. Validates the
/// webhook secret, checks the payload, and rebuilds the requester's match set
/// when the event asks for it.
///
/// Expected payload: single profile-change event with `triggerMatchmaking`
/// Authentication: X-Webhook-Token header must match WEBHOOK_SECRET env var
///
/// The rebuild runs synchronously: the caller blocks until scoring and the
/// replacement transaction complete or fail, so a 200 means the new match set
/// is durable. Retries, if any, are the dispatcher's responsibility.
pub async fn profile_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(event): Json<ProfileChangeEvent>,
) -> Result<(StatusCode, Json<MatchmakingResponse>), AppError> {
    tracing::info!("Received profile-change webhook");

    // 1. Validate webhook secret (if configured)
    validate_webhook_secret(&state, &headers)?;

    // 2. Profile updates that are not matchmaking requests must not clear
    //    existing matches: report success without touching any match row.
    if !event.trigger_matchmaking {
        tracing::debug!(
            "Profile event for user {} without matchmaking trigger; no-op",
            event.requester_id
        );
        return Ok((StatusCode::OK, Json(MatchmakingResponse::skipped())));
    }

    // 3. Input errors are rejected before any persistence is attempted
    event.validate().map_err(AppError::BadRequest)?;

    let requester_id = event.requester_id.clone();
    let requester = event.into_profile();

    // 4. Rebuild; zero surviving candidates is still a success
    let service = MatchmakingService::new(state.db.clone());
    let matches_written = service.rebuild(&requester_id, &requester).await?;

    tracing::info!(
        "Webhook rebuild complete for user {}: {} match(es) written",
        requester_id,
        matches_written
    );

    Ok((
        StatusCode::OK,
        Json(MatchmakingResponse::rebuilt(matches_written)),
    ))
}

/// Validate webhook secret from X-Webhook-Token header
fn validate_webhook_secret(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    // If no secret is configured, skip validation (warn was already logged at startup)
    let Some(ref expected_secret) = state.config.webhook_secret else {
        return Ok(());
    };

    let token = headers
        .get("X-Webhook-Token")
        .or_else(|| headers.get("x-webhook-token"))
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing X-Webhook-Token header".to_string()))?;

    // Constant-time comparison to prevent timing attacks
    if !constant_time_compare(token, expected_secret) {
        tracing::warn!("Invalid webhook token received");
        return Err(AppError::Unauthorized("Invalid webhook token".to_string()));
    }

    Ok(())
}

/// Constant-time string comparison (basic implementation)
/// For production, consider using a crypto library like `subtle`
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.as_bytes()
        .iter()
        .zip(b.as_bytes().iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
