//! Axum route handlers for the screening session API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::screening::flow;
use crate::screening::models::{CandidateProfile, Step};
use crate::screening::prompts::WELCOME_MESSAGE;
use crate::screening::store::SessionSlot;
use crate::screening::view::{Notice, View};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub view: View,
}

/// POST /api/v1/sessions
///
/// Starts a new screening session in the intake step.
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let session = state.sessions.create().await;
    let active_sessions = state.sessions.len().await;
    info!(session_id = %session.id, active_sessions, "Session started");

    let view = View::render(&session, &[Notice::info(WELCOME_MESSAGE)], None);
    (
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: session.id,
            view,
        }),
    )
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<View>, AppError> {
    let slot = find_session(&state, id).await?;
    let session = slot.lock().await;
    Ok(Json(View::render(&session, &[], None)))
}

/// POST /api/v1/sessions/:id/submit
///
/// Submits the intake form. Validation and generation failures come back as a 200
/// with the error inside the view; the session is already back in a usable step.
///
/// The session is stored in `Generating` and unlocked before the model is called, so
/// readers see the 50% step while questions are generated and a second submit is
/// rejected by the step check.
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(profile): Json<CandidateProfile>,
) -> Result<Json<View>, AppError> {
    let slot = find_session(&state, id).await?;

    let submitted = {
        let mut session = slot.lock().await;
        let transition = flow::submit(session.clone(), profile)?;
        *session = transition.state.clone();
        transition
    };
    if submitted.state.step != Step::Generating {
        return Ok(Json(submitted.view()));
    }

    let generated = state.flow.generate(submitted.state.clone()).await?;
    *slot.lock().await = generated.state.clone();

    Ok(Json(submitted.followed_by(generated).view()))
}

/// POST /api/v1/sessions/:id/end
pub async fn handle_end(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<View>, AppError> {
    let slot = find_session(&state, id).await?;
    let mut session = slot.lock().await;

    let transition = flow::end_conversation(session.clone())?;
    *session = transition.state.clone();

    Ok(Json(transition.view()))
}

/// DELETE /api/v1/sessions/:id
///
/// Discards the session entirely; the client starts over with a new one.
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.remove(id).await {
        return Err(AppError::NotFound(format!("Session {id} not found")));
    }
    info!(session_id = %id, "Session discarded");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_session(state: &AppState, id: Uuid) -> Result<SessionSlot, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}
