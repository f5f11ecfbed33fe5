use axum::{
    extract::{Extension, Json, State, rejection::JsonRejection},
    response::IntoResponse,
};

use super::model::{LoginRequest, TokenResponse, VerifyAccessResponse, WelcomeResponse};
use crate::{AppState, error::AppError, middleware::Identity};

pub async fn root() -> impl IntoResponse {
    Json(WelcomeResponse {
        message: "Welcome to the options desk API",
    })
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    tracing::info!(email = %req.email, "Login attempt");

    let Some(user) = state
        .credentials
        .verify_credentials(&req.email, &req.password)
        .await?
    else {
        tracing::info!(email = %req.email, "Login rejected");
        return Err(AppError::Unauthenticated);
    };

    let token = state
        .tokens
        .issue(&user.id, &user.email, state.config.access_token_ttl())
        .map_err(|e| AppError::Internal(format!("failed to sign token: {e}")))?;

    tracing::info!(user_id = %user.id, "Issued session token");
    Ok(Json(TokenResponse::bearer(token)))
}

#[axum::debug_handler]
pub async fn verify_access(Extension(identity): Extension<Identity>) -> Json<VerifyAccessResponse> {
    Json(VerifyAccessResponse {
        message: "Access granted".to_string(),
        user_id: identity.user_id,
        email: identity.email,
    })
}
