use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use serde_json::{json, Value};
use crate::api::auth::bearer_token;
use crate::api::models::{ResetPasswordRequest, SignInRequest, SignUpRequest};
use crate::api::AppState;
use crate::auth::{AuthSession, Profile};
use crate::errors::CiphertraceError;

pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<AuthSession>, CiphertraceError> {
    Ok(Json(state.auth.sign_in(&req.email, &req.password).await?))
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<Profile>), CiphertraceError> {
    let profile = state.auth.sign_up(&req.email, &req.password, req.metadata()).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, CiphertraceError> {
    if let Some(token) = bearer_token(&headers) {
        state.auth.sign_out(token).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<(StatusCode, Json<Value>), CiphertraceError> {
    state.auth.reset_password(&req.email).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({"status": "accepted", "message": "If the address is registered, a reset link is on its way"})),
    ))
}

pub async fn current_session(Extension(profile): Extension<Profile>) -> Json<Profile> {
    Json(profile)
}
