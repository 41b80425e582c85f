use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::auth::form::{AuthFormInput, AuthMode, AuthView};
use crate::errors::AppError;
use crate::models::user::{ProfileUpdate, User};
use crate::state::AppState;

#[derive(Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub user: Option<User>,
}

#[derive(Deserialize)]
pub struct ModeSwitch {
    pub mode: AuthMode,
}

/// GET /api/v1/auth/session
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let session = state.session.current().await;
    Json(SessionResponse {
        authenticated: session.is_some(),
        user: session.map(|s| s.user),
    })
}

/// GET /api/v1/auth/form
pub async fn handle_get_form(State(state): State<AppState>) -> Json<AuthView> {
    Json(state.auth_form.lock().await.view())
}

/// POST /api/v1/auth/mode
pub async fn handle_switch_mode(
    State(state): State<AppState>,
    Json(req): Json<ModeSwitch>,
) -> Json<AuthView> {
    let mut form = state.auth_form.lock().await;
    form.switch_mode(req.mode);
    Json(form.view())
}

/// POST /api/v1/auth/sign-in
pub async fn handle_sign_in(
    State(state): State<AppState>,
    Json(input): Json<AuthFormInput>,
) -> Json<AuthView> {
    let mut form = state.auth_form.lock().await;
    form.sign_in(&state.session, &input).await;
    Json(form.view())
}

/// POST /api/v1/auth/sign-up
pub async fn handle_sign_up(
    State(state): State<AppState>,
    Json(input): Json<AuthFormInput>,
) -> Json<AuthView> {
    let mut form = state.auth_form.lock().await;
    form.sign_up(&state.session, &input).await;
    Json(form.view())
}

/// POST /api/v1/auth/forgot-password
pub async fn handle_forgot_password(
    State(state): State<AppState>,
    Json(input): Json<AuthFormInput>,
) -> Json<AuthView> {
    let mut form = state.auth_form.lock().await;
    form.forgot_password(&state.session, &input).await;
    Json(form.view())
}

/// POST /api/v1/auth/verify
pub async fn handle_verify(
    State(state): State<AppState>,
    Json(input): Json<AuthFormInput>,
) -> Json<AuthView> {
    let mut form = state.auth_form.lock().await;
    form.submit_otp(&state.session, &input).await;
    Json(form.view())
}

/// POST /api/v1/auth/resend-otp
pub async fn handle_resend_otp(
    State(state): State<AppState>,
    Json(input): Json<AuthFormInput>,
) -> Json<AuthView> {
    let mut form = state.auth_form.lock().await;
    form.resend_otp(&state.session, &input).await;
    Json(form.view())
}

/// PUT /api/v1/auth/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.session.update_profile(&update).await?))
}

/// POST /api/v1/auth/logout
pub async fn handle_logout(State(state): State<AppState>) -> StatusCode {
    state.session.logout().await;
    state.auth_form.lock().await.switch_mode(AuthMode::SignIn);
    StatusCode::NO_CONTENT
}
