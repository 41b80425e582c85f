use axum::{extract::State, Json};
use serde::Deserialize;

use crate::alerts::{SubscribeForm, UnsubscribeForm};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub email: String,
    pub category_id: i64,
}

#[derive(Deserialize)]
pub struct UnsubscribeBody {
    pub token: Option<String>,
    pub email: Option<String>,
}

/// POST /api/v1/job-alerts/subscribe
pub async fn handle_subscribe(
    State(state): State<AppState>,
    Json(req): Json<SubscribeRequest>,
) -> Json<SubscribeForm> {
    let mut form = SubscribeForm::new(req.email);
    form.submit(state.alerts.as_ref(), req.category_id).await;
    Json(form)
}

/// POST /api/v1/job-alerts/unsubscribe
/// A token (from the alert email link) wins over an email address.
pub async fn handle_unsubscribe(
    State(state): State<AppState>,
    Json(req): Json<UnsubscribeBody>,
) -> Json<UnsubscribeForm> {
    let mut form = UnsubscribeForm::default();
    match req.token.filter(|t| !t.trim().is_empty()) {
        Some(token) => form.submit_token(state.alerts.as_ref(), &token).await,
        None => {
            form.email = req.email.unwrap_or_default();
            form.submit_email(state.alerts.as_ref()).await;
        }
    }
    Json(form)
}
