use std::sync::Arc;

use tokio::sync::Mutex;

use crate::alerts::AlertBackend;
use crate::auth::form::AuthForm;
use crate::auth::session::SessionManager;
use crate::errors::AppError;
use crate::export::PdfExporter;
use crate::resume::store::ResumeStore;
use crate::templates::fetcher::TemplateFetcher;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionManager>,
    /// Login page view-model. Held for the whole submit so submissions are serialized.
    pub auth_form: Arc<Mutex<AuthForm>>,
    pub resumes: Arc<ResumeStore>,
    pub alerts: Arc<dyn AlertBackend>,
    pub templates: TemplateFetcher,
    pub pdf: PdfExporter,
}

impl AppState {
    /// Bearer token of the signed-in user, or `Unauthorized`.
    pub async fn require_token(&self) -> Result<String, AppError> {
        self.session.token().await.ok_or(AppError::Unauthorized)
    }
}
