pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::alerts::handlers as alerts;
use crate::auth::handlers as auth;
use crate::resume::handlers as resume;
use crate::state::AppState;
use crate::templates::handlers as templates;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Templates
        .route("/api/v1/templates", get(templates::handle_list_templates))
        .route("/api/v1/templates/:id", get(templates::handle_get_template))
        .route(
            "/api/v1/templates/:id/render",
            post(templates::handle_render_template),
        )
        // Auth
        .route("/api/v1/auth/session", get(auth::handle_get_session))
        .route("/api/v1/auth/form", get(auth::handle_get_form))
        .route("/api/v1/auth/mode", post(auth::handle_switch_mode))
        .route("/api/v1/auth/sign-in", post(auth::handle_sign_in))
        .route("/api/v1/auth/sign-up", post(auth::handle_sign_up))
        .route(
            "/api/v1/auth/forgot-password",
            post(auth::handle_forgot_password),
        )
        .route("/api/v1/auth/verify", post(auth::handle_verify))
        .route("/api/v1/auth/resend-otp", post(auth::handle_resend_otp))
        .route("/api/v1/auth/profile", put(auth::handle_update_profile))
        .route("/api/v1/auth/logout", post(auth::handle_logout))
        // Resumes
        .route(
            "/api/v1/resumes",
            get(resume::handle_list_resumes).post(resume::handle_create_resume),
        )
        .route(
            "/api/v1/resumes/:id",
            get(resume::handle_get_resume)
                .put(resume::handle_update_resume)
                .delete(resume::handle_delete_resume),
        )
        .route(
            "/api/v1/resumes/:id/personal-info",
            put(resume::handle_update_personal_info),
        )
        .route(
            "/api/v1/resumes/:id/entries/:collection",
            post(resume::handle_create_entry),
        )
        .route(
            "/api/v1/resumes/:id/entries/:collection/:entry_id",
            put(resume::handle_update_entry).delete(resume::handle_delete_entry),
        )
        .route(
            "/api/v1/resumes/:id/template",
            put(resume::handle_select_template),
        )
        .route(
            "/api/v1/resumes/:id/preview",
            get(resume::handle_preview_resume),
        )
        .route("/api/v1/resumes/:id/pdf", get(resume::handle_resume_pdf))
        // Cover letters
        .route(
            "/api/v1/resumes/:id/cover-letters",
            get(resume::handle_list_cover_letters).post(resume::handle_create_cover_letter),
        )
        .route(
            "/api/v1/cover-letters/:id",
            get(resume::handle_get_cover_letter)
                .put(resume::handle_update_cover_letter)
                .delete(resume::handle_delete_cover_letter),
        )
        .route(
            "/api/v1/cover-letters/:id/preview",
            get(resume::handle_preview_cover_letter),
        )
        .route(
            "/api/v1/cover-letters/:id/pdf",
            get(resume::handle_cover_letter_pdf),
        )
        .route("/api/v1/store/status", get(resume::handle_store_status))
        // Job alerts
        .route("/api/v1/job-alerts/subscribe", post(alerts::handle_subscribe))
        .route(
            "/api/v1/job-alerts/unsubscribe",
            post(alerts::handle_unsubscribe),
        )
        .with_state(state)
}
