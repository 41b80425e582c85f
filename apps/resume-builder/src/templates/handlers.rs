use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};

use crate::errors::AppError;
use crate::models::resume::ResumeDetail;
use crate::state::AppState;
use crate::templates::catalog::{self, TemplateInfo};
use crate::templates::populator::populate;

/// GET /api/v1/templates
pub async fn handle_list_templates() -> Json<Vec<TemplateInfo>> {
    Json(catalog::all())
}

/// GET /api/v1/templates/:id
pub async fn handle_get_template(Path(id): Path<String>) -> Result<Json<TemplateInfo>, AppError> {
    catalog::find(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Template {id} not found")))
}

/// POST /api/v1/templates/:id/render
/// Populates the template with an unsaved resume, for the live edit preview.
pub async fn handle_render_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(resume): Json<ResumeDetail>,
) -> Result<Html<String>, AppError> {
    let template = state.templates.fetch(&id).await?;
    Ok(Html(populate(&template, &resume)))
}
