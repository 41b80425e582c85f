use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::export::{cover_letter_filename, resume_filename, PdfDocument};
use crate::models::cover_letter::{CoverLetter, CoverLetterDraft};
use crate::models::resume::{
    non_blank, Certification, Education, EntryKind, Experience, Language, PersonalInfo,
    PersonalInfoDraft, Project, Resume, ResumeDetail, ResumeDraft, ResumeEntry, Skill,
};
use crate::resume::store::{ResumePage, StoreStatus, DEFAULT_PAGE_SIZE};
use crate::state::AppState;
use crate::templates::catalog::{self, DEFAULT_TEMPLATE_ID};
use crate::templates::cover_letter::render_cover_letter;
use crate::templates::fetcher::TemplateError;
use crate::templates::populator::populate;

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Deserialize)]
pub struct TemplateQuery {
    /// Overrides the template stored on the resume.
    pub template: Option<String>,
}

#[derive(Deserialize)]
pub struct TemplateSelection {
    pub template_id: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Resumes
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> Result<Json<ResumePage>, AppError> {
    let token = state.require_token().await?;
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
    Ok(Json(state.resumes.fetch_resumes(&token, page, limit).await?))
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    Json(mut draft): Json<ResumeDraft>,
) -> Result<(StatusCode, Json<Resume>), AppError> {
    if non_blank(draft.title.as_deref()).is_none() {
        return Err(AppError::Validation("Resume title is required".into()));
    }
    if let Some(template) = draft.template_name.as_deref() {
        ensure_template(template)?;
    } else {
        draft.template_name = Some(DEFAULT_TEMPLATE_ID.to_string());
    }
    let token = state.require_token().await?;
    let resume = state.resumes.create_resume(&token, &draft).await?;
    Ok((StatusCode::CREATED, Json(resume)))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ResumeDetail>, AppError> {
    let token = state.require_token().await?;
    Ok(Json(state.resumes.fetch_resume(&token, id).await?))
}

/// PUT /api/v1/resumes/:id
pub async fn handle_update_resume(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(draft): Json<ResumeDraft>,
) -> Result<Json<Resume>, AppError> {
    if let Some(template) = draft.template_name.as_deref() {
        ensure_template(template)?;
    }
    let token = state.require_token().await?;
    Ok(Json(state.resumes.update_resume(&token, id, &draft).await?))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let token = state.require_token().await?;
    state.resumes.delete_resume(&token, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/resumes/:id/personal-info
pub async fn handle_update_personal_info(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(draft): Json<PersonalInfoDraft>,
) -> Result<Json<PersonalInfo>, AppError> {
    let token = state.require_token().await?;
    Ok(Json(
        state.resumes.update_personal_info(&token, id, &draft).await?,
    ))
}

/// PUT /api/v1/resumes/:id/template
pub async fn handle_select_template(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<TemplateSelection>,
) -> Result<Json<Resume>, AppError> {
    ensure_template(&req.template_id)?;
    let token = state.require_token().await?;
    Ok(Json(
        state
            .resumes
            .select_template(&token, id, &req.template_id)
            .await?,
    ))
}

fn ensure_template(template_id: &str) -> Result<(), AppError> {
    catalog::find(template_id)
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound(format!("Template {template_id} not found")))
}

// ────────────────────────────────────────────────────────────────────────────
// Child collections
// ────────────────────────────────────────────────────────────────────────────

fn parse_collection(collection: &str) -> Result<EntryKind, AppError> {
    collection.parse().map_err(AppError::NotFound)
}

fn parse_draft<E: ResumeEntry>(body: Value) -> Result<E::Draft, AppError> {
    serde_json::from_value(body)
        .map_err(|e| AppError::Validation(format!("Invalid {} entry: {e}", E::KIND)))
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.into()))
}

async fn add_entry<E: ResumeEntry>(
    state: &AppState,
    token: &str,
    resume_id: i64,
    body: Value,
) -> Result<Value, AppError> {
    let draft = parse_draft::<E>(body)?;
    to_json(state.resumes.add_entry::<E>(token, resume_id, &draft).await?)
}

async fn update_entry<E: ResumeEntry>(
    state: &AppState,
    token: &str,
    resume_id: i64,
    entry_id: i64,
    body: Value,
) -> Result<Value, AppError> {
    let draft = parse_draft::<E>(body)?;
    to_json(
        state
            .resumes
            .update_entry::<E>(token, resume_id, entry_id, &draft)
            .await?,
    )
}

async fn delete_entry<E: ResumeEntry>(
    state: &AppState,
    token: &str,
    resume_id: i64,
    entry_id: i64,
) -> Result<(), AppError> {
    Ok(state
        .resumes
        .delete_entry::<E>(token, resume_id, entry_id)
        .await?)
}

/// Calls `$op::<T>(args)` with the entry type matching `$kind`.
macro_rules! for_entry_kind {
    ($kind:expr, $op:ident($($arg:expr),*)) => {
        match $kind {
            EntryKind::Education => $op::<Education>($($arg),*).await,
            EntryKind::Experience => $op::<Experience>($($arg),*).await,
            EntryKind::Skill => $op::<Skill>($($arg),*).await,
            EntryKind::Language => $op::<Language>($($arg),*).await,
            EntryKind::Certification => $op::<Certification>($($arg),*).await,
            EntryKind::Project => $op::<Project>($($arg),*).await,
        }
    };
}

/// POST /api/v1/resumes/:id/entries/:collection
pub async fn handle_create_entry(
    State(state): State<AppState>,
    Path((id, collection)): Path<(i64, String)>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let kind = parse_collection(&collection)?;
    let token = state.require_token().await?;
    let entry = for_entry_kind!(kind, add_entry(&state, &token, id, body))?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT /api/v1/resumes/:id/entries/:collection/:entry_id
pub async fn handle_update_entry(
    State(state): State<AppState>,
    Path((id, collection, entry_id)): Path<(i64, String, i64)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let kind = parse_collection(&collection)?;
    let token = state.require_token().await?;
    let entry = for_entry_kind!(kind, update_entry(&state, &token, id, entry_id, body))?;
    Ok(Json(entry))
}

/// DELETE /api/v1/resumes/:id/entries/:collection/:entry_id
pub async fn handle_delete_entry(
    State(state): State<AppState>,
    Path((id, collection, entry_id)): Path<(i64, String, i64)>,
) -> Result<StatusCode, AppError> {
    let kind = parse_collection(&collection)?;
    let token = state.require_token().await?;
    for_entry_kind!(kind, delete_entry(&state, &token, id, entry_id))?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Preview & export
// ────────────────────────────────────────────────────────────────────────────

/// Loads the resume and fills its template (or the requested override).
async fn render_resume(
    state: &AppState,
    resume_id: i64,
    template_override: Option<String>,
) -> Result<(ResumeDetail, String), AppError> {
    let token = state.require_token().await?;
    let resume = state.resumes.fetch_resume(&token, resume_id).await?;

    let template_id = match template_override {
        Some(id) => {
            ensure_template(&id)?;
            id
        }
        None if catalog::find(&resume.resume.template_name).is_some() => {
            resume.resume.template_name.clone()
        }
        None => {
            debug!(
                "Resume {resume_id} uses unknown template '{}'; falling back to {DEFAULT_TEMPLATE_ID}",
                resume.resume.template_name
            );
            DEFAULT_TEMPLATE_ID.to_string()
        }
    };

    let template = match state.templates.fetch(&template_id).await {
        Err(TemplateError::Missing(_)) if template_id != DEFAULT_TEMPLATE_ID => {
            warn!(
                "Template {template_id} is not installed; rendering resume {resume_id} with {DEFAULT_TEMPLATE_ID}"
            );
            state.templates.fetch(DEFAULT_TEMPLATE_ID).await?
        }
        fetched => fetched?,
    };
    let html = populate(&template, &resume);
    Ok((resume, html))
}

/// GET /api/v1/resumes/:id/preview
pub async fn handle_preview_resume(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<TemplateQuery>,
) -> Result<Html<String>, AppError> {
    let (_, html) = render_resume(&state, id, params.template).await?;
    Ok(Html(html))
}

/// GET /api/v1/resumes/:id/pdf
pub async fn handle_resume_pdf(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<TemplateQuery>,
) -> Result<PdfDocument, AppError> {
    let (resume, html) = render_resume(&state, id, params.template).await?;
    let full_name = resume
        .personal_info
        .as_ref()
        .and_then(|p| p.full_name.as_deref());
    Ok(state.pdf.export(&html, resume_filename(full_name)).await?)
}

// ────────────────────────────────────────────────────────────────────────────
// Cover letters
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/resumes/:id/cover-letters
pub async fn handle_list_cover_letters(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<CoverLetter>>, AppError> {
    let token = state.require_token().await?;
    Ok(Json(state.resumes.fetch_cover_letters(&token, id).await?))
}

/// POST /api/v1/resumes/:id/cover-letters
pub async fn handle_create_cover_letter(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(mut draft): Json<CoverLetterDraft>,
) -> Result<(StatusCode, Json<CoverLetter>), AppError> {
    draft.resume_id = Some(id);
    let token = state.require_token().await?;
    let letter = state.resumes.create_cover_letter(&token, &draft).await?;
    Ok((StatusCode::CREATED, Json(letter)))
}

/// GET /api/v1/cover-letters/:id
pub async fn handle_get_cover_letter(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CoverLetter>, AppError> {
    let token = state.require_token().await?;
    Ok(Json(state.resumes.fetch_cover_letter(&token, id).await?))
}

/// PUT /api/v1/cover-letters/:id
pub async fn handle_update_cover_letter(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(draft): Json<CoverLetterDraft>,
) -> Result<Json<CoverLetter>, AppError> {
    let token = state.require_token().await?;
    Ok(Json(
        state.resumes.update_cover_letter(&token, id, &draft).await?,
    ))
}

/// DELETE /api/v1/cover-letters/:id
pub async fn handle_delete_cover_letter(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let token = state.require_token().await?;
    state.resumes.delete_cover_letter(&token, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fills the cover-letter template. The applicant block comes from the
/// letter's resume; if that resume can't be loaded the placeholders fall back
/// to their defaults.
async fn render_letter(state: &AppState, letter_id: i64) -> Result<(CoverLetter, String), AppError> {
    let token = state.require_token().await?;
    let letter = state.resumes.fetch_cover_letter(&token, letter_id).await?;

    let applicant = match state.resumes.current().await {
        Some(current) if current.resume.id == letter.resume_id => current.personal_info,
        _ => match state.resumes.fetch_resume(&token, letter.resume_id).await {
            Ok(detail) => detail.personal_info,
            Err(e) => {
                warn!("Cover letter {letter_id}: could not load resume {}: {e}", letter.resume_id);
                None
            }
        },
    };

    let template = state.templates.fetch_cover_letter().await?;
    let today = chrono::Local::now().date_naive();
    let html = render_cover_letter(&template, &letter, applicant.as_ref(), today);
    Ok((letter, html))
}

/// GET /api/v1/cover-letters/:id/preview
pub async fn handle_preview_cover_letter(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let (_, html) = render_letter(&state, id).await?;
    Ok(Html(html))
}

/// GET /api/v1/cover-letters/:id/pdf
pub async fn handle_cover_letter_pdf(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<PdfDocument, AppError> {
    let (letter, html) = render_letter(&state, id).await?;
    let filename = cover_letter_filename(letter.company_name.as_deref());
    Ok(state.pdf.export(&html, filename).await?)
}

/// GET /api/v1/store/status
pub async fn handle_store_status(State(state): State<AppState>) -> Json<StoreStatus> {
    Json(state.resumes.status().await)
}
