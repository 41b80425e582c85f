//! In-memory snapshot of the resume being edited.
//!
//! Every mutation is one REST call. The returned entity is spliced into the
//! snapshot after the call resolves; the lock is never held across the await.
//! Children are only touched when the current resume's id matches.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::api_client::{ApiResult, Pagination};
use crate::models::cover_letter::{CoverLetter, CoverLetterDraft};
use crate::models::resume::{
    EntryKind, PersonalInfo, PersonalInfoDraft, Resume, ResumeDetail, ResumeDraft, ResumeEntry,
};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

// ────────────────────────────────────────────────────────────────────────────
// Backend seam
// ────────────────────────────────────────────────────────────────────────────

/// REST calls the store depends on. Child collections go through the generic
/// entry calls keyed by `EntryKind`.
#[async_trait]
pub trait ResumeBackend: Send + Sync {
    async fn list_resumes(
        &self,
        token: &str,
        page: u32,
        limit: u32,
    ) -> ApiResult<(Vec<Resume>, Option<Pagination>)>;

    async fn get_resume(&self, token: &str, resume_id: i64) -> ApiResult<ResumeDetail>;

    async fn create_resume(&self, token: &str, draft: &ResumeDraft) -> ApiResult<Resume>;

    async fn update_resume(&self, token: &str, resume_id: i64, draft: &ResumeDraft)
        -> ApiResult<Resume>;

    async fn delete_resume(&self, token: &str, resume_id: i64) -> ApiResult<()>;

    async fn update_personal_info(
        &self,
        token: &str,
        resume_id: i64,
        draft: &PersonalInfoDraft,
    ) -> ApiResult<PersonalInfo>;

    async fn create_entry(
        &self,
        token: &str,
        resume_id: i64,
        kind: EntryKind,
        body: Value,
    ) -> ApiResult<Value>;

    async fn update_entry(
        &self,
        token: &str,
        resume_id: i64,
        kind: EntryKind,
        entry_id: i64,
        body: Value,
    ) -> ApiResult<Value>;

    async fn delete_entry(
        &self,
        token: &str,
        resume_id: i64,
        kind: EntryKind,
        entry_id: i64,
    ) -> ApiResult<()>;

    async fn list_cover_letters(&self, token: &str, resume_id: i64) -> ApiResult<Vec<CoverLetter>>;

    async fn get_cover_letter(&self, token: &str, letter_id: i64) -> ApiResult<CoverLetter>;

    async fn create_cover_letter(&self, token: &str, draft: &CoverLetterDraft)
        -> ApiResult<CoverLetter>;

    async fn update_cover_letter(
        &self,
        token: &str,
        letter_id: i64,
        draft: &CoverLetterDraft,
    ) -> ApiResult<CoverLetter>;

    async fn delete_cover_letter(&self, token: &str, letter_id: i64) -> ApiResult<()>;
}

// ────────────────────────────────────────────────────────────────────────────
// Busy flags
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct BusyFlag(AtomicBool);

impl BusyFlag {
    fn hold(&self) -> BusyGuard<'_> {
        self.0.store(true, Ordering::SeqCst);
        BusyGuard(&self.0)
    }

    fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Clears the flag on drop, whether the call succeeded or not.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct StoreState {
    resumes: Vec<Resume>,
    current: Option<ResumeDetail>,
    selected_template: Option<String>,
    cover_letters: Vec<CoverLetter>,
}

impl StoreState {
    fn current_mut(&mut self, resume_id: i64) -> Option<&mut ResumeDetail> {
        self.current.as_mut().filter(|c| c.resume.id == resume_id)
    }
}

/// One page of the resume list, with the backend's paging info when it sent any.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResumePage {
    pub resumes: Vec<Resume>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StoreStatus {
    pub is_saving: bool,
    pub is_loading: bool,
    pub current_resume_id: Option<i64>,
    pub selected_template: Option<String>,
    pub resume_count: usize,
    pub cover_letter_count: usize,
}

pub struct ResumeStore {
    backend: Arc<dyn ResumeBackend>,
    state: RwLock<StoreState>,
    saving: BusyFlag,
    loading: BusyFlag,
}

impl ResumeStore {
    pub fn new(backend: Arc<dyn ResumeBackend>) -> Self {
        Self {
            backend,
            state: RwLock::new(StoreState::default()),
            saving: BusyFlag::default(),
            loading: BusyFlag::default(),
        }
    }

    pub async fn status(&self) -> StoreStatus {
        let state = self.state.read().await;
        StoreStatus {
            is_saving: self.saving.get(),
            is_loading: self.loading.get(),
            current_resume_id: state.current.as_ref().map(|c| c.resume.id),
            selected_template: state.selected_template.clone(),
            resume_count: state.resumes.len(),
            cover_letter_count: state.cover_letters.len(),
        }
    }

    pub async fn current(&self) -> Option<ResumeDetail> {
        self.state.read().await.current.clone()
    }

    // ── Resumes ────────────────────────────────────────────────────────────

    pub async fn fetch_resumes(&self, token: &str, page: u32, limit: u32) -> ApiResult<ResumePage> {
        let _busy = self.loading.hold();
        let (resumes, pagination) = self.backend.list_resumes(token, page, limit).await?;
        debug!("Fetched {} resumes", resumes.len());
        self.state.write().await.resumes = resumes.clone();
        Ok(ResumePage {
            resumes,
            pagination,
        })
    }

    /// Loads the full resume and makes it current. Also selects its template.
    pub async fn fetch_resume(&self, token: &str, resume_id: i64) -> ApiResult<ResumeDetail> {
        let _busy = self.loading.hold();
        let detail = self.backend.get_resume(token, resume_id).await?;
        let mut state = self.state.write().await;
        state.selected_template = Some(detail.resume.template_name.clone());
        state.current = Some(detail.clone());
        Ok(detail)
    }

    pub async fn create_resume(&self, token: &str, draft: &ResumeDraft) -> ApiResult<Resume> {
        let _busy = self.saving.hold();
        let resume = self.backend.create_resume(token, draft).await?;
        info!("Created resume {}", resume.id);
        self.state.write().await.resumes.insert(0, resume.clone());
        Ok(resume)
    }

    pub async fn update_resume(
        &self,
        token: &str,
        resume_id: i64,
        draft: &ResumeDraft,
    ) -> ApiResult<Resume> {
        let _busy = self.saving.hold();
        let resume = self.backend.update_resume(token, resume_id, draft).await?;
        let mut state = self.state.write().await;
        replace_by_id(&mut state.resumes, resume.clone(), |r| r.id);
        if let Some(current) = state.current_mut(resume_id) {
            current.merge_basic(resume.clone());
        }
        Ok(resume)
    }

    pub async fn delete_resume(&self, token: &str, resume_id: i64) -> ApiResult<()> {
        let _busy = self.saving.hold();
        self.backend.delete_resume(token, resume_id).await?;
        info!("Deleted resume {resume_id}");
        let mut state = self.state.write().await;
        state.resumes.retain(|r| r.id != resume_id);
        if state.current_mut(resume_id).is_some() {
            state.current = None;
        }
        Ok(())
    }

    /// Persists the template choice on the resume and selects it locally.
    pub async fn select_template(
        &self,
        token: &str,
        resume_id: i64,
        template_id: &str,
    ) -> ApiResult<Resume> {
        let draft = ResumeDraft {
            template_name: Some(template_id.to_string()),
            ..Default::default()
        };
        let resume = self.update_resume(token, resume_id, &draft).await?;
        self.state.write().await.selected_template = Some(template_id.to_string());
        Ok(resume)
    }

    pub async fn update_personal_info(
        &self,
        token: &str,
        resume_id: i64,
        draft: &PersonalInfoDraft,
    ) -> ApiResult<PersonalInfo> {
        let _busy = self.saving.hold();
        let info = self
            .backend
            .update_personal_info(token, resume_id, draft)
            .await?;
        if let Some(current) = self.state.write().await.current_mut(resume_id) {
            current.personal_info = Some(info.clone());
        }
        Ok(info)
    }

    // ── Child collections ──────────────────────────────────────────────────

    pub async fn add_entry<E: ResumeEntry>(
        &self,
        token: &str,
        resume_id: i64,
        draft: &E::Draft,
    ) -> ApiResult<E> {
        let _busy = self.saving.hold();
        let body = serde_json::to_value(draft)?;
        let value = self
            .backend
            .create_entry(token, resume_id, E::KIND, body)
            .await?;
        let entry: E = serde_json::from_value(value)?;
        if let Some(current) = self.state.write().await.current_mut(resume_id) {
            E::collection_mut(current).push(entry.clone());
        }
        debug!("Added {} entry {} to resume {resume_id}", E::KIND, entry.id());
        Ok(entry)
    }

    pub async fn update_entry<E: ResumeEntry>(
        &self,
        token: &str,
        resume_id: i64,
        entry_id: i64,
        draft: &E::Draft,
    ) -> ApiResult<E> {
        let _busy = self.saving.hold();
        let body = serde_json::to_value(draft)?;
        let value = self
            .backend
            .update_entry(token, resume_id, E::KIND, entry_id, body)
            .await?;
        let entry: E = serde_json::from_value(value)?;
        if let Some(current) = self.state.write().await.current_mut(resume_id) {
            replace_by_id(E::collection_mut(current), entry.clone(), E::id);
        }
        Ok(entry)
    }

    pub async fn delete_entry<E: ResumeEntry>(
        &self,
        token: &str,
        resume_id: i64,
        entry_id: i64,
    ) -> ApiResult<()> {
        let _busy = self.saving.hold();
        self.backend
            .delete_entry(token, resume_id, E::KIND, entry_id)
            .await?;
        if let Some(current) = self.state.write().await.current_mut(resume_id) {
            E::collection_mut(current).retain(|e| e.id() != entry_id);
        }
        debug!("Deleted {} entry {entry_id} from resume {resume_id}", E::KIND);
        Ok(())
    }

    // ── Cover letters ──────────────────────────────────────────────────────

    pub async fn fetch_cover_letters(&self, token: &str, resume_id: i64) -> ApiResult<Vec<CoverLetter>> {
        let _busy = self.loading.hold();
        let letters = self.backend.list_cover_letters(token, resume_id).await?;
        self.state.write().await.cover_letters = letters.clone();
        Ok(letters)
    }

    pub async fn fetch_cover_letter(&self, token: &str, letter_id: i64) -> ApiResult<CoverLetter> {
        let _busy = self.loading.hold();
        self.backend.get_cover_letter(token, letter_id).await
    }

    pub async fn create_cover_letter(
        &self,
        token: &str,
        draft: &CoverLetterDraft,
    ) -> ApiResult<CoverLetter> {
        let _busy = self.saving.hold();
        let letter = self.backend.create_cover_letter(token, draft).await?;
        info!("Created cover letter {} for resume {}", letter.id, letter.resume_id);
        self.state.write().await.cover_letters.insert(0, letter.clone());
        Ok(letter)
    }

    pub async fn update_cover_letter(
        &self,
        token: &str,
        letter_id: i64,
        draft: &CoverLetterDraft,
    ) -> ApiResult<CoverLetter> {
        let _busy = self.saving.hold();
        let letter = self
            .backend
            .update_cover_letter(token, letter_id, draft)
            .await?;
        replace_by_id(
            &mut self.state.write().await.cover_letters,
            letter.clone(),
            |l| l.id,
        );
        Ok(letter)
    }

    pub async fn delete_cover_letter(&self, token: &str, letter_id: i64) -> ApiResult<()> {
        let _busy = self.saving.hold();
        self.backend.delete_cover_letter(token, letter_id).await?;
        self.state
            .write()
            .await
            .cover_letters
            .retain(|l| l.id != letter_id);
        Ok(())
    }
}

fn replace_by_id<T>(items: &mut [T], updated: T, id: impl Fn(&T) -> i64) {
    let target = id(&updated);
    if let Some(slot) = items.iter_mut().find(|item| id(item) == target) {
        *slot = updated;
    }
}

#[cfg(test)]
impl ResumeStore {
    async fn resumes(&self) -> Vec<Resume> {
        self.state.read().await.resumes.clone()
    }

    async fn cover_letters(&self) -> Vec<CoverLetter> {
        self.state.read().await.cover_letters.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{Education, EducationDraft, Skill, SkillDraft};
    use crate::test_support::{sample_detail, FakeBackend};

    const TOKEN: &str = "tok";

    async fn loaded_store() -> (ResumeStore, Arc<FakeBackend>) {
        let backend = Arc::new(FakeBackend::default());
        backend.seed_resume(sample_detail(1));
        let store = ResumeStore::new(backend.clone());
        store.fetch_resume(TOKEN, 1).await.unwrap();
        (store, backend)
    }

    #[tokio::test]
    async fn test_fetch_resume_sets_current_and_template() {
        let (store, _) = loaded_store().await;
        let status = store.status().await;
        assert_eq!(status.current_resume_id, Some(1));
        assert_eq!(status.selected_template.as_deref(), Some("template01_classic"));
        assert!(!status.is_loading);
    }

    #[tokio::test]
    async fn test_delete_education_removes_only_that_entry() {
        let (store, _) = loaded_store().await;
        let before = store.current().await.unwrap();
        assert_eq!(before.education.len(), 2);

        let doomed = before.education[0].id;
        store.delete_entry::<Education>(TOKEN, 1, doomed).await.unwrap();

        let after = store.current().await.unwrap();
        assert_eq!(after.education.len(), 1);
        assert!(after.education.iter().all(|e| e.id != doomed));
        assert_eq!(after.education[0], before.education[1]);
        assert_eq!(after.experience, before.experience);
        assert_eq!(after.skills, before.skills);
        assert_eq!(after.projects, before.projects);
        assert_eq!(after.personal_info, before.personal_info);
    }

    #[tokio::test]
    async fn test_add_entry_appends_returned_entity() {
        let (store, _) = loaded_store().await;
        let skill: Skill = store
            .add_entry::<Skill>(
                TOKEN,
                1,
                &SkillDraft {
                    skill_name: Some("Kubernetes".into()),
                },
            )
            .await
            .unwrap();

        let current = store.current().await.unwrap();
        assert_eq!(current.skills.last(), Some(&skill));
        assert_eq!(skill.skill_name, "Kubernetes");
    }

    #[tokio::test]
    async fn test_update_entry_replaces_by_id() {
        let (store, _) = loaded_store().await;
        let target = store.current().await.unwrap().education[1].id;

        store
            .update_entry::<Education>(
                TOKEN,
                1,
                target,
                &EducationDraft {
                    grade: Some("First".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let current = store.current().await.unwrap();
        let updated = current.education.iter().find(|e| e.id == target).unwrap();
        assert_eq!(updated.grade.as_deref(), Some("First"));
        assert_eq!(current.education.len(), 2);
    }

    #[tokio::test]
    async fn test_mutation_for_other_resume_leaves_snapshot_alone() {
        let (store, backend) = loaded_store().await;
        backend.seed_resume(sample_detail(2));
        let before = store.current().await.unwrap();

        store
            .add_entry::<Skill>(
                TOKEN,
                2,
                &SkillDraft {
                    skill_name: Some("Go".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(store.current().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_failed_call_clears_saving_flag_and_keeps_state() {
        let (store, backend) = loaded_store().await;
        let before = store.current().await.unwrap();
        backend.fail_next("Resume not found");

        let err = store
            .delete_entry::<Education>(TOKEN, 1, before.education[0].id)
            .await
            .unwrap_err();

        assert_eq!(err.server_message(), Some("Resume not found"));
        assert!(!store.status().await.is_saving);
        assert_eq!(store.current().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_resume_keeps_child_collections() {
        let (store, _) = loaded_store().await;
        let before = store.current().await.unwrap();

        store
            .update_resume(
                TOKEN,
                1,
                &ResumeDraft {
                    title: Some("Renamed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let after = store.current().await.unwrap();
        assert_eq!(after.resume.title, "Renamed");
        assert_eq!(after.education, before.education);
    }

    #[tokio::test]
    async fn test_create_resume_prepends_and_delete_clears_current() {
        let (store, _) = loaded_store().await;
        let page = store.fetch_resumes(TOKEN, 1, DEFAULT_PAGE_SIZE).await.unwrap();
        assert_eq!(page.resumes.len(), 1);
        let pagination = page.pagination.unwrap();
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.limit, DEFAULT_PAGE_SIZE);

        let created = store
            .create_resume(
                TOKEN,
                &ResumeDraft {
                    title: Some("New".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(store.resumes().await[0].id, created.id);

        store.delete_resume(TOKEN, 1).await.unwrap();
        assert!(store.current().await.is_none());
        assert!(store.resumes().await.iter().all(|r| r.id != 1));
    }

    #[tokio::test]
    async fn test_select_template_updates_selection() {
        let (store, _) = loaded_store().await;
        store
            .select_template(TOKEN, 1, "template06_tech")
            .await
            .unwrap();

        assert_eq!(
            store.status().await.selected_template.as_deref(),
            Some("template06_tech")
        );
        assert_eq!(
            store.current().await.unwrap().resume.template_name,
            "template06_tech"
        );
    }

    #[tokio::test]
    async fn test_cover_letter_list_lifecycle() {
        let (store, _) = loaded_store().await;
        let letter = store
            .create_cover_letter(
                TOKEN,
                &CoverLetterDraft {
                    resume_id: Some(1),
                    company_name: Some("Acme".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(store.cover_letters().await.len(), 1);

        let updated = store
            .update_cover_letter(
                TOKEN,
                letter.id,
                &CoverLetterDraft {
                    letter_text: Some("Dear team".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(store.cover_letters().await[0], updated);

        store.delete_cover_letter(TOKEN, letter.id).await.unwrap();
        assert!(store.cover_letters().await.is_empty());
    }
}
