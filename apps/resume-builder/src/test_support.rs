//! Scripted in-memory backend shared by unit and router tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::alerts::{AlertBackend, UnsubscribeRequest};
use crate::api_client::{ApiError, ApiResult, Pagination};
use crate::auth::session::{AuthBackend, LoginPayload, OtpPurpose};
use crate::models::cover_letter::{CoverLetter, CoverLetterDraft};
use crate::models::resume::{
    Education, EntryKind, Experience, PersonalInfo, PersonalInfoDraft, Project, Resume,
    ResumeDetail, ResumeDraft, Skill,
};
use crate::models::user::{ProfileUpdate, User};
use crate::resume::store::ResumeBackend;

pub fn sample_user() -> User {
    User {
        id: 1,
        full_name: "Jane Doe".into(),
        email: "jane@example.com".into(),
        is_verified: true,
    }
}

pub fn sample_resume(id: i64) -> Resume {
    Resume {
        id,
        user_id: 1,
        title: "Backend Engineer".into(),
        template_name: "template01_classic".into(),
        career_objective: None,
        professional_summary: Some("Builds reliable services.".into()),
        target_role: Some("Staff Engineer".into()),
        profile_picture_url: None,
        created_at: None,
        updated_at: None,
    }
}

/// A resume with personal info, two education rows and one entry in most collections.
pub fn sample_detail(id: i64) -> ResumeDetail {
    let base = id * 100;
    ResumeDetail {
        resume: sample_resume(id),
        personal_info: Some(PersonalInfo {
            id: base,
            resume_id: id,
            full_name: Some("Jane Doe".into()),
            email: Some("jane@example.com".into()),
            phone: Some("+1 (555) 010-2000".into()),
            city: Some("Berlin".into()),
            ..Default::default()
        }),
        education: vec![
            Education {
                id: base + 1,
                resume_id: id,
                institute_name: Some("TU Berlin".into()),
                degree: Some("MSc Computer Science".into()),
                start_year: Some("2016".into()),
                end_year: Some("2018".into()),
                grade: None,
            },
            Education {
                id: base + 2,
                resume_id: id,
                institute_name: Some("Uni Leipzig".into()),
                degree: Some("BSc Informatics".into()),
                start_year: Some("2012".into()),
                end_year: Some("2016".into()),
                grade: Some("1.7".into()),
            },
        ],
        experience: vec![Experience {
            id: base + 3,
            resume_id: id,
            job_title: Some("Engineer".into()),
            company_name: Some("Acme".into()),
            start_date: Some("2020".into()),
            end_date: Some("2022".into()),
            description: Some("Shipped things.".into()),
        }],
        skills: vec![Skill {
            id: base + 4,
            resume_id: id,
            skill_name: "Rust".into(),
        }],
        languages: vec![],
        certifications: vec![],
        projects: vec![Project {
            id: base + 5,
            resume_id: id,
            title: "Ledger".into(),
            description: None,
            technologies: Some("Rust, Postgres".into()),
            start_date: None,
            end_date: None,
            project_url: None,
            display_order: 0,
            created_at: None,
        }],
    }
}

#[derive(Default)]
struct FakeState {
    resumes: BTreeMap<i64, Value>,
    cover_letters: BTreeMap<i64, Value>,
    next_id: i64,
    login_failure: Option<String>,
    fail_next: Option<String>,
    calls: HashMap<&'static str, usize>,
    last_otp: Option<(String, Option<OtpPurpose>)>,
    last_subscription: Option<(String, i64)>,
    last_unsubscribe: Option<UnsubscribeRequest>,
}

/// Implements every backend trait over JSON documents held in memory.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

fn rejected(message: &str) -> ApiError {
    ApiError::Api {
        status: 400,
        message: message.to_string(),
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::Api {
        status: 404,
        message: format!("{what} not found"),
    }
}

fn merge(target: &mut Value, patch: Value) {
    if let (Some(target), Value::Object(patch)) = (target.as_object_mut(), patch) {
        for (key, value) in patch {
            target.insert(key, value);
        }
    }
}

impl FakeBackend {
    pub fn seed_resume(&self, detail: ResumeDetail) {
        let mut state = self.state.lock().unwrap();
        state.next_id = state.next_id.max(detail.resume.id * 1000);
        state
            .resumes
            .insert(detail.resume.id, serde_json::to_value(detail).unwrap());
    }

    pub fn fail_login(&self, message: &str) {
        self.state.lock().unwrap().login_failure = Some(message.to_string());
    }

    /// The next backend call of any kind fails with this server message.
    pub fn fail_next(&self, message: &str) {
        self.state.lock().unwrap().fail_next = Some(message.to_string());
    }

    pub fn calls(&self, group: &str) -> usize {
        self.state.lock().unwrap().calls.get(group).copied().unwrap_or(0)
    }

    pub fn last_otp_email(&self) -> Option<String> {
        self.state.lock().unwrap().last_otp.as_ref().map(|(e, _)| e.clone())
    }

    pub fn last_otp_purpose(&self) -> Option<OtpPurpose> {
        self.state.lock().unwrap().last_otp.as_ref().and_then(|(_, p)| *p)
    }

    pub fn last_subscription(&self) -> Option<(String, i64)> {
        self.state.lock().unwrap().last_subscription.clone()
    }

    pub fn last_unsubscribe(&self) -> Option<UnsubscribeRequest> {
        self.state.lock().unwrap().last_unsubscribe.clone()
    }

    /// Records the call and consumes a scripted failure, if any.
    fn enter(&self, group: &'static str) -> ApiResult<std::sync::MutexGuard<'_, FakeState>> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(group).or_default() += 1;
        match state.fail_next.take() {
            Some(message) => Err(rejected(&message)),
            None => Ok(state),
        }
    }
}

impl FakeState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn resume_mut(&mut self, resume_id: i64) -> ApiResult<&mut Value> {
        self.resumes
            .get_mut(&resume_id)
            .ok_or_else(|| not_found("Resume"))
    }
}

#[async_trait]
impl AuthBackend for FakeBackend {
    async fn login(&self, email: &str, _password: &str) -> ApiResult<LoginPayload> {
        let state = self.enter("auth")?;
        if let Some(message) = &state.login_failure {
            return Err(ApiError::Api {
                status: 401,
                message: message.clone(),
            });
        }
        let local = email.split('@').next().unwrap_or(email);
        Ok(LoginPayload {
            user: User {
                email: email.to_string(),
                ..sample_user()
            },
            token: format!("token-{local}"),
        })
    }

    async fn register(&self, _full_name: &str, _email: &str, _password: &str) -> ApiResult<()> {
        self.enter("auth")?;
        Ok(())
    }

    async fn verify_email(&self, email: &str, _otp_code: &str) -> ApiResult<()> {
        self.enter("auth")?.last_otp = Some((email.to_string(), None));
        Ok(())
    }

    async fn resend_otp(&self, email: &str, purpose: OtpPurpose) -> ApiResult<()> {
        self.enter("auth")?.last_otp = Some((email.to_string(), Some(purpose)));
        Ok(())
    }

    async fn forgot_password(&self, _email: &str) -> ApiResult<()> {
        self.enter("auth")?;
        Ok(())
    }

    async fn reset_password(&self, email: &str, _otp_code: &str, _new_password: &str) -> ApiResult<()> {
        self.enter("auth")?.last_otp = Some((email.to_string(), Some(OtpPurpose::PasswordReset)));
        Ok(())
    }

    async fn update_profile(&self, _token: &str, update: &ProfileUpdate) -> ApiResult<User> {
        self.enter("auth")?;
        let mut user = sample_user();
        if let Some(name) = &update.full_name {
            user.full_name = name.clone();
        }
        if let Some(email) = &update.email {
            user.email = email.clone();
        }
        Ok(user)
    }
}

#[async_trait]
impl ResumeBackend for FakeBackend {
    async fn list_resumes(
        &self,
        _token: &str,
        page: u32,
        limit: u32,
    ) -> ApiResult<(Vec<Resume>, Option<Pagination>)> {
        let state = self.enter("resumes")?;
        let resumes = state
            .resumes
            .values()
            .map(|v| serde_json::from_value::<Resume>(v.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        let total = resumes.len() as u64;
        Ok((
            resumes,
            Some(Pagination {
                page,
                limit,
                total,
                total_pages: 1,
                has_more: false,
            }),
        ))
    }

    async fn get_resume(&self, _token: &str, resume_id: i64) -> ApiResult<ResumeDetail> {
        let mut state = self.enter("resumes")?;
        let value = state.resume_mut(resume_id)?.clone();
        Ok(serde_json::from_value(value)?)
    }

    async fn create_resume(&self, _token: &str, draft: &ResumeDraft) -> ApiResult<Resume> {
        let mut state = self.enter("resumes")?;
        let id = state.next_id();
        let mut value = serde_json::to_value(sample_resume(id))?;
        merge(&mut value, serde_json::to_value(draft)?);
        state.resumes.insert(id, value.clone());
        Ok(serde_json::from_value(value)?)
    }

    async fn update_resume(
        &self,
        _token: &str,
        resume_id: i64,
        draft: &ResumeDraft,
    ) -> ApiResult<Resume> {
        let mut state = self.enter("resumes")?;
        let value = state.resume_mut(resume_id)?;
        merge(value, serde_json::to_value(draft)?);
        Ok(serde_json::from_value(value.clone())?)
    }

    async fn delete_resume(&self, _token: &str, resume_id: i64) -> ApiResult<()> {
        let mut state = self.enter("resumes")?;
        state
            .resumes
            .remove(&resume_id)
            .map(|_| ())
            .ok_or_else(|| not_found("Resume"))
    }

    async fn update_personal_info(
        &self,
        _token: &str,
        resume_id: i64,
        draft: &PersonalInfoDraft,
    ) -> ApiResult<PersonalInfo> {
        let mut state = self.enter("resumes")?;
        let resume = state.resume_mut(resume_id)?;
        let mut info = resume
            .get("personal_info")
            .filter(|v| !v.is_null())
            .cloned()
            .unwrap_or_else(|| json!({ "id": resume_id * 100, "resume_id": resume_id }));
        merge(&mut info, serde_json::to_value(draft)?);
        resume["personal_info"] = info.clone();
        Ok(serde_json::from_value(info)?)
    }

    async fn create_entry(
        &self,
        _token: &str,
        resume_id: i64,
        kind: EntryKind,
        body: Value,
    ) -> ApiResult<Value> {
        let mut state = self.enter("resumes")?;
        let id = state.next_id();
        let mut entry = Value::Object(Map::new());
        merge(&mut entry, body);
        merge(&mut entry, json!({ "id": id, "resume_id": resume_id }));
        let resume = state.resume_mut(resume_id)?;
        match resume[kind.path_segment()].as_array_mut() {
            Some(items) => items.push(entry.clone()),
            None => resume[kind.path_segment()] = json!([entry.clone()]),
        }
        Ok(entry)
    }

    async fn update_entry(
        &self,
        _token: &str,
        resume_id: i64,
        kind: EntryKind,
        entry_id: i64,
        body: Value,
    ) -> ApiResult<Value> {
        let mut state = self.enter("resumes")?;
        let resume = state.resume_mut(resume_id)?;
        let entry = resume[kind.path_segment()]
            .as_array_mut()
            .and_then(|items| items.iter_mut().find(|e| e["id"] == json!(entry_id)))
            .ok_or_else(|| not_found("Entry"))?;
        merge(entry, body);
        Ok(entry.clone())
    }

    async fn delete_entry(
        &self,
        _token: &str,
        resume_id: i64,
        kind: EntryKind,
        entry_id: i64,
    ) -> ApiResult<()> {
        let mut state = self.enter("resumes")?;
        let resume = state.resume_mut(resume_id)?;
        if let Some(items) = resume[kind.path_segment()].as_array_mut() {
            items.retain(|e| e["id"] != json!(entry_id));
        }
        Ok(())
    }

    async fn list_cover_letters(&self, _token: &str, resume_id: i64) -> ApiResult<Vec<CoverLetter>> {
        let state = self.enter("cover_letters")?;
        let letters = state
            .cover_letters
            .values()
            .filter(|v| v["resume_id"] == json!(resume_id))
            .map(|v| serde_json::from_value(v.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(letters)
    }

    async fn get_cover_letter(&self, _token: &str, letter_id: i64) -> ApiResult<CoverLetter> {
        let state = self.enter("cover_letters")?;
        let value = state
            .cover_letters
            .get(&letter_id)
            .cloned()
            .ok_or_else(|| not_found("Cover letter"))?;
        Ok(serde_json::from_value(value)?)
    }

    async fn create_cover_letter(
        &self,
        _token: &str,
        draft: &CoverLetterDraft,
    ) -> ApiResult<CoverLetter> {
        let mut state = self.enter("cover_letters")?;
        let id = state.next_id();
        let mut value = json!({
            "id": id,
            "resume_id": draft.resume_id.unwrap_or_default(),
            "job_title": null,
            "company_name": null,
            "letter_text": null,
        });
        merge(&mut value, serde_json::to_value(draft)?);
        state.cover_letters.insert(id, value.clone());
        Ok(serde_json::from_value(value)?)
    }

    async fn update_cover_letter(
        &self,
        _token: &str,
        letter_id: i64,
        draft: &CoverLetterDraft,
    ) -> ApiResult<CoverLetter> {
        let mut state = self.enter("cover_letters")?;
        let value = state
            .cover_letters
            .get_mut(&letter_id)
            .ok_or_else(|| not_found("Cover letter"))?;
        merge(value, serde_json::to_value(draft)?);
        Ok(serde_json::from_value(value.clone())?)
    }

    async fn delete_cover_letter(&self, _token: &str, letter_id: i64) -> ApiResult<()> {
        let mut state = self.enter("cover_letters")?;
        state.cover_letters.remove(&letter_id);
        Ok(())
    }
}

#[async_trait]
impl AlertBackend for FakeBackend {
    async fn subscribe(&self, email: &str, category_id: i64) -> ApiResult<Option<String>> {
        self.enter("alerts")?.last_subscription = Some((email.to_string(), category_id));
        Ok(None)
    }

    async fn unsubscribe(&self, request: &UnsubscribeRequest) -> ApiResult<Option<String>> {
        self.enter("alerts")?.last_unsubscribe = Some(request.clone());
        Ok(None)
    }
}
