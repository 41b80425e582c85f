use async_trait::async_trait;
use serde_json::Value;

use crate::api_client::{ApiResult, BackendClient, Pagination};
use crate::models::cover_letter::{CoverLetter, CoverLetterDraft};
use crate::models::resume::{
    EntryKind, PersonalInfo, PersonalInfoDraft, Resume, ResumeDetail, ResumeDraft,
};
use crate::resume::store::ResumeBackend;

fn entries_path(resume_id: i64, kind: EntryKind) -> String {
    format!("/resumes/{resume_id}/{}", kind.path_segment())
}

fn entry_path(resume_id: i64, kind: EntryKind, entry_id: i64) -> String {
    format!("{}/{entry_id}", entries_path(resume_id, kind))
}

#[async_trait]
impl ResumeBackend for BackendClient {
    async fn list_resumes(
        &self,
        token: &str,
        page: u32,
        limit: u32,
    ) -> ApiResult<(Vec<Resume>, Option<Pagination>)> {
        let mut envelope = self
            .get(&format!("/resumes?page={page}&limit={limit}"), Some(token))
            .await?;
        let resumes = envelope.take("resumes")?;
        Ok((resumes, envelope.pagination.take()))
    }

    async fn get_resume(&self, token: &str, resume_id: i64) -> ApiResult<ResumeDetail> {
        self.get(&format!("/resumes/{resume_id}"), Some(token))
            .await?
            .take("resume")
    }

    async fn create_resume(&self, token: &str, draft: &ResumeDraft) -> ApiResult<Resume> {
        self.post("/resumes", Some(token), draft).await?.take("resume")
    }

    async fn update_resume(
        &self,
        token: &str,
        resume_id: i64,
        draft: &ResumeDraft,
    ) -> ApiResult<Resume> {
        self.put(&format!("/resumes/{resume_id}"), Some(token), draft)
            .await?
            .take("resume")
    }

    async fn delete_resume(&self, token: &str, resume_id: i64) -> ApiResult<()> {
        self.delete(&format!("/resumes/{resume_id}"), Some(token))
            .await?;
        Ok(())
    }

    async fn update_personal_info(
        &self,
        token: &str,
        resume_id: i64,
        draft: &PersonalInfoDraft,
    ) -> ApiResult<PersonalInfo> {
        self.put(
            &format!("/resumes/{resume_id}/personal-info"),
            Some(token),
            draft,
        )
        .await?
        .take("personal_info")
    }

    async fn create_entry(
        &self,
        token: &str,
        resume_id: i64,
        kind: EntryKind,
        body: Value,
    ) -> ApiResult<Value> {
        self.post(&entries_path(resume_id, kind), Some(token), &body)
            .await?
            .take_value(kind.response_key())
    }

    async fn update_entry(
        &self,
        token: &str,
        resume_id: i64,
        kind: EntryKind,
        entry_id: i64,
        body: Value,
    ) -> ApiResult<Value> {
        self.put(&entry_path(resume_id, kind, entry_id), Some(token), &body)
            .await?
            .take_value(kind.response_key())
    }

    async fn delete_entry(
        &self,
        token: &str,
        resume_id: i64,
        kind: EntryKind,
        entry_id: i64,
    ) -> ApiResult<()> {
        self.delete(&entry_path(resume_id, kind, entry_id), Some(token))
            .await?;
        Ok(())
    }

    async fn list_cover_letters(&self, token: &str, resume_id: i64) -> ApiResult<Vec<CoverLetter>> {
        self.get(&format!("/cover-letters/resume/{resume_id}"), Some(token))
            .await?
            .take("cover_letters")
    }

    async fn get_cover_letter(&self, token: &str, letter_id: i64) -> ApiResult<CoverLetter> {
        self.get(&format!("/cover-letters/{letter_id}"), Some(token))
            .await?
            .take("cover_letter")
    }

    async fn create_cover_letter(
        &self,
        token: &str,
        draft: &CoverLetterDraft,
    ) -> ApiResult<CoverLetter> {
        self.post("/cover-letters", Some(token), draft)
            .await?
            .take("cover_letter")
    }

    async fn update_cover_letter(
        &self,
        token: &str,
        letter_id: i64,
        draft: &CoverLetterDraft,
    ) -> ApiResult<CoverLetter> {
        self.put(&format!("/cover-letters/{letter_id}"), Some(token), draft)
            .await?
            .take("cover_letter")
    }

    async fn delete_cover_letter(&self, token: &str, letter_id: i64) -> ApiResult<()> {
        self.delete(&format!("/cover-letters/{letter_id}"), Some(token))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_paths() {
        assert_eq!(entries_path(4, EntryKind::Skill), "/resumes/4/skills");
        assert_eq!(
            entry_path(4, EntryKind::Certification, 9),
            "/resumes/4/certifications/9"
        );
    }
}
