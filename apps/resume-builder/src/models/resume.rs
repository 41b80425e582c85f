use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resume {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub template_name: String,
    pub career_objective: Option<String>,
    pub professional_summary: Option<String>,
    pub target_role: Option<String>,
    pub profile_picture_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A resume together with its personal info and every child collection,
/// as returned by `GET /resumes/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResumeDetail {
    #[serde(flatten)]
    pub resume: Resume,
    #[serde(default)]
    pub personal_info: Option<PersonalInfo>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub languages: Vec<Language>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl ResumeDetail {
    /// Applies the basic fields of an updated resume row, keeping the child collections.
    pub fn merge_basic(&mut self, resume: Resume) {
        self.resume = resume;
    }

    /// Professional summary, falling back to the career objective. Blank text counts as absent.
    pub fn summary_text(&self) -> Option<&str> {
        non_blank(self.resume.professional_summary.as_deref())
            .or_else(|| non_blank(self.resume.career_objective.as_deref()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PersonalInfo {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub resume_id: i64,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub linkedin_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub github_url: Option<String>,
    pub website_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Education {
    pub id: i64,
    pub resume_id: i64,
    pub institute_name: Option<String>,
    pub degree: Option<String>,
    pub start_year: Option<String>,
    pub end_year: Option<String>,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Experience {
    pub id: i64,
    pub resume_id: i64,
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Skill {
    pub id: i64,
    pub resume_id: i64,
    pub skill_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Language {
    pub id: i64,
    pub resume_id: i64,
    pub language_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Certification {
    pub id: i64,
    pub resume_id: i64,
    pub title: String,
    pub year: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: i64,
    pub resume_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub technologies: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub project_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// ────────────────────────────────────────────────────────────────────────────
// Drafts sent to the backend. Unset fields are omitted from the JSON body.
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub career_objective: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professional_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalInfoDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EducationDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institute_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExperienceDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LanguageDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CertificationDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technologies: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
}

// ────────────────────────────────────────────────────────────────────────────
// Child collections
// ────────────────────────────────────────────────────────────────────────────

/// The nested collections of a resume that are edited one entry at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Education,
    Experience,
    Skill,
    Language,
    Certification,
    Project,
}

impl EntryKind {
    /// Path segment under `/resumes/{id}/`.
    pub fn path_segment(self) -> &'static str {
        match self {
            EntryKind::Education => "education",
            EntryKind::Experience => "experience",
            EntryKind::Skill => "skills",
            EntryKind::Language => "languages",
            EntryKind::Certification => "certifications",
            EntryKind::Project => "projects",
        }
    }

    /// Key of the entity inside the response envelope's `data` object.
    pub fn response_key(self) -> &'static str {
        match self {
            EntryKind::Education => "education",
            EntryKind::Experience => "experience",
            EntryKind::Skill => "skill",
            EntryKind::Language => "language",
            EntryKind::Certification => "certification",
            EntryKind::Project => "project",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "education" => Ok(EntryKind::Education),
            "experience" => Ok(EntryKind::Experience),
            "skills" => Ok(EntryKind::Skill),
            "languages" => Ok(EntryKind::Language),
            "certifications" => Ok(EntryKind::Certification),
            "projects" => Ok(EntryKind::Project),
            other => Err(format!("Unknown resume collection '{other}'")),
        }
    }
}

/// A record living in one of the resume's child collections.
pub trait ResumeEntry: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Body accepted by the create and update endpoints.
    type Draft: Serialize + DeserializeOwned + Send + Sync;

    const KIND: EntryKind;

    fn id(&self) -> i64;

    fn collection_mut(detail: &mut ResumeDetail) -> &mut Vec<Self>;
}

macro_rules! resume_entry {
    ($entry:ty, $draft:ty, $kind:expr, $field:ident) => {
        impl ResumeEntry for $entry {
            type Draft = $draft;

            const KIND: EntryKind = $kind;

            fn id(&self) -> i64 {
                self.id
            }

            fn collection_mut(detail: &mut ResumeDetail) -> &mut Vec<Self> {
                &mut detail.$field
            }
        }
    };
}

resume_entry!(Education, EducationDraft, EntryKind::Education, education);
resume_entry!(Experience, ExperienceDraft, EntryKind::Experience, experience);
resume_entry!(Skill, SkillDraft, EntryKind::Skill, skills);
resume_entry!(Language, LanguageDraft, EntryKind::Language, languages);
resume_entry!(Certification, CertificationDraft, EntryKind::Certification, certifications);
resume_entry!(Project, ProjectDraft, EntryKind::Project, projects);

/// Returns the trimmed text when it has any non-whitespace content.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detail_deserializes_with_missing_collections() {
        let detail: ResumeDetail = serde_json::from_value(json!({
            "id": 7,
            "user_id": 1,
            "title": "Backend",
            "template_name": "template01_classic",
            "career_objective": null,
            "professional_summary": null,
            "target_role": null,
            "profile_picture_url": null,
            "created_at": "2024-03-01T10:00:00.000Z",
            "updated_at": "2024-03-01T10:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(detail.resume.id, 7);
        assert!(detail.personal_info.is_none());
        assert!(detail.education.is_empty());
        assert!(detail.projects.is_empty());
    }

    #[test]
    fn test_summary_prefers_professional_summary() {
        let mut detail: ResumeDetail = serde_json::from_value(json!({
            "id": 1, "user_id": 1, "title": "t", "template_name": "x",
            "career_objective": "Objective", "professional_summary": "  Summary  ",
            "target_role": null, "profile_picture_url": null
        }))
        .unwrap();
        assert_eq!(detail.summary_text(), Some("Summary"));

        detail.resume.professional_summary = Some("   ".into());
        assert_eq!(detail.summary_text(), Some("Objective"));

        detail.resume.career_objective = None;
        assert_eq!(detail.summary_text(), None);
    }

    #[test]
    fn test_draft_omits_unset_fields() {
        let draft = EducationDraft {
            degree: Some("BSc".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&draft).unwrap(), json!({ "degree": "BSc" }));
    }

    #[test]
    fn test_entry_kind_path_round_trip() {
        for kind in [
            EntryKind::Education,
            EntryKind::Experience,
            EntryKind::Skill,
            EntryKind::Language,
            EntryKind::Certification,
            EntryKind::Project,
        ] {
            assert_eq!(kind.path_segment().parse::<EntryKind>(), Ok(kind));
        }
        assert!("hobbies".parse::<EntryKind>().is_err());
    }
}
