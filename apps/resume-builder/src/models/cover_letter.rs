use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Writing tone requested for a cover letter.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Formal,
    Professional,
    Casual,
    Enthusiastic,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverLetter {
    pub id: i64,
    pub resume_id: i64,
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    #[serde(default)]
    pub tone: Tone,
    pub letter_text: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverLetterDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<Tone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_text: Option<String>,
}
