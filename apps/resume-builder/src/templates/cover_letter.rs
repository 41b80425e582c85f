//! `{{KEY}}` substitution for the cover-letter template.

use chrono::NaiveDate;

use crate::models::cover_letter::CoverLetter;
use crate::models::resume::{non_blank, PersonalInfo};
use crate::templates::html::escape;

/// Long US date, e.g. "October 19, 2026".
pub fn format_letter_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Each non-blank line becomes one `<div class="paragraph">`.
fn paragraphs(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!(r#"<div class="paragraph">{}</div>"#, escape(line)))
        .collect()
}

fn applicant_field(
    applicant: Option<&PersonalInfo>,
    get: fn(&PersonalInfo) -> Option<&str>,
    fallback: &str,
) -> String {
    escape(applicant.and_then(|a| non_blank(get(a))).unwrap_or(fallback))
}

/// Fills every known placeholder. Unknown placeholders are left untouched.
pub fn render_cover_letter(
    template: &str,
    letter: &CoverLetter,
    applicant: Option<&PersonalInfo>,
    date: NaiveDate,
) -> String {
    let replacements = [
        ("APPLICANT_NAME", applicant_field(applicant, |a| a.full_name.as_deref(), "Your Name")),
        (
            "APPLICANT_EMAIL",
            applicant_field(applicant, |a| a.email.as_deref(), "your.email@example.com"),
        ),
        ("APPLICANT_PHONE", applicant_field(applicant, |a| a.phone.as_deref(), "Your Phone")),
        (
            "APPLICANT_ADDRESS",
            applicant_field(applicant, |a| a.address.as_deref(), "Your Address"),
        ),
        ("DATE", format_letter_date(date)),
        (
            "COMPANY_NAME",
            escape(non_blank(letter.company_name.as_deref()).unwrap_or("Company Name")),
        ),
        (
            "JOB_TITLE",
            escape(non_blank(letter.job_title.as_deref()).unwrap_or_default()),
        ),
        (
            "LETTER_TEXT",
            paragraphs(letter.letter_text.as_deref().unwrap_or_default()),
        ),
    ];

    replacements
        .iter()
        .fold(template.to_string(), |html, (key, value)| {
            html.replace(&format!("{{{{{key}}}}}"), value)
        })
}
