//! Renders a resume into a static HTML template.
//!
//! The template is parsed once into a [`TemplateLayout`]: raw markup kept
//! verbatim, one slot per header anchor, and one slot per recognised `<h2>`
//! section.
//! Rendering walks the layout and either fills a slot or drops it together
//! with its trailing whitespace. A section heading is never emitted without
//! content.
//!
//! Section boundaries are nesting-aware: a section ends at the next `<h2>` on
//! its own nesting level, or at the first closing tag that belongs to an
//! element opened before the heading (a column `</div>`, `</body>`).
//!
//! Header anchors (`<h1>`, target role, contact info, social links) are
//! replaced in place, so markup between them survives. A header element the
//! template lacks is emitted right after the nearest preceding anchor.
//!
//! Output re-parses to the same layout, so `populate` is idempotent.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::models::resume::{non_blank, PersonalInfo, ResumeDetail};
use crate::templates::html::{date_range, escape, escape_multiline, strip_tags};

const ITEM_INDENT: &str = "\n    ";
const FIELD_INDENT: &str = "\n        ";
const GRID_INDENT: &str = "\n            ";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Summary,
    Experience,
    Education,
    Skills,
    Languages,
    Projects,
    Certifications,
}

impl SectionKind {
    /// Maps a heading's plain text onto a section, case-insensitively.
    pub fn from_heading(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "career objective" | "professional summary" | "objective" | "summary" => {
                Some(SectionKind::Summary)
            }
            "experience" | "professional experience" | "work experience" => {
                Some(SectionKind::Experience)
            }
            "education" => Some(SectionKind::Education),
            "skills" | "technical skills" => Some(SectionKind::Skills),
            "languages" => Some(SectionKind::Languages),
            "projects" => Some(SectionKind::Projects),
            "certifications" => Some(SectionKind::Certifications),
            _ => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Layout
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
struct SectionSlot {
    kind: SectionKind,
    /// Attributes of the `<h2>` tag, including the leading space.
    attrs: String,
    /// Inner HTML of the template's heading.
    heading: String,
    /// Whitespace between the section body and whatever follows it.
    gap: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum HeaderPart {
    Name,
    Role,
    Contact,
    Social,
}

impl HeaderPart {
    const ALL: [HeaderPart; 4] = [
        HeaderPart::Name,
        HeaderPart::Role,
        HeaderPart::Contact,
        HeaderPart::Social,
    ];

    fn tag(self) -> &'static str {
        match self {
            HeaderPart::Name => "h1",
            HeaderPart::Role => "h3",
            HeaderPart::Contact | HeaderPart::Social => "div",
        }
    }

    fn default_open(self) -> &'static str {
        match self {
            HeaderPart::Name => "<h1>",
            HeaderPart::Role => r#"<h3 class="target-role">"#,
            HeaderPart::Contact => r#"<div class="contact-info">"#,
            HeaderPart::Social => r#"<div class="social-links">"#,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct HeaderElement {
    part: HeaderPart,
    /// Opening tag as written in the template.
    open_tag: String,
}

/// One header anchor plus any elements the template lacks that follow it.
#[derive(Debug, Clone, PartialEq)]
struct HeaderSlot {
    elements: Vec<HeaderElement>,
    gap: String,
}

#[derive(Debug, Clone, PartialEq)]
struct HeaderAnchor {
    part: HeaderPart,
    start: usize,
    end: usize,
    open_tag: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Raw(String),
    Header(HeaderSlot),
    Section(SectionSlot),
}

/// A template split into verbatim markup and data-driven slots.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLayout {
    segments: Vec<Segment>,
}

fn h2_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<h2(\s[^>]*)?>(.*?)</h2>")
            .unwrap_or_else(|error| panic!("h2 regex failed to compile: {error}"))
    })
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9]*)\b[^>]*?(/?)>")
            .unwrap_or_else(|error| panic!("tag regex failed to compile: {error}"))
    })
}

/// Opening tags of the header anchors, indexed like [`HeaderPart::ALL`].
fn header_open_regexes() -> &'static [Regex; 4] {
    static RES: OnceLock<[Regex; 4]> = OnceLock::new();
    RES.get_or_init(|| {
        let build = |pattern: &str| {
            Regex::new(pattern)
                .unwrap_or_else(|error| panic!("header regex failed to compile: {error}"))
        };
        [
            build(r"<h1(?:\s[^>]*)?>"),
            build(r#"<h3\s+class="target-role"[^>]*>"#),
            build(r#"<div\s+class="contact-info"[^>]*>"#),
            build(r#"<div\s+class="social-links"[^>]*>"#),
        ]
    })
}

impl TemplateLayout {
    pub fn parse(html: &str) -> Self {
        let mut segments = Vec::new();
        let mut cursor = 0;

        let first_h2 = h2_regex().find(html).map_or(html.len(), |m| m.start());
        let anchors = header_anchors(&html[..first_h2]);
        for (anchor, elements) in anchors.iter().zip(header_elements(&anchors)) {
            let rest = &html[anchor.end..];
            let gap = &rest[..rest.len() - rest.trim_start().len()];

            segments.push(Segment::Raw(html[cursor..anchor.start].to_string()));
            segments.push(Segment::Header(HeaderSlot {
                elements,
                gap: gap.to_string(),
            }));
            cursor = anchor.end + gap.len();
        }

        for caps in h2_regex().captures_iter(html) {
            let Some(whole) = caps.get(0) else { continue };
            if whole.start() < cursor {
                // nested inside the previous section
                continue;
            }
            let heading = caps.get(2).map_or("", |m| m.as_str());
            let Some(kind) = SectionKind::from_heading(&strip_tags(heading)) else {
                continue;
            };

            let end = section_end(html, whole.end());
            let body = &html[whole.end()..end];
            let gap = &body[body.trim_end().len()..];

            segments.push(Segment::Raw(html[cursor..whole.start()].to_string()));
            segments.push(Segment::Section(SectionSlot {
                kind,
                attrs: caps.get(1).map_or("", |m| m.as_str()).to_string(),
                heading: heading.to_string(),
                gap: gap.to_string(),
            }));
            cursor = end;
        }

        segments.push(Segment::Raw(html[cursor..].to_string()));
        segments.retain(|s| !matches!(s, Segment::Raw(r) if r.is_empty()));

        let layout = Self { segments };
        if !layout.has_header() {
            debug!("Template has no header anchors; header left untouched");
        }
        if layout.sections().is_empty() {
            debug!("Template has no recognised sections");
        }
        layout
    }

    pub fn has_header(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Header(_)))
    }

    /// Recognised sections in document order.
    pub fn sections(&self) -> Vec<SectionKind> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Section(slot) => Some(slot.kind),
                _ => None,
            })
            .collect()
    }

    pub fn render(&self, resume: &ResumeDetail) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Raw(raw) => out.push_str(raw),
                Segment::Header(slot) => {
                    let parts: Vec<String> = slot
                        .elements
                        .iter()
                        .filter_map(|element| render_header_element(element, resume))
                        .collect();
                    if !parts.is_empty() {
                        out.push_str(&parts.join(ITEM_INDENT));
                        out.push_str(&slot.gap);
                    }
                }
                Segment::Section(slot) => match render_body(slot.kind, resume) {
                    Some(body) => {
                        let _ = write!(
                            out,
                            "<h2{}>{}</h2>{}{}",
                            slot.attrs,
                            heading_for(slot),
                            body,
                            slot.gap
                        );
                    }
                    None => debug!("Dropping empty {:?} section", slot.kind),
                },
            }
        }
        out
    }
}

/// Renders `resume` into `template_html`. Never fails; missing anchors simply
/// produce nothing for that part.
pub fn populate(template_html: &str, resume: &ResumeDetail) -> String {
    TemplateLayout::parse(template_html).render(resume)
}

/// Header anchors in `zone`, in document order. An anchor nested inside an
/// earlier one, or one whose element is never closed, is ignored.
fn header_anchors(zone: &str) -> Vec<HeaderAnchor> {
    let mut found: Vec<HeaderAnchor> = HeaderPart::ALL
        .iter()
        .zip(header_open_regexes())
        .filter_map(|(&part, re)| {
            let open = re.find(zone)?;
            let end = element_end(zone, open.end())?;
            Some(HeaderAnchor {
                part,
                start: open.start(),
                end,
                open_tag: open.as_str().to_string(),
            })
        })
        .collect();
    found.sort_by_key(|a| a.start);

    let mut anchors: Vec<HeaderAnchor> = Vec::with_capacity(found.len());
    for anchor in found {
        if anchors.last().is_some_and(|prev| anchor.start < prev.end) {
            continue;
        }
        anchors.push(anchor);
    }
    anchors
}

/// Elements rendered at each anchor. A part the template lacks goes after the
/// nearest preceding part that has an anchor, or before the nearest following
/// one when nothing precedes it.
fn header_elements(anchors: &[HeaderAnchor]) -> Vec<Vec<HeaderElement>> {
    let mut slots: Vec<Vec<HeaderElement>> = anchors
        .iter()
        .map(|a| {
            vec![HeaderElement {
                part: a.part,
                open_tag: a.open_tag.clone(),
            }]
        })
        .collect();

    for part in HeaderPart::ALL {
        if anchors.iter().any(|a| a.part == part) {
            continue;
        }
        let element = HeaderElement {
            part,
            open_tag: part.default_open().to_string(),
        };
        let preceding = anchors
            .iter()
            .enumerate()
            .filter(|(_, a)| a.part < part)
            .max_by_key(|(_, a)| a.part);
        if let Some((index, _)) = preceding {
            slots[index].push(element);
            continue;
        }
        let following = anchors
            .iter()
            .enumerate()
            .filter(|(_, a)| a.part > part)
            .min_by_key(|(_, a)| a.part);
        if let Some((index, anchor)) = following {
            let at = slots[index]
                .iter()
                .position(|e| e.part == anchor.part)
                .unwrap_or(0);
            slots[index].insert(at, element);
        }
    }
    slots
}

/// Byte range of the first tag in `html[from..]` that closes an element
/// opened before `from`. With `stop_at_h2`, an `<h2>` on that same level
/// counts too.
fn unmatched_tag(html: &str, from: usize, stop_at_h2: bool) -> Option<(usize, usize)> {
    let mut depth = 0usize;
    for caps in tag_regex().captures_iter(&html[from..]) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let name = name.as_str().to_ascii_lowercase();
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let self_closing = caps.get(3).is_some_and(|m| !m.as_str().is_empty());

        if closing {
            if depth == 0 {
                return Some((from + whole.start(), from + whole.end()));
            }
            depth -= 1;
        } else if stop_at_h2 && name == "h2" && depth == 0 {
            return Some((from + whole.start(), from + whole.end()));
        } else if !self_closing && !VOID_ELEMENTS.contains(&name.as_str()) {
            depth += 1;
        }
    }
    None
}

/// Byte offset where the section whose body starts at `from` ends.
fn section_end(html: &str, from: usize) -> usize {
    unmatched_tag(html, from, true).map_or(html.len(), |(start, _)| start)
}

/// Byte offset just past the closing tag of the element whose content starts
/// at `from`.
fn element_end(html: &str, from: usize) -> Option<usize> {
    unmatched_tag(html, from, false).map(|(_, end)| end)
}

fn heading_for(slot: &SectionSlot) -> &str {
    match slot.kind {
        SectionKind::Summary => "Professional Summary",
        SectionKind::Skills => "Technical Skills",
        _ => &slot.heading,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Header
// ────────────────────────────────────────────────────────────────────────────

fn render_header_element(element: &HeaderElement, resume: &ResumeDetail) -> Option<String> {
    let info = resume.personal_info.as_ref();
    let inner = match element.part {
        HeaderPart::Name => info
            .and_then(|i| non_blank(i.full_name.as_deref()))
            .map(escape),
        HeaderPart::Role => non_blank(resume.resume.target_role.as_deref()).map(escape),
        HeaderPart::Contact => info.and_then(render_contact),
        HeaderPart::Social => info.and_then(render_social),
    }?;
    Some(format!(
        "{}{inner}</{}>",
        element.open_tag,
        element.part.tag()
    ))
}

fn render_contact(info: &PersonalInfo) -> Option<String> {
    let mut first = Vec::new();
    if let Some(email) = non_blank(info.email.as_deref()) {
        let email = escape(email);
        first.push(format!(r#"<a href="mailto:{email}">{email}</a>"#));
    }
    if let Some(phone) = non_blank(info.phone.as_deref()) {
        let dial: String = phone
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        first.push(format!(r#"<a href="tel:{dial}">{}</a>"#, escape(phone)));
    }
    if let Some(city) = non_blank(info.city.as_deref()) {
        first.push(escape(city));
    }

    let mut lines = String::new();
    if !first.is_empty() {
        let _ = write!(lines, "<p>{}</p>", first.join(" | "));
    }
    if let Some(address) = non_blank(info.address.as_deref()) {
        let _ = write!(lines, "<p>{}</p>", escape(address));
    }

    (!lines.is_empty()).then_some(lines)
}

fn render_social(info: &PersonalInfo) -> Option<String> {
    let links: Vec<String> = [
        (&info.linkedin_url, "LinkedIn"),
        (&info.portfolio_url, "Portfolio"),
        (&info.github_url, "GitHub"),
        (&info.website_url, "Website"),
    ]
    .into_iter()
    .filter_map(|(url, label)| {
        non_blank(url.as_deref())
            .map(|url| format!(r#"<a href="{}" target="_blank">{label}</a>"#, escape(url)))
    })
    .collect();

    (!links.is_empty()).then(|| links.join(" "))
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

fn render_body(kind: SectionKind, resume: &ResumeDetail) -> Option<String> {
    let items = match kind {
        SectionKind::Summary => {
            return resume.summary_text().map(|text| {
                format!(
                    r#"{ITEM_INDENT}<div class="objective"><p>{}</p></div>"#,
                    escape_multiline(text)
                )
            })
        }
        SectionKind::Skills => {
            let names = distinct(resume.skills.iter().map(|s| s.skill_name.as_str()));
            return grid("skills-list", "skills-grid", "skill-item", &names);
        }
        SectionKind::Languages => {
            let names = distinct(resume.languages.iter().map(|l| l.language_name.as_str()));
            return grid("languages-list", "languages-grid", "language-item", &names);
        }
        SectionKind::Experience => resume
            .experience
            .iter()
            .filter_map(|exp| {
                let mut fields = Vec::new();
                push_field(&mut fields, "h3", "job-title", exp.job_title.as_deref());
                push_field(&mut fields, "p", "company", exp.company_name.as_deref());
                push_field(
                    &mut fields,
                    "p",
                    "date",
                    date_range(exp.start_date.as_deref(), exp.end_date.as_deref()).as_deref(),
                );
                push_description(&mut fields, exp.description.as_deref());
                item("experience-item", fields)
            })
            .collect::<Vec<_>>(),
        SectionKind::Education => resume
            .education
            .iter()
            .filter_map(|edu| {
                let mut fields = Vec::new();
                push_field(&mut fields, "h3", "degree", edu.degree.as_deref());
                push_field(&mut fields, "p", "institute", edu.institute_name.as_deref());
                let dates = date_range(edu.start_year.as_deref(), edu.end_year.as_deref());
                let date_line = match (dates, non_blank(edu.grade.as_deref())) {
                    (Some(d), Some(g)) => Some(format!("{d} | {g}")),
                    (Some(d), None) => Some(d),
                    (None, Some(g)) => Some(g.to_string()),
                    (None, None) => None,
                };
                push_field(&mut fields, "p", "date", date_line.as_deref());
                item("education-item", fields)
            })
            .collect(),
        SectionKind::Projects => {
            let mut projects: Vec<_> = resume.projects.iter().collect();
            projects.sort_by_key(|p| p.display_order);
            projects
                .into_iter()
                .filter_map(|project| {
                    let title = non_blank(Some(project.title.as_str()))?;
                    let mut fields = Vec::new();
                    push_field(&mut fields, "h3", "project-title", Some(title));
                    push_field(
                        &mut fields,
                        "p",
                        "date",
                        date_range(project.start_date.as_deref(), project.end_date.as_deref())
                            .as_deref(),
                    );
                    push_description(&mut fields, project.description.as_deref());
                    if let Some(tech) = non_blank(project.technologies.as_deref()) {
                        fields.push(format!(
                            r#"<p class="project-tech">Technologies: {}</p>"#,
                            escape(tech)
                        ));
                    }
                    if let Some(url) = non_blank(project.project_url.as_deref()) {
                        fields.push(format!(
                            r#"<a href="{}" class="project-link" target="_blank">View Project →</a>"#,
                            escape(url)
                        ));
                    }
                    item("project-item", fields)
                })
                .collect()
        }
        SectionKind::Certifications => resume
            .certifications
            .iter()
            .filter_map(|cert| {
                let title = non_blank(Some(cert.title.as_str()))?;
                let year = non_blank(cert.year.as_deref())
                    .map(|y| format!(" - {}", escape(y)))
                    .unwrap_or_default();
                item(
                    "cert-item",
                    vec![format!("<p><strong>{}</strong>{year}</p>", escape(title))],
                )
            })
            .collect(),
    };

    if items.is_empty() {
        return None;
    }
    Some(
        items
            .iter()
            .map(|i| format!("{ITEM_INDENT}{i}"))
            .collect::<String>(),
    )
}

fn push_field(fields: &mut Vec<String>, tag: &str, class: &str, value: Option<&str>) {
    if let Some(value) = non_blank(value) {
        fields.push(format!(r#"<{tag} class="{class}">{}</{tag}>"#, escape(value)));
    }
}

fn push_description(fields: &mut Vec<String>, description: Option<&str>) {
    if let Some(text) = non_blank(description) {
        fields.push(format!(
            r#"<div class="description"><p>{}</p></div>"#,
            escape_multiline(text)
        ));
    }
}

/// Wraps item fields in a `<div>`; an item with no fields is not rendered.
fn item(class: &str, fields: Vec<String>) -> Option<String> {
    if fields.is_empty() {
        return None;
    }
    let mut out = format!(r#"<div class="{class}">"#);
    for field in fields {
        out.push_str(FIELD_INDENT);
        out.push_str(&field);
    }
    out.push_str(ITEM_INDENT);
    out.push_str("</div>");
    Some(out)
}

/// Non-blank names with duplicates removed (case-insensitive), first spelling kept.
fn distinct<'a>(names: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    names
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .filter(|n| seen.insert(n.to_lowercase()))
        .collect()
}

fn grid(list_class: &str, grid_class: &str, class: &str, names: &[&str]) -> Option<String> {
    if names.is_empty() {
        return None;
    }
    let mut out = format!(
        r#"{ITEM_INDENT}<div class="{list_class}">{FIELD_INDENT}<div class="{grid_class}">"#
    );
    for name in names {
        let _ = write!(out, r#"{GRID_INDENT}<div class="{class}">{}</div>"#, escape(name));
    }
    let _ = write!(out, "{FIELD_INDENT}</div>{ITEM_INDENT}</div>");
    Some(out)
}
