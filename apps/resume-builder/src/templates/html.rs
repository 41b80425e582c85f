use std::sync::OnceLock;

use regex::Regex;

/// Escapes text for use in element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes multi-line text and turns line breaks into `<br>`.
pub fn escape_multiline(text: &str) -> String {
    text.trim()
        .lines()
        .map(|line| escape(line.trim_end()))
        .collect::<Vec<_>>()
        .join("<br>")
}

static TAG_RE: OnceLock<Regex> = OnceLock::new();

/// Plain text of an HTML fragment with whitespace collapsed.
pub fn strip_tags(fragment: &str) -> String {
    let re = TAG_RE.get_or_init(|| {
        Regex::new(r"<[^>]*>").unwrap_or_else(|error| panic!("tag regex failed to compile: {error}"))
    });
    re.replace_all(fragment, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// "start - end", or whichever side is present. `None` when both are blank.
pub fn date_range(start: Option<&str>, end: Option<&str>) -> Option<String> {
    let start = start.map(str::trim).filter(|s| !s.is_empty());
    let end = end.map(str::trim).filter(|s| !s.is_empty());
    match (start, end) {
        (Some(s), Some(e)) => Some(format!("{s} - {e}")),
        (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
        (None, None) => None,
    }
}
