//! `<intention>…</intention>` tag convention used to carry a classification
//! label inside a text answer. When several tags appear, the first one wins.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref INTENT_TAG: Regex = Regex::new(r"<intention>(.*?)</intention>").unwrap();
}

/// Label reported when no tag carries a known label.
pub const FALLBACK_LABEL: &str = "irrelevant";

pub fn wrap(intent: &str) -> String {
    format!("<intention>{}</intention>", intent)
}

/// Content of every tag, in order of appearance.
pub fn tags(text: &str) -> Vec<&str> {
    INTENT_TAG
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

pub fn first_tag(text: &str) -> Option<&str> {
    tags(text).into_iter().next()
}

/// First tag whose content is one of `labels`, else [`FALLBACK_LABEL`].
pub fn classify<'a>(text: &'a str, labels: &[String]) -> &'a str {
    tags(text)
        .into_iter()
        .find(|t| labels.iter().any(|l| l == t))
        .unwrap_or(FALLBACK_LABEL)
}
