//! Rich text to Markdown inline text.

use pagemd_blocks::{Format, RichText};
use serde_json::Value;

/// Resolve decoded rich text to Markdown.
///
/// Each fragment is wrapped by its directives in stored order, so
/// `["x", [["b"], ["a", "u"]]]` becomes `[**x**](u)` while the reversed
/// directive list gives `**[x](u)**`. Unknown directives are ignored.
#[must_use]
pub fn resolve(text: &RichText) -> String {
    let mut out = String::new();
    for segment in text.segments() {
        let mut fragment = segment.text.clone();
        for format in &segment.formats {
            match format {
                Format::Bold => fragment = format!("**{fragment}**"),
                Format::Link(url) => fragment = format!("[{fragment}]({url})"),
                Format::Unknown => {}
            }
        }
        out.push_str(&fragment);
    }
    out
}

/// Resolve a raw stored value. Absent or non-array input gives `""`.
#[must_use]
pub fn resolve_value(value: Option<&Value>) -> String {
    value
        .map(|v| resolve(&RichText::from_value(v)))
        .unwrap_or_default()
}
