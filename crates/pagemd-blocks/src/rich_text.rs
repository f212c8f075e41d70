//! Typed view over the inline rich-text encoding.
//!
//! Text-bearing properties are stored as nested JSON arrays:
//!
//! ```text
//! [["plain "], ["bold", [["b"]]], ["link", [["a", "https://example.com"]]]]
//! ```
//!
//! Each element is either a one-element array holding a text fragment, or a
//! two-element array of a fragment and its format directives. Decoding is
//! lenient: shapes that do not match are skipped, never reported.

use serde_json::Value;

/// A single format directive attached to a text fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Format {
    /// `["b"]`
    Bold,
    /// `["a", url]`
    Link(String),
    /// Any other directive (italic, colour, mentions, ...).
    Unknown,
}

impl Format {
    fn from_value(value: &Value) -> Self {
        let Some(parts) = value.as_array() else {
            return Self::Unknown;
        };
        match parts.as_slice() {
            [Value::String(tag)] if tag == "b" => Self::Bold,
            [Value::String(tag), Value::String(url), ..] if tag == "a" => Self::Link(url.clone()),
            _ => Self::Unknown,
        }
    }
}

/// A text fragment with its directives, in stored order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub formats: Vec<Format>,
}

/// Decoded rich-text value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RichText {
    segments: Vec<Segment>,
}

impl RichText {
    /// Decode a stored value. Anything that is not an array decodes to empty.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(parts) = value.as_array() else {
            return Self::default();
        };

        let segments = parts
            .iter()
            .filter_map(|part| match part.as_array()?.as_slice() {
                [text] => Some(Segment {
                    text: fragment(text),
                    formats: Vec::new(),
                }),
                [text, formats] => Some(Segment {
                    text: fragment(text),
                    formats: formats
                        .as_array()
                        .map(|list| list.iter().map(Format::from_value).collect())
                        .unwrap_or_default(),
                }),
                _ => None,
            })
            .collect();

        Self { segments }
    }

    /// Build a value holding one unformatted fragment.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment {
                text: text.into(),
                formats: Vec::new(),
            }],
        }
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Text of the first segment, ignoring formatting.
    ///
    /// Used for single-valued properties such as an image `source`.
    #[must_use]
    pub fn first_fragment(&self) -> Option<&str> {
        self.segments.first().map(|s| s.text.as_str())
    }

    /// All fragments concatenated without formatting.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Scalar fragments (numbers, booleans) keep their JSON text.
fn fragment(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
