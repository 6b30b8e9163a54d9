//! Answer payloads and their classification into display blocks.
//!
//! The backend makes no schema promises, so the payload is validated once at
//! the boundary ([`RawApiResponse::parse`]) and everything downstream works
//! with typed values.

use crate::linkify::{linkify, Segment};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Summary shown when the backend gives none
pub const NO_SUMMARY: &str = "No summary available";

/// Literal marker removed from reference points before display
const REFERENCES_MARKER: &str = "References:";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    #[error("Invalid response format")]
    InvalidFormat,
}

/// Structured answer body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructuredContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<String>>,
}

/// The `content` field of an answer: free text or a summary with points
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Structured(StructuredContent),
}

/// An answer as returned by the backend.
///
/// Fields other than `content` are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawApiResponse {
    pub content: Content,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawApiResponse {
    /// Validate an untyped payload.
    ///
    /// `content` must be a string or an object whose `summary` (if set) is a
    /// string and whose `points` (if set) is an array of strings. `null`
    /// members count as absent. An array is an object with neither.
    pub fn parse(value: Value) -> Result<Self, ContentError> {
        let Value::Object(mut fields) = value else {
            return Err(ContentError::InvalidFormat);
        };

        let content = match fields.remove("content") {
            Some(Value::String(text)) => Content::Text(text),
            Some(Value::Object(object)) => Content::Structured(parse_structured(object)?),
            // An array carries neither a summary nor points.
            Some(Value::Array(_)) => Content::Structured(StructuredContent::default()),
            _ => return Err(ContentError::InvalidFormat),
        };

        Ok(Self {
            content,
            extra: fields,
        })
    }

    /// Derive the summary and point list for display
    pub fn formatted(&self) -> FormattedContent {
        FormattedContent::from_content(&self.content)
    }
}

fn parse_structured(mut object: Map<String, Value>) -> Result<StructuredContent, ContentError> {
    let summary = match object.remove("summary") {
        None | Some(Value::Null) => None,
        Some(Value::String(summary)) => Some(summary),
        Some(_) => return Err(ContentError::InvalidFormat),
    };

    let points = match object.remove("points") {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .map(|item| match item {
                    Value::String(point) => Ok(point),
                    _ => Err(ContentError::InvalidFormat),
                })
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Some(_) => return Err(ContentError::InvalidFormat),
    };

    Ok(StructuredContent { summary, points })
}

/// Summary plus ordered points, ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedContent {
    pub summary: String,
    pub points: Vec<String>,
}

impl FormattedContent {
    /// Free text is split into non-blank lines: the first becomes the
    /// summary, the rest the points. Structured content is taken as given.
    pub fn from_content(content: &Content) -> Self {
        match content {
            Content::Text(text) => {
                let mut lines = text
                    .split('\n')
                    .filter(|line| !line.trim().is_empty())
                    .map(str::to_string);
                let summary = lines.next().unwrap_or_else(|| NO_SUMMARY.to_string());
                Self {
                    summary,
                    points: lines.collect(),
                }
            }
            Content::Structured(structured) => Self {
                summary: structured
                    .summary
                    .clone()
                    .filter(|summary| !summary.is_empty())
                    .unwrap_or_else(|| NO_SUMMARY.to_string()),
                points: structured.points.clone().unwrap_or_default(),
            },
        }
    }

    /// Classify every point, preserving order
    pub fn classified_points(&self) -> Vec<ClassifiedPoint> {
        self.points.iter().map(|point| ClassifiedPoint::new(point)).collect()
    }

    /// The summary split into plain and link segments
    pub fn summary_segments(&self) -> Vec<Segment> {
        linkify(&self.summary)
    }
}

/// Validate and format a raw payload in one step
pub fn classify(data: Value) -> Result<FormattedContent, ContentError> {
    RawApiResponse::parse(data).map(|response| response.formatted())
}

/// How a single point is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    Heading,
    Reference,
    Note,
    Body,
}

impl PointKind {
    /// First match wins: heading, reference, note, then body.
    pub fn of(point: &str) -> Self {
        let folded = point.to_lowercase();
        if point.starts_with("**") || point.starts_with('#') {
            PointKind::Heading
        } else if folded.contains("references:") {
            PointKind::Reference
        } else if folded.starts_with("note:") {
            PointKind::Note
        } else {
            PointKind::Body
        }
    }
}

/// A point with its kind and the segments to display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedPoint {
    pub kind: PointKind,
    pub segments: Vec<Segment>,
}

impl ClassifiedPoint {
    pub fn new(point: &str) -> Self {
        let kind = PointKind::of(point);
        let text = match kind {
            PointKind::Heading => strip_heading_markup(point),
            // Only the exact-case marker is removed even though matching is
            // case-insensitive.
            PointKind::Reference => point.replacen(REFERENCES_MARKER, "", 1),
            PointKind::Note | PointKind::Body => point.to_string(),
        };
        Self {
            kind,
            segments: linkify(&text),
        }
    }

    /// Display text with link markup removed
    pub fn text(&self) -> String {
        crate::linkify::flatten(&self.segments)
    }
}

/// Drop every `**`, then a leading run of `#` and the whitespace after it
fn strip_heading_markup(point: &str) -> String {
    let unbolded = point.replace("**", "");
    let hashes = unbolded.len() - unbolded.trim_start_matches('#').len();
    if hashes > 0 {
        let rest = &unbolded[hashes..];
        if let Some(space) = rest.chars().next().filter(|c| c.is_whitespace()) {
            return rest[space.len_utf8()..].to_string();
        }
    }
    unbolded
}
