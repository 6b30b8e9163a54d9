//! Hyperlink detection for answer text.
//!
//! Splits text into plain runs and `http(s)://` links so renderers can style
//! links without losing any of the surrounding text.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    /// A scheme followed by everything up to the next whitespace character
    static ref URL_PATTERN: Regex = Regex::new(r"https?://\S+").expect("valid URL pattern");
}

/// A run of text inside a linkified string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Segment {
    /// Plain text, rendered as-is
    Text(String),
    /// A URL, used as both the link target and its label
    Link(String),
}

impl Segment {
    /// The raw text this segment covers
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Text(text) | Segment::Link(text) => text,
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(self, Segment::Link(_))
    }
}

/// Split `text` into plain and link segments.
///
/// Text without any URL comes back as a single `Text` segment equal to the
/// input (including the empty string). Otherwise empty plain runs between
/// adjacent matches are skipped; concatenating the segments always yields the
/// input unchanged.
pub fn linkify(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for found in URL_PATTERN.find_iter(text) {
        if found.start() > last {
            segments.push(Segment::Text(text[last..found.start()].to_string()));
        }
        segments.push(Segment::Link(found.as_str().to_string()));
        last = found.end();
    }

    if segments.is_empty() {
        return vec![Segment::Text(text.to_string())];
    }

    if last < text.len() {
        segments.push(Segment::Text(text[last..].to_string()));
    }

    segments
}

/// Concatenate segments back into their source text
pub fn flatten(segments: &[Segment]) -> String {
    segments.iter().map(Segment::as_str).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_single_segment() {
        let segments = linkify("no links here, just words");
        assert_eq!(
            segments,
            vec![Segment::Text("no links here, just words".to_string())]
        );
    }

    #[test]
    fn empty_input_is_a_single_empty_segment() {
        assert_eq!(linkify(""), vec![Segment::Text(String::new())]);
    }

    #[test]
    fn splits_around_links() {
        let segments = linkify("see https://example.com/a?b=c for more");
        assert_eq!(
            segments,
            vec![
                Segment::Text("see ".to_string()),
                Segment::Link("https://example.com/a?b=c".to_string()),
                Segment::Text(" for more".to_string()),
            ]
        );
    }

    #[test]
    fn link_runs_to_end_of_string() {
        let segments = linkify("source: http://x.com/path).");
        assert_eq!(segments.last(), Some(&Segment::Link("http://x.com/path).".to_string())));
    }

    #[test]
    fn adjacent_links_have_no_empty_segments() {
        let segments = linkify("http://a.com\thttps://b.org");
        assert_eq!(
            segments,
            vec![
                Segment::Link("http://a.com".to_string()),
                Segment::Text("\t".to_string()),
                Segment::Link("https://b.org".to_string()),
            ]
        );
        assert!(segments.iter().all(|s| !s.as_str().is_empty()));
    }

    #[test]
    fn bare_scheme_is_not_a_link() {
        assert_eq!(linkify("http:// alone"), vec![Segment::Text("http:// alone".to_string())]);
        assert_eq!(linkify("ftp://files.example"), vec![Segment::Text("ftp://files.example".to_string())]);
    }

    #[test]
    fn flatten_reproduces_input() {
        let inputs = [
            "plain",
            "https://only.link",
            "  leading http://a.b and trailing  ",
            "two http://one.com, http://two.com\nnext line",
            "unicode ✓ https://例え.jp/パス done",
        ];
        for input in inputs {
            assert_eq!(flatten(&linkify(input)), input);
        }
    }
}
