//! Plain terminal rendering for the one-shot commands.

use colored::Colorize;
use std::fmt::Write;

use crate::content::{ClassifiedPoint, PointKind};
use crate::controller::{DisplayResponse, SuggestedQuery};
use crate::linkify::Segment;

/// Join segments, highlighting links
fn styled(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Text(text) => text.normal().to_string(),
            Segment::Link(url) => url.blue().underline().to_string(),
        })
        .collect()
}

fn point(out: &mut String, point: &ClassifiedPoint) -> std::fmt::Result {
    let text = styled(&point.segments);
    match point.kind {
        PointKind::Heading => writeln!(out, "\n  {}", text.bold().cyan()),
        PointKind::Reference => {
            writeln!(out, "\n  {}", "References".bold().cyan())?;
            writeln!(out, "    {}", text)
        }
        PointKind::Note => writeln!(out, "  ℹ️  {}", text.italic()),
        PointKind::Body => writeln!(out, "  • {}", text),
    }
}

/// Render an answer the way the summary view lays it out
pub fn response(response: &DisplayResponse) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_response(&mut out, response);
    out
}

fn write_response(out: &mut String, response: &DisplayResponse) -> std::fmt::Result {
    let content = &response.formatted_content;

    writeln!(out, "{}", "You asked:".dimmed())?;
    writeln!(out, "  {}", response.current_query.bold())?;
    writeln!(out, "  {}\n", format!("answered {}", response.answered_at()).dimmed())?;

    writeln!(out, "📖 {}", "Summary".bold().blue())?;
    writeln!(out, "  {}", styled(&content.summary_segments()))?;

    if !content.points.is_empty() {
        writeln!(out, "\n📌 {}", "Key Points".bold().blue())?;
        for classified in content.classified_points() {
            point(out, &classified)?;
        }
    }

    Ok(())
}

/// Render the suggested queries as a numbered list
pub fn suggestions(queries: &[SuggestedQuery]) -> String {
    let mut out = format!("{}\n\n", "Popular Searches".bold());
    for (index, item) in queries.iter().enumerate() {
        out.push_str(&format!(
            "  {}. {} {}\n     {}\n",
            index + 1,
            item.icon,
            item.title.bold(),
            item.query.dimmed()
        ));
    }
    out
}

/// The error banner line
pub fn error(message: &str) -> String {
    format!("{} {}", "✖".red(), message.red())
}
