//! README section rendering and replacement.

use crate::error::SpliceError;
use crate::stats::RepoSummary;

/// Byte offsets of the two markers inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerSpan {
    pub start: usize,
    pub end: usize,
}

fn find_once(content: &str, marker: &str) -> Result<usize, SpliceError> {
    let pos = content
        .find(marker)
        .ok_or_else(|| SpliceError::MissingMarker {
            marker: marker.to_string(),
        })?;
    if content[pos + marker.len()..].contains(marker) {
        return Err(SpliceError::DuplicateMarker {
            marker: marker.to_string(),
        });
    }
    Ok(pos)
}

/// Checks that both markers occur exactly once, start before end.
pub fn locate_markers(
    content: &str,
    start_marker: &str,
    end_marker: &str,
) -> Result<MarkerSpan, SpliceError> {
    let start = find_once(content, start_marker)?;
    let end = find_once(content, end_marker)?;
    if end < start + start_marker.len() {
        return Err(SpliceError::MarkersOutOfOrder {
            start: start_marker.to_string(),
            end: end_marker.to_string(),
        });
    }
    Ok(MarkerSpan { start, end })
}

/// Replaces `[start of start_marker, start of end_marker)` with `section`.
///
/// Everything before the start marker and everything from the end marker on
/// is kept byte for byte.
pub fn splice(
    content: &str,
    start_marker: &str,
    end_marker: &str,
    section: &str,
) -> Result<String, SpliceError> {
    let span = locate_markers(content, start_marker, end_marker)?;
    let mut out = String::with_capacity(content.len() + section.len());
    out.push_str(&content[..span.start]);
    out.push_str(section);
    out.push_str(&content[span.end..]);
    Ok(out)
}

/// Formats the stats section. The heading is the start marker itself so the
/// next run finds it again.
pub fn render_section(heading: &str, user: &str, summary: &RepoSummary, updated: &str) -> String {
    let languages = summary.language_names().collect::<Vec<_>>().join(", ");

    format!(
        r#"{heading}

Last updated: {updated}

- Total Repositories: {repos}
- Total Stars: {stars}
- Most Used Languages: {languages}

<div align="center">
![Language Stats](https://github-readme-stats.vercel.app/api/top-langs/?username={user}&layout=compact&theme=radical)
![Project Activity](https://activity-graph.herokuapp.com/graph?username={user}&theme=github)
</div>

"#,
        repos = summary.repos,
        stars = summary.stars,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "## 📊 Real-time Stats";
    const END: &str = "## 💻 Tech Stack";

    fn summary() -> RepoSummary {
        let mut s = RepoSummary::default();
        s.add_repository(5);
        s.add_languages([("Rust".to_string(), 10), ("Go".to_string(), 3)]);
        s.add_repository(2);
        s.add_languages([("Python".to_string(), 1)]);
        s
    }

    fn doc() -> String {
        format!("# Hi there\n\nintro text\n\n{START}\n\nold stats\n\n{END}\n\n- rust\n- go\n")
    }

    #[test]
    fn section_lists_figures_and_badges() {
        let section = render_section(START, "octo", &summary(), "2024-03-01 09:30");

        assert!(section.starts_with(START));
        assert!(section.contains("Last updated: 2024-03-01 09:30\n"));
        assert!(section.contains("- Total Repositories: 2\n"));
        assert!(section.contains("- Total Stars: 7\n"));
        assert!(section.contains("- Most Used Languages: Go, Python, Rust\n"));
        assert!(section.contains("top-langs/?username=octo&layout=compact&theme=radical"));
        assert!(section.contains("graph?username=octo&theme=github"));
        assert!(section.ends_with("</div>\n\n"));
    }

    #[test]
    fn empty_summary_renders_blank_language_list() {
        let section = render_section(START, "octo", &RepoSummary::default(), "now");
        assert!(section.contains("- Total Repositories: 0\n"));
        assert!(section.contains("- Most Used Languages: \n"));
    }

    #[test]
    fn splice_preserves_surroundings() {
        let before = "# Hi there\n\nintro text\n\n";
        let after = format!("{END}\n\n- rust\n- go\n");

        let out = splice(&doc(), START, END, "NEW\n").unwrap();

        assert_eq!(out, format!("{before}NEW\n{after}"));
    }

    #[test]
    fn splice_is_idempotent() {
        let section = render_section(START, "octo", &summary(), "2024-03-01 09:30");

        let first = splice(&doc(), START, END, &section).unwrap();
        let second = splice(&first, START, END, &section).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn markers_at_document_edges() {
        let content = format!("{START}{END}");
        assert_eq!(splice(&content, START, END, "x").unwrap(), format!("x{END}"));
    }

    #[test]
    fn missing_markers_are_named() {
        let no_start = format!("intro\n{END}\n");
        assert_eq!(
            splice(&no_start, START, END, "x").unwrap_err(),
            SpliceError::MissingMarker {
                marker: START.to_string()
            }
        );

        let no_end = format!("intro\n{START}\n");
        assert_eq!(
            splice(&no_end, START, END, "x").unwrap_err(),
            SpliceError::MissingMarker {
                marker: END.to_string()
            }
        );
    }

    #[test]
    fn out_of_order_markers_rejected() {
        let content = format!("{END}\nmiddle\n{START}\n");
        assert!(matches!(
            splice(&content, START, END, "x"),
            Err(SpliceError::MarkersOutOfOrder { .. })
        ));
    }

    #[test]
    fn duplicate_marker_rejected() {
        let content = format!("{START}\n{START}\n{END}\n");
        assert_eq!(
            locate_markers(&content, START, END).unwrap_err(),
            SpliceError::DuplicateMarker {
                marker: START.to_string()
            }
        );
    }
}
