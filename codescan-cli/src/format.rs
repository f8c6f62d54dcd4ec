use codescan::{Match, SearchResult};
use colored::Colorize;
use serde_json::json;

/// Renders a search result as human-readable text.
///
/// `compact` collapses each match to a single `path:line: content` line;
/// `group_by_file` prints one header per file instead of repeating the path
/// per match; `summary` appends the match/file totals. All three are purely
/// presentational: the underlying result is never re-shaped.
pub fn format_text(
    result: &SearchResult,
    compact: bool,
    group_by_file: bool,
    summary: bool,
) -> String {
    if result.file_results.is_empty() {
        return "No matches found.".to_string();
    }

    let mut lines = Vec::new();

    if group_by_file {
        for file_result in &result.file_results {
            let header = format!("File: {}", file_result.path.display());
            lines.push(header.clone());
            lines.push("-".repeat(header.len().min(80)));

            for m in &file_result.matches {
                if compact {
                    lines.push(format!("{}: {}", m.line_number, highlight(m)));
                } else {
                    push_match_block(&mut lines, m);
                }
            }
            lines.push(String::new());
        }
    } else {
        for file_result in &result.file_results {
            for m in &file_result.matches {
                if compact {
                    lines.push(format!(
                        "{}:{}: {}",
                        file_result.path.display(),
                        m.line_number,
                        highlight(m)
                    ));
                } else {
                    lines.push(file_result.path.display().to_string());
                    push_match_block(&mut lines, m);
                }
            }
        }
    }

    if summary {
        lines.push(String::new());
        lines.push(format!(
            "Found {} matches in {} files",
            result.total_matches, result.files_matched
        ));
    }

    lines.join("\n")
}

fn push_match_block(lines: &mut Vec<String>, m: &Match) {
    lines.push(format!("{}:", m.line_number));
    for (_, text) in &m.context_before {
        lines.push(format!("  {text}"));
    }
    lines.push(format!("> {}", highlight(m)));
    for (_, text) in &m.context_after {
        lines.push(format!("  {text}"));
    }
    lines.push(String::new());
}

/// The matched line with the matched span emphasized. `colored` suppresses
/// the escape codes when output is not a terminal or colors are overridden.
fn highlight(m: &Match) -> String {
    let before = &m.line_content[..m.start];
    let matched = &m.line_content[m.start..m.end];
    let after = &m.line_content[m.end..];
    format!("{}{}{}", before, matched.red().bold(), after)
}

/// Renders a search result as pretty-printed JSON: a flat `results` array
/// (one object per match) plus a `summary` object, which is always present.
pub fn format_json(result: &SearchResult) -> String {
    let matches: Vec<_> = result
        .file_results
        .iter()
        .flat_map(|file_result| {
            file_result.matches.iter().map(|m| {
                json!({
                    "file_path": file_result.path,
                    "line_number": m.line_number,
                    "line_content": m.line_content,
                    "match_start": m.start,
                    "match_end": m.end,
                    "context_before": m.context_before,
                    "context_after": m.context_after,
                })
            })
        })
        .collect();

    let payload = json!({
        "results": matches,
        "summary": result.summary(),
    });

    serde_json::to_string_pretty(&payload).expect("result serialization is infallible")
}
