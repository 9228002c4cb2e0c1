//! Markdown and JSON artifacts derived from an analysis.

use crate::endpoint::EndpointDescriptor;
use crate::pipeline::Analysis;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the markdown report.
pub const MARKDOWN_FILE: &str = "api_report.md";

/// File name of the raw endpoint array.
pub const JSON_FILE: &str = "endpoints.json";

/// Paths of the artifacts written for one analysis.
#[derive(Debug, Clone)]
pub struct WrittenReport {
    pub markdown: PathBuf,
    pub json: PathBuf,
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

/// Endpoint table with a `Method | Path | Note` header.
pub fn endpoint_table(endpoints: &[EndpointDescriptor]) -> String {
    let mut out = String::from("| Method | Path | Note |\n|---|---|---|\n");
    for ep in endpoints {
        let _ = writeln!(
            out,
            "| {} | `{}` | {} |",
            ep.method,
            escape_cell(&ep.path),
            escape_cell(&ep.summary)
        );
    }
    out
}

/// Full markdown report: header, endpoint table, then the AI notes section.
pub fn render_markdown(analysis: &Analysis, notes: Option<&str>, generated_at: DateTime<Utc>) -> String {
    let mut out = String::from("# API Inspector Report\n\n");
    let _ = writeln!(out, "- **Base URL:** {}", analysis.base_url);
    let _ = writeln!(out, "- **Discovered via:** {}", analysis.source.describe());
    if let Some(title) = analysis.spec.as_ref().and_then(|s| s.title()) {
        let _ = writeln!(out, "- **Title:** {title}");
    }
    let _ = writeln!(out, "- **Endpoints:** {}", analysis.endpoints.len());
    let _ = writeln!(out, "- **Generated:** {}", generated_at.to_rfc3339());
    out.push_str("\n## Endpoints\n\n");
    out.push_str(&endpoint_table(&analysis.endpoints));
    out.push_str("\n## AI Notes\n\n");
    match notes {
        Some(notes) if !notes.trim().is_empty() => {
            out.push_str(notes.trim());
            out.push('\n');
        }
        _ => out.push_str("_No summary generated._\n"),
    }
    out
}

/// Raw JSON array of endpoint descriptors.
pub fn render_json(endpoints: &[EndpointDescriptor]) -> Result<String> {
    serde_json::to_string_pretty(endpoints).context("failed to serialize endpoints")
}

/// Write both artifacts into `dir`, creating it if needed.
pub fn write_report(dir: &Path, analysis: &Analysis, notes: Option<&str>) -> Result<WrittenReport> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output dir: {}", dir.display()))?;

    let markdown = dir.join(MARKDOWN_FILE);
    fs::write(&markdown, render_markdown(analysis, notes, Utc::now()))
        .with_context(|| format!("failed to write {}", markdown.display()))?;

    let json = dir.join(JSON_FILE);
    fs::write(&json, render_json(&analysis.endpoints)?)
        .with_context(|| format!("failed to write {}", json.display()))?;

    Ok(WrittenReport { markdown, json })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::HttpMethod;
    use crate::pipeline::DiscoverySource;
    use assert_json_diff::assert_json_eq;
    use chrono::TimeZone;

    fn analysis() -> Analysis {
        Analysis {
            base_url: "http://api.test".to_string(),
            source: DiscoverySource::HtmlFallback,
            endpoints: vec![
                EndpointDescriptor::new(HttpMethod::Get, "/widgets", "Found via HTML fallback"),
                EndpointDescriptor::new(HttpMethod::Post, "/a|b", "pipe | note"),
            ],
            spec: None,
        }
    }

    #[test]
    fn test_markdown_table_and_notes() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let md = render_markdown(&analysis(), Some("## GET /widgets\nLists widgets.\n"), at);

        assert!(md.starts_with("# API Inspector Report\n"));
        assert!(md.contains("- **Base URL:** http://api.test\n"));
        assert!(md.contains("- **Generated:** 2026-01-02T03:04:05+00:00\n"));
        assert!(md.contains("| Method | Path | Note |\n|---|---|---|\n"));
        assert!(md.contains("| GET | `/widgets` | Found via HTML fallback |\n"));
        assert!(md.contains("| POST | `/a\\|b` | pipe \\| note |\n"));

        let table_at = md.find("## Endpoints").unwrap();
        let notes_at = md.find("## AI Notes").unwrap();
        assert!(table_at < notes_at);
        assert!(md.ends_with("## GET /widgets\nLists widgets.\n"));
    }

    #[test]
    fn test_markdown_without_notes() {
        let md = render_markdown(&analysis(), None, Utc::now());
        assert!(md.ends_with("## AI Notes\n\n_No summary generated._\n"));
    }

    #[test]
    fn test_json_artifact() {
        let json: serde_json::Value = serde_json::from_str(&render_json(&analysis().endpoints).unwrap()).unwrap();
        assert_json_eq!(
            json,
            serde_json::json!([
                {"method": "GET", "path": "/widgets", "summary": "Found via HTML fallback"},
                {"method": "POST", "path": "/a|b", "summary": "pipe | note"}
            ])
        );
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        let written = write_report(&out, &analysis(), None).unwrap();
        assert!(written.markdown.exists());
        let raw = fs::read_to_string(&written.json).unwrap();
        let back: Vec<EndpointDescriptor> = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, analysis().endpoints);
    }
}
