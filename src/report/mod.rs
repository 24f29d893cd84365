//! Reports: read-only renderings of the whole state for sharing outside the CLI.

pub mod html;
pub mod json;
pub mod pdf;

use anyhow::{Context, Result};
use std::path::Path;

use crate::state::AppState;

/// Trait for report generation. Reporters never mutate the state.
pub trait Reporter {
    fn name(&self) -> &'static str;
    fn file_extension(&self) -> &'static str;
    /// Full contents of the report file.
    fn render(&self, state: &AppState) -> Result<Vec<u8>>;
}

/// Create a reporter by format name.
pub fn create_reporter(format: &str) -> Option<Box<dyn Reporter>> {
    match format {
        "html" => Some(Box::new(html::HtmlReporter::new())),
        "json" => Some(Box::new(json::JsonReporter)),
        "pdf" => Some(Box::new(pdf::PdfReporter::new())),
        _ => None,
    }
}

/// List all available reporter format names.
pub fn available_formats() -> &'static [&'static str] {
    &["html", "json", "pdf"]
}

/// File name used when no output path is given.
pub fn default_file_name(reporter: &dyn Reporter) -> String {
    format!("equity-growth-compass-report.{}", reporter.file_extension())
}

/// Generate a report and write it to `path`.
pub fn write_report(reporter: &dyn Reporter, state: &AppState, path: &Path) -> Result<()> {
    let content = reporter
        .render(state)
        .with_context(|| format!("Failed to generate {} report", reporter.name()))?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    tracing::info!(format = reporter.name(), path = %path.display(), "report written");
    Ok(())
}

/// Open a written report in the user's default browser.
pub fn open_report(path: &Path) -> Result<()> {
    let target = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    webbrowser::open(&target.to_string_lossy())
        .with_context(|| format!("Failed to open browser for {}", target.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_known_reporters() {
        for format in available_formats() {
            let reporter = create_reporter(format).unwrap();
            assert_eq!(reporter.name(), *format);
        }
        assert!(create_reporter("xlsx").is_none());
    }

    #[test]
    fn test_default_file_name() {
        let reporter = create_reporter("html").unwrap();
        assert_eq!(
            default_file_name(reporter.as_ref()),
            "equity-growth-compass-report.html"
        );
    }

    #[test]
    fn test_write_report_leaves_state_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let state = AppState::new();
        let before = state.clone();

        let reporter = create_reporter("json").unwrap();
        write_report(reporter.as_ref(), &state, &path).unwrap();

        assert!(path.exists());
        assert_eq!(state, before);
    }

    #[test]
    fn test_write_pdf_report() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = create_reporter("pdf").unwrap();
        let path = dir.path().join(default_file_name(reporter.as_ref()));
        write_report(reporter.as_ref(), &AppState::new(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_write_report_to_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.html");
        let reporter = create_reporter("html").unwrap();
        let err = write_report(reporter.as_ref(), &AppState::new(), &path).unwrap_err();
        assert!(err.to_string().contains("Failed to write report"));
    }
}
