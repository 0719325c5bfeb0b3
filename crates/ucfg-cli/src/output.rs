//! # Report Rendering
//!
//! Text and JSON renderings of per-file validation outcomes.

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use ucfg_core::UcfgError;
use ucfg_schema::{ValidationReport, Violation};

/// Output format for command results.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per resource, violations indented beneath it.
    #[default]
    Text,
    /// A JSON array with one object per resource.
    Json,
}

/// Validation outcome for one resource file.
#[derive(Debug, Serialize)]
pub struct FileReport<'a> {
    pub file: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Why the file could not be read or decoded. Such a file is invalid
    /// and has no violations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub violations: &'a [Violation],
}

impl<'a> FileReport<'a> {
    pub fn new(file: &Path, report: &'a ValidationReport) -> Self {
        Self {
            file: file.display().to_string(),
            valid: report.is_valid(),
            schema: report.schema().map(ToString::to_string),
            error: None,
            violations: report.violations(),
        }
    }

    /// Entry for a file that never reached validation.
    pub fn load_error(file: &Path, error: &UcfgError) -> Self {
        Self {
            file: file.display().to_string(),
            valid: false,
            schema: None,
            error: Some(error.to_string()),
            violations: &[],
        }
    }
}

/// Write reports in the requested format.
pub fn write_reports(
    out: &mut dyn Write,
    format: OutputFormat,
    reports: &[FileReport<'_>],
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for report in reports {
                write_text(out, report)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, reports)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn write_text(out: &mut dyn Write, report: &FileReport<'_>) -> std::io::Result<()> {
    if let Some(error) = &report.error {
        return writeln!(out, "{}: error, {error}", report.file);
    }
    if report.valid {
        let schema = report.schema.as_deref().unwrap_or("-");
        return writeln!(out, "{}: valid ({schema})", report.file);
    }
    let count = report.violations.len();
    let noun = if count == 1 { "violation" } else { "violations" };
    writeln!(out, "{}: invalid, {count} {noun}", report.file)?;
    for violation in report.violations {
        writeln!(out, "  {violation}")?;
    }
    Ok(())
}
