//! # Validate Subcommand
//!
//! Validates configuration resource files against the schema each one
//! declares. Equivalent to the device tools' pre-write check, without a
//! device attached.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use ucfg_core::{DeviceClass, UcfgError};
use ucfg_schema::{Resolver, ValidationPolicy, ValidationReport};

use crate::loader::{load_document, RegistryArgs};
use crate::output::{write_reports, FileReport, OutputFormat};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Resource files to validate. `.yaml`/`.yml` files are read as YAML,
    /// anything else as JSON.
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub registry: RegistryArgs,

    /// Report every failing check at a field, not only the first.
    #[arg(long)]
    pub all_failures: bool,

    /// Reject resources that target a different device class.
    #[arg(long, value_name = "CLASS")]
    pub device_class: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl ValidateArgs {
    fn policy(&self) -> ValidationPolicy {
        if self.all_failures {
            ValidationPolicy::all_failures()
        } else {
            ValidationPolicy::default()
        }
    }
}

/// Run the validate subcommand. Returns `true` if every file is valid.
///
/// A file that cannot be read or decoded is reported as invalid and the
/// remaining files are still validated.
pub fn run_validate(args: &ValidateArgs, out: &mut dyn Write) -> anyhow::Result<bool> {
    let registry = args.registry.load().context("failed to load schemas")?;
    let resolver = Resolver::with_policy(&registry, args.policy());
    let device_class = args.device_class.as_deref().map(DeviceClass::new);

    let outcomes: Vec<Result<ValidationReport, UcfgError>> = args
        .files
        .iter()
        .map(|file| {
            let document = load_document(file).map_err(|e| {
                tracing::warn!(file = %file.display(), error = %e, "cannot load resource");
                e
            })?;
            let report = match &device_class {
                Some(class) => resolver.validate_for_device(&document, class),
                None => resolver.validate(&document),
            };
            tracing::info!(
                file = %file.display(),
                valid = report.is_valid(),
                violations = report.len(),
                "validated resource"
            );
            Ok(report)
        })
        .collect();

    let rendered: Vec<FileReport<'_>> = args
        .files
        .iter()
        .zip(&outcomes)
        .map(|(file, outcome)| match outcome {
            Ok(report) => FileReport::new(file, report),
            Err(e) => FileReport::load_error(file, e),
        })
        .collect();
    write_reports(out, args.format, &rendered)?;

    Ok(rendered.iter().all(|r| r.valid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    fn args(files: Vec<PathBuf>) -> ValidateArgs {
        ValidateArgs {
            files,
            registry: RegistryArgs {
                schema_dirs: Vec::new(),
                builtin: true,
            },
            all_failures: false,
            device_class: None,
            format: OutputFormat::Text,
        }
    }

    const VALID: &str = r#"{"schemaVersion": 2.0, "resourceType": "usb-button-color",
        "deviceClass": "usb-button", "colorRGB": {"red": 255, "green": 0, "blue": 128}}"#;

    #[test]
    fn test_valid_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(dir.path(), "good.json", VALID);
        let bad = write(dir.path(), "bad.json", &VALID.replace("255", "300"));

        let mut out = Vec::new();
        assert!(run_validate(&args(vec![good.clone()]), &mut out).unwrap());

        let mut out = Vec::new();
        assert!(!run_validate(&args(vec![good, bad]), &mut out).unwrap());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("good.json: valid"));
        assert!(text.contains("bad.json: invalid, 1 violation"));
        assert!(text.contains("colorRGB.red: RangeViolation"));
    }

    #[test]
    fn test_device_class_filter() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "good.json", VALID);
        let mut args = args(vec![file]);
        args.device_class = Some("mini-pac".to_string());

        let mut out = Vec::new();
        assert!(!run_validate(&args, &mut out).unwrap());
        assert!(String::from_utf8(out).unwrap().contains("DeviceClassMismatch"));
    }

    #[test]
    fn test_broken_file_does_not_hide_other_results() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(dir.path(), "good.json", VALID);
        let broken = write(dir.path(), "broken.json", "{\"schemaVersion\": ");
        let missing = dir.path().join("missing.json");
        let bad = write(dir.path(), "bad.json", &VALID.replace("128", "-3"));

        let mut out = Vec::new();
        let ok = run_validate(&args(vec![good, broken, missing, bad]), &mut out).unwrap();
        assert!(!ok);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].ends_with("good.json: valid (usb-button/usb-button-color@2.0)"));
        assert!(lines[1].contains("broken.json: error"), "{text}");
        assert!(lines[1].contains("invalid JSON"), "{text}");
        assert!(lines[2].contains("missing.json: error"), "{text}");
        assert!(lines[2].contains("cannot read file"), "{text}");
        assert!(lines[3].ends_with("bad.json: invalid, 1 violation"));
        assert!(lines[4].contains("colorRGB.blue: RangeViolation"));
    }

    #[test]
    fn test_only_broken_file_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(dir.path(), "good.json", VALID);
        let broken = write(dir.path(), "broken.yaml", "colorRGB: [unclosed");

        let mut args = args(vec![good, broken]);
        args.format = OutputFormat::Json;
        let mut out = Vec::new();
        assert!(!run_validate(&args, &mut out).unwrap());

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["valid"], true);
        assert_eq!(value[1]["valid"], false);
        assert!(value[1]["error"].as_str().unwrap().contains("invalid YAML"));
    }

    #[test]
    fn test_policy_flag() {
        let mut args = args(Vec::new());
        assert_eq!(args.policy(), ValidationPolicy::default());
        args.all_failures = true;
        assert_eq!(args.policy(), ValidationPolicy::all_failures());
    }
}
