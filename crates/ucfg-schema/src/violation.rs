//! # Violations
//!
//! A [`Violation`] is a pure observation: where in the document a
//! constraint failed, which kind of constraint, what it expected and what
//! the document held. Violations carry no references into the schema or
//! the document.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ucfg_core::{FieldPath, SchemaKey};

/// Why a document was rejected at a given path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    /// A field listed in `required` is absent.
    MissingRequiredField,
    /// The value has the wrong JSON type (or is fractional where an integer is expected).
    TypeMismatch,
    /// The value differs from the declared `const`.
    ConstMismatch,
    /// The value is not in the declared `enum`.
    EnumMismatch,
    /// The value is outside the inclusive `minimum`/`maximum` bounds.
    RangeViolation,
    /// No schema is registered for the document's declared identity and version.
    SchemaNotFound,
    /// `deviceClass`, `resourceType` or `schemaVersion` is absent or ill-typed.
    MissingIdentifyingField,
    /// The document targets a different device class than the caller's device.
    DeviceClassMismatch,
}

impl ViolationKind {
    /// Terminal kinds end validation: no field-level checks follow them.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::SchemaNotFound | Self::MissingIdentifyingField | Self::DeviceClassMismatch
        )
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MissingRequiredField => "MissingRequiredField",
            Self::TypeMismatch => "TypeMismatch",
            Self::ConstMismatch => "ConstMismatch",
            Self::EnumMismatch => "EnumMismatch",
            Self::RangeViolation => "RangeViolation",
            Self::SchemaNotFound => "SchemaNotFound",
            Self::MissingIdentifyingField => "MissingIdentifyingField",
            Self::DeviceClassMismatch => "DeviceClassMismatch",
        };
        f.write_str(name)
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Location of the offending value from the document root.
    pub path: FieldPath,
    /// Which constraint failed.
    pub kind: ViolationKind,
    /// Description of the constraint that rejected the value.
    pub expected: String,
    /// The offending value, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
}

impl Violation {
    pub fn new(
        path: FieldPath,
        kind: ViolationKind,
        expected: impl Into<String>,
        actual: Option<&Value>,
    ) -> Self {
        Self {
            path,
            kind,
            expected: expected.into(),
            actual: actual.cloned(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: expected {}", self.path, self.kind, self.expected)?;
        if let Some(actual) = &self.actual {
            write!(f, ", found {actual}")?;
        }
        Ok(())
    }
}

/// Outcome of validating one resource document.
///
/// An empty report means the document is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    /// The schema the document was checked against, if one was resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<SchemaKey>,
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub(crate) fn new(schema: Option<SchemaKey>, violations: Vec<Violation>) -> Self {
        Self { schema, violations }
    }

    /// True if the document satisfied every constraint.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// The resolved schema key, if resolution succeeded.
    pub fn schema(&self) -> Option<&SchemaKey> {
        self.schema.as_ref()
    }

    /// Violations in traversal order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.violations.is_empty() {
            return f.write_str("valid");
        }
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {v}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn red() -> FieldPath {
        ["colorRGB", "red"].into_iter().collect()
    }

    #[test]
    fn test_violation_display_with_actual() {
        let v = Violation::new(
            red(),
            ViolationKind::RangeViolation,
            "maximum 255",
            Some(&json!(300)),
        );
        assert_eq!(
            v.to_string(),
            "colorRGB.red: RangeViolation: expected maximum 255, found 300"
        );
    }

    #[test]
    fn test_violation_display_root_without_actual() {
        let v = Violation::new(
            FieldPath::root(),
            ViolationKind::SchemaNotFound,
            "a registered schema",
            None,
        );
        assert_eq!(
            v.to_string(),
            "(root): SchemaNotFound: expected a registered schema"
        );
    }

    #[test]
    fn test_violation_serializes_without_absent_actual() {
        let v = Violation::new(
            FieldPath::root().child("colorRGB"),
            ViolationKind::MissingRequiredField,
            "required field",
            None,
        );
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["kind"], "MissingRequiredField");
        assert_eq!(json["path"], json!(["colorRGB"]));
        assert!(json.get("actual").is_none());
    }

    #[test]
    fn test_terminal_kinds() {
        assert!(ViolationKind::SchemaNotFound.is_terminal());
        assert!(ViolationKind::MissingIdentifyingField.is_terminal());
        assert!(ViolationKind::DeviceClassMismatch.is_terminal());
        assert!(!ViolationKind::RangeViolation.is_terminal());
    }

    #[test]
    fn test_empty_report_is_valid() {
        let report = ValidationReport::default();
        assert!(report.is_valid());
        assert_eq!(report.to_string(), "valid");
    }

    #[test]
    fn test_report_display_lists_each_violation() {
        let report = ValidationReport::new(
            None,
            vec![
                Violation::new(red(), ViolationKind::TypeMismatch, "integer", Some(&json!("x"))),
                Violation::new(
                    FieldPath::root().child("colorRGB").child("blue"),
                    ViolationKind::MissingRequiredField,
                    "required field",
                    None,
                ),
            ],
        );
        let text = report.to_string();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("colorRGB.blue: MissingRequiredField"));
    }
}
