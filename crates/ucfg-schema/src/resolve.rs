//! # Schema Resolution
//!
//! The [`Resolver`] is the consumer-facing entry point: hand it a raw
//! resource document and it returns every violation.
//!
//! 1. Read `deviceClass`, `resourceType` and `schemaVersion` from the
//!    document's top level. The first one that is absent or ill-typed is
//!    reported as a single terminal `MissingIdentifyingField`.
//! 2. Look the key up. An unknown key is a single terminal
//!    `SchemaNotFound`: a document is never partially validated against a
//!    schema it did not declare.
//! 3. Check `boardId` against the schema's permitted set, if any.
//! 4. Run the [`DocumentValidator`] over the payload.

use serde_json::Value;
use ucfg_core::{DeviceClass, FieldPath, SchemaKey, SchemaVersion};

use crate::constraint::number_in;
use crate::registry::SchemaLookup;
use crate::schema::{Schema, BOARD_ID_FIELD};
use crate::validate::{render_numbers, type_mismatch, DocumentValidator, ValidationPolicy};
use crate::violation::{ValidationReport, Violation, ViolationKind};

/// Selects the declared schema for a document and validates against it.
#[derive(Debug, Clone)]
pub struct Resolver<R> {
    registry: R,
    validator: DocumentValidator,
}

impl<R: SchemaLookup> Resolver<R> {
    /// Resolver with the default validation policy.
    pub fn new(registry: R) -> Self {
        Self::with_policy(registry, ValidationPolicy::default())
    }

    pub fn with_policy(registry: R, policy: ValidationPolicy) -> Self {
        Self {
            registry,
            validator: DocumentValidator::with_policy(policy),
        }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Validate a resource document against the schema it declares.
    ///
    /// An empty report means the document is valid.
    pub fn validate(&self, document: &Value) -> ValidationReport {
        let key = match identify(document) {
            Ok(key) => key,
            Err(violation) => return self.terminal(violation),
        };

        let Ok(schema) = self.registry.lookup_key(&key) else {
            let violation = Violation::new(
                FieldPath::root(),
                ViolationKind::SchemaNotFound,
                format!("a registered schema for {key}"),
                None,
            );
            return self.terminal(violation);
        };

        let mut violations = check_board_id(&schema, document);
        violations.extend(self.validator.validate(&schema, document));

        tracing::debug!(schema = %key, violations = violations.len(), "resource validated");
        ValidationReport::new(Some(key), violations)
    }

    /// Validate a document that is about to be applied to a device of
    /// class `device_class`.
    ///
    /// A document declaring any other device class is rejected with a
    /// single terminal `DeviceClassMismatch` before its schema is looked up.
    pub fn validate_for_device(
        &self,
        document: &Value,
        device_class: &DeviceClass,
    ) -> ValidationReport {
        if let Some(declared) = document.get("deviceClass").and_then(Value::as_str) {
            if declared != device_class.as_str() {
                let violation = Violation::new(
                    FieldPath::root().child("deviceClass"),
                    ViolationKind::DeviceClassMismatch,
                    format!("device class {:?}", device_class.as_str()),
                    document.get("deviceClass"),
                );
                return self.terminal(violation);
            }
        }
        self.validate(document)
    }

    fn terminal(&self, violation: Violation) -> ValidationReport {
        tracing::debug!(kind = %violation.kind, path = %violation.path, "resource rejected");
        ValidationReport::new(None, vec![violation])
    }
}

/// Read the identifying fields from the top level of a document.
fn identify(document: &Value) -> Result<SchemaKey, Violation> {
    let device_class = read_string(document, "deviceClass")?;
    let resource_type = read_string(document, "resourceType")?;
    let path = FieldPath::root().child("schemaVersion");
    let schema_version = match document.get("schemaVersion") {
        Some(Value::Number(n)) => SchemaVersion::from_number(n).ok_or_else(|| {
            missing_identifying(path.clone(), "finite number", document.get("schemaVersion"))
        })?,
        other => return Err(missing_identifying(path, "number", other)),
    };
    Ok(SchemaKey::new(device_class, resource_type, schema_version))
}

fn read_string<'a>(document: &'a Value, field: &str) -> Result<&'a str, Violation> {
    match document.get(field) {
        Some(Value::String(s)) => Ok(s.as_str()),
        other => Err(missing_identifying(FieldPath::root().child(field), "string", other)),
    }
}

fn missing_identifying(path: FieldPath, expected: &str, actual: Option<&Value>) -> Violation {
    Violation::new(path, ViolationKind::MissingIdentifyingField, expected, actual)
}

/// Check `boardId` against the schema's permitted set.
fn check_board_id(schema: &Schema, document: &Value) -> Vec<Violation> {
    let Some(ids) = schema.board_ids() else {
        return Vec::new();
    };
    let path = FieldPath::root().child(BOARD_ID_FIELD);
    match document.get(BOARD_ID_FIELD) {
        None if schema.board_id_required() => vec![Violation::new(
            path,
            ViolationKind::MissingRequiredField,
            "required field",
            None,
        )],
        None => Vec::new(),
        Some(value) if !value.is_number() => vec![type_mismatch(&path, "number", value)],
        Some(value) if !number_in(value, ids) => vec![Violation::new(
            path,
            ViolationKind::EnumMismatch,
            format!("one of {}", render_numbers(ids)),
            Some(value),
        )],
        Some(_) => Vec::new(),
    }
}
