//! # Document Validation
//!
//! One generic depth-first traversal evaluates any resource document
//! against any constraint tree. New device classes and resource types are
//! added by registering schemas, never by writing a new validator.
//!
//! ## Traversal Order
//!
//! At each object the validator first reports every missing required
//! field (in `required` order), then visits each declared field that the
//! document holds (in declaration order), recursing depth first. Fields
//! the schema does not declare are ignored. The resulting order depends
//! only on the schema and the document, so repeated runs agree exactly.
//!
//! ## Leaf Checks
//!
//! A numeric leaf is type-checked first. If the type matches, `const`,
//! `enum`, `minimum` and `maximum` are checked in that fixed order. Under
//! [`LeafReporting::FirstFailure`] (the default) only the first failing
//! check is reported; under [`LeafReporting::AllFailures`] every failing
//! check kind is reported. String leaves behave the same way with `const`
//! and `enum`.
//!
//! ## Nulls
//!
//! A `null` document root counts as an empty object, so each top-level
//! required field is reported missing. A `null` value for a declared
//! nested field is a type mismatch.

use std::cmp::Ordering;

use serde_json::{Map, Number, Value};
use ucfg_core::FieldPath;

use crate::constraint::{
    cmp_bound, is_integral, numbers_equal, ConstraintNode, NumericConstraint, ObjectConstraint,
    StringConstraint,
};
use crate::error::SchemaError;
use crate::schema::Schema;
use crate::violation::{Violation, ViolationKind};

/// How many violations a single failing leaf contributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LeafReporting {
    /// Report only the first failing check, in the order const → enum → range.
    #[default]
    FirstFailure,
    /// Report one violation per failing check kind.
    AllFailures,
}

/// Validator configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub leaf_reporting: LeafReporting,
}

impl ValidationPolicy {
    /// Policy that reports every failing check kind per leaf.
    pub fn all_failures() -> Self {
        Self {
            leaf_reporting: LeafReporting::AllFailures,
        }
    }
}

/// Evaluates resource documents against constraint trees.
///
/// Holds no mutable state: one validator may be shared across threads and
/// used for any number of documents concurrently.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentValidator {
    policy: ValidationPolicy,
}

impl DocumentValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Validate a document's payload against a schema body.
    ///
    /// Identifying fields and `boardId` are the resolver's concern and are
    /// not checked here. Never fails: every problem with the document is a
    /// violation in the returned list.
    pub fn validate(&self, schema: &Schema, document: &Value) -> Vec<Violation> {
        let mut out = Vec::new();
        self.visit_root(schema.body(), document, &mut out);
        out
    }

    /// Validate a document against a bare constraint tree.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::MalformedSchema` if `node` was assembled
    /// without going through the checked constructors and violates a
    /// construction invariant.
    pub fn validate_node(
        &self,
        node: &ConstraintNode,
        document: &Value,
    ) -> Result<Vec<Violation>, SchemaError> {
        node.check("")?;
        let mut out = Vec::new();
        match node {
            ConstraintNode::Object(obj) => self.visit_root(obj, document, &mut out),
            leaf => self.visit(leaf, document, &FieldPath::root(), &mut out),
        }
        Ok(out)
    }

    fn visit_root(&self, obj: &ObjectConstraint, document: &Value, out: &mut Vec<Violation>) {
        let root = FieldPath::root();
        match document {
            Value::Null => self.visit_object(obj, &Map::new(), &root, out),
            Value::Object(map) => self.visit_object(obj, map, &root, out),
            other => out.push(type_mismatch(&root, "object", other)),
        }
    }

    fn visit(&self, node: &ConstraintNode, value: &Value, path: &FieldPath, out: &mut Vec<Violation>) {
        match node {
            ConstraintNode::Number(c) => self.visit_numeric(c, false, value, path, out),
            ConstraintNode::Integer(c) => self.visit_numeric(c, true, value, path, out),
            ConstraintNode::String(c) => self.visit_string(c, value, path, out),
            ConstraintNode::Object(c) => match value {
                Value::Object(map) => self.visit_object(c, map, path, out),
                other => out.push(type_mismatch(path, "object", other)),
            },
        }
    }

    fn visit_object(
        &self,
        obj: &ObjectConstraint,
        map: &Map<String, Value>,
        path: &FieldPath,
        out: &mut Vec<Violation>,
    ) {
        for name in obj.required() {
            if !map.contains_key(name) {
                out.push(Violation::new(
                    path.child(name),
                    ViolationKind::MissingRequiredField,
                    "required field",
                    None,
                ));
            }
        }
        for (name, child) in obj.properties() {
            if let Some(value) = map.get(name) {
                self.visit(child, value, &path.child(name), out);
            }
        }
    }

    fn visit_numeric(
        &self,
        c: &NumericConstraint,
        integral: bool,
        value: &Value,
        path: &FieldPath,
        out: &mut Vec<Violation>,
    ) {
        let type_name = if integral { "integer" } else { "number" };
        let n = match value.as_number() {
            Some(n) if !integral || is_integral(n) => n,
            _ => return out.push(type_mismatch(path, type_name, value)),
        };

        let mut failures = Vec::new();
        if let Some(expected) = c.const_value() {
            if !numbers_equal(n, expected) {
                failures.push(Violation::new(
                    path.clone(),
                    ViolationKind::ConstMismatch,
                    format!("const {expected}"),
                    Some(value),
                ));
            }
        }
        if let Some(set) = c.enum_values() {
            if !set.iter().any(|m| numbers_equal(n, m)) {
                failures.push(Violation::new(
                    path.clone(),
                    ViolationKind::EnumMismatch,
                    format!("one of {}", render_numbers(set)),
                    Some(value),
                ));
            }
        }
        if let Some(min) = c.minimum().filter(|min| cmp_bound(n, *min) == Some(Ordering::Less)) {
            failures.push(Violation::new(
                path.clone(),
                ViolationKind::RangeViolation,
                format!("minimum {min}"),
                Some(value),
            ));
        }
        if let Some(max) = c.maximum().filter(|max| cmp_bound(n, *max) == Some(Ordering::Greater)) {
            failures.push(Violation::new(
                path.clone(),
                ViolationKind::RangeViolation,
                format!("maximum {max}"),
                Some(value),
            ));
        }
        self.emit(failures, out);
    }

    fn visit_string(
        &self,
        c: &StringConstraint,
        value: &Value,
        path: &FieldPath,
        out: &mut Vec<Violation>,
    ) {
        let Some(s) = value.as_str() else {
            return out.push(type_mismatch(path, "string", value));
        };

        let mut failures = Vec::new();
        if let Some(expected) = c.const_value() {
            if s != expected {
                failures.push(Violation::new(
                    path.clone(),
                    ViolationKind::ConstMismatch,
                    format!("const {expected:?}"),
                    Some(value),
                ));
            }
        }
        if let Some(set) = c.enum_values() {
            if !set.iter().any(|m| m == s) {
                failures.push(Violation::new(
                    path.clone(),
                    ViolationKind::EnumMismatch,
                    format!("one of {set:?}"),
                    Some(value),
                ));
            }
        }
        self.emit(failures, out);
    }

    fn emit(&self, failures: Vec<Violation>, out: &mut Vec<Violation>) {
        match self.policy.leaf_reporting {
            LeafReporting::FirstFailure => out.extend(failures.into_iter().take(1)),
            LeafReporting::AllFailures => out.extend(failures),
        }
    }
}

pub(crate) fn type_mismatch(path: &FieldPath, expected: &str, actual: &Value) -> Violation {
    Violation::new(path.clone(), ViolationKind::TypeMismatch, expected, Some(actual))
}

pub(crate) fn render_numbers(set: &[Number]) -> String {
    let items: Vec<String> = set.iter().map(Number::to_string).collect();
    format!("[{}]", items.join(", "))
}
