//! # Constraint Model
//!
//! An in-memory schema is a tree of [`ConstraintNode`]s. Leaves constrain
//! scalar values; `Object` nodes map field names to child nodes and list
//! the fields that are required.
//!
//! ## Construction Invariants
//!
//! [`ConstraintNode::check`] rejects self-contradictory refinements with
//! `SchemaError::MalformedSchema`:
//!
//! - non-finite bounds, or `minimum > maximum`;
//! - an empty `enum`;
//! - a non-integral `const` or `enum` value on an `Integer` node;
//! - duplicate property names or duplicate `required` entries.
//!
//! The checked constructors (`ConstraintNode::number`, `::object`, ...)
//! run it for you, and `Schema::new` runs it over the whole tree.
//!
//! A `const` that falls outside the node's own `enum` or range is accepted
//! here. It can never be satisfied: a value equal to the `const` still
//! fails the `enum` or range check during validation.

use std::cmp::Ordering;

use serde_json::{Number, Value};

use crate::error::SchemaError;

/// One typed node of a schema.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintNode {
    /// Any JSON number.
    Number(NumericConstraint),
    /// A JSON number with no fractional part (`2` and `2.0` both qualify).
    Integer(NumericConstraint),
    /// A JSON string.
    String(StringConstraint),
    /// A JSON object with declared fields.
    Object(ObjectConstraint),
}

impl ConstraintNode {
    /// Build a checked `Number` node.
    pub fn number(c: NumericConstraint) -> Result<Self, SchemaError> {
        let node = Self::Number(c);
        node.check("")?;
        Ok(node)
    }

    /// Build a checked `Integer` node.
    pub fn integer(c: NumericConstraint) -> Result<Self, SchemaError> {
        let node = Self::Integer(c);
        node.check("")?;
        Ok(node)
    }

    /// Build a checked `String` node.
    pub fn string(c: StringConstraint) -> Result<Self, SchemaError> {
        let node = Self::String(c);
        node.check("")?;
        Ok(node)
    }

    /// Build a checked `Object` node.
    pub fn object(c: ObjectConstraint) -> Result<Self, SchemaError> {
        let node = Self::Object(c);
        node.check("")?;
        Ok(node)
    }

    /// JSON Schema `type` name of this node.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Integer(_) => "integer",
            Self::String(_) => "string",
            Self::Object(_) => "object",
        }
    }

    /// Verify the construction invariants of this node and every descendant.
    ///
    /// `path` is the JSON Pointer of this node inside its schema document
    /// and is only used to locate errors.
    pub fn check(&self, path: &str) -> Result<(), SchemaError> {
        match self {
            Self::Number(c) => c.check(path, false),
            Self::Integer(c) => c.check(path, true),
            Self::String(c) => c.check(path),
            Self::Object(c) => c.check(path),
        }
    }
}

// ─── Numeric ────────────────────────────────────────────────────────

/// Refinements for `Number` and `Integer` nodes. All bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericConstraint {
    minimum: Option<f64>,
    maximum: Option<f64>,
    const_value: Option<Number>,
    enum_values: Option<Vec<Number>>,
}

impl NumericConstraint {
    /// An unrefined numeric constraint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `value >= minimum`.
    pub fn with_minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Require `value <= maximum`.
    pub fn with_maximum(mut self, maximum: f64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    /// Require the value to equal `value` exactly.
    pub fn with_const(mut self, value: Number) -> Self {
        self.const_value = Some(value);
        self
    }

    /// Require the value to be one of `values`.
    pub fn with_enum(mut self, values: Vec<Number>) -> Self {
        self.enum_values = Some(values);
        self
    }

    pub fn minimum(&self) -> Option<f64> {
        self.minimum
    }

    pub fn maximum(&self) -> Option<f64> {
        self.maximum
    }

    pub fn const_value(&self) -> Option<&Number> {
        self.const_value.as_ref()
    }

    pub fn enum_values(&self) -> Option<&[Number]> {
        self.enum_values.as_deref()
    }

    fn check(&self, path: &str, integral: bool) -> Result<(), SchemaError> {
        for (name, bound) in [("minimum", self.minimum), ("maximum", self.maximum)] {
            if let Some(b) = bound {
                if !b.is_finite() {
                    return Err(SchemaError::malformed(path, format!("`{name}` must be finite")));
                }
            }
        }
        if let (Some(min), Some(max)) = (self.minimum, self.maximum) {
            if min > max {
                return Err(SchemaError::malformed(
                    path,
                    format!("minimum {min} exceeds maximum {max}"),
                ));
            }
        }
        if let Some(values) = &self.enum_values {
            if values.is_empty() {
                return Err(SchemaError::malformed(path, "`enum` must not be empty"));
            }
        }
        if integral {
            let declared = self.const_value.iter().chain(self.enum_values.iter().flatten());
            if let Some(bad) = declared.into_iter().find(|n| !is_integral(n)) {
                return Err(SchemaError::malformed(
                    path,
                    format!("integer node declares non-integral value {bad}"),
                ));
            }
        }
        Ok(())
    }
}

// ─── String ─────────────────────────────────────────────────────────

/// Refinements for `String` nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringConstraint {
    const_value: Option<String>,
    enum_values: Option<Vec<String>>,
}

impl StringConstraint {
    /// An unrefined string constraint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the value to equal `value` exactly.
    pub fn with_const(mut self, value: impl Into<String>) -> Self {
        self.const_value = Some(value.into());
        self
    }

    /// Require the value to be one of `values`.
    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn const_value(&self) -> Option<&str> {
        self.const_value.as_deref()
    }

    pub fn enum_values(&self) -> Option<&[String]> {
        self.enum_values.as_deref()
    }

    fn check(&self, path: &str) -> Result<(), SchemaError> {
        match &self.enum_values {
            Some(values) if values.is_empty() => {
                Err(SchemaError::malformed(path, "`enum` must not be empty"))
            }
            _ => Ok(()),
        }
    }
}

// ─── Object ─────────────────────────────────────────────────────────

/// Declared fields of an object, in declaration order.
///
/// Fields present in a document but not declared here are tolerated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectConstraint {
    properties: Vec<(String, ConstraintNode)>,
    required: Vec<String>,
}

impl ObjectConstraint {
    /// An object with no declared fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field and the constraint its value must satisfy.
    pub fn with_property(mut self, name: impl Into<String>, node: ConstraintNode) -> Self {
        self.properties.push((name.into(), node));
        self
    }

    /// Mark a field as required.
    pub fn with_required(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    /// Declared fields in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &ConstraintNode)> {
        self.properties.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// The constraint declared for `name`, if any.
    pub fn property(&self, name: &str) -> Option<&ConstraintNode> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    /// Required field names in declaration order.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Remove a declared field, returning its constraint.
    pub(crate) fn take_property(&mut self, name: &str) -> Option<ConstraintNode> {
        let idx = self.properties.iter().position(|(n, _)| n == name)?;
        Some(self.properties.remove(idx).1)
    }

    /// Drop `name` from the required list. Returns whether it was listed.
    pub(crate) fn take_required(&mut self, name: &str) -> bool {
        let before = self.required.len();
        self.required.retain(|r| r != name);
        self.required.len() != before
    }

    fn check(&self, path: &str) -> Result<(), SchemaError> {
        for (i, (name, node)) in self.properties.iter().enumerate() {
            if self.properties[..i].iter().any(|(n, _)| n == name) {
                return Err(SchemaError::malformed(
                    path,
                    format!("property `{name}` is declared more than once"),
                ));
            }
            node.check(&format!("{path}/properties/{}", escape_pointer(name)))?;
        }
        for (i, name) in self.required.iter().enumerate() {
            if self.required[..i].contains(name) {
                return Err(SchemaError::malformed(
                    path,
                    format!("`required` lists `{name}` more than once"),
                ));
            }
        }
        Ok(())
    }
}

// ─── Numeric helpers ────────────────────────────────────────────────

/// True if `n` has no fractional part.
pub(crate) fn is_integral(n: &Number) -> bool {
    if n.is_i64() || n.is_u64() {
        return true;
    }
    n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

/// Mathematical equality of two JSON numbers (`2 == 2.0`).
///
/// Integers are compared exactly, also against integral floats, so two
/// distinct integers above 2^53 never collapse to the same `f64`.
pub(crate) fn numbers_equal(a: &Number, b: &Number) -> bool {
    match (as_int(a), as_int(b)) {
        (Some(x), Some(y)) => x == y,
        (Some(x), None) => b.as_f64().is_some_and(|f| cmp_int_f64(x, f) == Ordering::Equal),
        (None, Some(y)) => a.as_f64().is_some_and(|f| cmp_int_f64(y, f) == Ordering::Equal),
        (None, None) => matches!((a.as_f64(), b.as_f64()), (Some(x), Some(y)) if x == y),
    }
}

/// Order a JSON number against a finite bound without rounding integers.
pub(crate) fn cmp_bound(n: &Number, bound: f64) -> Option<Ordering> {
    match as_int(n) {
        Some(v) => Some(cmp_int_f64(v, bound)),
        None => n.as_f64()?.partial_cmp(&bound),
    }
}

fn as_int(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Exact comparison of an integer with a finite float.
fn cmp_int_f64(v: i128, f: f64) -> Ordering {
    // Every JSON integer is within ±2^64; anything past ±2^100 is decided
    // by sign alone, and the cast below stays in range.
    const FAR: f64 = 1.0e30;
    if f >= FAR {
        return Ordering::Less;
    }
    if f <= -FAR {
        return Ordering::Greater;
    }
    let floor = f.floor();
    match v.cmp(&(floor as i128)) {
        Ordering::Equal if f > floor => Ordering::Less,
        ord => ord,
    }
}

/// True if `value` is a number equal to one of `set`.
pub(crate) fn number_in(value: &Value, set: &[Number]) -> bool {
    value
        .as_number()
        .is_some_and(|n| set.iter().any(|m| numbers_equal(n, m)))
}

pub(crate) fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
