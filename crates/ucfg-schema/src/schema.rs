//! # Schemas
//!
//! A [`Schema`] is an `Object` constraint tagged with the key it is
//! registered under and an optional set of permitted `boardId` values.
//!
//! ## Schema Documents
//!
//! [`Schema::from_json`] accepts a JSON-Schema-draft-07-compatible document
//! restricted to the keywords `type`, `const`, `enum`, `minimum`, `maximum`,
//! `properties` and `required`. Annotation keywords (`$schema`, `$id`,
//! `$comment`, `title`, `description`, `default`, `examples`) are ignored.
//! Any other keyword is rejected: a schema author must never believe a
//! constraint is enforced when it is not.
//!
//! The top-level `properties` carry the identifying fields:
//!
//! | property        | required shape                     |
//! |-----------------|------------------------------------|
//! | `schemaVersion` | numeric node with `const`          |
//! | `resourceType`  | string node with `const`           |
//! | `deviceClass`   | string node with `const`           |
//! | `boardId`       | optional numeric node, `enum`/`const` |
//!
//! They are lifted into the schema metadata and removed from the payload
//! body. The resolver reads them from the document to pick the schema, so
//! checking them again in the body would only duplicate reports.

use serde_json::{Map, Number, Value};
use ucfg_core::{DeviceClass, ResourceType, SchemaKey, SchemaVersion};

use crate::constraint::{
    escape_pointer, ConstraintNode, NumericConstraint, ObjectConstraint, StringConstraint,
};
use crate::error::SchemaError;

/// Identifying document fields, in the order the resolver reads them.
pub const IDENTIFYING_FIELDS: [&str; 3] = ["deviceClass", "resourceType", "schemaVersion"];

/// Optional field restricting which boards a resource may target.
pub const BOARD_ID_FIELD: &str = "boardId";

/// Keywords that carry constraints.
const ASSERTION_KEYWORDS: &[&str] = &[
    "type",
    "const",
    "enum",
    "minimum",
    "maximum",
    "properties",
    "required",
];

/// Keywords that are accepted and ignored.
const ANNOTATION_KEYWORDS: &[&str] = &[
    "$schema",
    "$id",
    "$comment",
    "title",
    "description",
    "default",
    "examples",
];

/// An immutable, registered-ready resource schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    key: SchemaKey,
    title: Option<String>,
    board_ids: Option<Vec<Number>>,
    board_id_required: bool,
    body: ObjectConstraint,
}

impl Schema {
    /// Create a schema from its key and payload body.
    ///
    /// The body must not declare the identifying fields or `boardId`;
    /// use [`Schema::with_board_ids`] for the latter.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::MalformedSchema` if the body violates a
    /// construction invariant or declares an identifying field.
    pub fn new(key: SchemaKey, body: ObjectConstraint) -> Result<Self, SchemaError> {
        ConstraintNode::Object(body.clone()).check("")?;
        for field in IDENTIFYING_FIELDS.iter().chain(std::iter::once(&BOARD_ID_FIELD)) {
            if body.property(field).is_some() || body.is_required(field) {
                return Err(SchemaError::malformed(
                    "",
                    format!("identifying field `{field}` must not be part of the payload body"),
                ));
            }
        }
        Ok(Self {
            key,
            title: None,
            board_ids: None,
            board_id_required: false,
            body,
        })
    }

    /// Restrict the `boardId` a document may declare.
    ///
    /// When `required` is true a document without `boardId` is rejected.
    pub fn with_board_ids(mut self, ids: Vec<Number>, required: bool) -> Result<Self, SchemaError> {
        if ids.is_empty() {
            return Err(SchemaError::malformed(
                "/properties/boardId",
                "`enum` must not be empty",
            ));
        }
        self.board_ids = Some(ids);
        self.board_id_required = required;
        Ok(self)
    }

    /// Attach a human-readable title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Parse a schema document.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::MalformedSchema` naming the JSON Pointer of the
    /// first offending node.
    pub fn from_json(document: &Value) -> Result<Self, SchemaError> {
        let root = document
            .as_object()
            .ok_or_else(|| SchemaError::malformed("", "schema document must be a JSON object"))?;

        let mut body = match parse_node(document, "")? {
            ConstraintNode::Object(body) => body,
            other => {
                return Err(SchemaError::malformed(
                    "",
                    format!("top-level type must be `object`, got `{}`", other.type_name()),
                ))
            }
        };

        let schema_version = lift_version(&mut body)?;
        let resource_type = lift_string_const(&mut body, "resourceType")?;
        let device_class = lift_string_const(&mut body, "deviceClass")?;
        let board = lift_board_ids(&mut body)?;

        let key = SchemaKey::new(
            DeviceClass::new(device_class),
            ResourceType::new(resource_type),
            schema_version,
        );
        let mut schema = Self::new(key, body)?;
        if let Some((ids, required)) = board {
            schema = schema.with_board_ids(ids, required)?;
        }
        if let Some(title) = annotation(root, "title").or_else(|| annotation(root, "$id")) {
            schema = schema.with_title(title);
        }
        Ok(schema)
    }

    /// Parse a schema document from text.
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| SchemaError::malformed("", format!("invalid JSON: {e}")))?;
        Self::from_json(&value)
    }

    pub fn key(&self) -> &SchemaKey {
        &self.key
    }

    pub fn device_class(&self) -> &DeviceClass {
        &self.key.device_class
    }

    pub fn resource_type(&self) -> &ResourceType {
        &self.key.resource_type
    }

    pub fn schema_version(&self) -> SchemaVersion {
        self.key.schema_version
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Permitted `boardId` values, if the schema restricts them.
    pub fn board_ids(&self) -> Option<&[Number]> {
        self.board_ids.as_deref()
    }

    pub fn board_id_required(&self) -> bool {
        self.board_id_required
    }

    /// Payload constraints, without the identifying fields.
    pub fn body(&self) -> &ObjectConstraint {
        &self.body
    }
}

fn annotation(obj: &Map<String, Value>, keyword: &str) -> Option<String> {
    obj.get(keyword).and_then(Value::as_str).map(str::to_string)
}

fn lift_version(body: &mut ObjectConstraint) -> Result<SchemaVersion, SchemaError> {
    let path = "/properties/schemaVersion";
    body.take_required("schemaVersion");
    match body.take_property("schemaVersion") {
        Some(ConstraintNode::Number(c)) | Some(ConstraintNode::Integer(c)) => c
            .const_value()
            .and_then(SchemaVersion::from_number)
            .ok_or_else(|| {
                SchemaError::malformed(path, "`schemaVersion` must declare a numeric `const`")
            }),
        Some(_) => Err(SchemaError::malformed(path, "`schemaVersion` must be numeric")),
        None => Err(SchemaError::malformed("", "missing identifying property `schemaVersion`")),
    }
}

fn lift_string_const(body: &mut ObjectConstraint, field: &str) -> Result<String, SchemaError> {
    let path = format!("/properties/{field}");
    body.take_required(field);
    match body.take_property(field) {
        Some(ConstraintNode::String(c)) => c.const_value().map(str::to_string).ok_or_else(|| {
            SchemaError::malformed(&path, format!("`{field}` must declare a string `const`"))
        }),
        Some(_) => Err(SchemaError::malformed(&path, format!("`{field}` must be a string"))),
        None => Err(SchemaError::malformed(
            "",
            format!("missing identifying property `{field}`"),
        )),
    }
}

fn lift_board_ids(body: &mut ObjectConstraint) -> Result<Option<(Vec<Number>, bool)>, SchemaError> {
    let path = "/properties/boardId";
    let required = body.take_required(BOARD_ID_FIELD);
    let ids = match body.take_property(BOARD_ID_FIELD) {
        Some(ConstraintNode::Number(c)) | Some(ConstraintNode::Integer(c)) => {
            match (c.enum_values(), c.const_value()) {
                (Some(values), _) => values.to_vec(),
                (None, Some(value)) => vec![value.clone()],
                (None, None) => {
                    return Err(SchemaError::malformed(
                        path,
                        "`boardId` must declare an `enum` or `const`",
                    ))
                }
            }
        }
        Some(_) => return Err(SchemaError::malformed(path, "`boardId` must be numeric")),
        None if required => {
            return Err(SchemaError::malformed(
                "",
                "`boardId` is required but not declared",
            ))
        }
        None => return Ok(None),
    };
    Ok(Some((ids, required)))
}

// ─── Keyword parsing ────────────────────────────────────────────────

fn parse_node(value: &Value, path: &str) -> Result<ConstraintNode, SchemaError> {
    let obj = value
        .as_object()
        .ok_or_else(|| SchemaError::malformed(path, "constraint must be a JSON object"))?;

    let known = |k: &str| ASSERTION_KEYWORDS.contains(&k) || ANNOTATION_KEYWORDS.contains(&k);
    if let Some(keyword) = obj.keys().find(|k| !known(k.as_str())) {
        return Err(SchemaError::malformed(
            path,
            format!("unsupported keyword `{keyword}`"),
        ));
    }

    let type_name = match obj.get("type") {
        Some(Value::String(s)) => s.as_str(),
        Some(other) => {
            return Err(SchemaError::malformed(
                path,
                format!("`type` must be a single type name, got {other}"),
            ))
        }
        None if obj.contains_key("properties") || obj.contains_key("required") => "object",
        None => return Err(SchemaError::malformed(path, "missing `type`")),
    };

    let node = match type_name {
        "number" => ConstraintNode::Number(parse_numeric(obj, path, type_name)?),
        "integer" => ConstraintNode::Integer(parse_numeric(obj, path, type_name)?),
        "string" => ConstraintNode::String(parse_string(obj, path)?),
        "object" => ConstraintNode::Object(parse_object(obj, path)?),
        other => {
            return Err(SchemaError::malformed(
                path,
                format!("unsupported type `{other}`"),
            ))
        }
    };
    node.check(path)?;
    Ok(node)
}

fn reject_keywords(
    obj: &Map<String, Value>,
    path: &str,
    type_name: &str,
    keywords: &[&str],
) -> Result<(), SchemaError> {
    match keywords.iter().find(|k| obj.contains_key(**k)) {
        Some(k) => Err(SchemaError::malformed(
            path,
            format!("`{k}` does not apply to type `{type_name}`"),
        )),
        None => Ok(()),
    }
}

fn parse_numeric(
    obj: &Map<String, Value>,
    path: &str,
    type_name: &str,
) -> Result<NumericConstraint, SchemaError> {
    reject_keywords(obj, path, type_name, &["properties", "required"])?;
    let mut c = NumericConstraint::new();
    if let Some(v) = obj.get("minimum") {
        let min = v
            .as_f64()
            .ok_or_else(|| SchemaError::malformed(path, "`minimum` must be a number"))?;
        c = c.with_minimum(min);
    }
    if let Some(v) = obj.get("maximum") {
        let max = v
            .as_f64()
            .ok_or_else(|| SchemaError::malformed(path, "`maximum` must be a number"))?;
        c = c.with_maximum(max);
    }
    if let Some(v) = obj.get("const") {
        let n = v.as_number().ok_or_else(|| {
            SchemaError::malformed(path, format!("`const` {v} disagrees with numeric type"))
        })?;
        c = c.with_const(n.clone());
    }
    if let Some(v) = obj.get("enum") {
        let items = v
            .as_array()
            .ok_or_else(|| SchemaError::malformed(path, "`enum` must be an array"))?;
        let values = items
            .iter()
            .map(|item| {
                item.as_number().cloned().ok_or_else(|| {
                    SchemaError::malformed(
                        path,
                        format!("`enum` value {item} disagrees with numeric type"),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        c = c.with_enum(values);
    }
    Ok(c)
}

fn parse_string(obj: &Map<String, Value>, path: &str) -> Result<StringConstraint, SchemaError> {
    reject_keywords(obj, path, "string", &["minimum", "maximum", "properties", "required"])?;
    let mut c = StringConstraint::new();
    if let Some(v) = obj.get("const") {
        let s = v.as_str().ok_or_else(|| {
            SchemaError::malformed(path, format!("`const` {v} disagrees with string type"))
        })?;
        c = c.with_const(s);
    }
    if let Some(v) = obj.get("enum") {
        let items = v
            .as_array()
            .ok_or_else(|| SchemaError::malformed(path, "`enum` must be an array"))?;
        let values = items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    SchemaError::malformed(
                        path,
                        format!("`enum` value {item} disagrees with string type"),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        c = c.with_enum(values);
    }
    Ok(c)
}

fn parse_object(obj: &Map<String, Value>, path: &str) -> Result<ObjectConstraint, SchemaError> {
    reject_keywords(obj, path, "object", &["minimum", "maximum", "const", "enum"])?;
    let mut c = ObjectConstraint::new();
    if let Some(v) = obj.get("properties") {
        let props = v
            .as_object()
            .ok_or_else(|| SchemaError::malformed(path, "`properties` must be an object"))?;
        for (name, child) in props {
            let child_path = format!("{path}/properties/{}", escape_pointer(name));
            c = c.with_property(name.clone(), parse_node(child, &child_path)?);
        }
    }
    if let Some(v) = obj.get("required") {
        let items = v
            .as_array()
            .ok_or_else(|| SchemaError::malformed(path, "`required` must be an array"))?;
        for item in items {
            let name = item.as_str().ok_or_else(|| {
                SchemaError::malformed(path, format!("`required` entry {item} is not a string"))
            })?;
            c = c.with_required(name);
        }
    }
    Ok(c)
}
