//! # Bundled Schemas
//!
//! Schema documents compiled into the crate so a registry can be built
//! without touching the file system. The same files live in the
//! repository's `schemas/` directory for tools that load from disk.

use crate::error::SchemaError;
use crate::schema::Schema;

/// `usb-button` / `usb-button-color` v2.0: RGB channels in [0, 255].
pub const USB_BUTTON_COLOR: &str = include_str!("../../../schemas/usb-button-color.schema");

/// Every bundled schema as (file name, document text).
pub const BUILTIN_SCHEMAS: &[(&str, &str)] = &[("usb-button-color.schema", USB_BUTTON_COLOR)];

/// Parse every bundled schema.
pub fn schemas() -> Result<Vec<Schema>, SchemaError> {
    BUILTIN_SCHEMAS
        .iter()
        .map(|(_, text)| Schema::from_json_str(text))
        .collect()
}
