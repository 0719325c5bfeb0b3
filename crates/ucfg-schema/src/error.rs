//! # Schema and Registry Errors
//!
//! Both error types are load-time failures reported to whoever builds the
//! registry. Neither is ever produced by validating a resource document.

use thiserror::Error;
use ucfg_core::{SchemaKey, UcfgError};

/// A constraint tree or schema document is self-inconsistent.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// The schema declares contradictory or unsupported refinements.
    #[error("malformed schema at '{path}': {reason}")]
    MalformedSchema {
        /// JSON Pointer into the schema document (empty for the root).
        path: String,
        /// What is wrong with the node.
        reason: String,
    },
}

impl SchemaError {
    pub(crate) fn malformed(path: &str, reason: impl Into<String>) -> Self {
        Self::MalformedSchema {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Registration or lookup failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// A schema with the same key is already registered.
    #[error("duplicate schema: {key} is already registered")]
    DuplicateSchema {
        /// The conflicting key.
        key: SchemaKey,
    },

    /// No schema is registered under the key.
    #[error("schema not found: {key}")]
    SchemaNotFound {
        /// The key that was looked up.
        key: SchemaKey,
    },

    /// A raw schema document offered for registration did not parse.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl From<SchemaError> for UcfgError {
    fn from(e: SchemaError) -> Self {
        UcfgError::Schema(e.to_string())
    }
}

impl From<RegistryError> for UcfgError {
    fn from(e: RegistryError) -> Self {
        UcfgError::Schema(e.to_string())
    }
}
