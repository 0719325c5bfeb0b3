//! # Error Types — Structured Error Hierarchy
//!
//! Top-level error type for callers that drive the whole pipeline (load
//! bytes, build a registry, validate resources). Library crates keep their
//! own precise error enums and convert into this one at the edge.
//!
//! ## Design
//!
//! - Schema construction and registration errors are fatal at load time and
//!   carry the offending file or schema key.
//! - Document content never produces an error; it produces violations.

use thiserror::Error;

/// Top-level error type for ucfg.
#[derive(Error, Debug)]
pub enum UcfgError {
    /// A schema could not be constructed or registered.
    #[error("schema error: {0}")]
    Schema(String),

    /// A resource or schema document could not be decoded.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        /// Path (or label) of the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// JSON decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML decoding failed.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_load_display() {
        let err = UcfgError::DocumentLoad {
            path: "resources/button.json".to_string(),
            reason: "invalid JSON".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "document load error for 'resources/button.json': invalid JSON"
        );
    }

    #[test]
    fn test_json_error_converts() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json");
        let err: UcfgError = parse.unwrap_err().into();
        assert!(matches!(err, UcfgError::Json(_)));
        assert!(err.to_string().starts_with("json error:"));
    }
}
