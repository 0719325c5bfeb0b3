//! # ucfg-schema — Resource Schema Validation
//!
//! Validates device configuration resources (for example the RGB colour of
//! an illuminated USB button) against versioned, per-device schemas before
//! they are applied to hardware or persisted.
//!
//! ## Components
//!
//! - [`constraint`] — the Constraint Model: a tree of typed constraint nodes
//!   (`Number`, `Integer`, `String`, `Object`) with checked construction.
//! - [`schema`] — a `Schema` is an `Object` constraint tagged with its
//!   identity key and an optional `boardId` restriction. Parses the
//!   draft-07 keyword subset used by resource schema documents.
//! - [`registry`] — `SchemaRegistryBuilder` (build phase) freezes into an
//!   immutable `SchemaRegistry`; `SharedRegistry` allows registration after
//!   first use behind a reader/writer lock.
//! - [`validate`] — the `DocumentValidator`: one generic depth-first
//!   traversal that reports every violation, never only the first.
//! - [`resolve`] — the `Resolver` reads a document's declared identity,
//!   selects its schema and folds the `boardId` check into the result.
//! - [`builtin`] — schemas bundled with the crate.
//!
//! ## Crate Policy
//!
//! - Depends only on `ucfg-core` internally.
//! - Document content never produces an `Err`: bad resources produce
//!   violations. Only schema construction and registration fail.
//! - Validation is deterministic: identical inputs produce identical,
//!   identically ordered violation lists.

pub mod builtin;
pub mod constraint;
pub mod error;
pub mod registry;
pub mod resolve;
pub mod schema;
pub mod validate;
pub mod violation;

pub use constraint::{ConstraintNode, NumericConstraint, ObjectConstraint, StringConstraint};
pub use error::{RegistryError, SchemaError};
pub use registry::{SchemaLookup, SchemaRegistry, SchemaRegistryBuilder, SharedRegistry};
pub use resolve::Resolver;
pub use schema::Schema;
pub use validate::{DocumentValidator, LeafReporting, ValidationPolicy};
pub use violation::{ValidationReport, Violation, ViolationKind};
