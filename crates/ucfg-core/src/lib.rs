//! # ucfg-core — Foundational Types for Device Configuration
//!
//! This crate defines the primitives shared by every other crate in the
//! workspace. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identity keys.** `DeviceClass`, `ResourceType`
//!    and `SchemaVersion` are distinct types. A resource type can never be
//!    passed where a device class is expected.
//!
//! 2. **Exact-match versions.** `SchemaVersion` wraps a finite `f64` and
//!    compares by value. There is no range or "latest" resolution anywhere
//!    in the stack.
//!
//! 3. **Field paths are data.** `FieldPath` locates a value from the
//!    document root and renders both as a dotted path and a JSON Pointer.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ucfg-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod path;

// Re-export primary types for ergonomic imports.
pub use error::UcfgError;
pub use identity::{DeviceClass, ResourceType, SchemaKey, SchemaVersion};
pub use path::FieldPath;
