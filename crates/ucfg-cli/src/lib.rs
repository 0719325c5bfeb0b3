//! # ucfg-cli — Configuration Resource Command-Line Interface
//!
//! Clap-based front end over `ucfg-schema`. Builds a schema registry from
//! the schema search path (or the bundled catalogue) and validates
//! resource documents against it.
//!
//! ## Subcommands
//!
//! - `validate` — Validate JSON or YAML resource files
//! - `schemas` — List registered schema keys
//! - `color` — Author a `usb-button-color` resource from an `R,G,B` string
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handlers write to a caller-supplied writer and return whether every
//!   resource was valid; `main` maps that to the exit status.
//! - Validation semantics live in `ucfg-schema`, never here.

pub mod color;
pub mod loader;
pub mod output;
pub mod schemas;
pub mod validate;
