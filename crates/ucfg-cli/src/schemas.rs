//! # Schemas Subcommand
//!
//! Lists the schemas a registry would be built from.

use std::io::Write;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use ucfg_schema::{Schema, SchemaRegistry};

use crate::loader::RegistryArgs;
use crate::output::OutputFormat;

/// Arguments for the schemas subcommand.
#[derive(Args, Debug)]
pub struct SchemasArgs {
    #[command(flatten)]
    pub registry: RegistryArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SchemaEntry<'a> {
    device_class: &'a str,
    resource_type: &'a str,
    schema_version: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    board_ids: Option<&'a [serde_json::Number]>,
}

impl<'a> From<&'a Schema> for SchemaEntry<'a> {
    fn from(schema: &'a Schema) -> Self {
        Self {
            device_class: schema.device_class().as_str(),
            resource_type: schema.resource_type().as_str(),
            schema_version: schema.schema_version().as_f64(),
            title: schema.title(),
            board_ids: schema.board_ids(),
        }
    }
}

/// Run the schemas subcommand.
pub fn run_schemas(args: &SchemasArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let registry = args.registry.load().context("failed to load schemas")?;
    write_schemas(&registry, args.format, out)
}

/// Write one line (or JSON entry) per registered schema, in key order.
pub fn write_schemas(
    registry: &SchemaRegistry,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for schema in registry.iter() {
                match schema.title() {
                    Some(title) => writeln!(out, "{}\t{title}", schema.key())?,
                    None => writeln!(out, "{}", schema.key())?,
                }
            }
        }
        OutputFormat::Json => {
            let entries: Vec<SchemaEntry<'_>> = registry.iter().map(SchemaEntry::from).collect();
            serde_json::to_writer_pretty(&mut *out, &entries)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
