//! # Color Subcommand
//!
//! Authors a `usb-button-color` resource from an `R,G,B` string and checks
//! it against the bundled schema before printing it.
//!
//! The argument only has to be three comma-separated groups of one to
//! three digits. Channel range is the schema's business, so `300,0,0`
//! parses and is then rejected with a `RangeViolation` on `colorRGB.red`.
//! `--random` picks each channel uniformly from `0..=255` instead.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde_json::{json, Value};
use ucfg_core::DeviceClass;
use ucfg_schema::{Resolver, SchemaRegistry};

/// Device class the colour resource targets.
pub const DEVICE_CLASS: &str = "usb-button";
/// Resource type of a button colour document.
pub const RESOURCE_TYPE: &str = "usb-button-color";
/// Schema version written into new documents.
pub const SCHEMA_VERSION: f64 = 2.0;

static RGB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,3}),([0-9]{1,3}),([0-9]{1,3})$").unwrap());

/// Raw channel values as typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl Rgb {
    /// A colour with every channel drawn from `0..=255`.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            red: rng.gen_range(0..=255),
            green: rng.gen_range(0..=255),
            blue: rng.gen_range(0..=255),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RGB({},{},{})", self.red, self.green, self.blue)
    }
}

/// Parse an `R,G,B` argument.
pub fn parse_rgb(s: &str) -> Result<Rgb, String> {
    let caps = RGB_RE
        .captures(s.trim())
        .ok_or_else(|| format!("invalid RGB value {s:?}: expected R,G,B"))?;
    let channel = |i: usize| -> Result<u16, String> {
        caps[i]
            .parse()
            .map_err(|e| format!("invalid RGB channel {:?}: {e}", &caps[i]))
    };
    Ok(Rgb {
        red: channel(1)?,
        green: channel(2)?,
        blue: channel(3)?,
    })
}

/// Arguments for the color subcommand.
#[derive(Args, Debug)]
pub struct ColorArgs {
    /// Button colour as R,G,B.
    #[arg(
        long,
        value_name = "R,G,B",
        value_parser = parse_rgb,
        required_unless_present = "random",
        conflicts_with = "random"
    )]
    pub rgb: Option<Rgb>,

    /// Pick a random colour.
    #[arg(long)]
    pub random: bool,

    /// Board the resource is bound to.
    #[arg(long, value_name = "N")]
    pub board_id: Option<u32>,

    /// Write the resource to this file instead of stdout.
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl ColorArgs {
    /// The requested colour, or a fresh random one.
    pub fn color(&self) -> Rgb {
        match self.rgb {
            Some(rgb) if !self.random => rgb,
            _ => Rgb::random(&mut rand::thread_rng()),
        }
    }
}

/// Build a `usb-button-color` resource document.
pub fn color_resource(rgb: Rgb, board_id: Option<u32>) -> Value {
    let mut doc = json!({
        "schemaVersion": SCHEMA_VERSION,
        "resourceType": RESOURCE_TYPE,
        "deviceClass": DEVICE_CLASS,
    });
    if let Some(id) = board_id {
        doc["boardId"] = json!(id);
    }
    doc["colorRGB"] = json!({
        "red": rgb.red,
        "green": rgb.green,
        "blue": rgb.blue,
    });
    doc
}

/// Run the color subcommand. Returns `true` if the resource was valid and
/// written.
pub fn run_color(args: &ColorArgs, out: &mut dyn Write) -> anyhow::Result<bool> {
    let registry = SchemaRegistry::builtin().context("failed to load bundled schemas")?;
    let resolver = Resolver::new(&registry);
    let rgb = args.color();
    let doc = color_resource(rgb, args.board_id);

    let report = resolver.validate_for_device(&doc, &DeviceClass::new(DEVICE_CLASS));
    if !report.is_valid() {
        writeln!(out, "invalid {RESOURCE_TYPE} resource for {rgb}:")?;
        writeln!(out, "{report}")?;
        return Ok(false);
    }

    let text = serde_json::to_string_pretty(&doc)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, format!("{text}\n"))
                .with_context(|| format!("cannot write {}", path.display()))?;
            tracing::info!(file = %path.display(), color = %rgb, "wrote colour resource");
        }
        None => writeln!(out, "{text}")?,
    }
    Ok(true)
}
