//! # Schema and Document Loading
//!
//! Finds schema files on disk, registers them, and decodes resource
//! documents from JSON or YAML into the `serde_json::Value` tree the
//! validator works on.
//!
//! The schema search path is a list of candidate directories. The first
//! one that exists is used and the rest are ignored, so a checkout's own
//! `schemas/` shadows an installed copy.

use std::path::{Path, PathBuf};

use clap::Args;
use serde_json::Value;
use ucfg_core::UcfgError;
use ucfg_schema::{Schema, SchemaRegistry, SchemaRegistryBuilder};

/// Directories searched when no `--schema-dir` is given.
pub const DEFAULT_SEARCH_PATHS: &[&str] = &["./schemas", "../schemas"];

/// File name suffixes recognised as schema documents.
pub const SCHEMA_SUFFIXES: &[&str] = &[".schema", ".schema.json"];

/// Where the registry's schemas come from.
#[derive(Args, Debug, Clone, Default)]
pub struct RegistryArgs {
    /// Directory to search for schema files. Repeatable; the first
    /// directory that exists is used.
    #[arg(long = "schema-dir", value_name = "DIR")]
    pub schema_dirs: Vec<PathBuf>,

    /// Use the schemas bundled with ucfg instead of searching directories.
    #[arg(long, conflicts_with = "schema_dirs")]
    pub builtin: bool,
}

impl RegistryArgs {
    /// Build and freeze the registry these arguments describe.
    pub fn load(&self) -> Result<SchemaRegistry, UcfgError> {
        let mut builder = SchemaRegistry::builder();
        if self.builtin {
            builder.register_builtin()?;
        } else {
            let loader = if self.schema_dirs.is_empty() {
                SchemaLoader::with_default_paths()
            } else {
                SchemaLoader::new(self.schema_dirs.clone())
            };
            loader.load_into(&mut builder)?;
        }
        Ok(builder.freeze())
    }
}

/// Loads schema documents from the first existing directory on a search path.
#[derive(Debug, Clone)]
pub struct SchemaLoader {
    search_paths: Vec<PathBuf>,
}

impl SchemaLoader {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    pub fn with_default_paths() -> Self {
        Self::new(DEFAULT_SEARCH_PATHS.iter().map(PathBuf::from).collect())
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// The first directory on the search path that exists.
    pub fn schema_dir(&self) -> Option<&Path> {
        self.search_paths
            .iter()
            .map(PathBuf::as_path)
            .find(|p| p.is_dir())
    }

    /// Schema files in `dir`, sorted by file name.
    pub fn schema_files(dir: &Path) -> Result<Vec<PathBuf>, UcfgError> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && is_schema_file(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Register every schema file from the schema directory.
    ///
    /// Returns the number of schemas registered.
    ///
    /// # Errors
    ///
    /// Fails if no directory on the search path exists, or if any schema
    /// file cannot be read, is malformed, or duplicates a registered key.
    /// The error names the offending file.
    pub fn load_into(&self, builder: &mut SchemaRegistryBuilder) -> Result<usize, UcfgError> {
        let Some(dir) = self.schema_dir() else {
            return Err(UcfgError::DocumentLoad {
                path: render_paths(&self.search_paths),
                reason: "no schema directory found".to_string(),
            });
        };
        tracing::debug!(dir = %dir.display(), "loading schemas");

        let files = Self::schema_files(dir)?;
        for file in &files {
            let schema = load_schema(file)?;
            builder
                .register(schema)
                .map_err(|e| UcfgError::Schema(format!("{}: {e}", file.display())))?;
        }
        if files.is_empty() {
            tracing::warn!(dir = %dir.display(), "schema directory contains no schema files");
        }
        Ok(files.len())
    }
}

fn is_schema_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| SCHEMA_SUFFIXES.iter().any(|s| name.ends_with(s)))
}

fn render_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read and parse one schema file.
pub fn load_schema(path: &Path) -> Result<Schema, UcfgError> {
    let text = read(path)?;
    Schema::from_json_str(&text)
        .map_err(|e| UcfgError::Schema(format!("{}: {e}", path.display())))
}

/// Read a resource document. `.yaml` and `.yml` files are parsed as YAML,
/// everything else as JSON.
pub fn load_document(path: &Path) -> Result<Value, UcfgError> {
    let content = read(path)?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let load_error = |reason: String| UcfgError::DocumentLoad {
        path: path.display().to_string(),
        reason,
    };

    match ext {
        "yaml" | "yml" => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(&content).map_err(|e| load_error(format!("invalid YAML: {e}")))?;
            yaml_to_json_value(&yaml)
                .map_err(|e| load_error(format!("YAML-to-JSON conversion failed: {e}")))
        }
        _ => serde_json::from_str(&content).map_err(|e| load_error(format!("invalid JSON: {e}"))),
    }
}

fn read(path: &Path) -> Result<String, UcfgError> {
    std::fs::read_to_string(path).map_err(|e| UcfgError::DocumentLoad {
        path: path.display().to_string(),
        reason: format!("cannot read file: {e}"),
    })
}

/// Convert a YAML value tree to JSON.
///
/// Resources are plain data: mapping keys must be strings and tagged
/// values are rejected rather than silently untagged.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Number(n) => yaml_number(n)?,
        Yaml::Sequence(items) => Value::Array(
            items
                .iter()
                .map(yaml_to_json_value)
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(map) => {
            let mut object = serde_json::Map::with_capacity(map.len());
            for (key, value) in map {
                let key = key
                    .as_str()
                    .ok_or_else(|| format!("mapping keys must be strings, found {key:?}"))?;
                object.insert(key.to_string(), yaml_to_json_value(value)?);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => return Err(format!("unsupported YAML tag {}", tagged.tag)),
    })
}

/// Integers keep their exact value; everything else goes through `f64`.
fn yaml_number(n: &serde_yaml::Number) -> Result<Value, String> {
    if let Some(i) = n.as_i64() {
        return Ok(i.into());
    }
    if let Some(u) = n.as_u64() {
        return Ok(u.into());
    }
    n.as_f64()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| format!("number {n} has no JSON form"))
}
