//! # Schema Registry
//!
//! Schemas are keyed by (device class, resource type, schema version).
//! Lookup is exact: case-sensitive names, numeric equality on the version,
//! and no "latest" or range resolution.
//!
//! ## Lifecycle
//!
//! 1. **Build.** A single owner calls [`SchemaRegistryBuilder::register`].
//!    Re-registering a key fails with `DuplicateSchema`; nothing is ever
//!    silently overwritten.
//! 2. **Freeze.** [`SchemaRegistryBuilder::freeze`] yields an immutable
//!    [`SchemaRegistry`]. It is `Send + Sync` and may be shared (for
//!    example in an `Arc`) by any number of concurrent readers without
//!    locking.
//!
//! When schemas must be added after first use, [`SharedRegistry`] guards
//! the same storage with a reader/writer lock. A schema becomes visible
//! atomically once its `register` call returns.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use serde_json::Value;
use ucfg_core::{DeviceClass, ResourceType, SchemaKey, SchemaVersion};

use crate::error::RegistryError;
use crate::schema::Schema;

/// Read access to a set of registered schemas.
pub trait SchemaLookup {
    /// Return the schema registered under `key`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::SchemaNotFound` if no schema matches exactly.
    fn lookup_key(&self, key: &SchemaKey) -> Result<Arc<Schema>, RegistryError>;

    /// Return the schema for a device class, resource type and version.
    fn lookup(
        &self,
        device_class: &str,
        resource_type: &str,
        schema_version: SchemaVersion,
    ) -> Result<Arc<Schema>, RegistryError> {
        self.lookup_key(&SchemaKey::new(device_class, resource_type, schema_version))
    }
}

impl<T: SchemaLookup + ?Sized> SchemaLookup for &T {
    fn lookup_key(&self, key: &SchemaKey) -> Result<Arc<Schema>, RegistryError> {
        (**self).lookup_key(key)
    }
}

impl<T: SchemaLookup + ?Sized> SchemaLookup for Arc<T> {
    fn lookup_key(&self, key: &SchemaKey) -> Result<Arc<Schema>, RegistryError> {
        (**self).lookup_key(key)
    }
}

type SchemaMap = BTreeMap<SchemaKey, Arc<Schema>>;

fn insert(schemas: &mut SchemaMap, schema: Schema) -> Result<(), RegistryError> {
    let key = schema.key().clone();
    if schemas.contains_key(&key) {
        return Err(RegistryError::DuplicateSchema { key });
    }
    tracing::debug!(
        device_class = %key.device_class,
        resource_type = %key.resource_type,
        schema_version = %key.schema_version,
        "registered schema"
    );
    schemas.insert(key, Arc::new(schema));
    Ok(())
}

fn find(schemas: &SchemaMap, key: &SchemaKey) -> Result<Arc<Schema>, RegistryError> {
    schemas
        .get(key)
        .cloned()
        .ok_or_else(|| RegistryError::SchemaNotFound { key: key.clone() })
}

fn device_classes(schemas: &SchemaMap) -> Vec<DeviceClass> {
    let mut classes: Vec<DeviceClass> = schemas.keys().map(|k| k.device_class.clone()).collect();
    classes.dedup();
    classes
}

fn resource_types(schemas: &SchemaMap, device_class: &str) -> Vec<ResourceType> {
    let mut types: Vec<ResourceType> = schemas
        .keys()
        .filter(|k| k.device_class.as_str() == device_class)
        .map(|k| k.resource_type.clone())
        .collect();
    types.dedup();
    types
}

// ─── Build phase ────────────────────────────────────────────────────

/// Single-owner builder for a [`SchemaRegistry`].
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    schemas: SchemaMap,
}

impl SchemaRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a schema under its key.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateSchema` if the key is taken. The
    /// existing schema is kept.
    pub fn register(&mut self, schema: Schema) -> Result<(), RegistryError> {
        insert(&mut self.schemas, schema)
    }

    /// Parse a schema document and register it.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Schema` if the document is malformed, or
    /// `RegistryError::DuplicateSchema` if its key is taken.
    pub fn register_json(&mut self, document: &Value) -> Result<SchemaKey, RegistryError> {
        let schema = Schema::from_json(document)?;
        let key = schema.key().clone();
        self.register(schema)?;
        Ok(key)
    }

    /// Register every schema bundled with this crate.
    pub fn register_builtin(&mut self) -> Result<(), RegistryError> {
        for schema in crate::builtin::schemas()? {
            self.register(schema)?;
        }
        Ok(())
    }

    /// Number of schemas registered so far.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// End the build phase.
    pub fn freeze(self) -> SchemaRegistry {
        tracing::debug!(schemas = self.schemas.len(), "schema registry frozen");
        SchemaRegistry {
            schemas: self.schemas,
        }
    }
}

// ─── Frozen registry ────────────────────────────────────────────────

/// Immutable collection of schemas, safe for concurrent lookup.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: SchemaMap,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::new()
    }

    /// A frozen registry holding only the bundled schemas.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut builder = Self::builder();
        builder.register_builtin()?;
        Ok(builder.freeze())
    }

    /// Returns the number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// All registered keys, sorted.
    pub fn keys(&self) -> Vec<SchemaKey> {
        self.schemas.keys().cloned().collect()
    }

    /// Registered schemas in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.values().map(|s| s.as_ref())
    }

    /// Device classes with at least one schema, sorted.
    pub fn device_classes(&self) -> Vec<DeviceClass> {
        device_classes(&self.schemas)
    }

    /// Resource types accepted for a device class, sorted.
    pub fn resource_types(&self, device_class: &str) -> Vec<ResourceType> {
        resource_types(&self.schemas, device_class)
    }
}

impl SchemaLookup for SchemaRegistry {
    fn lookup_key(&self, key: &SchemaKey) -> Result<Arc<Schema>, RegistryError> {
        find(&self.schemas, key)
    }
}

// ─── Runtime registration ───────────────────────────────────────────

/// Registry that accepts new schemas while readers are active.
///
/// Readers take a shared lock only for the duration of a map lookup and
/// receive an `Arc<Schema>`, so validation itself runs unlocked.
#[derive(Debug, Default)]
pub struct SharedRegistry {
    schemas: RwLock<SchemaMap>,
}

impl SharedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a schema under its key.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateSchema` if the key is taken.
    pub fn register(&self, schema: Schema) -> Result<(), RegistryError> {
        insert(&mut self.schemas.write(), schema)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// All registered keys, sorted.
    pub fn keys(&self) -> Vec<SchemaKey> {
        self.read().keys().cloned().collect()
    }

    /// Device classes with at least one schema, sorted.
    pub fn device_classes(&self) -> Vec<DeviceClass> {
        device_classes(&self.read())
    }

    /// Resource types accepted for a device class, sorted.
    pub fn resource_types(&self, device_class: &str) -> Vec<ResourceType> {
        resource_types(&self.read(), device_class)
    }

    /// Copy the current contents into an immutable registry.
    pub fn snapshot(&self) -> SchemaRegistry {
        SchemaRegistry {
            schemas: self.read().clone(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SchemaMap> {
        self.schemas.read()
    }
}

impl From<SchemaRegistry> for SharedRegistry {
    fn from(registry: SchemaRegistry) -> Self {
        Self {
            schemas: RwLock::new(registry.schemas),
        }
    }
}

impl SchemaLookup for SharedRegistry {
    fn lookup_key(&self, key: &SchemaKey) -> Result<Arc<Schema>, RegistryError> {
        find(&self.read(), key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::ObjectConstraint;
    use std::thread;

    fn v(x: f64) -> SchemaVersion {
        SchemaVersion::new(x).unwrap()
    }

    fn schema(device_class: &str, resource_type: &str, version: f64) -> Schema {
        Schema::new(
            SchemaKey::new(device_class, resource_type, v(version)),
            ObjectConstraint::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let mut builder = SchemaRegistry::builder();
        builder.register(schema("usb-button", "usb-button-color", 2.0)).unwrap();
        let registry = builder.freeze();
        let found = registry.lookup("usb-button", "usb-button-color", v(2.0)).unwrap();
        assert_eq!(found.key().to_string(), "usb-button/usb-button-color@2.0");
    }

    #[test]
    fn test_duplicate_rejected_and_original_kept() {
        let mut builder = SchemaRegistry::builder();
        builder
            .register(schema("usb-button", "usb-button-color", 2.0).with_title("first"))
            .unwrap();
        let err = builder
            .register(schema("usb-button", "usb-button-color", 2.0).with_title("second"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateSchema { .. }));
        let registry = builder.freeze();
        let kept = registry.lookup("usb-button", "usb-button-color", v(2.0)).unwrap();
        assert_eq!(kept.title(), Some("first"));
    }

    #[test]
    fn test_lookup_is_exact() {
        let mut builder = SchemaRegistry::builder();
        builder.register(schema("usb-button", "usb-button-color", 2.0)).unwrap();
        let registry = builder.freeze();

        for (dc, rt, ver) in [
            ("USB-Button", "usb-button-color", 2.0),
            ("usb-button", "usb-button-colour", 2.0),
            ("usb-button", "usb-button-color", 2.1),
            ("usb-button", "usb-button-color", 3.0),
        ] {
            let err = registry.lookup(dc, rt, v(ver)).unwrap_err();
            assert!(matches!(err, RegistryError::SchemaNotFound { .. }));
        }
    }

    #[test]
    fn test_versions_coexist() {
        let mut builder = SchemaRegistry::builder();
        builder.register(schema("usb-button", "usb-button-color", 1.0)).unwrap();
        builder.register(schema("usb-button", "usb-button-color", 2.0)).unwrap();
        let registry = builder.freeze();
        assert_eq!(registry.len(), 2);
        assert!(registry.lookup("usb-button", "usb-button-color", v(1.0)).is_ok());
    }

    #[test]
    fn test_device_classes_and_resource_types_sorted() {
        let mut builder = SchemaRegistry::builder();
        builder.register(schema("usb-button", "usb-button-color", 2.0)).unwrap();
        builder.register(schema("mini-pac", "mini-pac-pins", 1.0)).unwrap();
        builder.register(schema("usb-button", "usb-button-color", 1.0)).unwrap();
        builder.register(schema("mini-pac", "mini-pac-config", 1.0)).unwrap();
        let registry = builder.freeze();

        let classes: Vec<String> =
            registry.device_classes().iter().map(ToString::to_string).collect();
        assert_eq!(classes, ["mini-pac", "usb-button"]);
        let types: Vec<String> = registry
            .resource_types("mini-pac")
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(types, ["mini-pac-config", "mini-pac-pins"]);
        assert_eq!(registry.resource_types("usb-button").len(), 1);
        assert!(registry.resource_types("unknown").is_empty());
    }

    #[test]
    fn test_register_json_reports_malformed() {
        let mut builder = SchemaRegistry::builder();
        let err = builder
            .register_json(&serde_json::json!({ "type": "object" }))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Schema(_)));
        assert!(builder.is_empty());
    }

    #[test]
    fn test_frozen_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SchemaRegistry>();
        assert_send_sync::<SharedRegistry>();

        let mut builder = SchemaRegistry::builder();
        builder.register(schema("usb-button", "usb-button-color", 2.0)).unwrap();
        let registry = Arc::new(builder.freeze());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    registry
                        .lookup("usb-button", "usb-button-color", v(2.0))
                        .is_ok()
                })
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }
    }

    #[test]
    fn test_shared_registry_concurrent_register_and_lookup() {
        let shared = Arc::new(SharedRegistry::new());
        let writers: Vec<_> = (0..4)
            .map(|i| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    shared
                        .register(schema("usb-button", "usb-button-color", i as f64))
                        .unwrap();
                })
            })
            .collect();
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    // Either absent or fully present, never partial.
                    if let Ok(s) = shared.lookup("usb-button", "usb-button-color", v(0.0)) {
                        assert_eq!(s.schema_version(), v(0.0));
                    }
                })
            })
            .collect();
        for h in writers.into_iter().chain(readers) {
            h.join().unwrap();
        }
        assert_eq!(shared.len(), 4);
        assert!(matches!(
            shared.register(schema("usb-button", "usb-button-color", 3.0)),
            Err(RegistryError::DuplicateSchema { .. })
        ));
    }

    #[test]
    fn test_panicking_lock_holder_does_not_wedge_registry() {
        let shared = Arc::new(SharedRegistry::new());
        let holder = Arc::clone(&shared);
        let died = thread::spawn(move || {
            let _guard = holder.schemas.write();
            panic!("writer died while holding the lock");
        })
        .join();
        assert!(died.is_err());

        shared
            .register(schema("usb-button", "usb-button-color", 2.0))
            .unwrap();
        assert_eq!(shared.len(), 1);
        assert!(shared.lookup("usb-button", "usb-button-color", v(2.0)).is_ok());
    }

    #[test]
    fn test_shared_from_frozen_and_snapshot() {
        let mut builder = SchemaRegistry::builder();
        builder.register(schema("usb-button", "usb-button-color", 2.0)).unwrap();
        let shared = SharedRegistry::from(builder.freeze());
        shared.register(schema("mini-pac", "mini-pac-pins", 1.0)).unwrap();
        let snapshot = shared.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(shared.device_classes().len(), 2);
        assert_eq!(snapshot.keys(), shared.keys());
    }
}
