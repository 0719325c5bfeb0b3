//! # Identity Keys
//!
//! Newtype wrappers for the three values that together identify a schema:
//! the device class, the resource type and the schema version.
//!
//! ## Matching Rules
//!
//! Device class and resource type match exactly and case-sensitively.
//! Schema versions match by numeric equality: `2` and `2.0` are the same
//! version, `2.1` is a different one. Non-finite versions cannot be
//! constructed.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Category of hardware a resource configures (e.g. `usb-button`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceClass(String);

/// Kind of configuration payload within a device class (e.g. `usb-button-color`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceType(String);

impl DeviceClass {
    /// Wrap a device class name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Access the inner name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ResourceType {
    /// Wrap a resource type name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Access the inner name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DeviceClass {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ResourceType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Exact-match schema compatibility key.
///
/// Wraps a finite `f64`. Negative zero is normalised to zero so that
/// equality, hashing and ordering all agree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SchemaVersion(f64);

impl SchemaVersion {
    /// Create a version from a float. Returns `None` for NaN or infinities.
    pub fn new(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        // -0.0 == 0.0 but their bit patterns differ.
        Some(Self(if value == 0.0 { 0.0 } else { value }))
    }

    /// Create a version from a JSON number.
    pub fn from_number(n: &serde_json::Number) -> Option<Self> {
        n.as_f64().and_then(Self::new)
    }

    /// Access the inner value.
    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

impl PartialEq for SchemaVersion {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for SchemaVersion {}

impl Hash for SchemaVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for SchemaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SchemaVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl TryFrom<f64> for SchemaVersion {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("schema version must be finite, got {value}"))
    }
}

impl From<SchemaVersion> for f64 {
    fn from(v: SchemaVersion) -> f64 {
        v.0
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Debug formatting keeps the trailing ".0" on whole numbers.
        write!(f, "{:?}", self.0)
    }
}

/// Registry key: one schema per (device class, resource type, version).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaKey {
    /// Device class the schema applies to.
    pub device_class: DeviceClass,
    /// Resource type the schema describes.
    pub resource_type: ResourceType,
    /// Exact version the schema was authored as.
    pub schema_version: SchemaVersion,
}

impl SchemaKey {
    /// Build a key from its three parts.
    pub fn new(
        device_class: impl Into<DeviceClass>,
        resource_type: impl Into<ResourceType>,
        schema_version: SchemaVersion,
    ) -> Self {
        Self {
            device_class: device_class.into(),
            resource_type: resource_type.into(),
            schema_version,
        }
    }
}

impl fmt::Display for SchemaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}@{}",
            self.device_class, self.resource_type, self.schema_version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn v(x: f64) -> SchemaVersion {
        SchemaVersion::new(x).unwrap()
    }

    #[test]
    fn test_version_rejects_non_finite() {
        assert!(SchemaVersion::new(f64::NAN).is_none());
        assert!(SchemaVersion::new(f64::INFINITY).is_none());
        assert!(SchemaVersion::new(f64::NEG_INFINITY).is_none());
    }

    #[test]
    fn test_version_negative_zero_equals_zero() {
        assert_eq!(v(-0.0), v(0.0));
        let set: HashSet<SchemaVersion> = [v(-0.0), v(0.0)].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_version_integer_and_float_json_agree() {
        let int: serde_json::Number = 2.into();
        let float = serde_json::Number::from_f64(2.0).unwrap();
        assert_eq!(
            SchemaVersion::from_number(&int),
            SchemaVersion::from_number(&float)
        );
    }

    #[test]
    fn test_version_display_keeps_fraction() {
        assert_eq!(v(2.0).to_string(), "2.0");
        assert_eq!(v(1.5).to_string(), "1.5");
    }

    #[test]
    fn test_version_ordering() {
        assert!(v(1.0) < v(2.0));
        assert!(v(2.0) < v(2.1));
    }

    #[test]
    fn test_version_serde() {
        let json = serde_json::to_string(&v(2.0)).unwrap();
        assert_eq!(json, "2.0");
        let back: SchemaVersion = serde_json::from_str("3").unwrap();
        assert_eq!(back, v(3.0));
    }

    #[test]
    fn test_device_class_is_case_sensitive() {
        assert_ne!(DeviceClass::new("usb-button"), DeviceClass::new("USB-Button"));
    }

    #[test]
    fn test_schema_key_display() {
        let key = SchemaKey::new("usb-button", "usb-button-color", v(2.0));
        assert_eq!(key.to_string(), "usb-button/usb-button-color@2.0");
    }

    #[test]
    fn test_schema_key_serializes_camel_case() {
        let key = SchemaKey::new("usb-button", "usb-button-color", v(2.0));
        let json = serde_json::to_value(&key).unwrap();
        assert_eq!(json["deviceClass"], "usb-button");
        assert_eq!(json["resourceType"], "usb-button-color");
        assert_eq!(json["schemaVersion"], 2.0);
    }
}
