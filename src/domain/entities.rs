//! Domain entities for device lookups and assembled support data

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::DomainError;
use super::value_objects::{parse_serials, version_from_platform};

/// Request-scoped, read-only description of the device being looked up.
///
/// Constructed by the host from its device attributes. The serial field may
/// contain comma-separated stack member serials; the first entry is treated
/// as the primary serial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceContext {
    pub serials: Vec<String>,
    pub manufacturer: String,
    /// Device-type model (e.g. "C9300-48P"), used as a keyword for bug
    /// searches and as a fallback product ID.
    pub model: Option<String>,
    pub software_version: Option<String>,
}

impl DeviceContext {
    /// Create a context from a raw serial field and manufacturer name.
    pub fn new(serial_field: &str, manufacturer: &str) -> Result<Self, DomainError> {
        let serials = parse_serials(serial_field);
        if serials.is_empty() {
            return Err(DomainError::InvalidInput {
                message: "device has no serial number".to_string(),
            });
        }

        Ok(Self {
            serials,
            manufacturer: manufacturer.trim().to_string(),
            model: None,
            software_version: None,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        if !model.trim().is_empty() {
            self.model = Some(model.trim().to_string());
        }
        self
    }

    pub fn with_software_version(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        if !version.trim().is_empty() {
            self.software_version = Some(version.trim().to_string());
        }
        self
    }

    /// Derive the software version from a platform name (e.g.
    /// "IOS-XE 17.9.5") when the host records no explicit version.
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        if self.software_version.is_none() {
            self.software_version = version_from_platform(&platform.into());
        }
        self
    }

    pub fn primary_serial(&self) -> &str {
        &self.serials[0]
    }

    /// A device recorded with more than one serial is a stack.
    pub fn is_stack(&self) -> bool {
        self.serials.len() > 1
    }
}

/// Result of one data section's fetch: the section either loaded (possibly
/// from cache) or is unavailable with a reason. One section being
/// unavailable never blocks the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SectionOutcome<T> {
    Loaded { data: T, cached: bool },
    Unavailable { reason: String },
}

impl<T> SectionOutcome<T> {
    pub fn loaded(data: T, cached: bool) -> Self {
        SectionOutcome::Loaded { data, cached }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        SectionOutcome::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, SectionOutcome::Loaded { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            SectionOutcome::Loaded { data, .. } => Some(data),
            SectionOutcome::Unavailable { .. } => None,
        }
    }

    /// Transform the loaded payload, carrying the cache flag or the
    /// unavailability reason through unchanged.
    pub fn map<U>(&self, f: impl FnOnce(&T) -> U) -> SectionOutcome<U> {
        match self {
            SectionOutcome::Loaded { data, cached } => SectionOutcome::Loaded {
                data: f(data),
                cached: *cached,
            },
            SectionOutcome::Unavailable { reason } => SectionOutcome::Unavailable {
                reason: reason.clone(),
            },
        }
    }
}

/// Assembled support data for one device, one raw JSON section per upstream
/// endpoint family. Sections are independent; partial results are expected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportRecord {
    pub serials: Vec<String>,
    /// Product ID derived from product info (base PID, falling back to the
    /// orderable PID, then the device-type model).
    pub product_id: Option<String>,
    pub software_version: Option<String>,
    /// First entry of the product information list.
    pub product: SectionOutcome<Value>,
    /// First EoX record for the primary serial.
    pub eox: SectionOutcome<Value>,
    /// Raw bug listing response (unfiltered; severity filtering is a
    /// presentation concern).
    pub bugs: SectionOutcome<Value>,
    /// Raw bug listing for the running software version, when known.
    pub version_bugs: Option<SectionOutcome<Value>>,
    /// Raw PSIRT advisory response.
    pub advisories: SectionOutcome<Value>,
    /// Raw software suggestion response.
    pub suggestions: SectionOutcome<Value>,
    /// First coverage status record for the primary serial.
    pub coverage: SectionOutcome<Value>,
    /// Coverage summary for all stack members; `None` for single-serial
    /// devices.
    pub stack_coverage: Option<SectionOutcome<Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn context_requires_a_serial() {
        assert!(DeviceContext::new("", "Cisco Systems").is_err());
        assert!(DeviceContext::new("   ", "Cisco Systems").is_err());
    }

    #[test]
    fn context_splits_stack_serials_in_order() {
        let ctx = DeviceContext::new("FOC111,FOC222", "Cisco Systems").unwrap();
        assert_eq!(ctx.serials, vec!["FOC111", "FOC222"]);
        assert_eq!(ctx.primary_serial(), "FOC111");
        assert!(ctx.is_stack());
    }

    #[test]
    fn context_single_serial_is_not_a_stack() {
        let ctx = DeviceContext::new("ABC123", "Cisco Systems").unwrap();
        assert_eq!(ctx.serials.len(), 1);
        assert!(!ctx.is_stack());
    }

    #[test]
    fn builder_ignores_blank_model_and_version() {
        let ctx = DeviceContext::new("ABC123", "Cisco")
            .unwrap()
            .with_model("  ")
            .with_software_version("17.9.5");
        assert_eq!(ctx.model, None);
        assert_eq!(ctx.software_version, Some("17.9.5".to_string()));
    }

    #[test]
    fn platform_fills_missing_software_version() {
        let ctx = DeviceContext::new("ABC123", "Cisco")
            .unwrap()
            .with_platform("IOS-XE 17.9.5");
        assert_eq!(ctx.software_version, Some("17.9.5".to_string()));
    }

    #[test]
    fn explicit_version_wins_over_platform() {
        let ctx = DeviceContext::new("ABC123", "Cisco")
            .unwrap()
            .with_software_version("16.12.4")
            .with_platform("IOS-XE 17.9.5");
        assert_eq!(ctx.software_version, Some("16.12.4".to_string()));
    }

    #[test]
    fn versionless_platform_leaves_version_unset() {
        let ctx = DeviceContext::new("ABC123", "Cisco")
            .unwrap()
            .with_platform("Catalyst");
        assert_eq!(ctx.software_version, None);
    }

    #[test]
    fn section_outcome_map_keeps_cache_flag_and_reason() {
        let loaded = SectionOutcome::loaded(json!({"n": 1}), true);
        match loaded.map(|v| v["n"].as_i64()) {
            SectionOutcome::Loaded { data, cached } => {
                assert_eq!(data, Some(1));
                assert!(cached);
            }
            _ => panic!("expected loaded"),
        }

        let missing: SectionOutcome<Value> = SectionOutcome::unavailable("timed out");
        match missing.map(|_| 0) {
            SectionOutcome::Unavailable { reason } => assert_eq!(reason, "timed out"),
            _ => panic!("expected unavailable"),
        }
    }
}
