//! Application services for orchestrating support data retrieval

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::errors::{ApplicationError, CacheError};
use crate::domain::{DeviceContext, SectionOutcome, SupportRecord};
use crate::infrastructure::api_clients::endpoints::Endpoint;
use crate::infrastructure::api_clients::traits::SupportApi;

/// Coverage summary lookups accept at most this many serials per request.
const MAX_SUMMARY_SERIALS: usize = 75;

/// Service for managing caching strategies
/// Note: This trait is not dyn-compatible due to generic methods
/// Use concrete implementations instead of trait objects
#[async_trait]
pub trait CacheService: Send + Sync {
    async fn get<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: serde::de::DeserializeOwned + Send;

    async fn set<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<(), CacheError>
    where
        T: serde::Serialize + Send + Sync;

    async fn invalidate(&self, key: &str) -> Result<(), CacheError>;
}

/// Service assembling per-device support data from the Cisco APIs
#[async_trait]
pub trait SupportDataService: Send + Sync {
    /// Fetch all data sections for one device. Sections are independent;
    /// a failed section is reported as unavailable and never aborts the
    /// others, so the result is always renderable.
    async fn fetch_support_data(&self, context: &DeviceContext) -> SupportRecord;

    /// Check API connectivity by obtaining a token, for the host's
    /// settings-page "test connection" action.
    async fn test_connection(&self) -> Result<(), ApplicationError>;
}

/// Support data orchestration backed by the Cisco API client and a TTL
/// response cache. Both collaborators are injected so the service can be
/// tested in isolation.
pub struct CiscoSupportDataService<C: CacheService> {
    client: Arc<dyn SupportApi>,
    cache: Arc<C>,
    ttl: Duration,
}

impl<C: CacheService> CiscoSupportDataService<C> {
    pub fn new(client: Arc<dyn SupportApi>, cache: Arc<C>, ttl: Duration) -> Self {
        Self { client, cache, ttl }
    }

    /// Memoized fetch: serve a live cache entry if present, otherwise call
    /// upstream and cache the result. Failures are never cached, so the
    /// next call retries upstream.
    async fn fetch_cached(&self, endpoint: &Endpoint) -> SectionOutcome<Value> {
        let key = endpoint.cache_key();

        match self.cache.get::<Value>(&key).await {
            Ok(Some(value)) => {
                debug!(key = %key, "serving cached response");
                return SectionOutcome::loaded(value, true);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, key = %key, "cache read failed, fetching upstream"),
        }

        match self.client.get(endpoint).await {
            Ok(value) => {
                if let Err(e) = self.cache.set(&key, &value, self.ttl).await {
                    warn!(error = %e, key = %key, "failed to cache response");
                }
                SectionOutcome::loaded(value, false)
            }
            Err(e) => {
                warn!(error = %e, family = endpoint.family(), "section fetch failed");
                SectionOutcome::unavailable(e.to_string())
            }
        }
    }
}

/// Reduce a loaded list response to its first entry; an empty or missing
/// list becomes unavailable with the given reason.
fn first_list_entry(
    section: SectionOutcome<Value>,
    list_key: &str,
    empty_reason: &str,
) -> SectionOutcome<Value> {
    match section {
        SectionOutcome::Loaded { data, cached } => {
            match data.get(list_key).and_then(Value::as_array).and_then(|a| a.first()) {
                Some(entry) => SectionOutcome::loaded(entry.clone(), cached),
                None => SectionOutcome::unavailable(empty_reason),
            }
        }
        other => other,
    }
}

fn non_empty_str(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl<C: CacheService> SupportDataService for CiscoSupportDataService<C> {
    async fn fetch_support_data(&self, context: &DeviceContext) -> SupportRecord {
        let serial = context.primary_serial().to_string();
        info!(serial = %serial, stack = context.is_stack(), "fetching support data");

        let product = first_list_entry(
            self.fetch_cached(&Endpoint::ProductInfo {
                serial: serial.clone(),
            })
            .await,
            "product_list",
            "no product records returned",
        );

        // Base PID preferred over orderable PID; the device-type model is
        // the last resort identifier.
        let product_id = product
            .data()
            .and_then(|p| non_empty_str(p, "base_pid").or_else(|| non_empty_str(p, "orderable_pid")))
            .or_else(|| context.model.clone());

        let eox = first_list_entry(
            self.fetch_cached(&Endpoint::EoxBySerial {
                serial: serial.clone(),
            })
            .await,
            "EOXRecord",
            "no EoX records returned",
        );

        // Keyword search on the device model is the most reliable bug
        // lookup; fall back to the product-id endpoint.
        let mut bugs = SectionOutcome::unavailable("no product identifier for bug lookup");
        if let Some(model) = &context.model {
            bugs = self
                .fetch_cached(&Endpoint::BugsByKeyword {
                    keyword: model.clone(),
                })
                .await;
        }
        if !bugs.is_loaded() {
            if let Some(pid) = &product_id {
                let fallback = self
                    .fetch_cached(&Endpoint::BugsByProduct {
                        product_id: pid.clone(),
                    })
                    .await;
                if fallback.is_loaded() {
                    bugs = fallback;
                }
            }
        }

        let version_bugs = match &context.software_version {
            Some(version) => Some(
                self.fetch_cached(&Endpoint::BugsBySoftwareVersion {
                    version: version.clone(),
                })
                .await,
            ),
            None => None,
        };

        let advisories = match &product_id {
            Some(pid) => {
                self.fetch_cached(&Endpoint::PsirtByProduct {
                    product_id: pid.clone(),
                })
                .await
            }
            None => SectionOutcome::unavailable("product ID could not be determined"),
        };

        let suggestions = match &product_id {
            Some(pid) => {
                self.fetch_cached(&Endpoint::SoftwareSuggestions {
                    product_id: pid.clone(),
                })
                .await
            }
            None => SectionOutcome::unavailable("product ID could not be determined"),
        };

        let coverage = first_list_entry(
            self.fetch_cached(&Endpoint::CoverageStatus {
                serial: serial.clone(),
            })
            .await,
            "serial_numbers",
            "no coverage records returned",
        );

        let stack_coverage = if context.is_stack() {
            let mut serials = context.serials.clone();
            serials.truncate(MAX_SUMMARY_SERIALS);
            Some(self.fetch_cached(&Endpoint::CoverageSummary { serials }).await)
        } else {
            None
        };

        SupportRecord {
            serials: context.serials.clone(),
            product_id,
            software_version: context.software_version.clone(),
            product,
            eox,
            bugs,
            version_bugs,
            advisories,
            suggestions,
            coverage,
            stack_coverage,
        }
    }

    async fn test_connection(&self) -> Result<(), ApplicationError> {
        self.client.verify_credentials().await?;
        Ok(())
    }
}
