//! Fixed endpoint families of the Cisco Support APIs
//!
//! Each family maps to exactly one upstream path template. Path parameters
//! are URL-escaped, never templated unsafely.

use urlencoding::encode;

/// One upstream request, keyed by endpoint family and parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    CoverageStatus { serial: String },
    CoverageSummary { serials: Vec<String> },
    ProductInfo { serial: String },
    EoxBySerial { serial: String },
    EoxByProduct { product_id: String },
    BugsByProduct { product_id: String },
    BugsBySoftwareVersion { version: String },
    BugsByKeyword { keyword: String },
    PsirtByProduct { product_id: String },
    SoftwareSuggestions { product_id: String },
}

impl Endpoint {
    pub fn family(&self) -> &'static str {
        match self {
            Endpoint::CoverageStatus { .. } => "coverage_status",
            Endpoint::CoverageSummary { .. } => "coverage_summary",
            Endpoint::ProductInfo { .. } => "product_info",
            Endpoint::EoxBySerial { .. } => "eox_serial",
            Endpoint::EoxByProduct { .. } => "eox_product",
            Endpoint::BugsByProduct { .. } => "bugs_product",
            Endpoint::BugsBySoftwareVersion { .. } => "bugs_version",
            Endpoint::BugsByKeyword { .. } => "bugs_keyword",
            Endpoint::PsirtByProduct { .. } => "psirt_product",
            Endpoint::SoftwareSuggestions { .. } => "software_suggestions",
        }
    }

    /// Request path relative to the API base URL.
    pub fn path(&self) -> String {
        match self {
            Endpoint::CoverageStatus { serial } => format!(
                "/sn2info/v2/coverage/status/serial_numbers/{}",
                encode(serial)
            ),
            Endpoint::CoverageSummary { serials } => format!(
                "/sn2info/v2/coverage/summary/serial_numbers/{}",
                serials
                    .iter()
                    .map(|s| encode(s).into_owned())
                    .collect::<Vec<_>>()
                    .join(",")
            ),
            Endpoint::ProductInfo { serial } => format!(
                "/product/v1/information/serial_numbers/{}",
                encode(serial)
            ),
            Endpoint::EoxBySerial { serial } => format!(
                "/supporttools/eox/rest/5/EOXBySerialNumber/1/{}",
                encode(serial)
            ),
            Endpoint::EoxByProduct { product_id } => format!(
                "/supporttools/eox/rest/5/EOXByProductID/1/{}",
                encode(product_id)
            ),
            Endpoint::BugsByProduct { product_id } => format!(
                "/bug/v3.0/bugs/products/product_id/{}",
                encode(product_id)
            ),
            Endpoint::BugsBySoftwareVersion { version } => {
                format!("/bug/v3.0/bugs/software_version/{}", encode(version))
            }
            // Keyword search only exists on the v2.0 bug API.
            Endpoint::BugsByKeyword { keyword } => {
                format!("/bug/v2.0/bugs/keyword/{}", encode(keyword))
            }
            Endpoint::PsirtByProduct { .. } => "/security/advisories/v2/product".to_string(),
            Endpoint::SoftwareSuggestions { product_id } => format!(
                "/software/v4.0/suggestions/releases/productIds/{}",
                encode(product_id)
            ),
        }
    }

    /// Query parameters; only the PSIRT family is query-parameterized.
    ///
    /// The bug endpoints deliberately send no `severity` parameter: the
    /// upstream filter causes server errors for some values, so severity
    /// filtering happens client-side.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Endpoint::PsirtByProduct { product_id } => {
                vec![("product", product_id.clone())]
            }
            _ => Vec::new(),
        }
    }

    /// Deterministic cache key from the family and sorted parameter values.
    pub fn cache_key(&self) -> String {
        let params = match self {
            Endpoint::CoverageStatus { serial }
            | Endpoint::ProductInfo { serial }
            | Endpoint::EoxBySerial { serial } => serial.clone(),
            // Sorted so permutations of the same stack share one entry.
            Endpoint::CoverageSummary { serials } => {
                let mut sorted = serials.clone();
                sorted.sort();
                sorted.join(",")
            }
            Endpoint::EoxByProduct { product_id }
            | Endpoint::BugsByProduct { product_id }
            | Endpoint::PsirtByProduct { product_id }
            | Endpoint::SoftwareSuggestions { product_id } => product_id.clone(),
            Endpoint::BugsBySoftwareVersion { version } => version.clone(),
            Endpoint::BugsByKeyword { keyword } => keyword.clone(),
        };
        format!("cisco:{}:{}", self.family(), params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_fixed_templates() {
        assert_eq!(
            Endpoint::ProductInfo {
                serial: "ABC123".into()
            }
            .path(),
            "/product/v1/information/serial_numbers/ABC123"
        );
        assert_eq!(
            Endpoint::EoxBySerial {
                serial: "ABC123".into()
            }
            .path(),
            "/supporttools/eox/rest/5/EOXBySerialNumber/1/ABC123"
        );
        assert_eq!(
            Endpoint::BugsByProduct {
                product_id: "C9300-48P".into()
            }
            .path(),
            "/bug/v3.0/bugs/products/product_id/C9300-48P"
        );
        assert_eq!(
            Endpoint::EoxByProduct {
                product_id: "C9300-48P".into()
            }
            .path(),
            "/supporttools/eox/rest/5/EOXByProductID/1/C9300-48P"
        );
        assert_eq!(
            Endpoint::SoftwareSuggestions {
                product_id: "C9300-48P".into()
            }
            .path(),
            "/software/v4.0/suggestions/releases/productIds/C9300-48P"
        );
    }

    #[test]
    fn path_parameters_are_escaped() {
        let endpoint = Endpoint::BugsByKeyword {
            keyword: "Catalyst 9300/9400".into(),
        };
        assert_eq!(endpoint.path(), "/bug/v2.0/bugs/keyword/Catalyst%209300%2F9400");
    }

    #[test]
    fn coverage_summary_joins_serials_with_commas() {
        let endpoint = Endpoint::CoverageSummary {
            serials: vec!["FOC111".into(), "FOC222".into()],
        };
        assert_eq!(
            endpoint.path(),
            "/sn2info/v2/coverage/summary/serial_numbers/FOC111,FOC222"
        );
    }

    #[test]
    fn psirt_is_query_parameterized() {
        let endpoint = Endpoint::PsirtByProduct {
            product_id: "C9800-40-K9".into(),
        };
        assert_eq!(endpoint.path(), "/security/advisories/v2/product");
        assert_eq!(endpoint.query(), vec![("product", "C9800-40-K9".to_string())]);
    }

    #[test]
    fn cache_keys_are_deterministic_and_distinct() {
        let a = Endpoint::ProductInfo {
            serial: "ABC123".into(),
        };
        let b = Endpoint::EoxBySerial {
            serial: "ABC123".into(),
        };
        assert_eq!(a.cache_key(), a.cache_key());
        assert_ne!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key(), "cisco:product_info:ABC123");
    }

    #[test]
    fn summary_cache_key_ignores_serial_order() {
        let a = Endpoint::CoverageSummary {
            serials: vec!["FOC222".into(), "FOC111".into()],
        };
        let b = Endpoint::CoverageSummary {
            serials: vec!["FOC111".into(), "FOC222".into()],
        };
        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key(), "cisco:coverage_summary:FOC111,FOC222");
        // The request path keeps the recorded member order.
        assert_ne!(a.path(), b.path());
    }
}
