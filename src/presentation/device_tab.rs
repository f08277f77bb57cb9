//! Adapter turning raw support records into device tab view models

use chrono::{NaiveDate, Utc};
use regex::RegexBuilder;
use serde_json::Value;
use tracing::debug;

use super::models::{
    AdvisoryListView, AdvisoryView, BugListView, BugView, CoverageView, EoxMilestoneView,
    StackCoverageView, StackMemberView, SupportTabPayload,
};
use crate::domain::{
    bug_severity, bug_severity_badge, is_severe_bug, AdvisorySeverity, CoverageState, DomainError,
    EoxStatus, SupportRecord,
};

/// At most this many bugs are shown per panel.
const MAX_BUGS_SHOWN: usize = 5;
/// At most this many advisories are shown.
const MAX_ADVISORIES_SHOWN: usize = 10;

/// EoX record fields and their display labels, in template order.
const EOX_MILESTONES: [(&str, &str); 8] = [
    ("EOXExternalAnnouncementDate", "End-of-Life Announcement"),
    ("EndOfSaleDate", "End of Sale"),
    ("EndOfSWMaintenanceReleases", "End of SW Maintenance"),
    ("EndOfSecurityVulSupportDate", "End of Security Support"),
    ("EndOfRoutineFailureAnalysisDate", "End of Failure Analysis"),
    ("EndOfSvcAttachDate", "End of Service Attach"),
    ("EndOfServiceContractRenewal", "End of Contract Renewal"),
    ("LastDateOfSupport", "Last Date of Support"),
];

/// Decide whether the support tab is shown for a device.
///
/// The tab appears only for devices with a serial number whose manufacturer
/// matches the configured pattern (case-insensitive substring match).
pub fn should_show_tab(
    serial_field: &str,
    manufacturer: &str,
    pattern: &str,
) -> Result<bool, DomainError> {
    if serial_field.trim().is_empty() {
        return Ok(false);
    }

    let re = RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|_| DomainError::InvalidPattern {
            pattern: pattern.to_string(),
        })?;

    Ok(re.is_match(manufacturer))
}

/// Build the tab payload for today's date.
pub fn build_payload(record: &SupportRecord) -> SupportTabPayload {
    build_payload_at(record, Utc::now().date_naive())
}

/// Build the tab payload, classifying EoX milestones against `today`.
pub fn build_payload_at(record: &SupportRecord, today: NaiveDate) -> SupportTabPayload {
    SupportTabPayload {
        serial_number: record.serials.first().cloned().unwrap_or_default(),
        stack_serials: record.serials.clone(),
        product_id: record.product_id.clone(),
        software_version: record.software_version.clone(),
        product: record.product.clone(),
        eox: record.eox.map(|v| eox_milestones(v, today)),
        bugs: record.bugs.map(filter_severe_bugs),
        version_bugs: record.version_bugs.as_ref().map(|s| s.map(filter_severe_bugs)),
        advisories: record.advisories.map(advisory_list),
        suggestions: record.suggestions.clone(),
        coverage: record.coverage.map(coverage_view),
        stack_coverage: record
            .stack_coverage
            .as_ref()
            .map(|s| s.map(stack_coverage_view)),
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// EoX records nest each milestone as `{"value": "2024-01-31", ...}`.
fn milestone_date(record: &Value, field: &str) -> Option<String> {
    record
        .get(field)
        .and_then(|m| m.get("value"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn eox_milestones(record: &Value, today: NaiveDate) -> Vec<EoxMilestoneView> {
    EOX_MILESTONES
        .iter()
        .map(|(field, label)| {
            let date = milestone_date(record, field);
            let parsed = date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
            let status = EoxStatus::classify(parsed, today);
            EoxMilestoneView {
                label: (*label).to_string(),
                date,
                status,
                badge: status.badge(),
            }
        })
        .collect()
}

/// Keep only severity 1-3 bugs, preserving upstream order, capped for
/// display. The upstream severity parameter is never used for this; the
/// filter is applied entirely client-side.
fn filter_severe_bugs(response: &Value) -> BugListView {
    let all = response
        .get("bugs")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let total_reported = all.len();

    let severe: Vec<&Value> = all.iter().filter(|b| is_severe_bug(b)).collect();
    let total_matched = severe.len();
    if total_matched < total_reported {
        debug!(total_reported, total_matched, "filtered low-severity bugs");
    }

    let bugs = severe
        .into_iter()
        .take(MAX_BUGS_SHOWN)
        .map(|bug| {
            let severity = bug_severity(bug);
            BugView {
                bug_id: string_field(bug, "bug_id").unwrap_or_default(),
                headline: string_field(bug, "headline").unwrap_or_default(),
                severity,
                status: string_field(bug, "status"),
                badge: bug_severity_badge(severity),
            }
        })
        .collect();

    BugListView {
        bugs,
        total_matched,
        total_reported,
    }
}

fn advisory_list(response: &Value) -> AdvisoryListView {
    let all = response
        .get("advisories")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let total = all.len();

    let advisories = all
        .iter()
        .take(MAX_ADVISORIES_SHOWN)
        .map(|adv| {
            let severity = AdvisorySeverity::parse(
                string_field(adv, "sir").as_deref().unwrap_or_default(),
            );
            AdvisoryView {
                advisory_id: string_field(adv, "advisoryId").unwrap_or_default(),
                title: string_field(adv, "advisoryTitle").unwrap_or_default(),
                severity: severity.to_string(),
                badge: severity.badge(),
                first_published: string_field(adv, "firstPublished"),
                url: string_field(adv, "publicationUrl"),
            }
        })
        .collect();

    AdvisoryListView { advisories, total }
}

fn coverage_view(record: &Value) -> CoverageView {
    let state = CoverageState::parse(record.get("is_covered").and_then(Value::as_str));
    CoverageView {
        serial: string_field(record, "sr_no").unwrap_or_default(),
        state,
        badge: state.badge(),
        coverage_end_date: string_field(record, "coverage_end_date"),
        warranty_end_date: string_field(record, "warranty_end_date"),
        service_line: string_field(record, "service_line_descr"),
    }
}

fn stack_coverage_view(response: &Value) -> StackCoverageView {
    let members: Vec<StackMemberView> = response
        .get("serial_numbers")
        .and_then(Value::as_array)
        .map(|records| {
            records
                .iter()
                .map(|record| {
                    let state =
                        CoverageState::parse(record.get("is_covered").and_then(Value::as_str));
                    StackMemberView {
                        serial: string_field(record, "sr_no").unwrap_or_default(),
                        state,
                        badge: state.badge(),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let covered = members
        .iter()
        .filter(|m| m.state == CoverageState::Covered)
        .count();
    let not_covered = members
        .iter()
        .filter(|m| m.state == CoverageState::NotCovered)
        .count();

    StackCoverageView {
        total: members.len(),
        covered,
        not_covered,
        members,
    }
}
