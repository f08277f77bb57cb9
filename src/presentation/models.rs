//! View models rendered by the host's device tab template

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{BadgeColor, CoverageState, EoxStatus, SectionOutcome};

/// One EoX milestone row: label, date, and how it relates to today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EoxMilestoneView {
    pub label: String,
    /// Milestone date as reported upstream, `None` when unannounced.
    pub date: Option<String>,
    pub status: EoxStatus,
    pub badge: BadgeColor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BugView {
    pub bug_id: String,
    pub headline: String,
    pub severity: Option<u8>,
    pub status: Option<String>,
    pub badge: BadgeColor,
}

/// Severity-filtered bug listing. `total_matched` counts severity 1-3 bugs
/// before the display cap; `total_reported` is the unfiltered upstream count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BugListView {
    pub bugs: Vec<BugView>,
    pub total_matched: usize,
    pub total_reported: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryView {
    pub advisory_id: String,
    pub title: String,
    pub severity: String,
    pub badge: BadgeColor,
    pub first_published: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryListView {
    pub advisories: Vec<AdvisoryView>,
    /// Advisory count before the display cap.
    pub total: usize,
}

/// Contract coverage for one serial number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageView {
    pub serial: String,
    pub state: CoverageState,
    pub badge: BadgeColor,
    pub coverage_end_date: Option<String>,
    pub warranty_end_date: Option<String>,
    pub service_line: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackMemberView {
    pub serial: String,
    pub state: CoverageState,
    pub badge: BadgeColor,
}

/// Per-member coverage for a switch stack, with covered/not-covered tallies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackCoverageView {
    pub members: Vec<StackMemberView>,
    pub total: usize,
    pub covered: usize,
    pub not_covered: usize,
}

/// Everything the device tab template needs, one section per panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportTabPayload {
    pub serial_number: String,
    pub stack_serials: Vec<String>,
    pub product_id: Option<String>,
    pub software_version: Option<String>,
    pub product: SectionOutcome<Value>,
    pub eox: SectionOutcome<Vec<EoxMilestoneView>>,
    pub bugs: SectionOutcome<BugListView>,
    pub version_bugs: Option<SectionOutcome<BugListView>>,
    pub advisories: SectionOutcome<AdvisoryListView>,
    pub suggestions: SectionOutcome<Value>,
    pub coverage: SectionOutcome<CoverageView>,
    pub stack_coverage: Option<SectionOutcome<StackCoverageView>>,
}
