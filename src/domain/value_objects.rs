//! Value objects for severities, coverage states, and serial handling

use std::fmt;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Badge categories for display, following the host UI's badge classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Danger,
    Warning,
    Info,
    Success,
    Secondary,
}

impl BadgeColor {
    /// CSS class suffix used by the host's badge markup
    pub fn as_class(&self) -> &'static str {
        match self {
            BadgeColor::Danger => "danger",
            BadgeColor::Warning => "warning",
            BadgeColor::Info => "info",
            BadgeColor::Success => "success",
            BadgeColor::Secondary => "secondary",
        }
    }
}

impl fmt::Display for BadgeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_class())
    }
}

/// Security Impact Rating of a PSIRT advisory
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AdvisorySeverity {
    Unknown,
    Low,
    Medium,
    High,
    Critical,
}

impl AdvisorySeverity {
    /// Parse the `sir` field of an advisory. Unrecognized values map to
    /// [`AdvisorySeverity::Unknown`] rather than failing.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "critical" => AdvisorySeverity::Critical,
            "high" => AdvisorySeverity::High,
            "medium" => AdvisorySeverity::Medium,
            "low" => AdvisorySeverity::Low,
            _ => AdvisorySeverity::Unknown,
        }
    }

    pub fn badge(&self) -> BadgeColor {
        match self {
            AdvisorySeverity::Critical => BadgeColor::Danger,
            AdvisorySeverity::High => BadgeColor::Warning,
            AdvisorySeverity::Medium => BadgeColor::Info,
            AdvisorySeverity::Low => BadgeColor::Success,
            AdvisorySeverity::Unknown => BadgeColor::Secondary,
        }
    }
}

impl fmt::Display for AdvisorySeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvisorySeverity::Critical => write!(f, "Critical"),
            AdvisorySeverity::High => write!(f, "High"),
            AdvisorySeverity::Medium => write!(f, "Medium"),
            AdvisorySeverity::Low => write!(f, "Low"),
            AdvisorySeverity::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Bug severity rank, 1 = most severe, 6 = least severe.
///
/// Bug API responses encode severity as either a JSON number or a string, so
/// parsing accepts both.
pub fn bug_severity(bug: &Value) -> Option<u8> {
    match bug.get("severity") {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u8::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Severities 1-3 are surfaced as "critical" findings.
pub fn is_severe_bug(bug: &Value) -> bool {
    matches!(bug_severity(bug), Some(1..=3))
}

pub fn bug_severity_badge(severity: Option<u8>) -> BadgeColor {
    match severity {
        Some(1) => BadgeColor::Danger,
        Some(2) => BadgeColor::Warning,
        Some(3) => BadgeColor::Info,
        _ => BadgeColor::Secondary,
    }
}

/// Service-contract coverage state of a single serial number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageState {
    Covered,
    NotCovered,
    Unknown,
}

impl CoverageState {
    /// Parse the `is_covered` field ("YES"/"NO") of a coverage record.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_uppercase()) {
            Some(ref s) if s == "YES" => CoverageState::Covered,
            Some(ref s) if s == "NO" => CoverageState::NotCovered,
            _ => CoverageState::Unknown,
        }
    }

    pub fn badge(&self) -> BadgeColor {
        match self {
            CoverageState::Covered => BadgeColor::Success,
            CoverageState::NotCovered => BadgeColor::Danger,
            CoverageState::Unknown => BadgeColor::Secondary,
        }
    }
}

/// Position of an EoX milestone date relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EoxStatus {
    Past,
    Upcoming,
    Unknown,
}

impl EoxStatus {
    pub fn classify(date: Option<NaiveDate>, today: NaiveDate) -> Self {
        match date {
            Some(d) if d < today => EoxStatus::Past,
            Some(_) => EoxStatus::Upcoming,
            None => EoxStatus::Unknown,
        }
    }

    pub fn badge(&self) -> BadgeColor {
        match self {
            EoxStatus::Past => BadgeColor::Danger,
            EoxStatus::Upcoming => BadgeColor::Info,
            EoxStatus::Unknown => BadgeColor::Secondary,
        }
    }
}

/// Split a raw serial field into ordered, trimmed serial numbers.
///
/// Stacked switches are commonly recorded as one comma-separated field
/// ("FCW2220G1DM, FCW2221E03P"); semicolons and whitespace also occur in
/// stack-member custom fields.
pub fn parse_serials(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Extract a dotted software version from a platform name, e.g.
/// "IOS-XE 17.9.5" -> "17.9.5". Used as a fallback when the host has no
/// explicit software version field.
pub fn version_from_platform(platform_name: &str) -> Option<String> {
    // Compiled per call; platform lookup happens once per page render.
    let re = Regex::new(r"(\d+\.\d+(?:\.\d+)?)").ok()?;
    re.captures(platform_name)
        .map(|c| c[1].to_string())
}
