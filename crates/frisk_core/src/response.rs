//! The scan response and overall status derivation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::exclusion::Exclusion;
use crate::finding::{Finding, FindingStatus};

/// Overall outcome of a scan call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// No rule matched any payload (possibly after exclusions).
    NotFound,
    /// At least one rule matched and no payload timed out.
    Found,
    /// At least one rule matched, but some payloads timed out.
    FoundWithErrors,
    /// Every surviving payload timed out, or the whole-scan deadline
    /// expired before any payload outcome was available.
    ScanTimeout,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Found => write!(f, "found"),
            Self::FoundWithErrors => write!(f, "found_with_errors"),
            Self::ScanTimeout => write!(f, "scan_timeout"),
        }
    }
}

/// The structured result of one scan call.
///
/// Callers always receive a response; `status` tells them whether results
/// are complete ([`Status::Found`] / [`Status::NotFound`]), partial
/// ([`Status::FoundWithErrors`]), or missing entirely
/// ([`Status::ScanTimeout`] with absent findings). No wire format is
/// mandated; the serde derives let callers emit JSON CI reports directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Overall outcome derived from the individual findings.
    pub status: Status,
    /// Ordered findings. `None` only when the whole-scan deadline expired
    /// before any payload outcome was available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub findings: Option<Vec<Finding>>,
    /// Exclusions that suppressed a finding, one entry per suppression
    /// event (duplicates preserved). Empty when none applied.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applied_exclusions: Vec<Exclusion>,
}

impl Response {
    pub(crate) fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            findings: Some(Vec::new()),
            applied_exclusions: Vec::new(),
        }
    }

    pub(crate) fn scan_timed_out() -> Self {
        Self {
            status: Status::ScanTimeout,
            findings: None,
            applied_exclusions: Vec::new(),
        }
    }

    pub(crate) fn from_findings(findings: Vec<Finding>, applied_exclusions: Vec<Exclusion>) -> Self {
        Self {
            status: aggregate_status(&findings),
            findings: Some(findings),
            applied_exclusions,
        }
    }
}

/// Derives the overall [`Status`] from individual finding outcomes.
///
/// Priority order: timeouts only → [`Status::ScanTimeout`]; timeouts mixed
/// with matches → [`Status::FoundWithErrors`]; matches only →
/// [`Status::Found`]; nothing → [`Status::NotFound`].
#[must_use]
pub fn aggregate_status(findings: &[Finding]) -> Status {
    let mut found = false;
    let mut timed_out = false;

    for finding in findings {
        match finding.status {
            FindingStatus::Found => found = true,
            FindingStatus::PayloadTimeout => timed_out = true,
        }
    }

    match (found, timed_out) {
        (true, true) => Status::FoundWithErrors,
        (true, false) => Status::Found,
        (false, true) => Status::ScanTimeout,
        (false, false) => Status::NotFound,
    }
}
